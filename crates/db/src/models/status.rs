//! Status enums mapping to `TEXT` columns guarded by `CHECK` constraints.
//!
//! Rows carry statuses as plain `String`s; these enums are the single source
//! of the accepted values and are used to parse query filters, validate
//! request bodies and bind literal values in repository queries.

use std::fmt;
use std::str::FromStr;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in lifecycle order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// The value stored in the database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            /// Parse a status, ignoring ASCII case (`PENDING_REVIEW` works).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == lowered)
                    .ok_or_else(|| {
                        let valid: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!(
                            "Invalid {} '{s}'. Must be one of: {}",
                            stringify!($name),
                            valid.join(", ")
                        )
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_status_enum! {
    /// Video session lifecycle.
    VideoSessionStatus {
        Uploading = "uploading",
        Processing = "processing",
        PendingReview = "pending_review",
        Approved = "approved",
        Rejected = "rejected",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Outcome of a review.
    ReviewStatus {
        Approved = "approved",
        Rejected = "rejected",
    }
}

define_status_enum! {
    /// External pipeline execution state.
    ProcessingJobStatus {
        Running = "running",
        Succeeded = "succeeded",
        Failed = "failed",
    }
}

define_status_enum! {
    /// Invitation lifecycle.
    InvitationStatus {
        Pending = "pending",
        Sent = "sent",
        Used = "used",
        Expired = "expired",
    }
}

define_status_enum! {
    /// Client task request lifecycle.
    TaskRequestStatus {
        Open = "open",
        Fulfilled = "fulfilled",
        Closed = "closed",
    }
}

define_status_enum! {
    /// Worker application lifecycle.
    TaskApplicationStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}

impl VideoSessionStatus {
    /// Whether the pipeline may move a session from `self` to `next`.
    ///
    /// Admin edits bypass this; it governs the automatic transitions
    /// driven by uploads, processing jobs and reviews.
    pub fn can_transition_to(self, next: VideoSessionStatus) -> bool {
        use VideoSessionStatus::*;
        matches!(
            (self, next),
            (Uploading, Processing)
                | (Processing, PendingReview)
                | (PendingReview, Approved)
                | (PendingReview, Rejected)
                | (Uploading, Failed)
                | (Processing, Failed)
                | (PendingReview, Failed)
        )
    }

    /// Approved, rejected and failed sessions never move again on their own.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VideoSessionStatus::Approved | VideoSessionStatus::Rejected | VideoSessionStatus::Failed
        )
    }
}

impl From<ReviewStatus> for VideoSessionStatus {
    fn from(value: ReviewStatus) -> Self {
        match value {
            ReviewStatus::Approved => VideoSessionStatus::Approved,
            ReviewStatus::Rejected => VideoSessionStatus::Rejected,
        }
    }
}

impl InvitationStatus {
    /// Pending and sent invitations can still be redeemed.
    pub fn is_redeemable(self) -> bool {
        matches!(self, InvitationStatus::Pending | InvitationStatus::Sent)
    }
}

/// Parse a comma-separated status filter (`"uploading,PROCESSING"`).
///
/// Empty segments are skipped; any unknown value fails the whole filter.
pub fn parse_status_list<T>(raw: &str) -> Result<Vec<T>, String>
where
    T: FromStr<Err = String>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(T::from_str)
        .collect()
}

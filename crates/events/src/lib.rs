//! Outbound email for the platform.
//!
//! - [`Mailer`]: the delivery seam handlers depend on.
//! - [`SmtpMailer`]: `lettre` SMTP implementation, configured by [`EmailConfig`].
//! - [`templates`]: subject/body builders for each message the platform sends.

pub mod email;
pub mod templates;

pub use email::{EmailConfig, EmailError, Mailer, OutgoingEmail, SmtpMailer};

//! Message templates.

use efference_core::types::Timestamp;

use crate::email::OutgoingEmail;

pub const INVITATION_SUBJECT: &str = "You're Invited to Join Efference Video Training Platform";

pub const PREORDER_SUBJECT: &str = "Pre-Order Confirmation – Efference H-01";

/// Invitation carrying the registration code and a link to the sign-up page.
pub fn invitation_email(
    to: &str,
    invitation_code: &str,
    expires_at: Timestamp,
    app_base_url: &str,
) -> OutgoingEmail {
    let register_url = format!("{}/register", app_base_url.trim_end_matches('/'));
    let html_body = format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #222;">
    <h2>You're Invited!</h2>
    <p>You have been invited to join the <strong>Efference Video Training Platform</strong>!</p>
    <p>
      <strong>Your invitation code:</strong><br>
      <span style="display:inline-block; margin:12px 0; padding:12px 24px; background:#f5f5f5; border-radius:8px; font-size:1.3em; letter-spacing:2px; font-weight:bold; color:#2a4d8f;">{code}</span>
    </p>
    <p><strong>Expires:</strong> {expires}</p>
    <p>
      To register, visit:<br>
      <a href="{url}" style="color:#2a4d8f;">{url}</a><br>
      and enter your invitation code.
    </p>
    <hr>
    <p>Best regards,<br><strong>Efference Team</strong></p>
  </body>
</html>
"#,
        code = escape_html(invitation_code),
        expires = expires_at.format("%Y-%m-%d %H:%M UTC"),
        url = escape_html(&register_url),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: INVITATION_SUBJECT.to_string(),
        html_body,
    }
}

/// Confirmation sent after a paid pre-order checkout.
pub fn preorder_confirmation_email(to: &str, customer_name: &str, amount: &str) -> OutgoingEmail {
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; line-height: 1.6;">
  <p>Hi {name},</p>
  <p>We're excited to confirm your pre-order of the <strong>Efference H-01</strong>. We have successfully received your payment of <strong>{amount}</strong>.</p>
  <p>You are now part of a small group of early customers who will shape the future of this product.</p>
  <p>In the next few days you'll receive a personal email from our team to learn what you're building and which features matter most to you.</p>
  <p>With appreciation,<br><strong>The Efference Team</strong></p>
</div>
"#,
        name = escape_html(customer_name),
        amount = escape_html(amount),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: PREORDER_SUBJECT.to_string(),
        html_body,
    }
}

/// Format a minor-unit amount (`12345`, `"usd"`) as `"123.45 USD"`.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!(
        "{sign}{}.{:02} {}",
        abs / 100,
        abs % 100,
        currency.to_uppercase()
    )
}

/// Customer display name, falling back to the local part of the email.
pub fn display_name<'a>(name: Option<&'a str>, email: &'a str) -> &'a str {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => email.split('@').next().unwrap_or(email),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn invitation_contains_code_expiry_and_link() {
        let expires = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let email = invitation_email("new@example.com", "abc123", expires, "https://app.test/");

        assert_eq!(email.to, "new@example.com");
        assert_eq!(email.subject, INVITATION_SUBJECT);
        assert!(email.html_body.contains("abc123"));
        assert!(email.html_body.contains("2026-03-01 12:30 UTC"));
        assert!(email.html_body.contains("https://app.test/register"));
    }

    #[test]
    fn preorder_escapes_customer_name() {
        let email = preorder_confirmation_email("a@b.c", "<Ann & Co>", "10.00 USD");
        assert!(email.html_body.contains("&lt;Ann &amp; Co&gt;"));
        assert!(email.html_body.contains("10.00 USD"));
        assert_eq!(email.subject, PREORDER_SUBJECT);
    }

    #[test]
    fn amounts_use_two_decimals_and_uppercase_currency() {
        assert_eq!(format_amount(12345, "usd"), "123.45 USD");
        assert_eq!(format_amount(5, "eur"), "0.05 EUR");
        assert_eq!(format_amount(100_000, "usd"), "1000.00 USD");
    }

    #[test]
    fn name_falls_back_to_email_local_part() {
        assert_eq!(display_name(Some("Grace"), "g@x.io"), "Grace");
        assert_eq!(display_name(Some("  "), "grace@x.io"), "grace");
        assert_eq!(display_name(None, "grace@x.io"), "grace");
    }
}

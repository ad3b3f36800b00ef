use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::html;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("SMTP configuration missing")]
    NotConfigured,

    #[error("Failed to connect to email server")]
    Connect(String),

    #[error("Failed to send email notification")]
    Send(String),

    #[error("invalid mail address: {0}")]
    Address(String),

    #[error("mail worker unavailable")]
    WorkerUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

// Contact form payload the relay turns into a support mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNotification {
    pub name: String,
    pub email: String,
    pub message: String,
    pub user_id: Option<String>,
}

pub fn contact_notification(
    notification: &ContactNotification,
    mailbox: &str,
    sent_at: DateTime<Utc>,
) -> OutgoingMail {
    let body = html::escape(&notification.message).replace('\n', "<br>");
    let user_id = notification
        .user_id
        .as_deref()
        .map(html::escape)
        .unwrap_or_else(|| "Not logged in".to_string());

    let html = format!(
        r#"<h2>New Support Request</h2>
<p><strong>From:</strong> {name} ({email})</p>
<p><strong>User ID:</strong> {user_id}</p>
<p><strong>Time:</strong> {time}</p>
<p><strong>Message:</strong></p>
<blockquote style="background: #f9f9f9; border-left: 4px solid #ccc; margin: 1.5em 10px; padding: 1em 10px;">
{body}
</blockquote>
"#,
        name = html::escape(&notification.name),
        email = html::escape(&notification.email),
        time = sent_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    OutgoingMail {
        from: mailbox.to_string(),
        to: mailbox.to_string(),
        // subjects are single-line
        subject: format!("Support Request from {}", notification.name.replace(['\r', '\n'], " ")),
        html,
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn verify(&self) -> Result<(), MailError>;

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

// SMTP over implicit TLS. Without settings every call fails with NotConfigured.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(settings: Option<SmtpSettings>) -> Result<Self, MailError> {
        let transport = match settings {
            Some(s) => Some(
                AsyncSmtpTransport::<Tokio1Executor>::relay(&s.host)
                    .map_err(|e| MailError::Connect(e.to_string()))?
                    .port(s.port)
                    .credentials(Credentials::new(s.user, s.pass))
                    .build(),
            ),
            None => None,
        };
        Ok(Self { transport })
    }

    fn transport(&self) -> Result<&AsyncSmtpTransport<Tokio1Executor>, MailError> {
        self.transport.as_ref().ok_or(MailError::NotConfigured)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport()?.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Connect("server rejected NOOP".to_string())),
            Err(e) => Err(MailError::Connect(e.to_string())),
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let from: Mailbox = mail
            .from
            .parse()
            .map_err(|_| MailError::Address(mail.from.clone()))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| MailError::Address(mail.to.clone()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(mail.html.clone())
            .map_err(|e| MailError::Send(e.to_string()))?;

        self.transport()?
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Send(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn notification(user_id: Option<&str>) -> ContactNotification {
        ContactNotification {
            name: "Asha".to_string(),
            email: "asha@x.com".to_string(),
            message: "Hello\n<b>can I join?</b>".to_string(),
            user_id: user_id.map(str::to_string),
        }
    }

    #[test]
    fn contact_mail_goes_to_support_mailbox() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let mail = contact_notification(&notification(Some("u-1")), "support@yoga.test", at);
        assert_eq!(mail.to, "support@yoga.test");
        assert_eq!(mail.from, "support@yoga.test");
        assert_eq!(mail.subject, "Support Request from Asha");
        assert!(mail.html.contains("<strong>User ID:</strong> u-1"));
        assert!(mail.html.contains("2026-03-01 09:30:00 UTC"));
    }

    #[test]
    fn message_is_escaped_and_newlines_become_breaks() {
        let mail = contact_notification(&notification(None), "s@yoga.test", Utc::now());
        assert!(mail.html.contains("Hello<br>&lt;b&gt;can I join?&lt;/b&gt;"));
        assert!(mail.html.contains("Not logged in"));
    }

    #[test]
    fn subject_stays_on_one_line() {
        let mut n = notification(None);
        n.name = "Eve\r\nBcc: all@x.com".to_string();
        let mail = contact_notification(&n, "s@yoga.test", Utc::now());
        assert!(!mail.subject.contains('\n'));
    }

    #[tokio::test]
    async fn unconfigured_mailer_refuses() {
        let mailer = SmtpMailer::new(None).unwrap();
        assert_eq!(mailer.verify().await, Err(MailError::NotConfigured));
    }
}

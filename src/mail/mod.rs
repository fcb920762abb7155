//! Outbound contact-notification mail.
//!
//! Dispatch happens off the request-handling path (`tokio::spawn`); a failed
//! send is logged and never visible to the submitter.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::MailConfig;
use crate::db::models::DbContactMessage;

#[derive(Clone)]
struct MailerInner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

/// SMTP notifier for inbound contact messages. Disabled mode (the default)
/// short-circuits every send with an info log.
#[derive(Clone)]
pub struct Mailer {
    inner: Option<MailerInner>,
}

impl Mailer {
    pub fn new(cfg: &MailConfig) -> Self {
        if !cfg.enabled {
            return Self { inner: None };
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
            .expect("invalid mail.smtp_host for SMTP relay")
            .port(cfg.smtp_port);

        if !cfg.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                cfg.smtp_username.clone(),
                cfg.smtp_password.clone(),
            ));
        }

        let from = cfg.from.parse().expect("invalid mail.from address");
        let to = cfg.to.parse().expect("invalid mail.to address");

        Self {
            inner: Some(MailerInner {
                transport: builder.build(),
                from,
                to,
            }),
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Fire-and-forget notification for a stored contact message.
    ///
    /// `attachment_path` is the resolved on-disk location of the stored
    /// attachment, when one exists.
    pub fn spawn_contact_notification(
        &self,
        message: DbContactMessage,
        attachment_path: Option<PathBuf>,
    ) {
        let Some(inner) = self.inner.clone() else {
            info!(message_id = %message.id, "mail disabled; skipping contact notification");
            return;
        };

        tokio::spawn(async move {
            match send_notification(&inner, &message, attachment_path).await {
                Ok(()) => {
                    info!(message_id = %message.id, "contact notification email sent");
                }
                Err(e) => {
                    error!(message_id = %message.id, error = %e, "failed to send contact notification email");
                }
            }
        });
    }
}

async fn send_notification(
    inner: &MailerInner,
    message: &DbContactMessage,
    attachment_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut builder = Message::builder()
        .from(inner.from.clone())
        .to(inner.to.clone())
        .subject(build_subject(message));

    match message.email.parse::<Mailbox>() {
        Ok(reply_to) => builder = builder.reply_to(reply_to),
        Err(e) => warn!(email = %message.email, error = %e, "sender address not usable as reply-to"),
    }

    let html = SinglePart::html(build_body(message));

    let email = match load_attachment(message, attachment_path).await {
        Some(attachment) => {
            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(attachment))?
        }
        None => builder.multipart(MultiPart::mixed().singlepart(html))?,
    };

    inner.transport.send(email).await?;
    Ok(())
}

async fn load_attachment(
    message: &DbContactMessage,
    attachment_path: Option<PathBuf>,
) -> Option<SinglePart> {
    let path = attachment_path?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "attachment file not readable; sending without it");
            return None;
        }
    };

    let filename = message
        .attachment_filename
        .clone()
        .or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "attachment".to_string());

    let content_type = ContentType::parse("application/octet-stream").ok()?;
    Some(Attachment::new(filename).body(bytes, content_type))
}

fn build_subject(message: &DbContactMessage) -> String {
    match message.company.as_deref() {
        Some(company) if !company.is_empty() => {
            format!("New contact inquiry: {} - {company}", message.name)
        }
        _ => format!("New contact inquiry: {}", message.name),
    }
}

fn build_body(message: &DbContactMessage) -> String {
    let mut body = String::new();
    body.push_str("<html><body style='font-family: Arial, sans-serif;'>");
    body.push_str("<h2>New contact form message</h2><hr>");
    body.push_str("<table style='width: 100%; border-collapse: collapse;'>");

    push_row(&mut body, "Name", &escape(&message.name));

    if let Some(company) = message.company.as_deref().filter(|c| !c.is_empty()) {
        push_row(&mut body, "Company", &escape(company));
    }

    push_row(&mut body, "Email", &escape(&message.email));

    if let Some(phone) = message.phone.as_deref().filter(|p| !p.is_empty()) {
        push_row(&mut body, "Phone", &escape(phone));
    }

    body.push_str("</table><h3>Message:</h3><div>");
    body.push_str(&escape(&message.message).replace('\n', "<br>"));
    body.push_str("</div>");

    if let Some(filename) = message.attachment_filename.as_deref() {
        body.push_str("<p><strong>Attachment:</strong> ");
        body.push_str(&escape(filename));
        body.push_str(" (attached to this email)</p>");
    }

    body.push_str("<hr><p style='font-size: 12px;'>Sent from the website contact form.</p>");
    body.push_str("</body></html>");
    body
}

fn push_row(body: &mut String, label: &str, value: &str) {
    body.push_str("<tr><td style='padding: 8px 0; font-weight: bold;'>");
    body.push_str(label);
    body.push_str(":</td><td style='padding: 8px 0;'>");
    body.push_str(value);
    body.push_str("</td></tr>");
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_message() -> DbContactMessage {
        DbContactMessage {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            company: Some("Analytical <Engines>".to_string()),
            email: "ada@example.com".to_string(),
            phone: None,
            message: "line one\nline two".to_string(),
            attachment_url: None,
            attachment_filename: Some("drawing.pdf".to_string()),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn subject_includes_company_when_present() {
        let msg = sample_message();
        assert_eq!(
            build_subject(&msg),
            "New contact inquiry: Ada - Analytical <Engines>"
        );
    }

    #[test]
    fn body_escapes_markup_and_keeps_line_breaks() {
        let body = build_body(&sample_message());
        assert!(body.contains("Analytical &lt;Engines&gt;"));
        assert!(body.contains("line one<br>line two"));
        assert!(body.contains("drawing.pdf"));
    }
}

//! Outgoing email delivery
//!
//! SMTP is used in production; the file transport writes `.eml` files into a
//! directory and is the development default.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;

use crate::config::{EmailConfig, EmailTransportKind};
use crate::error::{AppError, AppResult};

/// Sends plain-text email through the configured transport
pub struct Mailer {
    transport: MailTransport,
    default_from: String,
}

enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl Mailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let transport = match config.transport {
            EmailTransportKind::Smtp => {
                if !config.smtp_starttls {
                    tracing::warn!("SMTP STARTTLS is disabled - this is not recommended for production");
                }

                let builder = if config.smtp_starttls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                        .map_err(|e| AppError::Configuration(format!("SMTP relay: {}", e)))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                };

                let builder = builder.port(config.smtp_port);
                let builder = match (&config.smtp_username, &config.smtp_password) {
                    (Some(username), Some(password)) => {
                        builder.credentials(Credentials::new(username.clone(), password.clone()))
                    }
                    _ => builder,
                };

                MailTransport::Smtp(builder.build())
            }
            EmailTransportKind::File => {
                let dir = Path::new(&config.file_dir);
                if !dir.exists() {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        AppError::Configuration(format!("create mail directory: {}", e))
                    })?;
                }
                MailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };

        Ok(Self {
            transport,
            default_from: config.from_email.clone(),
        })
    }

    /// Send one message to every address in `recipient_list`.
    ///
    /// Failures are returned to the caller rather than ignored.
    pub async fn send_email(
        &self,
        subject: &str,
        message: &str,
        from_email: Option<&str>,
        recipient_list: &[String],
    ) -> AppResult<()> {
        let email = self.build_message(subject, message, from_email, recipient_list)?;

        match &self.transport {
            MailTransport::Smtp(smtp) => {
                smtp.send(email)
                    .await
                    .map_err(|e| AppError::Email(format!("SMTP send failed: {}", e)))?;
            }
            MailTransport::File(file) => {
                file.send(email)
                    .await
                    .map_err(|e| AppError::Email(format!("file transport failed: {}", e)))?;
            }
        }

        tracing::info!(
            recipients = recipient_list.len(),
            subject = subject,
            "Email sent"
        );
        Ok(())
    }

    fn build_message(
        &self,
        subject: &str,
        body: &str,
        from_email: Option<&str>,
        recipient_list: &[String],
    ) -> AppResult<Message> {
        if recipient_list.is_empty() {
            return Err(AppError::Email("recipient list is empty".to_string()));
        }

        let from = from_email
            .unwrap_or(&self.default_from)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Email(format!("invalid sender address: {}", e)))?;

        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in recipient_list {
            let to = recipient
                .parse::<Mailbox>()
                .map_err(|e| AppError::Email(format!("invalid recipient {}: {}", recipient, e)))?;
            builder = builder.to(to);
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Email(format!("build email message: {}", e)))
    }
}

//! Outgoing invite mail.
//!
//! SMTP is optional: without `SMTP_HOST` configured, invites are logged
//! instead of sent so local development does not need a relay.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};

pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl Mailer {
    /// Build a mailer from optional SMTP settings.
    ///
    /// # Panics
    ///
    /// Panics on malformed SMTP settings, which is the desired behaviour --
    /// we want misconfiguration to fail at startup, not on the first invite.
    pub fn new(config: Option<&SmtpConfig>) -> Self {
        match config {
            Some(smtp) => {
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                    .unwrap_or_else(|e| panic!("Invalid SMTP host '{}': {e}", smtp.host))
                    .credentials(Credentials::new(
                        smtp.username.clone(),
                        smtp.password.clone(),
                    ))
                    .build();
                let from = smtp
                    .from
                    .parse()
                    .unwrap_or_else(|e| panic!("Invalid SMTP_FROM '{}': {e}", smtp.from));
                Self {
                    transport: Some(transport),
                    from: Some(from),
                }
            }
            None => Self {
                transport: None,
                from: None,
            },
        }
    }

    /// A mailer that never sends; invites are logged. Used in tests.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Send an invite mail with the acceptance link.
    pub async fn send_invite(
        &self,
        to_email: &str,
        full_name: Option<&str>,
        invite_link: &str,
    ) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!(email = to_email, link = invite_link, "SMTP not configured; invite link logged");
            return Ok(());
        };

        let to: Mailbox = to_email
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

        let greeting = full_name.filter(|n| !n.is_empty()).unwrap_or("there");
        let body = format!(
            "Hi {greeting},\n\n\
             You have been invited to the investor portal. Follow the link \
             below to choose a password and sign in:\n\n{invite_link}\n\n\
             The link is personal and should not be shared."
        );

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject("Your portal invitation")
            .body(body)
            .map_err(|e| AppError::InternalError(format!("Failed to build invite mail: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to send invite mail: {e}")))?;

        tracing::info!(email = to_email, "Invite mail sent");
        Ok(())
    }
}

use anyhow::{Context, Result, bail};
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::MailConfig;

/// A contact-form submission to relay. Validation (presence, email shape)
/// happens at the API layer before this type is built.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Relays contact-form submissions through the configured SMTP account.
/// Pure pass-through; nothing is persisted.
pub struct ContactService {
    config: MailConfig,
}

impl ContactService {
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Errors with the names of the unset credential keys, if any.
    pub fn ensure_configured(&self) -> Result<()> {
        let missing = self.config.missing_keys();
        if missing.is_empty() {
            Ok(())
        } else {
            bail!(
                "Missing required mail configuration: {}",
                missing.join(", ")
            )
        }
    }

    pub async fn relay(&self, submission: ContactMessage) -> Result<()> {
        self.ensure_configured()?;

        // Display name may contain characters a mailbox rejects; fall back
        // to the bare address.
        let from: Mailbox = format!("{} <{}>", submission.name, self.config.user)
            .parse()
            .or_else(|_| self.config.user.parse())
            .context("Configured SMTP user is not a valid address")?;

        let to: Mailbox = self
            .config
            .recipient()
            .parse()
            .context("Configured mail recipient is not a valid address")?;

        let reply_to: Mailbox = submission
            .email
            .parse()
            .context("Submitter address is not a valid mailbox")?;

        let body = format!(
            "You have received a new message from the website contact form.\n\n\
             Name: {}\n\
             Email: {}\n\
             Subject: {}\n\n\
             Message:\n{}\n",
            submission.name, submission.email, submission.subject, submission.message
        );

        let email = Message::builder()
            .from(from)
            .reply_to(reply_to)
            .to(to)
            .subject(format!(
                "New Contact Form Submission: {}",
                submission.subject
            ))
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .context("Failed to build contact email")?;

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .context("Failed to build SMTP transport")?
                .credentials(Credentials::new(
                    self.config.user.clone(),
                    self.config.app_password.clone(),
                ))
                .build();

        let response = mailer
            .send(email)
            .await
            .context("Failed to send contact email")?;

        info!(code = %response.code(), "Contact form message relayed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_mailer_reports_missing_keys() {
        let service = ContactService::new(MailConfig::default());
        let err = service.ensure_configured().unwrap_err().to_string();
        assert!(err.contains("SMTP_USER"));
        assert!(err.contains("SMTP_APP_PASSWORD"));
    }

    #[test]
    fn test_configured_mailer_passes_check() {
        let service = ContactService::new(MailConfig {
            user: "studio@example.com".to_string(),
            app_password: "app-password".to_string(),
            ..Default::default()
        });
        assert!(service.ensure_configured().is_ok());
    }
}

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::SmtpConfig;
use crate::error::{Result, TracciaError};

/// SMTP sender. One message per call, addressed to every recipient.
#[derive(Debug, Clone)]
pub struct MailChannel {
    settings: SmtpConfig,
}

impl MailChannel {
    pub fn new(settings: SmtpConfig) -> Self {
        Self { settings }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    /// Send `subject`/`body` to `recipients`. Returns `Ok(())` without
    /// contacting anything when the channel is unconfigured or there is
    /// nobody to notify.
    pub async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        if recipients.is_empty() || !self.is_configured() {
            debug!(
                recipients = recipients.len(),
                configured = self.is_configured(),
                "mail channel skipped"
            );
            return Ok(());
        }

        let message = self.build_message(recipients, subject, body)?;
        let transport = self.transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| TracciaError::Mail(format!("failed to send: {e}")))?;
        Ok(())
    }

    fn build_message(&self, recipients: &[String], subject: &str, body: &str) -> Result<Message> {
        let from: Mailbox = self
            .settings
            .from
            .trim()
            .parse()
            .map_err(|e| TracciaError::Mail(format!("invalid from address: {e}")))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for to in recipients {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|e| TracciaError::Mail(format!("invalid recipient '{to}': {e}")))?;
            builder = builder.to(mailbox);
        }
        builder
            .body(body.to_string())
            .map_err(|e| TracciaError::Mail(format!("failed to build message: {e}")))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let host = self.settings.host.trim();
        let mut builder = if self.settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| TracciaError::Mail(format!("failed to create SMTP transport: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        }
        .port(self.settings.port)
        .timeout(Some(self.settings.timeout()));

        if !self.settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SmtpConfig {
        SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            from: "Traccia <alerts@acme.it>".to_string(),
            tls: false,
            timeout_secs: 1,
            ..SmtpConfig::default()
        }
    }

    #[tokio::test]
    async fn unconfigured_channel_is_a_noop() {
        let channel = MailChannel::new(SmtpConfig::default());
        assert!(!channel.is_configured());
        channel
            .send(&["a@acme.it".to_string()], "subject", "body")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_recipients_is_a_noop() {
        let channel = MailChannel::new(configured());
        channel.send(&[], "subject", "body").await.unwrap();
    }

    #[test]
    fn message_addresses_every_recipient() {
        let channel = MailChannel::new(configured());
        let message = channel
            .build_message(
                &["a@acme.it".to_string(), "b@acme.it".to_string()],
                "[Formazione] Carrellista - Mario Rossi",
                "body",
            )
            .unwrap();
        let to: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(to, vec!["a@acme.it", "b@acme.it"]);
    }

    #[test]
    fn bad_recipient_is_an_error() {
        let channel = MailChannel::new(configured());
        let err = channel
            .build_message(&["not an address".to_string()], "s", "b")
            .unwrap_err();
        assert!(matches!(err, TracciaError::Mail(_)));
    }

    #[tokio::test]
    async fn connection_failure_propagates() {
        let channel = MailChannel::new(configured());
        let err = channel
            .send(&["a@acme.it".to_string()], "subject", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, TracciaError::Mail(_)));
    }
}

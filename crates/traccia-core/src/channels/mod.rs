//! Outbound notification transports.
//!
//! Each channel is a no-op when its configuration is absent. Transport
//! failures propagate to the caller, which decides whether the send counts.

pub mod mail;
pub mod webhook;

pub use mail::MailChannel;
pub use webhook::{WebhookChannel, WebhookPayload};

use crate::config::Config;
use crate::error::Result;

/// The set of channels available to the alert engine.
#[derive(Debug, Clone)]
pub struct Channels {
    pub mail: MailChannel,
    pub webhook: WebhookChannel,
}

impl Channels {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            mail: MailChannel::new(config.smtp.clone()),
            webhook: WebhookChannel::new(&config.webhook.url, config.webhook.timeout())?,
        })
    }
}

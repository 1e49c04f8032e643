//! Outbound mail for booking notifications
//!
//! Delivery never blocks or fails an HTTP response: [`Notifier::dispatch`]
//! hands the message to a background task whose errors are only logged.

mod webhook;

pub use webhook::WebhookMailer;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::MailConfig;
use crate::error::Result;
use crate::store::Document;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Mail {
    /// Confirmation sent to the guest of a freshly inserted booking.
    ///
    /// `None` when the booking does not name a guest email.
    pub fn booking_confirmation(booking: &Document, booking_id: &str) -> Option<Self> {
        let to = booking
            .get("guestEmail")
            .and_then(|v| v.as_str())
            .or_else(|| {
                booking
                    .get("guest")
                    .and_then(|g| g.get("email"))
                    .and_then(|v| v.as_str())
            })
            .filter(|email| !email.is_empty())?;

        let home = booking
            .get("title")
            .or_else(|| booking.get("homeTitle"))
            .and_then(|v| v.as_str())
            .unwrap_or("your stay");

        let mut body = format!(
            "Your booking for {} is confirmed.\n\nBooking id: {}\n",
            home, booking_id
        );
        if let Some(home_id) = booking.get("homeId").and_then(|v| v.as_str()) {
            body.push_str(&format!("Home id: {}\n", home_id));
        }

        Some(Self {
            to: to.to_string(),
            subject: "Booking confirmed".to_string(),
            body,
        })
    }
}

/// Mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<()>;
}

/// Transport that only records mail in the log
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "Mail (log only)");
        Ok(())
    }
}

/// Fire-and-forget dispatcher around a [`Mailer`]
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Pick the transport from configuration
    pub fn from_config(config: &MailConfig) -> Self {
        match config.webhook_url() {
            Some(url) => Self::new(Arc::new(WebhookMailer::new(url, &config.from))),
            None => Self::new(Arc::new(LogMailer)),
        }
    }

    /// Send `mail` on a background task. Failures are logged, never returned.
    pub fn dispatch(&self, mail: Mail) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            match mailer.send(&mail).await {
                Ok(()) => tracing::debug!(to = %mail.to, "Mail delivered"),
                Err(e) => tracing::error!(to = %mail.to, "Mail delivery failed: {}", e),
            }
        })
    }
}

//! Mail delivery through an HTTP webhook

use async_trait::async_trait;
use serde_json::json;

use super::{Mail, Mailer};
use crate::error::{Error, Result};

/// Posts each message as JSON to a mail relay endpoint
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
    from: String,
}

impl WebhookMailer {
    pub fn new(url: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        let payload = json!({
            "from": self.from,
            "to": mail.to,
            "subject": mail.subject,
            "text": mail.body,
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(Error::Mail(format!(
                "relay answered {} for {}",
                response.status(),
                mail.to
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;
    use tokio::sync::mpsc;

    /// Serve a relay on an ephemeral port and return its base URL
    async fn relay(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn mail() -> Mail {
        Mail {
            to: "g@x.com".to_string(),
            subject: "Booking confirmed".to_string(),
            body: "See you soon".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_json_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let router = Router::new()
            .route(
                "/send",
                post(
                    |State(tx): State<mpsc::UnboundedSender<Value>>, Json(body): Json<Value>| async move {
                        tx.send(body).ok();
                        StatusCode::ACCEPTED
                    },
                ),
            )
            .with_state(tx);
        let base = relay(router).await;

        let mailer = WebhookMailer::new(&format!("{}/send", base), "no-reply@shelter.guru");
        mailer.send(&mail()).await.expect("relay accepted the mail");

        let payload = rx.recv().await.unwrap();
        assert_eq!(
            payload,
            json!({
                "from": "no-reply@shelter.guru",
                "to": "g@x.com",
                "subject": "Booking confirmed",
                "text": "See you soon",
            })
        );
    }

    #[tokio::test]
    async fn test_relay_error_status_is_mail_error() {
        let router = Router::new().route("/send", post(|| async { StatusCode::BAD_GATEWAY }));
        let base = relay(router).await;

        let mailer = WebhookMailer::new(&format!("{}/send", base), "no-reply@shelter.guru");
        let result = mailer.send(&mail()).await;

        match result {
            Err(Error::Mail(message)) => assert!(message.contains("502")),
            other => panic!("expected a mail error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mailer = WebhookMailer::new(&format!("http://{}/send", addr), "no-reply@shelter.guru");
        assert!(matches!(mailer.send(&mail()).await, Err(Error::Http(_))));
    }
}

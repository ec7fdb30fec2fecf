use async_trait::async_trait;
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::MailDispatcher;
use crate::user::errors::MailError;

/// Mail dispatcher backed by the Resend HTTP API.
///
/// Without an API key the dispatcher stays constructed but disabled, and
/// every send is refused with [`MailError::Disabled`].
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    sender: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Self {
        let api_key = config
            .resend_api_key
            .clone()
            .filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            tracing::warn!("No Resend API key configured, outbound email is disabled");
        }

        Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: config.resend_endpoint.clone(),
            sender: format!("{} <{}>", config.from_name, config.from_email),
        }
    }
}

#[async_trait]
impl MailDispatcher for ResendMailer {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Email not sent, outbound email is disabled");
            return Err(MailError::Disabled);
        };

        let request = SendEmailRequest {
            from: &self.sender,
            to: [to.as_str()],
            subject,
            html: html_body,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MailError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("{}: {}", status, body)));
        }

        tracing::debug!(subject = %subject, "Email accepted by provider");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Json;
    use axum::Router;
    use serde_json::Value;
    use tokio::sync::Mutex;

    use super::*;

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_provider(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route(
                "/emails",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        captured.lock().await.push((auth, body));
                        status
                    },
                ),
            )
            .with_state(Arc::clone(&captured));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/emails", address), captured)
    }

    fn config(api_key: Option<&str>, endpoint: &str) -> EmailConfig {
        EmailConfig {
            resend_api_key: api_key.map(str::to_string),
            resend_endpoint: endpoint.to_string(),
            from_email: "noreply@troy.edu".to_string(),
            from_name: "Troy Accounts".to_string(),
            ..EmailConfig::default()
        }
    }

    fn recipient() -> EmailAddress {
        EmailAddress::new("jane@troy.edu".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_disabled_without_key() {
        for key in [None, Some(""), Some("   ")] {
            let mailer = ResendMailer::new(&config(key, "http://127.0.0.1:9/emails"));

            assert!(!mailer.is_enabled());
            assert!(matches!(
                mailer.send(&recipient(), "Hi", "<p>Hi</p>").await,
                Err(MailError::Disabled)
            ));
        }
    }

    #[tokio::test]
    async fn test_send_posts_message() {
        let (endpoint, captured) = spawn_provider(StatusCode::OK).await;
        let mailer = ResendMailer::new(&config(Some("re_test"), &endpoint));

        mailer
            .send(&recipient(), "Verify", "<p>Hello</p>")
            .await
            .unwrap();

        let captured = captured.lock().await;
        let (auth, body) = &captured[0];
        assert_eq!(auth.as_deref(), Some("Bearer re_test"));
        assert_eq!(body["from"], "Troy Accounts <noreply@troy.edu>");
        assert_eq!(body["to"], serde_json::json!(["jane@troy.edu"]));
        assert_eq!(body["subject"], "Verify");
        assert_eq!(body["html"], "<p>Hello</p>");
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let (endpoint, _) = spawn_provider(StatusCode::UNPROCESSABLE_ENTITY).await;
        let mailer = ResendMailer::new(&config(Some("re_test"), &endpoint));

        let result = mailer.send(&recipient(), "Verify", "<p>Hello</p>").await;
        assert!(matches!(result, Err(MailError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_send_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let mailer = ResendMailer::new(&config(
            Some("re_test"),
            &format!("http://{}/emails", address),
        ));

        let result = mailer.send(&recipient(), "Verify", "<p>Hello</p>").await;
        assert!(matches!(result, Err(MailError::ConnectionFailed(_))));
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use account_service::bootstrap::seed_accounts;
use account_service::config::SeedAccountConfig;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::Permissions;
use account_service::domain::user::ports::MailDispatcher;
use account_service::domain::user::service::AccountSettings;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use account_service::user::errors::MailError;
use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Duration;
use serde_json::json;
use serde_json::Value;
use tokio::sync::Mutex;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ADMIN_EMAIL: &str = "admin@troy.edu";
pub const ADMIN_PASSWORD: &str = "changethis";

/// Email captured instead of being delivered
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mail dispatcher that keeps every message in memory
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl MailDispatcher for RecordingMailer {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        self.sent.lock().await.push(SentEmail {
            to: to.as_str().to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let mailer = Arc::new(RecordingMailer::default());

        // Cheap Argon2 parameters keep the suite fast
        let hasher = PasswordHasher::with_params(1024, 1, 1).expect("Valid hasher params");
        let authenticator = Arc::new(Authenticator::with_hasher(JWT_SECRET, hasher));

        let settings = AccountSettings {
            allowed_email_suffix: "@troy.edu".to_string(),
            baseline_permissions: Permissions::from_iter(["document:read"]),
            access_token_ttl: Duration::minutes(30),
            verification_token_ttl: Duration::hours(48),
            server_host: address.clone(),
            project_name: "Troy Accounts".to_string(),
        };

        let user_service = Arc::new(UserService::new(
            repository,
            Arc::clone(&mailer),
            Arc::clone(&authenticator),
            settings,
        ));

        let seed = SeedAccountConfig {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            name: "Initial Superuser".to_string(),
            id_troy: "admin001".to_string(),
            role: "admin2".to_string(),
        };
        seed_accounts(user_service.as_ref(), &[seed])
            .await
            .expect("Failed to seed accounts");

        let router = create_router(user_service, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            mailer,
            tokens: TokenCodec::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register an account and return the response
    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/register")
            .json(&json!({
                "email": email,
                "password": password,
                "name": "Test Student",
                "major": "Computer Science",
                "class": "2026"
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in with the OAuth2 password form and return the response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/login/access-token")
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and extract the access token
    pub async fn access_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("No access token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.access_token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Wait for the verification email sent to `email` and return its token
    pub async fn verification_token(&self, email: &str) -> String {
        for _ in 0..100 {
            let sent = self.mailer.sent.lock().await;
            if let Some(message) = sent.iter().rev().find(|m| m.to == email) {
                return message
                    .html_body
                    .split("token=")
                    .nth(1)
                    .and_then(|rest| rest.split('"').next())
                    .expect("No token in verification email")
                    .to_string();
            }
            drop(sent);
            tokio::time::sleep(StdDuration::from_millis(20)).await;
        }
        panic!("No verification email sent to {}", email);
    }

    pub async fn sent_emails(&self) -> Vec<SentEmail> {
        self.mailer.sent.lock().await.clone()
    }

    pub async fn verify(&self, token: &str) -> reqwest::Response {
        self.get(&format!("/api/v1/verify-email?token={}", token))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register, verify and log in; returns the access token
    pub async fn verified_user_token(&self, email: &str, password: &str) -> String {
        let response = self.register(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let token = self.verification_token(email).await;
        let response = self.verify(&token).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        self.access_token(email, password).await
    }

    /// Fetch the caller's own account
    pub async fn me(&self, token: &str) -> Value {
        let response = self
            .get_authenticated("/api/v1/users/me", token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        response.json().await.expect("Failed to parse response")
    }
}

//! Login, registration and logout

use market_core::{AuthResponse, LoginRequest, MarketError, RegisterRequest, Session};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

impl ApiClient {
    /// Authenticate and store the resulting session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let value = self
            .post_json("users/login", &body)
            .await
            .map_err(auth_failure)?;
        let response: AuthResponse = serde_json::from_value(value)?;

        let session = response.into_session(&body.email)?;
        self.sessions.set(session.clone())?;
        self.cache.clear();

        tracing::info!(user_id = %session.user.id, role = session.user.role.as_str(), "Logged in");
        Ok(session)
    }

    /// Create an account. The user still has to log in afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let value = self
            .post_json("users/register", request)
            .await
            .map_err(auth_failure)?;
        let response: AuthResponse = serde_json::from_value(value)?;

        if response.user_id.is_none() {
            let message = if response.message.is_empty() {
                "Registration failed".to_string()
            } else {
                response.message
            };
            return Err(MarketError::Auth(message).into());
        }

        tracing::info!(user_id = ?response.user_id, "Registered");
        Ok(response)
    }

    /// Drop the session and every cached read
    pub fn logout(&self) -> Result<()> {
        self.sessions.clear()?;
        self.cache.clear();
        tracing::info!("Logged out");
        Ok(())
    }
}

/// Turn a rejected auth call into the backend's message when it sent one
fn auth_failure(err: ClientError) -> ClientError {
    let ClientError::Status { status, body } = &err else {
        return err;
    };

    let message = serde_json::from_str::<AuthResponse>(body)
        .ok()
        .map(|r| r.message)
        .filter(|m| !m.is_empty());

    match message {
        Some(message) => {
            tracing::warn!(status, %message, "Authentication rejected");
            MarketError::Auth(message).into()
        }
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use market_core::{SessionService, SessionState, UserRole};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        ApiClient::new(&config, SessionService::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .and(body_json(json!({ "email": "admin@example.com", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful",
                "userId": 1,
                "fullName": "Site Admin",
                "token": "jwt",
                "roles": ["ADMIN"]
            })))
            .mount(&server)
            .await;

        let api = client(&server);
        let mut changes = api.sessions().subscribe();
        let session = api.login(" admin@example.com ", "secret").await.unwrap();

        assert_eq!(session.user.role, UserRole::Admin);
        assert_eq!(session.user.name, "Site Admin");
        assert_eq!(api.sessions().token().as_deref(), Some("jwt"));
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let api = client(&server);
        match api.login("a@b.c", "wrong").await {
            Err(ClientError::Core(MarketError::Auth(message))) => {
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(api.sessions().get().is_none());
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "userId": 2 })))
            .mount(&server)
            .await;

        let api = client(&server);
        assert!(matches!(
            api.login("a@b.c", "pw").await,
            Err(ClientError::Core(MarketError::Auth(_)))
        ));
    }

    #[tokio::test]
    async fn test_register_requires_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/register"))
            .and(body_json(json!({
                "email": "new@example.com", "password": "pw", "fullName": "New User"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Email already exists"
            })))
            .mount(&server)
            .await;

        let api = client(&server);
        let request = RegisterRequest {
            email: "new@example.com".into(),
            password: "pw".into(),
            full_name: "New User".into(),
        };
        match api.register(&request).await {
            Err(ClientError::Core(MarketError::Auth(message))) => {
                assert_eq!(message, "Email already exists");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "userId": 3, "token": "jwt"
            })))
            .mount(&server)
            .await;

        let api = client(&server);
        api.login("owner@example.com", "pw").await.unwrap();
        api.logout().unwrap();

        assert!(api.sessions().get().is_none());
        assert_eq!(api.sessions().state(), SessionState::Anonymous);
    }
}

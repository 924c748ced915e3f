//! Integration tests for the login flow through an injected transport.

use std::sync::Arc;

use async_trait::async_trait;
use shield_auth::{
    AuthClient, AuthError, AuthStateMachine, AuthTransport, AuthUser, Credentials, LoginRequest,
    LoginResponse,
};

struct FakeAuthTransport;

#[async_trait]
impl AuthTransport for FakeAuthTransport {
    async fn authenticate(
        &self,
        _endpoint: &str,
        request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        if request.password == "wrong" {
            return Err(AuthError::Transport("Invalid login credentials".to_string()));
        }

        Ok(LoginResponse {
            access_token: format!("token-for-{}", request.email),
            expires_in: 60,
            user: AuthUser {
                id: "user-42".to_string(),
                email: Some(request.email.clone()),
            },
        })
    }
}

fn client() -> AuthClient {
    AuthClient::new(
        "https://project.test/auth/v1/token",
        Arc::new(FakeAuthTransport),
    )
    .expect("auth client should build")
}

#[tokio::test]
async fn login_flow_tests_session_expires_after_lifetime() {
    let token = client()
        .login(
            &Credentials {
                email: " someone@shield.test ".to_string(),
                password: "secret".to_string(),
            },
            1_000,
        )
        .await
        .expect("login should succeed");

    assert_eq!(token.user_id, "user-42");
    assert_eq!(token.access_token, "token-for-someone@shield.test");
    assert_eq!(token.expires_at_ms, 61_000);

    let mut machine = AuthStateMachine::new();
    machine.on_login_success(token);
    assert!(machine.can_invoke(60_999));
    assert!(!machine.can_invoke(61_000));
}

#[tokio::test]
async fn login_flow_tests_rejects_blank_credentials_before_transport() {
    let result = client()
        .login(
            &Credentials {
                email: "  ".to_string(),
                password: "secret".to_string(),
            },
            0,
        )
        .await;
    assert!(matches!(result, Err(AuthError::EmptyCredential)));
}

#[tokio::test]
async fn login_flow_tests_propagates_transport_rejection() {
    let result = client()
        .login(
            &Credentials {
                email: "someone@shield.test".to_string(),
                password: "wrong".to_string(),
            },
            0,
        )
        .await;
    assert!(matches!(result, Err(AuthError::Transport(_))));
}

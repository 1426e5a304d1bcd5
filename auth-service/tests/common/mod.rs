use std::sync::Arc;

use auth::JwtSigner;
use auth::PasswordHasher;
use auth_service::domain::auth::guard::AuthRegistry;
use auth_service::domain::auth::guard::GuardOption;
use auth_service::domain::auth::jwt_driver::JwtDriver;
use auth_service::domain::auth::providers::PasswordProvider;
use auth_service::domain::auth::service::AuthService;
use auth_service::domain::auth::token_service::TokenService;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::User;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryRefreshSessionStore;
use auth_service::outbound::repositories::InMemoryUserRepository;
use chrono::Duration;
use chrono::Utc;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const JWT_ISSUER: &str = "auth-service";
pub const JWT_AUDIENCE: &str = "dashboard";

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub users: Arc<InMemoryUserRepository>,
    pub refresh_sessions: Arc<InMemoryRefreshSessionStore>,
    hasher: PasswordHasher,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::new());
        let refresh_sessions = Arc::new(InMemoryRefreshSessionStore::new());
        let hasher = PasswordHasher::with_params(8, 1, 1).expect("Invalid hashing parameters");

        let user_service = Arc::new(UserService::new(Arc::clone(&users)));
        let token_service = Arc::new(TokenService::new(
            signer(),
            Arc::clone(&refresh_sessions),
            Duration::days(7),
        ));

        let registry = Arc::new(AuthRegistry::new());
        registry
            .extend(
                "jwt",
                GuardOption::new(
                    Arc::new(JwtDriver::new(token_service)),
                    Arc::new(PasswordProvider::new(
                        Arc::clone(&user_service),
                        hasher.clone(),
                    )),
                ),
            )
            .expect("Failed to register guard");
        registry
            .set_default_guard("jwt")
            .expect("Failed to set default guard");

        let router = create_router(Arc::new(AuthService::new(registry)), user_service);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            users,
            refresh_sessions,
            hasher,
        }
    }

    /// Register a user with the given credentials
    pub async fn seed_user(&self, email: &str, password: &str) -> User {
        let user = User {
            id: UserId::new(),
            name: "Test User".to_string(),
            email: EmailAddress::new(email.to_string()).expect("Invalid email"),
            password_hash: self.hasher.hash(password).expect("Failed to hash password"),
            created_at: Utc::now(),
        };
        self.users.insert(user.clone()).await;
        user
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
}

/// Signer sharing the server's key
pub fn signer() -> JwtSigner {
    JwtSigner::new(JWT_SECRET, JWT_ISSUER, JWT_AUDIENCE, Duration::minutes(15))
}

pub mod in_memory;
pub mod refresh_session;
pub mod user;

pub use in_memory::InMemoryRefreshSessionStore;
pub use in_memory::InMemoryUserRepository;
pub use refresh_session::PostgresRefreshSessionStore;
pub use user::PostgresUserRepository;

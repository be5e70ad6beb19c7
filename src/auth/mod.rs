//! Authentication and authorization module

pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{extract_token, SessionContext};
pub use password::PasswordHasher;
pub use session::{AlreadyAuthenticated, Identity, Session, SessionRegistry, Surface};

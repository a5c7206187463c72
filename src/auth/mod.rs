//! Identity: password hashing, token issuance and user records.

pub mod credentials;
pub mod password;
pub mod token;

pub use credentials::CredentialStore;
pub use password::PasswordHasher;
pub use token::{TokenError, TokenService};

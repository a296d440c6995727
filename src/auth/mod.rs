pub mod cache;
pub mod cognito;
pub mod error;
pub mod provider;
pub mod session;
pub mod store;

pub use cache::SessionCache;
pub use cognito::CognitoUserPool;
pub use error::AuthError;
pub use provider::{AuthOutcome, IdentityProvider, NewPasswordChallenge};
pub use session::AuthSession;
pub use store::AuthContext;

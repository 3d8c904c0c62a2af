//! Auth-domain models: strategies, credentials, endpoint targets, headers, and tokens.

pub mod credentials;
pub mod header;
pub mod secret;
pub mod target;
pub mod token;

pub use credentials::*;
pub use header::*;
pub use secret::*;
pub use target::*;
pub use token::*;

//! `Authorization` header values produced by token acquisition strategies.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret};

/// Authentication scheme carried by an [`AuthHeader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthScheme {
	/// RFC 7617 Basic credentials.
	Basic,
	/// RFC 6750 bearer token.
	Bearer,
}
impl AuthScheme {
	/// Returns the scheme token as written in the header.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Basic => "Basic",
			Self::Bearer => "Bearer",
		}
	}
}
impl Display for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Complete `Authorization` header value; formatting output never reveals the credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
	scheme: AuthScheme,
	credential: Secret,
}
impl AuthHeader {
	/// Builds a Basic header from `username:password`.
	pub fn basic(username: &str, password: &Secret) -> Self {
		let encoded = STANDARD.encode(format!("{username}:{}", password.expose()));

		Self { scheme: AuthScheme::Basic, credential: Secret::new(encoded) }
	}

	/// Wraps a bearer token.
	pub fn bearer(token: impl Into<Secret>) -> Self {
		Self { scheme: AuthScheme::Bearer, credential: token.into() }
	}

	/// Returns the header scheme.
	pub fn scheme(&self) -> AuthScheme {
		self.scheme
	}

	/// Returns the full header value (`<scheme> <credential>`). Callers must avoid logging it.
	pub fn expose(&self) -> String {
		format!("{} {}", self.scheme, self.credential.expose())
	}
}
impl Debug for AuthHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthHeader")
			.field("scheme", &self.scheme)
			.field("credential", &"<redacted>")
			.finish()
	}
}
impl Display for AuthHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} <redacted>", self.scheme)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn basic_header_encodes_username_and_password() {
		let header = AuthHeader::basic("alice", &Secret::new("open sesame"));

		assert_eq!(header.scheme(), AuthScheme::Basic);
		assert_eq!(header.expose(), "Basic YWxpY2U6b3BlbiBzZXNhbWU=");
	}

	#[test]
	fn header_formatters_redact() {
		let header = AuthHeader::bearer("eyJ0eXAi");

		assert_eq!(header.expose(), "Bearer eyJ0eXAi");
		assert_eq!(header.to_string(), "Bearer <redacted>");
		assert!(!format!("{header:?}").contains("eyJ0eXAi"));
	}
}

//! Access tokens with explicit issue and expiry instants.

// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, Secret},
};

/// Bearer token issued by the identity provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Token secret; callers must avoid logging it.
	pub secret: Secret,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Instant derived from `issued_at` plus `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token that expires `expires_in` after `issued_at`.
	pub fn new(secret: impl Into<Secret>, issued_at: OffsetDateTime, expires_in: Duration) -> Self {
		Self { secret: secret.into(), issued_at, expires_at: issued_at + expires_in }
	}

	/// Returns `true` once `instant` reaches the expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token has expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token expires within `window` of `instant`.
	pub fn expires_within(&self, window: Duration, instant: OffsetDateTime) -> bool {
		self.expires_at - instant <= window
	}

	/// Wraps the token as a bearer [`AuthHeader`].
	pub fn header(&self) -> AuthHeader {
		AuthHeader::bearer(self.secret.clone())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_is_relative_to_issue_instant() {
		let token = AccessToken::new(
			"secret",
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::minutes(60),
		);

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(
			token.expires_within(Duration::minutes(5), macros::datetime!(2025-01-01 00:56 UTC))
		);
		assert!(
			!token.expires_within(Duration::minutes(5), macros::datetime!(2025-01-01 00:30 UTC))
		);
		assert_eq!(token.header().expose(), "Bearer secret");
	}
}

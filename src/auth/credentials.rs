//! Authentication strategies and the credential union validated before any network call.

// self
use crate::{_prelude::*, auth::Secret, config::AuthTypeValue, error::ConfigError};

/// Authentication strategy selected once at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthStrategy {
	/// Static username/password credential header.
	Basic,
	/// OAuth 2.0 client-credentials exchange against the identity provider.
	OAuth,
}
impl AuthStrategy {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Basic => "Basic",
			Self::OAuth => "OAuth",
		}
	}

	/// Numeric code used by configuration files that store the strategy as an integer.
	pub const fn code(self) -> u64 {
		match self {
			Self::Basic => 1,
			Self::OAuth => 2,
		}
	}
}
impl Display for AuthStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthStrategy {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();

		match trimmed.to_ascii_lowercase().as_str() {
			"basic" | "1" => Ok(Self::Basic),
			"oauth" | "oauth2" | "2" => Ok(Self::OAuth),
			_ => Err(ConfigError::UnsupportedStrategy { value: trimmed.to_owned() }),
		}
	}
}
impl TryFrom<&AuthTypeValue> for AuthStrategy {
	type Error = ConfigError;

	fn try_from(value: &AuthTypeValue) -> Result<Self, Self::Error> {
		match value {
			AuthTypeValue::Name(name) => name.parse(),
			AuthTypeValue::Code(1) => Ok(Self::Basic),
			AuthTypeValue::Code(2) => Ok(Self::OAuth),
			AuthTypeValue::Code(other) =>
				Err(ConfigError::UnsupportedStrategy { value: other.to_string() }),
		}
	}
}

/// Credential union keyed by [`AuthStrategy`]; exactly one variant is ever populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
	/// Basic credentials.
	Basic {
		/// Account user name.
		username: String,
		/// Account password.
		password: Secret,
	},
	/// OAuth client-credentials.
	OAuth {
		/// Application (client) identifier.
		client_id: String,
		/// Client secret registered for the application.
		client_secret: Secret,
		/// Directory (tenant) identifier the application lives in.
		tenant_id: String,
	},
}
impl Credentials {
	/// Validates and builds Basic credentials.
	///
	/// Whitespace only counts against emptiness; the user name is kept exactly as given.
	pub fn basic(
		username: impl Into<String>,
		password: impl Into<Secret>,
	) -> Result<Self, ConfigError> {
		let username = username.into();
		let password = password.into();
		let mut missing = Vec::new();

		if username.trim().is_empty() {
			missing.push("username");
		}
		if password.is_empty() {
			missing.push("password");
		}

		ensure_present(AuthStrategy::Basic, missing)?;

		Ok(Self::Basic { username, password })
	}

	/// Validates and builds OAuth client-credentials.
	pub fn oauth(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
		tenant_id: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let client_secret = client_secret.into();
		let tenant_id = tenant_id.into();
		let mut missing = Vec::new();

		if client_id.trim().is_empty() {
			missing.push("clientId");
		}
		if client_secret.is_empty() {
			missing.push("clientSecret");
		}
		if tenant_id.trim().is_empty() {
			missing.push("tenantId");
		}

		ensure_present(AuthStrategy::OAuth, missing)?;

		Ok(Self::OAuth { client_id, client_secret, tenant_id })
	}

	/// Builds the credential variant matching `strategy` from optional configuration fields.
	///
	/// Absent fields are treated like empty ones so the error lists every missing field.
	pub fn from_fields(
		strategy: AuthStrategy,
		fields: CredentialFields<'_>,
	) -> Result<Self, ConfigError> {
		match strategy {
			AuthStrategy::Basic => Self::basic(
				fields.username.unwrap_or_default(),
				fields.password.unwrap_or_default(),
			),
			AuthStrategy::OAuth => Self::oauth(
				fields.client_id.unwrap_or_default(),
				fields.client_secret.unwrap_or_default(),
				fields.tenant_id.unwrap_or_default(),
			),
		}
	}

	/// Strategy this credential variant belongs to.
	pub fn strategy(&self) -> AuthStrategy {
		match self {
			Self::Basic { .. } => AuthStrategy::Basic,
			Self::OAuth { .. } => AuthStrategy::OAuth,
		}
	}
}

/// Borrowed, optional credential fields as they appear in configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct CredentialFields<'a> {
	/// Basic user name.
	pub username: Option<&'a str>,
	/// Basic password.
	pub password: Option<&'a str>,
	/// OAuth client identifier.
	pub client_id: Option<&'a str>,
	/// OAuth client secret.
	pub client_secret: Option<&'a str>,
	/// OAuth tenant identifier.
	pub tenant_id: Option<&'a str>,
}

fn ensure_present(strategy: AuthStrategy, missing: Vec<&'static str>) -> Result<(), ConfigError> {
	if missing.is_empty() {
		Ok(())
	} else {
		Err(ConfigError::MissingCredentialFields { strategy, fields: missing })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn strategy_parses_names_and_codes() {
		assert_eq!("Basic".parse::<AuthStrategy>().ok(), Some(AuthStrategy::Basic));
		assert_eq!(" oauth ".parse::<AuthStrategy>().ok(), Some(AuthStrategy::OAuth));
		assert_eq!(
			AuthStrategy::try_from(&AuthTypeValue::Code(2)).ok(),
			Some(AuthStrategy::OAuth)
		);
		assert!(matches!(
			AuthStrategy::try_from(&AuthTypeValue::Code(7)),
			Err(ConfigError::UnsupportedStrategy { value }) if value == "7"
		));
		assert!(matches!(
			"Kerberos".parse::<AuthStrategy>(),
			Err(ConfigError::UnsupportedStrategy { value }) if value == "Kerberos"
		));
	}

	#[test]
	fn basic_requires_username_and_password() {
		let err = Credentials::basic("  ", "").expect_err("Empty Basic fields should be rejected.");

		assert!(matches!(
			err,
			ConfigError::MissingCredentialFields { strategy: AuthStrategy::Basic, ref fields }
				if fields == &["username", "password"]
		));
	}

	#[test]
	fn values_are_kept_as_given() {
		let basic = Credentials::basic(" svc ", "p").expect("Padded user name should be accepted.");
		let oauth = Credentials::oauth(" app ", "secret", "tenant ")
			.expect("Padded identifiers should be accepted.");

		assert!(matches!(basic, Credentials::Basic { ref username, .. } if username == " svc "));
		assert!(matches!(
			oauth,
			Credentials::OAuth { ref client_id, ref tenant_id, .. }
				if client_id == " app " && tenant_id == "tenant "
		));
	}

	#[test]
	fn oauth_lists_every_missing_field() {
		let fields = CredentialFields { client_id: Some("app"), ..Default::default() };
		let err = Credentials::from_fields(AuthStrategy::OAuth, fields)
			.expect_err("Missing OAuth fields should be rejected.");

		assert!(matches!(
			err,
			ConfigError::MissingCredentialFields { strategy: AuthStrategy::OAuth, ref fields }
				if fields == &["clientSecret", "tenantId"]
		));
	}

	#[test]
	fn variant_matches_declared_strategy() {
		let fields = CredentialFields {
			username: Some("svc-user"),
			password: Some("P@ssw0rd"),
			client_id: Some("ignored"),
			..Default::default()
		};
		let credentials = Credentials::from_fields(AuthStrategy::Basic, fields)
			.expect("Basic credentials should build.");

		assert_eq!(credentials.strategy(), AuthStrategy::Basic);
		assert!(!format!("{credentials:?}").contains("P@ssw0rd"));
	}
}

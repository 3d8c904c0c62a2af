//! Configuration record consumed by the checker plus the JSON loader that produces it.
//!
//! Field names follow camelCase (`instanceUrl`, `authType`, `clientId`, ...) and also accept
//! the PascalCase spellings written by older tooling, including `Dynamics365InstanceUrl`.
//! `authType` may be a strategy name (`"Basic"`, `"OAuth"`) or its numeric code (`1`, `2`).

// std
use std::path::Path;
// self
use crate::{
	_prelude::*,
	auth::{AuthStrategy, CredentialFields, Credentials, EndpointTarget},
	error::ConfigError,
};

/// Raw `authType` value as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthTypeValue {
	/// Numeric strategy code.
	Code(u64),
	/// Strategy name.
	Name(String),
}
impl Display for AuthTypeValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Code(code) => write!(f, "{code}"),
			Self::Name(name) => f.write_str(name),
		}
	}
}
impl From<AuthStrategy> for AuthTypeValue {
	fn from(value: AuthStrategy) -> Self {
		Self::Name(value.as_str().to_owned())
	}
}

/// Configuration record describing the instance to probe and the credentials to use.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
	/// Dataverse instance root URL.
	#[serde(
		alias = "InstanceUrl",
		alias = "dynamics365InstanceUrl",
		alias = "Dynamics365InstanceUrl"
	)]
	pub instance_url: String,
	/// Selected authentication strategy.
	#[serde(default, alias = "AuthType")]
	pub auth_type: Option<AuthTypeValue>,
	/// Basic user name.
	#[serde(default, alias = "Username", alias = "UserName")]
	pub username: Option<String>,
	/// Basic password.
	#[serde(default, alias = "Password")]
	pub password: Option<String>,
	/// OAuth application (client) identifier.
	#[serde(default, alias = "ClientId")]
	pub client_id: Option<String>,
	/// OAuth client secret.
	#[serde(default, alias = "ClientSecret")]
	pub client_secret: Option<String>,
	/// OAuth directory (tenant) identifier.
	#[serde(default, alias = "TenantId")]
	pub tenant_id: Option<String>,
	/// Overrides the identity provider host.
	#[serde(default, alias = "AuthorityHost")]
	pub authority_host: Option<String>,
	/// Overrides the Web API version segment (e.g. `v9.2`).
	#[serde(default, alias = "ApiVersion")]
	pub api_version: Option<String>,
	/// Overrides the per-request timeout in seconds.
	#[serde(default, alias = "TimeoutSecs")]
	pub timeout_secs: Option<u64>,
}
impl Configuration {
	/// Starts a Basic configuration for `instance_url`.
	pub fn basic(
		instance_url: impl Into<String>,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self {
			auth_type: Some(AuthStrategy::Basic.into()),
			username: Some(username.into()),
			password: Some(password.into()),
			..Self::empty(instance_url)
		}
	}

	/// Starts an OAuth client-credentials configuration for `instance_url`.
	pub fn oauth(
		instance_url: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		tenant_id: impl Into<String>,
	) -> Self {
		Self {
			auth_type: Some(AuthStrategy::OAuth.into()),
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			tenant_id: Some(tenant_id.into()),
			..Self::empty(instance_url)
		}
	}

	/// Reads and parses a JSON configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

		Self::from_json_str(&json)
	}

	/// Parses a JSON configuration document, reporting the path of any malformed field.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(json);

		Ok(serde_path_to_error::deserialize(de)?)
	}

	/// Overrides the authentication type.
	pub fn with_auth_type(mut self, value: AuthTypeValue) -> Self {
		self.auth_type = Some(value);

		self
	}

	/// Overrides the identity provider host.
	pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
		self.authority_host = Some(host.into());

		self
	}

	/// Overrides the per-request timeout in seconds.
	pub fn with_timeout_secs(mut self, secs: u64) -> Self {
		self.timeout_secs = Some(secs);

		self
	}

	/// Resolves the declared strategy.
	pub fn strategy(&self) -> Result<AuthStrategy, ConfigError> {
		match &self.auth_type {
			Some(value) => AuthStrategy::try_from(value),
			None => Err(ConfigError::UnsupportedStrategy { value: "<missing>".into() }),
		}
	}

	/// Validates the record into an endpoint target and credential pair.
	///
	/// Checks run in order: strategy, credential fields, instance URL, timeout. Nothing here
	/// touches the network.
	pub fn resolve(&self) -> Result<ResolvedConfiguration, ConfigError> {
		let strategy = self.strategy()?;
		let credentials = Credentials::from_fields(strategy, CredentialFields {
			username: self.username.as_deref(),
			password: self.password.as_deref(),
			client_id: self.client_id.as_deref(),
			client_secret: self.client_secret.as_deref(),
			tenant_id: self.tenant_id.as_deref(),
		})?;
		let target = EndpointTarget::parse(&self.instance_url)?;

		if let Some(secs @ 0) = self.timeout_secs {
			return Err(ConfigError::InvalidTimeout { secs });
		}

		Ok(ResolvedConfiguration { target, credentials })
	}

	/// Layers this record's overrides on top of `base`.
	pub fn settings(&self, base: &CheckerSettings) -> CheckerSettings {
		let mut settings = base.clone();

		if let Some(host) = &self.authority_host {
			settings.authority_host = host.clone();
		}
		if let Some(version) = &self.api_version {
			settings.api_version = version.clone();
		}
		if let Some(secs) = self.timeout_secs {
			settings.timeout = StdDuration::from_secs(secs);
		}

		settings
	}

	fn empty(instance_url: impl Into<String>) -> Self {
		Self {
			instance_url: instance_url.into(),
			auth_type: None,
			username: None,
			password: None,
			client_id: None,
			client_secret: None,
			tenant_id: None,
			authority_host: None,
			api_version: None,
			timeout_secs: None,
		}
	}
}
impl Debug for Configuration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Configuration")
			.field("instance_url", &self.instance_url)
			.field("auth_type", &self.auth_type)
			.field("username", &self.username)
			.field("password_set", &self.password.is_some())
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("tenant_id", &self.tenant_id)
			.finish()
	}
}

/// Output of [`Configuration::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfiguration {
	/// Instance to probe.
	pub target: EndpointTarget,
	/// Validated credentials.
	pub credentials: Credentials,
}

/// Checker-wide knobs that are independent of any single credential set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckerSettings {
	/// Identity provider host; the tenant segment is appended to it.
	pub authority_host: String,
	/// Web API version segment used in probe paths.
	pub api_version: String,
	/// Deadline applied to every token request and probe.
	pub timeout: StdDuration,
}
impl CheckerSettings {
	/// Public Azure cloud authority.
	pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
	/// Web API version probed by default.
	pub const DEFAULT_API_VERSION: &str = "v9.1";
	/// Default per-request deadline.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Overrides the identity provider host.
	pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
		self.authority_host = host.into();

		self
	}

	/// Overrides the Web API version segment.
	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();

		self
	}

	/// Overrides the per-request deadline.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}
}
impl Default for CheckerSettings {
	fn default() -> Self {
		Self {
			authority_host: Self::DEFAULT_AUTHORITY_HOST.into(),
			api_version: Self::DEFAULT_API_VERSION.into(),
			timeout: Self::DEFAULT_TIMEOUT,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accepts_pascal_case_and_numeric_auth_type() {
		let config = Configuration::from_json_str(
			r#"{
				"Dynamics365InstanceUrl": "https://contoso.crm.dynamics.com",
				"AuthType": 2,
				"ClientId": "app-id",
				"ClientSecret": "app-secret",
				"TenantId": "contoso.onmicrosoft.com"
			}"#,
		)
		.expect("PascalCase configuration should parse.");

		assert_eq!(config.strategy().ok(), Some(AuthStrategy::OAuth));

		let resolved = config.resolve().expect("OAuth configuration should resolve.");

		assert_eq!(resolved.target.as_str(), "https://contoso.crm.dynamics.com");
		assert_eq!(resolved.credentials.strategy(), AuthStrategy::OAuth);
	}

	#[test]
	fn accepts_camel_case_and_named_auth_type() {
		let config = Configuration::from_json_str(
			r#"{"instanceUrl":"https://contoso.crm.dynamics.com","authType":"Basic","username":"svc","password":"pw","timeoutSecs":5}"#,
		)
		.expect("camelCase configuration should parse.");
		let settings = config.settings(&CheckerSettings::default());

		assert_eq!(config.strategy().ok(), Some(AuthStrategy::Basic));
		assert_eq!(settings.timeout, StdDuration::from_secs(5));
		assert_eq!(settings.api_version, CheckerSettings::DEFAULT_API_VERSION);
	}

	#[test]
	fn malformed_field_reports_its_path() {
		let err = Configuration::from_json_str(
			r#"{"instanceUrl":"https://contoso.crm.dynamics.com","authType":"OAuth","timeoutSecs":"soon"}"#,
		)
		.expect_err("A string timeout should be rejected.");

		match err {
			ConfigError::Parse(inner) => assert_eq!(inner.path().to_string(), "timeoutSecs"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn resolve_checks_strategy_before_fields() {
		let config = Configuration::basic("https://contoso.crm.dynamics.com", "", "")
			.with_auth_type(AuthTypeValue::Name("NTLM".into()));

		assert!(matches!(
			config.resolve(),
			Err(ConfigError::UnsupportedStrategy { value }) if value == "NTLM"
		));

		let missing = Configuration::from_json_str(r#"{"instanceUrl":"https://x.example.com"}"#)
			.expect("Configuration without authType should still parse.");

		assert!(matches!(missing.resolve(), Err(ConfigError::UnsupportedStrategy { .. })));
	}

	#[test]
	fn zero_timeout_is_rejected() {
		let config = Configuration::basic("https://contoso.crm.dynamics.com", "svc", "pw")
			.with_timeout_secs(0);

		assert!(matches!(config.resolve(), Err(ConfigError::InvalidTimeout { secs: 0 })));
		assert!(config.with_timeout_secs(1).resolve().is_ok());
	}

	#[test]
	fn debug_output_hides_secrets() {
		let config = Configuration::oauth("https://x.example.com", "app", "top-secret", "tenant");

		assert!(!format!("{config:?}").contains("top-secret"));
	}
}

//! Web API root that probes and OAuth scopes are derived from.

// self
use crate::{_prelude::*, error::ConfigError};

/// Dataverse instance root (e.g. `https://contoso.crm.dynamics.com`).
///
/// Paths are appended to the configured value verbatim apart from trimming trailing slashes,
/// so an instance hosted under a path prefix keeps that prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointTarget {
	base_url: Url,
	raw: String,
}
impl EndpointTarget {
	/// Parses and validates an absolute `http`/`https` URL.
	pub fn parse(value: impl AsRef<str>) -> Result<Self, ConfigError> {
		let raw = value.as_ref().trim();
		let base_url =
			Url::parse(raw).map_err(|e| ConfigError::invalid_endpoint("instance", raw, e))?;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::invalid_endpoint(
				"instance",
				raw,
				format_args!("scheme `{}` is not http or https", base_url.scheme()),
			));
		}
		if base_url.host_str().is_none() {
			return Err(ConfigError::invalid_endpoint("instance", raw, "a host is required"));
		}

		Ok(Self { base_url, raw: raw.trim_end_matches('/').to_owned() })
	}

	/// Parsed base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Base URL without trailing slashes, as configured.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Appends `path` (with or without a leading slash) to the base URL.
	pub fn join(&self, path: &str) -> Result<Url, ConfigError> {
		let joined = format!("{}/{}", self.raw, path.trim_start_matches('/'));

		Url::parse(&joined).map_err(|e| ConfigError::invalid_endpoint("request", joined, e))
	}

	/// OAuth scope granting app-only access to this instance (`<base>/.default`).
	pub fn default_scope(&self) -> String {
		format!("{}/.default", self.raw)
	}
}
impl Display for EndpointTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.raw)
	}
}
impl FromStr for EndpointTarget {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl TryFrom<String> for EndpointTarget {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}
impl From<EndpointTarget> for String {
	fn from(value: EndpointTarget) -> Self {
		value.raw
	}
}

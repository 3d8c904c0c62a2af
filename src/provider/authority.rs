// self
use crate::{_prelude::*, error::ConfigError};

/// Tenant-scoped Microsoft identity platform authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authority {
	url: Url,
}
impl Authority {
	/// Builds `<host>/<tenant>/`, percent-encoding the tenant as a single path segment.
	pub fn new(host: &str, tenant_id: &str) -> Result<Self, ConfigError> {
		let mut url = Url::parse(host.trim())
			.map_err(|e| ConfigError::invalid_endpoint("authority", host, e))?;

		if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
			return Err(ConfigError::invalid_endpoint(
				"authority",
				host,
				"an absolute http(s) URL is required",
			));
		}

		url.path_segments_mut()
			.map_err(|_| ConfigError::invalid_endpoint("authority", host, "URL cannot be a base"))?
			.pop_if_empty()
			.push(tenant_id)
			.push("");

		Ok(Self { url })
	}

	/// Authority URL with a trailing slash (e.g. `https://login.microsoftonline.com/contoso/`).
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// OAuth 2.0 v2 token endpoint for the tenant.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.url
			.join("oauth2/v2.0/token")
			.map_err(|e| ConfigError::invalid_endpoint("token", self.url.as_str(), e))
	}
}
impl Display for Authority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.url.as_str())
	}
}

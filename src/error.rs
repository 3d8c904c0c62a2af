//! Checker-level error types shared across configuration, strategies, and probes.

// self
use crate::{_prelude::*, auth::AuthStrategy, provider::ErrorKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical checker error exposed by public APIs.
///
/// Every variant reduces to an [`ErrorKind`] through [`Error::kind`], which is what
/// [`AuthResult`](crate::checker::AuthResult) reports to callers.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before any network call.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint answered with an unusable success payload.
	#[error(transparent)]
	TokenResponse(#[from] TokenResponseError),

	/// Identity provider rejected the token request.
	#[error("{}", provider_message(kind, description.as_deref(), *status))]
	Provider {
		/// Classified provider error code.
		kind: ErrorKind,
		/// Provider-supplied `error_description`, when present.
		description: Option<String>,
		/// HTTP status code of the rejection, when known.
		status: Option<u16>,
	},
	/// Operation exceeded the configured deadline.
	#[error("The {operation} did not complete within {}s.", after.as_secs_f32())]
	TimedOut {
		/// Operation label (e.g. "token request").
		operation: &'static str,
		/// Deadline that elapsed.
		after: StdDuration,
	},
	/// Operation was cancelled by the caller.
	#[error("The {operation} was cancelled.")]
	Cancelled {
		/// Operation label (e.g. "identity probe").
		operation: &'static str,
	},
}
impl Error {
	/// Reduces the error to the user-facing [`ErrorKind`] taxonomy.
	///
	/// Failures that are not explicitly enumerated become [`ErrorKind::Unknown`] carrying the
	/// full error chain so no diagnostic detail is lost.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Provider { kind, .. } => kind.clone(),
			Self::Config(ConfigError::MissingCredentialFields { fields, .. }) =>
				ErrorKind::MissingCredentialFields(fields.clone()),
			Self::Config(ConfigError::UnsupportedStrategy { value }) =>
				ErrorKind::UnsupportedStrategy(value.clone()),
			Self::Config(err @ ConfigError::InvalidEndpoint { .. }) =>
				ErrorKind::InvalidEndpoint(chain_message(err)),
			other => ErrorKind::Unknown(chain_message(other)),
		}
	}
}

/// Configuration and validation failures raised before any network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration file could not be read.
	#[error("Configuration file `{path}` could not be read.")]
	Read {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration JSON could not be deserialized.
	#[error("Configuration is malformed at `{}`.", .0.path())]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// The `authType` value names no known strategy.
	#[error("Unsupported authentication type `{value}`.")]
	UnsupportedStrategy {
		/// Raw configured value.
		value: String,
	},
	/// Required credential fields are missing or empty.
	#[error("{strategy} authentication requires {}.", fields.join(", "))]
	MissingCredentialFields {
		/// Strategy whose requirements were not met.
		strategy: AuthStrategy,
		/// Configuration field names that were missing or empty.
		fields: Vec<&'static str>,
	},
	/// The instance or authority URL is not a usable absolute URL.
	#[error("The {name} URL `{url}` is invalid: {reason}.")]
	InvalidEndpoint {
		/// Which URL failed validation.
		name: &'static str,
		/// Offending value.
		url: String,
		/// Human-readable reason.
		reason: String,
	},
	/// The configured per-request timeout cannot complete any call.
	#[error("`timeoutSecs` must be at least 1 second, got {secs}.")]
	InvalidTimeout {
		/// Configured value.
		secs: u64,
	},
	/// Entity logical name contains characters the Web API does not allow.
	#[error("Entity name `{name}` must match [a-z0-9_]+.")]
	InvalidEntityName {
		/// Offending entity name.
		name: String,
	},
	/// Entity operation label is not recognized.
	#[error("Unsupported entity operation `{value}`.")]
	UnsupportedOperation {
		/// Raw operation label.
		value: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_endpoint(
		name: &'static str,
		url: impl Into<String>,
		reason: impl Display,
	) -> Self {
		Self::InvalidEndpoint { name, url: url.into(), reason: reason.to_string() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint returned HTTP success with a payload the checker cannot use.
#[derive(Debug, ThisError)]
pub enum TokenResponseError {
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned something `oauth2` could not interpret.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Endpoint label (token endpoint, Web API).
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
	/// HTTP client failed without a structured error.
	#[error("HTTP client error occurred while calling {target}: {message}.")]
	Other {
		/// Endpoint label (token endpoint, Web API).
		target: &'static str,
		/// Client-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		target: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target, source: Box::new(src) }
	}
}

/// Joins an error with all of its sources into a single line.
pub fn chain_message(err: &(dyn StdError + 'static)) -> String {
	let mut message = err.to_string();
	let mut source = err.source();

	while let Some(inner) = source {
		let text = inner.to_string();

		if !message.contains(&text) {
			message.truncate(message.trim_end_matches('.').len());
			message.push_str(": ");
			message.push_str(&text);
		}

		source = inner.source();
	}

	message
}

fn provider_message(kind: &ErrorKind, description: Option<&str>, status: Option<u16>) -> String {
	let mut message = kind.explanation().into_owned();

	if let Some(status) = status {
		message.push_str(&format!(" (HTTP {status})"));
	}
	if let Some(description) = description {
		message.push_str(" Provider said: ");
		message.push_str(description.trim());
	}

	message
}

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Why a credential check failed.
///
/// The provider-derived variants mirror the OAuth 2.0 / Microsoft identity platform `error`
/// codes. `MissingCredentialFields`, `UnsupportedStrategy`, and `InvalidEndpoint` are raised
/// locally before any network call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
	/// Client authentication failed (`invalid_client`).
	InvalidClient,
	/// Client may not use this grant (`unauthorized_client`).
	UnauthorizedClient,
	/// Grant is invalid or expired (`invalid_grant`).
	InvalidGrant,
	/// Request is malformed (`invalid_request`).
	InvalidRequest,
	/// Requested scope is invalid (`invalid_scope`).
	InvalidScope,
	/// Resource owner or server denied the request (`access_denied`).
	AccessDenied,
	/// Response type is not supported (`unsupported_response_type`).
	UnsupportedResponseType,
	/// Authorization server failed (`server_error`).
	ServerError,
	/// Authorization server is overloaded or down (`temporarily_unavailable`).
	TemporarilyUnavailable,
	/// User interaction is required (`interaction_required`).
	InteractionRequired,
	/// Token has expired (`expired_token`).
	ExpiredToken,
	/// Anything not enumerated above; carries the raw code or message.
	Unknown(String),
	/// Required credential fields were missing or empty.
	MissingCredentialFields(Vec<&'static str>),
	/// Configured authentication type names no known strategy.
	UnsupportedStrategy(String),
	/// Instance or authority URL is unusable.
	InvalidEndpoint(String),
}
impl ErrorKind {
	/// Returns the OAuth `error` code for provider-derived kinds.
	pub const fn code(&self) -> Option<&'static str> {
		Some(match self {
			Self::InvalidClient => "invalid_client",
			Self::UnauthorizedClient => "unauthorized_client",
			Self::InvalidGrant => "invalid_grant",
			Self::InvalidRequest => "invalid_request",
			Self::InvalidScope => "invalid_scope",
			Self::AccessDenied => "access_denied",
			Self::UnsupportedResponseType => "unsupported_response_type",
			Self::ServerError => "server_error",
			Self::TemporarilyUnavailable => "temporarily_unavailable",
			Self::InteractionRequired => "interaction_required",
			Self::ExpiredToken => "expired_token",
			Self::Unknown(_)
			| Self::MissingCredentialFields(_)
			| Self::UnsupportedStrategy(_)
			| Self::InvalidEndpoint(_) => return None,
		})
	}

	/// Returns `true` for kinds detected before any network call.
	pub const fn is_precondition(&self) -> bool {
		matches!(
			self,
			Self::MissingCredentialFields(_) | Self::UnsupportedStrategy(_) | Self::InvalidEndpoint(_)
		)
	}

	/// Canned, actionable explanation for this kind.
	pub fn explanation(&self) -> Cow<'static, str> {
		Cow::Borrowed(match self {
			Self::InvalidClient =>
				"The client ID or secret is incorrect. Please verify your client ID and secret.",
			Self::UnauthorizedClient =>
				"The client does not have permission to perform this action. Please check your app permissions in Azure.",
			Self::InvalidGrant =>
				"The provided grant is invalid or expired. This could be due to an expired refresh token or an invalid authorization code.",
			Self::InvalidRequest =>
				"The request is missing a required parameter, includes an unsupported parameter or parameter value, or is otherwise malformed.",
			Self::InvalidScope =>
				"The requested scope is invalid, unknown, or malformed. Please verify the requested scopes.",
			Self::AccessDenied =>
				"The resource owner or authorization server denied the request. This may be due to lack of consent or insufficient permissions.",
			Self::UnsupportedResponseType =>
				"The authorization server does not support obtaining an authorization code using this method.",
			Self::ServerError =>
				"The authorization server encountered an unexpected condition. Please try again later.",
			Self::TemporarilyUnavailable =>
				"The authorization server is temporarily unavailable. Please try again later.",
			Self::InteractionRequired =>
				"The request requires user interaction. Please ensure the user is prompted for consent or login.",
			Self::ExpiredToken => "The token has expired. A new token is required.",
			Self::Unknown(message) => return Cow::Owned(format!("An error occurred: {message}")),
			Self::MissingCredentialFields(fields) =>
				return Cow::Owned(format!("Missing required credential fields: {}.", fields.join(", "))),
			Self::UnsupportedStrategy(value) =>
				return Cow::Owned(format!("Unsupported authentication type `{value}`.")),
			Self::InvalidEndpoint(message) => return Cow::Owned(message.clone()),
		})
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.explanation())
	}
}

/// Maps an OAuth `error` code to its [`ErrorKind`].
///
/// Total and deterministic: matching ignores ASCII case and surrounding whitespace, and any
/// unrecognized code yields [`ErrorKind::Unknown`] holding the code exactly as given.
pub fn classify(code: &str) -> ErrorKind {
	match code.trim().to_ascii_lowercase().as_str() {
		"invalid_client" => ErrorKind::InvalidClient,
		"unauthorized_client" => ErrorKind::UnauthorizedClient,
		"invalid_grant" => ErrorKind::InvalidGrant,
		"invalid_request" => ErrorKind::InvalidRequest,
		"invalid_scope" => ErrorKind::InvalidScope,
		"access_denied" => ErrorKind::AccessDenied,
		"unsupported_response_type" => ErrorKind::UnsupportedResponseType,
		"server_error" => ErrorKind::ServerError,
		"temporarily_unavailable" => ErrorKind::TemporarilyUnavailable,
		"interaction_required" => ErrorKind::InteractionRequired,
		"expired_token" => ErrorKind::ExpiredToken,
		_ => ErrorKind::Unknown(code.to_owned()),
	}
}

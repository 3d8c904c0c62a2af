//! OAuth client-credentials facade over the `oauth2` crate plus transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Secret},
	error::{ConfigError, TokenResponseError, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	provider::{Authority, classify},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Which remote endpoint a failing call was addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallTarget {
	/// Identity provider token endpoint.
	TokenEndpoint,
	/// Dataverse Web API.
	WebApi,
}
impl CallTarget {
	/// Human-readable label used in error messages.
	pub const fn label(self) -> &'static str {
		match self {
			Self::TokenEndpoint => "the token endpoint",
			Self::WebApi => "the Web API",
		}
	}
}
impl Display for CallTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}

/// Maps HTTP transport failures into checker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a checker error.
	fn map_transport_error(
		&self,
		target: CallTarget,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		target: CallTarget,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(target, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Other { target: target.label(), message }.into(),
			_ => TransportError::Other {
				target: target.label(),
				message: "unrecognized HTTP client failure".into(),
			}
			.into(),
		}
	}
}

/// Client-credentials token exchange for one application registration.
pub(crate) struct ClientCredentialsFacade<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> ClientCredentialsFacade<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a client that posts `client_id`/`client_secret` in the form body, as the
	/// Microsoft identity platform expects for confidential clients.
	pub(crate) fn new(
		authority: &Authority,
		client_id: &str,
		client_secret: &Secret,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let endpoint = authority.token_endpoint()?;
		let token_url = TokenUrl::new(endpoint.to_string())
			.map_err(|e| ConfigError::invalid_endpoint("token", endpoint.as_str(), e))?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Requests an app-only token for `scope`.
	pub(crate) fn exchange<'a>(&'a self, scope: &'a str) -> FacadeFuture<'a, AccessToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let response = self
				.oauth_client
				.exchange_client_credentials()
				.add_scope(Scope::new(scope.to_owned()))
				.request_async(&instrumented)
				.await
				.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

			map_token_response(response)
		})
	}
}
#[cfg(feature = "reqwest")]
impl ClientCredentialsFacade<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	#[cfg(test)]
	fn with_default_transport(
		authority: &Authority,
		client_id: &str,
		secret: &Secret,
	) -> Result<Self> {
		Self::new(
			authority,
			client_id,
			secret,
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<AccessToken> {
	let expires_in = response.expires_in().ok_or(TokenResponseError::MissingExpiresIn)?.as_secs();
	let expires_in =
		i64::try_from(expires_in).map_err(|_| TokenResponseError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(TokenResponseError::NonPositiveExpiresIn.into());
	}

	Ok(AccessToken::new(
		response.access_token().secret().to_owned(),
		OffsetDateTime::now_utc(),
		Duration::seconds(expires_in),
	))
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(CallTarget::TokenEndpoint, meta.as_ref(), error),
		RequestTokenError::Parse(source, _body) =>
			TokenResponseError::Parse { source, status }.into(),
		RequestTokenError::Other(message) =>
			TokenResponseError::Unexpected { message, status }.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	Error::Provider {
		kind: classify(response.error().as_ref()),
		description: response.error_description().cloned(),
		status,
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(target: CallTarget, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::network(target.label(), err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::ErrorKind;

	#[test]
	fn builds_client_for_tenant_authority() {
		let authority = Authority::new("https://login.microsoftonline.com", "contoso")
			.expect("Authority fixture should build.");
		let facade = ClientCredentialsFacade::with_default_transport(
			&authority,
			"client-id",
			&Secret::new("secret"),
		);

		assert!(facade.is_ok());
	}

	#[test]
	fn server_rejections_are_classified() {
		let response: BasicErrorResponse = serde_json::from_str(
			r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided.","error_codes":[7000215]}"#,
		)
		.expect("Error response fixture should parse.");
		let err = map_server_response_error(response, Some(401));

		assert_eq!(err.kind(), ErrorKind::InvalidClient);
		assert!(matches!(err, Error::Provider { status: Some(401), description: Some(_), .. }));
	}

	#[test]
	fn extension_codes_are_classified() {
		let response: BasicErrorResponse =
			serde_json::from_str(r#"{"error":"interaction_required"}"#)
				.expect("Error response fixture should parse.");

		assert_eq!(map_server_response_error(response, None).kind(), ErrorKind::InteractionRequired);
	}

	#[test]
	fn token_response_requires_positive_expiry() {
		let missing: BasicTokenResponse =
			serde_json::from_str(r#"{"access_token":"t","token_type":"Bearer"}"#)
				.expect("Token response fixture should parse.");

		assert!(matches!(
			map_token_response(missing),
			Err(Error::TokenResponse(TokenResponseError::MissingExpiresIn))
		));

		let valid: BasicTokenResponse = serde_json::from_str(
			r#"{"access_token":"t","token_type":"Bearer","expires_in":3599,"ext_expires_in":3599}"#,
		)
		.expect("Token response fixture should parse.");
		let token = map_token_response(valid).expect("Valid token response should map.");

		assert_eq!(token.secret.expose(), "t");
		assert_eq!(token.expires_at - token.issued_at, Duration::seconds(3599));
	}
}

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthStrategy, EndpointTarget, Secret},
	http::HttpTransport,
	oauth::{ClientCredentialsFacade, TransportErrorMapper},
	provider::Authority,
	strategy::{AcquireFuture, TokenAcquisition},
};

/// OAuth 2.0 client-credentials exchange against the tenant's token endpoint.
pub struct OAuthStrategy<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	facade: ClientCredentialsFacade<C, M>,
	authority: Authority,
	scope: String,
}
impl<C, M> OAuthStrategy<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Binds the application registration to `<authority_host>/<tenant_id>` and requests the
	/// `<instanceUrl>/.default` scope.
	pub fn new(
		target: &EndpointTarget,
		authority_host: &str,
		client_id: &str,
		client_secret: &Secret,
		tenant_id: &str,
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
	) -> Result<Self> {
		let authority = Authority::new(authority_host, tenant_id)?;
		let facade = ClientCredentialsFacade::new(
			&authority,
			client_id,
			client_secret,
			http_client,
			transport_mapper,
		)?;

		Ok(Self { facade, authority, scope: target.default_scope() })
	}

	/// Tenant authority tokens are requested from.
	pub fn authority(&self) -> &Authority {
		&self.authority
	}

	/// Scope sent with every token request.
	pub fn scope(&self) -> &str {
		&self.scope
	}

	/// Performs the exchange and returns the token with its expiry.
	pub async fn acquire_token(&self) -> Result<AccessToken> {
		self.facade.exchange(&self.scope).await
	}
}
impl<C, M> TokenAcquisition for OAuthStrategy<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn strategy(&self) -> AuthStrategy {
		AuthStrategy::OAuth
	}

	fn acquire(&self) -> AcquireFuture<'_> {
		Box::pin(async move { Ok(self.acquire_token().await?.header()) })
	}
}
impl<C, M> Debug for OAuthStrategy<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthStrategy")
			.field("authority", &self.authority.url().as_str())
			.field("scope", &self.scope)
			.finish()
	}
}

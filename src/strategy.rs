//! Token acquisition strategies.
//!
//! A strategy has exactly one job: produce an [`AuthHeader`] for the configured credentials or
//! fail with a checker [`Error`] that reduces to an
//! [`ErrorKind`](crate::provider::ErrorKind). The checker never inspects which strategy it
//! holds; it awaits [`TokenAcquisition::acquire`] and then probes with the header.

mod basic;
mod oauth;

pub use basic::BasicStrategy;
pub use oauth::OAuthStrategy;

// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, AuthStrategy, Credentials, EndpointTarget},
	http::HttpTransport,
	oauth::TransportErrorMapper,
};

/// Boxed future returned by [`TokenAcquisition::acquire`].
pub type AcquireFuture<'a> = Pin<Box<dyn Future<Output = Result<AuthHeader>> + 'a + Send>>;

/// Capability shared by every authentication strategy.
///
/// Implementors are `Send + Sync` so a single strategy can serve concurrent probes.
pub trait TokenAcquisition: Send + Sync {
	/// Strategy this implementation realizes.
	fn strategy(&self) -> AuthStrategy;

	/// Produces an authorization header or a classified failure.
	fn acquire(&self) -> AcquireFuture<'_>;
}

/// Builds the strategy matching `credentials`.
///
/// Basic credentials never touch the transport. OAuth credentials bind the token endpoint for
/// `authority_host` and the `.default` scope of `target`.
pub fn select<C, M>(
	credentials: &Credentials,
	target: &EndpointTarget,
	authority_host: &str,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
) -> Result<Box<dyn TokenAcquisition>>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	Ok(match credentials {
		Credentials::Basic { username, password } =>
			Box::new(BasicStrategy::new(username, password)),
		Credentials::OAuth { client_id, client_secret, tenant_id } =>
			Box::new(OAuthStrategy::new(
				target,
				authority_host,
				client_id,
				client_secret,
				tenant_id,
				http_client,
				transport_mapper,
			)?),
	})
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::Secret, http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper,
		provider::ErrorKind,
	};

	fn target() -> EndpointTarget {
		EndpointTarget::parse("https://contoso.crm.dynamics.com")
			.expect("Instance URL should be valid.")
	}

	fn pick(credentials: &Credentials, authority_host: &str) -> Result<Box<dyn TokenAcquisition>> {
		select(
			credentials,
			&target(),
			authority_host,
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	#[test]
	fn credentials_pick_their_strategy() {
		let basic = Credentials::Basic {
			username: "svc-user".into(),
			password: Secret::new("P@ssw0rd"),
		};
		let oauth = Credentials::OAuth {
			client_id: "app".into(),
			client_secret: Secret::new("secret"),
			tenant_id: "contoso".into(),
		};

		assert_eq!(
			pick(&basic, "https://login.microsoftonline.com")
				.expect("Basic selection should succeed.")
				.strategy(),
			AuthStrategy::Basic
		);
		assert_eq!(
			pick(&oauth, "https://login.microsoftonline.com")
				.expect("OAuth selection should succeed.")
				.strategy(),
			AuthStrategy::OAuth
		);

		let err = pick(&oauth, "not a url").err().expect("Malformed authority should be rejected.");

		assert!(matches!(err.kind(), ErrorKind::InvalidEndpoint(_)));
	}
}

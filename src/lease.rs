//! In-process lease over one OAuth client-credentials token.
//!
//! [`TokenLease`] keeps the most recent [`AccessToken`] with its explicit expiry and hands out
//! bearer headers until the token enters the refresh window, at which point the next caller
//! performs a new exchange. Exchanges are serialized by an async mutex so one lease never issues
//! overlapping token requests; the cached token sits behind a separate lock that is never held
//! across a request. Every exchange observes the lease's deadline and cancellation token.
//! Nothing is persisted.

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthHeader, AuthStrategy, Credentials},
	checker::{self, Checker},
	config::{CheckerSettings, Configuration, ResolvedConfiguration},
	error::ConfigError,
	http::HttpTransport,
	oauth::TransportErrorMapper,
	strategy::{AcquireFuture, OAuthStrategy, TokenAcquisition},
};

/// Cached client-credentials token with an explicit refresh trigger.
pub struct TokenLease<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	strategy: OAuthStrategy<C, M>,
	current: Mutex<Option<AccessToken>>,
	exchange: AsyncMutex<()>,
	refresh_window: Duration,
	timeout: StdDuration,
	cancel: CancellationToken,
}
impl<C, M> TokenLease<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Tokens expiring within this window are replaced before use.
	pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::seconds(60);

	/// Creates an empty lease; the first call to [`TokenLease::token`] performs the exchange.
	pub fn new(strategy: OAuthStrategy<C, M>) -> Self {
		Self {
			strategy,
			current: Mutex::new(None),
			exchange: AsyncMutex::new(()),
			refresh_window: Self::DEFAULT_REFRESH_WINDOW,
			timeout: CheckerSettings::DEFAULT_TIMEOUT,
			cancel: CancellationToken::new(),
		}
	}

	/// Overrides the refresh window (negative values clamp to zero).
	pub fn with_refresh_window(mut self, window: Duration) -> Self {
		self.refresh_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Overrides the deadline applied to each token exchange.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Attaches a cancellation token observed by every token exchange.
	pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;

		self
	}

	/// Strategy backing the lease.
	pub fn oauth_strategy(&self) -> &OAuthStrategy<C, M> {
		&self.strategy
	}

	/// Returns the cached token, exchanging a new one if none is held or it is about to expire.
	pub async fn token(&self) -> Result<AccessToken> {
		if let Some(token) = self.fresh() {
			return Ok(token);
		}

		let _exchange = self.exchange.lock().await;

		// A queued caller may find the token its predecessor just stored.
		if let Some(token) = self.fresh() {
			return Ok(token);
		}

		self.exchange_and_store().await
	}

	/// Bearer header for the current token.
	pub async fn header(&self) -> Result<AuthHeader> {
		Ok(self.token().await?.header())
	}

	/// Forces a new exchange regardless of the cached token's expiry.
	///
	/// On failure the previous token is kept so callers can still use it until it expires.
	pub async fn refresh(&self) -> Result<AccessToken> {
		let _exchange = self.exchange.lock().await;

		self.exchange_and_store().await
	}

	/// Snapshot of the cached token, if any, without contacting the provider.
	pub fn current(&self) -> Option<AccessToken> {
		self.current.lock().clone()
	}

	/// Drops the cached token.
	pub fn invalidate(&self) {
		self.current.lock().take();
	}

	fn fresh(&self) -> Option<AccessToken> {
		let now = OffsetDateTime::now_utc();

		self.current.lock().clone().filter(|token| !token.expires_within(self.refresh_window, now))
	}

	async fn exchange_and_store(&self) -> Result<AccessToken> {
		let exchange = self.strategy.acquire_token();
		let fresh = checker::bounded(&self.cancel, self.timeout, "token request", exchange).await?;

		*self.current.lock() = Some(fresh.clone());

		Ok(fresh)
	}
}
impl<C, M> TokenAcquisition for TokenLease<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn strategy(&self) -> AuthStrategy {
		AuthStrategy::OAuth
	}

	fn acquire(&self) -> AcquireFuture<'_> {
		Box::pin(self.header())
	}
}
impl<C, M> Debug for TokenLease<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenLease")
			.field("strategy", &self.strategy)
			.field("refresh_window", &self.refresh_window)
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl<C, M> Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a [`TokenLease`] for the OAuth credentials in `config`.
	///
	/// Only OAuth credentials produce expiring tokens; Basic configurations are rejected as an
	/// unsupported strategy for leasing. The lease inherits the resolved timeout and this
	/// checker's cancellation token.
	pub fn lease(&self, config: &Configuration) -> Result<TokenLease<C, M>> {
		let settings = config.settings(self.settings());
		let ResolvedConfiguration { target, credentials } = config.resolve()?;

		match credentials {
			Credentials::OAuth { client_id, client_secret, tenant_id } => {
				let strategy = OAuthStrategy::new(
					&target,
					&settings.authority_host,
					&client_id,
					&client_secret,
					&tenant_id,
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;

				Ok(TokenLease::new(strategy))
			},
			Credentials::Basic { .. } => Err(ConfigError::UnsupportedStrategy {
				value: AuthStrategy::Basic.to_string(),
			}
			.into()),
		}
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{checker::ReqwestChecker, provider::ErrorKind};

	#[test]
	fn basic_configurations_cannot_be_leased() {
		let checker = ReqwestChecker::new();
		let err = checker
			.lease(&Configuration::basic("https://contoso.crm.dynamics.com", "svc", "pw"))
			.expect_err("Basic credentials should not produce a lease.");

		assert_eq!(err.kind(), ErrorKind::UnsupportedStrategy("Basic".into()));
	}

	#[tokio::test]
	async fn new_lease_is_empty_and_window_clamps() {
		let config =
			Configuration::oauth("https://contoso.crm.dynamics.com", "app", "secret", "tenant");
		let lease = ReqwestChecker::new()
			.lease(&config)
			.expect("OAuth credentials should produce a lease.")
			.with_refresh_window(Duration::seconds(-5));

		assert!(lease.current().is_none());
		assert_eq!(lease.refresh_window, Duration::ZERO);
		assert_eq!(lease.timeout, CheckerSettings::DEFAULT_TIMEOUT);
		assert_eq!(lease.oauth_strategy().scope(), "https://contoso.crm.dynamics.com/.default");
	}
}

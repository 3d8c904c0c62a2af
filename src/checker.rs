//! Credential checker: resolves a [`Configuration`](crate::config::Configuration), acquires an
//! authorization header through the matching strategy, and probes the Web API with it.
//!
//! Public check operations ([`Checker::validate`], [`Checker::check_permissions`],
//! [`Checker::test_connectivity`]) never fail; every error is reduced to an [`AuthResult`]
//! carrying an [`ErrorKind`] and a one-line diagnostic. [`Checker::authorize`] exposes the
//! acquisition step on its own for callers that want the typed [`Error`].

mod probe;
mod validate;

pub use probe::*;

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, AuthStrategy, EndpointTarget},
	config::CheckerSettings,
	http::HttpTransport,
	oauth::TransportErrorMapper,
	provider::ErrorKind,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Checker specialized for the crate's default reqwest transport stack.
pub type ReqwestChecker = Checker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Validates Dynamics 365 credentials against a shared HTTP transport.
///
/// The checker holds no credential state; one instance can serve any number of concurrent
/// checks. Cloning is cheap and shares the transport and cancellation token.
pub struct Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for token requests and probes.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before they are classified.
	pub transport_mapper: Arc<M>,
	settings: CheckerSettings,
	cancel: CancellationToken,
}
impl<C, M> Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a checker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, mapper: impl Into<Arc<M>>) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			settings: CheckerSettings::default(),
			cancel: CancellationToken::new(),
		}
	}

	/// Replaces the checker-wide settings; per-configuration overrides still apply on top.
	pub fn with_settings(mut self, settings: CheckerSettings) -> Self {
		self.settings = settings;

		self
	}

	/// Attaches a cancellation token observed by every network call.
	pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;

		self
	}

	/// Checker-wide settings.
	pub fn settings(&self) -> &CheckerSettings {
		&self.settings
	}

	/// Token that aborts in-flight and future checks once cancelled.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancel
	}

	/// Runs `fut` under the configured deadline and the checker's cancellation token.
	pub(crate) async fn bounded<T, F>(
		&self,
		timeout: StdDuration,
		operation: &'static str,
		fut: F,
	) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		bounded(&self.cancel, timeout, operation, fut).await
	}
}
#[cfg(feature = "reqwest")]
impl Checker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a checker backed by the default reqwest transport.
	///
	/// See [`ReqwestHttpClient`]'s `Default` impl for the client-build fallback; prefer
	/// [`Checker::try_new`] where that failure should be handled.
	pub fn new() -> Self {
		Self::with_http_client(ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}

	/// Creates a checker backed by a freshly built reqwest transport, surfacing build failures.
	pub fn try_new() -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(ReqwestHttpClient::try_new()?, ReqwestTransportErrorMapper))
	}
}
#[cfg(feature = "reqwest")]
impl Default for Checker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::new()
	}
}
impl<C, M> Clone for Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			settings: self.settings.clone(),
			cancel: self.cancel.clone(),
		}
	}
}
impl<C, M> Debug for Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Checker")
			.field("settings", &self.settings)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish()
	}
}

/// Outcome of one credential check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthResult {
	/// `true` only when acquisition and the probe both succeeded.
	pub success: bool,
	/// Classified cause when acquisition failed.
	///
	/// Probe failures leave this empty; [`AuthResult::probe`] describes them instead.
	pub failure_reason: Option<ErrorKind>,
	/// Probe verdict, present once a header was acquired.
	pub probe: Option<ProbeOutcome>,
	/// Human-readable one-line summary.
	pub diagnostic: String,
}
impl AuthResult {
	pub(crate) fn from_probe(kind: &ProbeKind, outcome: ProbeOutcome) -> Self {
		Self {
			success: outcome.passed(),
			failure_reason: None,
			diagnostic: outcome.diagnostic(kind),
			probe: Some(outcome),
		}
	}

	pub(crate) fn from_error(err: &Error) -> Self {
		let kind = err.kind();
		let diagnostic = match err {
			Error::Provider { .. } => err.to_string(),
			_ => kind.explanation().into_owned(),
		};

		Self { success: false, failure_reason: Some(kind), probe: None, diagnostic }
	}

	/// Returns `true` when the probe was refused with HTTP 403.
	pub fn is_permission_denied(&self) -> bool {
		matches!(self.probe, Some(ProbeOutcome::Denied { .. }))
	}
}
impl Display for AuthResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.diagnostic)
	}
}

/// Header acquired for a resolved configuration, ready to be probed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authorization {
	/// Instance the header belongs to.
	pub target: EndpointTarget,
	/// Strategy that produced the header.
	pub strategy: AuthStrategy,
	/// `Authorization` header value.
	pub header: AuthHeader,
}

/// Races `fut` against `timeout` and `cancel`.
///
/// `fut` is polled first, so work that is already complete wins over cancellation.
pub(crate) async fn bounded<T, F>(
	cancel: &CancellationToken,
	timeout: StdDuration,
	operation: &'static str,
	fut: F,
) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	tokio::select! {
		biased;
		outcome = tokio::time::timeout(timeout, fut) =>
			outcome.unwrap_or_else(|_| Err(Error::TimedOut { operation, after: timeout })),
		_ = cancel.cancelled() => Err(Error::Cancelled { operation }),
	}
}

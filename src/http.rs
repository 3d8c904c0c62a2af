//! Transport primitives shared by token exchanges and Web API probes.
//!
//! The module exposes [`HttpTransport`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so callers can plug in any HTTP stack (or a scripted fake in
//! tests) without global state. Every request, whether issued by the `oauth2` token
//! exchange or by a probe, flows through the [`AsyncHttpClient`] handle a transport returns,
//! so "send a request, get status and body back" is the only capability the checker needs.
//! Dropping the returned future cancels the request.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::AsyncHttpClient;
#[cfg(feature = "reqwest")] use oauth2::{HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports used for token exchanges and probes.
///
/// Implementations must be `Send + Sync + 'static` so one transport (and its connection pool)
/// can be shared by concurrent checks behind an `Arc`. The handles they return must own
/// whatever state is required so request futures remain `Send` for the lifetime of the
/// in-flight call.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	///
	/// The request future returned by [`AsyncHttpClient::call`] must be `Send` so checker
	/// futures can hop executors.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = oauth2::HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request so stale
	///   information never leaks across calls.
	/// - Once an HTTP response (successful or erroneous) provides a status, save it with
	///   [`ResponseMetadataSlot::store`].
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The checker creates a fresh slot for each request and reads the captured metadata as
/// soon as the call resolves. The lock is never held across an `.await`.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints and the Web API answer directly, so configure any custom client to
/// disable redirect following; a redirect on a probe would otherwise mask a 401/403.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn try_new() -> Result<Self, crate::error::ConfigError> {
		Ok(Self(no_redirect_builder().build()?))
	}

	/// Builds a client that never follows redirects and gives up after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, crate::error::ConfigError> {
		Ok(Self(no_redirect_builder().timeout(timeout).build()?))
	}

	/// Builds an instrumented HTTP client that captures response metadata.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
/// Infallible form of [`ReqwestHttpClient::try_new`].
///
/// reqwest only fails to build when its TLS backend cannot initialize; in that case this falls
/// back to [`ReqwestClient::default`], which panics on the same condition. Use
/// [`ReqwestHttpClient::try_new`] to receive the failure as [`ConfigError::HttpClientBuild`].
///
/// [`ConfigError::HttpClientBuild`]: crate::error::ConfigError::HttpClientBuild
#[cfg(feature = "reqwest")]
impl Default for ReqwestHttpClient {
	fn default() -> Self {
		Self(no_redirect_builder().build().unwrap_or_default())
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
#[cfg(feature = "reqwest")]
impl InstrumentedHttpClient {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self { client, slot }
	}
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestHttpClient`] that satisfies [`HttpTransport`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient::new(client, slot)))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}
}

#[cfg(feature = "reqwest")]
fn no_redirect_builder() -> reqwest::ClientBuilder {
	ReqwestClient::builder().redirect(reqwest::redirect::Policy::none())
}

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use d365_auth_checker::{
	checker::Checker,
	error::{Error, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		CallTarget, TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
		},
	},
	url::form_urlencoded,
};

pub const INSTANCE_URL: &str = "https://contoso.crm.dynamics.com";
pub const TOKEN_URL: &str = "https://login.microsoftonline.com/tenant-id/oauth2/v2.0/token";

pub type FakeChecker = Checker<FakeTransport, FakeMapper>;

/// Reply the fake transport gives to the next request.
#[derive(Clone, Debug)]
pub enum Scripted {
	Respond { status: u16, body: String },
	Fail(String),
	Hang,
}
impl Scripted {
	pub fn status(status: u16) -> Self {
		Self::Respond { status, body: String::new() }
	}

	pub fn json(status: u16, body: &str) -> Self {
		Self::Respond { status, body: body.into() }
	}

	pub fn token(access_token: &str, expires_in: u64) -> Self {
		Self::json(
			200,
			&format!(
				r#"{{"token_type":"Bearer","expires_in":{expires_in},"ext_expires_in":{expires_in},"access_token":"{access_token}"}}"#
			),
		)
	}
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: String,
	pub uri: String,
	pub headers: Vec<(String, String)>,
	pub body: String,
}
impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	pub fn form(&self) -> Vec<(String, String)> {
		form_urlencoded::parse(self.body.as_bytes()).into_owned().collect()
	}

	pub fn form_value(&self, key: &str) -> Option<String> {
		self.form().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}
}

#[derive(Debug)]
pub struct FakeTransportError(String);
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl StdError for FakeTransportError {}

/// Transport that replays a script and records every request it receives.
#[derive(Clone, Default)]
pub struct FakeTransport {
	script: Arc<Mutex<VecDeque<Scripted>>>,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
}
impl FakeTransport {
	pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
		Self { script: Arc::new(Mutex::new(script.into_iter().collect())), ..Default::default() }
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}

	pub fn checker(&self) -> FakeChecker {
		Checker::with_http_client(self.clone(), FakeMapper)
	}

	fn record(&self, request: &HttpRequest) {
		let headers = request
			.headers()
			.iter()
			.map(|(name, value)| {
				(name.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned())
			})
			.collect();

		self.requests.lock().push(RecordedRequest {
			method: request.method().as_str().to_owned(),
			uri: request.uri().to_string(),
			headers,
			body: String::from_utf8_lossy(request.body()).into_owned(),
		});
	}

	fn next(&self) -> Scripted {
		self.script.lock().pop_front().unwrap_or_else(|| Scripted::Fail("script exhausted".into()))
	}
}
impl HttpTransport for FakeTransport {
	type Handle = FakeHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHandle { transport: self.clone(), slot }
	}
}

pub struct FakeHandle {
	transport: FakeTransport,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for FakeHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let transport = self.transport.clone();
		let slot = self.slot.clone();

		Box::pin(async move {
			slot.take();
			transport.record(&request);

			match transport.next() {
				Scripted::Respond { status, body } => {
					slot.store(ResponseMetadata { status: Some(status) });

					let mut response = HttpResponse::new(body.into_bytes());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");
					response
						.headers_mut()
						.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

					Ok(response)
				},
				Scripted::Fail(message) =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError(message)))),
				Scripted::Hang => std::future::pending().await,
			}
		})
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FakeMapper;
impl TransportErrorMapper<FakeTransportError> for FakeMapper {
	fn map_transport_error(
		&self,
		target: CallTarget,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<FakeTransportError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(target.label(), *inner).into(),
			other => TransportError::Other { target: target.label(), message: other.to_string() }
				.into(),
		}
	}
}

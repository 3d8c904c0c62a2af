//! Authenticated Web API probes: identity (`WhoAmI()`), entity permission, and connectivity.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, HeaderValue},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, EndpointTarget},
	checker::Checker,
	config::CheckerSettings,
	error::{ConfigError, chain_message},
	http::{HttpTransport, ResponseMetadataSlot},
	oauth::{CallTarget, TransportErrorMapper},
	obs::{CheckKind, CheckSpan},
};

const ODATA_VERSION: &str = "4.0";

/// Which request a probe issues.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProbeKind {
	/// `GET <base>/api/data/<version>/WhoAmI()`.
	Identity,
	/// `GET <base>/api/data/<version>/<entitySet>?fetchXml=<query>`.
	Permission(EntityRef, EntityOperation),
	/// `GET <base>/api/data/<version>/`.
	Connectivity,
}
impl ProbeKind {
	/// Label used in diagnostics and timeout errors.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Identity => "identity probe",
			Self::Permission(..) => "permission probe",
			Self::Connectivity => "connectivity probe",
		}
	}

	/// Builds the request URL for `target` under Web API `api_version`.
	pub fn url(&self, target: &EndpointTarget, api_version: &str) -> Result<Url, ConfigError> {
		let root = format!("api/data/{}/", api_version.trim_matches('/'));

		match self {
			Self::Identity => target.join(&format!("{root}WhoAmI()")),
			Self::Connectivity => target.join(&root),
			Self::Permission(entity, operation) => {
				let mut url = target.join(&format!("{root}{}", entity.set_name()))?;

				url.query_pairs_mut().append_pair("fetchXml", &fetch_xml(entity, *operation));

				Ok(url)
			},
		}
	}

	const fn check_kind(&self) -> CheckKind {
		match self {
			Self::Identity => CheckKind::Validate,
			Self::Permission(..) => CheckKind::Permission,
			Self::Connectivity => CheckKind::Connectivity,
		}
	}
}

/// Dataverse table addressed by a permission probe.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
	logical_name: String,
	set_name: String,
}
impl EntityRef {
	/// Validates `logical_name` (`[a-z0-9_]+`) and derives its entity set name.
	pub fn new(logical_name: impl Into<String>) -> Result<Self, ConfigError> {
		let logical_name = logical_name.into();

		let allowed = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_';

		if logical_name.is_empty() || !logical_name.bytes().all(allowed) {
			return Err(ConfigError::InvalidEntityName { name: logical_name });
		}

		let set_name = pluralize(&logical_name);

		Ok(Self { logical_name, set_name })
	}

	/// Overrides the derived entity set name for tables with irregular plurals.
	pub fn with_set_name(mut self, set_name: impl Into<String>) -> Self {
		self.set_name = set_name.into();

		self
	}

	/// Table logical name (e.g. `contact`).
	pub fn logical_name(&self) -> &str {
		&self.logical_name
	}

	/// Web API collection name (e.g. `contacts`).
	pub fn set_name(&self) -> &str {
		&self.set_name
	}

	/// Primary key attribute, `<logicalName>id`.
	pub fn primary_id_attribute(&self) -> String {
		format!("{}id", self.logical_name)
	}
}
impl Display for EntityRef {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.logical_name)
	}
}
impl FromStr for EntityRef {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.trim())
	}
}

/// Operation a permission probe exercises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityOperation {
	/// Retrieve a single record's primary id.
	#[default]
	Read,
	/// Aggregate record count.
	Count,
}
impl EntityOperation {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Read => "read",
			Self::Count => "count",
		}
	}
}
impl Display for EntityOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for EntityOperation {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"read" | "retrieve" => Ok(Self::Read),
			"count" => Ok(Self::Count),
			_ => Err(ConfigError::UnsupportedOperation { value: s.trim().to_owned() }),
		}
	}
}

/// Verdict of a single probe.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
	/// Service answered 2xx.
	Passed {
		/// HTTP status code.
		status: u16,
	},
	/// Service answered 403: authenticated but not allowed.
	Denied {
		/// HTTP status code.
		status: u16,
	},
	/// Service answered any other non-2xx status.
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// No HTTP status was obtained (transport failure, timeout, cancellation).
	Unreachable {
		/// Error chain describing the failure.
		reason: String,
	},
}
impl ProbeOutcome {
	/// Classifies an HTTP status code.
	pub const fn from_status(status: u16) -> Self {
		match status {
			200..=299 => Self::Passed { status },
			403 => Self::Denied { status },
			_ => Self::Rejected { status },
		}
	}

	/// Returns `true` for 2xx responses.
	pub const fn passed(&self) -> bool {
		matches!(self, Self::Passed { .. })
	}

	/// HTTP status, when one was received.
	pub const fn status(&self) -> Option<u16> {
		match self {
			Self::Passed { status } | Self::Denied { status } | Self::Rejected { status } =>
				Some(*status),
			Self::Unreachable { .. } => None,
		}
	}

	/// One-line summary of this outcome for `kind`.
	pub fn diagnostic(&self, kind: &ProbeKind) -> String {
		let subject = match kind {
			ProbeKind::Identity => "Credentials".to_owned(),
			ProbeKind::Permission(entity, operation) =>
				format!("Permission to {operation} `{}`", entity.set_name()),
			ProbeKind::Connectivity => "Web API connectivity".to_owned(),
		};

		match self {
			Self::Passed { status } => format!("{subject} verified (HTTP {status})."),
			Self::Denied { status } => format!(
				"{subject} check failed: insufficient permission, the Web API refused access (HTTP {status})."
			),
			Self::Rejected { status } =>
				format!("{subject} check failed: the Web API answered HTTP {status}."),
			Self::Unreachable { reason } => format!("{subject} check failed: {reason}"),
		}
	}
}
impl Display for ProbeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Passed { status } => write!(f, "passed (HTTP {status})"),
			Self::Denied { status } => write!(f, "denied (HTTP {status})"),
			Self::Rejected { status } => write!(f, "rejected (HTTP {status})"),
			Self::Unreachable { reason } => write!(f, "unreachable: {reason}"),
		}
	}
}

impl<C, M> Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns `true` iff the probe answered 2xx.
	pub async fn probe(
		&self,
		header: &AuthHeader,
		target: &EndpointTarget,
		kind: &ProbeKind,
	) -> bool {
		self.probe_outcome(header, target, kind).await.passed()
	}

	/// Runs the probe with the checker-wide settings and reports the detailed verdict.
	pub async fn probe_outcome(
		&self,
		header: &AuthHeader,
		target: &EndpointTarget,
		kind: &ProbeKind,
	) -> ProbeOutcome {
		self.probe_with(&self.settings, header, target, kind).await
	}

	pub(crate) async fn probe_with(
		&self,
		settings: &CheckerSettings,
		header: &AuthHeader,
		target: &EndpointTarget,
		kind: &ProbeKind,
	) -> ProbeOutcome {
		let span = CheckSpan::new(kind.check_kind(), "probe");

		span.instrument(async move {
			let sent = self
				.bounded(settings.timeout, kind.label(), self.send_probe(settings, header, target, kind))
				.await;

			match sent {
				Ok(status) => ProbeOutcome::from_status(status),
				Err(err) => ProbeOutcome::Unreachable { reason: chain_message(&err) },
			}
		})
		.await
	}

	async fn send_probe(
		&self,
		settings: &CheckerSettings,
		header: &AuthHeader,
		target: &EndpointTarget,
		kind: &ProbeKind,
	) -> Result<u16> {
		let url = kind.url(target, &settings.api_version)?;
		let request = probe_request(&url, header)?;
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let response = handle.call(request).await.map_err(|err| {
			self.transport_mapper.map_transport_error(CallTarget::WebApi, slot.take().as_ref(), err)
		})?;

		Ok(response.status().as_u16())
	}
}

/// FetchXML query issued by a permission probe.
pub fn fetch_xml(entity: &EntityRef, operation: EntityOperation) -> String {
	let name = entity.logical_name();
	let id = entity.primary_id_attribute();

	match operation {
		EntityOperation::Read =>
			format!("<fetch top='1'><entity name='{name}'><attribute name='{id}' /></entity></fetch>"),
		EntityOperation::Count => format!(
			"<fetch aggregate='true'><entity name='{name}'><attribute name='{id}' alias='record_count' aggregate='count' /></entity></fetch>"
		),
	}
}

fn probe_request(url: &Url, header: &AuthHeader) -> Result<HttpRequest, ConfigError> {
	let mut authorization =
		HeaderValue::from_str(&header.expose()).map_err(oauth2::http::Error::from)?;

	authorization.set_sensitive(true);

	Ok(Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(AUTHORIZATION, authorization)
		.header(ACCEPT, "application/json")
		.header("OData-MaxVersion", ODATA_VERSION)
		.header("OData-Version", ODATA_VERSION)
		.body(Vec::new())?)
}

fn pluralize(name: &str) -> String {
	let consonant_y = name
		.strip_suffix('y')
		.and_then(|stem| stem.chars().last())
		.is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));

	if consonant_y {
		format!("{}ies", &name[..name.len() - 1])
	} else if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| name.ends_with(suffix)) {
		format!("{name}es")
	} else {
		format!("{name}s")
	}
}

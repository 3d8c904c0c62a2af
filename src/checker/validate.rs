//! Check orchestration: resolve, acquire, probe, reduce to [`AuthResult`].

// self
use crate::{
	_prelude::*,
	checker::{AuthResult, Authorization, Checker, EntityOperation, EntityRef, ProbeKind},
	config::{CheckerSettings, Configuration, ResolvedConfiguration},
	http::HttpTransport,
	oauth::TransportErrorMapper,
	obs::{self, CheckKind, CheckOutcome, CheckSpan},
	strategy,
};

impl<C, M> Checker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Validates the credentials in `config` by acquiring a header and calling `WhoAmI()`.
	///
	/// Missing fields, an unsupported `authType`, or an unusable URL fail before any request is
	/// sent. Basic credentials are only verified by the probe, so a wrong password surfaces as a
	/// rejected probe with no `failure_reason`.
	pub async fn validate(&self, config: &Configuration) -> AuthResult {
		self.run_check(CheckKind::Validate, "validate", config, ProbeKind::Identity).await
	}

	/// Verifies that the identity in `config` may perform `operation` on `entity`.
	pub async fn check_permissions(
		&self,
		config: &Configuration,
		entity: &EntityRef,
		operation: EntityOperation,
	) -> AuthResult {
		let probe = ProbeKind::Permission(entity.clone(), operation);

		self.run_check(CheckKind::Permission, "check_permissions", config, probe).await
	}

	/// Verifies that the service root answers an authenticated request.
	pub async fn test_connectivity(&self, config: &Configuration) -> AuthResult {
		self.run_check(CheckKind::Connectivity, "test_connectivity", config, ProbeKind::Connectivity)
			.await
	}

	/// Resolves `config` and acquires an authorization header without probing.
	pub async fn authorize(&self, config: &Configuration) -> Result<Authorization> {
		const KIND: CheckKind = CheckKind::Acquire;

		let span = CheckSpan::new(KIND, "authorize");

		obs::record_check_outcome(KIND, CheckOutcome::Attempt);

		let settings = config.settings(&self.settings);
		let result = span.instrument(self.authorize_with(&settings, config)).await;

		obs::record_check_outcome(KIND, CheckOutcome::from_success(result.is_ok()));

		result
	}

	async fn authorize_with(
		&self,
		settings: &CheckerSettings,
		config: &Configuration,
	) -> Result<Authorization> {
		let ResolvedConfiguration { target, credentials } = config.resolve()?;
		let acquisition = strategy::select(
			&credentials,
			&target,
			&settings.authority_host,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		)?;
		let header = self.bounded(settings.timeout, "token request", acquisition.acquire()).await?;

		Ok(Authorization { target, strategy: acquisition.strategy(), header })
	}

	async fn run_check(
		&self,
		kind: CheckKind,
		stage: &'static str,
		config: &Configuration,
		probe: ProbeKind,
	) -> AuthResult {
		let span = CheckSpan::new(kind, stage);

		obs::record_check_outcome(kind, CheckOutcome::Attempt);

		let result = span
			.instrument(async {
				let settings = config.settings(&self.settings);

				match self.authorize_with(&settings, config).await {
					Ok(Authorization { target, header, .. }) => {
						let outcome = self.probe_with(&settings, &header, &target, &probe).await;

						AuthResult::from_probe(&probe, outcome)
					},
					Err(err) => AuthResult::from_error(&err),
				}
			})
			.await;

		obs::record_check_outcome(kind, CheckOutcome::from_success(result.success));
		obs::emit_diagnostic(kind, result.success, &result.diagnostic);

		result
	}
}

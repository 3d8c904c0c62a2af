//! Optional observability helpers for credential checks.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `d365_auth_checker.check` with the `check`
//!   and `stage` fields, plus one `info`/`warn` diagnostic event per finished check.
//! - Enable `metrics` to increment the `d365_auth_checker_check_total` counter for every
//!   attempt/success/failure, labeled by `check` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Check kinds observed by the checker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckKind {
	/// Credential validation (acquisition + identity probe).
	Validate,
	/// Entity permission probe.
	Permission,
	/// Service root connectivity probe.
	Connectivity,
	/// Standalone header acquisition.
	Acquire,
}
impl CheckKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CheckKind::Validate => "validate",
			CheckKind::Permission => "permission",
			CheckKind::Connectivity => "connectivity",
			CheckKind::Acquire => "acquire",
		}
	}
}
impl Display for CheckKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckOutcome {
	/// Entry to a checker operation.
	Attempt,
	/// Check passed.
	Success,
	/// Check failed.
	Failure,
}
impl CheckOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CheckOutcome::Attempt => "attempt",
			CheckOutcome::Success => "success",
			CheckOutcome::Failure => "failure",
		}
	}

	/// Maps a boolean verdict onto the terminal outcome.
	pub const fn from_success(success: bool) -> Self {
		if success { CheckOutcome::Success } else { CheckOutcome::Failure }
	}
}
impl Display for CheckOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

//! Validate Dynamics 365 / Dataverse credentials end to end: pick a Basic or OAuth
//! client-credentials strategy, acquire an authorization header, probe the Web API, and
//! explain every failure through a stable error taxonomy.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod checker;
pub mod config;
pub mod error;
pub mod http;
pub mod lease;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod strategy;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};

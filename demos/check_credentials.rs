//! Loads a JSON configuration and runs every credential check against the live instance.
//!
//! ```sh
//! RUST_LOG=d365_auth_checker=info cargo run --example check_credentials -- config.json
//! ```
//!
//! The file uses the same keys the checker reads (`instanceUrl`, `authType`, `clientId`, ...).
//! An optional second argument names the table used for the permission probe (default
//! `contact`).

// std
use std::env;
// crates.io
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
// self
use d365_auth_checker::{
	checker::{EntityOperation, EntityRef, ReqwestChecker},
	config::Configuration,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	let mut args = env::args().skip(1);
	let path = args.next().unwrap_or_else(|| "config.json".into());
	let entity = args.next().unwrap_or_else(|| "contact".into()).parse::<EntityRef>()?;
	let config = Configuration::load(&path)?;
	let checker = ReqwestChecker::try_new()?;
	let validation = checker.validate(&config).await;

	println!("validate: {validation}");

	if validation.success {
		let permission = checker.check_permissions(&config, &entity, EntityOperation::Read).await;
		let connectivity = checker.test_connectivity(&config).await;

		println!("permission: {permission}");
		println!("connectivity: {connectivity}");
	}

	println!("Credentials are valid: {}", validation.success);

	Ok(())
}

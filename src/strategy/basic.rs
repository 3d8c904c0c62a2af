// self
use crate::{
	_prelude::*,
	auth::{AuthHeader, AuthStrategy, Secret},
	strategy::{AcquireFuture, TokenAcquisition},
};

/// Static `Basic` header built from a username and password.
///
/// Acquisition never fails and never issues a request. Wrong credentials only show up when the
/// header is probed (typically HTTP 401).
#[derive(Clone, Debug)]
pub struct BasicStrategy {
	header: AuthHeader,
}
impl BasicStrategy {
	/// Encodes `username:password` once up front.
	pub fn new(username: &str, password: &Secret) -> Self {
		Self { header: AuthHeader::basic(username, password) }
	}
}
impl TokenAcquisition for BasicStrategy {
	fn strategy(&self) -> AuthStrategy {
		AuthStrategy::Basic
	}

	fn acquire(&self) -> AcquireFuture<'_> {
		Box::pin(std::future::ready(Ok(self.header.clone())))
	}
}

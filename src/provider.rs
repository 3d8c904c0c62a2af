//! Identity-provider knowledge: where tokens come from and what its error codes mean.
//!
//! [`Authority`] builds the tenant-scoped token endpoint. [`ErrorKind`] is the closed taxonomy
//! every checker failure is reported through, and [`classify`] maps OAuth `error` codes onto it.

mod authority;
mod error_kind;

pub use authority::*;
pub use error_kind::*;

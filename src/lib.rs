//! A tiny function host.
//!
//! Functions are registered by name in a [`function::FunctionRegistry`],
//! installed process-wide with [`function::global`], and invoked through the
//! line-oriented [`host::Host`].

pub mod function;
pub mod host;
pub mod model;
pub mod msg;

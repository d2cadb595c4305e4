//! cadlink: remote command dispatch for a parametric CAD document.
//!
//! Requests name an operation and scalar parameters only; the
//! [`dispatch`] layer infers the sketches, bodies, features and planes they
//! act on via [`resolver`] and performs the change through a
//! [`kernel::GeometryKernel`].

pub mod api;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod kernel;
pub mod mcp;
pub mod models;
pub mod resolver;

//! protoc bridge
//!
//! Runs protoc with a single code generator plugin and reconciles what it
//! wrote with the output files the build declared ahead of time.

pub mod driver;
pub mod error;
pub mod invoke;
pub mod params;
pub mod placeholder;
pub mod reconcile;

pub use driver::{Bridge, BridgeOptions};
pub use error::{AmbiguityReport, AmbiguousOutput, BridgeError, Result};
pub use invoke::ProtocInvocation;
pub use params::expand_params_files;
pub use reconcile::{reconcile, Outcome, OutputEntry, ReconcileReport, ReconcileRequest};

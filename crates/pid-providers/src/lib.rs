//! PID providers
//!
//! Concrete [`pid_core::PidProvider`] backends:
//! - `PermaLinkPidProvider`: installation-local `perma:` identifiers
//! - `RegistryPidProvider`: DataCite, EZID and Handle through a `RegistryClient`
//! - `FakePidProvider`: DOIs that never leave the process
//!
//! `ProviderSet` builds all of them from settings and produces the
//! [`pid_core::Dispatcher`] used to pick one per protocol.

pub mod error;
pub mod fake;
pub mod permalink;
pub mod registry;
pub mod set;

pub use error::*;
pub use fake::*;
pub use permalink::*;
pub use registry::*;
pub use set::*;

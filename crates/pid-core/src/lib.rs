//! Persistent identifier (PID) core
//!
//! This crate provides the provider-independent parts of PID management:
//! - `GlobalId`: the validated `protocol:authority<separator>identifier` value
//! - Formatting and validation rules shared by every grammar
//! - The `PidProvider` contract, with identifier generation and parsing defaults
//! - `Dispatcher`: protocol and settings driven provider selection
//! - Settings lookup and the local uniqueness oracle consumed from the host

pub mod dispatcher;
pub mod dv_object;
pub mod error;
pub mod format;
pub mod global_id;
pub mod parse;
pub mod provider;
pub mod service;
pub mod settings;

pub use dispatcher::*;
pub use dv_object::*;
pub use error::*;
pub use format::*;
pub use global_id::*;
pub use parse::{parse, rewrite_resolver_url, split_authority, split_protocol, UNMANAGED_PROVIDER_NAME};
pub use provider::*;
pub use service::*;
pub use settings::*;

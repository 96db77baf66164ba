//! AWS-oriented adapters, pipeline and handlers for stack deployment.
//!
//! This crate owns runtime integration details (Lambda event shapes, artifact
//! staging, deployment tool processes and status publishing) and exposes a
//! single runtime module boundary for the contract, command, event and
//! storage key primitives of `stack_deployer_core`.

pub mod adapters;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod pipeline;
pub mod runtime;

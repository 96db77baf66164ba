//! Shared stack deployer domain primitives.
//!
//! This crate owns inbound message contracts, request normalization, stack
//! naming, deployment tool argument lists and status event payloads. It
//! intentionally excludes AWS SDK, Lambda runtime and filesystem concerns.

pub mod command;
pub mod contract;
pub mod events;
pub mod integrity;
pub mod stack;
pub mod storage_keys;

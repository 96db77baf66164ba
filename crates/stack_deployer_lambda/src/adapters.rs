//! Collaborator seams. Handlers and pipeline components only see these
//! traits; AWS and process implementations are wired in by the binary.

pub mod event_bus;
pub mod object_store;
pub mod process;

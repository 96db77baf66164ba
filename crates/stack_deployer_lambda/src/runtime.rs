pub use stack_deployer_core::{command, contract, events, integrity, stack, storage_keys};

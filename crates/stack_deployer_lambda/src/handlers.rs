//! Inbound event handling: shape detection, routing and responses.

pub mod response;
pub mod router;

pub use response::ApiGatewayResponse;
pub use router::handle_event;

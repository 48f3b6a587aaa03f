//! Gateway session
//!
//! Connection lifecycle, event dispatch, and supervised reconnection.

pub mod reconnect;
pub mod session;

pub use reconnect::ReconnectPolicy;
pub use session::{GatewayClient, SessionState};

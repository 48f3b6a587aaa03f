//! # toplist-gateway
//!
//! Client for the toplist gateway. A persistent WebSocket connection
//! authenticates with a token and then receives vote and rate push events
//! for the entity assigned to that token.
//!
//! ```no_run
//! use toplist_gateway::GatewayClient;
//!
//! # async fn run() -> Result<(), toplist_gateway::GatewayError> {
//! let client = GatewayClient::new("your-gateway-token");
//! client.on_vote(|vote| println!("vote from {}", vote.author_id));
//! client.connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod transport;

pub use client::{GatewayClient, ReconnectPolicy, SessionState};
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use toplist_protocol::{EntityType, EventKind, GatewayMessage, OpCode, RateEvent, VoteEvent};

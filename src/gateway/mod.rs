//! Relay gateway.
//!
//! A stateless HTTP process between the browser and the upstream API. It
//! attaches the server-held bearer credential, resolves the `path` query
//! parameter against the upstream base, and relays the response either
//! buffered as JSON or piped through as an event stream.
//!
//! # Module structure
//! - `routes` - Virtual path to forwarding mode table
//! - `target` - Upstream URL resolution and path validation
//! - `request` - Relay request descriptor and header filtering
//! - `handler` - axum handlers
//! - `server` - Shared state, router and listener startup
//!
//! # Usage
//!
//! ```ignore
//! use edge_relay::config::GatewayConfig;
//! use edge_relay::gateway::{start_gateway_on, GatewayState};
//!
//! let config = GatewayConfig::from_env()?;
//! let state = GatewayState::from_config(&config)?;
//! let (handle, addr) = start_gateway_on(config.bind_addr, state).await?;
//! ```

mod handler;
mod request;
mod routes;
mod server;
mod target;

pub use handler::{health, relay};
pub use request::{forwardable_headers, is_forwardable, RelayRequest, STRIPPED_HEADERS};
pub use routes::{ForwardMode, Route, RouteTable, BRIEF_ANALYSIS_PATH};
pub use server::{build_router, serve_until, start_gateway_on, GatewayState};
pub use target::{normalize_virtual_path, UpstreamTarget, PATH_PARAM};

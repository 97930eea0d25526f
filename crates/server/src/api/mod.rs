pub mod error;
pub mod files;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod ws;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use ws::{spawn_heartbeat, WsBroadcaster, WsMessage, HEARTBEAT_INTERVAL};

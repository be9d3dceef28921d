//! Object-finalize webhook for Objstamp

pub mod handler;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod updater;

pub use handler::{HandlerResponse, NotificationHandler, Outcome};
pub use metrics::MetricsRecorder;
pub use server::{create_router, AppState, WebhookServer};
pub use updater::{update_object_metadata, UpdateOutcome};

// Library interface for fastlap
// This allows integration tests and benches to access internal modules

pub mod api;
pub mod config;
pub mod curves;
pub mod errors;
pub mod render;
pub mod telemetry;
pub mod ui;

// Re-export commonly used types
pub use config::{AppConfig, DefaultSelection};
pub use errors::FastlapError;
pub use render::{DriverPlots, RenderConfig, render_driver_plots};
pub use telemetry::{Lap, Session, SessionInfo, SessionProvider, SessionStore, SessionType};

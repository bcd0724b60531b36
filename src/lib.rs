// Library interface for the body battery score
// The CLI in main.rs is a thin collector/presenter over these modules

pub mod access;
pub mod battery;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;

// Re-export commonly used types for convenience
pub use models::*;
pub use access::{score_authorized, AccessGate, OpenGate, Principal, TokenGate};
pub use battery::{round_one_decimal, ScoreCalculator};
pub use config::AppConfig;
pub use error::{BatteryError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use report::ScoreReport;

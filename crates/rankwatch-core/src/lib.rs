pub mod app_config;
pub mod config;
pub mod partition;
pub mod ranking;
pub mod stats;

pub use app_config::{AppConfig, ChannelKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use partition::partition;
pub use ranking::{rank_of, resolve_positions, store_link};
pub use stats::representative_position;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

pub mod config;
pub mod error;
pub mod images;
pub mod pdf;
pub mod sync;
pub mod templates;

pub use config::Config;
pub use error::ConfigError;

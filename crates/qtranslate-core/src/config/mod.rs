//! Configuration system — schema, loading, validation, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use qtranslate_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Target: {}", cfg.translation.target_language);
//! ```

pub mod loader;
pub mod schema;
pub mod validate;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, ProviderFamily, ProviderProfile};
pub use validate::{validate_config, validate_profile, ValidationError};

// SPDX-License-Identifier: MIT
mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{check_settings, default_config_path, load, setup, SAMPLE_CONFIG};
pub use schema::*;

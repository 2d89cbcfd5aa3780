//! Client configuration for the Zenith CLI.
//!
//! A small YAML file, `client.yaml` in the zenith config directory:
//!
//! ```yaml
//! server: http://localhost:8000
//! timeout: 30
//! data-dir: ~/.config/zenith
//! ```
//!
//! Every field is optional. The server named on the command line (or in
//! `ZENITH_API_URL`) wins over the file, which wins over the built-in
//! default.

pub mod client;
pub mod error;
pub mod paths;

pub use client::{
    ClientConfig, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS, ResolvedConfig, ServerSource,
    client_config_path, load_client_config, load_client_config_from, save_client_config_to,
};
pub use error::{ConfigError, Result};
pub use paths::{CONFIG_DIR_ENV, expand_path, xdg_config_dir};

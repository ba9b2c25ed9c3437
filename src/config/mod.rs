//! JSON configuration for the command-line tools.

pub mod extract;

pub use extract::{load_config, parse_config, ExtractOutputConfig, ExtractToolConfig};

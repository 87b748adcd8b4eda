#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use settings::Settings;
pub use toml_config::{FetchConfig, TomlConfig};

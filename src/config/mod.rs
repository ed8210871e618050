#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, QuizArgs, ResolveArgs};
pub use toml_config::CommerceConfig;

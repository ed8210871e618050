pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::CommerceConfig;

pub use core::merch::{MerchDecorator, MerchLink, MerchOutcome};
pub use core::service::{Collaborators, CommerceService, CommerceSettings, LocaleSettings};
pub use utils::error::{CommerceError, Result};

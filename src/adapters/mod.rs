// Adapters layer: concrete implementations of the domain ports (http, localization, fixed data)

pub mod fixed;
pub mod http;
pub mod localize;

pub use fixed::{StaticCheckoutLinks, StaticEntitlements, StaticPlaceholders, StaticSession};
pub use http::{build_http_client, HttpCheckoutLinkSource, HttpEntitlementSource};
pub use localize::PathLocalizer;

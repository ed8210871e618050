pub mod actions;
pub mod cache;
pub mod checkout_link;
pub mod context;
pub mod families;
pub mod merch;
pub mod quiz;
pub mod service;

pub use crate::domain::model::{CheckoutAction, CheckoutOptions, Offer, Resolution};
pub use crate::domain::ports::{CommerceLibrary, SessionStatus};
pub use crate::utils::error::Result;

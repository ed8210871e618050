use crate::domain::model::{
    CheckoutContext, CheckoutLinkTable, CommerceContext, EntitlementRecord, MerchElement, Offer,
    PriceContext, UpgradeAction,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// 遠端資料來源 A：使用者的 entitlement 清單
#[async_trait]
pub trait EntitlementSource: Send + Sync {
    /// `Ok(None)` means the source answered but had nothing usable.
    async fn fetch_entitlements(&self) -> Result<Option<Vec<EntitlementRecord>>>;
}

/// 遠端資料來源 B：checkout-link 對照表
#[async_trait]
pub trait CheckoutLinkSource: Send + Sync {
    async fn fetch_checkout_links(&self) -> Result<CheckoutLinkTable>;
}

#[async_trait]
pub trait SessionStatus: Send + Sync {
    async fn is_signed_in(&self) -> Result<bool>;
}

/// Rewrites a raw path or URL into a locale-correct absolute URL.
pub trait LinkLocalizer: Send + Sync {
    fn localize_link(&self, raw: &str) -> String;
}

#[async_trait]
pub trait Placeholders: Send + Sync {
    async fn replace_key(&self, key: &str) -> String;
}

/// Page-wide upgrade offer element.
#[async_trait]
pub trait UpgradeOffer: Send + Sync + Debug {
    fn wcs_osi(&self) -> &str;

    /// Resolves once the offer finished its own async enrichment.
    async fn once_settled(&self);
}

#[async_trait]
pub trait UpgradeFlow: Send + Sync {
    async fn locate_upgrade_offer(&self) -> Option<Arc<dyn UpgradeOffer>>;

    async fn handle_upgrade_offer(
        &self,
        product_family: &str,
        upgrade_offer: &dyn UpgradeOffer,
        entitlements: &[EntitlementRecord],
        single_app_families: &[&str],
        all_apps_families: &[&str],
    ) -> Result<Option<UpgradeAction>>;
}

/// Used when the page has no upgrade offer at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUpgradeFlow;

#[async_trait]
impl UpgradeFlow for NoUpgradeFlow {
    async fn locate_upgrade_offer(&self) -> Option<Arc<dyn UpgradeOffer>> {
        None
    }

    async fn handle_upgrade_offer(
        &self,
        _product_family: &str,
        _upgrade_offer: &dyn UpgradeOffer,
        _entitlements: &[EntitlementRecord],
        _single_app_families: &[&str],
        _all_apps_families: &[&str],
    ) -> Result<Option<UpgradeAction>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFrame {
    pub id: String,
    pub src: String,
    pub frame_class: String,
    pub close_event: String,
    pub classes: Vec<String>,
}

pub trait ModalOpener: Send + Sync {
    fn open_frame(&self, frame: CheckoutFrame);
}

/// External commerce/checkout library.
#[async_trait]
pub trait CommerceLibrary: Send + Sync {
    async fn resolve_offers(&self, context: &CommerceContext) -> Result<Vec<Offer>>;

    async fn create_checkout_link(
        &self,
        context: &CheckoutContext,
        text: &str,
    ) -> Result<MerchElement>;

    /// `price_literals_url` points at the localized price wording table.
    async fn create_inline_price(
        &self,
        context: &PriceContext,
        price_literals_url: &str,
    ) -> Result<MerchElement>;
}

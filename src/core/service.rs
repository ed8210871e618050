use crate::core::cache::MemoCache;
use crate::core::checkout_link::resolve_checkout_link_config;
use crate::domain::model::{CheckoutLinkTable, EffectiveCheckoutConfig, EntitlementRecord};
use crate::domain::ports::{
    CheckoutLinkSource, EntitlementSource, LinkLocalizer, NoUpgradeFlow, Placeholders,
    SessionStatus, UpgradeFlow, UpgradeOffer,
};
use crate::utils::error::{CommerceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

pub const DEFAULT_CHECKOUT_LINK_URL: &str = "https://milo.adobe.com/libs/commerce/checkout-link.json";
pub const DEFAULT_PRICE_LITERALS_URL: &str =
    "https://milo.adobe.com/libs/commerce/price-literals.json";
pub const DEFAULT_CHECKOUT_CLIENT_ID: &str = "adobe_com";
pub const DEFAULT_CHECKOUT_WORKFLOW: &str = "UCv3";
pub const DEFAULT_CHECKOUT_WORKFLOW_STEP: &str = "email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleSettings {
    pub prefix: String,
    pub region: String,
    pub ietf: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            region: String::new(),
            ietf: "en-US".to_string(),
        }
    }
}

/// Service-wide settings; fills checkout context fields a link leaves unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommerceSettings {
    pub env: String,
    pub locale: LocaleSettings,
    pub checkout_client_id: String,
    pub checkout_workflow: String,
    pub checkout_workflow_step: String,
    pub checkout_link_url: String,
    pub price_literals_url: String,
}

impl Default for CommerceSettings {
    fn default() -> Self {
        Self {
            env: "prod".to_string(),
            locale: LocaleSettings::default(),
            checkout_client_id: DEFAULT_CHECKOUT_CLIENT_ID.to_string(),
            checkout_workflow: DEFAULT_CHECKOUT_WORKFLOW.to_string(),
            checkout_workflow_step: DEFAULT_CHECKOUT_WORKFLOW_STEP.to_string(),
            checkout_link_url: DEFAULT_CHECKOUT_LINK_URL.to_string(),
            price_literals_url: DEFAULT_PRICE_LITERALS_URL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub entitlements: Arc<dyn EntitlementSource>,
    pub checkout_links: Arc<dyn CheckoutLinkSource>,
    pub localizer: Arc<dyn LinkLocalizer>,
    pub placeholders: Arc<dyn Placeholders>,
    pub upgrade: Arc<dyn UpgradeFlow>,
}

impl Collaborators {
    pub fn new(
        entitlements: Arc<dyn EntitlementSource>,
        checkout_links: Arc<dyn CheckoutLinkSource>,
        localizer: Arc<dyn LinkLocalizer>,
        placeholders: Arc<dyn Placeholders>,
    ) -> Self {
        Self {
            entitlements,
            checkout_links,
            localizer,
            placeholders,
            upgrade: Arc::new(NoUpgradeFlow),
        }
    }

    pub fn with_upgrade_flow(mut self, upgrade: Arc<dyn UpgradeFlow>) -> Self {
        self.upgrade = upgrade;
        self
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

type EntitlementsFetch = std::result::Result<Option<Arc<[EntitlementRecord]>>, Arc<CommerceError>>;
type CheckoutLinksFetch = Option<Arc<CheckoutLinkTable>>;

/// 一次 init 的快取集合，強制重新初始化時整組換掉
#[derive(Debug, Default)]
struct ServiceCaches {
    generation: u64,
    entitlements: MemoCache<EntitlementsFetch>,
    checkout_links: MemoCache<CheckoutLinksFetch>,
}

impl ServiceCaches {
    fn with_generation(generation: u64) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }
}

pub struct CommerceService {
    settings: CommerceSettings,
    pub(crate) collaborators: Collaborators,
    caches: RwLock<Arc<ServiceCaches>>,
    // 整個 service 生命週期只找一次，找不到也會被記住；reinit 不會清掉
    upgrade_offer: MemoCache<Option<Arc<dyn UpgradeOffer>>>,
}

impl CommerceService {
    pub fn new(settings: CommerceSettings, collaborators: Collaborators) -> Self {
        tracing::debug!(
            "Commerce service created (env: {}, region: '{}')",
            settings.env,
            settings.locale.region
        );
        Self {
            settings,
            collaborators,
            caches: RwLock::new(Arc::new(ServiceCaches::default())),
            upgrade_offer: MemoCache::new(),
        }
    }

    pub fn settings(&self) -> &CommerceSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.caches().generation
    }

    fn caches(&self) -> Arc<ServiceCaches> {
        Arc::clone(&self.caches.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Forced re-init: drops the init state and both data caches in one swap.
    pub fn reinit(&self) {
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        let generation = caches.generation + 1;
        *caches = Arc::new(ServiceCaches::with_generation(generation));
        tracing::debug!("🔄 Commerce service re-initialized (generation {})", generation);
    }

    pub fn invalidate_entitlements(&self) {
        self.caches().entitlements.invalidate();
    }

    pub fn invalidate_checkout_link_configs(&self) {
        self.caches().checkout_links.invalidate();
    }

    /// 已登入時預先抓取 entitlements
    pub async fn prefetch_entitlements(&self, session: &dyn SessionStatus) {
        match session.is_signed_in().await {
            Ok(true) => {
                if let Err(e) = self.fetch_entitlements().await {
                    tracing::warn!("Entitlement prefetch failed: {}", e);
                }
            }
            Ok(false) => tracing::debug!("Not signed in, skipping entitlement prefetch"),
            Err(e) => tracing::warn!("Could not read sign-in state: {}", e),
        }
    }

    pub async fn fetch_entitlements(&self) -> Result<Option<Arc<[EntitlementRecord]>>> {
        let source = Arc::clone(&self.collaborators.entitlements);
        let fetch = self.caches().entitlements.get_or_fetch(move || async move {
            match source.fetch_entitlements().await {
                Ok(records) => {
                    tracing::debug!(
                        "Fetched {} entitlements",
                        records.as_ref().map_or(0, Vec::len)
                    );
                    Ok(records.map(Arc::from))
                }
                Err(e) => {
                    tracing::error!("❌ Failed to fetch entitlements: {}", e);
                    Err(Arc::new(e))
                }
            }
        });
        fetch.await.map_err(CommerceError::from)
    }

    /// 對照表抓取失敗時回傳 `None`，不會丟出錯誤
    pub async fn fetch_checkout_link_configs(&self) -> Option<Arc<CheckoutLinkTable>> {
        let source = Arc::clone(&self.collaborators.checkout_links);
        let fetch = self.caches().checkout_links.get_or_fetch(move || async move {
            match source.fetch_checkout_links().await {
                Ok(table) => {
                    tracing::debug!("Fetched {} checkout link rows", table.data.len());
                    Some(Arc::new(table))
                }
                Err(e) => {
                    tracing::error!("❌ Failed to fetch checkout link configs: {}", e);
                    None
                }
            }
        });
        fetch.await
    }

    pub async fn get_checkout_link_config(
        &self,
        product_family: &str,
    ) -> Result<Option<EffectiveCheckoutConfig>> {
        let Some(table) = self.fetch_checkout_link_configs().await else {
            return Ok(None);
        };
        resolve_checkout_link_config(&table, product_family, &self.settings.locale.region)
    }

    /// Looks up the page-wide upgrade offer on first use only.
    ///
    /// The lookup lives in a shared future owned by the service, so a caller
    /// dropped mid-lookup does not restart it for the next one.
    pub async fn upgrade_offer(&self) -> Option<Arc<dyn UpgradeOffer>> {
        let flow = Arc::clone(&self.collaborators.upgrade);
        self.upgrade_offer
            .get_or_fetch(move || async move {
                let offer = flow.locate_upgrade_offer().await;
                tracing::debug!(
                    "Upgrade offer lookup: {:?}",
                    offer.as_ref().map(|o| o.wcs_osi().to_string())
                );
                offer
            })
            .await
    }
}

impl fmt::Debug for CommerceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommerceService")
            .field("settings", &self.settings)
            .field("generation", &self.generation())
            .field("upgrade_offer_looked_up", &self.upgrade_offer.is_primed())
            .finish()
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 使用者的一筆訂閱 (raw entitlement 格式)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_plan_available: Option<bool>,
    #[serde(default)]
    pub offer: EntitlementOffer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitlementOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub product_arrangement: ProductArrangementRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductArrangementRef {
    #[serde(default)]
    pub family: String,
}

impl EntitlementRecord {
    pub fn for_family(family: &str) -> Self {
        Self {
            change_plan_available: None,
            offer: EntitlementOffer {
                offer_id: None,
                product_arrangement: ProductArrangementRef {
                    family: family.to_string(),
                },
            },
        }
    }

    pub fn subscription_family(&self) -> &str {
        &self.offer.product_arrangement.family
    }
}

/// checkout-link 對照表的一列，LOCALE 為空字串代表預設列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLinkRow {
    #[serde(rename = "PRODUCT_FAMILY", default)]
    pub product_family: String,
    #[serde(rename = "LOCALE", default)]
    pub locale: String,
    #[serde(rename = "DOWNLOAD_TEXT", default)]
    pub download_text: String,
    #[serde(rename = "DOWNLOAD_URL", default)]
    pub download_url: String,
    #[serde(rename = "FREE_TRIAL_PATH", default)]
    pub free_trial_path: String,
    #[serde(rename = "BUY_NOW_PATH", default)]
    pub buy_now_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLinkTable {
    #[serde(default)]
    pub data: Vec<CheckoutLinkRow>,
}

/// 預設列與地區覆寫列合併後的結果
pub type EffectiveCheckoutConfig = CheckoutLinkRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutLinkColumn {
    FreeTrialPath,
    BuyNowPath,
}

impl CheckoutLinkRow {
    pub fn column(&self, column: CheckoutLinkColumn) -> &str {
        match column {
            CheckoutLinkColumn::FreeTrialPath => &self.free_trial_path,
            CheckoutLinkColumn::BuyNowPath => &self.buy_now_path,
        }
    }
}

pub const OFFER_TYPE_TRIAL: &str = "TRIAL";

/// Offer resolved by the commerce library for a merch link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<String>,
    #[serde(default)]
    pub product_arrangement: ProductArrangement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductArrangement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_family: Option<String>,
}

impl Offer {
    pub fn new(product_family: &str, offer_type: &str) -> Self {
        Self {
            offer_id: None,
            offer_type: Some(offer_type.to_string()),
            product_arrangement: ProductArrangement {
                product_family: Some(product_family.to_string()),
            },
        }
    }

    pub fn is_trial(&self) -> bool {
        self.offer_type.as_deref() == Some(OFFER_TYPE_TRIAL)
    }
}

/// Fields shared by checkout and price contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceContext {
    pub wcs_osi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perpetual: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContext {
    #[serde(flatten)]
    pub link: CommerceContext,
    pub checkout_client_id: String,
    pub checkout_workflow: String,
    pub checkout_workflow_step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_market_segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<String>,
}

impl CheckoutContext {
    pub fn options(&self) -> CheckoutOptions {
        CheckoutOptions {
            entitlement: parse_flag(self.entitlement.as_deref()),
            modal: parse_flag(self.modal.as_deref()),
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTemplate {
    #[default]
    #[serde(rename = "price")]
    Regular,
    Discount,
    Optical,
    Strikethrough,
}

impl PriceTemplate {
    /// 支援舊版 OST 連結的別名
    pub fn from_type_param(value: Option<&str>) -> Self {
        match value {
            Some("discount") | Some("priceDiscount") => Self::Discount,
            Some("optical") | Some("priceOptical") => Self::Optical,
            Some("strikethrough") | Some("priceStrikethrough") => Self::Strikethrough,
            _ => Self::Regular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "price",
            Self::Discount => "discount",
            Self::Optical => "optical",
            Self::Strikethrough => "strikethrough",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceContext {
    #[serde(flatten)]
    pub link: CommerceContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_old_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_per_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_recurrence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_tax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_tax_exclusive: Option<String>,
    pub template: PriceTemplate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub entitlement: Option<bool>,
    pub modal: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadAction {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub url: String,
}

/// Checkout path opened in an embedded frame instead of navigating away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalAction {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckoutAction {
    Download(DownloadAction),
    Upgrade(UpgradeAction),
    Modal(ModalAction),
}

impl CheckoutAction {
    pub fn url(&self) -> &str {
        match self {
            Self::Download(action) => &action.url,
            Self::Upgrade(action) => &action.url,
            Self::Modal(action) => &action.url,
        }
    }
}

/// 單一 resolver 的結果：明確關閉、不適用、或得到 action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Suppressed,
    Absent,
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Suppressed | Self::Absent => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Suppressed => Resolution::Suppressed,
            Self::Absent => Resolution::Absent,
            Self::Resolved(value) => Resolution::Resolved(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Resolved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Link,
    Span,
}

/// Element produced by the commerce library and decorated by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchElement {
    pub kind: ElementKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub classes: Vec<String>,
    pub dataset: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<ModalAction>,
}

impl MerchElement {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            href: None,
            classes: Vec::new(),
            dataset: BTreeMap::new(),
            modal: None,
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

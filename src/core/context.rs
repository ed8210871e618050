use crate::core::service::CommerceSettings;
use crate::domain::model::{CheckoutContext, CommerceContext, PriceContext, PriceTemplate};
use url::Url;

/// Query parameters of a merch link; `get` returns the first value like
/// `URLSearchParams.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().into_owned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn get_owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// 沒有 `osi` 參數就不是 commerce 連結
pub fn get_commerce_context(
    params: &QueryParams,
    ancestor_promotion_code: Option<&str>,
) -> Option<CommerceContext> {
    let wcs_osi = params.get("osi").filter(|osi| !osi.is_empty())?;
    let perpetual = (params.get("perp") == Some("true")).then_some(true);
    // promo 參數存在時即使是空字串也不再往下找
    let promotion_code = params
        .get("promo")
        .or_else(|| params.get("promotionCode"))
        .or(ancestor_promotion_code)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    Some(CommerceContext {
        wcs_osi: wcs_osi.to_string(),
        promotion_code,
        perpetual,
    })
}

/// Builds the checkout context for a CTA link.
///
/// Workflow fields fall back to the service defaults only when the parameter
/// is absent; an empty value is kept as is.
pub fn get_checkout_context(
    params: &QueryParams,
    ancestor_promotion_code: Option<&str>,
    settings: &CommerceSettings,
) -> Option<CheckoutContext> {
    let link = get_commerce_context(params, ancestor_promotion_code)?;
    Some(CheckoutContext {
        link,
        checkout_client_id: settings.checkout_client_id.clone(),
        checkout_workflow: params
            .get_owned("workflow")
            .unwrap_or_else(|| settings.checkout_workflow.clone()),
        checkout_workflow_step: params
            .get_owned("workflowStep")
            .unwrap_or_else(|| settings.checkout_workflow_step.clone()),
        checkout_market_segment: params.get_owned("marketSegment"),
        entitlement: params.get_owned("entitlement"),
        modal: params.get_owned("modal"),
    })
}

pub fn get_price_context(
    params: &QueryParams,
    ancestor_promotion_code: Option<&str>,
) -> Option<PriceContext> {
    let link = get_commerce_context(params, ancestor_promotion_code)?;
    let display_old_price = link
        .promotion_code
        .as_ref()
        .and_then(|_| params.get_owned("old"));

    Some(PriceContext {
        link,
        display_old_price,
        display_per_unit: params.get_owned("seat"),
        display_recurrence: params.get_owned("term"),
        display_tax: params.get_owned("tax"),
        force_tax_exclusive: params.get_owned("exclusive"),
        template: PriceTemplate::from_type_param(params.get("type")),
    })
}

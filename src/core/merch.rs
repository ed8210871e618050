use crate::core::context::{get_checkout_context, get_price_context, QueryParams};
use crate::core::service::CommerceService;
use crate::domain::model::{CheckoutAction, MerchElement};
use crate::domain::ports::{CommerceLibrary, SessionStatus};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

pub const MERCH_CLASS: &str = "merch";
pub const CHECKOUT_URL_TYPE: &str = "checkoutUrl";

/// A merch link as authored on the page, with the bits of its surroundings
/// the decoration needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchLink {
    pub href: String,
    pub text: String,
    pub classes: Vec<String>,
    /// `data-promotion-code` of the closest ancestor carrying one.
    pub ancestor_promotion_code: Option<String>,
    pub inside_marquee: bool,
    pub strong: bool,
}

impl MerchLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
            classes: vec![MERCH_CLASS.to_string()],
            ..Default::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerchOutcome {
    /// Not a merch link; left untouched.
    Skipped,
    /// A merch link without a usable context (missing `osi`).
    NoContext,
    Rendered(MerchElement),
}

pub struct MerchDecorator {
    service: Arc<CommerceService>,
    library: Arc<dyn CommerceLibrary>,
    session: Arc<dyn SessionStatus>,
}

impl MerchDecorator {
    pub fn new(
        service: Arc<CommerceService>,
        library: Arc<dyn CommerceLibrary>,
        session: Arc<dyn SessionStatus>,
    ) -> Self {
        Self {
            service,
            library,
            session,
        }
    }

    pub async fn decorate(&self, link: &MerchLink) -> Result<MerchOutcome> {
        if !link.has_class(MERCH_CLASS) {
            return Ok(MerchOutcome::Skipped);
        }
        let url = Url::parse(&link.href)?;
        let params = QueryParams::from_url(&url);
        let is_cta = params.get("type") == Some(CHECKOUT_URL_TYPE);

        let element = if is_cta {
            self.build_cta(link, &params).await?
        } else {
            self.build_price(link, &params).await?
        };

        match element {
            Some(element) => {
                tracing::debug!("Rendering: {} ({:?})", link.href, element.kind);
                Ok(MerchOutcome::Rendered(element))
            }
            None => {
                tracing::warn!("⚠️ Failed to get context: {}", link.href);
                Ok(MerchOutcome::NoContext)
            }
        }
    }

    pub async fn build_cta(
        &self,
        link: &MerchLink,
        params: &QueryParams,
    ) -> Result<Option<MerchElement>> {
        let Some(context) = get_checkout_context(
            params,
            link.ancestor_promotion_code.as_deref(),
            self.service.settings(),
        ) else {
            return Ok(None);
        };

        let text = strip_cta_marker(&link.text);
        let mut element = self.library.create_checkout_link(&context, text).await?;
        element.add_class("con-button");
        element.toggle_class("button-l", link.inside_marquee);
        element.toggle_class("blue", link.strong);

        let offers = self.library.resolve_offers(&context.link).await?;
        let action = self
            .service
            .get_checkout_action(&offers, &context.options(), self.session.as_ref())
            .await;
        if let Some(action) = action {
            apply_checkout_action(&mut element, action);
        }
        Ok(Some(element))
    }

    pub async fn build_price(
        &self,
        link: &MerchLink,
        params: &QueryParams,
    ) -> Result<Option<MerchElement>> {
        let Some(context) = get_price_context(params, link.ancestor_promotion_code.as_deref())
        else {
            return Ok(None);
        };
        let element = self
            .library
            .create_inline_price(&context, &self.service.settings().price_literals_url)
            .await?;
        Ok(Some(element))
    }
}

/// 去掉作者用來標記 CTA 的 "CTA " 前綴
pub fn strip_cta_marker(text: &str) -> &str {
    match text.strip_prefix("CTA ") {
        Some(rest) => rest.trim_start_matches(' '),
        None => text,
    }
}

pub fn apply_checkout_action(element: &mut MerchElement, action: CheckoutAction) {
    match action {
        CheckoutAction::Download(download) => {
            element.text = download.text;
            element.href = Some(download.url);
        }
        CheckoutAction::Upgrade(upgrade) => {
            if let Some(text) = upgrade.text {
                element.text = text;
            }
            element.href = Some(upgrade.url);
        }
        CheckoutAction::Modal(modal) => {
            element.href = Some("#".to_string());
            element.modal = Some(modal);
        }
    }
}

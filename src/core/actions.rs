//! Checkout action resolvers: download, upgrade and modal, plus the
//! combinator that picks one of them for a merch link.
//!
//! Every resolver returns a [`Resolution`]: `Suppressed` when the caller
//! turned the feature off, `Absent` when it does not apply, `Resolved` with
//! the action otherwise. Only unexpected faults come back as `Err`.

use crate::core::families::{is_family_eligible, single_app_families, CC_ALL_APPS};
use crate::core::service::CommerceService;
use crate::domain::model::{
    CheckoutAction, CheckoutLinkColumn, CheckoutOptions, DownloadAction, ModalAction, Offer,
    Resolution, UpgradeAction, OFFER_TYPE_TRIAL,
};
use crate::domain::ports::{CheckoutFrame, ModalOpener, SessionStatus};
use crate::utils::error::Result;
use url::Url;

pub const PLACEHOLDER_KEY_DOWNLOAD: &str = "download";
pub const CHECKOUT_MODAL_ID: &str = "checkout-link-modal";
pub const CHECKOUT_MODAL_CLOSE_EVENT: &str = "closeModal";

impl CommerceService {
    pub async fn get_download_action(
        &self,
        options: &CheckoutOptions,
        session: &dyn SessionStatus,
        offer_family: Option<&str>,
    ) -> Result<Resolution<DownloadAction>> {
        if options.entitlement == Some(false) {
            return Ok(Resolution::Suppressed);
        }
        if !session.is_signed_in().await? {
            return Ok(Resolution::Absent);
        }
        let entitlements = match self.fetch_entitlements().await? {
            Some(records) if !records.is_empty() => records,
            _ => return Ok(Resolution::Absent),
        };
        let Some(family) = offer_family else {
            return Ok(Resolution::Absent);
        };
        let Some(config) = self.get_checkout_link_config(family).await? else {
            return Ok(Resolution::Absent);
        };

        let entitled = entitlements
            .iter()
            .any(|record| is_family_eligible(Some(family), record.subscription_family()));
        if !entitled {
            tracing::debug!("No entitlement covers {}", family);
            return Ok(Resolution::Absent);
        }

        let key = if config.download_text.is_empty() {
            PLACEHOLDER_KEY_DOWNLOAD
        } else {
            config.download_text.as_str()
        };
        let text = self.collaborators.placeholders.replace_key(key).await;
        let url = self.collaborators.localizer.localize_link(&config.download_url);
        Ok(Resolution::Resolved(DownloadAction { text, url }))
    }

    pub async fn get_upgrade_action(
        &self,
        options: &CheckoutOptions,
        session: &dyn SessionStatus,
        product_family: Option<&str>,
    ) -> Result<Resolution<UpgradeAction>> {
        if options.entitlement == Some(false) {
            return Ok(Resolution::Suppressed);
        }
        if !session.is_signed_in().await? {
            return Ok(Resolution::Absent);
        }
        let entitlements = self.fetch_entitlements().await?;

        let upgrade_offer = self.upgrade_offer().await;
        if let Some(offer) = &upgrade_offer {
            offer.once_settled().await;
        }

        match (upgrade_offer, entitlements, product_family) {
            (Some(offer), Some(entitlements), Some(family))
                if !entitlements.is_empty() && !family.is_empty() =>
            {
                let single_apps = single_app_families();
                let action = self
                    .collaborators
                    .upgrade
                    .handle_upgrade_offer(
                        family,
                        offer.as_ref(),
                        &entitlements,
                        &single_apps,
                        CC_ALL_APPS,
                    )
                    .await?;
                Ok(action.into())
            }
            _ => Ok(Resolution::Absent),
        }
    }

    pub async fn get_modal_action(
        &self,
        offers: &[Offer],
        options: &CheckoutOptions,
        product_family: Option<&str>,
    ) -> Result<Resolution<ModalAction>> {
        if options.modal != Some(true) {
            return Ok(Resolution::Suppressed);
        }
        let Some(family) = product_family else {
            return Ok(Resolution::Absent);
        };
        let Some(config) = self.get_checkout_link_config(family).await? else {
            return Ok(Resolution::Absent);
        };

        let first_offer = offers.first();
        let column = if first_offer.is_some_and(Offer::is_trial) {
            CheckoutLinkColumn::FreeTrialPath
        } else {
            CheckoutLinkColumn::BuyNowPath
        };
        let raw = config.column(column);
        if raw.is_empty() {
            return Ok(Resolution::Absent);
        }

        Ok(Resolution::Resolved(ModalAction {
            url: self.collaborators.localizer.localize_link(raw),
            offer_type: first_offer.and_then(|offer| offer.offer_type.clone()),
        }))
    }

    /// 三個 resolver 同時執行，依 download > upgrade > modal 的順序取第一個結果
    ///
    /// Never fails: any resolver error is logged and turns into `None`.
    pub async fn get_checkout_action(
        &self,
        offers: &[Offer],
        options: &CheckoutOptions,
        session: &dyn SessionStatus,
    ) -> Option<CheckoutAction> {
        let product_family = offers
            .first()
            .and_then(|offer| offer.product_arrangement.product_family.as_deref());

        let resolved = tokio::try_join!(
            self.get_download_action(options, session, product_family),
            self.get_upgrade_action(options, session, product_family),
            self.get_modal_action(offers, options, product_family),
        );

        match resolved {
            Ok((download, upgrade, modal)) => download
                .into_option()
                .map(CheckoutAction::Download)
                .or_else(|| upgrade.into_option().map(CheckoutAction::Upgrade))
                .or_else(|| modal.into_option().map(CheckoutAction::Modal)),
            Err(e) => {
                tracing::error!("❌ Failed to resolve checkout action: {}", e);
                None
            }
        }
    }
}

/// 只對 http(s) 連結開啟 modal，其餘靜默忽略
pub fn open_modal(action: &ModalAction, opener: &dyn ModalOpener) -> bool {
    let is_web = Url::parse(&action.url)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !is_web {
        tracing::debug!("Ignoring non-http modal url: {}", action.url);
        return false;
    }

    let frame_class = if action.offer_type.as_deref() == Some(OFFER_TYPE_TRIAL) {
        "twp"
    } else {
        "d2p"
    };
    opener.open_frame(CheckoutFrame {
        id: CHECKOUT_MODAL_ID.to_string(),
        src: action.url.clone(),
        frame_class: frame_class.to_string(),
        close_event: CHECKOUT_MODAL_CLOSE_EVENT.to_string(),
        classes: vec!["commerce-frame".to_string()],
    });
    true
}

use async_trait::async_trait;
use commerce_cta::adapters::{StaticPlaceholders, StaticSession};
use commerce_cta::core::service::{Collaborators, CommerceService, CommerceSettings};
use commerce_cta::domain::model::{
    CheckoutAction, CheckoutLinkRow, CheckoutLinkTable, CheckoutOptions, EntitlementRecord, Offer,
    Resolution, UpgradeAction,
};
use commerce_cta::domain::ports::{
    CheckoutLinkSource, EntitlementSource, LinkLocalizer, SessionStatus, UpgradeFlow, UpgradeOffer,
};
use commerce_cta::utils::error::{CommerceError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// 計數用的假資料來源
#[derive(Default)]
struct CountingEntitlements {
    records: Option<Vec<EntitlementRecord>>,
    calls: AtomicUsize,
}

#[async_trait]
impl EntitlementSource for CountingEntitlements {
    async fn fetch_entitlements(&self) -> Result<Option<Vec<EntitlementRecord>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.records.clone())
    }
}

#[derive(Default)]
struct CountingCheckoutLinks {
    table: CheckoutLinkTable,
    fail: bool,
    delay_ms: u64,
    calls: AtomicUsize,
}

#[async_trait]
impl CheckoutLinkSource for CountingCheckoutLinks {
    async fn fetch_checkout_links(&self) -> Result<CheckoutLinkTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
        if self.fail {
            return Err(CommerceError::MalformedDataError {
                message: "checkout-link.json is not valid JSON".to_string(),
            });
        }
        Ok(self.table.clone())
    }
}

struct IdentityLocalizer;

impl LinkLocalizer for IdentityLocalizer {
    fn localize_link(&self, raw: &str) -> String {
        raw.to_string()
    }
}

struct RejectingSession;

#[async_trait]
impl SessionStatus for RejectingSession {
    async fn is_signed_in(&self) -> Result<bool> {
        Err(CommerceError::SessionError {
            message: "identity service unavailable".to_string(),
        })
    }
}

#[derive(Debug)]
struct PageUpgradeOffer;

#[async_trait]
impl UpgradeOffer for PageUpgradeOffer {
    fn wcs_osi(&self) -> &str {
        "upgrade-osi"
    }

    async fn once_settled(&self) {}
}

#[derive(Default)]
struct RecordingUpgradeFlow {
    offer_present: bool,
    delay_ms: u64,
    lookups: AtomicUsize,
}

#[async_trait]
impl UpgradeFlow for RecordingUpgradeFlow {
    async fn locate_upgrade_offer(&self) -> Option<Arc<dyn UpgradeOffer>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.offer_present {
            Some(Arc::new(PageUpgradeOffer))
        } else {
            None
        }
    }

    async fn handle_upgrade_offer(
        &self,
        product_family: &str,
        _upgrade_offer: &dyn UpgradeOffer,
        entitlements: &[EntitlementRecord],
        single_app_families: &[&str],
        all_apps_families: &[&str],
    ) -> Result<Option<UpgradeAction>> {
        let owns_single_app = entitlements
            .iter()
            .any(|record| single_app_families.contains(&record.subscription_family()));
        if all_apps_families.contains(&product_family) && owns_single_app {
            Ok(Some(UpgradeAction {
                text: Some("Upgrade now".to_string()),
                url: "https://commerce.adobe.com/upgrade".to_string(),
            }))
        } else {
            Ok(None)
        }
    }
}

fn row(family: &str, locale: &str) -> CheckoutLinkRow {
    CheckoutLinkRow {
        product_family: family.to_string(),
        locale: locale.to_string(),
        ..Default::default()
    }
}

fn sample_table() -> CheckoutLinkTable {
    CheckoutLinkTable {
        data: vec![
            CheckoutLinkRow {
                download_url: "https://x/ps".to_string(),
                buy_now_path: "https://www.adobe.com/buy/photoshop".to_string(),
                free_trial_path: "https://www.adobe.com/trial/photoshop".to_string(),
                ..row("PHOTOSHOP", "")
            },
            CheckoutLinkRow {
                download_url: "https://x/ps-fr".to_string(),
                free_trial_path: "❌".to_string(),
                ..row("PHOTOSHOP", "fr")
            },
            CheckoutLinkRow {
                download_text: "open-apps".to_string(),
                download_url: "https://x/cc".to_string(),
                ..row("CC_ALL_APPS", "")
            },
            CheckoutLinkRow {
                buy_now_path: "X".to_string(),
                ..row("ILLUSTRATOR", "")
            },
            // 只有地區列、沒有預設列
            CheckoutLinkRow {
                buy_now_path: "https://www.adobe.com/fr/buy/xd".to_string(),
                ..row("XD", "fr")
            },
        ],
    }
}

fn entitled_to(families: &[&str]) -> Option<Vec<EntitlementRecord>> {
    Some(families.iter().map(|f| EntitlementRecord::for_family(f)).collect())
}

struct Fixture {
    service: CommerceService,
    entitlements: Arc<CountingEntitlements>,
    checkout_links: Arc<CountingCheckoutLinks>,
    upgrade: Arc<RecordingUpgradeFlow>,
}

fn fixture(region: &str, records: Option<Vec<EntitlementRecord>>, upgrade_offer_present: bool) -> Fixture {
    fixture_with(
        region,
        records,
        CountingCheckoutLinks {
            table: sample_table(),
            ..Default::default()
        },
        RecordingUpgradeFlow {
            offer_present: upgrade_offer_present,
            ..Default::default()
        },
    )
}

fn fixture_with(
    region: &str,
    records: Option<Vec<EntitlementRecord>>,
    checkout_links: CountingCheckoutLinks,
    upgrade: RecordingUpgradeFlow,
) -> Fixture {
    let entitlements = Arc::new(CountingEntitlements {
        records,
        ..Default::default()
    });
    let checkout_links = Arc::new(checkout_links);
    let upgrade = Arc::new(upgrade);

    let mut settings = CommerceSettings::default();
    settings.locale.region = region.to_string();

    let collaborators = Collaborators::new(
        entitlements.clone(),
        checkout_links.clone(),
        Arc::new(IdentityLocalizer),
        Arc::new(StaticPlaceholders::new(HashMap::from([
            ("download".to_string(), "Download".to_string()),
            ("open-apps".to_string(), "Open apps".to_string()),
        ]))),
    )
    .with_upgrade_flow(upgrade.clone());

    Fixture {
        service: CommerceService::new(settings, collaborators),
        entitlements,
        checkout_links,
        upgrade,
    }
}

fn modal_options() -> CheckoutOptions {
    CheckoutOptions {
        entitlement: None,
        modal: Some(true),
    }
}

#[tokio::test]
async fn test_regional_override_replaces_fields_and_clears_sentinels() {
    let f = fixture("fr", None, false);

    let config = f
        .service
        .get_checkout_link_config("PHOTOSHOP")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(config.download_url, "https://x/ps-fr");
    assert_eq!(config.free_trial_path, "");
    assert_eq!(config.buy_now_path, "https://www.adobe.com/buy/photoshop");
    assert!(f.service.get_checkout_link_config("LIGHTROOM").await.unwrap().is_none());
}

#[tokio::test]
async fn test_download_wins_over_modal() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let offers = vec![Offer::new("PHOTOSHOP", "BASE")];

    let action = f
        .service
        .get_checkout_action(&offers, &modal_options(), &StaticSession(true))
        .await;

    match action {
        Some(CheckoutAction::Download(download)) => {
            assert_eq!(download.text, "Download");
            assert_eq!(download.url, "https://x/ps");
        }
        other => panic!("expected download action, got {:?}", other),
    }
}

#[tokio::test]
async fn test_all_apps_entitlement_downloads_any_family() {
    let f = fixture("", entitled_to(&["CC_ALL_APPS"]), false);

    let download = f
        .service
        .get_download_action(&CheckoutOptions::default(), &StaticSession(true), Some("CC_ALL_APPS"))
        .await
        .unwrap()
        .into_option()
        .unwrap();

    assert_eq!(download.text, "Open apps");
    assert_eq!(download.url, "https://x/cc");

    let photoshop = f
        .service
        .get_download_action(&CheckoutOptions::default(), &StaticSession(true), Some("PHOTOSHOP"))
        .await
        .unwrap();
    assert!(matches!(photoshop, Resolution::Resolved(_)));
}

#[tokio::test]
async fn test_download_absent_cases() {
    let options = CheckoutOptions::default();

    let signed_out = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let result = signed_out
        .service
        .get_download_action(&options, &StaticSession(false), Some("PHOTOSHOP"))
        .await
        .unwrap();
    assert_eq!(result, Resolution::Absent);
    assert_eq!(signed_out.entitlements.calls.load(Ordering::SeqCst), 0);

    let no_entitlements = fixture("", Some(vec![]), false);
    let result = no_entitlements
        .service
        .get_download_action(&options, &StaticSession(true), Some("PHOTOSHOP"))
        .await
        .unwrap();
    assert_eq!(result, Resolution::Absent);

    let unknown_family = fixture("", entitled_to(&["CC_ALL_APPS"]), false);
    let result = unknown_family
        .service
        .get_download_action(&options, &StaticSession(true), Some("LIGHTROOM"))
        .await
        .unwrap();
    assert_eq!(result, Resolution::Absent);

    let other_family = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let result = other_family
        .service
        .get_download_action(&options, &StaticSession(true), Some("ILLUSTRATOR"))
        .await
        .unwrap();
    assert_eq!(result, Resolution::Absent);
}

#[tokio::test]
async fn test_entitlement_false_suppresses_download_and_upgrade() {
    let f = fixture("", entitled_to(&["CC_ALL_APPS"]), true);
    let options = CheckoutOptions {
        entitlement: Some(false),
        modal: None,
    };

    let download = f
        .service
        .get_download_action(&options, &RejectingSession, Some("CC_ALL_APPS"))
        .await
        .unwrap();
    let upgrade = f
        .service
        .get_upgrade_action(&options, &RejectingSession, Some("CC_ALL_APPS"))
        .await
        .unwrap();

    assert!(download.is_suppressed());
    assert!(upgrade.is_suppressed());
    assert_eq!(f.entitlements.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_suppressed_download_falls_through_to_modal() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let options = CheckoutOptions {
        entitlement: Some(false),
        modal: Some(true),
    };
    let offers = vec![Offer::new("PHOTOSHOP", "TRIAL")];

    let action = f
        .service
        .get_checkout_action(&offers, &options, &StaticSession(true))
        .await;

    match action {
        Some(CheckoutAction::Modal(modal)) => {
            assert_eq!(modal.url, "https://www.adobe.com/trial/photoshop");
            assert_eq!(modal.offer_type.as_deref(), Some("TRIAL"));
        }
        other => panic!("expected modal action, got {:?}", other),
    }
}

#[tokio::test]
async fn test_modal_without_flag_or_with_disabled_path() {
    let f = fixture("", None, false);

    let not_requested = f
        .service
        .get_modal_action(&[Offer::new("PHOTOSHOP", "BASE")], &CheckoutOptions::default(), Some("PHOTOSHOP"))
        .await
        .unwrap();
    assert!(not_requested.is_suppressed());

    let disabled = f
        .service
        .get_modal_action(&[Offer::new("ILLUSTRATOR", "BASE")], &modal_options(), Some("ILLUSTRATOR"))
        .await
        .unwrap();
    assert_eq!(disabled, Resolution::Absent);
}

#[tokio::test]
async fn test_rejected_session_yields_no_action() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let offers = vec![Offer::new("PHOTOSHOP", "BASE")];

    let action = f
        .service
        .get_checkout_action(&offers, &modal_options(), &RejectingSession)
        .await;

    assert_eq!(action, None);
}

#[tokio::test]
async fn test_upgrade_wins_over_modal_and_offer_lookup_runs_once() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), true);
    let offers = vec![Offer::new("CC_ALL_APPS", "BASE")];

    for _ in 0..3 {
        let action = f
            .service
            .get_checkout_action(&offers, &modal_options(), &StaticSession(true))
            .await;
        assert!(matches!(action, Some(CheckoutAction::Upgrade(ref upgrade)) if upgrade.url == "https://commerce.adobe.com/upgrade"));
    }

    f.service.reinit();
    let _ = f
        .service
        .get_upgrade_action(&CheckoutOptions::default(), &StaticSession(true), Some("CC_ALL_APPS"))
        .await
        .unwrap();

    assert_eq!(f.upgrade.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_upgrade_offer_is_remembered() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);

    for _ in 0..2 {
        let upgrade = f
            .service
            .get_upgrade_action(&CheckoutOptions::default(), &StaticSession(true), Some("CC_ALL_APPS"))
            .await
            .unwrap();
        assert_eq!(upgrade, Resolution::Absent);
    }
    assert_eq!(f.upgrade.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_resolution_fetches_each_dataset_once() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let offers = vec![Offer::new("PHOTOSHOP", "BASE")];
    let session = StaticSession(true);
    let options_a = modal_options();
    let options_b = modal_options();

    let (first, second) = tokio::join!(
        f.service.get_checkout_action(&offers, &options_a, &session),
        f.service.get_checkout_action(&offers, &options_b, &session),
    );

    assert_eq!(first, second);
    assert_eq!(f.entitlements.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.checkout_links.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reinit_refetches_both_datasets() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);
    let offers = vec![Offer::new("PHOTOSHOP", "BASE")];
    let session = StaticSession(true);

    f.service
        .get_checkout_action(&offers, &modal_options(), &session)
        .await;
    assert_eq!(f.service.generation(), 0);

    f.service.reinit();
    f.service
        .get_checkout_action(&offers, &modal_options(), &session)
        .await;

    assert_eq!(f.service.generation(), 1);
    assert_eq!(f.entitlements.calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.checkout_links.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_prefetch_only_when_signed_in() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);

    f.service.prefetch_entitlements(&StaticSession(false)).await;
    assert_eq!(f.entitlements.calls.load(Ordering::SeqCst), 0);

    f.service.prefetch_entitlements(&StaticSession(true)).await;
    f.service
        .get_download_action(&CheckoutOptions::default(), &StaticSession(true), Some("PHOTOSHOP"))
        .await
        .unwrap();
    assert_eq!(f.entitlements.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upgrade_lookup_survives_cancelled_resolution() {
    let f = fixture_with(
        "fr",
        entitled_to(&["PHOTOSHOP"]),
        CountingCheckoutLinks {
            table: sample_table(),
            delay_ms: 10,
            ..Default::default()
        },
        RecordingUpgradeFlow {
            offer_present: false,
            delay_ms: 50,
            ..Default::default()
        },
    );
    let offers = vec![Offer::new("XD", "BASE")];

    // modal 先失敗，try_join 會丟掉還在等待的 upgrade lookup
    let action = f
        .service
        .get_checkout_action(&offers, &modal_options(), &StaticSession(true))
        .await;
    assert_eq!(action, None);

    let upgrade = f
        .service
        .get_upgrade_action(&CheckoutOptions::default(), &StaticSession(true), Some("XD"))
        .await
        .unwrap();
    assert_eq!(upgrade, Resolution::Absent);
    assert_eq!(f.upgrade.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_checkout_link_fetch_is_absent_and_cached() {
    let f = fixture_with(
        "",
        entitled_to(&["PHOTOSHOP"]),
        CountingCheckoutLinks {
            fail: true,
            ..Default::default()
        },
        RecordingUpgradeFlow::default(),
    );
    let session = StaticSession(true);

    assert!(f.service.fetch_checkout_link_configs().await.is_none());
    let download = f
        .service
        .get_download_action(&CheckoutOptions::default(), &session, Some("PHOTOSHOP"))
        .await
        .unwrap();
    let modal = f
        .service
        .get_modal_action(&[Offer::new("PHOTOSHOP", "BASE")], &modal_options(), Some("PHOTOSHOP"))
        .await
        .unwrap();
    assert_eq!(download, Resolution::Absent);
    assert_eq!(modal, Resolution::Absent);
    assert_eq!(f.checkout_links.calls.load(Ordering::SeqCst), 1);

    f.service.invalidate_checkout_link_configs();
    assert!(f.service.fetch_checkout_link_configs().await.is_none());
    assert_eq!(f.checkout_links.calls.load(Ordering::SeqCst), 2);

    f.service.reinit();
    assert!(f.service.fetch_checkout_link_configs().await.is_none());
    assert_eq!(f.checkout_links.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_family_without_default_row_yields_no_action() {
    let f = fixture("fr", entitled_to(&["CC_ALL_APPS"]), false);
    let offers = vec![Offer::new("XD", "BASE")];

    let modal = f
        .service
        .get_modal_action(&offers, &modal_options(), Some("XD"))
        .await;
    assert!(matches!(modal, Err(CommerceError::MalformedDataError { .. })));

    let action = f
        .service
        .get_checkout_action(&offers, &modal_options(), &StaticSession(true))
        .await;
    assert_eq!(action, None);
}

#[tokio::test]
async fn test_invalidate_entitlements_refetches_only_entitlements() {
    let f = fixture("", entitled_to(&["PHOTOSHOP"]), false);

    f.service.fetch_entitlements().await.unwrap();
    f.service.fetch_checkout_link_configs().await;
    f.service.invalidate_entitlements();
    f.service.fetch_entitlements().await.unwrap();
    f.service.fetch_checkout_link_configs().await;

    assert_eq!(f.entitlements.calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.checkout_links.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.service.generation(), 0);
}

use crate::domain::model::{CheckoutLinkRow, CheckoutLinkTable, EffectiveCheckoutConfig};
use crate::utils::error::{CommerceError, Result};

/// Cell values that explicitly disable a column for a locale.
pub const DISABLED_SENTINELS: &[&str] = &["X", "❌"];

/// 合併 family 的預設列與地區覆寫列
///
/// Returns `Ok(None)` when the table has no row for `product_family`, and a
/// `MalformedDataError` when rows exist but none of them is the default row.
pub fn resolve_checkout_link_config(
    table: &CheckoutLinkTable,
    product_family: &str,
    region: &str,
) -> Result<Option<EffectiveCheckoutConfig>> {
    let family_rows: Vec<&CheckoutLinkRow> = table
        .data
        .iter()
        .filter(|row| row.product_family == product_family)
        .collect();
    if family_rows.is_empty() {
        return Ok(None);
    }

    let default_row = family_rows
        .iter()
        .find(|row| row.locale.is_empty())
        .ok_or_else(|| CommerceError::MalformedDataError {
            message: format!("no default checkout-link row for family {}", product_family),
        })?;
    let override_row = family_rows
        .iter()
        .find(|row| row.locale == region)
        .map(|row| (*row).clone())
        .unwrap_or_default();

    let mut config = (*default_row).clone();
    overlay(&mut config.product_family, override_row.product_family);
    overlay(&mut config.locale, override_row.locale);
    overlay(&mut config.download_text, override_row.download_text);
    overlay(&mut config.download_url, override_row.download_url);
    overlay(&mut config.free_trial_path, override_row.free_trial_path);
    overlay(&mut config.buy_now_path, override_row.buy_now_path);

    for field in [
        &mut config.product_family,
        &mut config.locale,
        &mut config.download_text,
        &mut config.download_url,
        &mut config.free_trial_path,
        &mut config.buy_now_path,
    ] {
        if is_disabled(field) {
            field.clear();
        }
    }

    Ok(Some(config))
}

fn overlay(target: &mut String, value: String) {
    if !value.is_empty() {
        *target = value;
    }
}

pub fn is_disabled(value: &str) -> bool {
    DISABLED_SENTINELS.contains(&value)
}

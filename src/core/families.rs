//! Product family groupings used to decide download and upgrade eligibility.

/// Single-app classes: a base app and its stock bundle variant.
pub const CC_SINGLE_APPS: &[&[&str]] = &[
    &["3D_TEXTURING"],
    &["3DI"],
    &["ACROBAT", "ACROBAT_STOCK_BUNDLE"],
    &["AFTEREFFECTS", "AFTER_EFFECTS_STOCK_BUNDLE"],
    &["AUDITION", "AUDITION_STOCK_BUNDLE"],
    &["CC_EXPRESS"],
    &["FLASH", "FLASH_STOCK_BUNDLE"],
    &["DREAMWEAVER", "DREAMWEAVER_STOCK_BUNDLE"],
    &["EDGE_ANIMATE"],
    &["ILLUSTRATOR", "ILLUSTRATOR_STOCK_BUNDLE"],
    &["INCOPY", "INCOPY_STOCK_BUNDLE"],
    &["INDESIGN", "INDESIGN_STOCK_BUNDLE"],
    &["PHOTOGRAPHY", "PHOTOGRAPHY_STOCK_BUNDLE"],
    &["PHOTOSHOP_LIGHTROOM"],
    &["PHOTOSHOP", "PHOTOSHOP_STOCK_BUNDLE"],
    &["PREMIERE", "PREMIERE_STOCK_BUNDLE"],
    &["RUSH"],
    &["XD"],
];

pub const CC_ALL_APPS: &[&str] = &["CC_ALL_APPS", "CC_ALL_APPS_STOCK_BUNDLE", "CC_PRO"];

pub fn single_app_families() -> Vec<&'static str> {
    CC_SINGLE_APPS.iter().flat_map(|class| class.iter().copied()).collect()
}

pub fn is_all_apps(family: &str) -> bool {
    CC_ALL_APPS.contains(&family)
}

pub fn single_app_class(family: &str) -> Option<&'static [&'static str]> {
    CC_SINGLE_APPS
        .iter()
        .copied()
        .find(|class| class.contains(&family))
}

/// 使用者的訂閱 family 是否涵蓋連結要求的 family
pub fn is_family_eligible(offer_family: Option<&str>, subscription_family: &str) -> bool {
    if is_all_apps(subscription_family) {
        return true;
    }
    let Some(offer_family) = offer_family else {
        return false;
    };
    if is_all_apps(offer_family) {
        return false;
    }
    single_app_class(offer_family).is_some_and(|class| class.contains(&subscription_family))
}

use crate::domain::ports::LinkLocalizer;
use url::Url;

/// Prefixes site-relative paths (and absolute links on production domains)
/// with the current locale prefix.
#[derive(Debug, Clone)]
pub struct PathLocalizer {
    origin: Url,
    prefix: String,
    prod_domains: Vec<String>,
}

impl PathLocalizer {
    pub fn new(origin: Url, prefix: impl Into<String>, prod_domains: Vec<String>) -> Self {
        Self {
            origin,
            prefix: prefix.into(),
            prod_domains,
        }
    }

    fn prefixed_path(&self, path: &str) -> String {
        if self.prefix.is_empty()
            || path == self.prefix
            || path.starts_with(&format!("{}/", self.prefix))
        {
            path.to_string()
        } else {
            format!("{}{}", self.prefix, path)
        }
    }
}

impl LinkLocalizer for PathLocalizer {
    fn localize_link(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        if raw.starts_with('/') && !raw.starts_with("//") {
            return match self.origin.join(&self.prefixed_path(raw)) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::debug!("Could not localize '{}': {}", raw, e);
                    raw.to_string()
                }
            };
        }

        let Ok(mut url) = Url::parse(raw) else {
            return raw.to_string();
        };
        let on_prod_domain = url
            .host_str()
            .is_some_and(|host| self.prod_domains.iter().any(|domain| domain == host));
        if !on_prod_domain {
            return raw.to_string();
        }
        let path = self.prefixed_path(url.path());
        url.set_path(&path);
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localizer(prefix: &str) -> PathLocalizer {
        PathLocalizer::new(
            Url::parse("https://www.adobe.com").unwrap(),
            prefix,
            vec!["www.adobe.com".to_string(), "helpx.adobe.com".to_string()],
        )
    }

    #[test]
    fn test_relative_paths_get_origin_and_prefix() {
        assert_eq!(
            localizer("/fr").localize_link("/cc-shared/fragments/buy-modals/photoshop"),
            "https://www.adobe.com/fr/cc-shared/fragments/buy-modals/photoshop"
        );
        assert_eq!(
            localizer("").localize_link("/cc-shared/fragments/buy-modals/photoshop"),
            "https://www.adobe.com/cc-shared/fragments/buy-modals/photoshop"
        );
    }

    #[test]
    fn test_prod_domain_links_are_prefixed_once() {
        let fr = localizer("/fr");
        assert_eq!(
            fr.localize_link("https://www.adobe.com/mini-plans/illustrator.html?mid=ft&web=1"),
            "https://www.adobe.com/fr/mini-plans/illustrator.html?mid=ft&web=1"
        );
        assert_eq!(
            fr.localize_link("https://www.adobe.com/fr/mini-plans/illustrator.html"),
            "https://www.adobe.com/fr/mini-plans/illustrator.html"
        );
    }

    #[test]
    fn test_foreign_domains_are_untouched() {
        let raw = "https://creativecloud.adobe.com/fr/apps/download/photoshop?q=123";
        assert_eq!(localizer("/fr").localize_link(raw), raw);
        assert_eq!(localizer("/fr").localize_link("not a url"), "not a url");
        assert_eq!(localizer("/fr").localize_link(""), "");
    }
}

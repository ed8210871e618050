use crate::adapters::{PathLocalizer, StaticPlaceholders};
use crate::core::quiz::QuizDataRequest;
use crate::core::service::{
    CommerceSettings, LocaleSettings, DEFAULT_CHECKOUT_CLIENT_ID, DEFAULT_CHECKOUT_LINK_URL,
    DEFAULT_CHECKOUT_WORKFLOW, DEFAULT_CHECKOUT_WORKFLOW_STEP, DEFAULT_PRICE_LITERALS_URL,
};
use crate::utils::error::{CommerceError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_ORIGIN: &str = "https://www.adobe.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommerceConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub placeholders: HashMap<String, String>,
    pub quiz: Option<QuizConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub env: String,
    pub checkout_link_url: String,
    pub price_literals_url: String,
    pub entitlements_endpoint: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            env: "prod".to_string(),
            checkout_link_url: DEFAULT_CHECKOUT_LINK_URL.to_string(),
            price_literals_url: DEFAULT_PRICE_LITERALS_URL.to_string(),
            entitlements_endpoint: None,
            access_token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub prefix: String,
    pub region: String,
    pub ietf: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        let locale = LocaleSettings::default();
        Self {
            prefix: locale.prefix,
            region: locale.region,
            ietf: locale.ietf,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub client_id: String,
    pub workflow: String,
    pub workflow_step: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CHECKOUT_CLIENT_ID.to_string(),
            workflow: DEFAULT_CHECKOUT_WORKFLOW.to_string(),
            workflow_step: DEFAULT_CHECKOUT_WORKFLOW_STEP.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub origin: String,
    pub prod_domains: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            prod_domains: vec!["www.adobe.com".to_string(), "helpx.adobe.com".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub question_url: Option<String>,
    pub string_url: Option<String>,
}

impl CommerceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CommerceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COMMERCE_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| CommerceError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("service.env", &self.service.env)?;
        validation::validate_url("service.checkout_link_url", &self.service.checkout_link_url)?;
        validation::validate_url("service.price_literals_url", &self.service.price_literals_url)?;
        if let Some(endpoint) = &self.service.entitlements_endpoint {
            validation::validate_url("service.entitlements_endpoint", endpoint)?;
        }
        validation::validate_positive_number(
            "service.timeout_seconds",
            self.service.timeout_seconds,
            1,
        )?;

        validation::validate_locale_prefix("locale.prefix", &self.locale.prefix)?;
        validation::validate_non_empty_string("locale.ietf", &self.locale.ietf)?;

        validation::validate_non_empty_string("checkout.client_id", &self.checkout.client_id)?;
        validation::validate_non_empty_string("checkout.workflow", &self.checkout.workflow)?;
        validation::validate_url("site.origin", &self.site.origin)?;

        if let Some(quiz) = &self.quiz {
            self.quiz_request_from(quiz)?;
        }
        Ok(())
    }

    pub fn settings(&self) -> CommerceSettings {
        CommerceSettings {
            env: self.service.env.clone(),
            locale: LocaleSettings {
                prefix: self.locale.prefix.clone(),
                region: self.locale.region.clone(),
                ietf: self.locale.ietf.clone(),
            },
            checkout_client_id: self.checkout.client_id.clone(),
            checkout_workflow: self.checkout.workflow.clone(),
            checkout_workflow_step: self.checkout.workflow_step.clone(),
            checkout_link_url: self.service.checkout_link_url.clone(),
            price_literals_url: self.service.price_literals_url.clone(),
        }
    }

    pub fn localizer(&self) -> Result<PathLocalizer> {
        let origin = Url::parse(&self.site.origin)?;
        Ok(PathLocalizer::new(
            origin,
            self.locale.prefix.clone(),
            self.site.prod_domains.clone(),
        ))
    }

    pub fn placeholders(&self) -> StaticPlaceholders {
        StaticPlaceholders::new(self.placeholders.clone())
    }

    /// `[quiz]` 區段存在時兩個 URL 都必須提供
    pub fn quiz_request(&self) -> Result<QuizDataRequest> {
        let quiz = validation::validate_required_field("quiz", &self.quiz)?;
        self.quiz_request_from(quiz)
    }

    fn quiz_request_from(&self, quiz: &QuizConfig) -> Result<QuizDataRequest> {
        let question_url = validation::validate_required_field("quiz.question_url", &quiz.question_url)?;
        let string_url = validation::validate_required_field("quiz.string_url", &quiz.string_url)?;
        validation::validate_url("quiz.question_url", question_url)?;
        validation::validate_url("quiz.string_url", string_url)?;
        Ok(QuizDataRequest {
            question_url: question_url.clone(),
            string_url: string_url.clone(),
        })
    }
}

impl Validate for CommerceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use crate::utils::error::{CommerceError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "commerce-cta")]
#[command(about = "Resolve merch links into checkout contexts and call-to-action overrides")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a merch href into its contexts and checkout action
    Resolve(ResolveArgs),
    /// Load quiz question and string documents once
    Quiz(QuizArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Merch link href, e.g. https://milo.adobe.com/tools/ost?osi=...&type=checkoutUrl
    pub href: String,

    #[arg(long, help = "Product family of the resolved offer")]
    pub offer_family: Option<String>,

    #[arg(long, default_value = "BASE", help = "Offer type of the resolved offer")]
    pub offer_type: String,

    #[arg(long, help = "Treat the visitor as signed in")]
    pub signed_in: bool,

    #[arg(long, help = "Read entitlements from a local JSON file")]
    pub entitlements_file: Option<PathBuf>,

    #[arg(long, help = "Read the checkout-link table from a local JSON file")]
    pub checkout_links_file: Option<PathBuf>,

    #[arg(long, help = "Promotion code inherited from an ancestor element")]
    pub promotion_code: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct QuizArgs {
    #[arg(long)]
    pub question_url: Option<String>,

    #[arg(long)]
    pub string_url: Option<String>,
}

impl QuizArgs {
    /// 兩個 URL 必須同時給或同時省略 (省略時改用設定檔的 `[quiz]`)
    pub fn url_pair(&self) -> Result<Option<(&str, &str)>> {
        match (&self.question_url, &self.string_url) {
            (Some(question_url), Some(string_url)) => {
                Ok(Some((question_url.as_str(), string_url.as_str())))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(CommerceError::MissingConfigError {
                field: "string_url".to_string(),
            }),
            (None, Some(_)) => Err(CommerceError::MissingConfigError {
                field: "question_url".to_string(),
            }),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Resolve(args) => {
                validate_url("href", &args.href)?;
                validate_non_empty_string("offer_type", &args.offer_type)?;
                if let Some(family) = &args.offer_family {
                    validate_non_empty_string("offer_family", family)?;
                }
            }
            Command::Quiz(args) => {
                args.url_pair()?;
                if let Some(url) = &args.question_url {
                    validate_url("question_url", url)?;
                }
                if let Some(url) = &args.string_url {
                    validate_url("string_url", url)?;
                }
            }
        }
        Ok(())
    }
}

use crate::adapters::{
    HttpCheckoutLinkSource, HttpEntitlementSource, StaticCheckoutLinks, StaticEntitlements,
    StaticSession,
};
use crate::config::{CommerceConfig, QuizArgs, ResolveArgs};
use crate::core::context::{get_checkout_context, get_commerce_context, get_price_context, QueryParams};
use crate::core::quiz::{spawn_quiz_worker, QuizDataRequest, QuizReply};
use crate::core::service::{Collaborators, CommerceService};
use crate::domain::model::{CheckoutAction, CheckoutContext, CommerceContext, Offer, PriceContext};
use crate::domain::ports::{CheckoutLinkSource, EntitlementSource};
use crate::utils::error::{CommerceError, Result};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    pub href: String,
    pub commerce_context: Option<CommerceContext>,
    pub checkout_context: Option<CheckoutContext>,
    pub price_context: Option<PriceContext>,
    pub offers: Vec<Offer>,
    pub action: Option<CheckoutAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub question_url: String,
    pub string_url: String,
    pub questions: usize,
    pub strings: usize,
}

/// 依設定與命令列參數組出 service：本地檔案優先，其次 HTTP
pub fn build_service(
    config: &CommerceConfig,
    client: &Client,
    args: &ResolveArgs,
) -> Result<CommerceService> {
    let entitlements: Arc<dyn EntitlementSource> = match (
        &args.entitlements_file,
        &config.service.entitlements_endpoint,
    ) {
        (Some(path), _) => Arc::new(StaticEntitlements::from_json_file(path)?),
        (None, Some(endpoint)) => Arc::new(HttpEntitlementSource::new(
            client.clone(),
            endpoint.clone(),
            config.service.access_token.clone(),
        )),
        (None, None) => {
            tracing::debug!("No entitlement source configured");
            Arc::new(StaticEntitlements::default())
        }
    };

    let checkout_links: Arc<dyn CheckoutLinkSource> = match &args.checkout_links_file {
        Some(path) => Arc::new(StaticCheckoutLinks::from_json_file(path)?),
        None => Arc::new(HttpCheckoutLinkSource::new(
            client.clone(),
            config.service.checkout_link_url.clone(),
        )),
    };

    let collaborators = Collaborators::new(
        entitlements,
        checkout_links,
        Arc::new(config.localizer()?),
        Arc::new(config.placeholders()),
    );
    Ok(CommerceService::new(config.settings(), collaborators))
}

pub async fn run_resolve(
    config: &CommerceConfig,
    client: &Client,
    args: &ResolveArgs,
) -> Result<ResolveReport> {
    let service = build_service(config, client, args)?;
    let url = Url::parse(&args.href)?;
    let params = QueryParams::from_url(&url);
    let ancestor_promo = args.promotion_code.as_deref();

    let commerce_context = get_commerce_context(&params, ancestor_promo);
    let checkout_context = get_checkout_context(&params, ancestor_promo, service.settings());
    let price_context = get_price_context(&params, ancestor_promo);

    let offers: Vec<Offer> = args
        .offer_family
        .iter()
        .map(|family| Offer::new(family, &args.offer_type))
        .collect();

    let session = StaticSession(args.signed_in);
    service.prefetch_entitlements(&session).await;

    let action = match &checkout_context {
        Some(context) => {
            service
                .get_checkout_action(&offers, &context.options(), &session)
                .await
        }
        None => {
            tracing::warn!("⚠️ No checkout context for {}", args.href);
            None
        }
    };

    Ok(ResolveReport {
        href: args.href.clone(),
        commerce_context,
        checkout_context,
        price_context,
        offers,
        action,
    })
}

pub async fn run_quiz(config: &CommerceConfig, client: &Client, args: &QuizArgs) -> Result<QuizSummary> {
    let request = match args.url_pair()? {
        Some((question_url, string_url)) => QuizDataRequest {
            question_url: question_url.to_string(),
            string_url: string_url.to_string(),
        },
        None => config.quiz_request()?,
    };

    let worker = spawn_quiz_worker(client.clone());
    let reply = worker.request(request.clone()).await;
    worker.shutdown().await;

    match reply? {
        QuizReply::Data(data) => Ok(QuizSummary {
            question_url: request.question_url,
            string_url: request.string_url,
            questions: data.question_list.len(),
            strings: data.string_q_list.len(),
        }),
        QuizReply::Error { error } => Err(CommerceError::WorkerError { message: error }),
    }
}

//! Teaser Dispatcher Lambda - Ideates the campaign product and posts the teaser on a schedule.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use shared::ideation::ProductIdeator;
use shared::PoemService;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct ScheduledEvent {
    // EventBridge scheduled event
    #[serde(default, rename = "detail-type")]
    detail_type: String,
}

#[derive(Debug, Serialize)]
struct TeaserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    product_idea: Option<String>,
    posted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweet_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    posted_at: String,
}

/// Application state
struct AppState {
    service: PoemService,
    ideator: ProductIdeator,
}

impl AppState {
    async fn new() -> Self {
        let config = shared::load_config().await;
        let ideator = ProductIdeator::from_config(&config);

        Self {
            service: PoemService::from_config(config),
            ideator,
        }
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ScheduledEvent>,
) -> Result<TeaserResponse, Error> {
    info!(detail_type = %event.payload.detail_type, "Dispatching teaser");

    let config = state.service.config();
    let product_idea = match state
        .ideator
        .ideate(&config.campaign_prompt, &config.campaign_trends)
        .await
    {
        Ok(idea) => {
            info!(product_idea = %idea, "Campaign product ideated");
            Some(idea)
        }
        Err(e) => {
            warn!(error = %e, "Product ideation skipped");
            None
        }
    };

    let posted_at = chrono::Utc::now().to_rfc3339();
    let response = match state.service.post_teaser().await {
        Ok(url) => {
            info!(tweet_url = %url, "Teaser posted");
            TeaserResponse {
                product_idea,
                posted: true,
                tweet_url: Some(url),
                error: None,
                posted_at,
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to post teaser");
            TeaserResponse {
                product_idea,
                posted: false,
                tweet_url: None,
                error: Some(e.to_string()),
                posted_at,
            }
        }
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

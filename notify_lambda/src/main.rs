use bm_app::ContextProvider;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use tracing::info;
use types::PipelineEvent;

mod push;

use push::{AppSyncClient, SegmentSummaryInput};

#[derive(Debug, Clone, Deserialize)]
struct Config {
    appsync_api_endpoint_url: String,
    appsync_api_key: String,
}

#[derive(Debug, Clone)]
struct AppContext {
    appsync: AppSyncClient,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, _aws_config: aws_config::SdkConfig) -> Self {
        Self {
            appsync: AppSyncClient::new(
                config.appsync_api_endpoint_url,
                config.appsync_api_key,
            ),
        }
    }
}

/// Push the finished segment's status summary to AppSync subscribers,
/// then hand the event back unchanged.
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<PipelineEvent>,
) -> Result<PipelineEvent, Error> {
    let event = event.payload;

    if !event.config.notify_enabled {
        info!("Notification disabled; skipping push");
        return Ok(event);
    }

    let status = event
        .status_summary
        .ok_or("event is missing statusSummary")?;

    let input = SegmentSummaryInput {
        stream_id: &event.parsed.stream_id,
        start_date_time: &event.parsed.last_segment.start_date_time,
        duration_sec: event.parsed.last_segment.duration_sec,
        s3_key: &event.parsed.last_segment.s3_key,
        thumbnail_key: event.thumbnail_key.as_deref(),
        status,
    };

    context.appsync.notify_segment_ready(&input).await?;
    info!("success pushing to AppSync");

    Ok(event)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let context = bm_app::create_app_context::<AppContext, Config>().await?;

    run(service_fn(|event| async {
        function_handler(&context, event).await
    }))
    .await
}

use std::collections::BTreeSet;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use bm_app::ContextProvider;
use bm_store::convert::json_to_attr;
use bm_store::{
    AttrUpdate, DynamoFrameStore, DynamoSegmentStore, FrameStore, Record,
    SegmentStore,
};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use tracing::{info, warn};
use types::PipelineEvent;

mod checks;

use checks::{FrameCheck, Thresholds};

#[derive(Debug, Clone, Deserialize)]
struct Config {
    frame_table: String,
    segment_table: String,

    #[serde(flatten)]
    thresholds: Thresholds,
}

#[derive(Debug, Clone)]
struct AppContext {
    frame_store: DynamoFrameStore,
    segment_store: DynamoSegmentStore,
    thresholds: Thresholds,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        let client = DynamoDbClient::new(&aws_config);

        Self {
            frame_store: DynamoFrameStore::new(
                client.clone(),
                config.frame_table,
            ),
            segment_store: DynamoSegmentStore::new(
                client,
                config.segment_table,
            ),
            thresholds: config.thresholds,
        }
    }
}

/// Roll the per-frame detections up into per-check segment attributes. Only
/// checks whose configuration flags are all enabled run; with none active
/// the event passes through untouched.
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<PipelineEvent>,
) -> Result<PipelineEvent, Error> {
    let event = event.payload;

    let enabled = event.config.active_checks();
    let active: Vec<FrameCheck> = FrameCheck::ALL
        .into_iter()
        .filter(|check| {
            check.required().iter().all(|name| enabled.contains(name))
        })
        .collect();

    if active.is_empty() {
        info!("No active configurations to process; skipping consolidation");
        return Ok(event);
    }

    let projection: Vec<String> = active
        .iter()
        .flat_map(|check| check.attributes())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|attribute| (*attribute).to_string())
        .collect();

    let mut frame_data = Vec::with_capacity(event.frames.len());
    for frame_ref in &event.frames {
        let frame = context
            .frame_store
            .get_frame(&frame_ref.stream_id, &frame_ref.date_time, &projection)
            .await?;

        if frame.is_none() {
            warn!("Frame {} not found", frame_ref.date_time);
        }
        frame_data.push(frame.unwrap_or_else(Record::new));
    }

    let updates: Vec<AttrUpdate> = active
        .iter()
        .flat_map(|check| check.evaluate(&frame_data, &context.thresholds))
        .map(|(name, value)| (name, json_to_attr(&value)))
        .collect();

    context
        .segment_store
        .update_segment(
            &event.parsed.stream_id,
            &event.parsed.last_segment.start_date_time,
            updates,
        )
        .await?;

    info!("{} frame checks completed", active.len());

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

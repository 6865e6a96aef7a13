use aws_sdk_dynamodb::Client as DynamoDbClient;
use bm_app::ContextProvider;
use bm_store::convert::json_to_attr;
use bm_store::{AttrUpdate, DynamoFrameStore, FrameStore};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use tracing::{info, warn};
use types::{CheckName, PipelineEvent, attrs};

mod combine;

#[derive(Debug, Clone, Deserialize)]
struct Config {
    frame_table: String,
}

#[derive(Debug, Clone)]
struct AppContext {
    frame_store: DynamoFrameStore,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        Self {
            frame_store: DynamoFrameStore::new(
                DynamoDbClient::new(&aws_config),
                config.frame_table,
            ),
        }
    }
}

/// For each frame of the segment, merge the text-modality and logo-modality
/// team detections into `TeamN_Status` / `TeamN_Detection_Confidence` on
/// the frame row. Runs when either team modality is enabled.
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<PipelineEvent>,
) -> Result<PipelineEvent, Error> {
    let event = event.payload;

    if !event.config.is_enabled(CheckName::TeamText)
        && !event.config.is_enabled(CheckName::TeamLogo)
    {
        info!("No team checks active; skipping team consolidation");
        return Ok(event);
    }

    let projection = combine::projection();

    for frame_ref in &event.frames {
        let Some(frame) = context
            .frame_store
            .get_frame(&frame_ref.stream_id, &frame_ref.date_time, &projection)
            .await?
        else {
            warn!("Frame {} not found; skipping", frame_ref.date_time);
            continue;
        };

        let updates: Vec<AttrUpdate> = attrs::TEAM_PREFIXES
            .iter()
            .flat_map(|prefix| combine::team_attrs(prefix, &frame))
            .map(|(name, value)| (name, json_to_attr(&value)))
            .collect();

        context
            .frame_store
            .update_frame(&frame_ref.stream_id, &frame_ref.date_time, updates)
            .await?;

        info!("Team data consolidated for frame: {}", frame_ref.date_time);
    }

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

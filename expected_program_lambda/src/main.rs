use aws_sdk_dynamodb::Client as DynamoDbClient;
use bm_app::ContextProvider;
use bm_store::{DynamoScheduleStore, DynamoSegmentStore, SegmentStore};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use tracing::info;
use types::{CheckName, PipelineEvent, ReusePlan, millis};

mod resolver;

#[derive(Debug, Clone, Deserialize)]
struct Config {
    schedule_table: String,
    segment_table: String,
}

#[derive(Debug, Clone)]
struct AppContext {
    schedule_store: DynamoScheduleStore,
    segment_store: DynamoSegmentStore,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        let client = DynamoDbClient::new(&aws_config);

        Self {
            schedule_store: DynamoScheduleStore::new(
                client.clone(),
                config.schedule_table,
            ),
            segment_store: DynamoSegmentStore::new(
                client,
                config.segment_table,
            ),
        }
    }
}

/// Resolve the expected program for the incoming segment, decide whether a
/// past segment's detections can be reused, and narrow the enabled checks
/// to what the program actually calls for.
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<PipelineEvent>,
) -> Result<PipelineEvent, Error> {
    let mut event = event.payload;
    let stream_id = event.parsed.stream_id.clone();
    let segment = event.parsed.last_segment.clone();

    let start_time_relative = segment
        .start_time_relative
        .ok_or("segment is missing startTimeRelative")?;

    let program = resolver::resolve(
        &context.schedule_store,
        &stream_id,
        start_time_relative,
        segment.duration_sec,
    )
    .await?;

    let reuse = if event.config.reuse_detection_if_available {
        let position_ms = millis::from_seconds(
            program.segment_start_time_in_loop.unwrap_or_default(),
        );

        match context
            .segment_store
            .find_reusable(
                &stream_id,
                position_ms,
                &segment.start_date_time,
                segment.duration_sec,
            )
            .await?
        {
            Some(source) => {
                info!("Found existing detections to reuse from {}", source);
                ReusePlan::hit(source)
            }
            None => {
                info!("Did not find existing detections to reuse");
                ReusePlan::miss()
            }
        }
    } else {
        ReusePlan::miss()
    };

    // A program without expected teams or sport gives those checks nothing
    // to compare against.
    if program.team_info.is_none() {
        event.config.disable(CheckName::TeamText);
        event.config.disable(CheckName::TeamLogo);
    }
    if program.sports_type.is_none() {
        event.config.disable(CheckName::Sports);
    }

    event.parsed.expected_program = Some(program);
    event.reuse = Some(reuse);

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

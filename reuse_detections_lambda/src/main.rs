use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::AttributeValue;
use bm_app::ContextProvider;
use bm_store::convert::json_to_attr;
use bm_store::{
    AttrUpdate, DynamoFrameStore, DynamoSegmentStore, FrameStore, Record,
    SegmentStore,
};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use tracing::{info, warn};
use types::{PipelineEvent, ReusePlan, attrs, segment_id};

mod copy_forward;

const fn default_reuse_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize)]
struct Config {
    frame_table: String,
    segment_table: String,

    /// Copied rows are throwaway duplicates; they expire after this long.
    #[serde(default = "default_reuse_ttl_hours")]
    reuse_ttl_hours: i64,
}

#[derive(Debug, Clone)]
struct AppContext {
    frame_store: DynamoFrameStore,
    segment_store: DynamoSegmentStore,
    reuse_ttl_hours: i64,
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
            reuse_ttl_hours: config.reuse_ttl_hours,
        }
    }
}

/// Copy the source segment's frame and segment detections onto the current
/// segment, then surface the source's status summary and thumbnail on the
/// event.
///
/// If the source segment row has expired since the reuse lookup found it,
/// this degrades to a cache miss: the event comes back with reuse disabled
/// and the workflow runs normal detection instead.
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<PipelineEvent>,
) -> Result<PipelineEvent, Error> {
    let mut event = event.payload;

    let Some(source_start) = event
        .reuse
        .as_ref()
        .filter(|plan| plan.enabled)
        .and_then(|plan| plan.segment.clone())
    else {
        warn!("No reuse source on the event; nothing to copy");
        event.reuse = Some(ReusePlan::miss());
        return Ok(event);
    };

    let stream_id = event.parsed.stream_id.clone();
    let dest_start = event.parsed.last_segment.start_date_time.clone();
    let expire_ttl = chrono::Utc::now().timestamp()
        + context.reuse_ttl_hours * 60 * 60;

    let Some(source_segment) = context
        .segment_store
        .get_segment(&stream_id, &source_start)
        .await?
    else {
        // Race with TTL expiry: the lookup saw a row that is gone now.
        warn!(
            "Reuse source segment {} vanished; falling back to detection",
            source_start
        );
        event.reuse = Some(ReusePlan::miss());
        return Ok(event);
    };

    event.thumbnail_key = copy_frames(
        context,
        &stream_id,
        &source_start,
        &dest_start,
        expire_ttl,
    )
    .await?;

    copy_segment(
        context,
        &source_segment,
        &stream_id,
        &source_start,
        &dest_start,
        expire_ttl,
    )
    .await?;

    let summary = copy_forward::status_summary(&source_segment);
    info!("Reused check status summary: {:?}", summary);
    event.status_summary = Some(summary);

    Ok(event)
}

/// Copy every frame row of the source segment, re-based onto the new
/// segment's timeline. Returns the thumbnail key of the first frame.
async fn copy_frames(
    context: &AppContext,
    stream_id: &str,
    source_start: &str,
    dest_start: &str,
    expire_ttl: i64,
) -> Result<Option<String>, Error> {
    let source_frames = context
        .frame_store
        .frames_for_segment(&segment_id(stream_id, source_start))
        .await?;

    info!("Found {} frames to reuse detections", source_frames.len());

    for source_frame in &source_frames {
        let frame = copy_forward::rebase_frame(
            source_frame,
            stream_id,
            dest_start,
            expire_ttl,
        )?;
        context.frame_store.put_frame(frame).await?;
    }

    Ok(source_frames.first().and_then(copy_forward::thumbnail_key))
}

/// Copy the source segment's detection attributes onto the destination row,
/// skipping whatever the destination already has, and stamp provenance.
async fn copy_segment(
    context: &AppContext,
    source_segment: &Record,
    stream_id: &str,
    source_start: &str,
    dest_start: &str,
    expire_ttl: i64,
) -> Result<(), Error> {
    let dest_segment = context
        .segment_store
        .get_segment(stream_id, dest_start)
        .await?
        .unwrap_or_default();

    let mut updates: Vec<AttrUpdate> =
        copy_forward::segment_attrs_to_copy(source_segment, &dest_segment)
            .iter()
            .map(|(name, value)| (name.clone(), json_to_attr(value)))
            .collect();

    updates.push((
        attrs::REUSED_DETECTION.to_string(),
        AttributeValue::Bool(true),
    ));
    updates.push((
        attrs::REUSED_FROM.to_string(),
        AttributeValue::S(copy_forward::reused_from(
            source_segment,
            source_start,
        )),
    ));
    updates.push((
        attrs::EXPIRE_TTL.to_string(),
        AttributeValue::N(expire_ttl.to_string()),
    ));

    context
        .segment_store
        .update_segment(stream_id, dest_start, updates)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let context = bm_app::create_app_context::<AppContext, Config>().await?;

    run(service_fn(|event| async {
        function_handler(&context, event).await
    }))
    .await
}

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::AttributeValue;
use bm_app::ContextProvider;
use bm_store::convert::{decimal_seconds, json_to_attr};
use bm_store::{AttrUpdate, DynamoSegmentStore, Record, SegmentStore};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use tracing::{info, warn};
use types::{
    AudioDetection, CheckName, CheckStatus, PipelineEvent, StatusSummary,
    attrs, millis,
};

mod audio;

#[derive(Debug, Clone, Deserialize)]
struct Config {
    segment_table: String,
}

#[derive(Debug, Clone)]
struct AppContext {
    segment_store: DynamoSegmentStore,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        Self {
            segment_store: DynamoSegmentStore::new(
                DynamoDbClient::new(&aws_config),
                config.segment_table,
            ),
        }
    }
}

/// Final consolidation for one segment: evaluate the audio check from the
/// raw detection, read back the frame-level verdicts, persist everything to
/// the segment row with `Finished = true`, and surface the summary and
/// thumbnail on the event for notification.
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<PipelineEvent>,
) -> Result<PipelineEvent, Error> {
    let mut event = event.payload;

    let stream_id = event.parsed.stream_id.clone();
    let segment_start = event.parsed.last_segment.start_date_time.clone();
    let segment_duration = event.parsed.last_segment.duration_sec;

    let start_time_relative = event
        .parsed
        .last_segment
        .start_time_relative
        .ok_or("segment is missing startTimeRelative")?;
    let start_in_loop = event
        .parsed
        .expected_program
        .as_ref()
        .ok_or("event is missing expectedProgram")?
        .segment_start_time_in_loop
        .ok_or("expected program is missing Segment_Start_Time_In_Loop")?;

    let mut updates: Vec<AttrUpdate> = vec![
        (
            attrs::START_TIME_SEC.to_string(),
            decimal_seconds(millis::from_seconds(start_time_relative)),
        ),
        (
            attrs::START_TIME_SEC_IN_LOOP.to_string(),
            decimal_seconds(millis::from_seconds(start_in_loop)),
        ),
    ];

    let audio_status = if event.config.is_enabled(CheckName::Audio) {
        process_audio_check(&event, segment_duration, &mut updates)?
    } else {
        CheckStatus::Unknown
    };

    // Frame-level verdicts were written by the preceding stages; read them
    // back for the summary.
    let segment = context
        .segment_store
        .get_segment(&stream_id, &segment_start)
        .await?
        .unwrap_or_default();

    let status_summary = StatusSummary {
        audio_status,
        station_status: stored_status(
            &event,
            &segment,
            CheckName::StationLogo,
            attrs::STATION_STATUS,
        ),
        team_status: stored_status(
            &event,
            &segment,
            CheckName::TeamText,
            attrs::TEAM_STATUS,
        ),
        sports_status: stored_status(
            &event,
            &segment,
            CheckName::Sports,
            attrs::SPORTS_STATUS,
        ),
    };

    // Finished last: it is what makes this segment visible to reuse lookups.
    updates.push((attrs::FINISHED.to_string(), AttributeValue::Bool(true)));

    context
        .segment_store
        .update_segment(&stream_id, &segment_start, updates)
        .await?;

    if let Some(key) = first_frame_thumbnail(&event) {
        event.thumbnail_key = Some(key);
    } else {
        warn!("No frame result with an S3 key; leaving thumbnail unset");
    }

    info!("Status summary: {:?}", status_summary);
    event.status_summary = Some(status_summary);

    Ok(event)
}

/// Evaluate the raw audio detection, appending its attributes to the
/// pending segment update. A detector error is recorded and leaves the
/// check undecided.
fn process_audio_check(
    event: &PipelineEvent,
    segment_duration: f64,
    updates: &mut Vec<AttrUpdate>,
) -> Result<CheckStatus, Error> {
    let raw = event
        .detections
        .get(PipelineEvent::AUDIO_RESULT)
        .ok_or("event is missing the audio detection result")?;
    let detection: AudioDetection = serde_json::from_value(raw.clone())?;

    if let Some(error) = detection.error {
        warn!("Audio detection failed: {}", error);
        updates.push((
            attrs::AUDIO_CHECK_ERROR.to_string(),
            AttributeValue::S(error),
        ));
        return Ok(CheckStatus::Unknown);
    }

    let eval = audio::eval_audio_status(&detection, segment_duration);

    if let Some(volume) = detection.volume {
        updates.push((
            attrs::VOLUME.to_string(),
            json_to_attr(&serde_json::to_value(volume)?),
        ));
    }
    updates.push((
        attrs::SILENCE.to_string(),
        AttributeValue::S(serde_json::to_string(&detection.silence_chunks)?),
    ));
    updates.push((
        attrs::AUDIO_STATUS.to_string(),
        AttributeValue::Bool(eval.audio_on),
    ));
    updates.push((
        attrs::SILENCE_DURATION.to_string(),
        AttributeValue::N(eval.silence_duration.to_string()),
    ));
    updates.push((
        attrs::SILENCE_CONFIDENCE.to_string(),
        AttributeValue::N(eval.silence_confidence.to_string()),
    ));

    info!("Audio on status: {}", eval.audio_on);
    Ok(eval.audio_on.into())
}

/// A frame-level verdict previously written to the segment row, or
/// `Unknown` when its check is disabled or never produced one.
fn stored_status(
    event: &PipelineEvent,
    segment: &Record,
    check: CheckName,
    attribute: &str,
) -> CheckStatus {
    if !event.config.is_enabled(check) {
        return CheckStatus::Unknown;
    }

    segment
        .get(attribute)
        .and_then(serde_json::Value::as_bool)
        .into()
}

fn first_frame_thumbnail(event: &PipelineEvent) -> Option<String> {
    event
        .detections
        .get(PipelineEvent::FRAME_RESULT)?
        .as_array()?
        .first()?
        .get(attrs::S3_KEY)?
        .as_str()
        .map(String::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let context = bm_app::create_app_context::<AppContext, Config>().await?;

    run(service_fn(|event| async {
        function_handler(&context, event).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> PipelineEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn audio_check_writes_results_and_passes() {
        let event = event(json!({
            "config": { "audio_check_enabled": true },
            "parsed": {
                "streamId": "test_1",
                "lastSegment": {
                    "s3Key": "live/test_1/test_1_00043.ts",
                    "durationSec": 6.0,
                    "startDateTime": "2020-02-22T22:15:59.375000Z",
                    "startTimeRelative": 254.3
                }
            },
            "detections": [
                {
                    "volume": { "mean": -29.2, "max": -13.9 },
                    "silence_chunks": []
                },
                [{ "S3_Key": "frames/a.jpg" }]
            ]
        }));

        let mut updates = Vec::new();
        let status =
            process_audio_check(&event, 6.0, &mut updates).unwrap();

        assert_eq!(status, CheckStatus::Pass);
        let names: Vec<&str> =
            updates.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Volume",
                "Silence",
                "Audio_Status",
                "Silence_Duration",
                "Silence_Confidence"
            ]
        );
    }

    #[test]
    fn audio_detector_error_leaves_the_check_undecided() {
        let event = event(json!({
            "config": { "audio_check_enabled": true },
            "parsed": {
                "streamId": "test_1",
                "lastSegment": {
                    "s3Key": "live/test_1/test_1_00043.ts",
                    "durationSec": 6.0,
                    "startDateTime": "2020-02-22T22:15:59.375000Z"
                }
            },
            "detections": [
                { "Error": "ffprobe timed out" },
                []
            ]
        }));

        let mut updates = Vec::new();
        let status =
            process_audio_check(&event, 6.0, &mut updates).unwrap();

        assert_eq!(status, CheckStatus::Unknown);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "Audio_Check_Error");
    }

    #[test]
    fn stored_status_respects_disabled_checks() {
        let event = event(json!({
            "config": { "station_logo_check_enabled": true },
            "parsed": {
                "streamId": "test_1",
                "lastSegment": {
                    "s3Key": "live/test_1/test_1_00043.ts",
                    "durationSec": 6.0,
                    "startDateTime": "2020-02-22T22:15:59.375000Z"
                }
            }
        }));
        let segment: Record = json!({
            "Station_Status": true,
            "Team_Status": true
        })
        .as_object()
        .unwrap()
        .clone();

        assert_eq!(
            stored_status(
                &event,
                &segment,
                CheckName::StationLogo,
                attrs::STATION_STATUS
            ),
            CheckStatus::Pass
        );
        // team check disabled, the stored value is ignored
        assert_eq!(
            stored_status(
                &event,
                &segment,
                CheckName::TeamText,
                attrs::TEAM_STATUS
            ),
            CheckStatus::Unknown
        );
        assert_eq!(
            stored_status(
                &event,
                &segment,
                CheckName::Sports,
                attrs::SPORTS_STATUS
            ),
            CheckStatus::Unknown
        );
    }

    #[test]
    fn thumbnail_comes_from_the_first_frame_result() {
        let event = event(json!({
            "config": {},
            "parsed": {
                "streamId": "test_1",
                "lastSegment": {
                    "s3Key": "live/test_1/test_1_00043.ts",
                    "durationSec": 6.0,
                    "startDateTime": "2020-02-22T22:15:59.375000Z"
                }
            },
            "detections": [
                { "silence_chunks": [] },
                [
                    { "S3_Key": "frames/first.jpg" },
                    { "S3_Key": "frames/second.jpg" }
                ]
            ]
        }));

        assert_eq!(
            first_frame_thumbnail(&event).as_deref(),
            Some("frames/first.jpg")
        );
    }
}

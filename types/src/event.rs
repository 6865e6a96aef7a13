use crate::{CheckStatus, MonitoringConfig, ScheduledProgram};
use serde::{Deserialize, Serialize};

/// The event envelope passed through the per-segment pipeline.
///
/// Each stage reads the fields it needs, performs its own store writes, and
/// returns the envelope augmented with its outputs. Unknown fields are not
/// preserved; the envelope is the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub config: MonitoringConfig,

    pub parsed: ParsedManifest,

    /// Reuse plan, set by the expected-program stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse: Option<ReusePlan>,

    /// Raw detector outputs gathered by the workflow, in step order:
    /// index 0 is the audio detection, index 1 the frame list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detections: Vec<serde_json::Value>,

    /// Sampled frames of the segment, for the frame-level stages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameRef>,

    #[serde(
        rename = "thumbnailKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_key: Option<String>,

    #[serde(
        rename = "statusSummary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status_summary: Option<StatusSummary>,
}

impl PipelineEvent {
    /// Position of the raw audio detection in [`Self::detections`].
    pub const AUDIO_RESULT: usize = 0;
    /// Position of the frame list in [`Self::detections`].
    pub const FRAME_RESULT: usize = 1;
}

/// Output of the (external) manifest parsing step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedManifest {
    #[serde(rename = "streamId")]
    pub stream_id: String,

    #[serde(rename = "isMasterManifest", default)]
    pub is_master_manifest: bool,

    #[serde(rename = "lastSegment")]
    pub last_segment: SegmentRef,

    /// Set by the expected-program stage.
    #[serde(
        rename = "expectedProgram",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_program: Option<ScheduledProgram>,
}

/// The segment under evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRef {
    #[serde(rename = "s3Key")]
    pub s3_key: String,

    #[serde(rename = "startDateTime")]
    pub start_date_time: String,

    #[serde(rename = "durationSec")]
    pub duration_sec: f64,

    /// Seconds since stream start, produced by the external probe step.
    #[serde(
        rename = "startTimeRelative",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time_relative: Option<f64>,
}

/// Whether a finished loop-equivalent segment exists to copy detections from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReusePlan {
    pub enabled: bool,

    /// `Start_DateTime` of the source segment, when `enabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

impl ReusePlan {
    #[must_use]
    pub const fn miss() -> Self {
        Self {
            enabled: false,
            segment: None,
        }
    }

    #[must_use]
    pub const fn hit(segment: String) -> Self {
        Self {
            enabled: true,
            segment: Some(segment),
        }
    }
}

/// A sampled frame reference carried in the envelope; the full detector
/// payload lives in the frame table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRef {
    #[serde(rename = "Stream_ID")]
    pub stream_id: String,

    #[serde(rename = "DateTime")]
    pub date_time: String,

    #[serde(rename = "S3_Key", default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
}

/// Per-check verdicts for one segment, as consumed by notification.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct StatusSummary {
    #[serde(rename = "Audio_Status", default)]
    pub audio_status: CheckStatus,

    #[serde(rename = "Station_Status", default)]
    pub station_status: CheckStatus,

    #[serde(rename = "Team_Status", default)]
    pub team_status: CheckStatus,

    #[serde(rename = "Sports_Status", default)]
    pub sports_status: CheckStatus,
}

/// Raw output of the external audio/silence detector for one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,

    #[serde(default)]
    pub silence_chunks: Vec<SilenceChunk>,

    /// Set by the detector when it could not analyze the segment.
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Volume {
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SilenceChunk {
    pub start: f64,
    pub end: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_workflow_envelope() {
        let event: PipelineEvent = serde_json::from_value(serde_json::json!({
            "config": {
                "audio_check_enabled": true,
                "station_logo_check_enabled": true,
                "reuse_detection_if_available": true
            },
            "parsed": {
                "streamId": "test_1",
                "isMasterManifest": false,
                "lastSegment": {
                    "s3Key": "live/test_1/test_1_00043.ts",
                    "durationSec": 5.875,
                    "startDateTime": "2020-02-22T22:15:59.375000Z",
                    "startTimeRelative": 254.3
                }
            }
        }))
        .unwrap();

        assert_eq!(event.parsed.stream_id, "test_1");
        assert_eq!(
            event.parsed.last_segment.start_time_relative,
            Some(254.3)
        );
        assert!(event.reuse.is_none());
        assert!(event.frames.is_empty());
    }

    #[test]
    fn status_summary_serializes_undecided_as_null() {
        let summary = StatusSummary {
            audio_status: CheckStatus::Pass,
            ..StatusSummary::default()
        };
        let json = serde_json::json!(summary);
        assert_eq!(json["Audio_Status"], serde_json::json!(true));
        assert_eq!(json["Team_Status"], serde_json::Value::Null);
    }
}

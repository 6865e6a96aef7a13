//! Shared data model for the broadcast monitoring pipeline.
//!
//! Every pipeline stage exchanges one JSON event envelope ([`PipelineEvent`])
//! and reads/writes the same DynamoDB attribute vocabulary ([`attrs`]), so
//! the names and shapes all live here.

pub mod attrs;
mod config;
mod event;
pub mod millis;
mod schedule;
mod status;

pub use config::{CheckName, MonitoringConfig};
pub use event::{
    AudioDetection, FrameRef, ParsedManifest, PipelineEvent, ReusePlan,
    SegmentRef, SilenceChunk, StatusSummary, Volume,
};
pub use schedule::ScheduledProgram;
pub use status::CheckStatus;

/// Canonical UTC timestamp format used for segment and frame keys,
/// e.g. `2020-02-22T22:15:59.375000Z`.
pub const UTC_TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Parse a timestamp in the pipeline's canonical format.
///
/// # Errors
/// Returns a `chrono::ParseError` if the string does not match
/// [`UTC_TIME_FMT`].
pub fn parse_utc(
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>, chrono::ParseError> {
    let naive =
        chrono::NaiveDateTime::parse_from_str(value, UTC_TIME_FMT)?;
    Ok(naive.and_utc())
}

/// Format a timestamp in the pipeline's canonical format.
#[must_use]
pub fn format_utc(value: &chrono::DateTime<chrono::Utc>) -> String {
    value.format(UTC_TIME_FMT).to_string()
}

/// Composite frame-table partition value identifying one segment,
/// `<stream id>:<segment start datetime>`.
#[must_use]
pub fn segment_id(stream_id: &str, start_date_time: &str) -> String {
    format!("{stream_id}:{start_date_time}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_round_trip_preserves_micros() {
        let parsed = parse_utc("2020-02-22T22:15:59.375000Z").unwrap();
        assert_eq!(format_utc(&parsed), "2020-02-22T22:15:59.375000Z");
    }

    #[test]
    fn segment_id_joins_stream_and_start() {
        assert_eq!(
            segment_id("test_1", "2020-02-22T22:15:59.375000Z"),
            "test_1:2020-02-22T22:15:59.375000Z"
        );
    }
}

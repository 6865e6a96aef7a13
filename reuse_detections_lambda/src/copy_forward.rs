//! The pure half of the copy-forward: rebasing frame rows onto the new
//! segment and deciding which segment attributes may be copied.

use bm_store::Record;
use chrono::Duration;
use serde_json::json;
use thiserror::Error;
use types::{CheckStatus, StatusSummary, attrs, format_utc, parse_utc, segment_id};

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("reused frame row is missing {0}")]
    MissingAttr(&'static str),

    #[error("bad timestamp in reused row: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Rewrite a source frame row for the destination segment.
///
/// The frame's offset within its segment is loop-invariant, so the new
/// absolute timestamp is the destination segment's start plus that offset.
/// Everything else in the detection payload is carried over unchanged, and
/// the copied row gets a finite TTL.
pub fn rebase_frame(
    source_frame: &Record,
    stream_id: &str,
    dest_start_date_time: &str,
    expire_ttl: i64,
) -> Result<Record, CopyError> {
    let millis_in_segment = source_frame
        .get(attrs::SEGMENT_MILLIS)
        .and_then(serde_json::Value::as_f64)
        .ok_or(CopyError::MissingAttr(attrs::SEGMENT_MILLIS))?;

    let dest_start = parse_utc(dest_start_date_time)?;
    #[allow(clippy::cast_possible_truncation)]
    let frame_date_time = dest_start
        + Duration::microseconds((millis_in_segment * 1000.0).round() as i64);

    let mut frame = source_frame.clone();
    frame.insert(
        attrs::DATE_TIME.to_string(),
        json!(format_utc(&frame_date_time)),
    );
    frame.insert(
        attrs::SEGMENT.to_string(),
        json!(segment_id(stream_id, dest_start_date_time)),
    );
    frame.insert(attrs::EXPIRE_TTL.to_string(), json!(expire_ttl));

    Ok(frame)
}

/// Attributes of the source segment row that may be copied to the
/// destination.
///
/// Skipped: anything the destination row already has (work done by a
/// racing normal-detection stage must not be overwritten; checked here,
/// not under a lock, so last writer loses on overlap), provenance and TTL
/// fields (the copy gets fresh ones), and the table keys.
pub fn segment_attrs_to_copy(
    source: &Record,
    dest: &Record,
) -> Vec<(String, serde_json::Value)> {
    source
        .iter()
        .filter(|(name, _)| {
            !dest.contains_key(*name)
                && !name.starts_with(attrs::REUSED_PREFIX)
                && *name != attrs::EXPIRE_TTL
                && *name != attrs::STREAM_ID
                && *name != attrs::START_DATE_TIME
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// The original author of the detections being copied. When the source was
/// itself a reuse copy, its `Reused_From` is carried forward so provenance
/// chains back to the segment that actually ran the detectors.
pub fn reused_from(source: &Record, source_start_date_time: &str) -> String {
    source
        .get(attrs::REUSED_FROM)
        .and_then(serde_json::Value::as_str)
        .unwrap_or(source_start_date_time)
        .to_string()
}

/// Representative thumbnail for the segment, preferring the resized
/// variant of the first frame.
pub fn thumbnail_key(first_frame: &Record) -> Option<String> {
    first_frame
        .get(attrs::RESIZED_S3_KEY)
        .or_else(|| first_frame.get(attrs::S3_KEY))
        .and_then(serde_json::Value::as_str)
        .map(String::from)
}

/// Per-check statuses of the source segment, as the destination's summary.
pub fn status_summary(source: &Record) -> StatusSummary {
    let status = |name: &str| -> CheckStatus {
        source
            .get(name)
            .and_then(serde_json::Value::as_bool)
            .into()
    };

    StatusSummary {
        audio_status: status(attrs::AUDIO_STATUS),
        station_status: status(attrs::STATION_STATUS),
        team_status: status(attrs::TEAM_STATUS),
        sports_status: status(attrs::SPORTS_STATUS),
    }
}

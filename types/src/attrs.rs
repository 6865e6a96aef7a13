//! DynamoDB attribute names shared across pipeline stages.
//!
//! Segment and frame rows are updated additively by several stages, so the
//! attribute vocabulary is centralized here rather than spelled inline.

// Segment table keys.
pub const STREAM_ID: &str = "Stream_ID";
pub const START_DATE_TIME: &str = "Start_DateTime";

// Schedule table sort key.
pub const START_TIME: &str = "Start_Time";

// Segment row.
pub const START_TIME_SEC: &str = "Start_Time_Sec";
pub const START_TIME_SEC_IN_LOOP: &str = "Start_Time_Sec_In_Loop";
pub const DURATION_SEC: &str = "Duration_Sec";
pub const FINISHED: &str = "Finished";
pub const AUDIO_STATUS: &str = "Audio_Status";
pub const STATION_STATUS: &str = "Station_Status";
pub const TEAM_STATUS: &str = "Team_Status";
pub const SPORTS_STATUS: &str = "Sports_Status";
pub const VOLUME: &str = "Volume";
pub const SILENCE: &str = "Silence";
pub const SILENCE_DURATION: &str = "Silence_Duration";
pub const SILENCE_CONFIDENCE: &str = "Silence_Confidence";
pub const AUDIO_CHECK_ERROR: &str = "Audio_Check_Error";
pub const HAS_LOGO_DETECT_ERROR: &str = "Has_Logo_Detect_Error";

// Reuse provenance. `REUSED_PREFIX` guards the copy-forward filter: nothing
// starting with it is ever copied from a source segment.
pub const REUSED_PREFIX: &str = "Reused";
pub const REUSED_DETECTION: &str = "Reused_Detection";
pub const REUSED_FROM: &str = "Reused_From";
pub const EXPIRE_TTL: &str = "ExpireTTL";

// Frame table keys and indexes.
pub const DATE_TIME: &str = "DateTime";
pub const SEGMENT: &str = "Segment";
pub const SEGMENT_MILLIS: &str = "Segment_Millis";

// Frame row.
pub const S3_KEY: &str = "S3_Key";
pub const RESIZED_S3_KEY: &str = "Resized_S3_Key";
pub const IS_EXPECTED_LOGO: &str = "Is_Expected_Logo";
pub const LOGO_DETECT_ERROR: &str = "Logo_Detect_Error";
pub const TEAM1_STATUS: &str = "Team1_Status";
pub const TEAM2_STATUS: &str = "Team2_Status";

// Index names.
pub const SEGMENT_MILLIS_INDEX: &str = "Segment_Millis";
pub const STREAM_START_IN_LOOP_INDEX: &str = "Stream_ID_Start_In_Loop";

/// Team-modality attribute names are derived from a `Team1`/`Team2` prefix.
#[must_use]
pub fn team_text_status(prefix: &str) -> String {
    format!("{prefix}_Text_Status")
}

#[must_use]
pub fn team_logo_status(prefix: &str) -> String {
    format!("{prefix}_Logo_Status")
}

#[must_use]
pub fn team_text_detected(prefix: &str) -> String {
    format!("{prefix}_Text_Detected")
}

#[must_use]
pub fn team_logo_detected(prefix: &str) -> String {
    format!("{prefix}_Logo_Detected")
}

#[must_use]
pub fn team_status(prefix: &str) -> String {
    format!("{prefix}_Status")
}

#[must_use]
pub fn team_detection_confidence(prefix: &str) -> String {
    format!("{prefix}_Detection_Confidence")
}

/// The two team slots every team-check attribute set is derived from.
pub const TEAM_PREFIXES: [&str; 2] = ["Team1", "Team2"];

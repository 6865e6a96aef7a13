use serde::{Deserialize, Serialize};

/// One entry in a stream's expected-programming schedule.
///
/// Entries are keyed by `(Stream_ID, Start_Time)` with loop-relative start
/// and end times in seconds; the schedule is non-overlapping and sorted, and
/// the last entry's `End_Time` is the loop length. The schedule is owned by
/// external management tooling; this pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledProgram {
    #[serde(rename = "Stream_ID")]
    pub stream_id: String,

    #[serde(rename = "Start_Time")]
    pub start_time: f64,

    #[serde(rename = "End_Time")]
    pub end_time: f64,

    #[serde(rename = "Event_ID")]
    pub event_id: String,

    #[serde(rename = "Event_Title", skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,

    #[serde(rename = "Event_Type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Expected matchup, e.g. `"MAN V TOT"`. Absent for non-team programs;
    /// its absence disables the team checks for the segment.
    #[serde(rename = "Team_Info", skip_serializing_if = "Option::is_none")]
    pub team_info: Option<String>,

    /// Expected sport, absent for non-sports programs; its absence disables
    /// the sports check for the segment.
    #[serde(rename = "Sports_Type", skip_serializing_if = "Option::is_none")]
    pub sports_type: Option<String>,

    #[serde(rename = "Station_Logo", skip_serializing_if = "Option::is_none")]
    pub station_logo: Option<String>,

    /// Loop-relative position of the segment this program was resolved for.
    /// Set by the schedule resolver, consumed by the reuse lookup.
    #[serde(
        rename = "Segment_Start_Time_In_Loop",
        skip_serializing_if = "Option::is_none"
    )]
    pub segment_start_time_in_loop: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_store_attribute_names() {
        let program: ScheduledProgram = serde_json::from_value(serde_json::json!({
            "Stream_ID": "test_1",
            "Start_Time": 60.0,
            "End_Time": 90.0,
            "Event_ID": "SIM-EPL-002",
            "Event_Title": "MAN V TOT",
            "Event_Type": "Sports",
            "Team_Info": "MAN V TOT",
            "Station_Logo": "NBC"
        }))
        .unwrap();

        assert_eq!(program.event_id, "SIM-EPL-002");
        assert_eq!(program.team_info.as_deref(), Some("MAN V TOT"));
        assert!(program.sports_type.is_none());
        assert!(program.segment_start_time_in_loop.is_none());

        // the serialized sort-key name is what store queries alias
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(json[crate::attrs::START_TIME], serde_json::json!(60.0));
    }
}

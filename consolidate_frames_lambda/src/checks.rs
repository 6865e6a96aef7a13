//! Segment-level consensus over per-frame detections.
//!
//! A check reads one or two frame attributes across the sampled frames and
//! decides the segment by the share of frames that agree. Frames without
//! the attribute abstain rather than count against.

use bm_store::Record;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use types::{CheckName, attrs};

const fn default_station_logo_threshold() -> f64 {
    75.0
}

const fn default_team_text_threshold() -> f64 {
    75.0
}

const fn default_sports_type_threshold() -> f64 {
    50.0
}

/// Minimum percentage of decided frames that must agree, per check.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_station_logo_threshold")]
    pub station_logo_threshold: f64,

    #[serde(default = "default_team_text_threshold")]
    pub team_text_threshold: f64,

    #[serde(default = "default_sports_type_threshold")]
    pub sports_type_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            station_logo_threshold: default_station_logo_threshold(),
            team_text_threshold: default_team_text_threshold(),
            sports_type_threshold: default_sports_type_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCheck {
    StationLogo,
    TeamPresence,
    SportsType,
}

impl FrameCheck {
    pub const ALL: [Self; 3] =
        [Self::StationLogo, Self::TeamPresence, Self::SportsType];

    /// Checks that must all be enabled for this consolidation to run.
    #[must_use]
    pub const fn required(self) -> &'static [CheckName] {
        match self {
            Self::StationLogo => &[CheckName::StationLogo],
            Self::TeamPresence => &[CheckName::TeamText],
            Self::SportsType => &[CheckName::Sports],
        }
    }

    /// Frame attributes this check reads.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::StationLogo => {
                &[attrs::IS_EXPECTED_LOGO, attrs::LOGO_DETECT_ERROR]
            }
            Self::TeamPresence => {
                &[attrs::TEAM1_STATUS, attrs::TEAM2_STATUS]
            }
            Self::SportsType => &[attrs::SPORTS_STATUS],
        }
    }

    /// Segment attributes to write, given the frame rows. A check with no
    /// decided frames yields nothing and the segment attribute stays unset.
    #[must_use]
    pub fn evaluate(
        self,
        frames: &[Record],
        thresholds: &Thresholds,
    ) -> Vec<(String, serde_json::Value)> {
        match self {
            Self::StationLogo => station_logo_check(frames, thresholds),
            Self::TeamPresence => team_presence_check(frames, thresholds),
            Self::SportsType => sports_check(frames, thresholds),
        }
    }
}

fn bool_series(frames: &[Record], attribute: &str) -> Vec<bool> {
    frames
        .iter()
        .filter_map(|frame| frame.get(attribute))
        .filter_map(serde_json::Value::as_bool)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn percent_true(series: &[bool]) -> f64 {
    let hits = series.iter().filter(|status| **status).count();
    (hits as f64 / series.len() as f64) * 100.0
}

fn station_logo_check(
    frames: &[Record],
    thresholds: &Thresholds,
) -> Vec<(String, serde_json::Value)> {
    let series = bool_series(frames, attrs::IS_EXPECTED_LOGO);

    if series.is_empty() {
        info!("No frames with logo result");
        return Vec::new();
    }

    let mut results = vec![(
        attrs::STATION_STATUS.to_string(),
        json!(percent_true(&series) >= thresholds.station_logo_threshold),
    )];

    let throttled = frames
        .iter()
        .any(|frame| frame.contains_key(attrs::LOGO_DETECT_ERROR));
    if throttled {
        results
            .push((attrs::HAS_LOGO_DETECT_ERROR.to_string(), json!(true)));
    }

    results
}

/// Both team slots must clear the threshold among their decided frames.
/// When neither slot has any data the segment is a conservative negative,
/// not an unknown.
fn team_presence_check(
    frames: &[Record],
    thresholds: &Thresholds,
) -> Vec<(String, serde_json::Value)> {
    let per_team: Vec<bool> = attrs::TEAM_PREFIXES
        .iter()
        .map(|prefix| bool_series(frames, &attrs::team_status(prefix)))
        .filter(|series| !series.is_empty())
        .map(|series| {
            percent_true(&series) >= thresholds.team_text_threshold
        })
        .collect();

    let team_status =
        !per_team.is_empty() && per_team.iter().all(|status| *status);

    info!("Team_Status: {}", team_status);
    vec![(attrs::TEAM_STATUS.to_string(), json!(team_status))]
}

fn sports_check(
    frames: &[Record],
    thresholds: &Thresholds,
) -> Vec<(String, serde_json::Value)> {
    let series = bool_series(frames, attrs::SPORTS_STATUS);

    if series.is_empty() {
        info!("No frames with sport check status");
        return Vec::new();
    }

    let check_status =
        percent_true(&series) >= thresholds.sports_type_threshold;
    info!("Sports_Status: {}", check_status);
    vec![(attrs::SPORTS_STATUS.to_string(), json!(check_status))]
}

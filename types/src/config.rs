use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The independent checks the pipeline can run against a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckName {
    Audio,
    StationLogo,
    TeamText,
    TeamLogo,
    Sports,
}

/// Per-stream check enablement, carried in the pipeline event.
///
/// Flags default to `false` when absent, so an older event envelope simply
/// runs fewer checks rather than failing to parse. Stages derive an explicit
/// set of active checks from this instead of branching on raw flags.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub audio_check_enabled: bool,
    #[serde(default)]
    pub station_logo_check_enabled: bool,
    #[serde(default)]
    pub team_detect_check_enabled: bool,
    #[serde(default)]
    pub team_logo_check_enabled: bool,
    #[serde(default)]
    pub sports_detect_check_enabled: bool,
    #[serde(default)]
    pub notify_enabled: bool,
    #[serde(default)]
    pub reuse_detection_if_available: bool,
}

impl MonitoringConfig {
    #[must_use]
    pub const fn is_enabled(&self, check: CheckName) -> bool {
        match check {
            CheckName::Audio => self.audio_check_enabled,
            CheckName::StationLogo => self.station_logo_check_enabled,
            CheckName::TeamText => self.team_detect_check_enabled,
            CheckName::TeamLogo => self.team_logo_check_enabled,
            CheckName::Sports => self.sports_detect_check_enabled,
        }
    }

    pub const fn disable(&mut self, check: CheckName) {
        match check {
            CheckName::Audio => self.audio_check_enabled = false,
            CheckName::StationLogo => {
                self.station_logo_check_enabled = false;
            }
            CheckName::TeamText => self.team_detect_check_enabled = false,
            CheckName::TeamLogo => self.team_logo_check_enabled = false,
            CheckName::Sports => self.sports_detect_check_enabled = false,
        }
    }

    /// The set of checks enabled for this segment.
    #[must_use]
    pub fn active_checks(&self) -> BTreeSet<CheckName> {
        [
            CheckName::Audio,
            CheckName::StationLogo,
            CheckName::TeamText,
            CheckName::TeamLogo,
            CheckName::Sports,
        ]
        .into_iter()
        .filter(|check| self.is_enabled(*check))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flags_default_to_disabled() {
        let config: MonitoringConfig =
            serde_json::from_str(r#"{"audio_check_enabled": true}"#).unwrap();
        assert!(config.is_enabled(CheckName::Audio));
        assert!(!config.is_enabled(CheckName::StationLogo));
        assert!(!config.notify_enabled);
    }

    #[test]
    fn active_checks_reflects_flags() {
        let mut config = MonitoringConfig {
            team_detect_check_enabled: true,
            sports_detect_check_enabled: true,
            ..MonitoringConfig::default()
        };
        assert_eq!(
            config.active_checks(),
            BTreeSet::from([CheckName::TeamText, CheckName::Sports])
        );

        config.disable(CheckName::Sports);
        assert_eq!(
            config.active_checks(),
            BTreeSet::from([CheckName::TeamText])
        );
    }
}

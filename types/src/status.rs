use serde::{Deserialize, Serialize};

/// Three-valued outcome of a check.
///
/// A check that never saw any usable detector data is `Unknown`, which is
/// distinct from `Fail`: an absent signal is not a negative signal. On the
/// wire and in the store this maps to a nullable boolean (`null`/`true`/
/// `false`), matching how downstream consumers read it.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum CheckStatus {
    #[default]
    Unknown,
    Pass,
    Fail,
}

impl CheckStatus {
    /// `true` only when the check decided and passed.
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// `true` when the check produced any decision at all.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// The decided value, or `None` for `Unknown`.
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Pass => Some(true),
            Self::Fail => Some(false),
        }
    }
}

impl From<bool> for CheckStatus {
    fn from(value: bool) -> Self {
        if value { Self::Pass } else { Self::Fail }
    }
}

impl From<Option<bool>> for CheckStatus {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}

impl From<CheckStatus> for Option<bool> {
    fn from(value: CheckStatus) -> Self {
        value.as_bool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_nullable_bool() {
        assert_eq!(serde_json::json!(CheckStatus::Pass), serde_json::json!(true));
        assert_eq!(serde_json::json!(CheckStatus::Fail), serde_json::json!(false));
        assert_eq!(serde_json::json!(CheckStatus::Unknown), serde_json::Value::Null);
    }

    #[test]
    fn deserializes_from_nullable_bool() {
        let status: CheckStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status, CheckStatus::Unknown);
        let status: CheckStatus = serde_json::from_str("false").unwrap();
        assert_eq!(status, CheckStatus::Fail);
    }

    #[test]
    fn unknown_is_not_a_failure() {
        assert!(!CheckStatus::Unknown.is_pass());
        assert!(!CheckStatus::Unknown.is_decided());
        assert_eq!(CheckStatus::Unknown.as_bool(), None);
    }
}

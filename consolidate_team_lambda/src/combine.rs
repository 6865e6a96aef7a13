//! Reconciles the two team-presence modalities (on-screen text and logo
//! badges) into one per-team status and confidence for a frame.

use bm_store::Record;
use serde_json::json;
use types::{CheckStatus, attrs};

/// Text overlays (scoreboard graphics) are less ambiguous than logo badges,
/// so agreement weights text far above logo. A modality deciding alone
/// carries the same 0.8 weight.
const TEXT_WEIGHT: f64 = 0.8;
const LOGO_WEIGHT: f64 = 0.2;
const SOLO_WEIGHT: f64 = 0.8;

/// Combine the two modality statuses for one team.
///
/// The nine `(text, logo)` cases:
/// - agreement: that value, confidence `0.8*text + 0.2*logo`;
/// - one modality undecided: the decided value, its confidence at `0.8`;
/// - both undecided: `false` with zero confidence;
/// - disagreement: `false` (a text/logo conflict is treated as a hard
///   negative) with the confidence gap as the score.
///
/// The returned confidence is always a non-negative magnitude.
pub fn combine(
    text: CheckStatus,
    logo: CheckStatus,
    text_confidence: Option<f64>,
    logo_confidence: Option<f64>,
) -> (bool, f64) {
    use CheckStatus::{Fail, Pass, Unknown};

    let text_conf = text_confidence.unwrap_or(0.0);
    let logo_conf = logo_confidence.unwrap_or(0.0);

    let (status, confidence) = match (text, logo) {
        (Pass, Pass) => {
            (true, TEXT_WEIGHT * text_conf + LOGO_WEIGHT * logo_conf)
        }
        (Fail, Fail) => {
            (false, TEXT_WEIGHT * text_conf + LOGO_WEIGHT * logo_conf)
        }
        (Pass, Unknown) => (true, SOLO_WEIGHT * text_conf),
        (Unknown, Pass) => (true, SOLO_WEIGHT * logo_conf),
        (Fail, Unknown) => (false, SOLO_WEIGHT * text_conf),
        (Unknown, Fail) => (false, SOLO_WEIGHT * logo_conf),
        (Unknown, Unknown) => (false, 0.0),
        (Pass, Fail) | (Fail, Pass) => (false, text_conf - logo_conf),
    };

    (status, confidence.abs())
}

/// Best available confidence for a modality: the maximum over its detection
/// list. An absent list means the modality never ran (`None`); an empty
/// list means it ran and found nothing (`Some(0.0)`).
pub fn best_confidence(frame: &Record, attribute: &str) -> Option<f64> {
    let detections = frame.get(attribute)?.as_array()?;

    Some(
        detections
            .iter()
            .filter_map(|detection| {
                detection
                    .get("Confidence")
                    .or_else(|| detection.get("confidence"))
            })
            .filter_map(serde_json::Value::as_f64)
            .fold(0.0, f64::max),
    )
}

fn modality_status(frame: &Record, attribute: &str) -> CheckStatus {
    frame
        .get(attribute)
        .and_then(serde_json::Value::as_bool)
        .into()
}

/// The combined attributes to write back to the frame row for one team.
pub fn team_attrs(
    team_prefix: &str,
    frame: &Record,
) -> Vec<(String, serde_json::Value)> {
    let text = modality_status(frame, &attrs::team_text_status(team_prefix));
    let logo = modality_status(frame, &attrs::team_logo_status(team_prefix));

    let (status, confidence) = combine(
        text,
        logo,
        best_confidence(frame, &attrs::team_text_detected(team_prefix)),
        best_confidence(frame, &attrs::team_logo_detected(team_prefix)),
    );

    vec![
        (attrs::team_status(team_prefix), json!(status)),
        (attrs::team_detection_confidence(team_prefix), json!(confidence)),
    ]
}

/// Frame attributes the combiner reads, for both team slots.
pub fn projection() -> Vec<String> {
    attrs::TEAM_PREFIXES
        .iter()
        .flat_map(|prefix| {
            [
                attrs::team_text_status(prefix),
                attrs::team_text_detected(prefix),
                attrs::team_logo_status(prefix),
                attrs::team_logo_detected(prefix),
            ]
        })
        .collect()
}

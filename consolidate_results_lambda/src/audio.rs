//! Audio evaluation: a segment passes when it is not mostly silent.

use types::AudioDetection;

/// Outcome of the silence-ratio rule for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioEval {
    /// True when at most half of the segment is silence.
    pub audio_on: bool,
    pub silence_duration: f64,
    /// How far the silence ratio sits from the 0.5 decision boundary,
    /// scaled to a 50..=100 percentage.
    pub silence_confidence: f64,
}

pub fn eval_audio_status(
    audio: &AudioDetection,
    segment_duration: f64,
) -> AudioEval {
    let silence_duration: f64 = audio
        .silence_chunks
        .iter()
        .map(|chunk| chunk.end - chunk.start)
        .sum();

    let silence_ratio = if segment_duration > 0.0 {
        silence_duration / segment_duration
    } else {
        0.0
    };

    AudioEval {
        audio_on: silence_ratio <= 0.5,
        silence_duration,
        silence_confidence: 100.0_f64
            .min((0.5 + (0.5 - silence_ratio).abs()) * 100.0),
    }
}

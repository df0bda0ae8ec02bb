//! Muscle state classification.
//!
//! Two thresholds split the reading axis into three states:
//!
//! | reading          | state         | color     |
//! |------------------|---------------|-----------|
//! | `v <= 800`       | relaxed       | `#2ecc71` |
//! | `800 < v <= 1300`| strained      | `#f39c12` |
//! | `v > 1300`       | very strained | `#e74c3c` |

use crate::history::{Reading, ReadingHistory};

/// Upper bound (inclusive) of the relaxed band.
pub const RELAXED_MAX: f64 = 800.0;

/// Upper bound (inclusive) of the strained band.
pub const STRAINED_MAX: f64 = 1300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MuscleState {
    #[default]
    Relaxed,
    Strained,
    VeryStrained,
}

impl MuscleState {
    pub const ALL: [MuscleState; 3] = [Self::Relaxed, Self::Strained, Self::VeryStrained];

    /// Lowercase state label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Strained => "strained",
            Self::VeryStrained => "very strained",
        }
    }

    /// Label used on the color scale legend.
    pub fn scale_label(self) -> &'static str {
        match self {
            Self::Relaxed => "Relaxed",
            Self::Strained => "Slightly Strained",
            Self::VeryStrained => "Very Strained",
        }
    }

    /// Indicator color as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            Self::Relaxed => "#2ecc71",
            Self::Strained => "#f39c12",
            Self::VeryStrained => "#e74c3c",
        }
    }

    /// Indicator color as RGB components.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Relaxed => (0x2e, 0xcc, 0x71),
            Self::Strained => (0xf3, 0x9c, 0x12),
            Self::VeryStrained => (0xe7, 0x4c, 0x3c),
        }
    }
}

impl std::fmt::Display for MuscleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a reading. Total: NaN fails both comparisons and lands in relaxed.
pub fn classify(value: Reading) -> MuscleState {
    if value > STRAINED_MAX {
        MuscleState::VeryStrained
    } else if value > RELAXED_MAX {
        MuscleState::Strained
    } else {
        MuscleState::Relaxed
    }
}

/// Classify the newest reading, treating an empty history as 0.
pub fn classify_latest(history: &ReadingHistory) -> MuscleState {
    classify(history.latest().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(classify(0.0), MuscleState::Relaxed);
        assert_eq!(classify(800.0), MuscleState::Relaxed);
        assert_eq!(classify(801.0), MuscleState::Strained);
        assert_eq!(classify(1300.0), MuscleState::Strained);
        assert_eq!(classify(1301.0), MuscleState::VeryStrained);
    }

    #[test]
    fn fractional_values_just_above_thresholds() {
        assert_eq!(classify(800.0001), MuscleState::Strained);
        assert_eq!(classify(1300.5), MuscleState::VeryStrained);
    }

    #[test]
    fn negative_and_huge_values() {
        assert_eq!(classify(-250.0), MuscleState::Relaxed);
        assert_eq!(classify(f64::MIN), MuscleState::Relaxed);
        assert_eq!(classify(1e12), MuscleState::VeryStrained);
        assert_eq!(classify(f64::INFINITY), MuscleState::VeryStrained);
    }

    #[test]
    fn nan_is_relaxed() {
        assert_eq!(classify(f64::NAN), MuscleState::Relaxed);
    }

    #[test]
    fn empty_history_is_relaxed() {
        assert_eq!(classify_latest(&ReadingHistory::new()), MuscleState::Relaxed);
    }

    #[test]
    fn latest_reading_wins() {
        let mut h = ReadingHistory::new();
        h.push(1500.0);
        h.push(900.0);
        assert_eq!(classify_latest(&h), MuscleState::Strained);
    }

    #[test]
    fn labels_and_colors() {
        assert_eq!(MuscleState::Relaxed.label(), "relaxed");
        assert_eq!(MuscleState::Strained.label(), "strained");
        assert_eq!(MuscleState::VeryStrained.label(), "very strained");
        assert_eq!(MuscleState::VeryStrained.color(), "#e74c3c");
        assert_eq!(MuscleState::VeryStrained.to_string(), "very strained");
    }

    #[test]
    fn rgb_matches_hex() {
        for state in MuscleState::ALL {
            let (r, g, b) = state.rgb();
            assert_eq!(format!("#{r:02x}{g:02x}{b:02x}"), state.color());
        }
    }
}

//! Timing profiles for spin choreography and win presentation

use serde::{Deserialize, Serialize};

/// Timing profile identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Custom timing (scaled or hand-edited)
    Custom,
}

/// Spin choreography timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Delay between consecutive columns starting to spin (ms)
    pub column_start_stagger_ms: f64,

    /// Delay between consecutive columns stopping (ms)
    pub column_stop_stagger_ms: f64,

    /// Time the last column spins before the stop sequence begins (ms)
    pub spin_duration_ms: f64,

    /// Visual scroll speed of a spinning column (rows per second)
    pub symbol_speed_rows_per_sec: f64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            column_start_stagger_ms: 500.0,
            column_stop_stagger_ms: 500.0,
            spin_duration_ms: 2500.0,
            symbol_speed_rows_per_sec: 12.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            column_start_stagger_ms: 100.0,
            column_stop_stagger_ms: 150.0,
            spin_duration_ms: 800.0,
            symbol_speed_rows_per_sec: 20.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            column_start_stagger_ms: self.column_start_stagger_ms * factor,
            column_stop_stagger_ms: self.column_stop_stagger_ms * factor,
            spin_duration_ms: self.spin_duration_ms * factor,
            symbol_speed_rows_per_sec: if factor > 0.0 {
                self.symbol_speed_rows_per_sec / factor
            } else {
                self.symbol_speed_rows_per_sec
            },
        }
    }

    /// Time from start of spin until the last column has stopped
    pub fn total_spin_duration(&self, columns: usize) -> f64 {
        let last = columns.saturating_sub(1) as f64;
        last * self.column_start_stagger_ms + self.spin_duration_ms + last * self.column_stop_stagger_ms
    }

    /// True when every delay is finite and non-negative
    pub fn is_valid(&self) -> bool {
        [
            self.column_start_stagger_ms,
            self.column_stop_stagger_ms,
            self.spin_duration_ms,
            self.symbol_speed_rows_per_sec,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Win presentation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationTiming {
    /// Delay between consecutive winning cells being revealed (ms)
    pub cell_reveal_delay_ms: f64,
}

impl PresentationTiming {
    /// Offset of the n-th revealed cell
    pub fn reveal_offset(&self, index: usize) -> f64 {
        index as f64 * self.cell_reveal_delay_ms
    }
}

impl Default for PresentationTiming {
    fn default() -> Self {
        Self {
            cell_reveal_delay_ms: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_profiles() {
        let normal = SpinTiming::normal();
        let turbo = SpinTiming::turbo();

        assert!(turbo.spin_duration_ms < normal.spin_duration_ms);
        assert!(turbo.column_start_stagger_ms < normal.column_start_stagger_ms);
        assert_eq!(SpinTiming::from_profile(TimingProfile::Turbo), turbo);
        assert!(normal.is_valid());
    }

    #[test]
    fn test_total_spin_duration() {
        let normal = SpinTiming::normal();
        // 4 × 500 start + 2500 spin + 4 × 500 stop
        assert_eq!(normal.total_spin_duration(5), 6500.0);
        assert_eq!(normal.total_spin_duration(1), 2500.0);
    }

    #[test]
    fn test_scaled() {
        let half = SpinTiming::normal().scaled(0.5);
        assert_eq!(half.profile, TimingProfile::Custom);
        assert_eq!(half.spin_duration_ms, 1250.0);
        assert_eq!(half.symbol_speed_rows_per_sec, 24.0);
    }

    #[test]
    fn test_invalid_timing() {
        let mut timing = SpinTiming::normal();
        timing.spin_duration_ms = -1.0;
        assert!(!timing.is_valid());
        timing.spin_duration_ms = f64::NAN;
        assert!(!timing.is_valid());
    }

    #[test]
    fn test_reveal_offset() {
        let timing = PresentationTiming::default();
        assert_eq!(timing.reveal_offset(0), 0.0);
        assert_eq!(timing.reveal_offset(4), 200.0);
    }
}

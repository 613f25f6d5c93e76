use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::{DecisionKind, UnitFloat};

/// Engine tuning, loadable from JSON. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub gestures: GestureThresholds,

    #[serde(default)]
    pub matching: MatchPolicy,

    #[serde(default)]
    pub timing: TimingConfig,
}

/// Drag distances, in gesture units, at which previews and commits trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    #[serde(default = "default_preview_horizontal")]
    pub preview_horizontal: f64,

    #[serde(default = "default_preview_vertical")]
    pub preview_vertical: f64,

    #[serde(default = "default_commit_horizontal")]
    pub commit_horizontal: f64,

    #[serde(default = "default_commit_vertical")]
    pub commit_vertical: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            preview_horizontal: default_preview_horizontal(),
            preview_vertical: default_preview_vertical(),
            commit_horizontal: default_commit_horizontal(),
            commit_vertical: default_commit_vertical(),
        }
    }
}

fn default_preview_horizontal() -> f64 {
    50.0
}

fn default_preview_vertical() -> f64 {
    80.0
}

fn default_commit_horizontal() -> f64 {
    100.0
}

fn default_commit_vertical() -> f64 {
    120.0
}

/// Mutual-match probability per decision kind. Reject never matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    #[serde(default = "default_approve_chance")]
    pub approve: UnitFloat,

    #[serde(default = "default_strong_approve_chance")]
    pub strong_approve: UnitFloat,
}

impl MatchPolicy {
    /// Probability for `kind`, or `None` when no roll should happen at all.
    pub fn chance(&self, kind: DecisionKind) -> Option<UnitFloat> {
        match kind {
            DecisionKind::Approve => Some(self.approve),
            DecisionKind::StrongApprove => Some(self.strong_approve),
            DecisionKind::Reject => None,
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            approve: default_approve_chance(),
            strong_approve: default_strong_approve_chance(),
        }
    }
}

fn default_approve_chance() -> UnitFloat {
    UnitFloat::saturating(0.2)
}

fn default_strong_approve_chance() -> UnitFloat {
    UnitFloat::saturating(0.5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay between a commit and the stack removal (exit animation).
    #[serde(default = "default_exit_delay_ms")]
    pub exit_delay_ms: u64,

    /// How long a removed candidate stays restorable.
    #[serde(default = "default_undo_window_ms")]
    pub undo_window_ms: u64,
}

impl TimingConfig {
    pub fn exit_delay(&self) -> Duration {
        Duration::milliseconds(clamp_ms(self.exit_delay_ms))
    }

    pub fn undo_window(&self) -> Duration {
        Duration::milliseconds(clamp_ms(self.undo_window_ms))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            exit_delay_ms: default_exit_delay_ms(),
            undo_window_ms: default_undo_window_ms(),
        }
    }
}

fn default_exit_delay_ms() -> u64 {
    300
}

fn default_undo_window_ms() -> u64 {
    3000
}

fn clamp_ms(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gestures;
        for (name, value) in [
            ("preview_horizontal", g.preview_horizontal),
            ("preview_vertical", g.preview_vertical),
            ("commit_horizontal", g.commit_horizontal),
            ("commit_vertical", g.commit_vertical),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if g.commit_horizontal < g.preview_horizontal {
            return Err(ConfigError::ThresholdOrder {
                preview: "preview_horizontal",
                commit: "commit_horizontal",
            });
        }
        if g.commit_vertical < g.preview_vertical {
            return Err(ConfigError::ThresholdOrder {
                preview: "preview_vertical",
                commit: "commit_vertical",
            });
        }
        if self.timing.undo_window_ms == 0 {
            return Err(ConfigError::ZeroUndoWindow);
        }
        Ok(())
    }
}

/// Load and validate an engine config file.
pub fn load_config(path: &str) -> Result<EngineConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
    let config: EngineConfig =
        serde_json::from_str(&content).with_context(|| format!("{path}: invalid config JSON"))?;
    config
        .validate()
        .with_context(|| format!("{path}: invalid config"))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gesture_contract() {
        let c = EngineConfig::default();
        assert_eq!(c.gestures.preview_horizontal, 50.0);
        assert_eq!(c.gestures.preview_vertical, 80.0);
        assert_eq!(c.gestures.commit_horizontal, 100.0);
        assert_eq!(c.gestures.commit_vertical, 120.0);
        assert_eq!(c.matching.approve.value(), 0.2);
        assert_eq!(c.matching.strong_approve.value(), 0.5);
        assert_eq!(c.timing.exit_delay(), Duration::milliseconds(300));
        assert_eq!(c.timing.undo_window(), Duration::milliseconds(3000));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_object_yields_defaults() {
        let c: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let c: EngineConfig =
            serde_json::from_str(r#"{"timing": {"undo_window_ms": 5000}}"#).unwrap();
        assert_eq!(c.timing.undo_window_ms, 5000);
        assert_eq!(c.timing.exit_delay_ms, 300);
    }

    #[test]
    fn reject_never_rolls() {
        let p = MatchPolicy::default();
        assert!(p.chance(DecisionKind::Reject).is_none());
        assert_eq!(p.chance(DecisionKind::Approve).map(UnitFloat::value), Some(0.2));
    }

    #[test]
    fn commit_below_preview_is_rejected() {
        let mut c = EngineConfig::default();
        c.gestures.commit_horizontal = 40.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let mut c = EngineConfig::default();
        c.gestures.preview_vertical = 0.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidThreshold { name: "preview_vertical", .. })
        ));
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        std::fs::write(&path, r#"{"matching": {"approve": 0.9}}"#).unwrap();
        let c = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(c.matching.approve.value(), 0.9);
        assert_eq!(c.matching.strong_approve.value(), 0.5);
    }

    #[test]
    fn load_config_rejects_bad_probability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        std::fs::write(&path, r#"{"matching": {"approve": 2.0}}"#).unwrap();
        assert!(load_config(path.to_str().unwrap()).is_err());
    }
}

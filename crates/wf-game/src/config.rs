//! Session configuration
//!
//! Loaded from YAML (`.yaml` / `.yml`) or JSON (`.json`). Every field has a
//! default, so an empty document yields the standard 54-segment wheel with
//! show-floor timing and a local broker.

use std::path::Path;

use serde::{Deserialize, Serialize};

use wf_core::{DEFAULT_SIMULATION_SPINS, DEFAULT_WINDOW_CAPACITY, WfError, WfResult};
use wf_link::LinkConfig;
use wf_wheel::{SegmentSpec, SegmentTable, SpinTiming, TimingProfile, chuck_a_luck_specs};

/// Highest accepted frame rate
pub const MAX_FPS: u32 = 1000;

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Ordered wheel segments (id = position)
    pub segments: Vec<SegmentSpec>,

    /// Timing profile, used when `timing` is absent
    pub profile: TimingProfile,

    /// Explicit timing, overrides `profile`
    pub timing: Option<SpinTiming>,

    /// Broker connection and protocol settings
    pub link: LinkConfig,

    /// How long the button flashes a result before going idle (s)
    pub result_hold_secs: f64,

    /// Spins per silent simulation batch
    pub simulation_spins: usize,

    /// Rolling statistics window size
    pub window_capacity: usize,

    /// Fixed RNG seed (random when absent)
    pub seed: Option<u64>,

    /// Target frame rate
    pub fps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            segments: chuck_a_luck_specs(),
            profile: TimingProfile::Normal,
            timing: None,
            link: LinkConfig::default(),
            result_hold_secs: 12.0,
            simulation_spins: DEFAULT_SIMULATION_SPINS,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            seed: None,
            fps: 120,
        }
    }
}

impl GameConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> WfResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text)?,
            Some("json") => Self::from_json(&text)?,
            other => {
                return Err(WfError::config(format!(
                    "unsupported config format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )));
            }
        };
        config.validate()?;
        log::info!(
            "[Game] Loaded config from {} ({} segments)",
            path.display(),
            config.segments.len()
        );
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> WfResult<Self> {
        serde_yml::from_str(text).map_err(|e| WfError::Serialization(e.to_string()))
    }

    pub fn from_json(text: &str) -> WfResult<Self> {
        serde_json::from_str(text).map_err(|e| WfError::Serialization(e.to_string()))
    }

    pub fn to_yaml(&self) -> WfResult<String> {
        serde_yml::to_string(self).map_err(|e| WfError::Serialization(e.to_string()))
    }

    /// Timing in effect
    pub fn spin_timing(&self) -> SpinTiming {
        self.timing
            .clone()
            .unwrap_or_else(|| SpinTiming::from_profile(self.profile))
    }

    /// Build the segment table
    pub fn build_table(&self) -> WfResult<SegmentTable> {
        SegmentTable::new(self.segments.clone())
    }

    /// Check everything that would otherwise fail at startup
    pub fn validate(&self) -> WfResult<()> {
        self.build_table()?;
        self.spin_timing().validate()?;
        self.link.validate()?;

        if !(self.result_hold_secs.is_finite() && self.result_hold_secs >= 0.0) {
            return Err(WfError::config(format!(
                "result_hold_secs must be >= 0, got {}",
                self.result_hold_secs
            )));
        }
        if self.simulation_spins == 0 {
            return Err(WfError::config("simulation_spins must be positive"));
        }
        if self.window_capacity == 0 {
            return Err(WfError::config("window_capacity must be positive"));
        }
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(WfError::config(format!(
                "fps must be within 1..={}, got {}",
                MAX_FPS, self.fps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wf_wheel::SegmentKind;

    #[test]
    fn test_default_config_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.segments.len(), 54);
        assert_eq!(config.spin_timing(), SpinTiming::normal());
        assert_eq!(config.result_hold_secs, 12.0);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
segments:
  - {{ label: "A", weight: 1.0, payout: 1.0 }}
  - {{ label: "B", weight: 1.0, payout: 2.0 }}
  - label: "C"
    weight: 2.0
    payout: 3.0
    kind: house_wins
profile: quick
seed: 42
link:
  host: pi.local
"#
        )
        .unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.segments.len(), 3);
        assert_eq!(config.segments[2].kind, SegmentKind::HouseWins);
        assert_eq!(config.spin_timing(), SpinTiming::quick());
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.link.host, "pi.local");
        assert_eq!(config.link.port, 1883);
    }

    #[test]
    fn test_load_json_with_explicit_timing() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "timing": {{ "wind_up_secs": 0.5, "min_spin_secs": 1.0, "max_spin_secs": 2.0 }}, "fps": 60 }}"#
        )
        .unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        let timing = config.spin_timing();
        assert_eq!(timing.wind_up_secs, 0.5);
        assert_eq!(timing.max_spin_secs, 2.0);
        assert_eq!(config.fps, 60);
    }

    #[test]
    fn test_rejects_bad_tables() {
        let config = GameConfig {
            segments: Vec::new(),
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(WfError::Configuration(_))));

        let config = GameConfig {
            segments: vec![SegmentSpec::new("A", 0.0, 1.0)],
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            fps: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_extension_and_bad_syntax() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            GameConfig::load(file.path()),
            Err(WfError::Configuration(_))
        ));

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            GameConfig::load(file.path()),
            Err(WfError::Serialization(_))
        ));
    }
}

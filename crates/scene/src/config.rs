use std::path::Path;

use road_beat::BeatConfig;
use road_plan::PlannerConfig;
use road_stream::StreamConfig;
use serde::{Deserialize, Serialize};

use crate::dolly::DollyConfig;
use crate::error::SceneError;

/// One streamed world: a planned grid, its stream settings and the name of
/// the placement strategy that fills it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub name: String,
    pub strategy: String,
    pub stream: StreamConfig,
    pub planner: PlannerConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "world".into(),
            strategy: "city".into(),
            stream: StreamConfig::default(),
            planner: PlannerConfig::default(),
        }
    }
}

/// Top-level scene file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for every random decision made by the scene.
    pub seed: u64,
    pub beat: BeatConfig,
    pub worlds: Vec<WorldConfig>,
    pub dolly: Option<DollyConfig>,
}

impl SceneConfig {
    /// Read a YAML scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), worlds = config.worlds.len(), "scene config loaded");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENE: &str = r#"
seed: 7
beat:
  pulse_period_ms: 250.0
  scene_pulses: [16, 32]
worlds:
  - name: downtown
    strategy: city
    stream:
      cell_size: 10.0
      unload_threshold: -400.0
    planner:
      block_rows: 3
      strict_footprints: true
dolly:
  speed: 12.0
"#;

    #[test]
    fn parses_partial_scene() {
        let config = SceneConfig::from_yaml_str(SCENE).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.beat.pulse_period_ms, 250.0);
        assert_eq!(config.beat.scene_pulses, vec![16, 32]);
        assert_eq!(config.beat.start_threshold, -50.0);

        let world = &config.worlds[0];
        assert_eq!(world.name, "downtown");
        assert_eq!(world.stream.cell_size, 10.0);
        assert_eq!(world.stream.unload_threshold, Some(-400.0));
        assert_eq!(world.planner.block_rows, 3);
        assert_eq!(world.planner.block_cols, 5);
        assert!(world.planner.strict_footprints);

        let dolly = config.dolly.unwrap();
        assert_eq!(dolly.speed, 12.0);
        assert_eq!(dolly.stop, -100.0);
    }

    #[test]
    fn empty_file_is_default_scene() {
        let config = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn load_from_disk_and_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENE.as_bytes()).unwrap();

        let config = SceneConfig::load(file.path()).unwrap();
        let again = SceneConfig::from_yaml_str(&config.to_yaml_string().unwrap()).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = SceneConfig::from_yaml_str("seed: [not a number").unwrap_err();
        assert!(matches!(err, SceneError::Yaml(_)));
    }
}

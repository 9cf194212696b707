//! Simulation configuration
//!
//! Values are layered: built-in defaults, then the user's `config.toml`, then
//! `RIPPLE__SECTION__KEY` environment variables. Command-line flags are applied
//! on top by the binary.

use crate::error::{Result as EngineResult, SimulationError};
use crate::motion::MotionSettings;
use crate::physics::integrators::IntegratorRegistry;
use crate::physics::{ConvergenceCriterion, Field, FieldLayout, FieldParameters, Scalar};
use directories::ProjectDirs;
use ripple_macros::ConfigDefaults;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "RIPPLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    NoConfigDirectory,

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to assemble layered configuration: {0}")]
    Layered(#[from] ::config::ConfigError),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ConfigDefaults)]
#[serde(default)]
pub struct SimulationConfig {
    pub field: FieldConfig,
    pub motion: MotionConfig,
    pub splash: SplashConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ConfigDefaults)]
#[serde(default)]
pub struct FieldConfig {
    /// Horizontal extent sampled by the field
    #[default(800)]
    pub width: u32,
    /// Distance between neighboring nodes
    #[default(2)]
    pub sample_interval: u32,
    #[default(200.0)]
    pub target_height: Scalar,
    #[default(0.025)]
    pub tension: Scalar,
    #[default(0.020)]
    pub dampening: Scalar,
    #[default(0.25)]
    pub spread: Scalar,
    #[default(5)]
    pub diffusion_iterations: usize,
    #[default("semi_implicit_euler")]
    pub integrator: String,
    pub convergence: ConvergenceCriterion,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ConfigDefaults)]
#[serde(default)]
pub struct MotionConfig {
    #[default(10)]
    pub tick_interval_ms: u64,
    #[default(2000)]
    pub max_duration_ms: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ConfigDefaults)]
#[serde(default)]
pub struct SplashConfig {
    /// Velocity given to the struck node
    #[default(200.0)]
    pub magnitude: Scalar,
    /// Struck node; the centre node when unset
    pub index: Option<usize>,
    /// Seed for picking a random node when `index` is unset
    pub seed: Option<u64>,
}

impl FieldConfig {
    pub fn layout(&self) -> FieldLayout {
        FieldLayout {
            width: self.width,
            sample_interval: self.sample_interval,
        }
    }

    pub fn parameters(&self) -> FieldParameters {
        FieldParameters {
            target_height: self.target_height,
            tension: self.tension,
            dampening: self.dampening,
            spread: self.spread,
            diffusion_iterations: self.diffusion_iterations,
            convergence: self.convergence,
        }
    }

    /// Validate and build the field this section describes.
    pub fn build(&self) -> EngineResult<Field> {
        let integrator = IntegratorRegistry::default().create(&self.integrator)?;
        Ok(Field::new(self.layout(), self.parameters())?.with_integrator(integrator))
    }
}

impl MotionConfig {
    pub fn settings(&self) -> MotionSettings {
        MotionSettings {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            max_duration: Duration::from_millis(self.max_duration_ms),
        }
    }
}

impl SimulationConfig {
    /// Check every section without building anything long-lived.
    pub fn validate(&self) -> EngineResult<()> {
        let field = self.field.build()?;
        self.motion.settings().validate()?;
        if !self.splash.magnitude.is_finite() {
            return Err(SimulationError::invalid("splash magnitude must be finite"));
        }
        if let Some(index) = self.splash.index {
            if index >= field.len() {
                return Err(SimulationError::OutOfRange {
                    index,
                    len: field.len(),
                });
            }
        }
        Ok(())
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("Config file {} not found. Using defaults.", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Layer defaults, the user's config file and environment overrides.
    pub fn load_layered(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(::config::File::from(file).required(false));
        }
        let layered = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(layered.try_deserialize()?)
    }

    /// Configuration from the platform config directory plus environment,
    /// or defaults if that fails.
    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path().ok();
        match Self::load_layered(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load user configuration: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn user_config_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "ripple")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDirectory)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(io_error)
    }

    pub fn save_to_user_config(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::user_config_path()?;
        self.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.field.width, 800);
        assert_eq!(config.field.tension, 0.025);
        assert_eq!(config.field.dampening, 0.020);
        assert_eq!(config.field.spread, 0.25);
        assert_eq!(config.field.diffusion_iterations, 5);
        assert_eq!(config.field.convergence, ConvergenceCriterion::Truncated);
        assert_eq!(config.motion.settings(), MotionSettings::default());
        assert_eq!(config.splash.magnitude, 200.0);
        assert_eq!(config.splash.index, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            [field]
            tension = 0.05
            convergence = { epsilon = { tolerance = 0.5 } }

            [motion]
            max_duration_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.field.tension, 0.05);
        assert_eq!(config.field.width, 800);
        assert_eq!(
            config.field.convergence,
            ConvergenceCriterion::Epsilon { tolerance: 0.5 }
        );
        assert_eq!(config.motion.max_duration_ms, 500);
        assert_eq!(config.motion.tick_interval_ms, 10);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SimulationConfig::default();
        config.splash.index = Some(12);
        config.field.integrator = "explicit_euler".into();

        let parsed: SimulationConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_bad_sections() {
        let mut config = SimulationConfig::default();
        config.field.spread = 2.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.field.integrator = "leapfrog".into();
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.motion.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.splash.index = Some(400);
        assert_eq!(
            config.validate(),
            Err(SimulationError::OutOfRange {
                index: 400,
                len: 400
            })
        );
    }

    #[test]
    fn test_build_uses_configured_integrator() {
        let mut config = FieldConfig::default();
        config.integrator = "explicit_euler".into();
        let field = config.build().unwrap();
        assert_eq!(field.integrator().name(), "explicit_euler");
        assert_eq!(field.len(), 400);
    }
}

//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! [ecs]
//! max_entities = 5000
//!
//! [physics]
//! gravity = [0.0, -8.91, 0.0]
//! fixed_timestep = 0.016
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::Path;

use glesc_math::Tolerance;
use serde::{Deserialize, Serialize};

use crate::ecs::Signature;
use crate::error::{EcsError, EcsResult};

/// Default live-entity limit.
pub const DEFAULT_MAX_ENTITIES: usize = 5000;

/// Default component-type limit.
pub const DEFAULT_MAX_COMPONENTS: usize = 32;

/// Full engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ECS capacities.
    pub ecs: EcsConfig,
    /// Float comparison tolerance.
    pub math: MathConfig,
    /// Physics constants.
    pub physics: PhysicsConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// ECS capacities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Maximum number of live entities.
    pub max_entities: usize,
    /// Maximum number of distinct component types (at most 64).
    pub max_components: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_components: DEFAULT_MAX_COMPONENTS,
        }
    }
}

/// Float comparison tolerance shared by every system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathConfig {
    /// Absolute epsilon.
    pub absolute_epsilon: f64,
    /// Relative epsilon.
    pub relative_epsilon: f64,
}

impl MathConfig {
    /// The configured tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.absolute_epsilon, self.relative_epsilon)
    }
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            absolute_epsilon: Tolerance::F32.absolute,
            relative_epsilon: Tolerance::F32.relative,
        }
    }
}

/// Physics constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector before scaling.
    pub gravity: [f32; 3],
    /// Multiplier applied to gravity.
    pub gravity_scale: f32,
    /// Multiplier applied to force before dividing by mass.
    pub force_scale: f32,
    /// Fraction of velocity lost per step for bodies without their own
    /// air friction.
    pub air_friction: f32,
    /// Fraction of speed kept after a bounce.
    pub bounciness: f32,
    /// Minimum speed for a collision to bounce instead of stop.
    pub bounciness_threshold: f32,
    /// Fixed simulation step in seconds. `None` uses the frame delta.
    pub fixed_timestep: Option<f32>,
    /// Collision events buffered before new ones are dropped.
    pub event_capacity: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -8.91, 0.0],
            gravity_scale: 3.0,
            force_scale: 35.0,
            air_friction: 0.01,
            bounciness: 0.5,
            bounciness_threshold: 1.0,
            fixed_timestep: None,
            event_capacity: 1024,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"glesc_core=debug"`.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`EcsError::Config`] on a syntax error or a rejected value.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EcsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`EcsError::Config`] when the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "engine configuration loaded");
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// [`EcsError::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> EcsResult<String> {
        toml::to_string(self).map_err(|e| EcsError::Config(e.to_string()))
    }

    /// Rejects values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// [`EcsError::Config`] naming the first offending field.
    pub fn validate(&self) -> EcsResult<()> {
        if self.ecs.max_entities == 0 || u32::try_from(self.ecs.max_entities).is_err() {
            return Err(EcsError::Config("ecs.max_entities must be in 1..=u32::MAX".into()));
        }
        if self.ecs.max_components == 0 || self.ecs.max_components > Signature::BITS {
            return Err(EcsError::Config(format!(
                "ecs.max_components must be in 1..={}",
                Signature::BITS
            )));
        }
        if !(self.math.absolute_epsilon > 0.0) || !(self.math.relative_epsilon >= 0.0) {
            return Err(EcsError::Config(
                "math epsilons must be positive (relative may be zero)".into(),
            ));
        }
        if self.physics.gravity.iter().any(|g| !g.is_finite()) {
            return Err(EcsError::Config("physics.gravity must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.physics.air_friction) {
            return Err(EcsError::Config("physics.air_friction must be in [0, 1]".into()));
        }
        if self.physics.bounciness < 0.0 || self.physics.bounciness_threshold < 0.0 {
            return Err(EcsError::Config("physics bounciness values must be non-negative".into()));
        }
        if self.physics.event_capacity == 0 {
            return Err(EcsError::Config("physics.event_capacity must be positive".into()));
        }
        if let Some(step) = self.physics.fixed_timestep {
            if !(step > 0.0) || !step.is_finite() {
                return Err(EcsError::Config("physics.fixed_timestep must be positive".into()));
            }
        }
        Ok(())
    }
}

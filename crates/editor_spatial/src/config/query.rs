//! Query tunables
//!
//! Defaults reproduce the editor's stock behaviour: a 10x10x10 collision
//! grid padded by one world unit, a 1e-6 ray epsilon, at most 500 grid steps
//! and walls rejected when their normal is more than ~70 degrees from up.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Spatial grid built over a collision mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cell counts along X, Y and Z
    pub divisions: [usize; 3],
    /// Padding added to every triangle's bounding box before it is binned
    pub cell_padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            divisions: [10, 10, 10],
            cell_padding: 1.0,
        }
    }
}

/// Ray cast against collision geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayCastConfig {
    /// Determinant threshold below which a triangle is treated as parallel or back-facing
    pub epsilon: f32,
    /// Cap on grid steps before falling back to the exhaustive scan
    pub max_steps: usize,
    /// Step length as a fraction of the smallest cell extent
    pub step_fraction: f32,
    /// `|normal . up|` below this marks a triangle as a wall (cos 70 deg)
    pub wall_cos_threshold: f32,
    /// Whether ray casts skip walls unless told otherwise
    pub ignore_walls: bool,
}

impl Default for RayCastConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            max_steps: 500,
            step_fraction: 0.9,
            wall_cos_threshold: 0.342,
            ignore_walls: false,
        }
    }
}

/// Frustum plane extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustumConfig {
    /// Normalize the extracted planes so signed distances are in world units
    pub normalize_planes: bool,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self { normalize_planes: true }
    }
}

/// Object picking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Default for candidates that do not state a bounds preference
    pub use_scaled_bounds: bool,
    /// Run a color pass when the ray picker finds nothing
    pub color_fallback: bool,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            use_scaled_bounds: true,
            color_fallback: true,
        }
    }
}

/// All spatial query settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Collision grid layout
    pub grid: GridConfig,
    /// Collision ray casts
    pub ray: RayCastConfig,
    /// Frustum culling
    pub frustum: FrustumConfig,
    /// Object picking
    pub picking: PickingConfig,
}

impl Config for QueryConfig {}

impl QueryConfig {
    /// Check that every value is usable by the queries
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.divisions.iter().any(|&d| d == 0) {
            return Err(ConfigError::Invalid(format!(
                "grid divisions must be non-zero, got {:?}",
                self.grid.divisions
            )));
        }
        if !(self.grid.cell_padding.is_finite() && self.grid.cell_padding >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell padding must be finite and non-negative, got {}",
                self.grid.cell_padding
            )));
        }
        if !(self.ray.epsilon.is_finite() && self.ray.epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ray epsilon must be positive, got {}",
                self.ray.epsilon
            )));
        }
        if self.ray.max_steps == 0 {
            return Err(ConfigError::Invalid("ray step cap must be at least 1".to_string()));
        }
        if !(self.ray.step_fraction > 0.0 && self.ray.step_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "step fraction must be in (0, 1], got {}",
                self.ray.step_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.ray.wall_cos_threshold) {
            return Err(ConfigError::Invalid(format!(
                "wall threshold is a cosine and must be in [0, 1], got {}",
                self.ray.wall_cos_threshold
            )));
        }
        Ok(())
    }
}

//! # World Configuration
//!
//! Startup configuration for the streaming world. Values are fixed once a
//! [`crate::engine_state::voxels::world::WorldManager`] is built; nothing here is
//! reloaded at runtime.
//!
//! Configuration can be built in code (`WorldConfig::default()` and field updates)
//! or loaded from JSON. Every field has a default, so a JSON file only needs the
//! values it wants to override:
//!
//! ```json
//! { "seed": 7, "view_radius": 4, "terrain": { "dirt_depth": 4 } }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{engine_state::rendering::atlas::BIOME_TINTS, error::ConfigError};

/// A single noise feature: input scale, output height and optional shaping exponent.
///
/// A `power` of `0.0` means the sample is used unshaped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseBand {
    pub scale: f64,
    pub height: f64,
    pub power: f64,
}

impl NoiseBand {
    pub const fn new(scale: f64, height: f64, power: f64) -> Self {
        NoiseBand {
            scale,
            height,
            power,
        }
    }
}

/// How the mesh builder resolves a face whose neighbour chunk is not loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Treat the missing neighbour as solid and suppress the face.
    Solid,
    /// Recompute the neighbour voxel from the terrain generator.
    #[default]
    Regenerate,
}

/// Noise tuples and thresholds for every terrain feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Constant offset added to the stone surface.
    pub base_height: f64,
    /// Main rolling stone silhouette, sampled on the `y = 0` plane.
    pub stone_base: NoiseBand,
    /// Secondary stone detail, sampled on an offset plane so it decorrelates from the base.
    pub stone_detail: NoiseBand,
    /// Stone heights above this are compressed toward it.
    pub plateau_threshold: f64,
    /// Fraction of the height above `plateau_threshold` that survives flattening.
    pub plateau_flattening: f64,
    pub crater: NoiseBand,
    /// Crater samples are clamped into `[min, max]`; anything above `min` digs in.
    pub crater_clamp: [f64; 2],
    /// Depth in voxels of a crater at the top of the clamp range.
    pub crater_depth: f64,
    pub cave_bands: [NoiseBand; 3],
    pub cave_threshold: f64,
    pub ore: NoiseBand,
    pub ore_threshold: f64,
    pub dirt_depth: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            base_height: 10.0,
            stone_base: NoiseBand::new(10.0, 3.0, 1.2),
            stone_detail: NoiseBand::new(20.0, 4.0, 0.0),
            plateau_threshold: 15.0,
            plateau_flattening: 0.35,
            crater: NoiseBand::new(60.0, 1.0, 0.0),
            crater_clamp: [0.72, 0.9],
            crater_depth: 8.0,
            cave_bands: [
                NoiseBand::new(40.0, 12.0, 1.0),
                NoiseBand::new(30.0, 8.0, 0.0),
                NoiseBand::new(10.0, 4.0, 0.0),
            ],
            cave_threshold: 16.0,
            ore: NoiseBand::new(20.0, 20.0, 0.0),
            ore_threshold: 18.0,
            dirt_depth: 3,
        }
    }
}

/// Top-level configuration for a streaming world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the noise permutation table.
    pub seed: u32,
    /// Horizontal (x/z) view radius in chunks.
    pub view_radius: i32,
    /// Vertical (y) view radius in chunks.
    pub vertical_view_radius: i32,
    /// Chunks closer than this (in chunk units) are prioritised by distance alone.
    pub near_priority_distance: f32,
    /// Size of one atlas cell in UV space.
    pub atlas_unit: f32,
    /// Key into the biome tint table used for grass tops.
    pub grass_biome: String,
    pub boundary_policy: BoundaryPolicy,
    /// Debug: treat every cross-chunk neighbour as air.
    pub isolate_mesh: bool,
    /// Maximum number of offloaded chunks kept in memory. `None` keeps them all.
    pub offload_capacity: Option<usize>,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: 0,
            view_radius: 3,
            vertical_view_radius: 3,
            near_priority_distance: 2.0,
            atlas_unit: 0.125,
            grass_biome: String::from("Normal_1"),
            boundary_policy: BoundaryPolicy::default(),
            isolate_mesh: false,
            offload_capacity: None,
            terrain: TerrainConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded world configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Checks the invariants the world manager relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_radius < 0 || self.vertical_view_radius < 0 {
            return Err(ConfigError::Invalid(format!(
                "view radii must be non-negative, got {} / {}",
                self.view_radius, self.vertical_view_radius
            )));
        }
        if !(self.near_priority_distance >= 0.0) {
            return Err(ConfigError::Invalid(
                "near_priority_distance must be non-negative".to_string(),
            ));
        }
        if !(self.atlas_unit > 0.0 && self.atlas_unit <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "atlas_unit must be in (0, 1], got {}",
                self.atlas_unit
            )));
        }
        if !BIOME_TINTS.contains_key(self.grass_biome.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown grass biome tint '{}'",
                self.grass_biome
            )));
        }
        if self.offload_capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "offload_capacity must be at least 1 when set".to_string(),
            ));
        }
        self.terrain.validate()
    }
}

impl TerrainConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let bands = [
            ("stone_base", &self.stone_base),
            ("stone_detail", &self.stone_detail),
            ("crater", &self.crater),
            ("cave_bands[0]", &self.cave_bands[0]),
            ("cave_bands[1]", &self.cave_bands[1]),
            ("cave_bands[2]", &self.cave_bands[2]),
            ("ore", &self.ore),
        ];
        for (name, band) in bands {
            if !(band.scale > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name}.scale must be positive, got {}",
                    band.scale
                )));
            }
        }
        let [crater_min, crater_max] = self.crater_clamp;
        if crater_min > crater_max {
            return Err(ConfigError::Invalid(format!(
                "crater_clamp is inverted: [{crater_min}, {crater_max}]"
            )));
        }
        if !(0.0..=1.0).contains(&self.plateau_flattening) {
            return Err(ConfigError::Invalid(format!(
                "plateau_flattening must be in [0, 1], got {}",
                self.plateau_flattening
            )));
        }
        if self.dirt_depth < 0 {
            return Err(ConfigError::Invalid(format!(
                "dirt_depth must be non-negative, got {}",
                self.dirt_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            WorldConfig::from_json_str(r#"{ "seed": 7, "terrain": { "dirt_depth": 5 } }"#)
                .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.terrain.dirt_depth, 5);
        assert_eq!(config.view_radius, 3);
        assert_eq!(config.terrain.cave_threshold, 16.0);
        assert_eq!(config.boundary_policy, BoundaryPolicy::Regenerate);
    }

    #[test]
    fn test_boundary_policy_snake_case() {
        let config = WorldConfig::from_json_str(r#"{ "boundary_policy": "solid" }"#).unwrap();
        assert_eq!(config.boundary_policy, BoundaryPolicy::Solid);
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = WorldConfig::default();
        config.offload_capacity = Some(64);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(WorldConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_unknown_biome() {
        let err = WorldConfig::from_json_str(r#"{ "grass_biome": "Desert_9" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = WorldConfig::default();
        config.view_radius = -1;
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.terrain.crater_clamp = [0.9, 0.1];
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.terrain.ore.scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.offload_capacity = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = WorldConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorldConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

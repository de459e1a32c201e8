//! Generation settings
//!
//! Per-asset parameter records and the generator configuration. Everything
//! here is resolved once before generation starts and never mutated
//! afterwards; missing fields in spec files fall back to the same defaults
//! the constructors use.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_terrain_density() -> f64 {
    1.0
}

fn default_terrain_clumping() -> f64 {
    32.0
}

fn default_height_max() -> f64 {
    100.0
}

fn default_scatter_density() -> f64 {
    20.0
}

fn default_scatter_clumping() -> f64 {
    16.0
}

fn default_random_noise_weight() -> f64 {
    0.25
}

fn default_true() -> bool {
    true
}

/// Parameters for one terrain (ground tile) asset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainSettings {
    pub asset: Uuid,
    /// Relative share of terrain when density-based selection is used.
    #[serde(default = "default_terrain_density")]
    pub density: f64,
    /// How much similar tiles clump together.
    #[serde(default = "default_terrain_clumping")]
    pub clumping: f64,
    /// Lowest height band this tile appears in (height-based selection).
    #[serde(default)]
    pub height_min: f64,
    /// Highest height band this tile appears in (height-based selection).
    #[serde(default = "default_height_max")]
    pub height_max: f64,
    /// Jitter applied to the height band before lookup, in bands.
    #[serde(default)]
    pub blend_height_multiplier: i32,
}

impl TerrainSettings {
    pub fn new(asset: Uuid) -> Self {
        TerrainSettings {
            asset,
            density: default_terrain_density(),
            clumping: default_terrain_clumping(),
            height_min: 0.0,
            height_max: default_height_max(),
            blend_height_multiplier: 0,
        }
    }
}

/// Parameters for one scatter (decorative object) asset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScatterSettings {
    pub asset: Uuid,
    /// Density percentile threshold; scatter cells at or below it are
    /// filled, so lower is denser.
    #[serde(default = "default_scatter_density")]
    pub density: f64,
    /// Vertical offset from the terrain surface (negative sinks objects in).
    #[serde(default)]
    pub vertical_offset: f64,
    #[serde(default = "default_scatter_clumping")]
    pub clumping: f64,
    /// Blend factor between the clumped noise field and pure random noise.
    #[serde(default = "default_random_noise_weight")]
    pub random_noise_weight: f64,
    /// Nudge placements away from the cell center by up to half a unit.
    #[serde(default = "default_true")]
    pub random_nudge_enabled: bool,
    /// Rotate placements by a random multiple of 90°.
    #[serde(default = "default_true")]
    pub random_rotation_enabled: bool,
    /// Bias fill probability by terrain height when above zero.
    #[serde(default)]
    pub height_based_multiplier: f64,
    /// Constant added to the height bias.
    #[serde(default)]
    pub height_based_offset: f64,
    /// Center placements on their cell.
    #[serde(default = "default_true")]
    pub place_on_center: bool,
}

impl ScatterSettings {
    pub fn new(asset: Uuid) -> Self {
        ScatterSettings {
            asset,
            density: default_scatter_density(),
            vertical_offset: 0.0,
            clumping: default_scatter_clumping(),
            random_noise_weight: default_random_noise_weight(),
            random_nudge_enabled: true,
            random_rotation_enabled: true,
            height_based_multiplier: 0.0,
            height_based_offset: 0.0,
            place_on_center: true,
        }
    }
}

/// A complete generation request: which assets make up the ground and what
/// gets scattered on top. This is the shape of the CLI's spec file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationSpec {
    #[serde(default)]
    pub terrain: Vec<TerrainSettings>,
    #[serde(default)]
    pub scatter: Vec<ScatterSettings>,
}

/// Generator configuration, constructed once at startup and passed into
/// the engines explicitly.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Block width in tiles.
    pub x: usize,
    /// Block depth in tiles.
    pub y: usize,
    /// Linear height scale applied to the normalized elevation field.
    pub z: f64,
    /// Redistribution exponent; values above one flatten lowlands.
    pub exponent: f64,
    /// Master seed for all subsystems.
    pub seed: u64,
    /// Octave weights for the elevation field.
    pub octaves: Vec<f64>,
    /// Octave scale divisors, paired with `octaves`.
    pub scales: Vec<f64>,
    /// Fold the elevation distribution to emphasize ridgelines.
    pub use_ridge_noise: bool,
    /// Drop one anchor tile at the field minimum so multi-block maps keep
    /// a shared absolute height reference.
    pub precise_height: bool,
    /// Select terrain assets by height band instead of density share.
    pub height_based_placement: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            x: 10,
            y: 10,
            z: 10.0,
            exponent: 1.3,
            seed: 0,
            octaves: vec![1.0, 0.5, 0.25, 0.125],
            scales: vec![1.0, 2.0, 4.0, 8.0],
            use_ridge_noise: false,
            precise_height: false,
            height_based_placement: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_file_defaults() {
        let spec: GenerationSpec = serde_json::from_str(
            r#"{
                "terrain": [{"asset": "01c3a210-94fb-449f-8c47-993eda3e7126", "density": 10}],
                "scatter": [{"asset": "98259887-53c2-41d4-a54f-6140b6acf020", "clumping": 3}]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.terrain.len(), 1);
        assert_eq!(spec.terrain[0].density, 10.0);
        assert_eq!(spec.terrain[0].height_max, 100.0);
        assert_eq!(spec.scatter[0].clumping, 3.0);
        assert_eq!(spec.scatter[0].density, 20.0);
        assert!(spec.scatter[0].place_on_center);
    }

    #[test]
    fn test_constructor_matches_serde_defaults() {
        let from_json: TerrainSettings = serde_json::from_str(
            r#"{"asset": "01c3a210-94fb-449f-8c47-993eda3e7126"}"#,
        )
        .unwrap();
        let built = TerrainSettings::new(from_json.asset);
        assert_eq!(from_json.density, built.density);
        assert_eq!(from_json.clumping, built.clumping);
        assert_eq!(from_json.height_max, built.height_max);
    }

    #[test]
    fn test_config_default_octaves_pair_up() {
        let config = GeneratorConfig::default();
        assert_eq!(config.octaves.len(), config.scales.len());
    }
}

//! Generation pipeline
//!
//! Drives one full run: resolve asset records (deriving composite geometry
//! where missing), build the elevation field and its transforms, build the
//! per-asset scatter maps, then populate and encode each requested block.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::assets::AssetRecord;
use crate::catalog::{Catalog, CatalogError};
use crate::codec::{self, CodecError};
use crate::custom::{self, ResolveError};
use crate::heightfield::Heightfield;
use crate::noisemap::NoiseGenerator;
use crate::scatter;
use crate::seeds::GeneratorSeeds;
use crate::settings::{GeneratorConfig, ScatterSettings, TerrainSettings};
use crate::slab::SlabDocument;
use crate::terrain;

/// Generation failures.
#[derive(Debug)]
pub enum GenerateError {
    /// The terrain asset list is empty — a caller programming error.
    EmptyAssetList,
    /// Settings that cannot drive generation (zero densities, zero
    /// extents).
    InvalidSettings(String),
    Catalog(CatalogError),
    Resolve(ResolveError),
    Codec(CodecError),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::EmptyAssetList => write!(f, "terrain asset list is empty"),
            GenerateError::InvalidSettings(msg) => write!(f, "invalid settings: {}", msg),
            GenerateError::Catalog(e) => write!(f, "{}", e),
            GenerateError::Resolve(e) => write!(f, "{}", e),
            GenerateError::Codec(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<CatalogError> for GenerateError {
    fn from(e: CatalogError) -> Self {
        GenerateError::Catalog(e)
    }
}

impl From<ResolveError> for GenerateError {
    fn from(e: ResolveError) -> Self {
        GenerateError::Resolve(e)
    }
}

impl From<CodecError> for GenerateError {
    fn from(e: CodecError) -> Self {
        GenerateError::Codec(e)
    }
}

/// One encoded output block.
#[derive(Clone, Debug)]
pub struct GeneratedBlock {
    pub x: usize,
    pub y: usize,
    pub encoded: String,
}

/// Intermediate state kept around after a run for inspection (debug
/// exports, tests).
pub struct GenerationReport {
    pub blocks: Vec<GeneratedBlock>,
    pub elevation: Heightfield,
    pub surface: Heightfield,
}

/// Terrain generator for a fixed configuration.
pub struct Generator {
    config: GeneratorConfig,
    seeds: GeneratorSeeds,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let seeds = GeneratorSeeds::from_master(config.seed);
        Generator { config, seeds }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn seeds(&self) -> &GeneratorSeeds {
        &self.seeds
    }

    /// Generate `blocks.0 × blocks.1` adjacent slabs.
    pub fn generate(
        &self,
        catalog: &mut Catalog,
        terrain_settings: &[TerrainSettings],
        scatter_settings: &[ScatterSettings],
        blocks: (usize, usize),
    ) -> Result<GenerationReport, GenerateError> {
        if terrain_settings.is_empty() {
            return Err(GenerateError::EmptyAssetList);
        }
        if blocks.0 == 0 || blocks.1 == 0 {
            return Err(GenerateError::InvalidSettings(
                "block grid must be at least 1×1".into(),
            ));
        }

        let terrain_ids: Vec<Uuid> = terrain_settings.iter().map(|s| s.asset).collect();
        let scatter_ids: Vec<Uuid> = scatter_settings.iter().map(|s| s.asset).collect();
        let terrain_records = resolve_records(catalog, &terrain_ids)?;
        let scatter_records = resolve_records(catalog, &scatter_ids)?;

        let width = self.config.x * blocks.0;
        let height = self.config.y * blocks.1;

        let elevation_noise = NoiseGenerator::new(self.seeds.elevation_noise_seed());
        let elevation = elevation_noise
            .complex_field(
                width,
                height,
                &self.config.octaves,
                &self.config.scales,
                (0.0, 0.0),
                self.config.use_ridge_noise,
            )
            .redistribute(self.config.exponent)
            .scale(self.config.z);

        // The first terrain asset sets the tile grid pitch.
        let tile_size = terrain_records[0].footprint();
        if tile_size <= 0.0 {
            return Err(GenerateError::InvalidSettings(format!(
                "terrain asset {} has zero footprint",
                terrain_records[0].id
            )));
        }

        let table = terrain::build_selection_table(
            terrain_settings,
            self.config.height_based_placement,
        )?;

        let scatter_noise = NoiseGenerator::new(self.seeds.scatter_noise_seed());
        let mut scatter_rng = ChaCha8Rng::seed_from_u64(self.seeds.scatter);
        let maps = scatter::build_scatter_maps(
            &scatter_noise,
            scatter_settings,
            (width as f64 * tile_size) as usize,
            (height as f64 * tile_size) as usize,
            &elevation,
            tile_size,
            &mut scatter_rng,
        );

        let mut surface = Heightfield::new(width, height);
        let mut jitter_rng = ChaCha8Rng::seed_from_u64(self.seeds.jitter);

        let mut result = Vec::with_capacity(blocks.0 * blocks.1);
        for bx in 0..blocks.0 {
            for by in 0..blocks.1 {
                let mut document = SlabDocument::new();
                terrain::populate_terrain(
                    &mut document,
                    catalog,
                    &terrain_records,
                    terrain_settings,
                    &table,
                    &elevation,
                    &mut surface,
                    &self.config,
                    tile_size,
                    (bx, by),
                    &mut jitter_rng,
                )?;
                scatter::populate_scatter(
                    &mut document,
                    catalog,
                    &scatter_records,
                    scatter_settings,
                    &maps,
                    &surface,
                    &self.config,
                    tile_size,
                    (bx, by),
                    &mut jitter_rng,
                )?;

                result.push(GeneratedBlock {
                    x: bx,
                    y: by,
                    encoded: codec::encode(&document)?,
                });
            }
        }

        Ok(GenerationReport {
            blocks: result,
            elevation,
            surface,
        })
    }
}

/// Look up every referenced record, deriving missing composite geometry on
/// the way. A missing id aborts the whole run.
fn resolve_records(catalog: &mut Catalog, ids: &[Uuid]) -> Result<Vec<AssetRecord>, GenerateError> {
    ids.iter()
        .map(|&id| {
            custom::ensure_geometry(catalog, id)?;
            Ok(catalog.lookup(id)?.clone())
        })
        .collect()
}

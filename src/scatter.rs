//! Scatter engine
//!
//! Places decorative objects on top of generated terrain. Each scatter
//! asset gets its own density field over the tile-scaled footprint; cells
//! whose value falls at or below the asset's density threshold are filled
//! (lower is denser), optionally biased by terrain height first. Filled
//! cells become placements sitting on the recorded terrain surface.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::assets::AssetRecord;
use crate::catalog::Catalog;
use crate::custom;
use crate::generator::GenerateError;
use crate::heightfield::Heightfield;
use crate::noisemap::NoiseGenerator;
use crate::settings::{GeneratorConfig, ScatterSettings};
use crate::slab::SlabDocument;

/// Span of the random per-asset field offsets. Any value comfortably
/// larger than a field's dimensions keeps the layers decorrelated.
const OFFSET_SPAN: u32 = 20_000;

/// Build one binary placement map per scatter asset over the full scaled
/// area. A cell value of 1.0 means "place here".
pub fn build_scatter_maps(
    noise: &NoiseGenerator,
    settings: &[ScatterSettings],
    width: usize,
    height: usize,
    elevation: &Heightfield,
    tile_size: f64,
    rng: &mut ChaCha8Rng,
) -> Vec<Heightfield> {
    settings
        .iter()
        .map(|setting| {
            // Independent offset per asset so layers stay decorrelated.
            let offset = (
                f64::from(rng.gen_range(0..OFFSET_SPAN)),
                f64::from(rng.gen_range(0..OFFSET_SPAN)),
            );
            let mut map = noise.scatter_field(
                width,
                height,
                offset,
                setting.clumping,
                setting.random_noise_weight,
                rng,
            );

            for y in 0..height {
                for x in 0..width {
                    let mut value = map.get(x, y);
                    if setting.height_based_multiplier > 0.0 {
                        let tx = ((x as f64 / tile_size).floor() as usize)
                            .min(elevation.width - 1);
                        let ty = ((y as f64 / tile_size).floor() as usize)
                            .min(elevation.height - 1);
                        value += elevation.get(tx, ty) * setting.height_based_multiplier
                            + setting.height_based_offset;
                    }
                    map.set(x, y, if value <= setting.density { 1.0 } else { 0.0 });
                }
            }
            map
        })
        .collect()
}

/// Emit scatter placements for one block from the prebuilt maps.
pub fn populate_scatter(
    document: &mut SlabDocument,
    catalog: &mut Catalog,
    records: &[AssetRecord],
    settings: &[ScatterSettings],
    maps: &[Heightfield],
    surface: &Heightfield,
    config: &GeneratorConfig,
    tile_size: f64,
    block: (usize, usize),
    rng: &mut ChaCha8Rng,
) -> Result<(), GenerateError> {
    let span_x = (config.x as f64 * tile_size) as usize;
    let span_y = (config.y as f64 * tile_size) as usize;

    for ((record, setting), map) in records.iter().zip(settings).zip(maps) {
        for x in 0..span_x {
            for y in 0..span_y {
                let gx = x + block.0 * span_x;
                let gy = y + block.1 * span_y;
                if gx >= map.width || gy >= map.height || map.get(gx, gy) <= 0.0 {
                    continue;
                }

                let tx = ((x as f64 / tile_size).floor() as usize + block.0 * config.x)
                    .min(surface.width - 1);
                let ty = ((y as f64 / tile_size).floor() as usize + block.1 * config.y)
                    .min(surface.height - 1);

                let mut nx = x as f64;
                let mut ny = y as f64;
                let nz = surface.get(tx, ty) + setting.vertical_offset;
                let mut rot = 0u32;

                if setting.place_on_center {
                    nx += 0.5;
                    ny += 0.5;
                }
                if setting.random_rotation_enabled {
                    rot = rng.gen_range(0u32..4) * 90;
                }
                if setting.random_nudge_enabled {
                    nx += (f64::from(rng.gen_range(0..100)) - 50.0) / 100.0;
                    ny += (f64::from(rng.gen_range(0..100)) - 50.0) / 100.0;
                }

                custom::place_asset(document, catalog, record.id, nx, ny, nz, rot)?;
            }
        }
    }
    Ok(())
}

//! Terrain engine
//!
//! Turns the elevation field into stacked tile placements, one column per
//! grid cell. Asset choice comes from either a cumulative-density table or
//! a height-band lookup; column depth comes from the adaptive-thickness
//! rule, which fills enough tiles below each cell that no vertical gap
//! shows against its neighbors.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::assets::AssetRecord;
use crate::catalog::Catalog;
use crate::custom;
use crate::generator::GenerateError;
use crate::heightfield::Heightfield;
use crate::settings::{GeneratorConfig, TerrainSettings};
use crate::slab::SlabDocument;

/// One entry of the cumulative-density table: draws landing inside
/// `[lower, upper)` select `asset`.
#[derive(Clone, Debug)]
pub struct DensityBand {
    pub asset: usize,
    pub lower: f64,
    pub upper: f64,
}

/// Precomputed asset-selection table, built once per generation.
#[derive(Clone, Debug)]
pub enum SelectionTable {
    /// Weighted random selection over density shares.
    Density { bands: Vec<DensityBand>, total: f64 },
    /// Height-band lookup: index by `round(height / z · 100)`.
    HeightBands { buckets: Vec<usize> },
}

/// Build the selection table for a settings list.
pub fn build_selection_table(
    settings: &[TerrainSettings],
    height_based: bool,
) -> Result<SelectionTable, GenerateError> {
    if settings.is_empty() {
        return Err(GenerateError::EmptyAssetList);
    }

    if height_based {
        let mut buckets: Vec<Option<usize>> = vec![None; 101];
        for (position, setting) in settings.iter().enumerate() {
            let band = (setting.height_max.max(0.0) as usize).min(100);
            if buckets[band].is_none() {
                buckets[band] = Some(position);
            }
        }

        // Flood-fill empty bands downward from the assets above them, then
        // upward for anything left over the topmost asset.
        for band in (1..=100).rev() {
            if buckets[band - 1].is_none() {
                buckets[band - 1] = buckets[band];
            }
        }
        for band in 1..=100 {
            if buckets[band].is_none() {
                buckets[band] = buckets[band - 1];
            }
        }

        let buckets = buckets.into_iter().map(|b| b.unwrap_or(0)).collect();
        return Ok(SelectionTable::HeightBands { buckets });
    }

    let mut bands = Vec::with_capacity(settings.len());
    let mut total = 0.0;
    for (position, setting) in settings.iter().enumerate() {
        bands.push(DensityBand {
            asset: position,
            lower: total,
            upper: total + setting.density,
        });
        total += setting.density;
    }
    if total <= 0.0 {
        return Err(GenerateError::InvalidSettings(
            "total terrain density is zero".into(),
        ));
    }
    Ok(SelectionTable::Density { bands, total })
}

/// Pick the terrain asset (by settings-list position) for one cell.
pub fn select_asset(
    table: &SelectionTable,
    settings: &[TerrainSettings],
    elevation: &Heightfield,
    x: usize,
    y: usize,
    z_scale: f64,
    rng: &mut ChaCha8Rng,
) -> usize {
    match table {
        SelectionTable::Density { bands, total } => {
            let draw = rng.gen_range(0.0..*total);
            bands
                .iter()
                .find(|band| draw >= band.lower && draw < band.upper)
                .map(|band| band.asset)
                .unwrap_or(bands[bands.len() - 1].asset)
        }
        SelectionTable::HeightBands { buckets } => {
            let mut band = ((elevation.get(x, y) / z_scale) * 100.0).round() as i64;
            band = band.clamp(0, 100);

            let blend = settings[buckets[band as usize]].blend_height_multiplier;
            if blend > 0 {
                band += i64::from(rng.gen_range(-blend..blend));
                band = band.clamp(0, 100);
            }
            buckets[band as usize]
        }
    }
}

/// A cell's column height in stacked-tile units.
fn column_height(elevation: &Heightfield, x: isize, y: isize, vertical_extent: f64) -> i64 {
    (elevation.get_clamped(x, y) / vertical_extent).ceil() as i64
}

/// How many tiles must stack under `(x, y)` so no gap opens against the
/// lowest of its four axis neighbors. Neighbor reads clamp to the grid, so
/// border cells compare against themselves on the outside.
pub fn adaptive_thickness(
    elevation: &Heightfield,
    x: usize,
    y: usize,
    vertical_extent: f64,
) -> i64 {
    let (xi, yi) = (x as isize, y as isize);
    let current = column_height(elevation, xi, yi, vertical_extent);
    let lowest = [(xi, yi - 1), (xi, yi + 1), (xi - 1, yi), (xi + 1, yi)]
        .into_iter()
        .map(|(nx, ny)| column_height(elevation, nx, ny, vertical_extent))
        .min()
        .unwrap_or(current);
    (current - lowest + 1).max(1)
}

/// Emit terrain columns for one block, recording each column's top surface
/// height into `surface` for the scatter engine.
pub fn populate_terrain(
    document: &mut SlabDocument,
    catalog: &mut Catalog,
    records: &[AssetRecord],
    settings: &[TerrainSettings],
    table: &SelectionTable,
    elevation: &Heightfield,
    surface: &mut Heightfield,
    config: &GeneratorConfig,
    tile_size: f64,
    block: (usize, usize),
    rng: &mut ChaCha8Rng,
) -> Result<(), GenerateError> {
    for x in 0..config.x {
        for y in 0..config.y {
            let gx = x + block.0 * config.x;
            let gy = y + block.1 * config.y;

            let position = select_asset(table, settings, elevation, gx, gy, config.z, rng);
            let record = &records[position];
            let vertical = record.vertical_extent();
            if vertical <= 0.0 {
                return Err(GenerateError::InvalidSettings(format!(
                    "terrain asset {} has zero vertical extent",
                    record.id
                )));
            }

            if config.precise_height && x == 1 && y == 1 {
                custom::place_asset(
                    document,
                    catalog,
                    record.id,
                    x as f64 * tile_size,
                    y as f64 * tile_size,
                    elevation.min_value(),
                    0,
                )?;
            }

            let current = column_height(elevation, gx as isize, gy as isize, vertical);
            surface.set(gx, gy, vertical * (current + 1) as f64);

            let thickness = adaptive_thickness(elevation, gx, gy, vertical);
            for layer in 0..thickness {
                let rot = rng.gen_range(0u32..4) * 90;
                custom::place_asset(
                    document,
                    catalog,
                    record.id,
                    x as f64 * tile_size,
                    y as f64 * tile_size,
                    vertical * (current - layer) as f64,
                    rot,
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRecord;
    use crate::quad::Quad;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn tile_record() -> AssetRecord {
        AssetRecord::tile(
            Uuid::from_u128(0x7711),
            "Rock",
            Quad::ZERO,
            Quad::new(0.5, 0.5, 0.5, 0.0),
        )
    }

    fn flat_field(value: f64) -> Heightfield {
        Heightfield::from_vec(4, 4, vec![value; 16])
    }

    #[test]
    fn test_flat_field_thickness_is_one() {
        let field = flat_field(3.7);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(adaptive_thickness(&field, x, y, 1.0), 1);
            }
        }
    }

    #[test]
    fn test_thickness_fills_discontinuity() {
        let field = Heightfield::from_vec(2, 1, vec![0.0, 3.0]);
        assert_eq!(adaptive_thickness(&field, 0, 0, 1.0), 1);
        assert_eq!(adaptive_thickness(&field, 1, 0, 1.0), 4);
    }

    #[test]
    fn test_density_table_bands() {
        let settings = vec![
            TerrainSettings {
                density: 10.0,
                ..TerrainSettings::new(Uuid::from_u128(1))
            },
            TerrainSettings {
                density: 90.0,
                ..TerrainSettings::new(Uuid::from_u128(2))
            },
        ];
        match build_selection_table(&settings, false).unwrap() {
            SelectionTable::Density { bands, total } => {
                assert_eq!(total, 100.0);
                assert_eq!(bands[0].lower, 0.0);
                assert_eq!(bands[0].upper, 10.0);
                assert_eq!(bands[1].lower, 10.0);
                assert_eq!(bands[1].upper, 100.0);
            }
            other => panic!("expected density table, got {:?}", other),
        }
    }

    #[test]
    fn test_height_buckets_flood_fill() {
        let settings = vec![
            TerrainSettings {
                height_max: 40.0,
                ..TerrainSettings::new(Uuid::from_u128(1))
            },
            TerrainSettings {
                height_max: 80.0,
                ..TerrainSettings::new(Uuid::from_u128(2))
            },
        ];
        match build_selection_table(&settings, true).unwrap() {
            SelectionTable::HeightBands { buckets } => {
                assert_eq!(buckets[0], 0);
                assert_eq!(buckets[40], 0);
                assert_eq!(buckets[41], 1);
                assert_eq!(buckets[80], 1);
                assert_eq!(buckets[100], 1);
            }
            other => panic!("expected height bands, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_settings_rejected() {
        assert!(matches!(
            build_selection_table(&[], false),
            Err(GenerateError::EmptyAssetList)
        ));
    }

    #[test]
    fn test_height_based_selection_follows_field() {
        let settings = vec![
            TerrainSettings {
                height_max: 40.0,
                ..TerrainSettings::new(Uuid::from_u128(1))
            },
            TerrainSettings {
                height_max: 80.0,
                ..TerrainSettings::new(Uuid::from_u128(2))
            },
        ];
        let table = build_selection_table(&settings, true).unwrap();
        let field = Heightfield::from_vec(2, 1, vec![1.0, 9.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        // Heights 1.0 and 9.0 against z=10 land in bands 10 and 90.
        assert_eq!(select_asset(&table, &settings, &field, 0, 0, 10.0, &mut rng), 0);
        assert_eq!(select_asset(&table, &settings, &field, 1, 0, 10.0, &mut rng), 1);
    }

    #[test]
    fn test_populate_flat_block() {
        let record = tile_record();
        let mut catalog = Catalog::with_assets([record.clone()]);
        let settings = vec![TerrainSettings::new(record.id)];
        let table = build_selection_table(&settings, false).unwrap();
        let config = GeneratorConfig {
            x: 2,
            y: 2,
            z: 1.0,
            ..GeneratorConfig::default()
        };

        let elevation = Heightfield::new(2, 2);
        let mut surface = Heightfield::new(2, 2);
        let mut document = SlabDocument::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        populate_terrain(
            &mut document,
            &mut catalog,
            &[record.clone()],
            &settings,
            &table,
            &elevation,
            &mut surface,
            &config,
            record.footprint(),
            (0, 0),
            &mut rng,
        )
        .unwrap();

        // Flat field: one tile per cell, all at z = 0.
        assert_eq!(document.total_instances(), 4);
        for instance in &document.bucket(record.id).unwrap().instances {
            assert_eq!(instance.z, 0);
        }
        // Top surface is one vertical extent above the (empty) column.
        assert_eq!(surface.get(0, 0), 1.0);
        assert_eq!(surface.get(1, 1), 1.0);
    }

    #[test]
    fn test_populate_stacks_at_cliffs() {
        let record = tile_record();
        let mut catalog = Catalog::with_assets([record.clone()]);
        let settings = vec![TerrainSettings::new(record.id)];
        let table = build_selection_table(&settings, false).unwrap();
        let config = GeneratorConfig {
            x: 2,
            y: 1,
            z: 3.0,
            ..GeneratorConfig::default()
        };

        let elevation = Heightfield::from_vec(2, 1, vec![0.0, 3.0]);
        let mut surface = Heightfield::new(2, 1);
        let mut document = SlabDocument::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        populate_terrain(
            &mut document,
            &mut catalog,
            &[record.clone()],
            &settings,
            &table,
            &elevation,
            &mut surface,
            &config,
            record.footprint(),
            (0, 0),
            &mut rng,
        )
        .unwrap();

        // Low cell: one tile. High cell: four tiles filling down to its
        // neighbor's level.
        assert_eq!(document.total_instances(), 5);
        let zs: Vec<u32> = document
            .bucket(record.id)
            .unwrap()
            .instances
            .iter()
            .filter(|i| i.x == 100)
            .map(|i| i.z)
            .collect();
        assert_eq!(zs, vec![300, 200, 100, 0]);
    }

    #[test]
    fn test_missing_record_aborts() {
        let record = tile_record();
        let mut catalog = Catalog::new();
        let settings = vec![TerrainSettings::new(record.id)];
        let table = build_selection_table(&settings, false).unwrap();
        let config = GeneratorConfig {
            x: 1,
            y: 1,
            ..GeneratorConfig::default()
        };

        let elevation = Heightfield::new(1, 1);
        let mut surface = Heightfield::new(1, 1);
        let mut document = SlabDocument::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = populate_terrain(
            &mut document,
            &mut catalog,
            &[record.clone()],
            &settings,
            &table,
            &elevation,
            &mut surface,
            &config,
            1.0,
            (0, 0),
            &mut rng,
        );
        assert!(matches!(result, Err(GenerateError::Resolve(_))));
    }
}

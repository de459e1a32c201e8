//! Asset catalog
//!
//! Key-to-record lookup for everything the generator can place, with JSON
//! file persistence. The only mutation the core performs is registering
//! newly created composite assets (and memoizing their derived geometry).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::assets::AssetRecord;
use crate::quad::Quad;

/// Catalog failures.
#[derive(Debug)]
pub enum CatalogError {
    /// No record under the requested id.
    NotFound(Uuid),
    /// Catalog file could not be read or written.
    Io(std::io::Error),
    /// Catalog file is not valid JSON for a record list.
    Parse(serde_json::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(id) => write!(f, "asset {} not found in catalog", id),
            CatalogError::Io(e) => write!(f, "catalog i/o error: {}", e),
            CatalogError::Parse(e) => write!(f, "catalog parse error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

/// In-memory id → record catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    assets: HashMap<Uuid, AssetRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn with_assets(records: impl IntoIterator<Item = AssetRecord>) -> Self {
        let mut catalog = Catalog::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Add or replace a record. Returns its id.
    pub fn insert(&mut self, record: AssetRecord) -> Uuid {
        let id = record.id;
        self.assets.insert(id, record);
        id
    }

    pub fn lookup(&self, id: Uuid) -> Result<&AssetRecord, CatalogError> {
        self.assets.get(&id).ok_or(CatalogError::NotFound(id))
    }

    /// Register a new composite asset from its encoded document. Geometry
    /// is left zero for the custom-asset resolver to derive on first use.
    pub fn store(&mut self, name: &str, encoded: &str) -> Uuid {
        self.insert(AssetRecord::custom(name, encoded))
    }

    /// Memoize derived bounding-box geometry onto an existing record.
    pub(crate) fn update_geometry(
        &mut self,
        id: Uuid,
        center: Quad,
        extent: Quad,
    ) -> Result<(), CatalogError> {
        let record = self.assets.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        record.center = center;
        record.extent = extent;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Load a catalog from a JSON record list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        let records: Vec<AssetRecord> = serde_json::from_str(&text)?;
        Ok(Catalog::with_assets(records))
    }

    /// Write the catalog as a JSON record list, sorted by id so files diff
    /// cleanly between runs.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let mut records: Vec<&AssetRecord> = self.assets.values().collect();
        records.sort_by_key(|r| r.id);
        let text = serde_json::to_string_pretty(&records)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;

    fn tile(n: u128) -> AssetRecord {
        AssetRecord::tile(
            Uuid::from_u128(n),
            "Grass",
            Quad::ZERO,
            Quad::new(0.5, 0.25, 0.5, 0.0),
        )
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let catalog = Catalog::with_assets([tile(1)]);
        assert!(catalog.lookup(Uuid::from_u128(1)).is_ok());
        match catalog.lookup(Uuid::from_u128(2)) {
            Err(CatalogError::NotFound(id)) => assert_eq!(id, Uuid::from_u128(2)),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_store_registers_custom() {
        let mut catalog = Catalog::new();
        let id = catalog.store("Tree 4 Tall", "```payload```");
        let record = catalog.lookup(id).unwrap();
        assert_eq!(record.kind, AssetKind::Custom);
        assert_eq!(record.slug, "Tree_4_Tall");
        assert!(record.needs_geometry());
    }

    #[test]
    fn test_update_geometry_memoizes() {
        let mut catalog = Catalog::new();
        let id = catalog.store("Tree", "```payload```");
        catalog
            .update_geometry(
                id,
                Quad::new(1.0, 1.0, 0.0, 0.0),
                Quad::new(1.0, 1.0, 0.5, 0.0),
            )
            .unwrap();
        assert!(!catalog.lookup(id).unwrap().needs_geometry());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::with_assets([tile(1), tile(2)]);
        catalog.store("Tree", "```payload```");
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(
            loaded.lookup(Uuid::from_u128(1)).unwrap().extent,
            Quad::new(0.5, 0.25, 0.5, 0.0)
        );
    }
}

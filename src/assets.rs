//! Asset records
//!
//! One record per placeable asset: identity, display naming, the bounding
//! box the engines size placements with, and — for composite assets — the
//! embedded slab document describing their parts. The concrete behavior of
//! a placement is selected by the closed [`AssetKind`] tag, not by name.
//!
//! Extent axes follow the client's mesh convention: `x` and `z` are the
//! horizontal half-extents, `y` is the vertical half-extent.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quad::Quad;

/// The closed set of asset behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    /// Ground tile stacked into terrain columns.
    Tile,
    /// Decorative prop scattered on top of terrain.
    Prop,
    /// Composite asset whose geometry is an embedded slab document.
    Custom,
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: Uuid,
    pub name: String,
    /// Whitespace-free variant of the display name.
    pub slug: String,
    pub kind: AssetKind,
    /// Bounding-box center. Zero on a custom asset means "not derived yet".
    #[serde(default)]
    pub center: Quad,
    /// Bounding-box half-extent.
    #[serde(default)]
    pub extent: Quad,
    /// Embedded slab document; present only on custom assets.
    #[serde(default)]
    pub encoded: Option<String>,
}

impl AssetRecord {
    pub fn new(id: Uuid, name: &str, kind: AssetKind, center: Quad, extent: Quad) -> Self {
        AssetRecord {
            id,
            name: name.to_string(),
            slug: slugify(name),
            kind,
            center,
            extent,
            encoded: None,
        }
    }

    pub fn tile(id: Uuid, name: &str, center: Quad, extent: Quad) -> Self {
        AssetRecord::new(id, name, AssetKind::Tile, center, extent)
    }

    pub fn prop(id: Uuid, name: &str, center: Quad, extent: Quad) -> Self {
        AssetRecord::new(id, name, AssetKind::Prop, center, extent)
    }

    /// A freshly registered composite asset; geometry is derived lazily
    /// from the embedded document by the custom-asset resolver.
    pub fn custom(name: &str, encoded: &str) -> Self {
        AssetRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            kind: AssetKind::Custom,
            center: Quad::ZERO,
            extent: Quad::ZERO,
            encoded: Some(encoded.to_string()),
        }
    }

    /// Full horizontal footprint along X.
    pub fn footprint(&self) -> f64 {
        self.extent.x * 2.0
    }

    /// Full vertical extent of one stacked copy.
    pub fn vertical_extent(&self) -> f64 {
        self.extent.y * 2.0
    }

    /// True when this record still needs its bounding box inferred from
    /// the embedded document.
    pub fn needs_geometry(&self) -> bool {
        self.kind == AssetKind::Custom && (self.center.is_zero() || self.extent.is_zero())
    }
}

fn slugify(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

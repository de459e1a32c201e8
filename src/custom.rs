//! Composite-asset resolution
//!
//! Composite ("custom") assets carry their geometry as an embedded slab
//! document instead of a catalog mesh, which makes two operations
//! recursive: inferring a bounding box for a record that has none, and
//! expanding a placed composite into elementary placements. Both thread a
//! visited-id set through the recursion so a document that embeds itself,
//! directly or transitively, fails fast instead of recursing forever.

use std::collections::HashSet;

use uuid::Uuid;

use crate::assets::AssetKind;
use crate::catalog::{Catalog, CatalogError};
use crate::codec::{self, CodecError};
use crate::quad::Quad;
use crate::slab::{PlacementInstance, SlabDocument};

/// Failures while resolving composite assets.
#[derive(Debug)]
pub enum ResolveError {
    Catalog(CatalogError),
    Codec(CodecError),
    /// An asset's embedded document references the asset itself, directly
    /// or through intermediate composites.
    CyclicComposite(Uuid),
    /// A custom record with no embedded document cannot be resolved.
    MissingDocument(Uuid),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Catalog(e) => write!(f, "{}", e),
            ResolveError::Codec(e) => write!(f, "embedded document: {}", e),
            ResolveError::CyclicComposite(id) => {
                write!(f, "composite asset {} embeds itself", id)
            }
            ResolveError::MissingDocument(id) => {
                write!(f, "custom asset {} has no embedded document", id)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<CatalogError> for ResolveError {
    fn from(e: CatalogError) -> Self {
        ResolveError::Catalog(e)
    }
}

impl From<CodecError> for ResolveError {
    fn from(e: CodecError) -> Self {
        ResolveError::Codec(e)
    }
}

// ----------------------------------------------------------------------
// Bounding-box inference
// ----------------------------------------------------------------------

/// Make sure the record under `id` has usable geometry, deriving and
/// memoizing it from the embedded document if needed. Returns the record's
/// `(center, extent)`.
pub fn ensure_geometry(catalog: &mut Catalog, id: Uuid) -> Result<(Quad, Quad), ResolveError> {
    let mut visited = HashSet::new();
    derive_bounding_box(catalog, id, &mut visited)
}

fn derive_bounding_box(
    catalog: &mut Catalog,
    id: Uuid,
    visited: &mut HashSet<Uuid>,
) -> Result<(Quad, Quad), ResolveError> {
    let record = catalog.lookup(id)?;
    if !record.needs_geometry() {
        return Ok((record.center, record.extent));
    }
    let encoded = record
        .encoded
        .clone()
        .ok_or(ResolveError::MissingDocument(id))?;

    if !visited.insert(id) {
        return Err(ResolveError::CyclicComposite(id));
    }

    let document = codec::decode(&encoded)?;

    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    let mut max_z: f64 = 0.0;
    for bucket in document.buckets() {
        let (_, child_extent) = derive_bounding_box(catalog, bucket.id, visited)?;
        for placement in &bucket.instances {
            // A 90°-rotated part occupies its footprint with X and Z
            // swapped.
            let (off_x, off_y) = if placement.rot % 180 == 0 {
                (child_extent.x * 2.0, child_extent.z * 2.0)
            } else {
                (child_extent.z * 2.0, child_extent.x * 2.0)
            };
            max_x = max_x.max(f64::from(placement.x) / 100.0 + off_x);
            max_y = max_y.max(f64::from(placement.y) / 100.0 + off_y);
            max_z = max_z.max(f64::from(placement.z) / 100.0);
        }
    }

    visited.remove(&id);

    // Vertical origin sits at the object's base, so the Z center is zero.
    let center = Quad::new(max_x / 2.0, max_y / 2.0, 0.0, 0.0);
    let extent = Quad::new(max_x / 2.0, max_y / 2.0, max_z / 2.0, 0.0);
    catalog.update_geometry(id, center, extent)?;
    Ok((center, extent))
}

// ----------------------------------------------------------------------
// Placement
// ----------------------------------------------------------------------

/// Place an asset at a world-space pose, expanding composites into their
/// elementary parts.
pub fn place_asset(
    document: &mut SlabDocument,
    catalog: &mut Catalog,
    id: Uuid,
    x: f64,
    y: f64,
    z: f64,
    rot: u32,
) -> Result<(), ResolveError> {
    let mut visited = HashSet::new();
    place_with_visited(document, catalog, id, x, y, z, rot, &mut visited)
}

fn place_with_visited(
    document: &mut SlabDocument,
    catalog: &mut Catalog,
    id: Uuid,
    x: f64,
    y: f64,
    z: f64,
    rot: u32,
    visited: &mut HashSet<Uuid>,
) -> Result<(), ResolveError> {
    let record = catalog.lookup(id)?;
    if record.kind != AssetKind::Custom {
        document.place(id, PlacementInstance::from_world(x, y, z, rot));
        return Ok(());
    }
    let encoded = record
        .encoded
        .clone()
        .ok_or(ResolveError::MissingDocument(id))?;

    if !visited.insert(id) {
        return Err(ResolveError::CyclicComposite(id));
    }

    let embedded = codec::decode(&encoded)?;

    // Transform every part first: the whole composite is re-anchored to
    // the minimum corner of its rotated bounding box, so it does not drift
    // with rotation.
    let mut parts = Vec::new();
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for bucket in embedded.buckets() {
        for placement in &bucket.instances {
            let (nx, ny, nz, angle) = rotate_nested(placement, rot);
            min_x = min_x.min(nx);
            min_y = min_y.min(ny);
            parts.push((bucket.id, nx, ny, nz, angle));
        }
    }

    for (child, nx, ny, nz, angle) in parts {
        place_with_visited(
            document,
            catalog,
            child,
            nx - min_x + x,
            ny - min_y + y,
            nz + z,
            angle,
            visited,
        )?;
    }

    visited.remove(&id);
    Ok(())
}

/// Rotate one nested placement around the composite's origin. Only right
/// angles are supported, so the rotation matrix entries are cos/sin
/// rounded to integers; odd multiples of 90° additionally flip the child
/// angle by 180° to compensate for the left-handed placement frame.
fn rotate_nested(placement: &PlacementInstance, rot: u32) -> (f64, f64, f64, u32) {
    let radians = f64::from(rot).to_radians();
    let cos = radians.cos().round();
    let sin = radians.sin().round();

    let flip = if rot % 180 == 90 { 180 } else { 0 };
    let angle = flip + (rot + placement.rot) % 360;

    let x = f64::from(placement.x) / 100.0;
    let y = f64::from(placement.y) / 100.0;
    let z = f64::from(placement.z) / 100.0;

    (x * cos - y * sin, y * cos + x * sin, z, angle)
}

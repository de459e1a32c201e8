//! Slab document model
//!
//! The in-memory form of one encoded map payload: placements grouped into
//! per-asset buckets. Bucket order is insertion order and determines the
//! wire byte layout; the codec recomputes every count from the lists at
//! encode time, so the stored counts are bookkeeping, never trusted input.

use uuid::Uuid;

/// One placed instance, in centimeter units.
///
/// `rot` is degrees; the wire format stores `rot / 15` in an 8-bit field,
/// so only multiples of 15 below 3825 survive a round trip. The generator
/// itself only emits multiples of 90.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementInstance {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub rot: u32,
}

impl PlacementInstance {
    pub fn new(x: u32, y: u32, z: u32, rot: u32) -> Self {
        PlacementInstance { x, y, z, rot }
    }

    /// Convert world-space coordinates (in tile units) to the centimeter
    /// grid. Values are rounded to the nearest centimeter; nothing below
    /// zero is representable on the wire, so negatives clamp to zero.
    pub fn from_world(x: f64, y: f64, z: f64, rot: u32) -> Self {
        PlacementInstance {
            x: world_to_cm(x),
            y: world_to_cm(y),
            z: world_to_cm(z),
            rot,
        }
    }
}

fn world_to_cm(v: f64) -> u32 {
    (v * 100.0).round().max(0.0) as u32
}

/// All placements of one asset, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetBucket {
    pub id: Uuid,
    pub instance_count: u32,
    pub instances: Vec<PlacementInstance>,
}

impl AssetBucket {
    pub fn new(id: Uuid) -> Self {
        AssetBucket {
            id,
            instance_count: 0,
            instances: Vec::new(),
        }
    }

    pub fn with_instances(id: Uuid, instances: Vec<PlacementInstance>) -> Self {
        AssetBucket {
            id,
            instance_count: instances.len() as u32,
            instances,
        }
    }
}

/// A full placement document: buckets keyed by asset id, insertion-ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlabDocument {
    pub unique_asset_count: u32,
    asset_data: Vec<AssetBucket>,
}

impl SlabDocument {
    pub fn new() -> Self {
        SlabDocument::default()
    }

    pub fn buckets(&self) -> &[AssetBucket] {
        &self.asset_data
    }

    pub fn bucket(&self, id: Uuid) -> Option<&AssetBucket> {
        self.asset_data.iter().find(|b| b.id == id)
    }

    /// Append a complete bucket (decode path). The caller is responsible
    /// for not pushing a duplicate id.
    pub fn push_bucket(&mut self, bucket: AssetBucket) {
        self.asset_data.push(bucket);
        self.unique_asset_count = self.asset_data.len() as u32;
    }

    /// Record one placement, creating the asset's bucket on first use.
    pub fn place(&mut self, id: Uuid, instance: PlacementInstance) {
        match self.asset_data.iter_mut().find(|b| b.id == id) {
            Some(bucket) => {
                bucket.instances.push(instance);
                bucket.instance_count = bucket.instances.len() as u32;
            }
            None => {
                self.asset_data.push(AssetBucket::with_instances(id, vec![instance]));
                self.unique_asset_count = self.asset_data.len() as u32;
            }
        }
    }

    pub fn total_instances(&self) -> usize {
        self.asset_data.iter().map(|b| b.instances.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.asset_data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_place_groups_by_asset() {
        let mut doc = SlabDocument::new();
        doc.place(id(1), PlacementInstance::new(0, 0, 0, 0));
        doc.place(id(2), PlacementInstance::new(100, 0, 0, 0));
        doc.place(id(1), PlacementInstance::new(200, 0, 0, 90));

        assert_eq!(doc.unique_asset_count, 2);
        assert_eq!(doc.buckets()[0].id, id(1));
        assert_eq!(doc.buckets()[0].instance_count, 2);
        assert_eq!(doc.buckets()[1].id, id(2));
        assert_eq!(doc.bucket(id(1)).unwrap().instances[1].rot, 90);
    }

    #[test]
    fn test_from_world_rounds_to_centimeters() {
        let p = PlacementInstance::from_world(1.499, 2.0, 0.3333, 0);
        assert_eq!(p.x, 150);
        assert_eq!(p.y, 200);
        assert_eq!(p.z, 33);
    }

    #[test]
    fn test_from_world_clamps_negatives() {
        let p = PlacementInstance::from_world(-0.25, 0.0, 0.0, 0);
        assert_eq!(p.x, 0);
    }

    #[test]
    fn test_total_instances() {
        let mut doc = SlabDocument::new();
        for i in 0..5 {
            doc.place(id(1), PlacementInstance::new(i * 100, 0, 0, 0));
        }
        doc.place(id(9), PlacementInstance::new(0, 0, 0, 0));
        assert_eq!(doc.total_instances(), 6);
    }
}

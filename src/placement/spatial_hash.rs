//! Spatial hash for approximate-neighbor queries during scattering.
//!
//! One flat `HashMap` keyed by a packed `(cellX, cellY)` pair, each bucket
//! a small vector of placed points. Neighbor lookups walk a bounded ring of
//! buckets around the query cell.

use std::collections::HashMap;

/// A point accepted into a layer, with its required spacing radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedPoint {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl PlacedPoint {
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub struct SpatialHash {
    cell_size: f32,
    buckets: HashMap<u64, Vec<PlacedPoint>>,
    /// Largest radius inserted so far; bounds how far a query must look.
    max_radius: f32,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1e-3),
            buckets: HashMap::new(),
            max_radius: 0.0,
        }
    }

    fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    fn key(cx: i32, cy: i32) -> u64 {
        ((cx as u32 as u64) << 32) | cy as u32 as u64
    }

    pub fn insert(&mut self, point: PlacedPoint) {
        let (cx, cy) = self.cell_of(point.x, point.y);
        self.buckets.entry(Self::key(cx, cy)).or_default().push(point);
        if point.radius > self.max_radius {
            self.max_radius = point.radius;
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Whether a candidate with the given spacing radius keeps the pairwise
    /// spacing invariant: its distance to every existing point must be at
    /// least the larger of the two radii.
    ///
    /// The search ring covers the candidate's radius or the largest radius
    /// seen so far, whichever is wider, so no qualifying neighbor escapes.
    pub fn is_clear(&self, x: f32, y: f32, radius: f32) -> bool {
        let reach = radius.max(self.max_radius);
        let ring = (reach / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_of(x, y);

        for dy in -ring..=ring {
            for dx in -ring..=ring {
                let Some(bucket) = self.buckets.get(&Self::key(cx + dx, cy + dy)) else {
                    continue;
                };
                for point in bucket {
                    let required = radius.max(point.radius);
                    if point.distance_to(x, y) < required {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_count() {
        let mut hash = SpatialHash::new(4.0);
        assert!(hash.is_empty());
        hash.insert(PlacedPoint {
            x: 1.0,
            y: 1.0,
            radius: 2.0,
        });
        hash.insert(PlacedPoint {
            x: 9.0,
            y: 9.0,
            radius: 2.0,
        });
        assert_eq!(hash.len(), 2);
    }

    #[test]
    fn test_clearance_uses_larger_radius() {
        let mut hash = SpatialHash::new(4.0);
        hash.insert(PlacedPoint {
            x: 0.0,
            y: 0.0,
            radius: 5.0,
        });

        // Candidate radius 1 at distance 3: blocked by the neighbor's 5.
        assert!(!hash.is_clear(3.0, 0.0, 1.0));
        // At distance 6 it clears.
        assert!(hash.is_clear(6.0, 0.0, 1.0));
    }

    #[test]
    fn test_large_neighbor_found_across_buckets() {
        // Neighbor radius far exceeds the bucket size; the widened ring
        // must still find it.
        let mut hash = SpatialHash::new(2.0);
        hash.insert(PlacedPoint {
            x: 0.0,
            y: 0.0,
            radius: 10.0,
        });
        assert!(!hash.is_clear(8.0, 0.0, 1.0));
    }

    #[test]
    fn test_negative_coordinates() {
        let mut hash = SpatialHash::new(3.0);
        hash.insert(PlacedPoint {
            x: -5.0,
            y: -5.0,
            radius: 3.0,
        });
        assert!(!hash.is_clear(-4.0, -5.0, 3.0));
        assert!(hash.is_clear(5.0, 5.0, 3.0));
    }
}

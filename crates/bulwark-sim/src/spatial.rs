//! Hashed bucket grid for proximity queries.
//!
//! Only occupied cells are stored, so memory and rebuild cost follow the
//! number of entries rather than the size of the map. Queries return ids
//! sorted ascending so callers iterate in a reproducible order.

use std::collections::HashMap;

use bulwark_core::constants::DEFAULT_SPATIAL_CELL_SIZE;
use bulwark_core::types::{EntityId, Point};

type CellKey = (i64, i64);

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    buckets: HashMap<CellKey, Vec<(EntityId, Point)>>,
    positions: HashMap<EntityId, Point>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_SPATIAL_CELL_SIZE)
    }
}

impl SpatialIndex {
    /// Empty index with square cells of `cell_size`. A size that is not a
    /// positive finite number falls back to the default.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_SPATIAL_CELL_SIZE
        };
        Self {
            cell_size,
            buckets: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of cells currently holding at least one entry.
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.positions.clear();
    }

    /// Replace the contents with `entries`.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (EntityId, Point)>) {
        self.clear();
        for (id, position) in entries {
            self.insert(id, position);
        }
    }

    /// Insert or move `id`.
    pub fn insert(&mut self, id: EntityId, position: Point) {
        if self.positions.contains_key(&id) {
            self.remove(id);
        }
        let key = self.cell_key(position);
        self.buckets.entry(key).or_default().push((id, position));
        self.positions.insert(id, position);
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(position) = self.positions.remove(&id) else {
            return false;
        };
        let key = self.cell_key(position);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.retain(|(entry, _)| *entry != id);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        true
    }

    pub fn position_of(&self, id: EntityId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Every entry within `radius` of `center` (boundary inclusive).
    pub fn query_within_radius(&self, center: Point, radius: f64) -> Vec<EntityId> {
        let mut hits = Vec::new();
        self.visit_within(center, radius, |id, _| hits.push(id));
        hits.sort_unstable();
        hits
    }

    /// Entries within `radius` of entry `id`, excluding `id` itself. An id
    /// not in the index yields nothing.
    pub fn query_around(&self, id: EntityId, radius: f64) -> Vec<EntityId> {
        match self.position_of(id) {
            Some(center) => {
                let mut hits = self.query_within_radius(center, radius);
                hits.retain(|other| *other != id);
                hits
            }
            None => Vec::new(),
        }
    }

    /// Closest entry within `max_radius`, ties broken by lower id.
    pub fn nearest(&self, center: Point, max_radius: f64) -> Option<(EntityId, f64)> {
        let mut best: Option<(EntityId, f64)> = None;
        self.visit_within(center, max_radius, |id, d| {
            let better = match best {
                None => true,
                Some((best_id, best_d)) => d < best_d || (d == best_d && id < best_id),
            };
            if better {
                best = Some((id, d));
            }
        });
        best
    }

    fn visit_within(&self, center: Point, radius: f64, mut visit: impl FnMut(EntityId, f64)) {
        if !radius.is_finite() || radius < 0.0 || !center.is_finite() {
            return;
        }
        let (x0, y0) = self.cell_key(center - Point::splat(radius));
        let (x1, y1) = self.cell_key(center + Point::splat(radius));
        let mut check = |bucket: &Vec<(EntityId, Point)>| {
            for &(id, position) in bucket {
                let d = center.distance(position);
                if d <= radius {
                    visit(id, d);
                }
            }
        };

        // Walk the covered cells when that is cheaper than walking every
        // occupied bucket.
        let span_x = x1.abs_diff(x0).saturating_add(1);
        let span_y = y1.abs_diff(y0).saturating_add(1);
        if span_x.saturating_mul(span_y) <= self.buckets.len() as u64 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    if let Some(bucket) = self.buckets.get(&(x, y)) {
                        check(bucket);
                    }
                }
            }
        } else {
            for (&(x, y), bucket) in &self.buckets {
                if (x0..=x1).contains(&x) && (y0..=y1).contains(&y) {
                    check(bucket);
                }
            }
        }
    }

    fn cell_key(&self, point: Point) -> CellKey {
        // `as` saturates and maps NaN to 0.
        let x = (point.x / self.cell_size).floor() as i64;
        let y = (point.y / self.cell_size).floor() as i64;
        (x, y)
    }
}

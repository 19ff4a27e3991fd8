//! Uniform grid broad phase
//!
//! Entities are bucketed by the grid cells their boxes overlap, and only
//! entities sharing a bucket are paired up for the narrow phase. The grid is
//! rebuilt from scratch every frame; buckets are cleared rather than freed so
//! a steady-state frame allocates nothing.

use crate::ecs::Entity;
use crate::foundation::math::Aabb;
use std::collections::HashMap;

/// Cell edge length used when none is configured
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

const HASH_PRIME_X: i32 = 73_856_093;
const HASH_PRIME_Y: i32 = 19_349_663;

/// Exact half-open AABB overlap test on raw coordinates
///
/// Touching edges do not count; boxes without area never intersect.
#[allow(clippy::too_many_arguments)]
pub fn aabb_intersects(ax: f32, ay: f32, aw: f32, ah: f32, bx: f32, by: f32, bw: f32, bh: f32) -> bool {
    Aabb::new(ax, ay, aw, ah).intersects(&Aabb::new(bx, by, bw, bh))
}

/// Spatial hash over fixed-size square cells
#[derive(Debug)]
pub struct UniformGrid {
    cell_size: f32,
    buckets: HashMap<i32, Vec<Entity>>,
    pair_buffer: Vec<(Entity, Entity)>,
}

impl UniformGrid {
    /// Create a grid with square cells of `cell_size`
    ///
    /// # Panics
    ///
    /// Panics unless `cell_size` is positive and finite.
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "cell size must be positive, got {cell_size}"
        );
        Self {
            cell_size,
            buckets: HashMap::new(),
            pair_buffer: Vec::with_capacity(256),
        }
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Empty every bucket and the pair buffer, keeping their allocations
    pub fn clear(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        self.pair_buffer.clear();
    }

    /// Insert `entity` into every cell its box overlaps
    ///
    /// Boxes spanning several cells land in several buckets so pairs across
    /// cell borders are not missed. Boxes with negative extent cover no cell.
    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, w: f32, h: f32) {
        let min_cx = self.cell_coord(x);
        let min_cy = self.cell_coord(y);
        let max_cx = self.cell_coord(x + w);
        let max_cy = self.cell_coord(y + h);

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                self.buckets.entry(Self::hash(cx, cy)).or_default().push(entity);
            }
        }
    }

    /// Insert using a box
    pub fn insert_aabb(&mut self, entity: Entity, bounds: Aabb) {
        self.insert(entity, bounds.x, bounds.y, bounds.width, bounds.height);
    }

    /// Call `visit` with every pair of entities sharing a bucket
    ///
    /// Within a bucket each unordered pair is emitted once, in insertion
    /// order. Pairs are not deduplicated across buckets: two entities that
    /// share several cells are reported once per shared cell.
    pub fn for_each_potential_pair(&mut self, mut visit: impl FnMut(Entity, Entity)) {
        self.pair_buffer.clear();
        for bucket in self.buckets.values() {
            for (i, &a) in bucket.iter().enumerate() {
                for &b in &bucket[i + 1..] {
                    self.pair_buffer.push((a, b));
                }
            }
        }

        for &(a, b) in &self.pair_buffer {
            visit(a, b);
        }
    }

    /// Number of entity references across all buckets
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Number of buckets holding at least one entity
    pub fn occupied_buckets(&self) -> usize {
        self.buckets.values().filter(|bucket| !bucket.is_empty()).count()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_coord(&self, value: f32) -> i32 {
        (value / self.cell_size).floor() as i32
    }

    fn hash(cx: i32, cy: i32) -> i32 {
        cx.wrapping_mul(HASH_PRIME_X) ^ cy.wrapping_mul(HASH_PRIME_Y)
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

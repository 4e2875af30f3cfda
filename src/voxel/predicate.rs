//! Voxel occupancy predicates.
//!
//! A predicate is the only data source for octree construction: a pure,
//! total function from an integer lattice coordinate to "occupied". It must
//! be deterministic and must answer for any coordinate, including ones
//! outside the nominal world, since builders may sample regions that extend
//! past it.

use glam::IVec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Occupancy source for octree construction.
///
/// Implementations are called concurrently from the builder's worker
/// threads and must not hold shared mutable state.
pub trait VoxelPredicate: Send + Sync {
    /// Returns true if the unit cell at `pos` is occupied.
    fn occupied(&self, pos: IVec3) -> bool;
}

impl<F> VoxelPredicate for F
where
    F: Fn(IVec3) -> bool + Send + Sync,
{
    fn occupied(&self, pos: IVec3) -> bool {
        self(pos)
    }
}

/// Solid sphere, strict `distance² < radius²` test on cell corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sphere {
    pub center: IVec3,
    pub radius: i32,
}

impl Sphere {
    pub fn new(center: IVec3, radius: i32) -> Self {
        Self { center, radius }
    }

    /// Sphere of radius 15 centred at (15, 15, 15), filling a 32³ world.
    pub fn reference() -> Self {
        Self::new(IVec3::splat(15), 15)
    }
}

impl VoxelPredicate for Sphere {
    fn occupied(&self, pos: IVec3) -> bool {
        let dx = pos.x as i64 - self.center.x as i64;
        let dy = pos.y as i64 - self.center.y as i64;
        let dz = pos.z as i64 - self.center.z as i64;
        let r = self.radius as i64;
        dx * dx + dy * dy + dz * dz < r * r
    }
}

/// Sphere repeated on a cubic lattice with the given period.
///
/// Each tile holds one sphere centred at `(radius, radius, radius)` in
/// tile-local coordinates, so the pattern is defined for every coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TiledSpheres {
    period: i32,
    radius: i32,
}

impl TiledSpheres {
    /// Period must be positive
    pub fn new(period: i32, radius: i32) -> Self {
        assert!(period > 0, "TiledSpheres period must be positive");
        Self { period, radius }
    }

    pub fn period(&self) -> i32 {
        self.period
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }
}

impl VoxelPredicate for TiledSpheres {
    fn occupied(&self, pos: IVec3) -> bool {
        let local = IVec3::new(
            pos.x.rem_euclid(self.period),
            pos.y.rem_euclid(self.period),
            pos.z.rem_euclid(self.period),
        );
        Sphere::new(IVec3::splat(self.radius), self.radius).occupied(local)
    }
}

/// 3D checkerboard: a cell is occupied when `x + y + z` is even.
///
/// Every region larger than one cell is mixed, which forces the builder all
/// the way down to unit leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkerboard;

impl VoxelPredicate for Checkerboard {
    fn occupied(&self, pos: IVec3) -> bool {
        pos.x.wrapping_add(pos.y).wrapping_add(pos.z).rem_euclid(2) == 0
    }
}

/// Constant predicate, useful for fully empty or fully solid worlds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Uniform(pub bool);

impl VoxelPredicate for Uniform {
    fn occupied(&self, _pos: IVec3) -> bool {
        self.0
    }
}

/// Noise height field: cells below the surface at `(x, z)` are occupied.
pub struct Terrain {
    noise: Fbm<Perlin>,
    scale: f32,
    height: f32,
}

impl Terrain {
    /// `scale` is the horizontal feature size, `height` the maximum surface height.
    pub fn new(seed: u32, scale: f32, height: f32) -> Self {
        let noise = Fbm::<Perlin>::new(seed)
            .set_octaves(4)
            .set_persistence(0.5)
            .set_lacunarity(2.0);

        Self { noise, scale, height }
    }

    /// Surface height at lattice column (x, z)
    pub fn height_at(&self, x: i32, z: i32) -> f32 {
        let nx = (x as f32 / self.scale) as f64;
        let nz = (z as f32 / self.scale) as f64;

        // Noise is in [-1, 1]; map to [0, height]
        let normalized = (self.noise.get([nx, nz]) + 1.0) / 2.0;
        (normalized * self.height as f64) as f32
    }
}

impl VoxelPredicate for Terrain {
    fn occupied(&self, pos: IVec3) -> bool {
        (pos.y as f32) < self.height_at(pos.x, pos.z)
    }
}

/// Materialized occupancy grid of edge `size`, x varying fastest.
///
/// Coordinates outside the grid are empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseGrid {
    size: u32,
    cells: Vec<bool>,
}

impl DenseGrid {
    /// Create an empty grid
    pub fn new(size: u32) -> Self {
        let len = size as usize * size as usize * size as usize;
        Self { size, cells: vec![false; len] }
    }

    /// Sample `predicate` over every cell of `[0, size)³`
    pub fn from_predicate<P: VoxelPredicate + ?Sized>(size: u32, predicate: &P) -> Self {
        let mut grid = Self::new(size);
        let s = size as i32;
        for z in 0..s {
            for y in 0..s {
                for x in 0..s {
                    if predicate.occupied(IVec3::new(x, y, z)) {
                        grid.set(IVec3::new(x, y, z), true);
                    }
                }
            }
        }
        grid
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Set a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: IVec3, occupied: bool) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = occupied;
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn index(&self, pos: IVec3) -> Option<usize> {
        let s = self.size as i64;
        let (x, y, z) = (pos.x as i64, pos.y as i64, pos.z as i64);
        if x < 0 || y < 0 || z < 0 || x >= s || y >= s || z >= s {
            return None;
        }
        Some((x + y * s + z * s * s) as usize)
    }
}

impl VoxelPredicate for DenseGrid {
    fn occupied(&self, pos: IVec3) -> bool {
        self.index(pos).is_some_and(|idx| self.cells[idx])
    }
}

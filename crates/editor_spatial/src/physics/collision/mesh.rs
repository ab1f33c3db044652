//! Static collision mesh
//!
//! Accumulates world-space triangles (terrain, collision hulls) and answers
//! nearest-hit ray casts against them, accelerated by a [`SpatialGrid`].
//!
//! Every mutation marks the grid cache dirty. The `&mut self` query entry
//! points rebuild it before searching; the `&self` ones refuse to read a
//! stale cache, so a mesh shared between readers must be rebuilt first.

use thiserror::Error;

use crate::config::{GridConfig, RayCastConfig};
use crate::foundation::math::{constants::WORLD_UP, Mat4, Point3, Vec3};
use crate::scene::AABB;

use super::grid::{CellCoord, SpatialGrid};
use super::primitives::{Ray, Triangle};

/// Collision mesh errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    /// A read-only query was issued while triangles were added after the last rebuild
    #[error("Collision grid is stale; call update_cache() before read-only queries")]
    StaleGrid,

    /// An index buffer referenced a vertex that does not exist
    #[error("Vertex index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index
        index: u32,
        /// Number of vertices supplied
        vertex_count: usize,
    },

    /// The index buffer length is not a multiple of three
    #[error("Index buffer length {0} is not a multiple of 3")]
    IncompleteFace(usize),
}

/// Per-query ray cast settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastOptions {
    /// Determinant threshold for the triangle test
    pub epsilon: f32,
    /// Skip near-vertical faces
    pub ignore_walls: bool,
    /// Grid step cap before the exhaustive fallback
    pub max_steps: usize,
}

impl RayCastOptions {
    /// Options with walls ignored, for ground snapping
    #[must_use]
    pub fn ignoring_walls(mut self) -> Self {
        self.ignore_walls = true;
        self
    }
}

impl From<&RayCastConfig> for RayCastOptions {
    fn from(config: &RayCastConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            ignore_walls: config.ignore_walls,
            max_steps: config.max_steps,
        }
    }
}

impl Default for RayCastOptions {
    fn default() -> Self {
        Self::from(&RayCastConfig::default())
    }
}

/// Nearest intersection of a ray with the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Unit normal of the hit triangle
    pub normal: Vec3,
    /// Index of the hit triangle in insertion order
    pub triangle: usize,
}

/// Triangle soup with a lazily rebuilt spatial grid
#[derive(Debug, Clone)]
pub struct CollisionMesh {
    triangles: Vec<Triangle>,
    bounds: Option<AABB>,
    grid: Option<SpatialGrid>,
    dirty: bool,
    grid_config: GridConfig,
    ray_config: RayCastConfig,
}

impl Default for CollisionMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionMesh {
    /// Empty mesh with default grid and ray settings
    pub fn new() -> Self {
        Self::with_config(GridConfig::default(), RayCastConfig::default())
    }

    /// Empty mesh with explicit settings
    pub fn with_config(grid_config: GridConfig, ray_config: RayCastConfig) -> Self {
        Self {
            triangles: Vec::new(),
            bounds: None,
            grid: None,
            dirty: false,
            grid_config,
            ray_config,
        }
    }

    /// Append a world-space triangle
    ///
    /// Grows the mesh bounds and marks the grid cache dirty.
    pub fn add_triangle(&mut self, v1: Vec3, v2: Vec3, v3: Vec3) {
        let triangle = Triangle::new(v1, v2, v3);
        if triangle.is_degenerate() {
            log::warn!("Degenerate collision triangle {v1:?} {v2:?} {v3:?} will never be hit");
        }

        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.merged(&triangle.bounds),
            None => triangle.bounds,
        });
        self.triangles.push(triangle);
        self.dirty = true;
    }

    /// Append an indexed triangle list already in world space
    pub fn add_indexed(&mut self, vertices: &[Vec3], indices: &[u32]) -> Result<(), CollisionError> {
        self.add_indexed_transformed(vertices, indices, &Mat4::identity())
    }

    /// Append an indexed triangle list in model space, placed by `model`
    ///
    /// The index buffer is validated before any triangle is added, so a bad
    /// buffer leaves the mesh untouched.
    pub fn add_indexed_transformed(
        &mut self,
        vertices: &[Vec3],
        indices: &[u32],
        model: &Mat4,
    ) -> Result<(), CollisionError> {
        if indices.len() % 3 != 0 {
            return Err(CollisionError::IncompleteFace(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(CollisionError::IndexOutOfRange { index, vertex_count: vertices.len() });
        }

        let world: Vec<Vec3> = vertices
            .iter()
            .map(|v| model.transform_point(&Point3::from(*v)).coords)
            .collect();

        for face in indices.chunks_exact(3) {
            self.add_triangle(
                world[face[0] as usize],
                world[face[1] as usize],
                world[face[2] as usize],
            );
        }
        log::debug!("Imported {} collision triangles", indices.len() / 3);
        Ok(())
    }

    /// Drop all triangles and the cache
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.bounds = None;
        self.grid = None;
        self.dirty = false;
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles in insertion order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// World box around every triangle, `None` while empty
    pub fn bounds(&self) -> Option<&AABB> {
        self.bounds.as_ref()
    }

    /// Whether triangles were added since the grid was last built
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The current grid, if built
    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    /// Ray settings used by [`ray_cast`](Self::ray_cast)
    pub fn default_options(&self) -> RayCastOptions {
        RayCastOptions::from(&self.ray_config)
    }

    /// Rebuild the spatial grid with the mesh's grid settings
    pub fn update_cache(&mut self) {
        let grid_config = self.grid_config.clone();
        self.build_grid(&grid_config);
    }

    /// Rebuild the spatial grid with explicit division counts
    pub fn build_grid(&mut self, config: &GridConfig) {
        let grid = match self.bounds {
            Some(bounds) => SpatialGrid::build(&self.triangles, bounds, config),
            None => SpatialGrid::empty(config),
        };
        self.grid = Some(grid);
        self.dirty = false;
    }

    /// Nearest hit, rebuilding the grid first if needed
    pub fn ray_cast(&mut self, ray: &Ray) -> Option<RayCastHit> {
        let options = self.default_options();
        self.ray_cast_with(ray, &options)
    }

    /// Nearest hit with explicit options, rebuilding the grid first if needed
    pub fn ray_cast_with(&mut self, ray: &Ray, options: &RayCastOptions) -> Option<RayCastHit> {
        if self.triangles.is_empty() {
            return None;
        }
        if self.dirty || self.grid.is_none() {
            self.update_cache();
        }
        self.search(ray, options)
    }

    /// Nearest hit without touching the cache
    ///
    /// Fails with [`CollisionError::StaleGrid`] when the grid needs a rebuild.
    pub fn try_ray_cast(&self, ray: &Ray, options: &RayCastOptions) -> Result<Option<RayCastHit>, CollisionError> {
        if self.triangles.is_empty() {
            return Ok(None);
        }
        if self.dirty || self.grid.is_none() {
            return Err(CollisionError::StaleGrid);
        }
        Ok(self.search(ray, options))
    }

    /// Nearest hit by testing every triangle
    pub fn ray_cast_exhaustive(&self, ray: &Ray, options: &RayCastOptions) -> Option<RayCastHit> {
        self.nearest_of(ray, options, 0..self.triangles.len())
    }

    /// Drop `position` straight down onto non-wall geometry
    ///
    /// Casts from `position` along `-WORLD_UP` and returns the hit point when
    /// it lies within `max_drop`.
    pub fn snap_to_ground(&mut self, position: Vec3, max_drop: f32) -> Option<Vec3> {
        let options = self.default_options().ignoring_walls();
        let ray = Ray::new(position, -WORLD_UP);
        self.ray_cast_with(&ray, &options)
            .filter(|hit| hit.distance <= max_drop)
            .map(|hit| hit.point)
    }

    fn search(&self, ray: &Ray, options: &RayCastOptions) -> Option<RayCastHit> {
        if !ray.is_valid() {
            return None;
        }
        self.stepped_search(ray, options).or_else(|| {
            log::trace!("Grid search inconclusive, scanning all {} triangles", self.triangles.len());
            self.ray_cast_exhaustive(ray, options)
        })
    }

    /// Walk the grid along the ray in steps of a fraction of the smallest cell
    ///
    /// Whenever the sample enters a new cell, that cell's triangles are
    /// tested. The nearest hit so far is returned once it lies within half
    /// a step of the current sample; anything nearer would have been binned
    /// into a cell already visited. `None` means the walk was inconclusive.
    fn stepped_search(&self, ray: &Ray, options: &RayCastOptions) -> Option<RayCastHit> {
        let grid = self.grid.as_ref()?;
        let step = grid.min_cell_extent()? * self.ray_config.step_fraction;
        let half_step = step * 0.5;

        let span = grid.bounds().expanded(grid.padding()).intersect_ray(ray.origin, ray.direction)?;
        let start = span.t_near.max(0.0);

        let mut best: Option<RayCastHit> = None;
        let mut last_cell: Option<CellCoord> = None;

        for i in 0..options.max_steps {
            let t = start + step * i as f32;
            if t > span.t_far {
                break;
            }

            let cell = grid.cell_coord(ray.point_at(t));
            if last_cell != Some(cell) {
                last_cell = Some(cell);
                let candidates = grid.triangles_in(cell).iter().map(|&i| i as usize);
                if let Some(hit) = self.nearest_of(ray, options, candidates) {
                    if best.map_or(true, |b| hit.distance < b.distance) {
                        best = Some(hit);
                    }
                }
            }

            if let Some(hit) = best.filter(|b| b.distance <= t + half_step) {
                log::trace!("Grid hit triangle {} at {:.4} after {} steps", hit.triangle, hit.distance, i + 1);
                return Some(hit);
            }
        }

        None
    }

    /// Nearest accepted hit among `candidates`; first found wins ties
    fn nearest_of(
        &self,
        ray: &Ray,
        options: &RayCastOptions,
        candidates: impl Iterator<Item = usize>,
    ) -> Option<RayCastHit> {
        let mut best: Option<RayCastHit> = None;

        for index in candidates {
            let triangle = &self.triangles[index];
            if options.ignore_walls && triangle.is_wall(&WORLD_UP, self.ray_config.wall_cos_threshold) {
                continue;
            }
            let Some(hit) = triangle.intersect_ray(ray, options.epsilon) else {
                continue;
            };
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(RayCastHit {
                    distance: hit.distance,
                    point: ray.point_at(hit.distance),
                    normal: triangle.normal,
                    triangle: index,
                });
            }
        }

        best
    }
}

//! Uniform spatial grid over a collision mesh
//!
//! Partitions the mesh's world box into `X x Y x Z` equal cells. Each cell
//! lists every triangle whose padded bounding box overlaps it, so a triangle
//! can sit in several cells and a ray sample inside a cell never misses a
//! triangle straddling the cell boundary.

use crate::config::GridConfig;
use crate::foundation::math::Vec3;
use crate::scene::AABB;

use super::primitives::Triangle;

/// Integer cell coordinates
pub type CellCoord = [usize; 3];

/// Uniform grid of triangle index lists
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    bounds: AABB,
    divisions: [usize; 3],
    cell_size: Vec3,
    padding: f32,
    cells: Vec<Vec<u32>>,
}

impl SpatialGrid {
    /// Bin `triangles` into a grid spanning `bounds`
    ///
    /// Cell edges are `(max - min) / divisions` per axis. A flat axis (zero
    /// span) collapses to a single layer of cells. The padding used for
    /// binning is the configured padding, raised to half the smallest cell
    /// extent so that a ray sample always lands in a cell listing every
    /// triangle within half a ray step of it.
    pub fn build(triangles: &[Triangle], bounds: AABB, config: &GridConfig) -> Self {
        let divisions = config.divisions.map(|d| d.max(1));
        let span = bounds.size();
        let cell_size = Vec3::new(
            span.x / divisions[0] as f32,
            span.y / divisions[1] as f32,
            span.z / divisions[2] as f32,
        );
        debug_assert!(
            (0..3).all(|axis| span[axis] <= 0.0 || cell_size[axis] > 0.0),
            "non-degenerate span {span:?} produced an empty cell extent {cell_size:?}"
        );

        let min_extent = smallest_positive(&cell_size);
        let padding = min_extent.map_or(config.cell_padding, |e| config.cell_padding.max(0.5 * e));

        let mut grid = Self {
            bounds,
            divisions,
            cell_size,
            padding,
            cells: vec![Vec::new(); divisions[0] * divisions[1] * divisions[2]],
        };

        for (index, triangle) in triangles.iter().enumerate() {
            let padded = triangle.bounds.expanded(padding);
            let lo = grid.cell_coord(padded.min);
            let hi = grid.cell_coord(padded.max);
            for z in lo[2]..=hi[2] {
                for y in lo[1]..=hi[1] {
                    for x in lo[0]..=hi[0] {
                        let cell = grid.flat_index([x, y, z]);
                        grid.cells[cell].push(index as u32);
                    }
                }
            }
        }

        log::debug!(
            "Built {}x{}x{} collision grid over {} triangles (cell {:?}, padding {:.3})",
            divisions[0],
            divisions[1],
            divisions[2],
            triangles.len(),
            cell_size,
            padding
        );

        grid
    }

    /// An empty grid, used for meshes without triangles
    pub fn empty(config: &GridConfig) -> Self {
        Self::build(&[], AABB::new(Vec3::zeros(), Vec3::zeros()), config)
    }

    /// World box covered by the grid
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Cell counts per axis
    pub fn divisions(&self) -> [usize; 3] {
        self.divisions
    }

    /// Edge lengths of one cell
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Padding actually applied when binning
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Smallest non-zero cell extent, `None` when every axis is flat
    pub fn min_cell_extent(&self) -> Option<f32> {
        smallest_positive(&self.cell_size)
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell lists any triangle
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    /// Cell containing `point`, clamped onto the grid
    pub fn cell_coord(&self, point: Vec3) -> CellCoord {
        std::array::from_fn(|axis| {
            let size = self.cell_size[axis];
            if size <= 0.0 {
                return 0;
            }
            let offset = (point[axis] - self.bounds.min[axis]) / size;
            // NaN and negative offsets saturate to 0
            (offset.floor().max(0.0) as usize).min(self.divisions[axis] - 1)
        })
    }

    /// Row-major index of a cell
    pub fn flat_index(&self, coord: CellCoord) -> usize {
        (coord[2] * self.divisions[1] + coord[1]) * self.divisions[0] + coord[0]
    }

    /// Box of one cell
    pub fn cell_bounds(&self, coord: CellCoord) -> AABB {
        let offset = Vec3::new(coord[0] as f32, coord[1] as f32, coord[2] as f32);
        let min = self.bounds.min + self.cell_size.component_mul(&offset);
        AABB::new(min, min + self.cell_size)
    }

    /// Triangle indices binned into a cell
    pub fn triangles_in(&self, coord: CellCoord) -> &[u32] {
        &self.cells[self.flat_index(coord)]
    }
}

fn smallest_positive(v: &Vec3) -> Option<f32> {
    v.iter().copied().filter(|e| *e > 0.0).reduce(f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn strip(count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|i| {
                let x = i as f32 * 10.0;
                Triangle::new(
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x, 0.0, 1.0),
                    Vec3::new(x + 1.0, 0.0, 0.0),
                )
            })
            .collect()
    }

    fn bounds_of(triangles: &[Triangle]) -> AABB {
        triangles
            .iter()
            .map(|t| t.bounds)
            .reduce(|a, b| a.merged(&b))
            .unwrap()
    }

    #[test]
    fn test_cell_extent_uses_true_span() {
        let triangles = strip(10);
        let bounds = bounds_of(&triangles);
        let grid = SpatialGrid::build(&triangles, bounds, &GridConfig::default());

        assert_relative_eq!(grid.cell_size().x, 9.1, epsilon = 1e-5);
        assert_relative_eq!(grid.cell_size().z, 0.1, epsilon = 1e-5);
        // Flat along Y
        assert_eq!(grid.cell_size().y, 0.0);
        assert_eq!(grid.cell_coord(Vec3::new(50.0, 3.0, 0.5))[1], 0);
    }

    #[test]
    fn test_every_triangle_binned_where_its_box_is() {
        let triangles = strip(10);
        let bounds = bounds_of(&triangles);
        let grid = SpatialGrid::build(&triangles, bounds, &GridConfig::default());

        for (index, tri) in triangles.iter().enumerate() {
            for vertex in tri.vertices() {
                let cell = grid.cell_coord(vertex);
                assert!(grid.triangles_in(cell).contains(&(index as u32)));
            }
        }
    }

    #[test]
    fn test_padding_reaches_neighbour_cells() {
        let triangles = vec![Triangle::new(
            Vec3::new(4.9, 0.0, 0.0),
            Vec3::new(4.95, 0.0, 1.0),
            Vec3::new(5.0, 0.0, 0.0),
        ), Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 0.0, 0.0),
        )];
        let config = GridConfig { divisions: [10, 1, 1], cell_padding: 1.0 };
        let grid = SpatialGrid::build(&triangles, bounds_of(&triangles), &config);

        // Triangle 0 spans x in [3.9, 6.0] once padded
        for x in 3..=6 {
            assert!(grid.triangles_in([x, 0, 0]).contains(&0), "missing from cell {x}");
        }
        assert!(!grid.triangles_in([2, 0, 0]).contains(&0));
        assert!(!grid.triangles_in([7, 0, 0]).contains(&0));
    }

    #[test]
    fn test_cell_bounds_tile_the_grid() {
        let triangles = strip(4);
        let bounds = bounds_of(&triangles);
        let grid = SpatialGrid::build(&triangles, bounds, &GridConfig::default());
        let last = grid.cell_bounds([9, 9, 9]);
        assert_relative_eq!(last.max, bounds.max, epsilon = 1e-4);
        assert_relative_eq!(grid.cell_bounds([0, 0, 0]).min, bounds.min, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_grid() {
        let grid = SpatialGrid::empty(&GridConfig::default());
        assert!(grid.is_empty());
        assert_eq!(grid.min_cell_extent(), None);
        assert_eq!(grid.cell_count(), 1000);
    }
}

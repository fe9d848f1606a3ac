use super::TerrainError;

/// Row-major planar lattice coordinates for an N x N grid spanning
/// `map_size` units. The single code path producing vertex positions:
/// [`GridTopology::build`] stores them and
/// [`HeightField`](super::HeightField) measures circle distances against its
/// own copy, so the two can never drift apart.
pub(crate) fn planar_coordinates(side_count: usize, map_size: f32) -> (Vec<f32>, Vec<f32>) {
    let step = map_size / (side_count - 1) as f32;
    let total = side_count * side_count;
    let mut xs = Vec::with_capacity(total);
    let mut zs = Vec::with_capacity(total);
    for i in 0..side_count {
        for j in 0..side_count {
            xs.push(i as f32 * step);
            zs.push(j as f32 * step);
        }
    }
    (xs, zs)
}

/// Static geometry of an N x N planar grid: vertex positions as three flat
/// parallel arrays plus the line index list for wireframe rendering.
///
/// Positions are row-major, vertex `k = i * side_count + j` sits at
/// `(i * step, 0, j * step)`. Coordinates and indices never change after
/// construction; only the height channel owned by
/// [`HeightField`](super::HeightField) is mutated at runtime.
#[derive(Debug, Clone)]
pub struct GridTopology {
    pub side_count: usize,
    /// X coordinate per vertex, fixed at build time
    pub xs: Vec<f32>,
    /// Initial height per vertex, all zero
    pub ys: Vec<f32>,
    /// Z coordinate per vertex, fixed at build time
    pub zs: Vec<f32>,
    /// Vertex index pairs, one pair per rendered line segment
    pub line_indices: Vec<u32>,
}

impl GridTopology {
    /// Build the grid for `side_count` vertices per side spanning `map_size`
    /// world units. Pure and deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidDimension`] if `side_count < 2` and
    /// [`TerrainError::InvalidMapSize`] if `map_size` is not positive.
    pub fn build(side_count: usize, map_size: f32) -> Result<Self, TerrainError> {
        if side_count < 2 {
            return Err(TerrainError::InvalidDimension(side_count));
        }
        if map_size <= 0.0 {
            return Err(TerrainError::InvalidMapSize(map_size));
        }

        let n = side_count;
        let total = n * n;
        let (xs, zs) = planar_coordinates(n, map_size);

        let mut line_indices = Vec::with_capacity(2 * Self::line_count_for(n));

        // Close the last column: one edge per row pair.
        for i in 0..n - 1 {
            line_indices.push(((i + 1) * n - 1) as u32);
            line_indices.push(((i + 2) * n - 1) as u32);
        }
        // Close the last row.
        for i in 0..n - 1 {
            line_indices.push(((n - 1) * n + i) as u32);
            line_indices.push(((n - 1) * n + i + 1) as u32);
        }
        // Interior cells: right, down, diagonal edges fanning from each corner.
        for i in 0..n - 1 {
            for j in 0..n - 1 {
                let corner = (i * n + j) as u32;
                line_indices.push(corner);
                line_indices.push(corner + 1);

                line_indices.push(corner);
                line_indices.push(corner + n as u32);

                line_indices.push(corner);
                line_indices.push(corner + n as u32 + 1);
            }
        }

        Ok(Self {
            side_count,
            xs,
            ys: vec![0.0; total],
            zs,
            line_indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.side_count * self.side_count
    }

    /// Number of line segments in the wireframe.
    pub fn line_count(&self) -> usize {
        self.line_indices.len() / 2
    }

    /// Expected segment count for a given side length:
    /// three per interior cell plus one closing edge per last row/column pair.
    pub fn line_count_for(side_count: usize) -> usize {
        let n = side_count;
        3 * (n - 1) * (n - 1) + 2 * (n - 1)
    }

    /// Physical extent of the grid along one axis.
    pub fn extent(&self) -> f32 {
        self.xs.last().copied().unwrap_or(0.0)
    }
}

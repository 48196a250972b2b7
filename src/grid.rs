use crate::frame::GridFrame;
use crate::layer::SparseLayer;

/// Fully populated raster, row-major, row 0 northernmost.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f32>,
}

impl DenseGrid {
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.values[row * self.cols + col])
    }

    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.cols;
        &self.values[start..start + self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks(self.cols.max(1))
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Expands a sparse layer onto the full frame.
///
/// Walks every index in `[0, cell_count)` and looks it up in the layer, so
/// each cell is written exactly once and keys beyond the frame are never
/// visited.
pub fn rasterize(frame: &GridFrame, layer: &SparseLayer, no_data: f32) -> DenseGrid {
    let mut grid = DenseGrid::filled(frame.rows, frame.cols, no_data);

    // Row-major storage makes the linear cell index the buffer offset.
    for (index, cell) in grid.values.iter_mut().enumerate() {
        if let Some(value) = layer.get(index as u64) {
            *cell = value as f32;
        }
    }

    grid
}

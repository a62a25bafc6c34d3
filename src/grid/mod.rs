//! Grid addressing.
//!
//! Projects an N-rank array onto a 2-D grid. The two trailing dimensions are
//! rows and columns; every dimension before them is a layer dimension with
//! its own current index. Layer indices form a mixed-radix number over the
//! leading extents, so for dims `[d0, .., dk-1, rows, cols]` cell `(r, c)` is
//! element `O * rows * cols + r * cols + c` with `O = Σ L[i] * Π_{j>i} d[j]`.

mod decode;

pub use decode::{decode_cell, format_general, CellValue, UNSUPPORTED_MARKER};

use crate::data::Dataset;

/// Rows and columns of the grid for an array with extents `dims`.
///
/// A scalar is a single cell and a vector is one column.
pub fn grid_shape(dims: &[usize]) -> (usize, usize) {
    match dims {
        [] => (1, 1),
        [n] => (*n, 1),
        [.., rows, cols] => (*rows, *cols),
    }
}

/// Current layer selection over one dataset's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    dims: Vec<usize>,
    layers: Vec<usize>,
    revision: u64,
}

impl GridView {
    /// Start at layer 0 in every leading dimension.
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
            layers: vec![0; dims.len().saturating_sub(2)],
            revision: 0,
        }
    }

    /// Grid view over a dataset's current shape.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self::new(&dataset.dims)
    }

    /// Extents this view addresses.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// `(rows, cols)` of the grid.
    pub fn shape(&self) -> (usize, usize) {
        grid_shape(&self.dims)
    }

    /// Number of layer dimensions.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Extent of layer dimension `dim`.
    pub fn layer_extent(&self, dim: usize) -> Option<usize> {
        if dim < self.layers.len() {
            self.dims.get(dim).copied()
        } else {
            None
        }
    }

    /// Current index of layer dimension `dim`.
    pub fn layer(&self, dim: usize) -> Option<usize> {
        self.layers.get(dim).copied()
    }

    /// Current index of every layer dimension.
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    /// Incremented whenever a layer index changes. Anything materialized for
    /// an older revision is stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Flat index of the first element of the current layer, counted in layers.
    pub fn layer_offset(&self) -> Option<usize> {
        self.layers
            .iter()
            .zip(&self.dims)
            .try_fold(0usize, |offset, (&index, &extent)| {
                if index >= extent {
                    return None;
                }
                offset.checked_mul(extent)?.checked_add(index)
            })
    }

    /// Flat element index of cell `(row, col)` in the current layer, or `None`
    /// if the cell lies outside the grid.
    pub fn flat_index(&self, row: usize, col: usize) -> Option<usize> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return None;
        }
        self.layer_offset()?
            .checked_mul(rows)?
            .checked_mul(cols)?
            .checked_add(row * cols + col)
    }

    /// Move layer dimension `dim` one step forward, stopping at the last index.
    pub fn advance(&mut self, dim: usize) {
        if let Some(index) = self.layer(dim) {
            self.set_layer(dim, index.saturating_add(1));
        }
    }

    /// Move layer dimension `dim` one step back, stopping at 0.
    pub fn retreat(&mut self, dim: usize) {
        if let Some(index) = self.layer(dim) {
            self.set_layer(dim, index.saturating_sub(1));
        }
    }

    /// Select `index` in layer dimension `dim`, clamped to its extent.
    pub fn set_layer(&mut self, dim: usize, index: usize) {
        let Some(extent) = self.layer_extent(dim) else {
            return;
        };
        let clamped = index.min(extent.saturating_sub(1));
        if self.layers[dim] != clamped {
            self.layers[dim] = clamped;
            self.revision += 1;
        }
    }

    /// Value of cell `(row, col)` of `dataset` in the current layer.
    ///
    /// Non-numeric classes are reported as unsupported whether or not the
    /// buffer is loaded; a missing buffer or cell reads as empty.
    pub fn cell(&self, dataset: &Dataset, row: usize, col: usize) -> CellValue {
        if !dataset.is_numeric() {
            return CellValue::Unsupported(dataset.datatype_class());
        }
        let Some(buffer) = dataset.buffer() else {
            return CellValue::Empty;
        };
        match self.flat_index(row, col) {
            Some(index) => decode_cell(buffer, index, &dataset.datatype),
            None => CellValue::Empty,
        }
    }

    /// Canonical text of cell `(row, col)`.
    pub fn cell_text(&self, dataset: &Dataset, row: usize, col: usize) -> String {
        self.cell(dataset, row, col).to_string()
    }

    /// Text of a rectangular window of the current layer, clipped to the grid.
    pub fn materialize(
        &self,
        dataset: &Dataset,
        first_row: usize,
        row_count: usize,
        first_col: usize,
        col_count: usize,
    ) -> Vec<Vec<String>> {
        let (rows, cols) = self.shape();
        let last_row = first_row.saturating_add(row_count).min(rows);
        let last_col = first_col.saturating_add(col_count).min(cols);
        (first_row..last_row)
            .map(|r| {
                (first_col..last_col)
                    .map(|c| self.cell_text(dataset, r, c))
                    .collect()
            })
            .collect()
    }
}

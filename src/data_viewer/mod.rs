//! Grid viewer feature - layered table view of one dataset or attribute.
//!
//! Holds the [`GridView`] layer selection, scrolling, and the rows
//! materialized for the current window. The rows are rebuilt whenever the
//! view's revision or the window moves.

pub mod ui;

use crate::data::Dataset;
use crate::explorer::NodeLocation;
use crate::grid::GridView;

/// Scroll position for the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    /// Current row offset.
    pub row: usize,
    /// Current column offset.
    pub col: usize,
}

#[derive(Debug, Clone)]
struct RowCache {
    revision: u64,
    scroll: ScrollPosition,
    window: (usize, usize),
    rows: Vec<Vec<String>>,
}

/// State for the grid viewer.
#[derive(Debug, Clone, Default)]
pub struct GridViewerState {
    /// Node being viewed.
    pub location: Option<NodeLocation>,
    /// Title shown on the viewer border.
    pub title: String,
    /// Layer selection over the node's shape.
    pub view: Option<GridView>,
    /// Scroll offset for the table.
    pub scroll: ScrollPosition,
    /// Layer dimension moved by advance/retreat.
    pub active_layer: Option<usize>,
    /// Is the grid viewer visible.
    pub visible: bool,
    /// Error message if loading failed.
    pub error: Option<String>,
    /// Layer number typed so far, counting from 1.
    pub pending_count: Option<usize>,
    cache: Option<RowCache>,
}

impl GridViewerState {
    /// Create a hidden viewer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `dataset`, starting at layer 0 everywhere.
    pub fn open(&mut self, location: NodeLocation, title: String, dataset: &Dataset) {
        let view = GridView::for_dataset(dataset);
        self.active_layer = (view.layer_count() > 0).then_some(0);
        self.view = Some(view);
        self.location = Some(location);
        self.title = title;
        self.scroll = ScrollPosition::default();
        self.error = None;
        self.pending_count = None;
        self.cache = None;
        self.visible = true;
    }

    /// Show an error instead of a grid.
    pub fn set_error(&mut self, title: String, error: String) {
        self.title = title;
        self.error = Some(error);
        self.view = None;
        self.location = None;
        self.cache = None;
        self.visible = true;
    }

    /// Close the viewer.
    pub fn close(&mut self) {
        self.visible = false;
        self.view = None;
        self.location = None;
        self.error = None;
        self.pending_count = None;
        self.cache = None;
    }

    fn shape(&self) -> (usize, usize) {
        self.view.as_ref().map(GridView::shape).unwrap_or((0, 0))
    }

    /// Scroll up.
    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll.row = self.scroll.row.saturating_sub(amount);
    }

    /// Scroll down.
    pub fn scroll_down(&mut self, amount: usize) {
        let max_row = self.shape().0.saturating_sub(1);
        self.scroll.row = (self.scroll.row + amount).min(max_row);
    }

    /// Scroll left.
    pub fn scroll_left(&mut self, amount: usize) {
        self.scroll.col = self.scroll.col.saturating_sub(amount);
    }

    /// Scroll right.
    pub fn scroll_right(&mut self, amount: usize) {
        let max_col = self.shape().1.saturating_sub(1);
        self.scroll.col = (self.scroll.col + amount).min(max_col);
    }

    /// Select the next layer dimension, wrapping around.
    pub fn next_layer_dim(&mut self) {
        let count = self.view.as_ref().map_or(0, GridView::layer_count);
        if count == 0 {
            return;
        }
        self.active_layer = Some(match self.active_layer {
            Some(dim) => (dim + 1) % count,
            None => 0,
        });
    }

    /// Next layer of the active dimension.
    pub fn advance(&mut self) {
        if let (Some(view), Some(dim)) = (self.view.as_mut(), self.active_layer) {
            view.advance(dim);
        }
    }

    /// Previous layer of the active dimension.
    pub fn retreat(&mut self) {
        if let (Some(view), Some(dim)) = (self.view.as_mut(), self.active_layer) {
            view.retreat(dim);
        }
    }

    /// First layer of the active dimension.
    pub fn first_layer(&mut self) {
        if let (Some(view), Some(dim)) = (self.view.as_mut(), self.active_layer) {
            view.set_layer(dim, 0);
        }
    }

    /// Last layer of the active dimension.
    pub fn last_layer(&mut self) {
        if let (Some(view), Some(dim)) = (self.view.as_mut(), self.active_layer) {
            view.set_layer(dim, usize::MAX);
        }
    }

    /// Append a typed digit to the pending layer number.
    pub fn push_digit(&mut self, digit: u32) {
        let count = self.pending_count.unwrap_or(0);
        self.pending_count = Some(
            count
                .saturating_mul(10)
                .saturating_add(digit as usize),
        );
    }

    /// Drop the pending layer number.
    pub fn clear_count(&mut self) {
        self.pending_count = None;
    }

    /// Jump the active dimension to layer `number`, counting from 1.
    /// Out-of-range numbers clamp to the first or last layer.
    pub fn goto_layer(&mut self, number: usize) {
        self.pending_count = None;
        if let (Some(view), Some(dim)) = (self.view.as_mut(), self.active_layer) {
            view.set_layer(dim, number.saturating_sub(1));
        }
    }

    /// Jump to the pending layer number, or to the last layer without one.
    pub fn goto_pending_or_last(&mut self) {
        match self.pending_count.take() {
            Some(number) => self.goto_layer(number),
            None => self.last_layer(),
        }
    }

    /// `layer k: i/extent` for the active dimension, counting from 1.
    pub fn layer_label(&self) -> Option<String> {
        let view = self.view.as_ref()?;
        let dim = self.active_layer?;
        Some(format!(
            "layer dim {}: {}/{}",
            dim,
            view.layer(dim)? + 1,
            view.layer_extent(dim)?
        ))
    }

    /// Cell text for a `rows` x `cols` window at the scroll position,
    /// reusing the last materialization while nothing has changed.
    pub fn window(&mut self, dataset: &Dataset, rows: usize, cols: usize) -> &[Vec<String>] {
        let Some(view) = self.view.as_ref() else {
            return &[];
        };
        let fresh = self.cache.as_ref().is_some_and(|cache| {
            cache.revision == view.revision()
                && cache.scroll == self.scroll
                && cache.window == (rows, cols)
        });
        if !fresh {
            let materialized = view.materialize(dataset, self.scroll.row, rows, self.scroll.col, cols);
            self.cache = Some(RowCache {
                revision: view.revision(),
                scroll: self.scroll,
                window: (rows, cols),
                rows: materialized,
            });
        }
        self.cache.as_ref().map_or(&[][..], |cache| cache.rows.as_slice())
    }
}

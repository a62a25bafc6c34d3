//! Strata - a terminal browser for hierarchical scientific containers.
//!
//! Strata walks a netCDF-4 / HDF5 container into a tree of groups, variables
//! and attributes, loads a variable's payload only when it is first viewed,
//! and shows numeric payloads of any rank as a two-dimensional grid with one
//! selectable layer index per leading dimension.
//!
//! # Features
//!
//! - Cycle-safe traversal of hard-linked groups
//! - Lazy, load-once payload reads
//! - Layered grid views for N-dimensional numeric data
//! - Recently opened files
//! - Gruvbox color themes
//!
//! # Example
//!
//! ```ignore
//! use strata::data::{ensure_loaded, TreeReader};
//! use strata::grid::GridView;
//! use strata::store::NetcdfStore;
//! use std::path::Path;
//!
//! let store = NetcdfStore;
//! let mut container = TreeReader::read_file(&store, Path::new("data.nc"))?;
//! println!("{} objects", container.object_count());
//!
//! let node = container.root_node.find_variable_mut("/temperature").unwrap();
//! ensure_loaded(&store, node)?;
//! let dataset = node.dataset.as_ref().unwrap();
//! let view = GridView::for_dataset(dataset);
//! println!("first cell: {}", view.cell_text(dataset, 0, 0));
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod app;
pub mod data;
pub mod data_viewer;
pub mod error;
pub mod explorer;
pub mod grid;
pub mod recent;
pub mod store;
pub mod ui;
pub mod util;

pub use error::{Result, StrataError};

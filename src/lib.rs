#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod graph;
pub mod layout;
pub mod render;
pub mod settings;
pub mod table;
pub mod theme;

pub use color::{Rgb, Scheme};
pub use graph::{FlowGraph, build_flow_graph};
pub use layout::{
    AlluvialLayout, HeatMatrixLayout, compute_alluvial_layout, compute_heat_matrix_layout,
};
pub use render::{render_alluvial, render_heat_matrix, render_svg_alluvial, render_svg_heat_matrix};
pub use settings::{ColorMode, Settings, SortMode, describe_settings, load_settings};
pub use table::{CanvasSize, CellValue, Column, ColumnRole, DataTable};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;

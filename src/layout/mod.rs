mod alluvial;
mod heatmatrix;

pub use alluvial::compute_alluvial_layout;
pub use heatmatrix::{BandScale, compute_heat_matrix_layout};

#[derive(Debug, Clone)]
pub struct AlluvialNodeLayout {
    pub name: String,
    pub group: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    /// Total throughput, the larger of the incoming and outgoing weight sums.
    pub total: f32,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct AlluvialLinkLayout {
    pub source: String,
    pub target: String,
    pub value: f32,
    pub thickness: f32,
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub gradient_id: String,
}

/// One SVG linearGradient definition, shared by every link with the same
/// (source name, target name) pair.
#[derive(Debug, Clone)]
pub struct GradientDef {
    pub id: String,
    pub start_color: String,
    pub end_color: String,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone)]
pub struct AlluvialLayout {
    pub width: f32,
    pub height: f32,
    pub node_width: f32,
    pub nodes: Vec<AlluvialNodeLayout>,
    pub links: Vec<AlluvialLinkLayout>,
    pub gradients: Vec<GradientDef>,
}

impl AlluvialLayout {
    pub fn empty(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            node_width: 0.0,
            nodes: Vec::new(),
            links: Vec::new(),
            gradients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AxisTick {
    pub label: String,
    /// Offset along the axis, measured from the axis origin.
    pub pos: f32,
}

#[derive(Debug, Clone)]
pub struct HeatCellLayout {
    pub group: String,
    pub variable: String,
    pub value: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct HeatMatrixLayout {
    pub width: f32,
    pub height: f32,
    /// Space reserved on the left and bottom for the two axes.
    pub axis_reserve: f32,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub x_axis_span: f32,
    pub y_axis_span: f32,
    pub cells: Vec<HeatCellLayout>,
}

impl HeatMatrixLayout {
    pub fn empty(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            axis_reserve: 0.0,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            x_axis_span: 0.0,
            y_axis_span: 0.0,
            cells: Vec::new(),
        }
    }
}

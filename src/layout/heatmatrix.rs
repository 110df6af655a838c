use crate::color::SequentialScale;
use crate::settings::Settings;
use crate::table::{CanvasSize, CellValue, DataTable};

use super::{AxisTick, HeatCellLayout, HeatMatrixLayout};

const AXIS_RESERVE: f32 = 250.0;
const BAND_PADDING: f32 = 0.05;
// Fixed value domain; out-of-range values clip to the scale extremes.
const VALUE_DOMAIN: (f32, f32) = (0.0, 5.0);

/// Ordinal band scale: evenly spaced bands with inner/outer padding, centered
/// alignment, and support for a reversed range.
#[derive(Debug, Clone)]
pub struct BandScale {
    domain: Vec<String>,
    positions: Vec<f32>,
    bandwidth: f32,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f32, f32), padding: f32) -> Self {
        let n = domain.len();
        let reverse = range.1 < range.0;
        let (start, stop) = if reverse {
            (range.1, range.0)
        } else {
            (range.0, range.1)
        };
        let step = (stop - start) / 1.0f32.max(n as f32 - padding + padding * 2.0);
        let start = start + (stop - start - step * (n as f32 - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);
        let mut positions: Vec<f32> = (0..n).map(|i| start + step * i as f32).collect();
        if reverse {
            positions.reverse();
        }
        Self {
            domain,
            positions,
            bandwidth,
        }
    }

    pub fn position(&self, key: &str) -> Option<f32> {
        self.domain
            .iter()
            .position(|d| d == key)
            .map(|i| self.positions[i])
    }

    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Band centers in domain order, for axis ticks.
    pub fn centers(&self) -> impl Iterator<Item = (&str, f32)> {
        self.domain
            .iter()
            .zip(&self.positions)
            .map(|(label, pos)| (label.as_str(), pos + self.bandwidth / 2.0))
    }
}

fn cell_text(cell: Option<&CellValue>) -> String {
    match cell {
        None | Some(CellValue::Null) => String::new(),
        Some(value) => value.as_text(),
    }
}

fn dedup_preserving_order(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Bins a three-column table (x category, y category, value) into a colored
/// grid. One cell per input row; duplicate (x, y) pairs overdraw in row order.
pub fn compute_heat_matrix_layout(
    table: &DataTable,
    settings: &Settings,
    canvas: CanvasSize,
) -> HeatMatrixLayout {
    let steps = table.step_columns();
    if steps.len() < 3 {
        return HeatMatrixLayout::empty(canvas.width, canvas.height);
    }
    let groups = &steps[0].cells;
    let variables = &steps[1].cells;
    let values = &steps[2].cells;

    let group_texts: Vec<String> = groups.iter().map(|c| cell_text(Some(c))).collect();
    let variable_texts: Vec<String> = (0..groups.len())
        .map(|row| cell_text(variables.get(row)))
        .collect();

    let x = BandScale::new(
        dedup_preserving_order(&group_texts),
        (0.0, canvas.width - AXIS_RESERVE),
        BAND_PADDING,
    );
    let y = BandScale::new(
        dedup_preserving_order(&variable_texts),
        (canvas.height - AXIS_RESERVE, 0.0),
        BAND_PADDING,
    );
    let scale = SequentialScale::new(VALUE_DOMAIN.0, VALUE_DOMAIN.1);

    let mut cells = Vec::with_capacity(groups.len());
    for row in 0..groups.len() {
        let group = &group_texts[row];
        let variable = &variable_texts[row];
        let (Some(cx), Some(cy)) = (x.position(group), y.position(variable)) else {
            continue;
        };
        let value = values
            .get(row)
            .and_then(CellValue::as_number)
            .unwrap_or(0.0) as f32;
        cells.push(HeatCellLayout {
            group: group.clone(),
            variable: variable.clone(),
            value,
            x: cx + AXIS_RESERVE,
            y: cy,
            width: x.bandwidth(),
            height: y.bandwidth(),
            color: settings.scheme.interpolate(scale.normalize(value)).to_hex(),
        });
    }

    let x_ticks: Vec<AxisTick> = x
        .centers()
        .map(|(label, pos)| AxisTick {
            label: label.to_string(),
            pos,
        })
        .collect();
    let y_ticks: Vec<AxisTick> = y
        .centers()
        .map(|(label, pos)| AxisTick {
            label: label.to_string(),
            pos,
        })
        .collect();

    HeatMatrixLayout {
        width: canvas.width,
        height: canvas.height,
        axis_reserve: AXIS_RESERVE,
        x_ticks,
        y_ticks,
        x_axis_span: canvas.width - AXIS_RESERVE,
        y_axis_span: canvas.height - AXIS_RESERVE,
        cells,
    }
}

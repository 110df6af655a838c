use crate::graph::build_flow_graph;
use crate::layout::{
    AlluvialLayout, HeatMatrixLayout, compute_alluvial_layout, compute_heat_matrix_layout,
};
use crate::settings::Settings;
use crate::table::{CanvasSize, DataTable};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// One-call pipeline: table in, SVG out. Fewer than two step columns produce
/// an empty drawing rather than an error.
pub fn render_alluvial(
    table: &DataTable,
    settings: &Settings,
    theme: &Theme,
    canvas: CanvasSize,
) -> String {
    let layout = match build_flow_graph(table) {
        Some(graph) => compute_alluvial_layout(&graph, settings, canvas),
        None => AlluvialLayout::empty(canvas.width, canvas.height),
    };
    render_svg_alluvial(&layout, settings, theme)
}

pub fn render_heat_matrix(
    table: &DataTable,
    settings: &Settings,
    theme: &Theme,
    canvas: CanvasSize,
) -> String {
    let layout = compute_heat_matrix_layout(table, settings, canvas);
    render_svg_heat_matrix(&layout, theme)
}

pub fn render_svg_alluvial(layout: &AlluvialLayout, settings: &Settings, theme: &Theme) -> String {
    let mut svg = String::new();
    open_svg(&mut svg, layout.width, layout.height, theme);

    if layout.nodes.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    svg.push_str("<defs>");
    for gradient in &layout.gradients {
        svg.push_str(&format!(
            "<linearGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"><stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></linearGradient>",
            gradient.id,
            gradient.x1,
            gradient.y1,
            gradient.x2,
            gradient.y2,
            gradient.start_color,
            gradient.end_color
        ));
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<g class=\"links\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"{}\">",
        theme.link_stroke, settings.line_opacity
    ));
    for link in &layout.links {
        let d = flow_path(link.start, link.end);
        svg.push_str(&format!(
            "<path d=\"{}\" stroke=\"url(#{})\" stroke-width=\"{:.2}\"><title>{} \u{2192} {}\n{}</title></path>",
            d,
            link.gradient_id,
            link.thickness.max(1.0),
            escape_xml(&link.source),
            escape_xml(&link.target),
            format_value(link.value)
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&format!(
        "<g class=\"nodes\" font-family=\"{}\" font-size=\"{}\">",
        theme.font_family, theme.base_font_size
    ));
    for node in &layout.nodes {
        svg.push_str("<g>");
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\"/>",
            node.x0,
            node.y0,
            node.x1 - node.x0,
            node.y1 - node.y0,
            node.color,
            theme.node_stroke
        ));
        // Labels sit outside the node, flipped to the inner side on the left
        // half of the canvas so they never run off the edge.
        let (label_x, anchor) = if node.x0 < layout.width / 2.0 {
            (node.x1 + 6.0, "start")
        } else {
            (node.x0 - 6.0, "end")
        };
        let label_y = (node.y0 + node.y1) / 2.0;
        svg.push_str(&format!(
            "<text x=\"{label_x:.2}\" y=\"{label_y:.2}\" dy=\"0.35em\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            theme.label_font_family,
            theme.label_font_size,
            theme.text_color,
            escape_xml(&node.name)
        ));
        svg.push_str(&format!(
            "<title>{}\n{}</title>",
            escape_xml(&node.name),
            format_value(node.total)
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

pub fn render_svg_heat_matrix(layout: &HeatMatrixLayout, theme: &Theme) -> String {
    let mut svg = String::new();
    open_svg(&mut svg, layout.width, layout.height, theme);

    if !layout.cells.is_empty() {
        let axis_color = &theme.text_color;
        svg.push_str(&format!(
            "<g class=\"x-axis\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" transform=\"translate({:.2},{:.2})\">",
            theme.font_family,
            theme.axis_font_size,
            axis_color,
            layout.axis_reserve,
            layout.height - layout.axis_reserve
        ));
        svg.push_str(&format!(
            "<path d=\"M0,6V0H{:.2}V6\" fill=\"none\" stroke=\"{}\"/>",
            layout.x_axis_span, axis_color
        ));
        for tick in &layout.x_ticks {
            svg.push_str(&format!(
                "<g transform=\"translate({:.2},0)\"><line y2=\"6\" stroke=\"{}\"/><text transform=\"rotate(-45)\" x=\"-9\" y=\"0\" dy=\"1em\" text-anchor=\"end\">{}</text></g>",
                tick.pos,
                axis_color,
                escape_xml(&tick.label)
            ));
        }
        svg.push_str("</g>");

        svg.push_str(&format!(
            "<g class=\"y-axis\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" transform=\"translate({:.2},0)\">",
            theme.font_family, theme.axis_font_size, axis_color, layout.axis_reserve
        ));
        svg.push_str(&format!(
            "<path d=\"M-6,{:.2}H0V0H-6\" fill=\"none\" stroke=\"{}\"/>",
            layout.y_axis_span, axis_color
        ));
        for tick in &layout.y_ticks {
            svg.push_str(&format!(
                "<g transform=\"translate(0,{:.2})\"><line x2=\"-6\" stroke=\"{}\"/><text x=\"-9\" dy=\"0.32em\" text-anchor=\"end\">{}</text></g>",
                tick.pos,
                axis_color,
                escape_xml(&tick.label)
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("<g class=\"cells\">");
    for cell in &layout.cells {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"><title>{} : {}\n{}</title></rect>",
            cell.x,
            cell.y,
            cell.width,
            cell.height,
            cell.color,
            escape_xml(&cell.group),
            escape_xml(&cell.variable),
            cell.value
        ));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn open_svg(svg: &mut String, width: f32, height: f32, theme: &Theme) {
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
}

// Horizontal flow ribbon: a cubic with both control points on the midline.
fn flow_path(start: (f32, f32), end: (f32, f32)) -> String {
    let mid_x = (start.0 + end.0) / 2.0;
    format!(
        "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        start.0, start.1, mid_x, start.1, mid_x, end.1, end.0, end.1
    )
}

/// Thousands-grouped integer formatting for tooltips.
fn format_value(value: f32) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, canvas: CanvasSize) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Arial".to_string();
    opt.default_size = usvg::Size::from_wh(canvas.width, canvas.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

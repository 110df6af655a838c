use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::color::node_color;
use crate::graph::FlowGraph;
use crate::settings::{Settings, SortMode};
use crate::table::CanvasSize;

use super::{AlluvialLayout, AlluvialLinkLayout, AlluvialNodeLayout, GradientDef};

const NODE_WIDTH: f32 = 10.0;
const MAX_NODE_PADDING: f32 = 10.0;
// Height headroom so the tallest column cannot clip the bottom edge.
const HEIGHT_HEADROOM: f32 = 0.9;

pub fn compute_alluvial_layout(
    graph: &FlowGraph,
    settings: &Settings,
    canvas: CanvasSize,
) -> AlluvialLayout {
    let node_count = graph.nodes.len();
    let group_count = graph.groups.len();
    if group_count < 2 || node_count == 0 {
        return AlluvialLayout::empty(canvas.width, canvas.height);
    }

    let links = &graph.links;
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut in_total = vec![0.0f32; node_count];
    let mut out_total = vec![0.0f32; node_count];
    for (idx, link) in links.iter().enumerate() {
        outgoing[link.source].push(idx);
        incoming[link.target].push(idx);
        out_total[link.source] += link.value;
        in_total[link.target] += link.value;
    }
    let totals: Vec<f32> = (0..node_count)
        .map(|node| in_total[node].max(out_total[node]))
        .collect();

    let group_nodes = graph.nodes_by_group();
    let max_nodes = group_nodes.iter().map(Vec::len).max().unwrap_or(0);
    if max_nodes == 0 {
        return AlluvialLayout::empty(canvas.width, canvas.height);
    }

    // Colors come from each group's first-seen order and stay fixed no matter
    // how the columns are re-sorted below.
    let mut colors = vec![String::new(); node_count];
    for nodes in &group_nodes {
        for (position, &node) in nodes.iter().enumerate() {
            let rank = position as f32 / nodes.len() as f32;
            colors[node] = node_color(rank, settings).to_hex();
        }
    }

    // Just enough gap to fit the densest column, capped at 10 units.
    let padding = MAX_NODE_PADDING.min((canvas.height - max_nodes as f32) / max_nodes as f32);
    let layout_height = canvas.height * HEIGHT_HEADROOM;

    // Vertical scale: the tightest column wins.
    let mut ky = f32::INFINITY;
    for nodes in &group_nodes {
        let sum: f32 = nodes.iter().map(|&node| totals[node]).sum();
        if sum > 0.0 {
            let avail = layout_height - nodes.len().saturating_sub(1) as f32 * padding;
            ky = ky.min(avail / sum);
        }
    }
    let ky = if ky.is_finite() { ky.max(0.0) } else { 0.0 };

    let kx = (canvas.width - NODE_WIDTH) / (group_count - 1) as f32;
    let dy: Vec<f32> = (0..node_count).map(|node| totals[node] * ky).collect();
    let mut x0 = vec![0.0f32; node_count];
    let mut y0 = vec![0.0f32; node_count];

    let mut columns = group_nodes.clone();
    for (group, nodes) in columns.iter().enumerate() {
        let x = group as f32 * kx;
        let mut y = 0.0f32;
        for &node in nodes {
            x0[node] = x;
            y0[node] = y;
            y += dy[node] + padding;
        }
    }

    sort_columns(&mut columns, graph, &dy, &mut y0, padding, settings.sorting);

    // Re-thread each node's links top-to-bottom along its faces so they leave
    // and arrive in the endpoint order, keeping crossings off the node edge.
    let thickness: Vec<f32> = links.iter().map(|link| link.value * ky).collect();
    let mut start_y = vec![0.0f32; links.len()];
    let mut end_y = vec![0.0f32; links.len()];
    for node in 0..node_count {
        let mut order = outgoing[node].clone();
        order.sort_by(|&a, &b| y0[links[a].target].total_cmp(&y0[links[b].target]));
        let mut ly = y0[node];
        for idx in order {
            start_y[idx] = ly + thickness[idx] / 2.0;
            ly += thickness[idx];
        }
        let mut order = incoming[node].clone();
        order.sort_by(|&a, &b| y0[links[a].source].total_cmp(&y0[links[b].source]));
        let mut ly = y0[node];
        for idx in order {
            end_y[idx] = ly + thickness[idx] / 2.0;
            ly += thickness[idx];
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| AlluvialNodeLayout {
            name: node.name.clone(),
            group: graph.group_name(idx).to_string(),
            x0: x0[idx],
            y0: y0[idx],
            x1: x0[idx] + NODE_WIDTH,
            y1: y0[idx] + dy[idx],
            total: totals[idx],
            color: colors[idx].clone(),
        })
        .collect();

    let mut ids = GradientIds::default();
    let mut gradients = Vec::new();
    let mut links_layout = Vec::with_capacity(links.len());
    for (idx, link) in links.iter().enumerate() {
        let source = &graph.nodes[link.source];
        let target = &graph.nodes[link.target];
        let start = (x0[link.source] + NODE_WIDTH, start_y[idx]);
        let end = (x0[link.target], end_y[idx]);
        let (gradient_id, fresh) = ids.resolve(&source.name, &target.name);
        if fresh {
            gradients.push(GradientDef {
                id: gradient_id.clone(),
                start_color: colors[link.source].clone(),
                end_color: colors[link.target].clone(),
                x1: start.0,
                y1: start.1,
                x2: end.0,
                y2: end.1,
            });
        }
        links_layout.push(AlluvialLinkLayout {
            source: source.name.clone(),
            target: target.name.clone(),
            value: link.value,
            thickness: thickness[idx],
            start,
            end,
            gradient_id,
        });
    }

    AlluvialLayout {
        width: canvas.width,
        height: canvas.height,
        node_width: NODE_WIDTH,
        nodes,
        links: links_layout,
        gradients,
    }
}

fn sort_columns(
    columns: &mut [Vec<usize>],
    graph: &FlowGraph,
    dy: &[f32],
    y0: &mut [f32],
    padding: f32,
    mode: SortMode,
) {
    for nodes in columns.iter_mut() {
        match mode {
            SortMode::None => {}
            SortMode::Size => nodes.sort_by(|&a, &b| dy[b].total_cmp(&dy[a])),
            // Automatic reads the positions assigned by the initial stacking,
            // which reverses each column; kept for compatibility with
            // existing reports.
            SortMode::Automatic => nodes.sort_by(|&a, &b| y0[b].total_cmp(&y0[a])),
            SortMode::Name => nodes.sort_by(|&a, &b| {
                let (na, nb) = (&graph.nodes[a], &graph.nodes[b]);
                na.kind.cmp(&nb.kind).then_with(|| na.name.cmp(&nb.name))
            }),
        }
        let mut y = 0.0f32;
        for &node in nodes.iter() {
            y0[node] = y;
            y += dy[node] + padding;
        }
    }
}

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Za-z]+").unwrap());

fn sanitize_gradient_id(source: &str, target: &str) -> String {
    let raw = format!("{source}-{target}");
    let cleaned = NON_WORD.replace_all(&raw, "-");
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "grad".to_string()
    } else {
        format!("grad-{cleaned}")
    }
}

/// Assigns one id per distinct (source name, target name) pair; sanitized
/// collisions between different raw pairs get a numeric suffix.
#[derive(Default)]
struct GradientIds {
    by_pair: HashMap<(String, String), String>,
    taken: HashSet<String>,
}

impl GradientIds {
    fn resolve(&mut self, source: &str, target: &str) -> (String, bool) {
        let key = (source.to_string(), target.to_string());
        if let Some(id) = self.by_pair.get(&key) {
            return (id.clone(), false);
        }
        let base = sanitize_gradient_id(source, target);
        let mut id = base.clone();
        let mut suffix = 2;
        while !self.taken.insert(id.clone()) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.by_pair.insert(key, id.clone());
        (id, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_flow_graph;
    use crate::table::{CellValue, Column, ColumnRole, DataTable};

    fn canvas() -> CanvasSize {
        CanvasSize {
            width: 600.0,
            height: 400.0,
        }
    }

    fn values(name: &str, items: &[&str]) -> Column {
        Column {
            name: name.to_string(),
            role: ColumnRole::Values,
            cells: items
                .iter()
                .map(|s| CellValue::Text(s.to_string()))
                .collect(),
        }
    }

    fn size(weights: &[f64]) -> Column {
        Column {
            name: "Size".to_string(),
            role: ColumnRole::Size,
            cells: weights.iter().map(|w| CellValue::Number(*w)).collect(),
        }
    }

    fn settings_with(sorting: SortMode) -> Settings {
        Settings {
            sorting,
            ..Settings::default()
        }
    }

    fn two_step_table() -> DataTable {
        DataTable {
            columns: vec![
                values("From", &["a", "b", "c"]),
                values("To", &["x", "x", "y"]),
                size(&[1.0, 5.0, 3.0]),
            ],
        }
    }

    fn layout_with(sorting: SortMode) -> AlluvialLayout {
        let graph = build_flow_graph(&two_step_table()).unwrap();
        compute_alluvial_layout(&graph, &settings_with(sorting), canvas())
    }

    fn node<'a>(layout: &'a AlluvialLayout, group: &str, name: &str) -> &'a AlluvialNodeLayout {
        layout
            .nodes
            .iter()
            .find(|n| n.group == group && n.name == name)
            .expect("node present")
    }

    #[test]
    fn columns_span_the_canvas_width() {
        let layout = layout_with(SortMode::None);
        assert_eq!(node(&layout, "From", "a").x0, 0.0);
        let to = node(&layout, "To", "x");
        assert_eq!(to.x1, canvas().width);
        assert_eq!(to.x1 - to.x0, layout.node_width);
    }

    #[test]
    fn none_mode_keeps_first_seen_stacking() {
        let layout = layout_with(SortMode::None);
        let a = node(&layout, "From", "a");
        let b = node(&layout, "From", "b");
        let c = node(&layout, "From", "c");
        assert_eq!(a.y0, 0.0);
        assert!(a.y0 < b.y0 && b.y0 < c.y0);
    }

    #[test]
    fn size_mode_orders_descending_by_height() {
        let layout = layout_with(SortMode::Size);
        let a = node(&layout, "From", "a");
        let b = node(&layout, "From", "b");
        let c = node(&layout, "From", "c");
        // weights: a=1, b=5, c=3
        assert!(b.y0 < c.y0 && c.y0 < a.y0);
    }

    #[test]
    fn size_mode_ties_preserve_input_order() {
        let table = DataTable {
            columns: vec![
                values("From", &["p", "q", "r"]),
                values("To", &["x", "x", "x"]),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        let layout = compute_alluvial_layout(&graph, &settings_with(SortMode::Size), canvas());
        let p = node(&layout, "From", "p");
        let q = node(&layout, "From", "q");
        let r = node(&layout, "From", "r");
        assert!(p.y0 < q.y0 && q.y0 < r.y0);
    }

    #[test]
    fn automatic_mode_reverses_each_column() {
        let layout = layout_with(SortMode::Automatic);
        let a = node(&layout, "From", "a");
        let b = node(&layout, "From", "b");
        let c = node(&layout, "From", "c");
        assert!(c.y0 < b.y0 && b.y0 < a.y0);
    }

    #[test]
    fn name_mode_groups_by_type_then_sorts_lexicographically() {
        let table = DataTable {
            columns: vec![
                Column {
                    name: "From".to_string(),
                    role: ColumnRole::Values,
                    cells: vec![
                        CellValue::Text("zeta".into()),
                        CellValue::Number(10.0),
                        CellValue::Text("alpha".into()),
                        CellValue::Number(2.0),
                    ],
                },
                values("To", &["x", "x", "x", "x"]),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        let layout = compute_alluvial_layout(&graph, &settings_with(SortMode::Name), canvas());
        let mut from: Vec<&AlluvialNodeLayout> =
            layout.nodes.iter().filter(|n| n.group == "From").collect();
        from.sort_by(|a, b| a.y0.total_cmp(&b.y0));
        let order: Vec<&str> = from.iter().map(|n| n.name.as_str()).collect();
        // numbers first (lexicographic within the tag: "10" < "2"), then text
        assert_eq!(order, ["10", "2", "alpha", "zeta"]);
    }

    #[test]
    fn padding_heuristic_is_capped_at_ten() {
        let layout = layout_with(SortMode::None);
        let a = node(&layout, "From", "a");
        let b = node(&layout, "From", "b");
        let gap = b.y0 - a.y1;
        assert!((gap - 10.0).abs() < 1e-3);

        let graph = build_flow_graph(&two_step_table()).unwrap();
        let cramped = compute_alluvial_layout(
            &graph,
            &settings_with(SortMode::None),
            CanvasSize {
                width: 600.0,
                height: 6.0,
            },
        );
        let a = node(&cramped, "From", "a");
        let b = node(&cramped, "From", "b");
        let gap = b.y0 - a.y1;
        assert!((gap - 1.0).abs() < 1e-3, "expected (6 - 3) / 3, got {gap}");
    }

    #[test]
    fn node_heights_are_proportional_to_throughput() {
        let layout = layout_with(SortMode::None);
        let b = node(&layout, "From", "b");
        let c = node(&layout, "From", "c");
        let ratio = (b.y1 - b.y0) / (c.y1 - c.y0);
        assert!((ratio - 5.0 / 3.0).abs() < 1e-3);
        // x column: throughput 1 + 5
        let x = node(&layout, "To", "x");
        assert!((x.total - 6.0).abs() < 1e-6);
    }

    #[test]
    fn links_attach_along_node_faces_in_endpoint_order() {
        let layout = layout_with(SortMode::None);
        let x = node(&layout, "To", "x");
        let into_x: Vec<&AlluvialLinkLayout> =
            layout.links.iter().filter(|l| l.target == "x").collect();
        assert_eq!(into_x.len(), 2);
        // a sits above b, so a's link lands on the upper slice of x
        let from_a = into_x.iter().find(|l| l.source == "a").unwrap();
        let from_b = into_x.iter().find(|l| l.source == "b").unwrap();
        assert!(from_a.end.1 < from_b.end.1);
        assert!((from_a.end.1 - (x.y0 + from_a.thickness / 2.0)).abs() < 1e-3);
        let span = from_a.thickness + from_b.thickness;
        assert!((span - (x.y1 - x.y0)).abs() < 1e-3);
    }

    #[test]
    fn gradient_ids_are_sanitized_and_unique() {
        let table = DataTable {
            columns: vec![
                values("From", &["A B", "A-B", "A?B"]),
                values("To", &["end", "end", "end"]),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        let layout = compute_alluvial_layout(&graph, &settings_with(SortMode::None), canvas());
        let ids: Vec<&str> = layout
            .links
            .iter()
            .map(|l| l.gradient_id.as_str())
            .collect();
        assert_eq!(ids.len(), 3);
        for id in &ids {
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "id not sanitized: {id}"
            );
        }
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 3, "punctuation-only variants must not collide");
    }

    #[test]
    fn repeated_pairs_share_one_gradient() {
        let table = DataTable {
            columns: vec![
                values("From", &["a", "a"]),
                values("To", &["x", "x"]),
                size(&[1.0, 2.0]),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        let layout = compute_alluvial_layout(&graph, &settings_with(SortMode::None), canvas());
        assert_eq!(layout.links.len(), 2);
        assert_eq!(layout.gradients.len(), 1);
        assert_eq!(layout.links[0].gradient_id, layout.links[1].gradient_id);
    }

    #[test]
    fn node_colors_use_first_seen_rank_even_after_sorting() {
        let settings = Settings {
            sorting: SortMode::Size,
            ..Settings::default()
        };
        let graph = build_flow_graph(&two_step_table()).unwrap();
        let sorted = compute_alluvial_layout(&graph, &settings, canvas());
        let unsorted =
            compute_alluvial_layout(&graph, &settings_with(SortMode::None), canvas());
        for name in ["a", "b", "c"] {
            assert_eq!(
                node(&sorted, "From", name).color,
                node(&unsorted, "From", name).color
            );
        }
    }

    #[test]
    fn single_group_produces_empty_layout() {
        let graph = FlowGraph {
            groups: vec!["Only".to_string()],
            nodes: Vec::new(),
            links: Vec::new(),
        };
        let layout = compute_alluvial_layout(&graph, &Settings::default(), canvas());
        assert!(layout.nodes.is_empty() && layout.links.is_empty());
    }
}

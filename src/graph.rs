use std::collections::HashMap;

use crate::table::{CellValue, DataTable, ValueKind};

/// A unique category value within one step column. Identity is (name, group);
/// the same name in two groups is two distinct nodes.
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub name: String,
    /// Index into [`FlowGraph::groups`].
    pub group: usize,
    pub kind: ValueKind,
}

/// A weighted connection between a node in step `i` and step `i + 1`,
/// addressed by arena indices.
#[derive(Debug, Clone, Copy)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f32,
}

/// Arena built once per update pass; nodes keep first-seen order, which later
/// stages rely on for color ranks and the `None` sort mode.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    pub groups: Vec<String>,
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    pub fn group_name(&self, node: usize) -> &str {
        &self.groups[self.nodes[node].group]
    }

    /// Node indices per group, in first-seen order.
    pub fn nodes_by_group(&self) -> Vec<Vec<usize>> {
        let mut grouped: Vec<Vec<usize>> = vec![Vec::new(); self.groups.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            grouped[node.group].push(idx);
        }
        grouped
    }
}

/// Maps the host table onto the node/link arena. Returns `None` when fewer
/// than two step columns are present; the caller renders nothing.
pub fn build_flow_graph(table: &DataTable) -> Option<FlowGraph> {
    let steps = table.step_columns();
    if steps.len() < 2 {
        return None;
    }
    let size = table.size_column();

    let mut graph = FlowGraph {
        groups: steps.iter().map(|column| column.name.clone()).collect(),
        nodes: Vec::new(),
        links: Vec::new(),
    };

    // Deduplicate each column preserving first occurrence; null cells never
    // become nodes.
    let mut index_by_name: Vec<HashMap<String, usize>> = Vec::with_capacity(steps.len());
    for (group, column) in steps.iter().enumerate() {
        let mut seen: HashMap<String, usize> = HashMap::new();
        for cell in &column.cells {
            let Some(kind) = cell.kind() else {
                continue;
            };
            let name = cell.as_text();
            if seen.contains_key(&name) {
                continue;
            }
            seen.insert(name.clone(), graph.nodes.len());
            graph.nodes.push(FlowNode { name, group, kind });
        }
        index_by_name.push(seen);
    }

    // One link per shared row of each adjacent column pair; a failed endpoint
    // lookup drops that link only.
    for step in 0..steps.len() - 1 {
        let from = &steps[step].cells;
        let to = &steps[step + 1].cells;
        let rows = from.len().min(to.len());
        for row in 0..rows {
            let Some(source) = resolve(&index_by_name[step], &from[row]) else {
                continue;
            };
            let Some(target) = resolve(&index_by_name[step + 1], &to[row]) else {
                continue;
            };
            let value = size
                .and_then(|column| column.cells.get(row))
                .and_then(CellValue::as_number)
                .map(|v| v as f32)
                .unwrap_or(1.0)
                .max(0.0);
            graph.links.push(FlowLink {
                source,
                target,
                value,
            });
        }
    }

    Some(graph)
}

fn resolve(index: &HashMap<String, usize>, cell: &CellValue) -> Option<usize> {
    if cell.is_null() {
        return None;
    }
    index.get(&cell.as_text()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnRole};

    fn values(name: &str, cells: Vec<CellValue>) -> Column {
        Column {
            name: name.to_string(),
            role: ColumnRole::Values,
            cells,
        }
    }

    fn text_cells(items: &[&str]) -> Vec<CellValue> {
        items
            .iter()
            .map(|s| CellValue::Text(s.to_string()))
            .collect()
    }

    fn size(cells: Vec<CellValue>) -> Column {
        Column {
            name: "Size".to_string(),
            role: ColumnRole::Size,
            cells,
        }
    }

    #[test]
    fn single_column_produces_no_graph() {
        let table = DataTable {
            columns: vec![values("Only", text_cells(&["a", "b"]))],
        };
        assert!(build_flow_graph(&table).is_none());
    }

    #[test]
    fn dedup_preserves_first_occurrence() {
        let table = DataTable {
            columns: vec![
                values("Step 1", text_cells(&["A", "B", "A", "C", "B"])),
                values("Step 2", text_cells(&["X", "X", "X", "X", "X"])),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        let step1: Vec<&str> = graph
            .nodes
            .iter()
            .filter(|n| n.group == 0)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(step1, ["A", "B", "C"]);
    }

    #[test]
    fn same_name_in_two_groups_is_two_nodes() {
        let table = DataTable {
            columns: vec![
                values("From", text_cells(&["A"])),
                values("To", text_cells(&["A"])),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links.len(), 1);
        assert_ne!(graph.links[0].source, graph.links[0].target);
    }

    #[test]
    fn missing_size_column_defaults_weights_to_one() {
        let table = DataTable {
            columns: vec![
                values("From", text_cells(&["X", "Y"])),
                values("To", text_cells(&["P", "Q"])),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        assert_eq!(graph.links.len(), 2);
        assert!(graph.links.iter().all(|l| l.value == 1.0));
    }

    #[test]
    fn short_size_column_defaults_remaining_rows() {
        let table = DataTable {
            columns: vec![
                values("From", text_cells(&["X", "Y"])),
                values("To", text_cells(&["P", "Q"])),
                size(vec![CellValue::Number(4.0)]),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        assert_eq!(graph.links[0].value, 4.0);
        assert_eq!(graph.links[1].value, 1.0);
    }

    #[test]
    fn missing_target_drops_only_that_link() {
        let table = DataTable {
            columns: vec![
                values("From", text_cells(&["X", "Y", "Z"])),
                values(
                    "To",
                    vec![
                        CellValue::Text("P".into()),
                        CellValue::Null,
                        CellValue::Text("Q".into()),
                    ],
                ),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        assert_eq!(graph.links.len(), 2);
        let names: Vec<(&str, &str)> = graph
            .links
            .iter()
            .map(|l| {
                (
                    graph.nodes[l.source].name.as_str(),
                    graph.nodes[l.target].name.as_str(),
                )
            })
            .collect();
        assert_eq!(names, [("X", "P"), ("Z", "Q")]);
    }

    #[test]
    fn numeric_and_text_cells_share_one_textification() {
        // 3.0 in the step column and "3" in the adjacent column resolve to the
        // same spelling, so identity and lookup cannot diverge.
        let table = DataTable {
            columns: vec![
                values("From", vec![CellValue::Number(3.0)]),
                values("To", text_cells(&["3"])),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        assert_eq!(graph.nodes[0].name, "3");
        assert_eq!(graph.nodes[1].name, "3");
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn three_columns_chain_adjacent_pairs_only() {
        let table = DataTable {
            columns: vec![
                values("A", text_cells(&["a1", "a2"])),
                values("B", text_cells(&["b1", "b2"])),
                values("C", text_cells(&["c1", "c2"])),
                size(vec![CellValue::Number(2.0), CellValue::Number(5.0)]),
            ],
        };
        let graph = build_flow_graph(&table).unwrap();
        assert_eq!(graph.links.len(), 4);
        for link in &graph.links {
            assert_eq!(
                graph.nodes[link.target].group,
                graph.nodes[link.source].group + 1
            );
        }
        assert_eq!(graph.links[0].value, 2.0);
        assert_eq!(graph.links[1].value, 5.0);
    }
}

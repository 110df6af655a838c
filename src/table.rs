use serde::{Deserialize, Serialize};

/// Role a column plays in the host dataset: categorical step or numeric weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    #[default]
    Values,
    Size,
}

/// Runtime type tag of a cell, ordered the way `typeof` strings compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueKind {
    Bool,
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Canonical text form, shared by node identity and link lookup so the two
    /// can never diverge on the same raw value.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Text(value) => value.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            CellValue::Number(value) => Some(*value),
            CellValue::Text(value) => value.trim().parse::<f64>().ok(),
        }
    }

    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(_) => Some(ValueKind::Bool),
            CellValue::Number(_) => Some(ValueKind::Number),
            CellValue::Text(_) => Some(ValueKind::Text),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub role: ColumnRole,
    pub cells: Vec<CellValue>,
}

/// The tabular dataset handed over by the host on every update pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<Column>,
}

impl DataTable {
    pub fn step_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| column.role == ColumnRole::Values)
            .collect()
    }

    pub fn size_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.role == ColumnRole::Size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_text_has_no_trailing_fraction() {
        assert_eq!(CellValue::Number(3.0).as_text(), "3");
        assert_eq!(CellValue::Number(3.5).as_text(), "3.5");
        assert_eq!(CellValue::Number(-12.0).as_text(), "-12");
    }

    #[test]
    fn null_cells_have_no_kind() {
        assert_eq!(CellValue::Null.kind(), None);
        assert_eq!(CellValue::Text("x".into()).kind(), Some(ValueKind::Text));
    }

    #[test]
    fn kind_order_matches_type_tag_order() {
        assert!(ValueKind::Bool < ValueKind::Number);
        assert!(ValueKind::Number < ValueKind::Text);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(CellValue::Text(" 41.5 ".into()).as_number(), Some(41.5));
        assert_eq!(CellValue::Text("n/a".into()).as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), Some(1.0));
        assert_eq!(CellValue::Null.as_number(), None);
    }

    #[test]
    fn table_deserializes_with_role_tags() {
        let table: DataTable = serde_json::from_str(
            r#"{"columns":[
                {"name":"Stage","role":"values","cells":["a",null,3]},
                {"name":"Amount","role":"size","cells":[1,2,3]}
            ]}"#,
        )
        .expect("table parse");
        assert_eq!(table.step_columns().len(), 1);
        let size = table.size_column().expect("size column");
        assert_eq!(size.cells[1], CellValue::Number(2.0));
        assert!(table.columns[0].cells[1].is_null());
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub base_font_size: f32,
    pub label_font_family: String,
    pub label_font_size: f32,
    pub axis_font_size: f32,
    pub node_stroke: String,
    pub link_stroke: String,
    pub text_color: String,
    pub background: String,
}

impl Theme {
    /// Styling of the shipped report visuals.
    pub fn report() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            base_font_size: 10.0,
            label_font_family: "Arial, Helvetica".to_string(),
            label_font_size: 15.0,
            axis_font_size: 18.0,
            node_stroke: "#000000".to_string(),
            link_stroke: "#000000".to_string(),
            text_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            base_font_size: 10.0,
            label_font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            label_font_size: 13.0,
            axis_font_size: 14.0,
            node_stroke: "#1C2430".to_string(),
            link_stroke: "#7A8AA6".to_string(),
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::report()
    }
}

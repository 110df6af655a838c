use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, Scheme, default_gradient};

/// Vertical ordering applied to the nodes of each step column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    None,
    Size,
    Automatic,
    Name,
}

impl SortMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("none") => Some(SortMode::None),
            n if n.eq_ignore_ascii_case("size") => Some(SortMode::Size),
            n if n.eq_ignore_ascii_case("automatic") => Some(SortMode::Automatic),
            n if n.eq_ignore_ascii_case("name") => Some(SortMode::Name),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::Size => "size",
            SortMode::Automatic => "automatic",
            SortMode::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Gradient,
    Ordinal,
}

impl ColorMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("gradient") => Some(ColorMode::Gradient),
            n if n.eq_ignore_ascii_case("ordinal") => Some(ColorMode::Ordinal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Gradient => "gradient",
            ColorMode::Ordinal => "ordinal",
        }
    }
}

/// One settings snapshot per update pass, layered from host overrides onto the
/// defaults and passed explicitly through every pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub line_opacity: f32,
    pub sorting: SortMode,
    pub color_mode: ColorMode,
    pub scheme: Scheme,
    pub use_gradient: bool,
    pub start_color: Rgb,
    pub end_color: Rgb,
}

impl Default for Settings {
    fn default() -> Self {
        let (start_color, end_color) = default_gradient();
        Self {
            line_opacity: 0.4,
            sorting: SortMode::Size,
            color_mode: ColorMode::Ordinal,
            scheme: Scheme::Blues,
            use_gradient: true,
            start_color,
            end_color,
        }
    }
}

impl Settings {
    /// Layers host-provided overrides onto the defaults. Fields that are
    /// missing, of the wrong type, or carry unrecognized names keep their
    /// default; a settings payload never fails the render pass.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut settings = Self::default();
        if let Some(v) = value.get("lineOpacity").and_then(|v| v.as_f64()) {
            settings.line_opacity = v as f32;
        }
        if let Some(mode) = value
            .get("sorting")
            .and_then(|v| v.as_str())
            .and_then(SortMode::from_name)
        {
            settings.sorting = mode;
        }
        if let Some(mode) = value
            .get("colorSettings")
            .and_then(|v| v.as_str())
            .and_then(ColorMode::from_name)
        {
            settings.color_mode = mode;
        }
        // The original property pane shipped with the misspelled key; accept both.
        if let Some(scheme) = value
            .get("predefinedInterpolation")
            .or_else(|| value.get("predfinedInterpolation"))
            .and_then(|v| v.as_str())
            .and_then(Scheme::from_name)
        {
            settings.scheme = scheme;
        }
        if let Some(v) = value.get("useGradient").and_then(|v| v.as_bool()) {
            settings.use_gradient = v;
        }
        if let Some(color) = value
            .get("startColor")
            .and_then(|v| v.as_str())
            .and_then(|s| Rgb::parse(s).ok())
        {
            settings.start_color = color;
        }
        if let Some(color) = value
            .get("endColor")
            .and_then(|v| v.as_str())
            .and_then(|s| Rgb::parse(s).ok())
        {
            settings.end_color = color;
        }
        settings
    }
}

pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let value: serde_json::Value = json5::from_str(&contents)?;
    Ok(Settings::from_value(&value))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Number(f32),
    Toggle(bool),
    Choice(String),
    Color(String),
}

/// One editable property as the host's property pane expects it, grouped by
/// settings object.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingField {
    pub object: &'static str,
    pub name: &'static str,
    pub value: SettingValue,
}

/// Reverse mapping from the current snapshot to the enumerable instances the
/// host uses to populate its property-editing pane.
pub fn describe_settings(settings: &Settings) -> Vec<SettingField> {
    vec![
        SettingField {
            object: "alluvial",
            name: "lineOpacity",
            value: SettingValue::Number(settings.line_opacity),
        },
        SettingField {
            object: "alluvial",
            name: "sorting",
            value: SettingValue::Choice(settings.sorting.name().to_string()),
        },
        SettingField {
            object: "alluvial",
            name: "colorSettings",
            value: SettingValue::Choice(settings.color_mode.name().to_string()),
        },
        SettingField {
            object: "alluvial",
            name: "predefinedInterpolation",
            value: SettingValue::Choice(settings.scheme.name()),
        },
        SettingField {
            object: "lineGradient",
            name: "useGradient",
            value: SettingValue::Toggle(settings.use_gradient),
        },
        SettingField {
            object: "lineGradient",
            name: "startColor",
            value: SettingValue::Color(settings.start_color.to_hex()),
        },
        SettingField {
            object: "lineGradient",
            name: "endColor",
            value: SettingValue::Color(settings.end_color.to_hex()),
        },
    ]
}

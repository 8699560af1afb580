use serde::{Deserialize, Serialize};

/// Tint offsets applied by the glass filter's color matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCoefficients {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub opacity: f32,
}

impl Default for FilterCoefficients {
    fn default() -> Self {
        Self {
            r: 0.05,
            g: 0.08,
            b: 0.2,
            opacity: 0.75,
        }
    }
}

impl FilterCoefficients {
    /// Formats the coefficients as the 4x5 `feColorMatrix` value list.
    ///
    /// RGB pass through untouched with the coefficients added as offsets,
    /// alpha is scaled by `opacity`.
    pub fn color_matrix_values(&self) -> String {
        format!(
            "1 0 0 0 {r}  0 1 0 0 {g}  0 0 1 0 {b}  0 0 0 {a} 0",
            r = self.r,
            g = self.g,
            b = self.b,
            a = self.opacity
        )
    }
}

/// Ordered color stops for the two mesh-gradient layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientPalette {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

impl GradientPalette {
    /// Derives the stop order from the seven named colors.
    pub fn from_colors(colors: &PaletteColors) -> Self {
        Self {
            primary: vec![
                colors.base.clone(),
                colors.primary.clone(),
                colors.highlight.clone(),
                colors.deep.clone(),
                colors.mid.clone(),
            ],
            secondary: vec![
                colors.shadow.clone(),
                colors.highlight.clone(),
                colors.accent.clone(),
                colors.shadow.clone(),
            ],
        }
    }
}

impl Default for GradientPalette {
    fn default() -> Self {
        Self::from_colors(&PaletteColors::default())
    }
}

/// The seven named theme colors the palette is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColors {
    pub base: String,
    pub primary: String,
    pub highlight: String,
    pub deep: String,
    pub mid: String,
    pub shadow: String,
    pub accent: String,
}

impl Default for PaletteColors {
    fn default() -> Self {
        Self {
            base: "#000000".into(),
            primary: "#8b5cf6".into(),
            highlight: "#ffffff".into(),
            deep: "#1e1b4b".into(),
            mid: "#4c1d95".into(),
            shadow: "#000000".into(),
            accent: "#a78bfa".into(),
        }
    }
}

/// Everything the background needs for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTheme {
    pub filter: FilterCoefficients,
    pub palette: GradientPalette,
}

/// Named style properties consulted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    FilterR,
    FilterG,
    FilterB,
    FilterOpacity,
    Base,
    Primary,
    Highlight,
    Deep,
    Mid,
    Shadow,
    Accent,
}

/// A resolved property value. Numbers feed the filter, colors the palette.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeValue {
    Number(f32),
    Color(String),
}

impl ThemeValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Color(value) => Some(value.as_str()),
            Self::Number(_) => None,
        }
    }
}

pub const PALETTE_PRIMARY_PROPERTY: &str = "--shader-palette-primary";
pub const PALETTE_SECONDARY_PROPERTY: &str = "--shader-palette-secondary";

impl ThemeKey {
    pub const ALL: [ThemeKey; 11] = [
        ThemeKey::FilterR,
        ThemeKey::FilterG,
        ThemeKey::FilterB,
        ThemeKey::FilterOpacity,
        ThemeKey::Base,
        ThemeKey::Primary,
        ThemeKey::Highlight,
        ThemeKey::Deep,
        ThemeKey::Mid,
        ThemeKey::Shadow,
        ThemeKey::Accent,
    ];

    pub fn property_name(self) -> &'static str {
        match self {
            Self::FilterR => "--shader-filter-r",
            Self::FilterG => "--shader-filter-g",
            Self::FilterB => "--shader-filter-b",
            Self::FilterOpacity => "--shader-filter-opacity",
            Self::Base => "--shader-base",
            Self::Primary => "--shader-primary",
            Self::Highlight => "--shader-highlight",
            Self::Deep => "--shader-deep",
            Self::Mid => "--shader-mid",
            Self::Shadow => "--shader-shadow",
            Self::Accent => "--shader-accent",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::FilterR | Self::FilterG | Self::FilterB | Self::FilterOpacity
        )
    }

    /// Literal fallback used whenever the source has nothing usable.
    pub fn default_value(self) -> ThemeValue {
        let filter = FilterCoefficients::default();
        let colors = PaletteColors::default();
        match self {
            Self::FilterR => ThemeValue::Number(filter.r),
            Self::FilterG => ThemeValue::Number(filter.g),
            Self::FilterB => ThemeValue::Number(filter.b),
            Self::FilterOpacity => ThemeValue::Number(filter.opacity),
            Self::Base => ThemeValue::Color(colors.base),
            Self::Primary => ThemeValue::Color(colors.primary),
            Self::Highlight => ThemeValue::Color(colors.highlight),
            Self::Deep => ThemeValue::Color(colors.deep),
            Self::Mid => ThemeValue::Color(colors.mid),
            Self::Shadow => ThemeValue::Color(colors.shadow),
            Self::Accent => ThemeValue::Color(colors.accent),
        }
    }
}

use crate::model::{
    FilterCoefficients, GradientPalette, PaletteColors, ResolvedTheme, ThemeKey, ThemeValue,
    PALETTE_PRIMARY_PROPERTY, PALETTE_SECONDARY_PROPERTY,
};
use crate::source::ThemeSource;

/// Resolves theme properties against an injectable source, falling back to
/// literal defaults so callers never observe a missing value.
#[derive(Debug, Clone)]
pub struct ThemeResolver<S> {
    source: S,
}

impl<S: ThemeSource> ThemeResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn resolve(&self, key: ThemeKey) -> ThemeValue {
        if key.is_numeric() {
            ThemeValue::Number(self.number(key))
        } else {
            ThemeValue::Color(self.color(key))
        }
    }

    pub fn filter_coefficients(&self) -> FilterCoefficients {
        FilterCoefficients {
            r: self.number(ThemeKey::FilterR),
            g: self.number(ThemeKey::FilterG),
            b: self.number(ThemeKey::FilterB),
            opacity: self.number(ThemeKey::FilterOpacity),
        }
    }

    pub fn colors(&self) -> PaletteColors {
        PaletteColors {
            base: self.color(ThemeKey::Base),
            primary: self.color(ThemeKey::Primary),
            highlight: self.color(ThemeKey::Highlight),
            deep: self.color(ThemeKey::Deep),
            mid: self.color(ThemeKey::Mid),
            shadow: self.color(ThemeKey::Shadow),
            accent: self.color(ThemeKey::Accent),
        }
    }

    /// Explicit stop lists take precedence over the order derived from the
    /// named colors, per layer.
    pub fn palette(&self) -> GradientPalette {
        let derived = GradientPalette::from_colors(&self.colors());
        GradientPalette {
            primary: self
                .explicit_list(PALETTE_PRIMARY_PROPERTY)
                .unwrap_or(derived.primary),
            secondary: self
                .explicit_list(PALETTE_SECONDARY_PROPERTY)
                .unwrap_or(derived.secondary),
        }
    }

    pub fn resolve_theme(&self) -> ResolvedTheme {
        ResolvedTheme {
            filter: self.filter_coefficients(),
            palette: self.palette(),
        }
    }

    fn number(&self, key: ThemeKey) -> f32 {
        let fallback = key.default_value().as_number().unwrap_or_default();
        self.lookup(key, parse_unit_interval).unwrap_or(fallback)
    }

    fn color(&self, key: ThemeKey) -> String {
        self.lookup(key, parse_color).unwrap_or_else(|| {
            key.default_value()
                .as_color()
                .map(str::to_string)
                .unwrap_or_default()
        })
    }

    fn lookup<T>(&self, key: ThemeKey, parse: fn(&str) -> Result<T, String>) -> Option<T> {
        let name = key.property_name();
        let raw = self.source.property(name)?;
        match parse(&raw) {
            Ok(value) => Some(value),
            Err(reason) => {
                tracing::warn!(property = name, value = %raw, %reason, "ignoring theme override");
                None
            }
        }
    }

    fn explicit_list(&self, name: &str) -> Option<Vec<String>> {
        let raw = self.source.property(name)?;
        let mut stops = Vec::new();
        for item in split_color_list(&raw) {
            match parse_color(item) {
                Ok(color) => stops.push(color),
                Err(reason) => {
                    tracing::warn!(property = name, value = %raw, %reason, "ignoring palette override");
                    return None;
                }
            }
        }
        if stops.is_empty() {
            None
        } else {
            Some(stops)
        }
    }
}

/// Parses a coefficient that must land in `[0, 1]`.
pub fn parse_unit_interval(raw: &str) -> Result<f32, String> {
    let trimmed = raw.trim();
    let value: f32 = trimmed
        .parse()
        .map_err(|_| format!("'{trimmed}' is not a number"))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("{value} is outside [0, 1]"));
    }
    Ok(value)
}

/// Accepts hex colors, functional `rgb()/rgba()/hsl()/hsla()` notation and
/// alphabetic keywords. Returns the trimmed input unchanged.
pub fn parse_color(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("color must not be empty".into());
    }

    if let Some(hex) = trimmed.strip_prefix('#') {
        let valid_len = matches!(hex.len(), 3 | 4 | 6 | 8);
        if valid_len && hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Ok(trimmed.to_string());
        }
        return Err(format!("'{trimmed}' is not a hex color"));
    }

    let lower = trimmed.to_ascii_lowercase();
    for func in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(args) = lower.strip_prefix(func) {
            let Some(inner) = args.strip_suffix(')') else {
                return Err(format!("'{trimmed}' is missing a closing parenthesis"));
            };
            let valid = !inner.trim().is_empty()
                && inner
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || " ,.%/-".contains(ch));
            if valid {
                return Ok(trimmed.to_string());
            }
            return Err(format!("'{trimmed}' has malformed arguments"));
        }
    }

    if trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Ok(trimmed.to_string());
    }

    Err(format!("'{trimmed}' is not a recognised color"))
}

/// Splits a comma separated stop list, ignoring commas nested inside
/// functional notation such as `rgb(0, 0, 0)`.
fn split_color_list(raw: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in raw.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(raw[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    items.push(raw[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{StaticSource, Unavailable};

    #[test]
    fn defaults_when_environment_unavailable() {
        let resolver = ThemeResolver::new(Unavailable);
        let filter = resolver.filter_coefficients();
        assert_eq!(filter.r, 0.05);
        assert_eq!(filter.g, 0.08);
        assert_eq!(filter.b, 0.2);
        assert_eq!(filter.opacity, 0.75);
        assert_eq!(resolver.palette(), GradientPalette::default());
    }

    #[test]
    fn every_key_resolves_to_its_default_without_a_source() {
        let resolver = ThemeResolver::new(Unavailable);
        for key in ThemeKey::ALL {
            assert_eq!(resolver.resolve(key), key.default_value(), "{key:?}");
        }
    }

    #[test]
    fn overrides_take_precedence() {
        let source = StaticSource::new()
            .with("--shader-filter-r", "0.5")
            .with("--shader-filter-g", " 0.25 ")
            .with("--shader-filter-b", "1")
            .with("--shader-filter-opacity", "0")
            .with("--shader-primary", "rgb(10, 20, 30)");
        let resolver = ThemeResolver::new(source);
        let filter = resolver.filter_coefficients();
        assert_eq!(
            filter,
            FilterCoefficients {
                r: 0.5,
                g: 0.25,
                b: 1.0,
                opacity: 0.0
            }
        );
        assert_eq!(resolver.palette().primary[1], "rgb(10, 20, 30)");
    }

    #[test]
    fn invalid_overrides_fall_back_to_defaults() {
        let source = StaticSource::new()
            .with("--shader-filter-r", "bright")
            .with("--shader-filter-g", "1.5")
            .with("--shader-filter-b", "NaN")
            .with("--shader-base", "#12345")
            .with("--shader-accent", "");
        let resolver = ThemeResolver::new(source);
        assert_eq!(resolver.filter_coefficients(), FilterCoefficients::default());
        let colors = resolver.colors();
        assert_eq!(colors.base, "#000000");
        assert_eq!(colors.accent, "#a78bfa");
    }

    #[test]
    fn explicit_palette_order_is_preserved() {
        let forward = ThemeResolver::new(
            StaticSource::new().with(PALETTE_PRIMARY_PROPERTY, "#111111, rgb(1, 2, 3), red"),
        );
        let reversed = ThemeResolver::new(
            StaticSource::new().with(PALETTE_PRIMARY_PROPERTY, "red, rgb(1, 2, 3), #111111"),
        );
        let forward_stops = forward.palette().primary;
        let mut reversed_stops = reversed.palette().primary;
        assert_eq!(forward_stops, vec!["#111111", "rgb(1, 2, 3)", "red"]);
        reversed_stops.reverse();
        assert_eq!(forward_stops, reversed_stops);
        assert_eq!(forward.palette().secondary, GradientPalette::default().secondary);
    }

    #[test]
    fn named_colors_drive_derived_order() {
        let resolver = ThemeResolver::new(
            StaticSource::new()
                .with("--shader-shadow", "#010101")
                .with("--shader-accent", "#020202"),
        );
        assert_eq!(
            resolver.palette().secondary,
            vec!["#010101", "#ffffff", "#020202", "#010101"]
        );
    }

    #[test]
    fn malformed_explicit_list_is_ignored() {
        let resolver =
            ThemeResolver::new(StaticSource::new().with(PALETTE_SECONDARY_PROPERTY, "#fff, #zz"));
        assert_eq!(resolver.palette().secondary, GradientPalette::default().secondary);
    }

    #[test]
    fn color_parser_accepts_common_forms() {
        assert!(parse_color("#abc").is_ok());
        assert!(parse_color("#a1b2c3d4").is_ok());
        assert!(parse_color("hsl(250, 80%, 60%)").is_ok());
        assert!(parse_color("rgba(0 0 0 / 50%)").is_ok());
        assert!(parse_color("transparent").is_ok());
        assert!(parse_color("rgb(0, 0, 0").is_err());
        assert!(parse_color("url(#x)").is_err());
    }
}

//! Theme resolution for the Momentum shader backdrop.
//!
//! Every value the background needs (filter tint coefficients and the two
//! ordered gradient palettes) is looked up through a [`ThemeSource`] and
//! replaced by a literal default when the source has nothing usable, so
//! rendering never depends on a styling environment being present.

mod file;
mod model;
mod resolver;
mod source;

pub use file::{
    AnimationSettings, BuildMode, ColorOverrides, FilterOverrides, LayerOverride, LayerOverrides,
    PaletteOverrides, ThemeFile, MAX_ANIMATION_CYCLE,
};
pub use model::{
    FilterCoefficients, GradientPalette, PaletteColors, ResolvedTheme, ThemeKey, ThemeValue,
    PALETTE_PRIMARY_PROPERTY, PALETTE_SECONDARY_PROPERTY,
};
pub use resolver::{parse_color, parse_unit_interval, ThemeResolver};
pub use source::{EnvSource, LayeredSource, StaticSource, ThemeSource, Unavailable, ENV_PREFIX};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse theme file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid theme file: {0}")]
    Invalid(String),
}

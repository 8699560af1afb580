use std::time::Duration;

use themeconfig::{GradientPalette, LayerOverride, ThemeFile, MAX_ANIMATION_CYCLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Primary,
    Secondary,
}

impl LayerRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// Opacity and speed factor for one gradient layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub opacity: f32,
    pub speed: f32,
}

impl LayerStyle {
    fn with_override(self, layer: &LayerOverride) -> Self {
        Self {
            opacity: layer.opacity.unwrap_or(self.opacity),
            speed: layer.speed.unwrap_or(self.speed),
        }
    }
}

/// Layer styling plus animation timing shared by the full renderer and the
/// skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    pub primary: LayerStyle,
    pub secondary: LayerStyle,
    /// Base cycle length; a layer with speed `s` completes one cycle in
    /// `period / s`.
    pub period: Duration,
    /// Skeleton pulse cycle.
    pub pulse: Duration,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            primary: LayerStyle {
                opacity: 1.0,
                speed: 0.3,
            },
            secondary: LayerStyle {
                opacity: 0.6,
                speed: 0.2,
            },
            period: Duration::from_secs(20),
            pulse: Duration::from_secs(2),
        }
    }
}

impl LayerSettings {
    pub fn from_theme_file(file: &ThemeFile) -> Self {
        let defaults = Self::default();
        Self {
            primary: defaults.primary.with_override(&file.layers.primary),
            secondary: defaults.secondary.with_override(&file.layers.secondary),
            period: file.animation.period,
            pulse: file.animation.pulse,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientLayer {
    pub role: LayerRole,
    pub colors: Vec<String>,
    pub opacity: f32,
    pub speed: f32,
}

impl GradientLayer {
    /// Time for one full animation cycle at this layer's speed, capped at
    /// [`MAX_ANIMATION_CYCLE`].
    pub fn cycle(&self, period: Duration) -> Duration {
        if self.speed.is_nan() || self.speed <= 0.0 {
            return period.min(MAX_ANIMATION_CYCLE);
        }
        Duration::try_from_secs_f32(period.as_secs_f32() / self.speed)
            .map_or(MAX_ANIMATION_CYCLE, |cycle| cycle.min(MAX_ANIMATION_CYCLE))
    }
}

/// Builds the two layers in stacking order: primary first, secondary drawn
/// on top of it.
pub fn layers_for(palette: &GradientPalette, settings: &LayerSettings) -> [GradientLayer; 2] {
    [
        GradientLayer {
            role: LayerRole::Primary,
            colors: palette.primary.clone(),
            opacity: settings.primary.opacity,
            speed: settings.primary.speed,
        },
        GradientLayer {
            role: LayerRole::Secondary,
            colors: palette.secondary.clone(),
            opacity: settings.secondary.opacity,
            speed: settings.secondary.speed,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layers_match_reference_styling() {
        let [primary, secondary] = layers_for(&GradientPalette::default(), &LayerSettings::default());
        assert_eq!(primary.role, LayerRole::Primary);
        assert_eq!(primary.opacity, 1.0);
        assert_eq!(primary.speed, 0.3);
        assert_eq!(secondary.role, LayerRole::Secondary);
        assert_eq!(secondary.opacity, 0.6);
        assert_eq!(secondary.speed, 0.2);
    }

    #[test]
    fn slower_layers_take_longer_cycles() {
        let [primary, secondary] = layers_for(&GradientPalette::default(), &LayerSettings::default());
        let period = Duration::from_secs(20);
        assert!(secondary.cycle(period) > primary.cycle(period));
        assert_eq!(primary.cycle(period).as_secs(), 66);
    }

    #[test]
    fn extreme_speeds_are_capped() {
        let period = Duration::from_secs(20);
        let mut layer = layers_for(&GradientPalette::default(), &LayerSettings::default())[0].clone();

        layer.speed = 1e-30;
        assert_eq!(layer.cycle(period), MAX_ANIMATION_CYCLE);

        layer.speed = f32::MIN_POSITIVE;
        assert_eq!(layer.cycle(period), MAX_ANIMATION_CYCLE);

        layer.speed = f32::NAN;
        assert_eq!(layer.cycle(period), period);

        layer.speed = 0.3;
        assert_eq!(layer.cycle(Duration::MAX), MAX_ANIMATION_CYCLE);
    }

    #[test]
    fn theme_file_overrides_layer_styles() {
        let file = ThemeFile::from_toml_str(
            "version = 1\n[layers.secondary]\nopacity = 0.4\n[animation]\nperiod = \"10s\"\n",
        )
        .unwrap();
        let settings = LayerSettings::from_theme_file(&file);
        assert_eq!(settings.secondary.opacity, 0.4);
        assert_eq!(settings.secondary.speed, 0.2);
        assert_eq!(settings.primary, LayerSettings::default().primary);
        assert_eq!(settings.period, Duration::from_secs(10));
    }
}

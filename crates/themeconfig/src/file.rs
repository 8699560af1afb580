use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::model::{ThemeKey, PALETTE_PRIMARY_PROPERTY, PALETTE_SECONDARY_PROPERTY};
use crate::source::ThemeSource;
use crate::ConfigError;

/// Whether diagnostics meant for developers may be shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl BuildMode {
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Parses the usual spellings of a deployment environment name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "debug" => Some(Self::Development),
            "production" | "prod" | "release" => Some(Self::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeFile {
    pub version: u32,
    #[serde(default)]
    pub mode: Option<BuildMode>,
    #[serde(default)]
    pub filter: FilterOverrides,
    #[serde(default)]
    pub colors: ColorOverrides,
    #[serde(default)]
    pub palette: PaletteOverrides,
    #[serde(default)]
    pub layers: LayerOverrides,
    #[serde(default)]
    pub animation: AnimationSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterOverrides {
    pub r: Option<f32>,
    pub g: Option<f32>,
    pub b: Option<f32>,
    pub opacity: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ColorOverrides {
    pub base: Option<String>,
    pub primary: Option<String>,
    pub highlight: Option<String>,
    pub deep: Option<String>,
    pub mid: Option<String>,
    pub shadow: Option<String>,
    pub accent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaletteOverrides {
    pub primary: Option<Vec<String>>,
    pub secondary: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LayerOverrides {
    #[serde(default)]
    pub primary: LayerOverride,
    #[serde(default)]
    pub secondary: LayerOverride,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LayerOverride {
    pub opacity: Option<f32>,
    pub speed: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnimationSettings {
    #[serde(default = "default_period", deserialize_with = "deserialize_duration")]
    pub period: Duration,
    #[serde(default = "default_pulse", deserialize_with = "deserialize_duration")]
    pub pulse: Duration,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            period: default_period(),
            pulse: default_pulse(),
        }
    }
}

/// Longest animation cycle a layer may take (`period / speed`).
pub const MAX_ANIMATION_CYCLE: Duration = Duration::from_secs(24 * 60 * 60);

fn default_period() -> Duration {
    Duration::from_secs(20)
}

fn default_pulse() -> Duration {
    Duration::from_secs(2)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl ThemeFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ThemeFile = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported theme version {}; expected 1",
                self.version
            )));
        }

        let unit_values = [
            ("filter.r", self.filter.r),
            ("filter.g", self.filter.g),
            ("filter.b", self.filter.b),
            ("filter.opacity", self.filter.opacity),
            ("layers.primary.opacity", self.layers.primary.opacity),
            ("layers.secondary.opacity", self.layers.secondary.opacity),
        ];
        for (name, value) in unit_values {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be within [0, 1], got {value}"
                    )));
                }
            }
        }

        for (name, speed) in [
            ("layers.primary.speed", self.layers.primary.speed),
            ("layers.secondary.speed", self.layers.secondary.speed),
        ] {
            if let Some(speed) = speed {
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be greater than zero"
                    )));
                }
                let cycle = self.animation.period.as_secs_f64() / f64::from(speed);
                if cycle > MAX_ANIMATION_CYCLE.as_secs_f64() {
                    return Err(ConfigError::Invalid(format!(
                        "{name} = {speed} makes one cycle last {cycle:.0}s; the limit is {}s",
                        MAX_ANIMATION_CYCLE.as_secs()
                    )));
                }
            }
        }

        for (name, list) in [
            ("palette.primary", &self.palette.primary),
            ("palette.secondary", &self.palette.secondary),
        ] {
            if let Some(list) = list {
                if list.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must contain at least one color"
                    )));
                }
                if let Some(bad) = list.iter().find(|color| crate::parse_color(color).is_err()) {
                    return Err(ConfigError::Invalid(format!(
                        "{name} contains an invalid color '{bad}'"
                    )));
                }
            }
        }

        if self.animation.period.is_zero() {
            return Err(ConfigError::Invalid(
                "animation.period must be greater than zero".into(),
            ));
        }
        if self.animation.period > MAX_ANIMATION_CYCLE {
            return Err(ConfigError::Invalid(format!(
                "animation.period must not exceed {}s",
                MAX_ANIMATION_CYCLE.as_secs()
            )));
        }
        if self.animation.pulse.is_zero() {
            return Err(ConfigError::Invalid(
                "animation.pulse must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    fn color(&self, key: ThemeKey) -> Option<&String> {
        let colors = &self.colors;
        match key {
            ThemeKey::Base => colors.base.as_ref(),
            ThemeKey::Primary => colors.primary.as_ref(),
            ThemeKey::Highlight => colors.highlight.as_ref(),
            ThemeKey::Deep => colors.deep.as_ref(),
            ThemeKey::Mid => colors.mid.as_ref(),
            ThemeKey::Shadow => colors.shadow.as_ref(),
            ThemeKey::Accent => colors.accent.as_ref(),
            _ => None,
        }
    }

    fn number(&self, key: ThemeKey) -> Option<f32> {
        match key {
            ThemeKey::FilterR => self.filter.r,
            ThemeKey::FilterG => self.filter.g,
            ThemeKey::FilterB => self.filter.b,
            ThemeKey::FilterOpacity => self.filter.opacity,
            _ => None,
        }
    }
}

impl ThemeSource for ThemeFile {
    fn property(&self, name: &str) -> Option<String> {
        if name == PALETTE_PRIMARY_PROPERTY {
            return self.palette.primary.as_ref().map(|list| list.join(", "));
        }
        if name == PALETTE_SECONDARY_PROPERTY {
            return self.palette.secondary.as_ref().map(|list| list.join(", "));
        }

        let key = ThemeKey::ALL
            .into_iter()
            .find(|key| key.property_name() == name)?;
        if key.is_numeric() {
            self.number(key).map(|value| value.to_string())
        } else {
            self.color(key).cloned()
        }
    }
}

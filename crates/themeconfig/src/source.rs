use std::collections::BTreeMap;
use std::env;

/// Capability that answers named style property lookups.
///
/// A source returning `None` is not a failure; the resolver substitutes the
/// documented default for that property.
pub trait ThemeSource {
    fn property(&self, name: &str) -> Option<String>;
}

impl<S: ThemeSource + ?Sized> ThemeSource for &S {
    fn property(&self, name: &str) -> Option<String> {
        (**self).property(name)
    }
}

impl<S: ThemeSource + ?Sized> ThemeSource for Box<S> {
    fn property(&self, name: &str) -> Option<String> {
        (**self).property(name)
    }
}

/// Source used when no styling environment exists (headless rendering).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl ThemeSource for Unavailable {
    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}

/// In-memory property table.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    properties: BTreeMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for StaticSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ThemeSource for StaticSource {
    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }
}

pub const ENV_PREFIX: &str = "MOMENTUM_";

/// Reads properties from the process environment.
///
/// `--shader-filter-r` is looked up as `MOMENTUM_SHADER_FILTER_R`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl EnvSource {
    pub fn variable_name(property: &str) -> String {
        let trimmed = property.trim_start_matches('-');
        let mut name = String::with_capacity(ENV_PREFIX.len() + trimmed.len());
        name.push_str(ENV_PREFIX);
        for ch in trimmed.chars() {
            if ch == '-' {
                name.push('_');
            } else {
                name.push(ch.to_ascii_uppercase());
            }
        }
        name
    }
}

impl ThemeSource for EnvSource {
    fn property(&self, name: &str) -> Option<String> {
        match env::var(Self::variable_name(name)) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            _ => None,
        }
    }
}

/// Ordered chain of sources; the first one with a value wins.
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn ThemeSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, source: impl ThemeSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ThemeSource for LayeredSource {
    fn property(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.property(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_follow_property_names() {
        assert_eq!(
            EnvSource::variable_name("--shader-filter-opacity"),
            "MOMENTUM_SHADER_FILTER_OPACITY"
        );
        assert_eq!(EnvSource::variable_name("--shader-base"), "MOMENTUM_SHADER_BASE");
    }

    #[test]
    fn layered_source_prefers_earlier_layers() {
        let source = LayeredSource::new()
            .push(StaticSource::new().with("--shader-base", "#111111"))
            .push(
                StaticSource::new()
                    .with("--shader-base", "#222222")
                    .with("--shader-mid", "#333333"),
            )
            .push(Unavailable);

        assert_eq!(source.property("--shader-base").as_deref(), Some("#111111"));
        assert_eq!(source.property("--shader-mid").as_deref(), Some("#333333"));
        assert_eq!(source.property("--shader-deep"), None);
        assert_eq!(source.len(), 3);
    }
}

use themeconfig::ResolvedTheme;

use crate::filters::filter_defs;
use crate::layers::{layers_for, GradientLayer, LayerSettings};
use crate::markup::{Element, Node};
use crate::renderer::{GradientRenderer, RenderError};

pub const ROOT_CLASS: &str = "shader-background";
pub const CONTENT_CLASS: &str = "shader-content";

/// Full animated background: filter definitions, the two gradient layers
/// and the page content stacked above them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderBackground {
    children: Vec<Node>,
}

impl ShaderBackground {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn layers(theme: &ResolvedTheme, settings: &LayerSettings) -> [GradientLayer; 2] {
        layers_for(&theme.palette, settings)
    }

    /// Mounts `renderer` with the layers derived from `theme`.
    pub fn mount(
        theme: &ResolvedTheme,
        settings: &LayerSettings,
        renderer: &mut dyn GradientRenderer,
    ) -> Result<(), RenderError> {
        renderer.mount(&Self::layers(theme, settings))
    }

    /// Composes the full background around an already mounted renderer.
    pub fn compose(
        &self,
        theme: &ResolvedTheme,
        settings: &LayerSettings,
        renderer: &mut dyn GradientRenderer,
    ) -> Result<Element, RenderError> {
        let layers = Self::layers(theme, settings);
        let stage = renderer.render(&layers, settings.period)?;
        Ok(frame(
            "ready",
            Some(filter_defs(&theme.filter)),
            stage,
            &self.children,
        ))
    }
}

/// Common outer structure every tier renders into so the content container
/// keeps the same position regardless of which backdrop is active.
pub(crate) fn frame(
    state: &str,
    defs: Option<Element>,
    stage: Element,
    children: &[Node],
) -> Element {
    let mut root = Element::new("div")
        .attr("class", ROOT_CLASS)
        .attr("data-state", state)
        .attr(
            "style",
            "position:relative;min-height:100vh;width:100%;overflow:hidden",
        );
    if let Some(defs) = defs {
        root.push(defs);
    }
    root.child(stage).child(
        Element::new("div")
            .attr("class", CONTENT_CLASS)
            .attr("style", "position:relative;z-index:10")
            .children(children.iter().cloned()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{GLASS_EFFECT_ID, GOOEY_FILTER_ID};
    use crate::renderer::SvgMeshRenderer;

    #[test]
    fn composes_filters_layers_and_content() {
        let theme = ResolvedTheme::default();
        let settings = LayerSettings::default();
        let mut renderer = SvgMeshRenderer::new();
        ShaderBackground::mount(&theme, &settings, &mut renderer).unwrap();

        let background = ShaderBackground::new(vec![Element::new("h1").text("Momentum").into()]);
        let tree = background.compose(&theme, &settings, &mut renderer).unwrap();

        assert_eq!(tree.attribute("data-state"), Some("ready"));
        assert_eq!(tree.count_id(GLASS_EFFECT_ID), 1);
        assert_eq!(tree.count_id(GOOEY_FILTER_ID), 1);
        assert!(tree.find_by_class("mesh-gradient-primary").is_some());
        assert!(tree.find_by_class("mesh-gradient-secondary").is_some());

        let last = tree.child_elements().last().unwrap();
        assert_eq!(last.attribute("class"), Some(CONTENT_CLASS));
        assert_eq!(last.text_content(), "Momentum");
    }

    #[test]
    fn compose_surfaces_renderer_errors() {
        let theme = ResolvedTheme::default();
        let settings = LayerSettings::default();
        let mut renderer = SvgMeshRenderer::new();
        let err = ShaderBackground::default()
            .compose(&theme, &settings, &mut renderer)
            .unwrap_err();
        assert!(matches!(err, RenderError::Render(_)));
    }
}

use std::time::Duration;

use crate::layers::GradientLayer;
use crate::markup::{format_number, Element};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("graphics context unsupported: {0}")]
    Unsupported(String),
    #[error("gradient renderer failed to initialise: {0}")]
    Init(String),
    #[error("gradient renderer failed: {0}")]
    Render(String),
    #[error("gradient renderer panicked: {0}")]
    Panicked(String),
    #[error("failed to write markup: {0}")]
    Markup(String),
}

/// The animated gradient stage behind the page content.
///
/// `mount` acquires whatever context the implementation needs, `render`
/// produces the layer markup for the current pass and `release` tears the
/// context down. A retry never reuses an instance: the owner releases it and
/// builds a new one.
pub trait GradientRenderer {
    fn name(&self) -> &str {
        "gradient"
    }

    fn mount(&mut self, layers: &[GradientLayer]) -> Result<(), RenderError>;

    fn render(
        &mut self,
        layers: &[GradientLayer],
        period: Duration,
    ) -> Result<Element, RenderError>;

    fn release(&mut self) {}
}

pub type BoxedRenderer = Box<dyn GradientRenderer>;

/// Draws each layer as a slowly rotating radial gradient.
#[derive(Debug, Default)]
pub struct SvgMeshRenderer {
    mounted: bool,
}

impl SvgMeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn layer_element(layer: &GradientLayer, period: Duration) -> Element {
        let role = layer.role.as_str();
        let gradient_id = format!("mesh-{role}");
        let cycle = layer.cycle(period);

        let stops = stop_offsets(layer.colors.len())
            .into_iter()
            .zip(&layer.colors)
            .map(|(offset, color)| {
                Element::new("stop")
                    .attr("offset", format!("{}%", format_number(offset)))
                    .attr("stop-color", color.as_str())
            });

        let gradient = Element::new("radialGradient")
            .attr("id", gradient_id.as_str())
            .attr("cx", "50%")
            .attr("cy", "50%")
            .attr("r", "75%")
            .children(stops)
            .child(
                Element::new("animateTransform")
                    .attr("attributeName", "gradientTransform")
                    .attr("type", "rotate")
                    .attr("from", "0 0.5 0.5")
                    .attr("to", "360 0.5 0.5")
                    .attr("dur", format!("{}s", format_number(cycle.as_secs_f32())))
                    .attr("repeatCount", "indefinite"),
            );

        Element::new("div")
            .attr("class", format!("mesh-gradient mesh-gradient-{role}"))
            .attr("data-layer", role)
            .attr("data-speed", format_number(layer.speed))
            .attr(
                "style",
                format!(
                    "position:absolute;inset:0;width:100%;height:100%;opacity:{}",
                    format_number(layer.opacity)
                ),
            )
            .child(
                Element::new("svg")
                    .attr("width", "100%")
                    .attr("height", "100%")
                    .attr("viewBox", "0 0 100 100")
                    .attr("preserveAspectRatio", "none")
                    .child(Element::new("defs").child(gradient))
                    .child(
                        Element::new("rect")
                            .attr("width", "100")
                            .attr("height", "100")
                            .attr("fill", format!("url(#{gradient_id})")),
                    ),
            )
    }
}

impl GradientRenderer for SvgMeshRenderer {
    fn name(&self) -> &str {
        "svg-mesh"
    }

    fn mount(&mut self, layers: &[GradientLayer]) -> Result<(), RenderError> {
        if let Some(empty) = layers.iter().find(|layer| layer.colors.is_empty()) {
            return Err(RenderError::Init(format!(
                "{} layer has no color stops",
                empty.role.as_str()
            )));
        }
        self.mounted = true;
        tracing::debug!(layers = layers.len(), "svg mesh renderer mounted");
        Ok(())
    }

    fn render(
        &mut self,
        layers: &[GradientLayer],
        period: Duration,
    ) -> Result<Element, RenderError> {
        if !self.mounted {
            return Err(RenderError::Render("renderer is not mounted".into()));
        }
        Ok(Element::new("div")
            .attr("class", "shader-layers")
            .attr("aria-hidden", "true")
            .children(layers.iter().map(|layer| Self::layer_element(layer, period))))
    }

    fn release(&mut self) {
        self.mounted = false;
    }
}

/// Evenly spaced stop offsets in percent, preserving stop order.
pub fn stop_offsets(count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (count - 1) as f32;
            (0..count).map(|i| i as f32 / last * 100.0).collect()
        }
    }
}

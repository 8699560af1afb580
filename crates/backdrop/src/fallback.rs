use std::fmt;

use themeconfig::{BuildMode, PaletteColors, ResolvedTheme};

use crate::background::frame;
use crate::filters::filter_defs;
use crate::layers::LayerSettings;
use crate::markup::{format_number, Element, Node};
use crate::renderer::{stop_offsets, RenderError};

pub const NOTICE_TITLE: &str = "Visual effects unavailable";
pub const NOTICE_DETAIL: &str = "Using fallback graphics";
pub const LOADING_TEXT: &str = "Loading visual effects...";
pub const RETRY_LABEL: &str = "Retry";
/// Characters of the raw error shown in development builds.
pub const ERROR_MESSAGE_LIMIT: usize = 100;

const PULSE_KEYFRAMES: &str =
    "@keyframes shader-pulse { 0%, 100% { opacity: 0.4; } 50% { opacity: 0.8; } }";

pub type RetryCallback = Box<dyn FnMut()>;

/// What a boundary hands to its fallback: the content to keep visible, the
/// error that triggered the swap, and an optional way to try again.
#[derive(Default)]
pub struct FallbackProps {
    pub children: Vec<Node>,
    pub error: Option<RenderError>,
    pub on_retry: Option<RetryCallback>,
}

impl FallbackProps {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            error: None,
            on_retry: None,
        }
    }

    pub fn with_error(mut self, error: RenderError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_retry(mut self, on_retry: impl FnMut() + 'static) -> Self {
        self.on_retry = Some(Box::new(on_retry));
        self
    }

    pub fn has_retry(&self) -> bool {
        self.on_retry.is_some()
    }

    /// Invokes the retry callback once. Returns false when none was supplied.
    pub fn click_retry(&mut self) -> bool {
        match self.on_retry.as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for FallbackProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackProps")
            .field("children", &self.children.len())
            .field("error", &self.error)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

/// A tier rendered in place of the failed renderer. Implementations may fail;
/// the boundary then drops to [`MinimalErrorFallback`].
pub trait Fallback {
    fn render(&self, props: &FallbackProps) -> Result<Element, RenderError>;
}

/// Static stand-in shown after the renderer failed.
#[derive(Debug, Clone, Default)]
pub struct ShaderErrorFallback {
    mode: BuildMode,
    theme: ResolvedTheme,
}

impl ShaderErrorFallback {
    pub fn new(mode: BuildMode, theme: ResolvedTheme) -> Self {
        Self { mode, theme }
    }

    fn notice(&self, props: &FallbackProps) -> Element {
        let mut notice = Element::new("div")
            .attr("class", "shader-notice")
            .attr("role", "status")
            .attr(
                "style",
                "position:fixed;bottom:1rem;right:1rem;z-index:50;max-width:20rem",
            )
            .child(
                Element::new("p")
                    .attr("class", "shader-notice-title")
                    .text(NOTICE_TITLE),
            )
            .child(
                Element::new("p")
                    .attr("class", "shader-notice-detail")
                    .text(NOTICE_DETAIL),
            );

        if self.mode.is_development() {
            if let Some(error) = &props.error {
                notice.push(
                    Element::new("pre")
                        .attr("class", "shader-notice-error")
                        .text(truncate_message(&error.to_string(), ERROR_MESSAGE_LIMIT)),
                );
            }
        }

        if props.has_retry() {
            notice.push(
                Element::new("button")
                    .attr("type", "button")
                    .attr("class", "shader-notice-retry")
                    .attr("data-action", "retry")
                    .text(RETRY_LABEL),
            );
        }

        notice
    }
}

impl Fallback for ShaderErrorFallback {
    fn render(&self, props: &FallbackProps) -> Result<Element, RenderError> {
        let stage = Element::new("div")
            .attr("class", "shader-static")
            .attr("aria-hidden", "true")
            .attr(
                "style",
                format!(
                    "position:absolute;inset:0;background:{}",
                    radial_gradient(&self.theme.palette.primary)
                ),
            );
        let mut root = frame(
            "failed",
            Some(filter_defs(&self.theme.filter)),
            stage,
            &props.children,
        );
        root.push(self.notice(props));
        Ok(root)
    }
}

/// Last resort: a flat gradient behind the content, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalErrorFallback;

impl MinimalErrorFallback {
    pub fn render(children: &[Node]) -> Element {
        let colors = PaletteColors::default();
        let stage = Element::new("div")
            .attr("class", "shader-minimal")
            .attr("aria-hidden", "true")
            .attr(
                "style",
                format!(
                    "position:absolute;inset:0;background:linear-gradient(135deg, {}, {})",
                    colors.deep, colors.base
                ),
            );
        frame("minimal", None, stage, children)
    }
}

/// Placeholder shown while the renderer has not mounted yet.
#[derive(Debug, Clone, Default)]
pub struct ShaderSkeleton {
    theme: ResolvedTheme,
    settings: LayerSettings,
}

impl ShaderSkeleton {
    pub fn new(theme: ResolvedTheme, settings: LayerSettings) -> Self {
        Self { theme, settings }
    }

    pub fn render(&self, children: &[Node]) -> Element {
        let pulse = format_number(self.settings.pulse.as_secs_f32());
        let stage = Element::new("div")
            .attr("class", "shader-skeleton")
            .attr("aria-hidden", "true")
            .child(Element::new("style").text(PULSE_KEYFRAMES))
            .child(
                Element::new("div")
                    .attr("class", "shader-skeleton-base")
                    .attr(
                        "style",
                        format!(
                            "position:absolute;inset:0;background:{}",
                            linear_gradient(&self.theme.palette.primary)
                        ),
                    ),
            )
            .child(
                Element::new("div")
                    .attr("class", "shader-skeleton-overlay")
                    .attr(
                        "style",
                        format!(
                            "position:absolute;inset:0;opacity:{};background:{}",
                            format_number(self.settings.secondary.opacity),
                            radial_gradient(&self.theme.palette.secondary)
                        ),
                    ),
            )
            .child(
                Element::new("div")
                    .attr("class", "shader-pulse")
                    .attr(
                        "style",
                        format!(
                            "position:absolute;inset:0;animation:shader-pulse {pulse}s ease-in-out infinite"
                        ),
                    ),
            );

        let mut root = frame(
            "loading",
            Some(filter_defs(&self.theme.filter)),
            stage,
            children,
        );
        root.push(
            Element::new("div")
                .attr("class", "shader-loading")
                .attr("role", "status")
                .attr("aria-live", "polite")
                .attr("style", "position:fixed;bottom:1rem;right:1rem;z-index:50")
                .text(LOADING_TEXT),
        );
        root
    }
}

fn gradient_stops(colors: &[String]) -> String {
    stop_offsets(colors.len())
        .into_iter()
        .zip(colors)
        .map(|(offset, color)| format!("{color} {}%", format_number(offset)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn radial_gradient(colors: &[String]) -> String {
    format!("radial-gradient(ellipse at 30% 20%, {})", gradient_stops(colors))
}

fn linear_gradient(colors: &[String]) -> String {
    format!("linear-gradient(135deg, {})", gradient_stops(colors))
}

/// Cuts `message` to at most `limit` characters, marking the cut.
pub fn truncate_message(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let mut cut: String = message.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{GLASS_EFFECT_ID, GOOEY_FILTER_ID};
    use std::cell::Cell;
    use std::rc::Rc;

    fn content() -> Vec<Node> {
        vec![Element::new("main").text("Plan your day").into()]
    }

    fn webgl_error() -> RenderError {
        RenderError::Unsupported("WebGL not supported".into())
    }

    #[test]
    fn error_fallback_shows_notice_and_filters() {
        let fallback = ShaderErrorFallback::default();
        let tree = fallback
            .render(&FallbackProps::new(content()).with_error(webgl_error()))
            .unwrap();
        assert!(tree.contains_text(NOTICE_TITLE));
        assert!(tree.contains_text(NOTICE_DETAIL));
        assert!(tree.contains_text("Plan your day"));
        assert_eq!(tree.count_id(GLASS_EFFECT_ID), 1);
        assert_eq!(tree.count_id(GOOEY_FILTER_ID), 1);
        assert!(tree
            .find_by_class("shader-static")
            .and_then(|e| e.attribute("style"))
            .is_some_and(|style| style.contains("radial-gradient")));
    }

    #[test]
    fn retry_control_only_with_callback() {
        let fallback = ShaderErrorFallback::default();
        let without = fallback.render(&FallbackProps::new(content())).unwrap();
        assert!(without.find_by_class("shader-notice-retry").is_none());

        let with = fallback
            .render(&FallbackProps::new(content()).with_retry(|| {}))
            .unwrap();
        let button = with.find_by_class("shader-notice-retry").unwrap();
        assert_eq!(button.text_content(), RETRY_LABEL);
    }

    #[test]
    fn click_retry_invokes_callback_once_per_click() {
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let mut props = FallbackProps::new(content()).with_retry(move || counter.set(counter.get() + 1));

        assert!(props.click_retry());
        assert_eq!(clicks.get(), 1);
        assert!(props.click_retry());
        assert_eq!(clicks.get(), 2);

        let mut no_retry = FallbackProps::new(content());
        assert!(!no_retry.click_retry());
    }

    #[test]
    fn development_mode_surfaces_error_message() {
        let props = FallbackProps::new(content()).with_error(webgl_error());

        let dev = ShaderErrorFallback::new(BuildMode::Development, ResolvedTheme::default());
        assert!(dev.render(&props).unwrap().contains_text("WebGL not supported"));

        let prod = ShaderErrorFallback::new(BuildMode::Production, ResolvedTheme::default());
        let tree = prod.render(&props).unwrap();
        assert!(!tree.contains_text("WebGL not supported"));
        assert!(!tree.render().unwrap().contains("WebGL not supported"));
    }

    #[test]
    fn development_message_is_truncated() {
        let long = "x".repeat(300);
        let props = FallbackProps::new(Vec::new()).with_error(RenderError::Render(long));
        let dev = ShaderErrorFallback::new(BuildMode::Development, ResolvedTheme::default());
        let tree = dev.render(&props).unwrap();
        let shown = tree.find_by_class("shader-notice-error").unwrap().text_content();
        assert_eq!(shown.chars().count(), ERROR_MESSAGE_LIMIT + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn minimal_fallback_is_isolated_from_errors() {
        let tree = MinimalErrorFallback::render(&content());
        assert!(tree.contains_text("Plan your day"));
        assert!(!tree.contains_text(NOTICE_TITLE));
        assert!(tree.find_by_id(GLASS_EFFECT_ID).is_none());
        assert!(tree.find_by_id(GOOEY_FILTER_ID).is_none());
        assert_eq!(tree.attribute("data-state"), Some("minimal"));
    }

    #[test]
    fn skeleton_keeps_filter_ids_and_loading_text() {
        let skeleton = ShaderSkeleton::default();
        let tree = skeleton.render(&content());
        assert_eq!(tree.count_id(GLASS_EFFECT_ID), 1);
        assert_eq!(tree.count_id(GOOEY_FILTER_ID), 1);
        assert!(tree.contains_text(LOADING_TEXT));
        assert!(tree.contains_text("Plan your day"));
        assert!(!tree.contains_text(NOTICE_TITLE));
        let pulse = tree.find_by_class("shader-pulse").unwrap();
        assert!(pulse.attribute("style").unwrap().contains("shader-pulse 2s"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_message("short", 10), "short");
        assert_eq!(truncate_message("ééééé", 2), "éé...");
    }
}

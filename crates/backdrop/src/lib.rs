//! Markup composition for the Momentum shader backdrop.
//!
//! The crate turns a [`themeconfig::ResolvedTheme`] into the page background
//! and owns every tier of the degradation ladder:
//!
//! ```text
//!   ResolvedTheme ──▶ layers_for() ──▶ GradientRenderer::render ──▶ ShaderBackground
//!        │                                       │ (error or panic)
//!        │                                       ▼
//!        └──────────────▶ ShaderSkeleton   ShaderErrorFallback ──▶ MinimalErrorFallback
//! ```
//!
//! Every tier keeps the page content in the same container, and every tier
//! except the minimal one declares the shared `glass-effect` and
//! `gooey-filter` definitions so elements referencing them never render
//! unstyled. Choosing the tier is left to the caller (see the `boundary`
//! crate).

mod background;
mod fallback;
mod filters;
mod gpu;
mod layers;
mod markup;
mod renderer;

pub use background::{ShaderBackground, CONTENT_CLASS, ROOT_CLASS};
pub use fallback::{
    truncate_message, Fallback, FallbackProps, MinimalErrorFallback, RetryCallback,
    ShaderErrorFallback, ShaderSkeleton, ERROR_MESSAGE_LIMIT, LOADING_TEXT, NOTICE_DETAIL,
    NOTICE_TITLE, RETRY_LABEL,
};
pub use filters::{
    filter_defs, glass_effect, gooey_filter, CompositeOperator, FilterDefinition,
    FilterPrimitive, GLASS_EFFECT_ID, GOOEY_FILTER_ID,
};
#[cfg(feature = "gpu-probe")]
pub use gpu::probe_adapter;
pub use gpu::{AdapterSummary, GpuGatedRenderer, ProbeFn};
pub use layers::{layers_for, GradientLayer, LayerRole, LayerSettings, LayerStyle};
pub use markup::{format_number, Element, Node};
pub use renderer::{stop_offsets, BoxedRenderer, GradientRenderer, RenderError, SvgMeshRenderer};

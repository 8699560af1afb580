//! Failure isolation for the shader backdrop.
//!
//! [`Boundary`] owns the renderer lifecycle: it mounts a fresh renderer per
//! attempt, defers theme resolution through a [`DeferredQueue`], and walks
//! the [`RenderState`] machine as the renderer mounts, fails, or is retried.
//! Nothing here spawns threads; the owner drives the queue.

mod guard;
mod mount;
mod queue;
mod state;

pub use guard::{fixed_theme, Boundary, RendererFactory, Tier, View};
pub use mount::{theme_provider, MountedBackground, Resolution, ThemeProvider};
pub use queue::{DeferredQueue, TaskId};
pub use state::{RenderState, Transition, TransitionError};

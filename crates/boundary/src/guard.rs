use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use backdrop::{
    BoxedRenderer, Element, Fallback, FallbackProps, LayerSettings, MinimalErrorFallback, Node,
    RenderError, RetryCallback, ShaderBackground, ShaderErrorFallback, ShaderSkeleton,
};
use themeconfig::{BuildMode, ResolvedTheme};

use crate::mount::{MountedBackground, Resolution, ThemeProvider};
use crate::queue::DeferredQueue;
use crate::state::{RenderState, Transition};

/// Builds a fresh renderer for every attempt.
pub type RendererFactory = Box<dyn FnMut() -> BoxedRenderer>;

/// Which rung of the degradation ladder a view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Theme not resolved or renderer not mounted yet.
    Skeleton,
    Full,
    ErrorFallback,
    Minimal,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton",
            Self::Full => "full",
            Self::ErrorFallback => "error-fallback",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub tier: Tier,
    pub element: Element,
}

/// Guards a [`ShaderBackground`] so renderer failures never take the page
/// content down with them.
///
/// Errors and panics from mounting or rendering move the boundary to
/// [`RenderState::Failed`] and swap in the tier-2 fallback. If that fallback
/// fails as well, the minimal tier is shown and no further recovery is
/// offered.
pub struct Boundary {
    state: RenderState,
    factory: RendererFactory,
    renderer: Option<BoxedRenderer>,
    renderer_mounted: bool,
    background: Option<MountedBackground>,
    provider: ThemeProvider,
    resolution: Resolution,
    settings: LayerSettings,
    children: Vec<Node>,
    mode: BuildMode,
    fallback: Option<Box<dyn Fallback>>,
    fallback_props: Option<FallbackProps>,
    on_retry: Rc<RefCell<Option<RetryCallback>>>,
    retry_requested: Rc<Cell<bool>>,
    attempts: u32,
}

impl Boundary {
    pub fn new(factory: RendererFactory, provider: ThemeProvider) -> Self {
        Self {
            state: RenderState::Loading,
            factory,
            renderer: None,
            renderer_mounted: false,
            background: None,
            provider,
            resolution: Resolution::default(),
            settings: LayerSettings::default(),
            children: Vec::new(),
            mode: BuildMode::default(),
            fallback: None,
            fallback_props: None,
            on_retry: Rc::new(RefCell::new(None)),
            retry_requested: Rc::new(Cell::new(false)),
            attempts: 0,
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_settings(mut self, settings: LayerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Replaces the default [`ShaderErrorFallback`] tier.
    pub fn with_fallback(mut self, fallback: Box<dyn Fallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Hook invoked once per retry click, before the fresh attempt starts.
    pub fn with_retry_hook(self, hook: impl FnMut() + 'static) -> Self {
        *self.on_retry.borrow_mut() = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Number of renderer instances built so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_mounted(&self) -> bool {
        self.background.is_some()
    }

    pub fn renderer_name(&self) -> Option<&str> {
        self.renderer.as_deref().map(|renderer| renderer.name())
    }

    /// Builds a renderer and starts theme resolution.
    pub fn mount(&mut self, queue: &DeferredQueue) {
        self.teardown();
        self.renderer = Some((self.factory)());
        self.attempts += 1;
        self.background = Some(MountedBackground::mount(
            &self.provider,
            queue,
            self.resolution,
        ));
        tracing::debug!(attempt = self.attempts, "background mounted");
    }

    /// Releases the renderer and abandons any pending theme resolution.
    pub fn unmount(&mut self) {
        self.teardown();
        tracing::debug!("background unmounted");
    }

    /// Renders the current tier, advancing the state machine when the
    /// renderer mounts or fails.
    pub fn view(&mut self) -> View {
        if let RenderState::Failed(error) = &self.state {
            let error = error.clone();
            return self.fallback_view(error);
        }

        let theme = self.background.as_ref().and_then(MountedBackground::theme);
        let (Some(theme), Some(renderer)) = (theme, self.renderer.as_deref_mut()) else {
            return self.skeleton_view();
        };

        if !self.renderer_mounted {
            let settings = &self.settings;
            match guarded(|| ShaderBackground::mount(&theme, settings, &mut *renderer)) {
                Ok(()) => {
                    self.renderer_mounted = true;
                    self.transition(Transition::Mounted);
                }
                Err(error) => return self.fail(error),
            }
        }

        let Some(renderer) = self.renderer.as_deref_mut() else {
            return self.skeleton_view();
        };
        let background = ShaderBackground::new(self.children.clone());
        let settings = &self.settings;
        match guarded(|| background.compose(&theme, settings, &mut *renderer)) {
            Ok(element) => View {
                tier: Tier::Full,
                element,
            },
            Err(error) => self.fail(error),
        }
    }

    /// Presses the retry control of the tier-2 fallback. Returns false when
    /// no retry control is on screen.
    pub fn click_retry(&mut self, queue: &DeferredQueue) -> bool {
        if !self.state.is_failed() {
            return false;
        }
        let clicked = self
            .fallback_props
            .as_mut()
            .is_some_and(FallbackProps::click_retry);
        if !clicked || !self.retry_requested.replace(false) {
            return false;
        }
        self.transition(Transition::Retry);
        tracing::info!(attempt = self.attempts + 1, "retrying background renderer");
        self.mount(queue);
        true
    }

    fn skeleton_view(&self) -> View {
        let theme = self
            .background
            .as_ref()
            .and_then(MountedBackground::theme)
            .unwrap_or_default();
        View {
            tier: Tier::Skeleton,
            element: ShaderSkeleton::new(theme, self.settings.clone()).render(&self.children),
        }
    }

    fn fail(&mut self, error: RenderError) -> View {
        tracing::warn!(renderer = ?self.renderer_name(), %error, "background renderer failed");
        self.transition(Transition::Threw(error.clone()));
        self.fallback_view(error)
    }

    fn fallback_view(&mut self, error: RenderError) -> View {
        let requested = Rc::clone(&self.retry_requested);
        let hook = Rc::clone(&self.on_retry);
        let props = FallbackProps::new(self.children.clone())
            .with_error(error)
            .with_retry(move || {
                requested.set(true);
                if let Some(hook) = hook.borrow_mut().as_mut() {
                    hook();
                }
            });

        let theme = self
            .background
            .as_ref()
            .and_then(MountedBackground::theme)
            .unwrap_or_default();
        let rendered = match &self.fallback {
            Some(fallback) => guarded(|| fallback.render(&props)),
            None => {
                let fallback = ShaderErrorFallback::new(self.mode, theme);
                guarded(|| fallback.render(&props))
            }
        };

        match rendered {
            Ok(element) => {
                self.fallback_props = Some(props);
                View {
                    tier: Tier::ErrorFallback,
                    element,
                }
            }
            Err(error) => {
                tracing::error!(%error, "error fallback failed; showing minimal background");
                self.fallback_props = None;
                View {
                    tier: Tier::Minimal,
                    element: MinimalErrorFallback::render(&self.children),
                }
            }
        }
    }

    fn transition(&mut self, transition: Transition) {
        match self.state.apply(transition) {
            Ok(next) => {
                tracing::debug!(from = self.state.label(), to = next.label(), "render state");
                self.state = next;
            }
            Err(error) => tracing::warn!(%error, "ignored render state transition"),
        }
    }

    fn teardown(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.release();
        }
        self.renderer_mounted = false;
        self.fallback_props = None;
        if let Some(background) = self.background.take() {
            background.unmount();
        }
    }
}

impl Drop for Boundary {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boundary")
            .field("state", &self.state)
            .field("renderer", &self.renderer_name())
            .field("mounted", &self.is_mounted())
            .field("attempts", &self.attempts)
            .finish()
    }
}

/// Runs `f`, turning a panic into [`RenderError::Panicked`].
fn guarded<T>(f: impl FnOnce() -> Result<T, RenderError>) -> Result<T, RenderError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(RenderError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "renderer panicked".to_string()
    }
}

/// Convenience for building a [`ThemeProvider`] from an already resolved theme.
pub fn fixed_theme(theme: ResolvedTheme) -> ThemeProvider {
    Rc::new(move || theme.clone())
}

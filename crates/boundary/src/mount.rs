use std::cell::RefCell;
use std::rc::Rc;

use themeconfig::{ResolvedTheme, ThemeResolver, ThemeSource};

use crate::queue::{DeferredQueue, TaskId};

/// Produces the theme for a mount. Called at most once per mount.
pub type ThemeProvider = Rc<dyn Fn() -> ResolvedTheme>;

pub fn theme_provider<S: ThemeSource + 'static>(resolver: ThemeResolver<S>) -> ThemeProvider {
    Rc::new(move || resolver.resolve_theme())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Resolve on the next pass of the deferred queue.
    #[default]
    Deferred,
    /// Resolve during `mount`.
    Immediate,
}

/// One mounted background and its pending theme resolution.
///
/// Dropping it (or calling [`unmount`](Self::unmount)) cancels a resolution
/// that has not run yet. A resolution that races the drop finds its slot gone
/// and discards the theme.
pub struct MountedBackground {
    theme: Rc<RefCell<Option<ResolvedTheme>>>,
    pending: Option<TaskId>,
    queue: DeferredQueue,
}

impl MountedBackground {
    pub fn mount(provider: &ThemeProvider, queue: &DeferredQueue, resolution: Resolution) -> Self {
        let theme = Rc::new(RefCell::new(None));
        let pending = match resolution {
            Resolution::Immediate => {
                *theme.borrow_mut() = Some(provider());
                None
            }
            Resolution::Deferred => {
                let slot = Rc::downgrade(&theme);
                let provider = Rc::clone(provider);
                Some(queue.schedule(move || {
                    if let Some(slot) = slot.upgrade() {
                        *slot.borrow_mut() = Some(provider());
                        tracing::debug!("theme resolved");
                    }
                }))
            }
        };
        Self {
            theme,
            pending,
            queue: queue.clone(),
        }
    }

    pub fn theme(&self) -> Option<ResolvedTheme> {
        self.theme.borrow().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.theme.borrow().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some_and(|id| self.queue.is_pending(id))
    }

    /// Tears the mount down. Returns true when a pending resolution was
    /// cancelled.
    pub fn unmount(mut self) -> bool {
        self.cancel_pending()
    }

    fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => self.queue.cancel(id),
            None => false,
        }
    }
}

impl Drop for MountedBackground {
    fn drop(&mut self) {
        if self.cancel_pending() {
            tracing::debug!("cancelled pending theme resolution");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use themeconfig::StaticSource;

    fn counting_provider() -> (ThemeProvider, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let provider: ThemeProvider = Rc::new(move || {
            counter.set(counter.get() + 1);
            ResolvedTheme::default()
        });
        (provider, calls)
    }

    #[test]
    fn deferred_resolution_waits_for_the_queue() {
        let queue = DeferredQueue::new();
        let (provider, calls) = counting_provider();
        let mounted = MountedBackground::mount(&provider, &queue, Resolution::Deferred);

        assert!(!mounted.is_resolved());
        assert!(mounted.is_pending());
        queue.run_pending();
        assert!(mounted.is_resolved());
        assert!(!mounted.is_pending());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn immediate_resolution_skips_the_queue() {
        let queue = DeferredQueue::new();
        let (provider, calls) = counting_provider();
        let mounted = MountedBackground::mount(&provider, &queue, Resolution::Immediate);
        assert!(mounted.is_resolved());
        assert!(queue.is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unmount_before_resolution_abandons_it() {
        let queue = DeferredQueue::new();
        let (provider, calls) = counting_provider();
        let mounted = MountedBackground::mount(&provider, &queue, Resolution::Deferred);

        assert!(mounted.unmount());
        assert_eq!(queue.run_pending(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn dropping_cancels_too() {
        let queue = DeferredQueue::new();
        let (provider, calls) = counting_provider();
        drop(MountedBackground::mount(&provider, &queue, Resolution::Deferred));
        queue.run_pending();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn provider_resolves_through_the_theme_resolver() {
        let source = StaticSource::new().with("--shader-primary", "#ff0000");
        let provider = theme_provider(ThemeResolver::new(source));
        let theme = provider();
        assert_eq!(theme.palette.primary[1], "#ff0000");
    }
}

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct QueueInner {
    next_id: u64,
    tasks: VecDeque<(TaskId, Task)>,
}

/// Single-threaded queue of one-shot steps deferred past the current render.
///
/// Cloning shares the queue. The owner drives it with [`run_pending`];
/// nothing runs on its own.
///
/// [`run_pending`]: DeferredQueue::run_pending
#[derive(Clone, Default)]
pub struct DeferredQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce() + 'static) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let id = TaskId(inner.next_id);
        inner.next_id += 1;
        inner.tasks.push_back((id, Box::new(task)));
        id
    }

    /// Removes a task that has not run yet. Returns false when it already ran
    /// or was cancelled before.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.tasks.len();
        inner.tasks.retain(|(task_id, _)| *task_id != id);
        inner.tasks.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner
            .borrow()
            .tasks
            .iter()
            .any(|(task_id, _)| *task_id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().tasks.is_empty()
    }

    /// Runs every task queued before this call, in order. Tasks scheduled
    /// while draining wait for the next call. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let horizon = TaskId(self.inner.borrow().next_id);
        let mut ran = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                match inner.tasks.front() {
                    Some((id, _)) if *id < horizon => inner.tasks.pop_front(),
                    _ => None,
                }
            };
            let Some((_, task)) = next else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }
}

impl fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("pending", &self.len())
            .finish()
    }
}

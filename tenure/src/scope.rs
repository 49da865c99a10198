//! Ambient scopes of scoped services
//!
//! A scope is current for a logical execution path: an OS thread, or a task/future
//! wrapped with [`flow`] or started with [`spawn_task`]. A continuation started while a
//! scope is current observes that scope, but whatever it does with its own slot is
//! never seen by the parent or its siblings.
//!
//! There is a single slot per path, not a stack. [`ScopeContext::release`] clears the
//! slot unconditionally, so releasing an inner scope also blanks an outer one.

use crate::{cache::get_or_build, error::Error, factory::ArcService};
use dashmap::DashMap;
use std::{
    any::TypeId,
    cell::RefCell,
    fmt,
    future::Future,
    sync::{Arc, atomic::{AtomicU64, Ordering}},
    thread
};

type Slot = RefCell<Option<Arc<ScopeContext>>>;

thread_local! {
    static THREAD_SCOPE: Slot = const { RefCell::new(None) };
}

tokio::task_local! {
    static TASK_SCOPE: Slot;
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Runs `f` against the slot of the current execution path
#[inline]
fn with_slot<R>(f: impl FnOnce(&Slot) -> R) -> R {
    if TASK_SCOPE.try_with(|_| ()).is_ok() {
        TASK_SCOPE.with(f)
    } else {
        THREAD_SCOPE.with(f)
    }
}

/// A cache of scoped instances
pub struct ScopeContext {
    id: u64,
    services: DashMap<(u64, TypeId), ArcService>,
}

impl fmt::Debug for ScopeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeContext")
            .field("id", &self.id)
            .field("services", &self.services.len())
            .finish()
    }
}

impl ScopeContext {
    #[inline]
    fn new() -> Self {
        Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            services: DashMap::new(),
        }
    }

    /// Unique id of this scope
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of instances cached in this scope
    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if nothing has been resolved in this scope yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns the current scope, if any
    #[inline]
    pub fn current() -> Option<Arc<ScopeContext>> {
        with_slot(|slot| slot.borrow().clone())
    }

    /// Installs a fresh empty scope as current and returns it
    pub fn create() -> Arc<ScopeContext> {
        let scope = Arc::new(Self::new());
        with_slot(|slot| slot.replace(Some(scope.clone())));
        tracing::debug!(scope = scope.id, "scope created");
        scope
    }

    /// Clears the current scope, whichever it is
    pub fn release() {
        if let Some(scope) = with_slot(|slot| slot.take()) {
            tracing::debug!(scope = scope.id, "scope released");
        }
    }

    /// Looks up a scoped instance, building and storing it on a miss
    #[inline]
    pub(crate) fn get_or_create_scoped<F>(&self, owner: u64, type_id: TypeId, build: F) -> Result<ArcService, Error>
    where
        F: FnOnce() -> Result<ArcService, Error>
    {
        get_or_build(&self.services, (owner, type_id), build)
    }
}

/// A handle of a scope started with [`Resolver::begin_scope`](crate::Resolver::begin_scope).
///
/// The scope is released by [`ScopeGuard::end`] or, on every other exit path, on drop.
///
/// Outside of [`flow`] and [`spawn_task`] the guard works on the slot of the OS thread.
/// Tasks started with a plain `tokio::spawn` on one worker thread then share that slot,
/// and a guard held across an `.await` may be dropped on another worker, releasing
/// that thread's scope instead of its own. Wrap async code with [`flow`] to give it a
/// slot of its own.
#[derive(Debug)]
#[must_use = "the scope is released as soon as the guard is dropped"]
pub struct ScopeGuard {
    scope: Arc<ScopeContext>,
    active: bool,
}

impl ScopeGuard {
    #[inline]
    pub(crate) fn begin() -> Self {
        Self {
            scope: ScopeContext::create(),
            active: true,
        }
    }

    /// The scope this guard has started
    #[inline]
    pub fn scope(&self) -> &Arc<ScopeContext> {
        &self.scope
    }

    /// Releases the scope
    #[inline]
    pub fn end(mut self) {
        self.release();
    }

    #[inline]
    fn release(&mut self) {
        if self.active {
            self.active = false;
            ScopeContext::release();
        }
    }
}

impl Drop for ScopeGuard {
    #[inline]
    fn drop(&mut self) {
        self.release();
    }
}

/// Wraps a future into its own scope slot, inheriting the current scope
///
/// # Example
/// ```
/// use tenure::{scope::{self, ScopeContext}, Resolver};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = Resolver::builder().build();
///
/// scope::flow(async move {
///     let guard = resolver.begin_scope();
///     let id = guard.scope().id();
///
///     let child = scope::spawn_task(async { ScopeContext::current().map(|s| s.id()) });
///     assert_eq!(child.await.unwrap(), Some(id));
/// }).await;
/// # }
/// ```
#[inline]
pub fn flow<F: Future>(future: F) -> impl Future<Output = F::Output> {
    TASK_SCOPE.scope(RefCell::new(ScopeContext::current()), future)
}

/// Spawns a tokio task that inherits the current scope
#[inline]
pub fn spawn_task<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static
{
    tokio::spawn(flow(future))
}

/// Spawns an OS thread that inherits the current scope
pub fn spawn<F, T>(f: F) -> thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static
{
    let scope = ScopeContext::current();
    thread::spawn(move || {
        THREAD_SCOPE.with(|slot| slot.replace(scope));
        f()
    })
}

#[cfg(test)]
mod tests {
    use super::{flow, spawn, spawn_task, ScopeContext, ScopeGuard};
    use crate::Error;
    use std::{panic, thread};

    fn isolated<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        thread::spawn(f).join().unwrap()
    }

    #[test]
    fn it_has_no_scope_by_default() {
        let current = isolated(ScopeContext::current);

        assert!(current.is_none());
    }

    #[test]
    fn it_creates_and_releases_scope() {
        isolated(|| {
            let scope = ScopeContext::create();

            assert_eq!(ScopeContext::current().map(|s| s.id()), Some(scope.id()));

            ScopeContext::release();

            assert!(ScopeContext::current().is_none());
        });
    }

    #[test]
    fn it_blanks_outer_scope_when_inner_released() {
        isolated(|| {
            let outer = ScopeGuard::begin();
            let inner = ScopeGuard::begin();

            assert_ne!(outer.scope().id(), inner.scope().id());

            inner.end();

            assert!(ScopeContext::current().is_none());
            drop(outer);
        });
    }

    #[test]
    fn it_releases_on_error_path() {
        fn fail() -> Result<(), Error> {
            Err(Error::NoActiveScope("test"))
        }

        fn failing() -> Result<(), Error> {
            let _guard = ScopeGuard::begin();
            fail()?;
            Ok(())
        }

        isolated(|| {
            assert!(failing().is_err());
            assert!(ScopeContext::current().is_none());
        });
    }

    #[test]
    fn it_releases_on_panic() {
        isolated(|| {
            let result = panic::catch_unwind(|| {
                let _guard = ScopeGuard::begin();
                panic!("boom");
            });

            assert!(result.is_err());
            assert!(ScopeContext::current().is_none());
        });
    }

    #[test]
    fn it_propagates_scope_to_spawned_thread() {
        isolated(|| {
            let guard = ScopeGuard::begin();
            let id = guard.scope().id();

            let seen = spawn(|| ScopeContext::current().map(|s| s.id()))
                .join()
                .unwrap();

            assert_eq!(seen, Some(id));
        });
    }

    #[test]
    fn it_does_not_propagate_back_from_thread() {
        isolated(|| {
            let guard = ScopeGuard::begin();
            let id = guard.scope().id();

            spawn(|| {
                ScopeContext::release();
                let _ = ScopeContext::create();
            })
            .join()
            .unwrap();

            assert_eq!(ScopeContext::current().map(|s| s.id()), Some(id));
        });
    }

    #[test]
    fn it_does_not_propagate_to_plain_thread() {
        isolated(|| {
            let _guard = ScopeGuard::begin();

            let seen = thread::spawn(ScopeContext::current).join().unwrap();

            assert!(seen.is_none());
        });
    }

    #[tokio::test]
    async fn it_propagates_scope_to_spawned_task() {
        flow(async {
            let guard = ScopeGuard::begin();
            let id = guard.scope().id();

            let seen = spawn_task(async { ScopeContext::current().map(|s| s.id()) })
                .await
                .unwrap();

            assert_eq!(seen, Some(id));
        }).await;
    }

    #[tokio::test]
    async fn it_does_not_propagate_back_from_task() {
        flow(async {
            let guard = ScopeGuard::begin();
            let id = guard.scope().id();

            spawn_task(async {
                ScopeContext::release();
                assert!(ScopeContext::current().is_none());
            })
            .await
            .unwrap();

            assert_eq!(ScopeContext::current().map(|s| s.id()), Some(id));
        }).await;
    }

    #[tokio::test]
    async fn it_shares_thread_slot_with_plain_tasks() {
        let guard = ScopeGuard::begin();
        let id = guard.scope().id();

        let seen = tokio::spawn(async { ScopeContext::current().map(|s| s.id()) })
            .await
            .unwrap();
        let released = tokio::spawn(flow(async {
            ScopeContext::release();
            ScopeContext::current().is_none()
        }))
        .await
        .unwrap();

        assert_eq!(seen, Some(id));
        assert!(released);
        assert_eq!(ScopeContext::current().map(|s| s.id()), Some(id));
        guard.end();
    }

    #[tokio::test]
    async fn it_isolates_sibling_tasks() {
        flow(async {
            let first = spawn_task(async {
                let guard = ScopeGuard::begin();
                tokio::task::yield_now().await;
                guard.scope().id()
            });
            let second = spawn_task(async {
                tokio::task::yield_now().await;
                ScopeContext::current().map(|s| s.id())
            });

            let first = first.await.unwrap();
            let second = second.await.unwrap();

            assert_ne!(second, Some(first));
            assert!(ScopeContext::current().is_none());
        }).await;
    }
}

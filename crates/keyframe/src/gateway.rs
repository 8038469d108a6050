//! # Animation Gateway
//!
//! The only way animator-side code talks to a scheduler.
//!
//! The gateway owns handle allocation, so identities outlive any single
//! scheduler. With no scheduler attached (or after it was dropped) every
//! request is a silent no-op, which absorbs start-up and tear-down ordering.
//!
//! Identities survive the scheduler too: after a detach the gateway keeps
//! draining the old scheduler's retired handles, and a dropped scheduler
//! hands back every unregister it had not yet applied.

use std::sync::Arc;

use keyframe_core::{AnimationDefinition, AnimatorHandle, HandlePool};
use parking_lot::{Mutex, RwLock};

use crate::commands::{
    CommandSender, Register, RetiredHandles, SetPaused, SwapAnimation, Unregister,
};
use crate::error::{KeyframeError, KeyframeResult};
use crate::scheduler::AnimationScheduler;

struct GatewayInner {
    /// Lock order: `scheduler`, then `detached`, then `pool`.
    scheduler: RwLock<Option<CommandSender>>,
    /// Retired-handle ends of detached schedulers, kept until they disconnect.
    detached: Mutex<Vec<RetiredHandles>>,
    pool: Mutex<HandlePool>,
}

/// Lifecycle-tolerant front door to an [`AnimationScheduler`].
///
/// Cheap to clone; clones share the same pool and attachment.
///
/// # Example
///
/// ```rust,ignore
/// let gateway = AnimationGateway::new();
/// let handle = gateway.acquire_handle();
/// gateway.register(handle, Some(&walk))?; // no-op until attached
///
/// let scheduler = AnimationScheduler::new(SchedulerConfig::default())?;
/// gateway.attach(&scheduler)?;
/// ```
#[derive(Clone)]
pub struct AnimationGateway {
    inner: Arc<GatewayInner>,
}

impl AnimationGateway {
    /// Creates a detached gateway with an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a detached gateway with room for `capacity` handles.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                scheduler: RwLock::new(None),
                detached: Mutex::new(Vec::new()),
                pool: Mutex::new(HandlePool::with_capacity(capacity)),
            }),
        }
    }

    /// Routes all further requests to `scheduler`.
    ///
    /// A previously attached scheduler that has since been dropped does not
    /// count as attached.
    ///
    /// # Errors
    ///
    /// Returns [`KeyframeError::AlreadyAttached`] if a live scheduler is
    /// already attached.
    pub fn attach(&self, scheduler: &AnimationScheduler) -> KeyframeResult<()> {
        let mut slot = self.inner.scheduler.write();
        if let Some(current) = slot.as_ref() {
            if self.reclaim(current) {
                tracing::error!("Gateway is already attached; detach before attaching again");
                return Err(KeyframeError::AlreadyAttached);
            }
        }
        *slot = Some(scheduler.command_sender());
        drop(slot);
        self.reclaim_detached();
        tracing::debug!("Gateway attached to scheduler");
        Ok(())
    }

    /// Stops routing requests.
    ///
    /// Handles already retired by the scheduler are taken back into the pool.
    /// Unregisters still queued there come back once the scheduler applies
    /// them or is dropped.
    pub fn detach(&self) {
        let mut slot = self.inner.scheduler.write();
        if let Some(sender) = slot.take() {
            if self.reclaim(&sender) {
                self.inner.detached.lock().push(sender.retired());
            }
            tracing::debug!("Gateway detached from scheduler");
        }
    }

    /// Whether a live scheduler is attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.reclaim_all()
    }

    /// Borrows a fresh handle from the pool.
    ///
    /// Handles the attached scheduler has finished with are reclaimed first,
    /// so a handle freed by the last tick can be handed out again.
    #[must_use]
    pub fn acquire_handle(&self) -> AnimatorHandle {
        self.reclaim_all();
        self.inner.pool.lock().borrow()
    }

    /// Returns a handle that was never registered.
    ///
    /// Returns `false` for null, stale or already returned handles.
    pub fn release_handle(&self, handle: AnimatorHandle) -> bool {
        self.inner.pool.lock().give_back(handle)
    }

    /// Number of handles currently on loan.
    ///
    /// Handles retired by any scheduler are reclaimed before counting.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.reclaim_all();
        self.inner.pool.lock().live_count()
    }

    /// Asks the scheduler to start `definition` on `handle`.
    ///
    /// Succeeds without doing anything while detached.
    ///
    /// # Errors
    ///
    /// - [`KeyframeError::NullHandle`] if `handle` is unset
    /// - [`KeyframeError::MissingDefinition`] if `definition` is `None`
    pub fn register(
        &self,
        handle: AnimatorHandle,
        definition: Option<&Arc<AnimationDefinition>>,
    ) -> KeyframeResult<()> {
        if handle.is_null() {
            tracing::error!("Register called with an unset animator handle");
            return Err(KeyframeError::NullHandle);
        }
        let Some(definition) = definition else {
            tracing::error!("Register called for {} without an animation", handle);
            return Err(KeyframeError::MissingDefinition(handle));
        };

        self.route(|sender| {
            sender.register(Register {
                handle,
                definition: Arc::clone(definition),
            })
        });
        Ok(())
    }

    /// Retires `handle` and gives its identity back.
    ///
    /// Attached: the identity becomes reusable after the scheduler's next
    /// apply pass. Detached: it is returned to the pool immediately.
    /// Repeated calls are harmless.
    pub fn unregister(&self, handle: AnimatorHandle) {
        if handle.is_null() {
            return;
        }
        let queued = self.route(|sender| sender.unregister(Unregister { handle }));
        if !queued {
            self.inner.pool.lock().give_back(handle);
        }
    }

    /// Switches `handle` to `definition`.
    ///
    /// With `preserve_phase` the running frame timing is kept and only the
    /// event timeline is realigned; otherwise playback restarts at
    /// `start_frame`. No-op while detached.
    pub fn change_animation(
        &self,
        handle: AnimatorHandle,
        definition: &Arc<AnimationDefinition>,
        start_frame: u16,
        preserve_phase: bool,
    ) {
        self.route(|sender| {
            sender.swap(SwapAnimation {
                handle,
                definition: Arc::clone(definition),
                start_frame,
                preserve_phase,
            })
        });
    }

    /// Pauses `handle`. No-op while detached.
    pub fn pause(&self, handle: AnimatorHandle) {
        self.route(|sender| sender.set_paused(SetPaused { handle, paused: true }));
    }

    /// Resumes `handle`. No-op while detached.
    pub fn resume(&self, handle: AnimatorHandle) {
        self.route(|sender| sender.set_paused(SetPaused { handle, paused: false }));
    }

    /// Sends through the attached scheduler. Returns `false` if nothing was
    /// queued; a scheduler found dropped is detached on the way.
    fn route(&self, send: impl FnOnce(&CommandSender) -> bool) -> bool {
        let delivered = match self.inner.scheduler.read().as_ref() {
            Some(sender) => send(sender),
            None => return false,
        };
        if !delivered {
            self.forget_dropped_scheduler();
        }
        delivered
    }

    fn forget_dropped_scheduler(&self) {
        let mut slot = self.inner.scheduler.write();
        let dropped = slot.as_ref().is_some_and(|sender| !self.reclaim(sender));
        if dropped {
            *slot = None;
            tracing::warn!("Attached scheduler was dropped; gateway is now detached");
        }
    }

    /// Moves retired handles into the pool. Returns `false` if the scheduler
    /// behind `sender` is gone.
    fn reclaim(&self, sender: &CommandSender) -> bool {
        let mut pool = self.inner.pool.lock();
        sender.reclaim(|handle| {
            pool.give_back(handle);
        })
    }

    /// Drains detached schedulers, forgetting those that are gone.
    fn reclaim_detached(&self) {
        let mut detached = self.inner.detached.lock();
        if detached.is_empty() {
            return;
        }
        let mut pool = self.inner.pool.lock();
        detached.retain(|retired| {
            retired.reclaim(|handle| {
                pool.give_back(handle);
            })
        });
    }

    /// Reclaims from every scheduler. Returns whether a live one is attached.
    fn reclaim_all(&self) -> bool {
        let attached = match self.inner.scheduler.read().as_ref() {
            Some(sender) => self.reclaim(sender),
            None => false,
        };
        self.reclaim_detached();
        attached
    }
}

impl Default for AnimationGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let attached = self.inner.scheduler.read().is_some();
        f.debug_struct("AnimationGateway")
            .field("attached", &attached)
            .field("live_handles", &self.inner.pool.lock().live_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::sink::NullSink;
    use keyframe_core::{AnimationStyle, VisualId};

    fn walk() -> Arc<AnimationDefinition> {
        Arc::new(
            AnimationDefinition::builder(AnimationStyle::Loop)
                .frame(VisualId(1), 0.1)
                .frame(VisualId(2), 0.1)
                .build(),
        )
    }

    fn scheduler() -> AnimationScheduler {
        AnimationScheduler::new(SchedulerConfig::sequential()).unwrap()
    }

    #[test]
    fn test_detached_is_noop() {
        let gateway = AnimationGateway::new();
        let handle = gateway.acquire_handle();

        assert!(!gateway.is_active());
        assert!(gateway.register(handle, Some(&walk())).is_ok());
        gateway.pause(handle);
        gateway.resume(handle);
        gateway.change_animation(handle, &walk(), 0, true);

        // Detached unregister returns the identity at once.
        gateway.unregister(handle);
        assert_eq!(gateway.live_handles(), 0);
    }

    #[test]
    fn test_register_validation() {
        let gateway = AnimationGateway::new();
        assert_eq!(
            gateway.register(AnimatorHandle::NULL, Some(&walk())),
            Err(KeyframeError::NullHandle)
        );
        let handle = gateway.acquire_handle();
        assert_eq!(
            gateway.register(handle, None),
            Err(KeyframeError::MissingDefinition(handle))
        );
    }

    #[test]
    fn test_attach_twice_fails() {
        let gateway = AnimationGateway::new();
        let first = scheduler();
        let second = scheduler();

        assert!(gateway.attach(&first).is_ok());
        assert!(gateway.is_active());
        assert_eq!(gateway.attach(&second), Err(KeyframeError::AlreadyAttached));

        gateway.detach();
        assert!(!gateway.is_active());
        assert!(gateway.attach(&second).is_ok());
    }

    #[test]
    fn test_dropped_scheduler_counts_as_detached() {
        let gateway = AnimationGateway::new();
        let handle = gateway.acquire_handle();
        {
            let scheduler = scheduler();
            gateway.attach(&scheduler).unwrap();
            assert!(gateway.is_active());
        }
        assert!(!gateway.is_active());

        // Sends fail, the gateway detaches, and unregister falls back to the pool.
        gateway.unregister(handle);
        assert_eq!(gateway.live_handles(), 0);
        assert!(gateway.attach(&scheduler()).is_ok());
    }

    #[test]
    fn test_handle_reused_only_after_apply() {
        let gateway = AnimationGateway::new();
        let mut scheduler = scheduler();
        gateway.attach(&scheduler).unwrap();

        let first = gateway.acquire_handle();
        gateway.register(first, Some(&walk())).unwrap();
        scheduler.tick(0.0, &mut NullSink);

        gateway.unregister(first);
        // Not yet processed: a new borrow must not reuse the index.
        let second = gateway.acquire_handle();
        assert_ne!(second.index(), first.index());

        scheduler.tick(0.1, &mut NullSink);
        let third = gateway.acquire_handle();
        assert_eq!(third.index(), first.index());
        assert_ne!(third.generation(), first.generation());
    }

    #[test]
    fn test_clones_share_state() {
        let gateway = AnimationGateway::new();
        let clone = gateway.clone();
        let scheduler = scheduler();

        clone.attach(&scheduler).unwrap();
        assert!(gateway.is_active());
        let _ = gateway.acquire_handle();
        assert_eq!(clone.live_handles(), 1);
    }

    #[test]
    fn test_pending_unregister_survives_scheduler_drop() {
        let gateway = AnimationGateway::new();
        let handle = gateway.acquire_handle();
        {
            let mut scheduler = scheduler();
            gateway.attach(&scheduler).unwrap();
            gateway.register(handle, Some(&walk())).unwrap();
            scheduler.tick(0.0, &mut NullSink);
            gateway.unregister(handle);
        }

        let replacement = scheduler();
        gateway.attach(&replacement).unwrap();
        let next = gateway.acquire_handle();
        assert_eq!(next.index(), handle.index());
        assert_eq!(gateway.live_handles(), 1);
    }

    #[test]
    fn test_pending_unregister_survives_detach() {
        let gateway = AnimationGateway::new();
        let mut scheduler = scheduler();
        gateway.attach(&scheduler).unwrap();

        let handle = gateway.acquire_handle();
        gateway.register(handle, Some(&walk())).unwrap();
        scheduler.tick(0.0, &mut NullSink);
        gateway.unregister(handle);
        gateway.detach();
        assert_eq!(gateway.live_handles(), 1);

        scheduler.tick(0.1, &mut NullSink);
        assert_eq!(gateway.live_handles(), 0);
        assert_eq!(gateway.acquire_handle().index(), handle.index());
    }

    #[test]
    fn test_detached_scheduler_forgotten_after_drop() {
        let gateway = AnimationGateway::new();
        let scheduler = scheduler();
        gateway.attach(&scheduler).unwrap();
        let handle = gateway.acquire_handle();
        gateway.unregister(handle);
        gateway.detach();

        drop(scheduler);
        assert_eq!(gateway.live_handles(), 0);
        assert!(gateway.inner.detached.lock().is_empty());
    }
}

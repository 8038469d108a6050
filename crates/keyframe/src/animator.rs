//! # Animator
//!
//! Per-object animation component. Holds a handle and the definition it
//! plays, and forwards everything through the gateway.

use std::sync::Arc;

use keyframe_core::{AnimationDefinition, AnimatorHandle};

use crate::error::KeyframeResult;
use crate::gateway::AnimationGateway;

/// One animated object.
///
/// Dropping it unregisters the handle.
///
/// # Example
///
/// ```rust,ignore
/// let mut hero = Animator::new(gateway.clone(), Some(idle));
/// hero.initialize()?;
/// hero.set_animation(run, 0, true)?;
/// ```
#[derive(Debug)]
pub struct Animator {
    gateway: AnimationGateway,
    handle: AnimatorHandle,
    definition: Option<Arc<AnimationDefinition>>,
}

impl Animator {
    /// Creates an uninitialized animator.
    #[must_use]
    pub fn new(gateway: AnimationGateway, definition: Option<Arc<AnimationDefinition>>) -> Self {
        Self {
            gateway,
            handle: AnimatorHandle::NULL,
            definition,
        }
    }

    /// Acquires a handle and registers the current definition.
    ///
    /// Calling it again once initialized does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`KeyframeError::MissingDefinition`](crate::KeyframeError::MissingDefinition)
    /// if no definition is set. The handle is kept, so a later
    /// [`set_animation`](Self::set_animation) can still start playback.
    pub fn initialize(&mut self) -> KeyframeResult<AnimatorHandle> {
        if !self.handle.is_null() {
            return Ok(self.handle);
        }
        self.handle = self.gateway.acquire_handle();
        self.gateway.register(self.handle, self.definition.as_ref())?;
        Ok(self.handle)
    }

    /// Switches to `definition`, initializing first if needed.
    ///
    /// # Arguments
    ///
    /// * `definition` - The animation to play
    /// * `start_frame` - Frame to restart from when not preserving phase
    /// * `preserve_phase` - Keep the running frame timing
    ///
    /// # Errors
    ///
    /// Propagates registration errors from [`initialize`](Self::initialize).
    pub fn set_animation(
        &mut self,
        definition: Arc<AnimationDefinition>,
        start_frame: u16,
        preserve_phase: bool,
    ) -> KeyframeResult<()> {
        let fresh = self.handle.is_null() || self.definition.is_none();
        self.definition = Some(Arc::clone(&definition));

        if fresh {
            // Nothing is playing yet; registration starts the new definition.
            if self.handle.is_null() {
                self.initialize()?;
            } else {
                self.gateway.register(self.handle, self.definition.as_ref())?;
            }
        }
        self.gateway
            .change_animation(self.handle, &definition, start_frame, preserve_phase);
        Ok(())
    }

    /// Pauses playback.
    pub fn pause(&self) {
        self.gateway.pause(self.handle);
    }

    /// Resumes playback.
    pub fn resume(&self) {
        self.gateway.resume(self.handle);
    }

    /// The handle, [`AnimatorHandle::NULL`] before initialization.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> AnimatorHandle {
        self.handle
    }

    /// The definition currently assigned.
    #[inline]
    #[must_use]
    pub fn definition(&self) -> Option<&Arc<AnimationDefinition>> {
        self.definition.as_ref()
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.gateway.unregister(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::scheduler::AnimationScheduler;
    use crate::sink::RecordingSink;
    use crate::KeyframeError;
    use keyframe_core::{AnimationStyle, VisualId};

    fn clip(style: AnimationStyle, base: u32) -> Arc<AnimationDefinition> {
        Arc::new(
            AnimationDefinition::builder(style)
                .frame(VisualId(base), 0.1)
                .frame(VisualId(base + 1), 0.1)
                .frame(VisualId(base + 2), 0.1)
                .build(),
        )
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let gateway = AnimationGateway::new();
        let mut animator = Animator::new(gateway.clone(), Some(clip(AnimationStyle::Loop, 0)));

        let first = animator.initialize().unwrap();
        let second = animator.initialize().unwrap();
        assert_eq!(first, second);
        assert_eq!(gateway.live_handles(), 1);
    }

    #[test]
    fn test_missing_definition_keeps_handle() {
        let gateway = AnimationGateway::new();
        let mut animator = Animator::new(gateway, None);

        let err = animator.initialize().unwrap_err();
        assert!(matches!(err, KeyframeError::MissingDefinition(_)));
        assert!(!animator.handle().is_null());
        assert!(animator
            .set_animation(clip(AnimationStyle::OneShot, 0), 0, false)
            .is_ok());
    }

    #[test]
    fn test_drop_unregisters() {
        let gateway = AnimationGateway::new();
        let mut scheduler = AnimationScheduler::new(SchedulerConfig::sequential()).unwrap();
        gateway.attach(&scheduler).unwrap();
        let mut sink = RecordingSink::new();

        {
            let mut animator =
                Animator::new(gateway.clone(), Some(clip(AnimationStyle::Loop, 0)));
            animator.initialize().unwrap();
            scheduler.tick(0.0, &mut sink);
            assert_eq!(scheduler.live_count(), 1);
        }

        scheduler.tick(0.1, &mut sink);
        assert_eq!(scheduler.live_count(), 0);
        // The retired index came back and is handed out again.
        let again = gateway.acquire_handle();
        assert_eq!(again.index(), 0);
        assert_eq!(again.generation(), 1);
    }

    #[test]
    fn test_set_animation_reset_and_phase() {
        let gateway = AnimationGateway::new();
        let mut scheduler = AnimationScheduler::new(SchedulerConfig::sequential()).unwrap();
        gateway.attach(&scheduler).unwrap();
        let mut sink = RecordingSink::new();

        let mut animator = Animator::new(gateway.clone(), None);
        animator
            .set_animation(clip(AnimationStyle::Loop, 10), 2, false)
            .unwrap();
        scheduler.tick(0.0, &mut sink);
        let handle = animator.handle();
        assert_eq!(scheduler.state(handle).map(|r| r.current_frame), Some(2));
        assert_eq!(sink.last_for(handle), Some(Some(VisualId(12))));

        animator
            .set_animation(clip(AnimationStyle::YoYo, 20), 0, true)
            .unwrap();
        scheduler.tick(0.05, &mut sink);
        let record = scheduler.state(handle).unwrap();
        assert_eq!(record.current_frame, 2);
        assert_eq!(sink.last_for(handle), Some(Some(VisualId(22))));
        assert_eq!(
            scheduler.definition(handle).map(|d| d.style()),
            Some(AnimationStyle::YoYo)
        );
    }
}

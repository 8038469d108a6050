//! # Animation Scheduler
//!
//! One tick, driven externally once per rendered frame:
//! ```text
//! Tick N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. ADVANCE (parallel, rayon)                                        │
//! │    └─ Step every record, queue FrameChanged / EventFired            │
//! │                                                                     │
//! │ 2. JOIN                                                             │
//! │    └─ Every record processed before anything is drained             │
//! │                                                                     │
//! │ 3. APPLY (single thread, fixed order)                               │
//! │    ├─ FrameChanged  -> assign visual, refill frame deadline         │
//! │    ├─ EventFired    -> invoke callbacks, refill event deadline      │
//! │    ├─ Register      -> write a fresh record                         │
//! │    ├─ SwapAnimation -> reset or realign onto a new definition       │
//! │    ├─ SetPaused     -> flip the paused flag                         │
//! │    └─ Unregister    -> retire the record                            │
//! │                                                                     │
//! │ 4. RETURN HANDLES                                                   │
//! │    └─ Retired identities flow back to the gateway's pool            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use keyframe_core::{
    advance_all, advance_all_sequential, AdvanceStats, AnimationDefinition, AnimatorHandle,
    AnimatorState, Outbound, OutboundWriter, StateTable,
};

use crate::commands::{CommandQueues, CommandSender};
use crate::config::SchedulerConfig;
use crate::error::{KeyframeError, KeyframeResult};
use crate::sink::FrameSink;

/// Statistics for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Tick number (0-based).
    pub tick: u64,
    /// Advance pass time in microseconds.
    pub advance_us: u64,
    /// Apply pass time in microseconds.
    pub apply_us: u64,
    /// Frame notifications applied.
    pub frames_applied: u32,
    /// Event notifications applied.
    pub events_applied: u32,
    /// Notifications dropped because their record is gone or reused.
    pub stale_notifications: u32,
    /// Registrations applied.
    pub registered: u32,
    /// Swaps applied.
    pub swapped: u32,
    /// Pause changes applied.
    pub pause_changes: u32,
    /// Unregistrations applied.
    pub unregistered: u32,
    /// Commands dropped because their record is gone or reused.
    pub stale_commands: u32,
}

/// Owns the state table and drives ticks.
///
/// # Example
///
/// ```rust,ignore
/// let mut scheduler = AnimationScheduler::new(SchedulerConfig::default())?;
/// gateway.attach(&scheduler)?;
/// loop {
///     scheduler.tick(clock.now(), &mut renderer);
/// }
/// ```
pub struct AnimationScheduler {
    config: SchedulerConfig,
    table: StateTable,
    /// Definition each slot plays, indexed like the table.
    definitions: Vec<Option<Arc<AnimationDefinition>>>,
    outbound: Outbound,
    writer: OutboundWriter,
    commands: CommandQueues,
    /// Dedicated pool, `None` to use the rayon global pool.
    workers: Option<rayon::ThreadPool>,
    tick_count: u64,
    last_stats: TickStats,
}

impl AnimationScheduler {
    /// Creates a scheduler.
    ///
    /// # Arguments
    ///
    /// * `config` - Capacity and threading configuration
    ///
    /// # Errors
    ///
    /// Returns [`KeyframeError::InvalidConfig`] for an invalid config, or
    /// [`KeyframeError::WorkerPool`] if the dedicated pool cannot start.
    pub fn new(config: SchedulerConfig) -> KeyframeResult<Self> {
        config.validate()?;

        let workers = if config.parallel && config.worker_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("keyframe-advance-{i}"))
                .build()
                .map_err(|e| KeyframeError::WorkerPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        let outbound = Outbound::new();
        let writer = outbound.writer();

        tracing::debug!(
            "Animation scheduler created: capacity={}, workers={}, parallel={}",
            config.initial_capacity,
            config.worker_threads,
            config.parallel
        );

        Ok(Self {
            table: StateTable::with_capacity(config.initial_capacity),
            definitions: Vec::with_capacity(config.initial_capacity),
            outbound,
            writer,
            commands: CommandQueues::new(),
            workers,
            tick_count: 0,
            last_stats: TickStats::default(),
            config,
        })
    }

    /// Producer handle for a gateway.
    #[must_use]
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Runs one tick: advance, join, apply.
    ///
    /// # Arguments
    ///
    /// * `now` - Monotonic, unscaled time in seconds
    /// * `sink` - Receives visual assignments
    ///
    /// # Panics
    ///
    /// Panics if a record carries an unknown style code.
    pub fn tick<S: FrameSink + ?Sized>(&mut self, now: f64, sink: &mut S) -> TickStats {
        let mut stats = TickStats {
            tick: self.tick_count,
            ..TickStats::default()
        };

        let advance_start = Instant::now();
        let advanced = self.advance(now);
        stats.advance_us = elapsed_us(advance_start);

        let apply_start = Instant::now();
        self.apply_frames(sink, &mut stats);
        self.apply_events(&mut stats);
        self.apply_registrations(sink, &mut stats);
        self.apply_swaps(sink, &mut stats);
        self.apply_pauses(&mut stats);
        self.apply_unregistrations(&mut stats);
        stats.apply_us = elapsed_us(apply_start);

        tracing::trace!(
            "Tick {}: {} frames, {} events queued; apply {}us",
            stats.tick,
            advanced.frames,
            advanced.events,
            stats.apply_us
        );
        if stats.stale_notifications > 0 || stats.stale_commands > 0 {
            tracing::debug!(
                "Tick {}: dropped {} stale notifications, {} stale commands",
                stats.tick,
                stats.stale_notifications,
                stats.stale_commands
            );
        }

        self.tick_count += 1;
        self.last_stats = stats;
        stats
    }

    /// Ticks completed so far.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of live animators.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.table.live_count()
    }

    /// Runtime record owned by `handle`, if it is live.
    #[must_use]
    pub fn state(&self, handle: AnimatorHandle) -> Option<&AnimatorState> {
        self.table.live(handle)
    }

    /// Definition `handle` is currently playing.
    #[must_use]
    pub fn definition(&self, handle: AnimatorHandle) -> Option<&Arc<AnimationDefinition>> {
        self.table.live(handle)?;
        self.definitions.get(handle.slot())?.as_ref()
    }

    /// Statistics of the most recent tick.
    #[must_use]
    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // =========================================================================
    // ADVANCE
    // =========================================================================

    fn advance(&mut self, now: f64) -> AdvanceStats {
        let records = self.table.as_mut_slice();
        let writer = &self.writer;
        let min_len = self.config.min_batch_len;

        if !self.config.parallel {
            return advance_all_sequential(records, now, writer);
        }
        match &self.workers {
            Some(pool) => pool.install(|| advance_all(records, now, writer, min_len)),
            None => advance_all(records, now, writer, min_len),
        }
    }

    // =========================================================================
    // APPLY
    // =========================================================================

    fn apply_frames<S: FrameSink + ?Sized>(&mut self, sink: &mut S, stats: &mut TickStats) {
        for changed in self.outbound.drain_frames() {
            let slot = changed.slot as usize;
            let (Some(record), Some(Some(definition))) = (
                self.table.live_at_mut(slot, changed.generation),
                self.definitions.get(slot),
            ) else {
                tracing::trace!("Dropped stale frame notification for {}", changed.handle());
                stats.stale_notifications += 1;
                continue;
            };

            let frame = usize::from(changed.frame);
            record.next_frame_deadline += definition.frame_duration(frame);
            sink.assign_frame(changed.handle(), definition.visual(frame));
            stats.frames_applied += 1;
        }
    }

    fn apply_events(&mut self, stats: &mut TickStats) {
        for fired in self.outbound.drain_events() {
            let slot = fired.slot as usize;
            let (Some(record), Some(Some(definition))) = (
                self.table.live_at_mut(slot, fired.generation),
                self.definitions.get(slot),
            ) else {
                tracing::trace!("Dropped stale event notification for {}", fired.handle());
                stats.stale_notifications += 1;
                continue;
            };

            let event = usize::from(fired.event);
            record.next_event_deadline += definition.event_interval_after(event);
            // Listeners may enqueue commands; those land in this tick's later stages.
            definition.invoke_event(event, fired.handle());
            stats.events_applied += 1;
        }
    }

    fn apply_registrations<S: FrameSink + ?Sized>(&mut self, sink: &mut S, stats: &mut TickStats) {
        for command in self.commands.drain_register() {
            let handle = command.handle;
            let slot = handle.slot();
            let occupied = self
                .table
                .get(slot)
                .is_some_and(|r| r.is_live() && r.generation != handle.generation());
            if handle.is_null() || occupied {
                tracing::trace!("Dropped registration for stale handle {}", handle);
                stats.stale_commands += 1;
                continue;
            }

            let definition = command.definition;
            let record = AnimatorState::registered(
                handle.generation(),
                &definition,
                definition.starting_frame(),
            );
            self.table.insert(handle, record);
            if slot >= self.definitions.len() {
                self.definitions.resize(slot + 1, None);
            }
            sink.assign_frame(handle, definition.visual(usize::from(record.current_frame)));
            self.definitions[slot] = Some(definition);
            stats.registered += 1;
        }
    }

    fn apply_swaps<S: FrameSink + ?Sized>(&mut self, sink: &mut S, stats: &mut TickStats) {
        for command in self.commands.drain_swap() {
            let handle = command.handle;
            let Some(record) = self.table.live_mut(handle) else {
                tracing::trace!("Dropped swap for stale handle {}", handle);
                stats.stale_commands += 1;
                continue;
            };

            let definition = command.definition;
            if command.preserve_phase {
                record.resync(&definition);
            } else {
                *record = AnimatorState::registered(
                    handle.generation(),
                    &definition,
                    command.start_frame,
                );
            }
            sink.assign_frame(handle, definition.visual(usize::from(record.current_frame)));
            self.definitions[handle.slot()] = Some(definition);
            stats.swapped += 1;
        }
    }

    fn apply_pauses(&mut self, stats: &mut TickStats) {
        for command in self.commands.drain_pause() {
            match self.table.live_mut(command.handle) {
                Some(record) => {
                    record.set_paused(command.paused);
                    stats.pause_changes += 1;
                }
                None => stats.stale_commands += 1,
            }
        }
    }

    fn apply_unregistrations(&mut self, stats: &mut TickStats) {
        for command in self.commands.drain_unregister() {
            let handle = command.handle;
            if self.table.retire(handle) {
                if let Some(slot) = self.definitions.get_mut(handle.slot()) {
                    *slot = None;
                }
                stats.unregistered += 1;
            } else {
                stats.stale_commands += 1;
            }
            // The owner is done with the handle either way.
            if !handle.is_null() {
                self.commands.retire(handle);
            }
        }
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        // Unregisters that never reached an apply pass still give their
        // identities back; the gateway drains them after the drop.
        let pending: Vec<AnimatorHandle> = self
            .commands
            .drain_unregister()
            .map(|command| command.handle)
            .filter(|handle| !handle.is_null())
            .collect();
        for handle in &pending {
            self.commands.retire(*handle);
        }

        tracing::debug!(
            "Animation scheduler dropped after {} ticks with {} live animators, {} identities returned",
            self.tick_count,
            self.table.live_count(),
            pending.len()
        );
    }
}

fn elapsed_us(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

//! # Command Queues
//!
//! Structural requests from the gateway to the scheduler.
//!
//! ```text
//! ┌─────────────┐  Register / Swap / Pause / Unregister  ┌─────────────┐
//! │   Gateway   │───────────────────────────────────────>│  Scheduler  │
//! │ (any thread)│<───────────────────────────────────────│ (apply pass)│
//! └─────────────┘          retired handles               └─────────────┘
//! ```
//!
//! One crossbeam channel per command kind, so the apply pass can drain them
//! in a fixed order. Channels are unbounded; sends never drop a command.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TryIter, TryRecvError};
use keyframe_core::{AnimationDefinition, AnimatorHandle};

/// Start a definition on a handle.
#[derive(Clone, Debug)]
pub struct Register {
    /// Target animator.
    pub handle: AnimatorHandle,
    /// Definition to play from its starting frame.
    pub definition: Arc<AnimationDefinition>,
}

/// Switch a running animator to another definition.
#[derive(Clone, Debug)]
pub struct SwapAnimation {
    /// Target animator.
    pub handle: AnimatorHandle,
    /// The new definition.
    pub definition: Arc<AnimationDefinition>,
    /// Frame to restart from (reset mode only).
    pub start_frame: u16,
    /// Keep the running frame timing and only realign events.
    pub preserve_phase: bool,
}

/// Pause or resume an animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetPaused {
    /// Target animator.
    pub handle: AnimatorHandle,
    /// New paused state.
    pub paused: bool,
}

/// Retire an animator and give its handle back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unregister {
    /// Target animator.
    pub handle: AnimatorHandle,
}

/// Scheduler-side ends of the command queues.
pub struct CommandQueues {
    register_tx: Sender<Register>,
    register_rx: Receiver<Register>,
    swap_tx: Sender<SwapAnimation>,
    swap_rx: Receiver<SwapAnimation>,
    pause_tx: Sender<SetPaused>,
    pause_rx: Receiver<SetPaused>,
    unregister_tx: Sender<Unregister>,
    unregister_rx: Receiver<Unregister>,
    retired_tx: Sender<AnimatorHandle>,
    retired_rx: Receiver<AnimatorHandle>,
}

impl CommandQueues {
    /// Creates empty queues.
    #[must_use]
    pub fn new() -> Self {
        let (register_tx, register_rx) = unbounded();
        let (swap_tx, swap_rx) = unbounded();
        let (pause_tx, pause_rx) = unbounded();
        let (unregister_tx, unregister_rx) = unbounded();
        let (retired_tx, retired_rx) = unbounded();
        Self {
            register_tx,
            register_rx,
            swap_tx,
            swap_rx,
            pause_tx,
            pause_rx,
            unregister_tx,
            unregister_rx,
            retired_tx,
            retired_rx,
        }
    }

    /// Creates a producer handle for the gateway.
    #[must_use]
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            register: self.register_tx.clone(),
            swap: self.swap_tx.clone(),
            pause: self.pause_tx.clone(),
            unregister: self.unregister_tx.clone(),
            retired: RetiredHandles {
                rx: self.retired_rx.clone(),
            },
        }
    }

    /// Drains queued registrations.
    pub fn drain_register(&self) -> TryIter<'_, Register> {
        self.register_rx.try_iter()
    }

    /// Drains queued swaps.
    pub fn drain_swap(&self) -> TryIter<'_, SwapAnimation> {
        self.swap_rx.try_iter()
    }

    /// Drains queued pause changes.
    pub fn drain_pause(&self) -> TryIter<'_, SetPaused> {
        self.pause_rx.try_iter()
    }

    /// Drains queued unregistrations.
    pub fn drain_unregister(&self) -> TryIter<'_, Unregister> {
        self.unregister_rx.try_iter()
    }

    /// Hands a retired handle back to whoever owns the pool.
    pub fn retire(&self, handle: AnimatorHandle) {
        // The receiver lives in this struct, so the send cannot fail.
        let _ = self.retired_tx.send(handle);
    }

    /// Number of commands waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.register_rx.len() + self.swap_rx.len() + self.pause_rx.len() + self.unregister_rx.len()
    }
}

impl Default for CommandQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// Gateway-side handle to a scheduler's queues. Cheap to clone.
///
/// Every send returns `false` once the scheduler has been dropped.
#[derive(Clone)]
pub struct CommandSender {
    register: Sender<Register>,
    swap: Sender<SwapAnimation>,
    pause: Sender<SetPaused>,
    unregister: Sender<Unregister>,
    retired: RetiredHandles,
}

impl CommandSender {
    /// Queues a registration.
    #[inline]
    pub fn register(&self, command: Register) -> bool {
        self.register.send(command).is_ok()
    }

    /// Queues an animation swap.
    #[inline]
    pub fn swap(&self, command: SwapAnimation) -> bool {
        self.swap.send(command).is_ok()
    }

    /// Queues a pause change.
    #[inline]
    pub fn set_paused(&self, command: SetPaused) -> bool {
        self.pause.send(command).is_ok()
    }

    /// Queues an unregistration.
    #[inline]
    pub fn unregister(&self, command: Unregister) -> bool {
        self.unregister.send(command).is_ok()
    }

    /// Hands every retired handle to `give_back`.
    ///
    /// Returns `false` once the scheduler is gone and nothing is left to
    /// reclaim. Handles retired before the drop are still delivered.
    #[inline]
    pub fn reclaim(&self, give_back: impl FnMut(AnimatorHandle)) -> bool {
        self.retired.reclaim(give_back)
    }

    /// The retired-handle end alone, for draining after detaching.
    #[must_use]
    pub fn retired(&self) -> RetiredHandles {
        self.retired.clone()
    }
}

/// Receiving end of a scheduler's retired handles.
///
/// Stays usable after the scheduler is dropped until every handle it retired
/// has been taken.
#[derive(Clone)]
pub struct RetiredHandles {
    rx: Receiver<AnimatorHandle>,
}

impl RetiredHandles {
    /// Hands every retired handle to `give_back`.
    ///
    /// Returns `false` once the scheduler is gone and the channel is empty.
    pub fn reclaim(&self, mut give_back: impl FnMut(AnimatorHandle)) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(handle) => give_back(handle),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }
}

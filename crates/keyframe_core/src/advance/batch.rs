//! # Advance Batch
//!
//! Fan-out of [`step`] over the whole state table.
//!
//! Each rayon task owns a disjoint `&mut` range of the slice, so no record
//! is ever seen by two workers. The call returns only after every record has
//! been processed, which is the barrier the apply pass relies on.

use rayon::prelude::*;

use super::outbound::{EventFired, FrameChanged, OutboundWriter};
use super::step::{step, Step};
use crate::state::AnimatorState;

/// Counters for one advance batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceStats {
    /// Frame notifications emitted.
    pub frames: usize,
    /// Event notifications emitted.
    pub events: usize,
}

impl AdvanceStats {
    fn from_step(result: Step) -> Self {
        Self {
            frames: usize::from(result.frame.is_some()),
            events: usize::from(result.event.is_some()),
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            frames: self.frames + other.frames,
            events: self.events + other.events,
        }
    }
}

/// Steps one record and queues its notifications, stamped with `slot` and
/// the record's generation.
#[inline]
pub fn advance_record(
    slot: usize,
    record: &mut AnimatorState,
    now: f64,
    writer: &OutboundWriter,
) -> Step {
    let result = step(record, now);
    if result.is_idle() {
        return result;
    }

    // Slots come from a u32 handle index.
    let slot = u32::try_from(slot).unwrap_or(u32::MAX);
    let generation = record.generation;
    if let Some(frame) = result.frame {
        writer.frame_changed(FrameChanged {
            slot,
            generation,
            frame,
        });
    }
    if let Some(event) = result.event {
        writer.event_fired(EventFired {
            slot,
            generation,
            event,
        });
    }
    result
}

/// Advances every record in parallel on the current rayon pool.
///
/// # Arguments
///
/// * `records` - The state table slice; slot `i` is record `i`
/// * `now` - Tick timestamp in seconds
/// * `writer` - Producer side of the outbound queues
/// * `min_len` - Smallest number of records a single task processes
///
/// # Panics
///
/// Propagates the panic of any record with an unknown style code.
pub fn advance_all(
    records: &mut [AnimatorState],
    now: f64,
    writer: &OutboundWriter,
    min_len: usize,
) -> AdvanceStats {
    records
        .par_iter_mut()
        .with_min_len(min_len.max(1))
        .enumerate()
        .map(|(slot, record)| AdvanceStats::from_step(advance_record(slot, record, now, writer)))
        .reduce(AdvanceStats::default, AdvanceStats::merge)
}

/// Sequential variant of [`advance_all`] for single-threaded hosts and tests.
pub fn advance_all_sequential(
    records: &mut [AnimatorState],
    now: f64,
    writer: &OutboundWriter,
) -> AdvanceStats {
    records
        .iter_mut()
        .enumerate()
        .map(|(slot, record)| AdvanceStats::from_step(advance_record(slot, record, now, writer)))
        .fold(AdvanceStats::default(), AdvanceStats::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advance::Outbound;
    use crate::definition::{AnimationDefinition, AnimationStyle, VisualId};

    fn table(count: usize) -> Vec<AnimatorState> {
        let def = AnimationDefinition::builder(AnimationStyle::Loop)
            .frame(VisualId(0), 0.1)
            .frame(VisualId(1), 0.1)
            .event("tick", 0.05)
            .build();
        (0..count)
            .map(|i| AnimatorState::registered(u32::try_from(i).unwrap() * 2, &def, 0))
            .collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let outbound_a = Outbound::new();
        let outbound_b = Outbound::new();
        let mut a = table(1000);
        let mut b = table(1000);

        for now in [0.0, 0.2, 0.4] {
            let sa = advance_all(&mut a, now, &outbound_a.writer(), 16);
            let sb = advance_all_sequential(&mut b, now, &outbound_b.writer());
            assert_eq!(sa, sb);
        }
        assert_eq!(a, b);

        let mut fa: Vec<FrameChanged> = outbound_a.drain_frames().collect();
        let fb: Vec<FrameChanged> = outbound_b.drain_frames().collect();
        fa.sort_by_key(|n| n.slot);
        assert_eq!(fa.len(), fb.len());
        assert_eq!(fa.len(), 2000);
    }

    #[test]
    fn test_notifications_are_stamped() {
        let outbound = Outbound::new();
        let mut records = table(3);
        records[1].retire();

        advance_all(&mut records, 0.0, &outbound.writer(), 1);
        let stats = advance_all(&mut records, 0.2, &outbound.writer(), 1);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.events, 2);

        let mut frames: Vec<FrameChanged> = outbound.drain_frames().collect();
        frames.sort_by_key(|n| n.slot);
        assert_eq!(frames[0].handle().index(), 0);
        assert_eq!(frames[1].handle().index(), 2);
        assert_eq!(frames[1].generation, 4);
        assert!(frames.iter().all(|n| n.frame == 1));
    }

    #[test]
    fn test_empty_table() {
        let outbound = Outbound::new();
        let stats = advance_all(&mut [], 1.0, &outbound.writer(), 64);
        assert_eq!(stats, AdvanceStats::default());
        assert_eq!(outbound.pending(), 0);
    }

    #[test]
    #[should_panic]
    fn test_unknown_style_propagates() {
        let outbound = Outbound::new();
        let mut records = table(64);
        advance_all(&mut records, 0.0, &outbound.writer(), 1);
        records[40].style = 200;
        advance_all(&mut records, 1.0, &outbound.writer(), 1);
    }
}

#![forbid(unsafe_code)]

//! Transition-animation collaborator.
//!
//! The orchestration layer never plays animations itself; it hands a visual
//! tree to an [`Animator`] and receives an [`FxTicket`] for the running
//! transition. Completions are queued inside the animator and drained by the
//! driving loop, which routes each ticket back to the controller that
//! started it.
//!
//! # Usage
//!
//! ```ignore
//! let mut fx = TimedFx::new();
//! let ticket = fx.animate_show(&mut visual);
//! // ... per tick ...
//! fx.tick(dt);
//! for done in fx.drain_finished() {
//!     controller.complete(done);
//! }
//! ```
//!
//! # Invariants
//!
//! 1. A ticket appears in at most one drain, exactly once, unless it was
//!    [`discard`](Animator::discard)ed first (then never).
//! 2. Tickets finish in completion order; ties complete in start order.
//! 3. `drain_finished` clears the queue; completions are not replayed.
//! 4. Completion may happen ticks after the transition started; the caller
//!    must not assume same-tick delivery.
//!
//! # Design
//!
//! Queue-and-drain instead of completion closures: the driving loop stays
//! the single place where control re-enters controllers, and a destroyed
//! view simply discards its tickets instead of needing its callbacks
//! defused. Concrete tween playback (fades, slides) belongs to the host
//! engine; the built-in animators model timing only.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::visual::VisualTree;

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for one running transition.
///
/// Allocated from a process-wide counter so tickets from different animators
/// never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FxTicket(u64);

impl FxTicket {
    /// Allocates a fresh, unique ticket. For [`Animator`] implementations.
    #[must_use]
    pub fn allocate() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FxTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fx#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// Plays show/hide transitions and reports completion by ticket.
pub trait Animator {
    /// Starts a show transition on `visual`, returning its ticket.
    fn animate_show(&mut self, visual: &mut VisualTree) -> FxTicket;

    /// Starts a hide transition on `visual`, returning its ticket.
    fn animate_hide(&mut self, visual: &mut VisualTree) -> FxTicket;

    /// Advances all pending transitions by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Takes every ticket that finished since the last drain.
    fn drain_finished(&mut self) -> Vec<FxTicket>;

    /// Forgets `ticket`; it will never appear in a drain. No-op for unknown
    /// tickets.
    fn discard(&mut self, ticket: FxTicket);
}

// ---------------------------------------------------------------------------
// ImmediateFx
// ---------------------------------------------------------------------------

/// Zero-duration animator: every transition finishes on the next drain.
///
/// The headless choice for tests and tick-less hosts.
#[derive(Debug, Default)]
pub struct ImmediateFx {
    finished: Vec<FxTicket>,
}

impl ImmediateFx {
    /// Creates an immediate animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Animator for ImmediateFx {
    fn animate_show(&mut self, _visual: &mut VisualTree) -> FxTicket {
        let ticket = FxTicket::allocate();
        self.finished.push(ticket);
        ticket
    }

    fn animate_hide(&mut self, _visual: &mut VisualTree) -> FxTicket {
        let ticket = FxTicket::allocate();
        self.finished.push(ticket);
        ticket
    }

    fn tick(&mut self, _dt: Duration) {}

    fn drain_finished(&mut self) -> Vec<FxTicket> {
        std::mem::take(&mut self.finished)
    }

    fn discard(&mut self, ticket: FxTicket) {
        self.finished.retain(|t| *t != ticket);
    }
}

// ---------------------------------------------------------------------------
// TimedFx
// ---------------------------------------------------------------------------

struct PendingFx {
    ticket: FxTicket,
    elapsed: Duration,
}

/// Fixed-schedule animator: every transition completes after
/// `delay + duration` of ticked time.
pub struct TimedFx {
    delay: Duration,
    duration: Duration,
    pending: Vec<PendingFx>,
    finished: Vec<FxTicket>,
}

impl TimedFx {
    /// Default lead-in before a transition starts progressing.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);
    /// Default transition length.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(200);

    /// Creates an animator with the default schedule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            duration: Self::DEFAULT_DURATION,
            pending: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Overrides the lead-in delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Overrides the transition length.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Number of transitions still running.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn begin(&mut self) -> FxTicket {
        let ticket = FxTicket::allocate();
        self.pending.push(PendingFx {
            ticket,
            elapsed: Duration::ZERO,
        });
        ticket
    }
}

impl Animator for TimedFx {
    fn animate_show(&mut self, _visual: &mut VisualTree) -> FxTicket {
        self.begin()
    }

    fn animate_hide(&mut self, _visual: &mut VisualTree) -> FxTicket {
        self.begin()
    }

    fn tick(&mut self, dt: Duration) {
        let total = self.delay + self.duration;
        let pending = std::mem::take(&mut self.pending);
        for mut fx in pending {
            fx.elapsed += dt;
            if fx.elapsed >= total {
                self.finished.push(fx.ticket);
            } else {
                self.pending.push(fx);
            }
        }
    }

    fn drain_finished(&mut self) -> Vec<FxTicket> {
        std::mem::take(&mut self.finished)
    }

    fn discard(&mut self, ticket: FxTicket) {
        let before = self.pending.len() + self.finished.len();
        self.pending.retain(|fx| fx.ticket != ticket);
        self.finished.retain(|t| *t != ticket);
        if self.pending.len() + self.finished.len() == before {
            debug!(%ticket, "discard of unknown ticket ignored");
        }
    }
}

impl Default for TimedFx {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimedFx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedFx")
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("pending", &self.pending.len())
            .field("finished", &self.finished.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_200: Duration = Duration::from_millis(200);
    const MS_400: Duration = Duration::from_millis(400);

    fn tree() -> VisualTree {
        VisualTree::new("panels/test", Box::new(()))
    }

    // ---- tickets ----

    #[test]
    fn tickets_are_unique() {
        let a = FxTicket::allocate();
        let b = FxTicket::allocate();
        assert_ne!(a, b);
    }

    // ---- ImmediateFx ----

    #[test]
    fn immediate_completes_on_next_drain() {
        let mut fx = ImmediateFx::new();
        let mut visual = tree();
        let show = fx.animate_show(&mut visual);
        let hide = fx.animate_hide(&mut visual);

        assert_eq!(fx.drain_finished(), vec![show, hide]);
        assert!(fx.drain_finished().is_empty(), "drain must clear the queue");
    }

    #[test]
    fn immediate_discard_suppresses_completion() {
        let mut fx = ImmediateFx::new();
        let mut visual = tree();
        let show = fx.animate_show(&mut visual);
        fx.discard(show);
        assert!(fx.drain_finished().is_empty());
    }

    // ---- TimedFx ----

    #[test]
    fn timed_completes_after_delay_plus_duration() {
        let mut fx = TimedFx::new();
        let mut visual = tree();
        let ticket = fx.animate_show(&mut visual);

        fx.tick(MS_200);
        assert!(fx.drain_finished().is_empty(), "still inside the schedule");
        fx.tick(MS_200);
        assert_eq!(fx.drain_finished(), vec![ticket]);
        assert_eq!(fx.pending_count(), 0);
    }

    #[test]
    fn timed_schedule_is_configurable() {
        let mut fx = TimedFx::new().delay(Duration::ZERO).duration(MS_100);
        let mut visual = tree();
        let ticket = fx.animate_hide(&mut visual);

        fx.tick(MS_100);
        assert_eq!(fx.drain_finished(), vec![ticket]);
    }

    #[test]
    fn timed_completion_spans_multiple_ticks() {
        let mut fx = TimedFx::new();
        let mut visual = tree();
        let ticket = fx.animate_show(&mut visual);

        for _ in 0..3 {
            fx.tick(MS_100);
            assert!(fx.drain_finished().is_empty());
        }
        fx.tick(MS_100);
        assert_eq!(fx.drain_finished(), vec![ticket]);
    }

    #[test]
    fn timed_ties_complete_in_start_order() {
        let mut fx = TimedFx::new();
        let mut visual = tree();
        let first = fx.animate_show(&mut visual);
        let second = fx.animate_hide(&mut visual);

        fx.tick(MS_400);
        assert_eq!(fx.drain_finished(), vec![first, second]);
    }

    #[test]
    fn timed_discard_forgets_pending() {
        let mut fx = TimedFx::new();
        let mut visual = tree();
        let ticket = fx.animate_show(&mut visual);
        fx.discard(ticket);

        fx.tick(MS_400);
        assert!(fx.drain_finished().is_empty());
        assert_eq!(fx.pending_count(), 0);
    }

    #[test]
    fn earlier_start_completes_first() {
        let mut fx = TimedFx::new().delay(Duration::ZERO).duration(MS_200);
        let mut visual = tree();
        let first = fx.animate_show(&mut visual);
        fx.tick(MS_100);
        let second = fx.animate_hide(&mut visual);

        fx.tick(MS_100);
        assert_eq!(fx.drain_finished(), vec![first]);
        fx.tick(MS_100);
        assert_eq!(fx.drain_finished(), vec![second]);
    }

    // ---- properties ----

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_ticket_drains_exactly_once(
                starts in prop::collection::vec(0u64..10, 1..20)
            ) {
                let mut fx = TimedFx::new().delay(Duration::ZERO).duration(MS_100);
                let mut visual = tree();
                let mut issued = Vec::new();
                let mut drained = Vec::new();

                for gap in starts {
                    issued.push(fx.animate_show(&mut visual));
                    fx.tick(Duration::from_millis(gap * 20));
                    drained.extend(fx.drain_finished());
                }
                // Flush the stragglers.
                fx.tick(MS_400);
                drained.extend(fx.drain_finished());

                drained.sort();
                let mut expected = issued.clone();
                expected.sort();
                prop_assert_eq!(drained, expected);
            }
        }
    }
}

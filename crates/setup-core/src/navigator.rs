//! # Auto-Navigation Sequencer
//!
//! A small state machine that moves the "active category" focus through
//! [`CategoryId::SEQUENCE`] as the shopper fills required slots, and raises a
//! one-shot completion signal.
//!
//! ## Transitions
//!
//! | Trigger | Guard | Effect |
//! |---------|-------|--------|
//! | select `c` | auto on, `c == active`, `c` required | schedule advance at `now + delay` (replaces any pending one) |
//! | poll `now` | pending due, `active == pending.from` | `active = next(from)`, emit `Advanced` |
//! | remove `c` | auto on, `c == active`, `c` required, other slots populated | emit `RequiredCategoryVacated` |
//! | next / previous / focus | none | move `active` (clamped), cancel pending |
//! | completion check | auto on, complete, ≥6 populated, state `Incomplete` | state `DialogPending`, emit `ConfigurationComplete` |
//! | acknowledge | state `DialogPending` | state `DialogShown` |
//!
//! Time is injected through [`Clock`]; the navigator never spawns timers. The
//! owner polls it, which keeps the machine deterministic and replayable.
//!
//! When auto-navigate is off every automatic transition is inert; manual
//! navigation keeps working.

use crate::primitives::{AUTO_ADVANCE_DELAY_MS, COMPLETION_DIALOG_MIN_POPULATED};
use crate::{CategoryId, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

// =============================================================================
// CLOCK
// =============================================================================

/// Monotonic millisecond clock.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// =============================================================================
// STATES & EVENTS
// =============================================================================

/// Completion dialog state.
///
/// Only [`Navigator::reset`] returns to `Incomplete`; losing completeness
/// afterwards does not re-arm the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Incomplete,
    DialogPending,
    DialogShown,
}

/// A scheduled auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAdvance {
    pub from: CategoryId,
    pub due_at_ms: u64,
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfiguratorEvent {
    /// Focus moved automatically after a selection.
    Advanced { from: CategoryId, to: CategoryId },
    /// The active required category was emptied while others are filled.
    RequiredCategoryVacated { category: CategoryId },
    /// Show the completion dialog. Emitted at most once per session.
    ConfigurationComplete,
}

impl fmt::Display for ConfiguratorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfiguratorEvent::Advanced { from, to } => {
                write!(f, "moved from {} to {}", from.label(), to.label())
            }
            ConfiguratorEvent::RequiredCategoryVacated { category } => {
                write!(f, "{} is required to continue", category.label())
            }
            ConfiguratorEvent::ConfigurationComplete => f.write_str("configuration complete"),
        }
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Active-category state machine.
#[derive(Debug, Clone)]
pub struct Navigator {
    active: CategoryId,
    auto_navigate: bool,
    delay_ms: u64,
    pending: Option<PendingAdvance>,
    completion: CompletionState,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Start at the first category with auto-navigate on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: CategoryId::SEQUENCE[0],
            auto_navigate: true,
            delay_ms: AUTO_ADVANCE_DELAY_MS,
            pending: None,
            completion: CompletionState::Incomplete,
        }
    }

    /// Override the debounce delay.
    #[must_use]
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn active(&self) -> CategoryId {
        self.active
    }

    #[must_use]
    pub fn auto_navigate(&self) -> bool {
        self.auto_navigate
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingAdvance> {
        self.pending
    }

    #[must_use]
    pub fn completion(&self) -> CompletionState {
        self.completion
    }

    /// Toggle auto-navigation. Turning it off drops any pending advance.
    pub fn set_auto_navigate(&mut self, enabled: bool) {
        self.auto_navigate = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    /// React to a selection in `category` at time `now_ms`.
    pub fn on_selected(&mut self, category: CategoryId, now_ms: u64) {
        if !self.auto_navigate || category != self.active || !category.is_required() {
            return;
        }
        if category.next().is_none() {
            return;
        }
        self.pending = Some(PendingAdvance {
            from: category,
            due_at_ms: now_ms.saturating_add(self.delay_ms),
        });
    }

    /// React to `category` having been emptied. `selection` is the state after removal.
    pub fn on_removed(
        &mut self,
        category: CategoryId,
        selection: &Selection,
    ) -> Option<ConfiguratorEvent> {
        if self.pending.is_some_and(|p| p.from == category) {
            self.pending = None;
        }
        if !self.auto_navigate || category != self.active || !category.is_required() {
            return None;
        }
        if selection.is_empty() {
            return None;
        }
        Some(ConfiguratorEvent::RequiredCategoryVacated { category })
    }

    /// Fire the pending advance if it is due.
    pub fn poll(&mut self, now_ms: u64) -> Option<ConfiguratorEvent> {
        let pending = self.pending.filter(|p| now_ms >= p.due_at_ms)?;
        self.pending = None;
        if !self.auto_navigate || self.active != pending.from {
            return None;
        }
        let to = pending.from.next()?;
        self.active = to;
        tracing::debug!(from = %pending.from, to = %to, "auto-advanced");
        Some(ConfiguratorEvent::Advanced {
            from: pending.from,
            to,
        })
    }

    /// Move one step forward, clamped at the end. Returns whether focus moved.
    pub fn navigate_next(&mut self) -> bool {
        let target = self.active.next().unwrap_or(self.active);
        self.focus(target)
    }

    /// Move one step back, clamped at the start. Returns whether focus moved.
    pub fn navigate_previous(&mut self) -> bool {
        let target = self.active.previous().unwrap_or(self.active);
        self.focus(target)
    }

    /// Jump to `category`. Cancels any pending advance.
    pub fn focus(&mut self, category: CategoryId) -> bool {
        self.pending = None;
        let moved = self.active != category;
        self.active = category;
        moved
    }

    /// Arm the completion dialog if the selection now qualifies.
    pub fn check_completion(&mut self, selection: &Selection) -> Option<ConfiguratorEvent> {
        if !self.auto_navigate || self.completion != CompletionState::Incomplete {
            return None;
        }
        if !selection.is_complete() || selection.len() < COMPLETION_DIALOG_MIN_POPULATED {
            return None;
        }
        self.completion = CompletionState::DialogPending;
        Some(ConfiguratorEvent::ConfigurationComplete)
    }

    /// The presentation layer has shown the dialog.
    pub fn acknowledge_completion(&mut self) {
        if self.completion == CompletionState::DialogPending {
            self.completion = CompletionState::DialogShown;
        }
    }

    /// Back to the first category; completion re-armed. The auto-navigate
    /// toggle and delay are kept.
    pub fn reset(&mut self) {
        self.active = CategoryId::SEQUENCE[0];
        self.pending = None;
        self.completion = CompletionState::Incomplete;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, Price};

    fn part(category: CategoryId) -> Component {
        Component::new(category.as_str(), category, category.label(), Price(1_000))
    }

    #[test]
    fn advance_waits_for_delay() {
        let mut nav = Navigator::new();
        nav.on_selected(CategoryId::Cpu, 1_000);

        assert_eq!(nav.poll(1_499), None);
        assert_eq!(nav.active(), CategoryId::Cpu);
        assert_eq!(
            nav.poll(1_500),
            Some(ConfiguratorEvent::Advanced {
                from: CategoryId::Cpu,
                to: CategoryId::Motherboard
            })
        );
        assert_eq!(nav.active(), CategoryId::Motherboard);
        assert_eq!(nav.poll(5_000), None);
    }

    #[test]
    fn reselect_reschedules_instead_of_double_firing() {
        let mut nav = Navigator::new();
        nav.on_selected(CategoryId::Cpu, 0);
        nav.on_selected(CategoryId::Cpu, 400);

        assert_eq!(nav.poll(500), None);
        assert!(nav.poll(900).is_some());
        assert_eq!(nav.active(), CategoryId::Motherboard);
        assert_eq!(nav.poll(10_000), None);
    }

    #[test]
    fn selecting_other_category_does_not_schedule() {
        let mut nav = Navigator::new();
        nav.on_selected(CategoryId::Gpu, 0);
        assert!(nav.pending().is_none());
    }

    #[test]
    fn optional_case_does_not_schedule() {
        let mut nav = Navigator::new();
        nav.focus(CategoryId::Case);
        nav.on_selected(CategoryId::Case, 0);
        assert!(nav.pending().is_none());
    }

    #[test]
    fn psu_advances_to_case_then_stops() {
        let mut nav = Navigator::new();
        nav.focus(CategoryId::Psu);
        nav.on_selected(CategoryId::Psu, 0);
        assert!(nav.poll(AUTO_ADVANCE_DELAY_MS).is_some());
        assert_eq!(nav.active(), CategoryId::Case);
    }

    #[test]
    fn manual_navigation_clamps_and_cancels() {
        let mut nav = Navigator::new();
        assert!(!nav.navigate_previous());
        assert_eq!(nav.active(), CategoryId::Cpu);

        nav.on_selected(CategoryId::Cpu, 0);
        assert!(nav.navigate_next());
        assert!(nav.pending().is_none());

        nav.focus(CategoryId::Case);
        assert!(!nav.navigate_next());
        assert_eq!(nav.active(), CategoryId::Case);
    }

    #[test]
    fn vacated_warning_needs_other_slots() {
        let mut nav = Navigator::new();
        let empty = Selection::new();
        assert_eq!(nav.on_removed(CategoryId::Cpu, &empty), None);

        let mut others = Selection::new();
        others.select(CategoryId::Gpu, part(CategoryId::Gpu));
        assert_eq!(
            nav.on_removed(CategoryId::Cpu, &others),
            Some(ConfiguratorEvent::RequiredCategoryVacated {
                category: CategoryId::Cpu
            })
        );
        assert_eq!(nav.active(), CategoryId::Cpu);
    }

    #[test]
    fn disabled_navigator_is_inert() {
        let mut nav = Navigator::new();
        nav.set_auto_navigate(false);
        nav.on_selected(CategoryId::Cpu, 0);
        assert_eq!(nav.poll(10_000), None);

        let full: Selection = CategoryId::SEQUENCE.iter().map(|c| (*c, part(*c))).collect();
        assert_eq!(nav.check_completion(&full), None);
        assert!(nav.navigate_next());
    }

    #[test]
    fn completion_is_one_shot() {
        let mut nav = Navigator::new();
        let mut selection: Selection = CategoryId::required().map(|c| (c, part(c))).collect();

        assert_eq!(
            nav.check_completion(&selection),
            Some(ConfiguratorEvent::ConfigurationComplete)
        );
        nav.acknowledge_completion();
        assert_eq!(nav.completion(), CompletionState::DialogShown);

        selection.remove(CategoryId::Ram);
        assert_eq!(nav.check_completion(&selection), None);
        selection.select(CategoryId::Ram, part(CategoryId::Ram));
        assert_eq!(nav.check_completion(&selection), None);
        assert_eq!(nav.completion(), CompletionState::DialogShown);

        nav.reset();
        assert_eq!(
            nav.check_completion(&selection),
            Some(ConfiguratorEvent::ConfigurationComplete)
        );
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now_ms(), 250);
        handle.set(10);
        assert_eq!(clock.now_ms(), 10);
    }
}

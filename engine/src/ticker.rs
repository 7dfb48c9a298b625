//! Clocks that drive a battle.
//!
//! A tick source hands out listener handles and reports the elapsed time of
//! the current tick. Whoever subscribed decides what a listener does; the
//! clock only records who is still listening.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listeners carry no callback. The clock owner pumps the battle itself by
/// calling `BattleManager::on_tick` after each `advance`, and the manager
/// checks its handles with `is_listening` to decide who acts.
pub trait TickSource {
    /// Register a listener; the returned handle removes it again.
    fn add(&mut self) -> ListenerId;

    /// Returns false if `id` was not registered.
    fn remove(&mut self, id: ListenerId) -> bool;

    fn is_listening(&self, id: ListenerId) -> bool;

    fn listener_count(&self) -> usize;

    /// Milliseconds elapsed during the current tick.
    fn delta_ms(&self) -> f64;

    /// Total milliseconds delivered so far.
    fn elapsed_ms(&self) -> f64;

    /// Move to the next tick. Returns false once the clock has stopped.
    fn advance(&mut self) -> bool;
}

#[derive(Debug, Clone, Default)]
struct Listeners {
    next: u64,
    active: Vec<ListenerId>,
}

impl Listeners {
    fn add(&mut self) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.active.push(id);
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.active.len();
        self.active.retain(|l| *l != id);
        self.active.len() != before
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.active.contains(&id)
    }
}

/// Fixed-step virtual clock.
#[derive(Debug, Clone)]
pub struct FixedTicker {
    step_ms: f64,
    limit: Option<u64>,
    ticks: u64,
    listeners: Listeners,
}

impl FixedTicker {
    /// Panics unless `step_ms` is positive and finite.
    pub fn new(step_ms: f64) -> Self {
        assert!(step_ms.is_finite() && step_ms > 0.0, "tick step must be positive, got {step_ms}");
        Self { step_ms, limit: None, ticks: 0, listeners: Listeners::default() }
    }

    pub fn sixty_fps() -> Self {
        Self::new(1000.0 / 60.0)
    }

    /// Stop after `ticks` ticks.
    pub fn with_limit(mut self, ticks: u64) -> Self {
        self.limit = Some(ticks);
        self
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl TickSource for FixedTicker {
    fn add(&mut self) -> ListenerId {
        self.listeners.add()
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn is_listening(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    fn listener_count(&self) -> usize {
        self.listeners.active.len()
    }

    fn delta_ms(&self) -> f64 {
        self.step_ms
    }

    fn elapsed_ms(&self) -> f64 {
        self.step_ms * self.ticks as f64
    }

    fn advance(&mut self) -> bool {
        if self.limit.is_some_and(|limit| self.ticks >= limit) {
            return false;
        }
        self.ticks += 1;
        true
    }
}

/// Plays back a fixed list of frame deltas, then stops.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTicker {
    pending: VecDeque<f64>,
    current: f64,
    elapsed: f64,
    listeners: Listeners,
}

impl ScriptedTicker {
    /// Negative deltas are treated as zero: time never runs backwards.
    pub fn new(deltas: impl IntoIterator<Item = f64>) -> Self {
        Self {
            pending: deltas.into_iter().map(|d| d.max(0.0)).collect(),
            ..Self::default()
        }
    }
}

impl TickSource for ScriptedTicker {
    fn add(&mut self) -> ListenerId {
        self.listeners.add()
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn is_listening(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    fn listener_count(&self) -> usize {
        self.listeners.active.len()
    }

    fn delta_ms(&self) -> f64 {
        self.current
    }

    fn elapsed_ms(&self) -> f64 {
        self.elapsed
    }

    fn advance(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(delta) => {
                self.current = delta;
                self.elapsed += delta;
                true
            }
            None => {
                self.current = 0.0;
                false
            }
        }
    }
}

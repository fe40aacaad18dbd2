//! Cooperative task runner.
//!
//! Single-threaded, non-preemptive. One pass of [`TaskRunner::run_once`]
//! services every registered task; the main loop calls it forever. Tasks
//! must return promptly; there is no yield primitive, so a slow callback
//! stalls every other task, including the actuation checks.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        run_once(now)                         │
//! │                                                              │
//! │  1. every-cycle tasks (interval 0)      registration order   │
//! │  2. due interval tasks (at most 1×)     registration order   │
//! │  3. due one-shot tasks (then removed)   scheduling order     │
//! │                                                              │
//! │  one-shots spawned during the pass are merged afterwards     │
//! │  and become eligible from the NEXT pass                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The runner is generic over a context type `C` so the same engine
//! drives the flight vehicle in production and plain structs in tests.

use log::{debug, info};

/// Callback type for periodic tasks. Receives the pass timestamp, the
/// shared context, and a [`Spawner`] for deferred continuations.
pub type PeriodicFn<C> = Box<dyn FnMut(u64, &mut C, &mut Spawner<C>)>;

/// Callback type for one-shot tasks. Consumed when fired.
pub type DeferredFn<C> = Box<dyn FnOnce(u64, &mut C, &mut Spawner<C>)>;

struct Periodic<C> {
    name: &'static str,
    /// 0 = run every cycle, unconditionally.
    interval_ms: u64,
    /// `None` until the first pass after registration (due immediately).
    next_due_ms: Option<u64>,
    run: PeriodicFn<C>,
}

struct Deferred<C> {
    name: &'static str,
    fire_at_ms: u64,
    run: DeferredFn<C>,
}

// ═══════════════════════════════════════════════════════════════
//  Spawner
// ═══════════════════════════════════════════════════════════════

/// Handle passed into every callback for scheduling one-shot work.
///
/// Appending through the spawner rather than into the runner's own
/// collection keeps scheduling safe while the runner is mid-iteration:
/// spawned tasks are collected here and merged once the pass completes,
/// so a continuation can never run within the pass that scheduled it.
pub struct Spawner<C> {
    now_ms: u64,
    spawned: Vec<Deferred<C>>,
}

impl<C> Spawner<C> {
    fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            spawned: Vec::new(),
        }
    }

    /// Timestamp of the current pass.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `run` to fire once `delay_ms` has elapsed from now.
    ///
    /// No handle is returned: once scheduled, a continuation belongs to
    /// the runner and cannot be cancelled.
    pub fn after(
        &mut self,
        name: &'static str,
        delay_ms: u64,
        run: impl FnOnce(u64, &mut C, &mut Spawner<C>) + 'static,
    ) {
        debug!("spawner: '{}' in {} ms", name, delay_ms);
        self.spawned.push(Deferred {
            name,
            fire_at_ms: self.now_ms + delay_ms,
            run: Box::new(run),
        });
    }
}

// ═══════════════════════════════════════════════════════════════
//  Task runner
// ═══════════════════════════════════════════════════════════════

/// The cooperative scheduler. Owns every task for the process lifetime;
/// periodic tasks are registered once at startup, one-shots come and go.
pub struct TaskRunner<C> {
    periodic: Vec<Periodic<C>>,
    deferred: Vec<Deferred<C>>,
}

impl<C> TaskRunner<C> {
    pub fn new() -> Self {
        Self {
            periodic: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Register a periodic task. `interval_ms == 0` means "every cycle".
    ///
    /// Registration order is preserved and is the execution order within
    /// each class; callers with ordering dependencies rely on it.
    pub fn periodic(
        &mut self,
        name: &'static str,
        interval_ms: u64,
        run: impl FnMut(u64, &mut C, &mut Spawner<C>) + 'static,
    ) {
        info!("runner: registered '{}' every {} ms", name, interval_ms);
        self.periodic.push(Periodic {
            name,
            interval_ms,
            next_due_ms: None,
            run: Box::new(run),
        });
    }

    /// Schedule a one-shot task from outside any callback (startup or
    /// tests). Within a callback, use the [`Spawner`] argument instead.
    pub fn schedule_after(
        &mut self,
        name: &'static str,
        now_ms: u64,
        delay_ms: u64,
        run: impl FnOnce(u64, &mut C, &mut Spawner<C>) + 'static,
    ) {
        self.deferred.push(Deferred {
            name,
            fire_at_ms: now_ms + delay_ms,
            run: Box::new(run),
        });
    }

    /// Execute one scheduling pass. Never blocks. Returns the number of
    /// callbacks invoked, so callers can observe an idle pass.
    ///
    /// Every-cycle tasks run first, then interval tasks whose due time
    /// has passed (at most once each, even if several intervals elapsed;
    /// an overdue task catches up one fire per pass, and its due time
    /// stays on the cadence grid fixed at its first fire, so a late poll
    /// never causes task-flooding or cadence drift), then due one-shots,
    /// which are removed after running.
    pub fn run_once(&mut self, now_ms: u64, ctx: &mut C) -> usize {
        let mut spawner = Spawner::new(now_ms);
        let mut ran = 0;

        // 1. Every-cycle tasks.
        for task in self.periodic.iter_mut().filter(|t| t.interval_ms == 0) {
            (task.run)(now_ms, ctx, &mut spawner);
            ran += 1;
        }

        // 2. Interval-gated tasks. A freshly registered task is due on
        //    its first pass; from then on the cadence is due-time based,
        //    not now-based.
        for task in self.periodic.iter_mut().filter(|t| t.interval_ms > 0) {
            let due = *task.next_due_ms.get_or_insert(now_ms);
            if now_ms < due {
                continue;
            }
            (task.run)(now_ms, ctx, &mut spawner);
            ran += 1;

            let mut next = due + task.interval_ms;
            if next <= now_ms {
                // Polled late: skip the missed slots, keep the grid.
                let missed = (now_ms - due) / task.interval_ms;
                next = due + (missed + 1) * task.interval_ms;
                debug!("runner: '{}' skipped {} overdue slot(s)", task.name, missed);
            }
            task.next_due_ms = Some(next);
        }

        // 3. Due one-shots. Snapshot the due set before executing so a
        //    continuation scheduled inside a one-shot cannot be observed
        //    by this same pass.
        let mut due = Vec::new();
        let mut pending = Vec::new();
        for d in self.deferred.drain(..) {
            if d.fire_at_ms <= now_ms {
                due.push(d);
            } else {
                pending.push(d);
            }
        }
        self.deferred = pending;
        for d in due {
            debug!("runner: one-shot '{}' fired", d.name);
            (d.run)(now_ms, ctx, &mut spawner);
            ran += 1;
        }

        // Merge work spawned during this pass.
        self.deferred.append(&mut spawner.spawned);
        ran
    }

    /// Number of registered periodic tasks.
    pub fn periodic_count(&self) -> usize {
        self.periodic.len()
    }

    /// Number of one-shot tasks still pending.
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Drop every task (end of mission). The runner is idle afterwards:
    /// further passes invoke nothing.
    pub fn clear(&mut self) {
        info!(
            "runner: cleared {} periodic / {} deferred task(s)",
            self.periodic.len(),
            self.deferred.len()
        );
        self.periodic.clear();
        self.deferred.clear();
    }
}

impl<C> Default for TaskRunner<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

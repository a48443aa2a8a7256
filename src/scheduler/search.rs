use super::cp::{Constraint, RosterModel};
use super::types::{BuildOptions, ScheduleError};
use crate::model::{Assignment, AvailabilityTable};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const EPS: f64 = 1e-6;

/// Result of one search run. `Exhausted` is a proof that no accepted
/// assignment exists; `TimedOut` only says none was found in time.
#[derive(Debug, Clone)]
enum Outcome {
    Found(Vec<bool>),
    Exhausted,
    TimedOut,
}

/// First feasible roster within the time bound.
pub(super) fn solve_feasible(
    table: &AvailabilityTable,
    opts: &BuildOptions,
) -> Result<Vec<Assignment>, ScheduleError> {
    let model = RosterModel::build(table);
    let deadline = Instant::now() + Duration::from_millis(opts.time_limit_ms);
    match race(&model, opts, deadline, &|_| true) {
        Outcome::Found(values) => Ok(model.extract(&values)),
        Outcome::Exhausted => Err(ScheduleError::Infeasible),
        Outcome::TimedOut => Err(ScheduleError::Timeout),
    }
}

/// Lexicographic optimization: minimize the load spread to optimality,
/// fix it, then maximize the number of filled variables. On timeout the
/// best roster found so far is returned; with none found at all the call
/// fails with `Timeout`.
pub(super) fn solve_optimizing(
    table: &AvailabilityTable,
    opts: &BuildOptions,
) -> Result<Vec<Assignment>, ScheduleError> {
    let model = RosterModel::build(table);
    let weight = opts.oncall_weight;
    let deadline = Instant::now() + Duration::from_millis(opts.time_limit_ms);

    let mut best = match race(&model, opts, deadline, &|_| true) {
        Outcome::Found(values) => values,
        Outcome::Exhausted => return Err(ScheduleError::Infeasible),
        Outcome::TimedOut => return Err(ScheduleError::Timeout),
    };

    // Phase 1: tighten the spread bound until no better roster exists.
    let mut best_spread = model.spread(&best, weight);
    loop {
        let bound = best_spread - EPS;
        match race(&model, opts, deadline, &|values| {
            model.spread(values, weight) < bound
        }) {
            Outcome::Found(values) => {
                best_spread = model.spread(&values, weight);
                best = values;
            }
            Outcome::Exhausted => break, // spread is optimal
            Outcome::TimedOut => return Ok(model.extract(&best)),
        }
    }

    // Phase 2: with the spread fixed, push the filled count up.
    let mut best_filled = model.filled(&best);
    loop {
        let spread_cap = best_spread + EPS;
        let target = best_filled + 1;
        match race(&model, opts, deadline, &|values| {
            model.spread(values, weight) <= spread_cap && model.filled(values) >= target
        }) {
            Outcome::Found(values) => {
                best_filled = model.filled(&values);
                best = values;
            }
            Outcome::Exhausted | Outcome::TimedOut => break,
        }
    }

    Ok(model.extract(&best))
}

/// Runs `opts.workers` searches over the same immutable model, each with
/// its own seeded branching order, and keeps the first hit. Losing
/// workers are told to stop through a shared flag, so no partial state
/// ever escapes.
fn race(
    model: &RosterModel,
    opts: &BuildOptions,
    deadline: Instant,
    accept: &(dyn Fn(&[bool]) -> bool + Sync),
) -> Outcome {
    let workers = opts.workers.max(1);
    if workers == 1 {
        let stop = AtomicBool::new(false);
        return Search::new(model, opts.seed, deadline, &stop, accept).run();
    }

    let stop = AtomicBool::new(false);
    let mut outcomes: Vec<Outcome> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let stop = &stop;
                scope.spawn(move || {
                    let seed = opts.seed.wrapping_add(w as u64);
                    let out = Search::new(model, seed, deadline, stop, accept).run();
                    if matches!(out, Outcome::Found(_)) {
                        stop.store(true, Ordering::Relaxed);
                    }
                    out
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    if let Some(hit) = outcomes.iter().position(|o| matches!(o, Outcome::Found(_))) {
        return outcomes.swap_remove(hit);
    }
    // One completed run without a hit proves there is none, even if the
    // other workers ran out of time.
    if outcomes.iter().any(|o| matches!(o, Outcome::Exhausted)) {
        Outcome::Exhausted
    } else {
        Outcome::TimedOut
    }
}

/// Depth-first search with unit-style propagation over the declared
/// cardinality windows.
struct Search<'a> {
    model: &'a RosterModel,
    order: Vec<usize>,
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    deadline: Instant,
    stop: &'a AtomicBool,
    accept: &'a (dyn Fn(&[bool]) -> bool + Sync),
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(
        model: &'a RosterModel,
        seed: u64,
        deadline: Instant,
        stop: &'a AtomicBool,
        accept: &'a (dyn Fn(&[bool]) -> bool + Sync),
    ) -> Self {
        // Branch shift by shift in day order; the doctor order inside a
        // shift is the per-worker diversification.
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order = Vec::with_capacity(model.vars.len());
        for group in &model.shift_groups {
            let mut group = group.clone();
            group.shuffle(&mut rng);
            order.extend(group);
        }
        Self {
            model,
            order,
            values: vec![None; model.vars.len()],
            trail: Vec::new(),
            deadline,
            stop,
            accept,
            nodes: 0,
        }
    }

    fn run(&mut self) -> Outcome {
        for ci in 0..self.model.constraints.len() {
            if !self.check(ci) {
                return Outcome::Exhausted;
            }
        }
        self.dfs(0)
    }

    fn dfs(&mut self, cursor: usize) -> Outcome {
        self.nodes += 1;
        if self.nodes % 256 == 0
            && (self.stop.load(Ordering::Relaxed) || Instant::now() >= self.deadline)
        {
            return Outcome::TimedOut;
        }

        let mut cursor = cursor;
        while cursor < self.order.len() && self.values[self.order[cursor]].is_some() {
            cursor += 1;
        }
        if cursor == self.order.len() {
            let complete: Vec<bool> = self.values.iter().map(|v| v.unwrap_or(false)).collect();
            return if (self.accept)(&complete) {
                Outcome::Found(complete)
            } else {
                Outcome::Exhausted
            };
        }

        let var = self.order[cursor];
        for value in [true, false] {
            let mark = self.trail.len();
            if self.assign(var, value) {
                match self.dfs(cursor + 1) {
                    Outcome::Exhausted => {}
                    other => return other,
                }
            }
            self.undo_to(mark);
        }
        Outcome::Exhausted
    }

    /// Assigns and propagates. Returns false on conflict; the trail keeps
    /// everything set since the caller's mark for rollback.
    fn assign(&mut self, var: usize, value: bool) -> bool {
        match self.values[var] {
            Some(v) => return v == value,
            None => {
                self.values[var] = Some(value);
                self.trail.push(var);
            }
        }
        for i in 0..self.model.watch[var].len() {
            let ci = self.model.watch[var][i];
            if !self.check(ci) {
                return false;
            }
        }
        true
    }

    /// Checks one constraint against the current values, forcing unit
    /// assignments where the window leaves no choice.
    fn check(&mut self, ci: usize) -> bool {
        let (active, vars, min, max) = match &self.model.constraints[ci] {
            Constraint::Sum { vars, min, max } => (Some(true), vars.clone(), *min, *max),
            Constraint::Implies {
                cond,
                vars,
                min,
                max,
            } => (self.values[*cond], vars.clone(), *min, *max),
        };

        let mut t = 0u32;
        let mut unset = 0u32;
        for &v in &vars {
            match self.values[v] {
                Some(true) => t += 1,
                Some(false) => {}
                None => unset += 1,
            }
        }
        let violated = t > max || t + unset < min;

        match active {
            Some(false) => true,
            None => {
                // Condition still open: a violated window forces it off.
                if violated {
                    if let Constraint::Implies { cond, .. } = &self.model.constraints[ci] {
                        let cond = *cond;
                        return self.assign(cond, false);
                    }
                }
                true
            }
            Some(true) => {
                if violated {
                    return false;
                }
                if unset > 0 && t == max {
                    for v in vars {
                        if self.values[v].is_none() && !self.assign(v, false) {
                            return false;
                        }
                    }
                } else if unset > 0 && t + unset == min {
                    for v in vars {
                        if self.values[v].is_none() && !self.assign(v, true) {
                            return false;
                        }
                    }
                }
                true
            }
        }
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let var = self.trail.pop().unwrap();
            self.values[var] = None;
        }
    }
}

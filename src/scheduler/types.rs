use std::str::FromStr;
use thiserror::Error;

/// How to build the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Single-pass randomized heuristic; fast, no optimality guarantee.
    Greedy,
    /// Exhaustive constraint search, first feasible roster.
    ExactFeasible,
    /// Exhaustive constraint search, balancing per-doctor load.
    ExactOptimizing,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Strategy::Greedy),
            "exact-feasible" => Ok(Strategy::ExactFeasible),
            "exact-optimizing" => Ok(Strategy::ExactOptimizing),
            other => Err(format!(
                "unknown strategy {other:?} (expected greedy, exact-feasible or exact-optimizing)"
            )),
        }
    }
}

/// Knobs for one `build_roster` call.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Seed for the greedy shuffles and the solver's branching orders.
    pub seed: u64,
    /// Wall-clock bound for the exact strategies, in milliseconds.
    pub time_limit_ms: u64,
    /// Search workers racing on the same model (exact strategies).
    pub workers: usize,
    /// Weight of one on-call relative to one duty in the load objective
    /// and the summary totals. Less than 1: on-call is the lighter burden.
    pub oncall_weight: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            time_limit_ms: 10_000,
            workers: 1,
            oncall_weight: 0.5,
        }
    }
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid input table: {0}")]
    Validation(String),
    /// The greedy pass ended with a required slot still empty.
    #[error("no legal assignment for shift {0}")]
    UnfilledShift(String),
    /// The greedy pass could not bring a doctor to the required duty
    /// count.
    #[error("no legal duty slots left for {0}")]
    DutyShortfall(String),
    /// The search proved that no roster satisfies the constraints.
    #[error("no roster satisfies the constraints")]
    Infeasible,
    /// The search hit its time bound before finding any roster.
    #[error("time limit reached before a roster was found")]
    Timeout,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

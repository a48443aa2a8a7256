pub mod audit;
mod cp;
mod greedy;
mod rules;
mod search;
mod types;

pub use types::{BuildOptions, ScheduleError, Strategy};

use crate::model::{AvailabilityTable, Roster};

/// Builds a complete month roster from the availability table, or fails
/// with a validation, infeasibility or timeout error. No state survives
/// the call; re-running the greedy strategy with the same seed gives the
/// same roster.
pub fn build_roster(
    table: &AvailabilityTable,
    strategy: Strategy,
    opts: &BuildOptions,
) -> Result<Roster, ScheduleError> {
    if table.doctors.is_empty() {
        return Err(ScheduleError::Validation("no doctors in the table".into()));
    }
    if table.shifts.is_empty() {
        return Err(ScheduleError::Validation(
            "no shift columns in the table".into(),
        ));
    }
    if !(0.0..1.0).contains(&opts.oncall_weight) {
        return Err(ScheduleError::Validation(
            "oncall_weight must be in [0, 1)".into(),
        ));
    }

    let assignments = match strategy {
        Strategy::Greedy => greedy::build(table, opts.seed)?,
        Strategy::ExactFeasible => search::solve_feasible(table, opts)?,
        Strategy::ExactOptimizing => search::solve_optimizing(table, opts)?,
    };

    #[cfg(feature = "logging")]
    tracing::debug!(
        strategy = ?strategy,
        shifts = table.shifts.len(),
        doctors = table.doctors.len(),
        "roster built"
    );

    Ok(Roster::from_assignments(table, &assignments, opts.oncall_weight))
}

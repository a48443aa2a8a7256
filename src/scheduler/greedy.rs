use super::rules::{PartialState, JUNIOR_DUTY_TARGET, SENIOR_DUTY_CAP, SENIOR_ONCALL_CAP};
use super::types::ScheduleError;
use crate::model::{Assignment, AvailabilityTable, SlotKind};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;

/// Builds a roster in one randomized pass, no backtracking.
///
/// The shuffle and tie-break order are entirely driven by `seed`; the
/// same seed on the same table reproduces the same roster.
pub(super) fn build(
    table: &AvailabilityTable,
    seed: u64,
) -> Result<Vec<Assignment>, ScheduleError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut assignments = vec![Assignment::default(); table.shifts.len()];
    let mut state = PartialState::new(table.doctors.len());

    let holiday_slots: Vec<usize> = shift_indices(table, SlotKind::HolidayPair);
    let single_slots: Vec<usize> = shift_indices(table, SlotKind::Single);

    // Pass 1: each junior takes one holiday-pair slot and one single slot.
    let mut juniors = table.juniors();
    juniors.shuffle(&mut rng);
    for &doc in &juniors {
        for slots in [&holiday_slots, &single_slots] {
            for &s in slots {
                let taken = match table.shifts[s].kind {
                    SlotKind::HolidayPair => assignments[s].duty_junior.is_some(),
                    SlotKind::Single => assignments[s].has_duty(),
                };
                if taken {
                    continue;
                }
                if state.can_assign(table, doc, s) {
                    assignments[s].duty_junior = Some(doc);
                    state = state.with_duty(table, doc, s);
                    if state.duty_count(doc) == JUNIOR_DUTY_TARGET {
                        break;
                    }
                }
            }
            if state.duty_count(doc) == JUNIOR_DUTY_TARGET {
                break;
            }
        }
    }

    // Juniors only gain duties in pass 1; one left short there cannot
    // recover later and must not come back as a partial roster.
    for &doc in &juniors {
        if state.duty_count(doc) < JUNIOR_DUTY_TARGET {
            return Err(ScheduleError::DutyShortfall(
                table.doctors[doc].name.clone(),
            ));
        }
    }

    // Pass 2: each senior without a duty yet takes the first legal slot
    // that still needs one, in day order.
    let mut seniors = table.seniors();
    seniors.shuffle(&mut rng);
    for &doc in &seniors {
        if state.duty_count(doc) > 0 {
            continue;
        }
        for s in 0..table.shifts.len() {
            if needs_senior_duty(table, &assignments[s], s) && state.can_assign(table, doc, s) {
                assignments[s].duty_senior = Some(doc);
                state = state.with_duty(table, doc, s);
                break;
            }
        }
    }

    // Pass 3: fill the remaining duty slots from seniors under their cap,
    // chosen uniformly at random.
    for s in 0..table.shifts.len() {
        if !needs_senior_duty(table, &assignments[s], s) {
            continue;
        }
        let candidates: Vec<usize> = seniors
            .iter()
            .copied()
            .filter(|&d| state.duty_count(d) < SENIOR_DUTY_CAP && state.can_assign(table, d, s))
            .collect();
        if let Some(&doc) = candidates.choose(&mut rng) {
            assignments[s].duty_senior = Some(doc);
            state = state.with_duty(table, doc, s);
        }
    }

    // Every required duty slot must be filled before the on-call pass.
    for s in 0..table.shifts.len() {
        let asg = &assignments[s];
        let missing = match table.shifts[s].kind {
            SlotKind::HolidayPair => asg.duty_junior.is_none() || asg.duty_senior.is_none(),
            SlotKind::Single => !asg.has_duty(),
        };
        if missing {
            return Err(ScheduleError::UnfilledShift(table.shifts[s].id.clone()));
        }
    }

    // Pass 4: on-call for every junior-led single slot. If no senior
    // passes the full predicate the spacing filter is relaxed to plain
    // availability; the per-senior on-call cap holds in both pools.
    for &s in &single_slots {
        if assignments[s].duty_junior.is_none() {
            continue;
        }
        let eligible = |d: usize| {
            !assignments[s].involves(d) && state.oncall_count(d) < SENIOR_ONCALL_CAP
        };
        let strict: Vec<usize> = seniors
            .iter()
            .copied()
            .filter(|&d| eligible(d) && state.can_assign(table, d, s))
            .collect();
        let relaxed: Vec<usize>;
        let pool = if strict.is_empty() {
            relaxed = seniors
                .iter()
                .copied()
                .filter(|&d| eligible(d) && table.is_available(d, s))
                .collect();
            &relaxed
        } else {
            &strict
        };
        match pool.choose(&mut rng) {
            Some(&doc) => {
                assignments[s].oncall = Some(doc);
                state = state.with_oncall(table, doc, s);
            }
            None => return Err(ScheduleError::UnfilledShift(table.shifts[s].id.clone())),
        }
    }

    Ok(assignments)
}

fn shift_indices(table: &AvailabilityTable, kind: SlotKind) -> Vec<usize> {
    (0..table.shifts.len())
        .filter(|&i| table.shifts[i].kind == kind)
        .collect()
}

/// Whether the slot still needs the duty doctor a senior can provide:
/// the senior half of a holiday pair, or any empty single slot.
fn needs_senior_duty(table: &AvailabilityTable, asg: &Assignment, shift: usize) -> bool {
    match table.shifts[shift].kind {
        SlotKind::HolidayPair => asg.duty_senior.is_none(),
        SlotKind::Single => !asg.has_duty(),
    }
}

//! Invariant checks over a finished roster.
//!
//! `verify` replays the published roster against the availability table
//! and reports every broken rule; an empty report means the roster is
//! valid. Used by the CLI `check` command and the test suite.

use crate::model::{AvailabilityTable, Group, Roster, SlotKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Duty/on-call fields do not match the slot kind.
    SlotComposition,
    /// Two assignments of one doctor closer than 3 days.
    Spacing,
    /// More than one duty in one ISO week.
    WeeklyCap,
    /// More than one holiday-pair duty in the month.
    HolidayQuota,
    /// Monthly duty count outside the group's range.
    DutyCount,
    /// Monthly on-call count outside the group's range.
    OncallCount,
    /// Assignment on a shift the doctor was not available for.
    Unavailable,
    /// Name in the roster that the table does not know.
    UnknownName,
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Doctor concerned, when the rule is per-doctor.
    pub doctor: Option<String>,
    /// Shift concerned, when the rule is per-shift.
    pub shift: Option<String>,
    pub detail: String,
}

fn violation(
    kind: ViolationKind,
    doctor: Option<&str>,
    shift: Option<&str>,
    detail: String,
) -> Violation {
    Violation {
        kind,
        doctor: doctor.map(str::to_string),
        shift: shift.map(str::to_string),
        detail,
    }
}

/// Checks every roster invariant. Order of the report follows the shifts,
/// then the doctors.
pub fn verify(table: &AvailabilityTable, roster: &Roster) -> Vec<Violation> {
    let mut out = Vec::new();
    let n = table.doctors.len();
    let mut days: Vec<Vec<(u32, &str)>> = vec![Vec::new(); n];
    let mut duty_weeks: Vec<Vec<(u32, &str)>> = vec![Vec::new(); n];
    let mut holiday_duty: Vec<u32> = vec![0; n];
    let mut duty: Vec<u32> = vec![0; n];
    let mut oncall: Vec<u32> = vec![0; n];

    for record in &roster.shifts {
        let shift_idx = table.find_shift(&record.shift);
        let Some(shift_idx) = shift_idx else {
            out.push(violation(
                ViolationKind::UnknownName,
                None,
                Some(record.shift.as_str()),
                format!("shift {} not in the table", record.shift),
            ));
            continue;
        };
        let shift = &table.shifts[shift_idx];

        // Per-shift composition.
        let composition_ok = match record.kind {
            SlotKind::HolidayPair => {
                record.duty_junior.is_some()
                    && record.duty_senior.is_some()
                    && record.oncall.is_none()
            }
            SlotKind::Single => {
                let one_duty = record.duty_junior.is_some() != record.duty_senior.is_some();
                let oncall_iff_junior = record.oncall.is_some() == record.duty_junior.is_some();
                let distinct = record.oncall.is_none() || record.oncall != record.duty_junior;
                one_duty && oncall_iff_junior && distinct
            }
        };
        if !composition_ok {
            out.push(violation(
                ViolationKind::SlotComposition,
                None,
                Some(record.shift.as_str()),
                format!("slot composition broken on shift {}", record.shift),
            ));
        }

        let roles: [(&Option<String>, Group, bool); 3] = [
            (&record.duty_junior, Group::Junior, true),
            (&record.duty_senior, Group::Senior, true),
            (&record.oncall, Group::Senior, false),
        ];
        for (name, expected_group, is_duty) in roles {
            let Some(name) = name.as_deref() else { continue };
            let Some(d) = table.find_doctor(name) else {
                out.push(violation(
                    ViolationKind::UnknownName,
                    Some(name),
                    Some(record.shift.as_str()),
                    format!("doctor {name} not in the table"),
                ));
                continue;
            };
            if table.doctors[d].group != expected_group {
                out.push(violation(
                    ViolationKind::SlotComposition,
                    Some(name),
                    Some(record.shift.as_str()),
                    format!(
                        "{name} is not {expected_group:?}-group but holds that role on {}",
                        record.shift
                    ),
                ));
            }
            if !table.is_available(d, shift_idx) {
                out.push(violation(
                    ViolationKind::Unavailable,
                    Some(name),
                    Some(record.shift.as_str()),
                    format!("{name} was not available for shift {}", record.shift),
                ));
            }
            days[d].push((shift.day, record.shift.as_str()));
            if is_duty {
                duty[d] += 1;
                duty_weeks[d].push((shift.week, record.shift.as_str()));
                if shift.kind == SlotKind::HolidayPair {
                    holiday_duty[d] += 1;
                }
            } else {
                oncall[d] += 1;
            }
        }
    }

    for (d, doctor) in table.doctors.iter().enumerate() {
        let name = doctor.name.as_str();

        for (i, &(d1, s1)) in days[d].iter().enumerate() {
            for &(d2, s2) in days[d].iter().skip(i + 1) {
                if d1.abs_diff(d2) < 3 {
                    out.push(violation(
                        ViolationKind::Spacing,
                        Some(name),
                        None,
                        format!("{name} assigned on {s1} and {s2}, {} day(s) apart", d1.abs_diff(d2)),
                    ));
                }
            }
        }

        let mut weeks: Vec<u32> = duty_weeks[d].iter().map(|&(w, _)| w).collect();
        weeks.sort_unstable();
        for pair in weeks.windows(2) {
            if pair[0] == pair[1] {
                out.push(violation(
                    ViolationKind::WeeklyCap,
                    Some(name),
                    None,
                    format!("{name} has two duties in ISO week {}", pair[0]),
                ));
            }
        }

        if holiday_duty[d] > 1 {
            out.push(violation(
                ViolationKind::HolidayQuota,
                Some(name),
                None,
                format!("{name} holds {} holiday-pair duties", holiday_duty[d]),
            ));
        }

        let (duty_ok, oncall_ok) = match doctor.group {
            Group::Junior => (duty[d] == 2, oncall[d] == 0),
            Group::Senior => ((1..=2).contains(&duty[d]), oncall[d] <= 2),
        };
        if !duty_ok {
            out.push(violation(
                ViolationKind::DutyCount,
                Some(name),
                None,
                format!("{name} ({:?}) has {} duties", doctor.group, duty[d]),
            ));
        }
        if !oncall_ok {
            out.push(violation(
                ViolationKind::OncallCount,
                Some(name),
                None,
                format!("{name} ({:?}) has {} on-calls", doctor.group, oncall[d]),
            ));
        }
    }

    out
}

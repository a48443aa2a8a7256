use crate::model::{Assignment, AvailabilityTable, Group, SlotKind};

/// Role a boolean decision variable stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VarKind {
    Duty,
    Oncall,
}

/// One boolean decision variable: "doctor takes this role on this shift".
///
/// Variables exist only where the doctor is available; an unavailable
/// pair simply has no variable, which is equivalent to forcing it false.
#[derive(Debug, Clone, Copy)]
pub(super) struct VarDef {
    pub doctor: usize,
    pub shift: usize,
    pub kind: VarKind,
}

/// Declared constraint over the boolean variables.
#[derive(Debug, Clone)]
pub(super) enum Constraint {
    /// The number of true variables must land in `min..=max`.
    Sum {
        vars: Vec<usize>,
        min: u32,
        max: u32,
    },
    /// When `cond` is true, the number of true variables must land in
    /// `min..=max`.
    Implies {
        cond: usize,
        vars: Vec<usize>,
        min: u32,
        max: u32,
    },
}

/// The full rule set formulated as booleans plus cardinality windows.
/// Opaque to callers: built once per solve, read-only during search.
#[derive(Debug)]
pub(super) struct RosterModel {
    pub vars: Vec<VarDef>,
    pub constraints: Vec<Constraint>,
    /// Constraint indices touching each variable.
    pub watch: Vec<Vec<usize>>,
    /// Variable ids grouped per shift, in day order; the branching order
    /// is built from these groups.
    pub shift_groups: Vec<Vec<usize>>,
    doctor_groups: Vec<Group>,
    duty_vars_by_doctor: Vec<Vec<usize>>,
    oncall_vars_by_doctor: Vec<Vec<usize>>,
    n_shifts: usize,
}

impl RosterModel {
    /// Formulates the full rule set over the availability table.
    pub(super) fn build(table: &AvailabilityTable) -> Self {
        let n_doctors = table.doctors.len();
        let n_shifts = table.shifts.len();

        let mut vars: Vec<VarDef> = Vec::new();
        // var_at[d][s] = [duty var, oncall var]
        let mut var_at: Vec<Vec<[Option<usize>; 2]>> = vec![vec![[None; 2]; n_shifts]; n_doctors];
        let mut shift_groups: Vec<Vec<usize>> = vec![Vec::new(); n_shifts];

        for s in 0..n_shifts {
            for d in 0..n_doctors {
                if !table.is_available(d, s) {
                    continue;
                }
                let id = vars.len();
                vars.push(VarDef {
                    doctor: d,
                    shift: s,
                    kind: VarKind::Duty,
                });
                var_at[d][s][0] = Some(id);
                shift_groups[s].push(id);

                let senior = table.doctors[d].group == Group::Senior;
                if table.shifts[s].kind == SlotKind::Single && senior {
                    let id = vars.len();
                    vars.push(VarDef {
                        doctor: d,
                        shift: s,
                        kind: VarKind::Oncall,
                    });
                    var_at[d][s][1] = Some(id);
                    shift_groups[s].push(id);
                }
            }
        }

        let mut constraints: Vec<Constraint> = Vec::new();
        let exactly =
            |vars: Vec<usize>, n: u32| Constraint::Sum { vars, min: n, max: n };
        let at_most =
            |vars: Vec<usize>, n: u32| Constraint::Sum { vars, min: 0, max: n };

        // Per-shift composition.
        for (s, shift) in table.shifts.iter().enumerate() {
            let duty_of = |pred: &dyn Fn(usize) -> bool| -> Vec<usize> {
                (0..n_doctors)
                    .filter(|&d| pred(d))
                    .filter_map(|d| var_at[d][s][0])
                    .collect()
            };
            let oncall_all: Vec<usize> =
                (0..n_doctors).filter_map(|d| var_at[d][s][1]).collect();

            match shift.kind {
                SlotKind::HolidayPair => {
                    let juniors =
                        duty_of(&|d| table.doctors[d].group == Group::Junior);
                    let seniors =
                        duty_of(&|d| table.doctors[d].group == Group::Senior);
                    constraints.push(exactly(juniors, 1));
                    constraints.push(exactly(seniors, 1));
                }
                SlotKind::Single => {
                    constraints.push(exactly(duty_of(&|_| true), 1));
                    // On-call present iff the duty doctor is junior.
                    for d in 0..n_doctors {
                        let Some(duty) = var_at[d][s][0] else { continue };
                        let (min, max) = match table.doctors[d].group {
                            Group::Junior => (1, 1),
                            Group::Senior => (0, 0),
                        };
                        constraints.push(Constraint::Implies {
                            cond: duty,
                            vars: oncall_all.clone(),
                            min,
                            max,
                        });
                    }
                    // A doctor cannot be both duty and on-call here.
                    for d in 0..n_doctors {
                        if let (Some(duty), Some(oncall)) =
                            (var_at[d][s][0], var_at[d][s][1])
                        {
                            constraints.push(at_most(vec![duty, oncall], 1));
                        }
                    }
                }
            }
        }

        // Per-doctor monthly totals.
        let mut duty_vars_by_doctor: Vec<Vec<usize>> = vec![Vec::new(); n_doctors];
        let mut oncall_vars_by_doctor: Vec<Vec<usize>> = vec![Vec::new(); n_doctors];
        for (id, var) in vars.iter().enumerate() {
            match var.kind {
                VarKind::Duty => duty_vars_by_doctor[var.doctor].push(id),
                VarKind::Oncall => oncall_vars_by_doctor[var.doctor].push(id),
            }
        }
        for d in 0..n_doctors {
            match table.doctors[d].group {
                Group::Junior => {
                    constraints.push(exactly(duty_vars_by_doctor[d].clone(), 2));
                }
                Group::Senior => {
                    constraints.push(Constraint::Sum {
                        vars: duty_vars_by_doctor[d].clone(),
                        min: 1,
                        max: 2,
                    });
                    constraints.push(at_most(oncall_vars_by_doctor[d].clone(), 2));
                }
            }
        }

        // Weekly duty cap: duty variables only, on-call exempt.
        for d in 0..n_doctors {
            let mut weeks: Vec<u32> = table.shifts.iter().map(|s| s.week).collect();
            weeks.sort_unstable();
            weeks.dedup();
            for week in weeks {
                let in_week: Vec<usize> = duty_vars_by_doctor[d]
                    .iter()
                    .copied()
                    .filter(|&v| table.shifts[vars[v].shift].week == week)
                    .collect();
                if in_week.len() > 1 {
                    constraints.push(at_most(in_week, 1));
                }
            }
        }

        // Holiday quota: at most one pair duty per doctor.
        for d in 0..n_doctors {
            let holiday: Vec<usize> = duty_vars_by_doctor[d]
                .iter()
                .copied()
                .filter(|&v| table.shifts[vars[v].shift].kind == SlotKind::HolidayPair)
                .collect();
            if holiday.len() > 1 {
                constraints.push(at_most(holiday, 1));
            }
        }

        // Spacing: mutual exclusion over duty and on-call
        // for shift pairs closer than 3 days, same-day siblings included.
        for d in 0..n_doctors {
            for s1 in 0..n_shifts {
                for s2 in (s1 + 1)..n_shifts {
                    let gap = table.shifts[s1].day.abs_diff(table.shifts[s2].day);
                    if gap >= 3 {
                        continue;
                    }
                    let pair: Vec<usize> = [s1, s2]
                        .iter()
                        .flat_map(|&s| var_at[d][s].into_iter().flatten())
                        .collect();
                    if pair.len() > 1 {
                        constraints.push(at_most(pair, 1));
                    }
                }
            }
        }

        let mut watch: Vec<Vec<usize>> = vec![Vec::new(); vars.len()];
        for (ci, constraint) in constraints.iter().enumerate() {
            let (cond, cvars) = match constraint {
                Constraint::Sum { vars, .. } => (None, vars),
                Constraint::Implies { cond, vars, .. } => (Some(*cond), vars),
            };
            if let Some(cond) = cond {
                watch[cond].push(ci);
            }
            for &v in cvars {
                watch[v].push(ci);
            }
        }

        Self {
            vars,
            constraints,
            watch,
            shift_groups,
            doctor_groups: table.doctors.iter().map(|d| d.group).collect(),
            duty_vars_by_doctor,
            oncall_vars_by_doctor,
            n_shifts,
        }
    }

    /// Per-doctor load: duty count + weight x on-call count.
    pub(super) fn loads(&self, values: &[bool], oncall_weight: f64) -> Vec<f64> {
        (0..self.doctor_groups.len())
            .map(|d| {
                let duty = self.duty_vars_by_doctor[d]
                    .iter()
                    .filter(|&&v| values[v])
                    .count() as f64;
                let oncall = self.oncall_vars_by_doctor[d]
                    .iter()
                    .filter(|&&v| values[v])
                    .count() as f64;
                duty + oncall_weight * oncall
            })
            .collect()
    }

    /// Max minus min load across doctors: the primary objective.
    pub(super) fn spread(&self, values: &[bool], oncall_weight: f64) -> f64 {
        let loads = self.loads(values, oncall_weight);
        let max = loads.iter().cloned().fold(f64::MIN, f64::max);
        let min = loads.iter().cloned().fold(f64::MAX, f64::min);
        max - min
    }

    /// Number of filled duty/on-call variables: the secondary objective.
    pub(super) fn filled(&self, values: &[bool]) -> u32 {
        values.iter().filter(|&&v| v).count() as u32
    }

    /// Turns a satisfying assignment back into per-shift assignments.
    pub(super) fn extract(&self, values: &[bool]) -> Vec<Assignment> {
        let mut out = vec![Assignment::default(); self.n_shifts];
        for (id, var) in self.vars.iter().enumerate() {
            if !values[id] {
                continue;
            }
            let asg = &mut out[var.shift];
            match var.kind {
                VarKind::Duty => match self.doctor_groups[var.doctor] {
                    Group::Junior => asg.duty_junior = Some(var.doctor),
                    Group::Senior => asg.duty_senior = Some(var.doctor),
                },
                VarKind::Oncall => asg.oncall = Some(var.doctor),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Doctor, Shift};

    fn table() -> AvailabilityTable {
        let doctors = vec![
            Doctor::new("s1", Group::Senior),
            Doctor::new("s2", Group::Senior),
            Doctor::new("j1", Group::Junior),
        ];
        let shifts = vec![
            Shift::parse("1", 2025, 6).unwrap(),
            Shift::parse("8-1", 2025, 6).unwrap(),
            Shift::parse("8-2", 2025, 6).unwrap(),
        ];
        let available = vec![vec![true; 3]; 3];
        AvailabilityTable::new(2025, 6, doctors, shifts, available).unwrap()
    }

    #[test]
    fn variables_follow_availability_and_roles() {
        let t = table();
        let model = RosterModel::build(&t);
        // No on-call variable on the holiday-pair shift, none for juniors.
        assert!(model.vars.iter().all(|v| {
            v.kind == VarKind::Duty
                || (t.shifts[v.shift].kind == SlotKind::Single
                    && t.doctors[v.doctor].group == Group::Senior)
        }));

        let mut blocked = table();
        blocked.available[0][0] = false;
        let model = RosterModel::build(&blocked);
        assert!(model
            .vars
            .iter()
            .all(|v| !(v.doctor == 0 && v.shift == 0)));
    }

    #[test]
    fn spacing_pairs_cover_close_days() {
        let t = table();
        let model = RosterModel::build(&t);
        // Shifts "8-1"/"8-2" share a day; some mutex must span them for
        // each doctor with variables on both.
        let has_pair_mutex = model.constraints.iter().any(|c| {
            let Constraint::Sum { vars, min: 0, max: 1 } = c else {
                return false;
            };
            let shifts: Vec<usize> = vars.iter().map(|&v| model.vars[v].shift).collect();
            shifts.contains(&1) && shifts.contains(&2)
        });
        assert!(has_pair_mutex);
    }

    #[test]
    fn extract_maps_roles() {
        let t = table();
        let model = RosterModel::build(&t);
        let mut values = vec![false; model.vars.len()];
        // Pick the duty var of j1 on shift "1" and an oncall senior there.
        let duty = model
            .vars
            .iter()
            .position(|v| v.doctor == 2 && v.shift == 0 && v.kind == VarKind::Duty)
            .unwrap();
        let oncall = model
            .vars
            .iter()
            .position(|v| v.doctor == 0 && v.shift == 0 && v.kind == VarKind::Oncall)
            .unwrap();
        values[duty] = true;
        values[oncall] = true;
        let asg = model.extract(&values);
        assert_eq!(asg[0].duty_junior, Some(2));
        assert_eq!(asg[0].oncall, Some(0));
        assert_eq!(asg[1], Assignment::default());
    }
}

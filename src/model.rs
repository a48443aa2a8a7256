use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Seniority group of a doctor. The input table encodes senior as 0 and
/// junior as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Senior,
    Junior,
}

impl Group {
    pub fn from_code(code: i64) -> Result<Self, String> {
        match code {
            0 => Ok(Group::Senior),
            1 => Ok(Group::Junior),
            other => Err(format!("unknown group code: {other}")),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Group::Senior => 0,
            Group::Junior => 1,
        }
    }
}

/// A member of the roster. Immutable for the duration of a solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub group: Group,
}

impl Doctor {
    pub fn new<N: Into<String>>(name: N, group: Group) -> Self {
        Self {
            name: name.into(),
            group,
        }
    }
}

/// What a shift requires on duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// One of a linked same-day pair: one senior plus one junior on duty,
    /// never an on-call.
    HolidayPair,
    /// Exactly one duty doctor; an on-call senior is added iff the duty
    /// doctor is junior.
    Single,
}

/// A calendar shift, parsed from an availability table column.
///
/// Column `"<day>"` is a single slot, `"<day>-1"` the holiday-pair member
/// of that day and `"<day>-2"` its single sibling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Original column label, kept as the shift identifier.
    pub id: String,
    pub day: u32,
    /// 0 for a bare column, otherwise the `-<n>` suffix (1 or 2).
    pub sub: u8,
    pub kind: SlotKind,
    /// ISO week the day falls in, used for the weekly duty cap.
    pub week: u32,
}

impl Shift {
    /// Parses a shift column label for the given month.
    pub fn parse(column: &str, year: i32, month: u32) -> Result<Self, String> {
        let column = column.trim();
        let (day_raw, sub) = match column.split_once('-') {
            Some((day, sub)) => {
                let sub: u8 = sub
                    .trim()
                    .parse()
                    .map_err(|_| format!("bad shift column {column:?}: bad sub-index"))?;
                if sub != 1 && sub != 2 {
                    return Err(format!(
                        "bad shift column {column:?}: sub-index must be 1 or 2"
                    ));
                }
                (day, sub)
            }
            None => (column, 0),
        };
        let day: u32 = day_raw
            .trim()
            .parse()
            .map_err(|_| format!("bad shift column {column:?}: bad day"))?;
        let last = days_in_month(year, month)
            .ok_or_else(|| format!("invalid year/month: {year}-{month}"))?;
        if day == 0 || day > last {
            return Err(format!(
                "bad shift column {column:?}: day {day} outside 1..={last}"
            ));
        }
        let week = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| format!("invalid date {year}-{month}-{day}"))?
            .iso_week()
            .week();
        let kind = if sub == 1 {
            SlotKind::HolidayPair
        } else {
            SlotKind::Single
        };
        Ok(Self {
            id: column.to_string(),
            day,
            sub,
            kind,
            week,
        })
    }

    /// Sort key: day first, then the pair sub-index.
    pub fn sort_key(&self) -> (u32, u8) {
        (self.day, self.sub)
    }
}

/// Number of days in a month, `None` for an invalid year/month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// The validated input to a solve: who may take what.
///
/// `available[d][s]` is true iff doctor `d` may be assigned shift `s`
/// (the raw table marks unavailability with 1; import inverts it).
#[derive(Debug, Clone)]
pub struct AvailabilityTable {
    pub year: i32,
    pub month: u32,
    pub doctors: Vec<Doctor>,
    /// Sorted by (day, sub).
    pub shifts: Vec<Shift>,
    pub available: Vec<Vec<bool>>,
}

impl AvailabilityTable {
    /// Builds a table, validating uniqueness and matrix shape. Shifts and
    /// availability columns are re-sorted into (day, sub) order.
    pub fn new(
        year: i32,
        month: u32,
        doctors: Vec<Doctor>,
        shifts: Vec<Shift>,
        available: Vec<Vec<bool>>,
    ) -> Result<Self, String> {
        days_in_month(year, month)
            .ok_or_else(|| format!("invalid year/month: {year}-{month}"))?;
        for (i, doc) in doctors.iter().enumerate() {
            if doc.name.trim().is_empty() {
                return Err("doctor name cannot be empty".to_string());
            }
            if doctors[..i].iter().any(|d| d.name == doc.name) {
                return Err(format!("duplicate doctor name: {}", doc.name));
            }
        }
        for (i, shift) in shifts.iter().enumerate() {
            if shifts[..i].iter().any(|s| s.id == shift.id) {
                return Err(format!("duplicate shift column: {}", shift.id));
            }
        }
        if available.len() != doctors.len() {
            return Err("availability rows do not match doctors".to_string());
        }
        if available.iter().any(|row| row.len() != shifts.len()) {
            return Err("availability columns do not match shifts".to_string());
        }

        let mut order: Vec<usize> = (0..shifts.len()).collect();
        order.sort_by_key(|&i| shifts[i].sort_key());
        let shifts: Vec<Shift> = order.iter().map(|&i| shifts[i].clone()).collect();
        let available = available
            .into_iter()
            .map(|row| order.iter().map(|&i| row[i]).collect())
            .collect();

        Ok(Self {
            year,
            month,
            doctors,
            shifts,
            available,
        })
    }

    pub fn is_available(&self, doctor: usize, shift: usize) -> bool {
        self.available[doctor][shift]
    }

    /// Indices of junior-group doctors.
    pub fn juniors(&self) -> Vec<usize> {
        self.group_indices(Group::Junior)
    }

    /// Indices of senior-group doctors.
    pub fn seniors(&self) -> Vec<usize> {
        self.group_indices(Group::Senior)
    }

    fn group_indices(&self, group: Group) -> Vec<usize> {
        self.doctors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.group == group)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn find_doctor(&self, name: &str) -> Option<usize> {
        self.doctors.iter().position(|d| d.name == name)
    }

    pub fn find_shift(&self, id: &str) -> Option<usize> {
        self.shifts.iter().position(|s| s.id == id)
    }
}

/// Working assignment of one shift, by doctor index into the table.
///
/// Field population follows the slot kind: a holiday pair fills both duty
/// fields and never on-call; a single slot fills exactly one duty field,
/// plus on-call when the duty doctor is junior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Assignment {
    pub duty_junior: Option<usize>,
    pub duty_senior: Option<usize>,
    pub oncall: Option<usize>,
}

impl Assignment {
    /// Whether `doctor` holds any role on this shift.
    pub fn involves(&self, doctor: usize) -> bool {
        self.duty_junior == Some(doctor)
            || self.duty_senior == Some(doctor)
            || self.oncall == Some(doctor)
    }

    pub fn has_duty(&self) -> bool {
        self.duty_junior.is_some() || self.duty_senior.is_some()
    }
}

/// One finished shift in the output roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub shift: String,
    pub day: u32,
    pub kind: SlotKind,
    pub duty_senior: Option<String>,
    pub duty_junior: Option<String>,
    pub oncall: Option<String>,
}

/// Per-doctor workload totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub name: String,
    pub group: Group,
    pub duty: u32,
    pub oncall: u32,
    /// duty + oncall_weight x oncall.
    pub total: f64,
}

/// A complete month roster: one record per shift plus workload totals.
/// Produced once per solve and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub year: i32,
    pub month: u32,
    pub shifts: Vec<ShiftRecord>,
    pub summary: Vec<DoctorSummary>,
}

impl Roster {
    /// Assembles the output roster from per-shift assignments, deriving
    /// the per-doctor totals.
    pub fn from_assignments(
        table: &AvailabilityTable,
        assignments: &[Assignment],
        oncall_weight: f64,
    ) -> Self {
        let name = |idx: Option<usize>| idx.map(|i| table.doctors[i].name.clone());
        let mut duty = vec![0u32; table.doctors.len()];
        let mut oncall = vec![0u32; table.doctors.len()];

        let shifts: Vec<ShiftRecord> = table
            .shifts
            .iter()
            .zip(assignments)
            .map(|(shift, asg)| {
                for idx in [asg.duty_junior, asg.duty_senior].into_iter().flatten() {
                    duty[idx] += 1;
                }
                if let Some(idx) = asg.oncall {
                    oncall[idx] += 1;
                }
                ShiftRecord {
                    shift: shift.id.clone(),
                    day: shift.day,
                    kind: shift.kind,
                    duty_senior: name(asg.duty_senior),
                    duty_junior: name(asg.duty_junior),
                    oncall: name(asg.oncall),
                }
            })
            .collect();

        let summary = table
            .doctors
            .iter()
            .enumerate()
            .map(|(i, doc)| DoctorSummary {
                name: doc.name.clone(),
                group: doc.group,
                duty: duty[i],
                oncall: oncall[i],
                total: f64::from(duty[i]) + oncall_weight * f64::from(oncall[i]),
            })
            .collect();

        Self {
            year: table.year,
            month: table.month,
            shifts,
            summary,
        }
    }
}

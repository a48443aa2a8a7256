use crate::model::{AvailabilityTable, SlotKind};

/// Minimum days between any two duty/on-call assignments of one doctor.
pub(super) const MIN_SPACING_DAYS: u32 = 3;

/// Per-doctor duty ceilings for the month.
pub(super) const JUNIOR_DUTY_TARGET: u32 = 2;
pub(super) const SENIOR_DUTY_CAP: u32 = 2;
pub(super) const SENIOR_ONCALL_CAP: u32 = 2;

/// Snapshot of the roster built so far, threaded through the builders.
///
/// Recording a placement consumes the state and returns the successor, so
/// each builder step is an explicit fold with no hidden shared counters.
#[derive(Debug, Clone)]
pub(super) struct PartialState {
    /// Days already holding a duty or on-call assignment, per doctor.
    days: Vec<Vec<u32>>,
    /// ISO weeks already holding a duty assignment, per doctor.
    duty_weeks: Vec<Vec<u32>>,
    holiday_used: Vec<bool>,
    duty: Vec<u32>,
    oncall: Vec<u32>,
}

impl PartialState {
    pub(super) fn new(doctors: usize) -> Self {
        Self {
            days: vec![Vec::new(); doctors],
            duty_weeks: vec![Vec::new(); doctors],
            holiday_used: vec![false; doctors],
            duty: vec![0; doctors],
            oncall: vec![0; doctors],
        }
    }

    /// Legality of assigning `doctor` to `shift` (duty or on-call) on top
    /// of the current partial roster. Pure; does not mutate.
    ///
    /// Spacing is checked against every recorded day, not only the latest
    /// placement: the junior pass visits holiday slots before singles, so
    /// placements do not arrive in day order.
    pub(super) fn can_assign(
        &self,
        table: &AvailabilityTable,
        doctor: usize,
        shift: usize,
    ) -> bool {
        if !table.is_available(doctor, shift) {
            return false;
        }
        let shift = &table.shifts[shift];
        if self.days[doctor]
            .iter()
            .any(|&d| shift.day.abs_diff(d) < MIN_SPACING_DAYS)
        {
            return false;
        }
        if self.duty_weeks[doctor].contains(&shift.week) {
            return false;
        }
        if shift.kind == SlotKind::HolidayPair && self.holiday_used[doctor] {
            return false;
        }
        true
    }

    /// Records a duty placement, updating spacing, weekly and holiday
    /// quota state.
    pub(super) fn with_duty(
        mut self,
        table: &AvailabilityTable,
        doctor: usize,
        shift: usize,
    ) -> Self {
        let shift = &table.shifts[shift];
        self.days[doctor].push(shift.day);
        self.duty_weeks[doctor].push(shift.week);
        if shift.kind == SlotKind::HolidayPair {
            self.holiday_used[doctor] = true;
        }
        self.duty[doctor] += 1;
        self
    }

    /// Records an on-call placement. Counts toward spacing but not toward
    /// the weekly duty cap.
    pub(super) fn with_oncall(
        mut self,
        table: &AvailabilityTable,
        doctor: usize,
        shift: usize,
    ) -> Self {
        self.days[doctor].push(table.shifts[shift].day);
        self.oncall[doctor] += 1;
        self
    }

    pub(super) fn duty_count(&self, doctor: usize) -> u32 {
        self.duty[doctor]
    }

    pub(super) fn oncall_count(&self, doctor: usize) -> u32 {
        self.oncall[doctor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Doctor, Group, Shift};

    fn table(columns: &[&str]) -> AvailabilityTable {
        let doctors = vec![
            Doctor::new("sen", Group::Senior),
            Doctor::new("jun", Group::Junior),
        ];
        let shifts: Vec<Shift> = columns
            .iter()
            .map(|c| Shift::parse(c, 2025, 6).unwrap())
            .collect();
        let available = vec![vec![true; shifts.len()]; doctors.len()];
        AvailabilityTable::new(2025, 6, doctors, shifts, available).unwrap()
    }

    #[test]
    fn spacing_blocks_nearby_days() {
        let t = table(&["2", "4", "10"]);
        let state = PartialState::new(2).with_duty(&t, 0, 0); // day 2
        assert!(!state.can_assign(&t, 0, 1)); // day 4: gap 2
        assert!(state.can_assign(&t, 0, 2)); // day 10
    }

    #[test]
    fn spacing_checks_every_recorded_day() {
        let t = table(&["2", "10", "11"]);
        // Duty on day 11 first, then day 2: day 10 is still blocked by 11
        // even though the most recent placement was day 2.
        let state = PartialState::new(2)
            .with_duty(&t, 0, 2)
            .with_duty(&t, 0, 0);
        assert!(!state.can_assign(&t, 0, 1));
    }

    #[test]
    fn weekly_cap_is_duty_only() {
        // 2025-06-02 and 2025-06-06 share ISO week 23; the 4-day gap
        // clears spacing, so only the weekly flag can block.
        let t = table(&["2", "6"]);
        let duty = PartialState::new(2).with_duty(&t, 0, 0);
        assert!(!duty.can_assign(&t, 0, 1));
        let oncall = PartialState::new(2).with_oncall(&t, 0, 0);
        assert!(oncall.can_assign(&t, 0, 1));
    }

    #[test]
    fn oncall_spacing_still_applies() {
        let t = table(&["2", "3"]);
        let state = PartialState::new(2).with_oncall(&t, 0, 0);
        assert!(!state.can_assign(&t, 0, 1));
    }

    #[test]
    fn holiday_quota_is_one() {
        let t = table(&["7-1", "21-1"]);
        let state = PartialState::new(2).with_duty(&t, 1, 0);
        assert!(!state.can_assign(&t, 1, 1));
    }

    #[test]
    fn unavailable_is_never_legal() {
        let mut t = table(&["5"]);
        t.available[0][0] = false;
        let state = PartialState::new(2);
        assert!(!state.can_assign(&t, 0, 0));
        assert!(state.can_assign(&t, 1, 0));
    }
}

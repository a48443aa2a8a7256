#![forbid(unsafe_code)]
//! Toban — monthly on-duty/on-call roster engine.
//!
//! - Availability table in (CSV), schedule + workload summary out.
//! - Two interchangeable builders: a seeded randomized greedy pass and
//!   an exhaustive constraint search (feasibility or load-balancing).
//! - Hard rules: slot composition, 3-day spacing, one duty per ISO week,
//!   one holiday-pair duty per month, per-group monthly totals.

pub mod calendar;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod table;

pub use calendar::{render_calendar, CalendarRenderer, TextCalendar};
pub use model::{
    AvailabilityTable, Doctor, DoctorSummary, Group, Roster, Shift, ShiftRecord, SlotKind,
};
pub use scheduler::audit::{verify, Violation, ViolationKind};
pub use scheduler::{build_roster, BuildOptions, ScheduleError, Strategy};
pub use storage::{JsonStorage, Storage};

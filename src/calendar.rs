//! Month-grid rendering of a finished roster.
//!
//! The only contract with the engine is reading the per-shift fields of
//! the output roster; the grid itself is presentation.

use crate::model::{Roster, SlotKind};
use chrono::{Datelike, NaiveDate};

const CELL_WIDTH: usize = 20;

/// Allows other output formats (spreadsheet, HTML) to plug in.
pub trait CalendarRenderer {
    fn render(&self, roster: &Roster, holidays: &[NaiveDate]) -> String;
}

/// Renders a roster through the given renderer.
pub fn render_calendar(
    roster: &Roster,
    holidays: &[NaiveDate],
    renderer: &dyn CalendarRenderer,
) -> String {
    renderer.render(roster, holidays)
}

/// Plain-text Sunday-first month grid. Sundays and extra holidays are
/// starred; each day cell lists holiday day duty (D), night duty (N) and
/// the on-call (OC).
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCalendar;

#[derive(Default, Clone)]
struct DayInfo {
    day_duty: Vec<String>,
    night_duty: Vec<String>,
    oncall: Option<String>,
}

impl CalendarRenderer for TextCalendar {
    fn render(&self, roster: &Roster, holidays: &[NaiveDate]) -> String {
        let Some(first) = NaiveDate::from_ymd_opt(roster.year, roster.month, 1) else {
            return String::new();
        };
        let days = crate::model::days_in_month(roster.year, roster.month).unwrap_or(0);

        let mut info: Vec<DayInfo> = vec![DayInfo::default(); days as usize + 1];
        for rec in &roster.shifts {
            if rec.day == 0 || rec.day > days {
                continue;
            }
            let names: Vec<&str> = [rec.duty_senior.as_deref(), rec.duty_junior.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            let joined = names.join("/");
            let slot = &mut info[rec.day as usize];
            match rec.kind {
                SlotKind::HolidayPair => slot.day_duty.push(joined),
                SlotKind::Single => {
                    slot.night_duty.push(joined);
                    if let Some(oc) = rec.oncall.as_deref() {
                        slot.oncall = Some(oc.to_string());
                    }
                }
            }
        }

        let mut out = String::new();
        out.push_str(&format!("{:>4}-{:02}\n", roster.year, roster.month));
        for wd in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
            out.push_str(&format!("{wd:<CELL_WIDTH$}|"));
        }
        out.push('\n');
        out.push_str(&"-".repeat((CELL_WIDTH + 1) * 7));
        out.push('\n');

        let mut col = first.weekday().num_days_from_sunday() as usize;
        let mut row: Vec<Vec<String>> = vec![Vec::new(); 7];
        for day in 1..=days {
            let date = NaiveDate::from_ymd_opt(roster.year, roster.month, day)
                .unwrap_or(first);
            let off = date.weekday().num_days_from_sunday() == 0 || holidays.contains(&date);
            let mut lines = vec![format!("{day}{}", if off { "*" } else { "" })];
            let slot = &info[day as usize];
            if !slot.day_duty.is_empty() {
                lines.push(format!("D {}", slot.day_duty.join("/")));
            }
            if !slot.night_duty.is_empty() {
                let mut line = format!("N {}", slot.night_duty.join("/"));
                if let Some(oc) = &slot.oncall {
                    line.push_str(&format!("/OC:{oc}"));
                }
                lines.push(line);
            }
            row[col] = lines;
            col += 1;
            if col == 7 {
                push_week(&mut out, &mut row);
                col = 0;
            }
        }
        if row.iter().any(|c| !c.is_empty()) {
            push_week(&mut out, &mut row);
        }

        out.push_str("D = holiday day duty   N = night duty   OC = on-call   * = Sunday/holiday\n");
        out
    }
}

fn push_week(out: &mut String, row: &mut Vec<Vec<String>>) {
    let height = row.iter().map(Vec::len).max().unwrap_or(0).max(1);
    for line in 0..height {
        for cell in row.iter() {
            let text = cell.get(line).map(String::as_str).unwrap_or("");
            out.push_str(&format!("{text:<CELL_WIDTH$.CELL_WIDTH$}|"));
        }
        out.push('\n');
    }
    out.push_str(&"-".repeat((CELL_WIDTH + 1) * 7));
    out.push('\n');
    for cell in row.iter_mut() {
        cell.clear();
    }
}

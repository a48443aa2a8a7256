use crate::model::{AvailabilityTable, Doctor, Group, Roster, Shift};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Sentinel written into an annotated table cell holding a duty.
pub const CELL_DUTY: &str = "3";
/// Sentinel written into an annotated table cell holding an on-call.
pub const CELL_ONCALL: &str = "4";

/// Imports the availability table CSV.
///
/// Header: `Name,Group,<shift columns>` where `Group` is 0 (senior) or
/// 1 (junior) and each shift column is `<day>`, `<day>-1` or `<day>-2`.
/// Cells are 0 (available) or 1 (unavailable); they are inverted into an
/// availability predicate on import.
pub fn import_table_csv<P: AsRef<Path>>(
    path: P,
    year: i32,
    month: u32,
) -> anyhow::Result<AvailabilityTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("opening {}", path.as_ref().display()))?;

    let headers = rdr.headers().context("reading header row")?.clone();
    let mut columns = headers.iter().map(str::trim);
    match (columns.next(), columns.next()) {
        (Some("Name"), Some("Group")) => {}
        _ => bail!("header must start with Name,Group"),
    }
    let shifts: Vec<Shift> = columns
        .map(|col| Shift::parse(col, year, month).map_err(anyhow::Error::msg))
        .collect::<anyhow::Result<_>>()?;
    if shifts.is_empty() {
        bail!("table has no shift columns");
    }

    let mut doctors = Vec::new();
    let mut available = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing Name cell")?.trim();
        if name.is_empty() {
            bail!("empty doctor name");
        }
        let group_raw = rec.get(1).context("missing Group cell")?.trim();
        let group_code: i64 = group_raw
            .parse()
            .map_err(|_| anyhow::anyhow!("doctor {name}: group {group_raw:?} is not a number"))?;
        let group = Group::from_code(group_code)
            .map_err(|e| anyhow::anyhow!("doctor {name}: {e}"))?;

        let mut row = Vec::with_capacity(shifts.len());
        for (i, shift) in shifts.iter().enumerate() {
            let cell = rec
                .get(i + 2)
                .with_context(|| format!("doctor {name}: missing cell for shift {}", shift.id))?
                .trim();
            let unavailable = match cell {
                "0" => false,
                "1" => true,
                other => bail!(
                    "doctor {name}, shift {}: cell must be 0 or 1, got {other:?}",
                    shift.id
                ),
            };
            row.push(!unavailable);
        }
        doctors.push(Doctor::new(name, group));
        available.push(row);
    }

    AvailabilityTable::new(year, month, doctors, shifts, available).map_err(anyhow::Error::msg)
}

/// Exports the schedule: one row per shift with the assigned names.
pub fn export_schedule_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(["Shift", "Duty_G0", "Duty_G1", "Oncall_G0"])?;
    for rec in &roster.shifts {
        w.write_record([
            rec.shift.as_str(),
            rec.duty_senior.as_deref().unwrap_or(""),
            rec.duty_junior.as_deref().unwrap_or(""),
            rec.oncall.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Exports the per-doctor workload summary.
pub fn export_summary_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(["Name", "Group", "Duty", "Oncall", "Total"])?;
    for s in &roster.summary {
        w.write_record([
            s.name.as_str(),
            &s.group.code().to_string(),
            &s.duty.to_string(),
            &s.oncall.to_string(),
            &s.total.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Writes the original table with assigned cells overwritten by sentinel
/// codes (3 = duty, 4 = on-call). Returns a warning line for every cell
/// overwritten that was not originally marked available.
pub fn export_annotated_csv<P: AsRef<Path>>(
    path: P,
    table: &AvailabilityTable,
    roster: &Roster,
) -> anyhow::Result<Vec<String>> {
    let mut warnings = Vec::new();
    // cell text per doctor x shift, starting from the raw 0/1 encoding
    let mut cells: Vec<Vec<String>> = table
        .available
        .iter()
        .map(|row| {
            row.iter()
                .map(|&ok| if ok { "0" } else { "1" }.to_string())
                .collect()
        })
        .collect();

    for rec in &roster.shifts {
        let Some(s) = table.find_shift(&rec.shift) else {
            bail!("roster shift {} not in the table", rec.shift);
        };
        let marks = [
            (&rec.duty_senior, CELL_DUTY),
            (&rec.duty_junior, CELL_DUTY),
            (&rec.oncall, CELL_ONCALL),
        ];
        for (name, code) in marks {
            let Some(name) = name.as_deref() else { continue };
            let Some(d) = table.find_doctor(name) else {
                bail!("roster doctor {name} not in the table");
            };
            if !table.is_available(d, s) {
                warnings.push(format!(
                    "{name} assigned to shift {} despite being marked unavailable",
                    rec.shift
                ));
            }
            cells[d][s] = code.to_string();
        }
    }

    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    let mut header = vec!["Name".to_string(), "Group".to_string()];
    header.extend(table.shifts.iter().map(|s| s.id.clone()));
    w.write_record(&header)?;
    for (d, doctor) in table.doctors.iter().enumerate() {
        let mut row = vec![doctor.name.clone(), doctor.group.code().to_string()];
        row.extend(cells[d].iter().cloned());
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(warnings)
}

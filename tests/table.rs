#![forbid(unsafe_code)]
use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;
use toban::table::{export_annotated_csv, export_schedule_csv, export_summary_csv, import_table_csv};
use toban::{build_roster, BuildOptions, Group, Strategy};

fn write_csv(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

const SAMPLE: &str = "\
Name,Group,1,5-1,5-2,12
alice,0,0,0,0,1
bob,0,0,0,0,0
carol,1,1,0,0,0
";

#[test]
fn import_parses_groups_shifts_and_inverts_cells() {
    let f = write_csv(SAMPLE);
    let t = import_table_csv(f.path(), 2025, 6).unwrap();

    assert_eq!((t.year, t.month), (2025, 6));
    assert_eq!(t.doctors.len(), 3);
    assert_eq!(t.doctors[0].group, Group::Senior);
    assert_eq!(t.doctors[2].group, Group::Junior);
    assert_eq!(
        t.shifts.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        ["1", "5-1", "5-2", "12"]
    );
    // Cell 1 means unavailable.
    let alice = t.find_doctor("alice").unwrap();
    let carol = t.find_doctor("carol").unwrap();
    assert!(!t.is_available(alice, t.find_shift("12").unwrap()));
    assert!(!t.is_available(carol, t.find_shift("1").unwrap()));
    assert!(t.is_available(carol, t.find_shift("5-1").unwrap()));
}

#[test]
fn import_rejects_malformed_input() {
    let cases = [
        ("Who,Group,1\nalice,0,0\n", "header"),
        ("Name,Group,0\nalice,0,0\n", "day 0"),
        ("Name,Group,1-3\nalice,0,0\n", "sub-index"),
        ("Name,Group,1\nalice,2,0\n", "group"),
        ("Name,Group,1\nalice,0,yes\n", "cell"),
        ("Name,Group,1\nalice,0,0\nalice,0,0\n", "duplicate"),
        ("Name,Group\nalice,0\n", "no shift columns"),
    ];
    for (content, what) in cases {
        let f = write_csv(content);
        assert!(
            import_table_csv(f.path(), 2025, 6).is_err(),
            "accepted bad input ({what})"
        );
    }
}

#[test]
fn schedule_and_summary_exports_round_out_a_roster() {
    let f = write_csv(
        "\
Name,Group,1,5-1,5-2
alice,0,0,0,0
bob,0,0,0,0
carol,1,0,0,0
",
    );
    let t = import_table_csv(f.path(), 2025, 6).unwrap();
    let roster = build_roster(&t, Strategy::Greedy, &BuildOptions::default()).unwrap();

    let out = NamedTempFile::new().unwrap();
    export_schedule_csv(out.path(), &roster).unwrap();
    let text = fs::read_to_string(out.path()).unwrap();
    assert!(text.starts_with("Shift,Duty_G0,Duty_G1,Oncall_G0\n"));
    assert_eq!(text.lines().count(), 1 + roster.shifts.len());

    let out = NamedTempFile::new().unwrap();
    export_summary_csv(out.path(), &roster).unwrap();
    let text = fs::read_to_string(out.path()).unwrap();
    assert!(text.starts_with("Name,Group,Duty,Oncall,Total\n"));
    // Carol is the only junior: exactly two duties, weighted total 2.
    assert!(text.lines().any(|l| l == "carol,1,2,0,2"));
}

#[test]
fn annotated_export_marks_assignments_in_place() {
    let f = write_csv(
        "\
Name,Group,1,5-1,5-2
alice,0,0,0,0
bob,0,0,0,0
carol,1,0,0,0
",
    );
    let t = import_table_csv(f.path(), 2025, 6).unwrap();
    let roster = build_roster(&t, Strategy::Greedy, &BuildOptions::default()).unwrap();

    let out = NamedTempFile::new().unwrap();
    let warnings = export_annotated_csv(out.path(), &t, &roster).unwrap();
    assert!(warnings.is_empty());

    let text = fs::read_to_string(out.path()).unwrap();
    assert!(text.starts_with("Name,Group,1,5-1,5-2\n"));
    // Carol holds the pair's junior duty plus one single, so her row
    // carries exactly two duty marks and no availability is left as 1.
    let carol = text.lines().find(|l| l.starts_with("carol,")).unwrap();
    let marks = carol.matches(",3").count();
    assert_eq!(marks, 2);
}

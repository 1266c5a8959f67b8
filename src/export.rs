//! Export boundary for the roster. The core contract is `roster_sheet`: a
//! title, fixed column headers, and one row of cells per record in list
//! order. The two sinks shipped here render that row-set as a spreadsheet
//! (CSV) and as a paginated printable report; both are pure functions of the
//! current record list and never touch store state.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::UserDirs;
use log::info;

use crate::models::Student;
use crate::store;

/// Column headers shared by every export sink.
pub const EXPORT_HEADERS: [&str; 5] = ["Student ID", "Full Name", "Date of Birth", "Class", "GPA"];
/// Title printed at the top of the report sink.
pub const ROSTER_TITLE: &str = "STUDENT ROSTER";

const SPREADSHEET_FILE_NAME: &str = "student_records.csv";
const REPORT_FILE_NAME: &str = "student_records.txt";
/// Data rows per report page, sized for A4-ish line printers.
const REPORT_ROWS_PER_PAGE: usize = 40;

/// Tabular row-set handed to export sinks.
pub struct RosterSheet {
    pub title: &'static str,
    pub headers: [&'static str; 5],
    pub rows: Vec<[String; 5]>,
}

/// Build the sink input from the current roster: one row per record in list
/// order, ISO dates, two-decimal GPAs.
pub fn roster_sheet(students: &[Student]) -> RosterSheet {
    let rows = students
        .iter()
        .map(|s| {
            [
                s.id.clone(),
                s.name.clone(),
                s.dob.to_string(),
                s.class_name.clone(),
                format!("{:.2}", s.gpa),
            ]
        })
        .collect();

    RosterSheet {
        title: ROSTER_TITLE,
        headers: EXPORT_HEADERS,
        rows,
    }
}

/// Render the sheet as CSV: a header row followed by one line per record.
pub fn write_csv<W: Write>(sheet: &RosterSheet, writer: &mut W) -> Result<()> {
    let header_line = sheet
        .headers
        .iter()
        .map(|h| csv_field(h))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{header_line}").context("failed to write CSV header")?;

    for row in &sheet.rows {
        let line = row
            .iter()
            .map(|cell| csv_field(cell))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{line}").context("failed to write CSV row")?;
    }
    Ok(())
}

/// Render the sheet as a paginated plain-text table. Each page repeats the
/// title and column headers so pages stay readable when printed separately.
pub fn write_report<W: Write>(sheet: &RosterSheet, writer: &mut W) -> Result<()> {
    let widths = column_widths(sheet);
    let page_count = sheet.rows.len().div_ceil(REPORT_ROWS_PER_PAGE).max(1);

    for page in 0..page_count {
        if page > 0 {
            writeln!(writer).context("failed to write page break")?;
        }
        writeln!(writer, "{}  (page {}/{})", sheet.title, page + 1, page_count)
            .context("failed to write report title")?;
        writeln!(writer).context("failed to write report spacing")?;

        let header_cells: Vec<String> =
            sheet.headers.iter().map(|h| (*h).to_string()).collect();
        writeln!(writer, "{}", format_row(&header_cells, &widths))
            .context("failed to write report header")?;
        writeln!(writer, "{}", separator_row(&widths))
            .context("failed to write report separator")?;

        let start = page * REPORT_ROWS_PER_PAGE;
        let end = (start + REPORT_ROWS_PER_PAGE).min(sheet.rows.len());
        for row in &sheet.rows[start..end] {
            writeln!(writer, "{}", format_row(row.as_slice(), &widths))
                .context("failed to write report row")?;
        }
    }
    Ok(())
}

/// Write the spreadsheet sink to the export directory and return its path.
pub fn export_spreadsheet(students: &[Student]) -> Result<PathBuf> {
    let path = export_dir()?.join(SPREADSHEET_FILE_NAME);
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&roster_sheet(students), &mut writer)?;
    writer.flush().context("failed to flush spreadsheet export")?;
    info!("exported {} records to {}", students.len(), path.display());
    Ok(path)
}

/// Write the printable report sink to the export directory and return its
/// path.
pub fn export_report(students: &[Student]) -> Result<PathBuf> {
    let path = export_dir()?.join(REPORT_FILE_NAME);
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_report(&roster_sheet(students), &mut writer)?;
    writer.flush().context("failed to flush report export")?;
    info!("exported {} records to {}", students.len(), path.display());
    Ok(path)
}

/// Exports land in the user's download directory when one exists, matching
/// where the browser-based original dropped its files, otherwise in the
/// application data directory.
fn export_dir() -> Result<PathBuf> {
    if let Some(user_dirs) = UserDirs::new() {
        if let Some(downloads) = user_dirs.download_dir() {
            return Ok(downloads.to_path_buf());
        }
    }
    store::data_dir()
}

/// Quote a CSV field only when it needs it (commas, quotes, or newlines).
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn column_widths(sheet: &RosterSheet) -> [usize; 5] {
    let mut widths = [0usize; 5];
    for (idx, header) in sheet.headers.iter().enumerate() {
        widths[idx] = header.chars().count();
    }
    for row in &sheet.rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    widths
}

fn format_row(cells: &[String], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn separator_row(widths: &[usize; 5]) -> String {
    widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn student(id: &str, name: &str, gpa: f64) -> Student {
        Student::new(
            id,
            name,
            NaiveDate::from_ymd_opt(2002, 5, 15).unwrap(),
            "D20CQCN01-B",
            gpa,
        )
    }

    #[test]
    fn sheet_has_fixed_headers_and_one_row_per_record_in_order() {
        let students = vec![student("S1", "First", 3.8), student("S2", "Second", 2.0)];
        let sheet = roster_sheet(&students);

        assert_eq!(
            sheet.headers,
            ["Student ID", "Full Name", "Date of Birth", "Class", "GPA"]
        );
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][0], "S1");
        assert_eq!(sheet.rows[0][2], "2002-05-15");
        assert_eq!(sheet.rows[0][4], "3.80");
        assert_eq!(sheet.rows[1][0], "S2");
    }

    #[test]
    fn csv_contains_header_and_rows() {
        let students = vec![student("S1", "First", 3.8)];
        let mut out = Vec::new();
        write_csv(&roster_sheet(&students), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Student ID,Full Name,Date of Birth,Class,GPA"
        );
        assert_eq!(lines.next().unwrap(), "S1,First,2002-05-15,D20CQCN01-B,3.80");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_quotes_fields_that_need_it() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn report_repeats_title_and_headers_per_page() {
        let students: Vec<Student> = (0..REPORT_ROWS_PER_PAGE + 1)
            .map(|i| student(&format!("S{i:03}"), "Someone", 3.0))
            .collect();
        let mut out = Vec::new();
        write_report(&roster_sheet(&students), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.matches(ROSTER_TITLE).count(), 2);
        assert!(text.contains("(page 1/2)"));
        assert!(text.contains("(page 2/2)"));
        assert_eq!(text.matches("Student ID").count(), 2);
        // Every record appears exactly once.
        assert_eq!(text.matches("S000").count(), 1);
        assert_eq!(text.matches(&format!("S{:03}", REPORT_ROWS_PER_PAGE)).count(), 1);
    }

    #[test]
    fn empty_roster_report_still_has_a_single_page() {
        let mut out = Vec::new();
        write_report(&roster_sheet(&[]), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(page 1/1)"));
        assert!(text.contains("Student ID"));
    }
}

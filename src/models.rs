//! Domain model for the student roster. The struct mirrors the persisted
//! attribute mapping one-to-one and gets passed throughout the TUI, so the
//! intent is that it stays a light-weight data holder and every other layer
//! can focus on presentation, querying, and persistence logic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One student's stored attributes. The `id` is the sole identity key: it is
/// immutable after creation and the store never holds two records sharing it.
/// Everything else is replaceable value data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Student code such as `B20DCCN001`. Used for lookup, update, and
    /// delete, so edit flows bubble it back to the store unchanged.
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Date of birth as an ISO calendar date.
    pub dob: NaiveDate,
    /// Class the student belongs to. The persisted key keeps the original
    /// `className` spelling so existing mirrors round-trip losslessly.
    #[serde(rename = "className")]
    pub class_name: String,
    /// Grade point average. The 0.0–4.0 range is a form-level rule, not a
    /// store invariant.
    pub gpa: f64,
}

impl Student {
    /// Pure construction. Field-level validation (non-empty strings, GPA
    /// range) happens at the form boundary before this is called.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dob: NaiveDate,
        class_name: impl Into<String>,
        gpa: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dob,
            class_name: class_name.into(),
            gpa,
        }
    }

    /// Return a record with the same `id` and the four mutable fields
    /// replaced. Update is value replacement rather than in-place mutation,
    /// so views holding the old record never observe a half-applied edit.
    pub fn with_info(
        &self,
        name: impl Into<String>,
        dob: NaiveDate,
        class_name: impl Into<String>,
        gpa: f64,
    ) -> Self {
        Self {
            id: self.id.clone(),
            name: name.into(),
            dob,
            class_name: class_name.into(),
            gpa,
        }
    }

    /// Day-first date rendering for the roster table, matching the locale
    /// format the original surface used.
    pub fn display_dob(&self) -> String {
        self.dob.format("%d/%m/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn with_info_preserves_id_and_replaces_fields() {
        let original = Student::new(
            "B20DCCN001",
            "Nguyễn Văn Anh",
            date(2002, 5, 15),
            "D20CQCN01-B",
            3.8,
        );
        let updated = original.with_info("Nguyễn Văn An", date(2002, 5, 16), "D20CQCN02-N", 3.5);

        assert_eq!(updated.id, "B20DCCN001");
        assert_eq!(updated.name, "Nguyễn Văn An");
        assert_eq!(updated.dob, date(2002, 5, 16));
        assert_eq!(updated.class_name, "D20CQCN02-N");
        assert_eq!(updated.gpa, 3.5);
        // The original value is untouched.
        assert_eq!(original.name, "Nguyễn Văn Anh");
    }

    #[test]
    fn serde_round_trip_is_lossless() {
        let student = Student::new(
            "B20DCCN002",
            "Lê Thị Bình",
            date(2002, 8, 22),
            "D20CQCN01-B",
            3.4,
        );
        let json = serde_json::to_string(&student).unwrap();
        let back: Student = serde_json::from_str(&json).unwrap();
        assert_eq!(back, student);
    }

    #[test]
    fn persisted_mapping_keeps_original_keys() {
        let student = Student::new("X1", "Test", date(2000, 1, 2), "C1", 3.0);
        let value = serde_json::to_value(&student).unwrap();
        assert!(value.get("className").is_some());
        assert_eq!(value.get("dob").unwrap(), "2000-01-02");
    }

    #[test]
    fn display_dob_is_day_first() {
        let student = Student::new("X1", "Test", date(2002, 1, 10), "C1", 2.9);
        assert_eq!(student.display_dob(), "10/01/2002");
    }
}

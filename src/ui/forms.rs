use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Student;

/// Values produced by a successfully validated student form, ready for the
/// store.
#[derive(Debug)]
pub(crate) struct StudentInput {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) dob: NaiveDate,
    pub(crate) class_name: String,
    pub(crate) gpa: f64,
}

/// Fields available within the student form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum StudentField {
    Id,
    Name,
    Dob,
    ClassName,
    Gpa,
}

impl Default for StudentField {
    fn default() -> Self {
        StudentField::Id
    }
}

/// Internal representation of the create/edit form. All five values are kept
/// as raw text while the user types; `parse_inputs` turns them into typed
/// values and produces the inline validation messages.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) dob: String,
    pub(crate) class_name: String,
    pub(crate) gpa: String,
    /// Edit mode freezes the id; it is the record's identity.
    pub(crate) id_locked: bool,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

impl StudentForm {
    /// Populate the form from an existing record when entering edit mode.
    /// The id field is shown but locked.
    pub(crate) fn from_student(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            dob: student.dob.to_string(),
            class_name: student.class_name.clone(),
            gpa: format!("{:.2}", student.gpa),
            id_locked: true,
            active: StudentField::Name,
            error: None,
        }
    }

    /// Cycle focus across the fields, skipping the id when it is locked.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            StudentField::Id => StudentField::Name,
            StudentField::Name => StudentField::Dob,
            StudentField::Dob => StudentField::ClassName,
            StudentField::ClassName => StudentField::Gpa,
            StudentField::Gpa => {
                if self.id_locked {
                    StudentField::Name
                } else {
                    StudentField::Id
                }
            }
        };
    }

    /// Append a character to the active field, filtering per-field input so
    /// the date and GPA fields only ever hold plausible characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            StudentField::Id => {
                if self.id_locked {
                    return false;
                }
                self.id.push(ch);
            }
            StudentField::Name => self.name.push(ch),
            StudentField::Dob => {
                if !ch.is_ascii_digit() && ch != '-' {
                    return false;
                }
                self.dob.push(ch);
            }
            StudentField::ClassName => self.class_name.push(ch),
            StudentField::Gpa => {
                if !ch.is_ascii_digit() && ch != '.' {
                    return false;
                }
                self.gpa.push(ch);
            }
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            StudentField::Id => {
                if !self.id_locked {
                    self.id.pop();
                }
            }
            StudentField::Name => {
                self.name.pop();
            }
            StudentField::Dob => {
                self.dob.pop();
            }
            StudentField::ClassName => {
                self.class_name.pop();
            }
            StudentField::Gpa => {
                self.gpa.pop();
            }
        }
    }

    /// Validate and normalize the inputs, returning typed values ready for
    /// the store. The GPA range rule lives here, at the form boundary, not
    /// in the store.
    pub(crate) fn parse_inputs(&self) -> Result<StudentInput> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(anyhow!("Student ID is required."));
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Full name is required."));
        }
        let dob = NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d")
            .context("Date of birth must be a valid date (YYYY-MM-DD).")?;
        let class_name = self.class_name.trim();
        if class_name.is_empty() {
            return Err(anyhow!("Class is required."));
        }
        let gpa_raw = self.gpa.trim();
        if gpa_raw.is_empty() {
            return Err(anyhow!("GPA is required."));
        }
        let gpa = gpa_raw.parse::<f64>().context("GPA must be a number.")?;
        if !(0.0..=4.0).contains(&gpa) {
            return Err(anyhow!("GPA must be between 0.0 and 4.0."));
        }

        Ok(StudentInput {
            id: id.to_string(),
            name: name.to_string(),
            dob,
            class_name: class_name.to_string(),
            gpa,
        })
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field_name: &str, field: StudentField) -> Line<'static> {
        let (value, is_active) = (self.value(field), self.active == field);

        let placeholder = match field {
            StudentField::Dob => "<YYYY-MM-DD>",
            StudentField::Gpa => "<0.0 - 4.0>",
            _ => "<required>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        };

        let style = if field == StudentField::Id && self.id_locked {
            Style::default().fg(Color::DarkGray)
        } else if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character count for the requested field, used for cursor placement.
    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: StudentField) -> &str {
        match field {
            StudentField::Id => &self.id,
            StudentField::Name => &self.name,
            StudentField::Dob => &self.dob,
            StudentField::ClassName => &self.class_name,
            StudentField::Gpa => &self.gpa,
        }
    }
}

/// State for the delete confirmation dialog.
#[derive(Clone)]
pub(crate) struct ConfirmStudentDelete {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl ConfirmStudentDelete {
    /// Build the confirmation state from the record being considered.
    pub(crate) fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StudentField, StudentForm};

    fn filled_form() -> StudentForm {
        StudentForm {
            id: "B20DCCN004".to_string(),
            name: "Phạm Thị Dung".to_string(),
            dob: "2002-03-04".to_string(),
            class_name: "D20CQCN01-B".to_string(),
            gpa: "3.2".to_string(),
            ..StudentForm::default()
        }
    }

    #[test]
    fn valid_inputs_parse() {
        let input = filled_form().parse_inputs().unwrap();
        assert_eq!(input.id, "B20DCCN004");
        assert_eq!(input.dob.to_string(), "2002-03-04");
        assert_eq!(input.gpa, 3.2);
    }

    #[test]
    fn missing_fields_are_rejected_with_messages() {
        let mut form = filled_form();
        form.id.clear();
        assert!(form.parse_inputs().unwrap_err().to_string().contains("ID"));

        let mut form = filled_form();
        form.name.clear();
        assert!(form.parse_inputs().unwrap_err().to_string().contains("name"));

        let mut form = filled_form();
        form.class_name = "   ".to_string();
        assert!(form.parse_inputs().unwrap_err().to_string().contains("Class"));
    }

    #[test]
    fn bad_dates_are_rejected() {
        let mut form = filled_form();
        form.dob = "2002-13-40".to_string();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn gpa_range_is_enforced_at_the_form() {
        let mut form = filled_form();
        form.gpa = "4.5".to_string();
        assert!(form
            .parse_inputs()
            .unwrap_err()
            .to_string()
            .contains("between"));

        form.gpa = "4.0".to_string();
        assert!(form.parse_inputs().is_ok());

        form.gpa = "0".to_string();
        assert!(form.parse_inputs().is_ok());
    }

    #[test]
    fn locked_id_ignores_edits_and_focus() {
        let mut form = filled_form();
        form.id_locked = true;
        form.active = StudentField::Id;
        assert!(!form.push_char('x'));
        form.backspace();
        assert_eq!(form.id, "B20DCCN004");

        form.active = StudentField::Gpa;
        form.toggle_field();
        assert!(form.active == StudentField::Name);
    }

    #[test]
    fn field_charsets_are_filtered() {
        let mut form = StudentForm::default();
        form.active = StudentField::Dob;
        assert!(form.push_char('2'));
        assert!(form.push_char('-'));
        assert!(!form.push_char('x'));

        form.active = StudentField::Gpa;
        assert!(form.push_char('3'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('a'));
    }
}

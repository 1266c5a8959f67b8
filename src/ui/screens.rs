use crate::models::Student;
use crate::query::filter_students;
use crate::stats::{average_gpa_by_class, overall_average_gpa, rank_distribution, RankCount};

/// Backing state for the roster table: the authoritative list, the filtered
/// view derived from it, and the current selection. The filtered view is
/// recomputed from scratch whenever the list or the filter changes.
pub(crate) struct RosterScreen {
    pub(crate) students: Vec<Student>,
    pub(crate) filtered: Vec<Student>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl RosterScreen {
    pub(crate) fn new(students: Vec<Student>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            students,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        self.filtered = match &self.filter {
            Some(term) => filter_students(&self.students, term),
            None => self.students.clone(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    pub(crate) fn set_students(&mut self, students: Vec<Student>) {
        self.students = students;
        self.apply_filter();
    }

    pub(crate) fn current_student(&self) -> Option<&Student> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = self.filtered.len() - 1;
        }
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }
}

/// One row of the per-class average view.
pub(crate) struct ClassRow {
    pub(crate) name: String,
    pub(crate) average: f64,
    pub(crate) count: usize,
}

/// Snapshot of the aggregate statistics, computed from the roster when the
/// stats screen opens. Cheap enough to rebuild every visit.
pub(crate) struct StatsScreen {
    pub(crate) total: usize,
    pub(crate) overall_average: f64,
    pub(crate) class_rows: Vec<ClassRow>,
    pub(crate) ranks: Vec<RankCount>,
}

impl StatsScreen {
    pub(crate) fn from_students(students: &[Student]) -> Self {
        let class_rows = average_gpa_by_class(students)
            .into_iter()
            .map(|(name, summary)| ClassRow {
                name,
                average: summary.average,
                count: summary.count,
            })
            .collect();

        Self {
            total: students.len(),
            overall_average: overall_average_gpa(students),
            class_rows,
            ranks: rank_distribution(students),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RosterScreen;
    use crate::models::Student;
    use chrono::NaiveDate;

    fn student(id: &str, name: &str) -> Student {
        Student::new(
            id,
            name,
            NaiveDate::from_ymd_opt(2002, 1, 1).unwrap(),
            "C1",
            3.0,
        )
    }

    #[test]
    fn filtering_clamps_the_selection() {
        let mut screen = RosterScreen::new(vec![
            student("S1", "Alpha"),
            student("S2", "Beta"),
            student("S3", "Gamma"),
        ]);
        screen.select_last();
        assert_eq!(screen.selected, 2);

        screen.set_filter(Some("beta".to_string()));
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.selected, 0);
        assert_eq!(screen.current_student().unwrap().id, "S2");
    }

    #[test]
    fn selection_stays_within_bounds() {
        let mut screen = RosterScreen::new(vec![student("S1", "Alpha"), student("S2", "Beta")]);
        screen.move_selection(-5);
        assert_eq!(screen.selected, 0);
        screen.move_selection(10);
        assert_eq!(screen.selected, 1);
    }
}

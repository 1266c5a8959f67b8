//! Free-text roster filtering. Matching is a pure function of the record
//! list and the search term; with a handful of records there is no point in
//! indexing, so every keystroke just re-filters the full list.

use crate::models::Student;

/// Case-insensitive substring match across id, name, and class. A record
/// matches when the term occurs in any of the three fields; an empty or
/// whitespace-only term matches everything, preserving order.
pub fn filter_students(students: &[Student], term: &str) -> Vec<Student> {
    let needle = term.to_lowercase();
    if needle.trim().is_empty() {
        return students.to_vec();
    }

    students
        .iter()
        .filter(|s| {
            s.id.to_lowercase().contains(&needle)
                || s.name.to_lowercase().contains(&needle)
                || s.class_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_students;
    use crate::models::Student;
    use chrono::NaiveDate;

    fn student(id: &str, name: &str, class_name: &str) -> Student {
        Student::new(
            id,
            name,
            NaiveDate::from_ymd_opt(2002, 1, 1).unwrap(),
            class_name,
            3.0,
        )
    }

    fn roster() -> Vec<Student> {
        vec![
            student("B20DCCN001", "Nguyễn Văn Anh", "D20CQCN01-B"),
            student("B20DCCN002", "Lê Thị Bình", "D20CQCN01-B"),
            student("B21DCAT007", "Trần Văn Chung", "D21CQAT02-N"),
        ]
    }

    #[test]
    fn empty_term_returns_all_in_order() {
        let students = roster();
        let filtered = filter_students(&students, "");
        assert_eq!(filtered, students);

        let filtered = filter_students(&students, "   ");
        assert_eq!(filtered, students);
    }

    #[test]
    fn matches_are_case_insensitive() {
        let students = roster();
        let filtered = filter_students(&students, "b20dccn");
        assert_eq!(filtered.len(), 2);

        let filtered = filter_students(&students, "BÌNH");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "B20DCCN002");
    }

    #[test]
    fn matches_any_of_the_three_fields() {
        let students = roster();

        // id only
        assert_eq!(filter_students(&students, "AT007").len(), 1);
        // name only
        assert_eq!(filter_students(&students, "Chung").len(), 1);
        // class only
        assert_eq!(filter_students(&students, "CQCN01").len(), 2);
    }

    #[test]
    fn no_match_yields_empty_list() {
        let students = roster();
        assert!(filter_students(&students, "zzz").is_empty());
    }
}

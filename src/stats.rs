//! Aggregate statistics derived from the roster. Every function here is a
//! stateless pure computation over the current record list; the UI recomputes
//! them on demand instead of caching, which keeps invalidation trivial for
//! the small record counts involved.

use std::collections::BTreeMap;

use crate::models::Student;

/// Per-class aggregate: mean GPA (rounded to two decimals for display) and
/// member count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpaSummary {
    pub average: f64,
    pub count: usize,
}

/// The four fixed GPA bands, ordered from strongest to weakest. Bands are
/// evaluated top-down, so the first threshold that holds wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl Rank {
    /// All bands in display order.
    pub const ALL: [Rank; 4] = [Rank::Excellent, Rank::Good, Rank::Fair, Rank::Weak];

    /// Classify a GPA into its band.
    pub fn for_gpa(gpa: f64) -> Rank {
        if gpa >= 3.6 {
            Rank::Excellent
        } else if gpa >= 3.2 {
            Rank::Good
        } else if gpa >= 2.5 {
            Rank::Fair
        } else {
            Rank::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Excellent => "Excellent",
            Rank::Good => "Good",
            Rank::Fair => "Fair",
            Rank::Weak => "Weak",
        }
    }

    /// Threshold description shown next to the label in the stats view.
    pub fn range_label(&self) -> &'static str {
        match self {
            Rank::Excellent => ">= 3.6",
            Rank::Good => "3.2 - 3.59",
            Rank::Fair => "2.5 - 3.19",
            Rank::Weak => "< 2.5",
        }
    }
}

/// One slice of the rank distribution. Zero-count bands are omitted, so
/// consumers must cope with a variable-length (possibly empty) list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCount {
    pub rank: Rank,
    pub count: usize,
}

/// Group records by class and average their GPAs. Only classes that actually
/// occur in the roster appear as keys; the `BTreeMap` gives the stats view a
/// stable display order.
pub fn average_gpa_by_class(students: &[Student]) -> BTreeMap<String, GpaSummary> {
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for student in students {
        let entry = totals.entry(student.class_name.clone()).or_insert((0.0, 0));
        entry.0 += student.gpa;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(class_name, (total, count))| {
            (
                class_name,
                GpaSummary {
                    average: round2(total / count as f64),
                    count,
                },
            )
        })
        .collect()
}

/// Partition the roster into the four fixed bands, dropping empty ones.
pub fn rank_distribution(students: &[Student]) -> Vec<RankCount> {
    let mut counts = [0usize; 4];
    for student in students {
        let slot = Rank::ALL
            .iter()
            .position(|rank| *rank == Rank::for_gpa(student.gpa))
            .unwrap_or(3);
        counts[slot] += 1;
    }

    Rank::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(rank, count)| RankCount { rank: *rank, count })
        .collect()
}

/// Mean GPA across the whole roster, defined as zero for an empty set so
/// callers never divide by zero.
pub fn overall_average_gpa(students: &[Student]) -> f64 {
    if students.is_empty() {
        return 0.0;
    }
    let total: f64 = students.iter().map(|s| s.gpa).sum();
    total / students.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

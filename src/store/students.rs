use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use thiserror::Error;

use crate::models::Student;

use super::kv::KvStore;

/// Fixed key the serialized roster lives under in the key-value store.
pub const STORE_KEY: &str = "students";

/// Store-level failures surfaced to the presentation layer. All of these are
/// recoverable; the UI shows them as transient footer messages.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Student ID {0} already exists.")]
    DuplicateId(String),
    #[error("Student {0} not found.")]
    NotFound(String),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// Authoritative collection of student records. The in-memory list is the
/// source of truth during a session and keeps insertion order; every
/// successful mutation re-serializes the whole list back to the key-value
/// mirror. No diffing — record counts are small and there is exactly one
/// writer.
pub struct StudentStore {
    kv: KvStore,
    students: Vec<Student>,
}

impl StudentStore {
    /// Read the persisted mirror once at startup. A missing or malformed
    /// mirror falls back to the built-in sample roster; that is the default
    /// data policy for a fresh (or damaged) install, not an error path, so
    /// it is logged and the seed is persisted in place of the bad data.
    pub fn load(kv: KvStore) -> Result<Self> {
        let (students, seeded) = match kv.get(STORE_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<Student>>(&raw) {
                Ok(list) => (list, false),
                Err(err) => {
                    warn!("persisted roster is malformed ({err}); falling back to sample data");
                    (seed_students(), true)
                }
            },
            None => {
                info!("no persisted roster found; seeding sample data");
                (seed_students(), true)
            }
        };

        let store = Self { kv, students };
        if seeded {
            store.persist()?;
        }
        Ok(store)
    }

    /// Append a new record. Rejected when the id is already taken, leaving
    /// the list untouched.
    pub fn add(&mut self, student: Student) -> Result<(), StoreError> {
        if self.students.iter().any(|s| s.id == student.id) {
            return Err(StoreError::DuplicateId(student.id));
        }
        info!("adding student {}", student.id);
        self.students.push(student);
        self.persist()?;
        Ok(())
    }

    /// Replace the mutable fields of the record with the given id, keeping
    /// its position in the list so the table does not reorder under an edit.
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        dob: NaiveDate,
        class_name: &str,
        gpa: f64,
    ) -> Result<(), StoreError> {
        let position = self
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        info!("updating student {id}");
        self.students[position] = self.students[position].with_info(name, dob, class_name, gpa);
        self.persist()?;
        Ok(())
    }

    /// Remove the record with the given id. Confirmation is the caller's
    /// responsibility; the store just mutates.
    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let position = self
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        info!("removing student {id}");
        self.students.remove(position);
        self.persist()?;
        Ok(())
    }

    /// Read-only view of the current roster in insertion order.
    pub fn all(&self) -> &[Student] {
        &self.students
    }

    /// Look up a single record by id, used by the edit flow.
    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let serialized =
            serde_json::to_string(&self.students).context("failed to serialize roster")?;
        self.kv.put(STORE_KEY, &serialized)
    }
}

/// The three sample records shipped with the original application. They give
/// a first-time user something to explore and double as recovery data when
/// the mirror cannot be parsed.
fn seed_students() -> Vec<Student> {
    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("seed dates are valid")
    }

    vec![
        Student::new(
            "B20DCCN001",
            "Nguyễn Văn Anh",
            date(2002, 5, 15),
            "D20CQCN01-B",
            3.8,
        ),
        Student::new(
            "B20DCCN002",
            "Lê Thị Bình",
            date(2002, 8, 22),
            "D20CQCN01-B",
            3.4,
        ),
        Student::new(
            "B20DCCN003",
            "Trần Văn Chung",
            date(2002, 1, 10),
            "D20CQCN02-N",
            2.9,
        ),
    ]
}

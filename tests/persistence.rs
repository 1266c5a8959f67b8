use chrono::NaiveDate;
use student_records_manager::store::STORE_KEY;
use student_records_manager::{KvStore, Student, StudentStore};
use tempfile::TempDir;

fn student(id: &str, name: &str) -> Student {
    Student::new(
        id,
        name,
        NaiveDate::from_ymd_opt(2001, 12, 24).unwrap(),
        "D20CQCN01-B",
        3.33,
    )
}

#[test]
fn mirror_round_trips_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.sqlite");

    {
        let kv = KvStore::open_at(&path).unwrap();
        kv.put(STORE_KEY, "[]").unwrap();
        let mut store = StudentStore::load(kv).unwrap();
        store.add(student("S1", "First")).unwrap();
        store.add(student("S2", "Second")).unwrap();
        store.remove("S1").unwrap();
        store.add(student("S3", "Third")).unwrap();
    }

    let kv = KvStore::open_at(&path).unwrap();
    let store = StudentStore::load(kv).unwrap();

    let ids: Vec<&str> = store.all().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["S2", "S3"]);
    assert_eq!(store.all()[0].name, "Second");
    assert_eq!(store.all()[0].dob.to_string(), "2001-12-24");
    assert_eq!(store.all()[0].gpa, 3.33);
}

#[test]
fn seeding_repairs_a_malformed_mirror_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.sqlite");

    {
        let kv = KvStore::open_at(&path).unwrap();
        kv.put(STORE_KEY, "]]garbage[[").unwrap();
        let store = StudentStore::load(kv).unwrap();
        assert_eq!(store.len(), 3);
    }

    // The repaired mirror must now be valid JSON holding the seed roster.
    let kv = KvStore::open_at(&path).unwrap();
    let raw = kv.get(STORE_KEY).unwrap().unwrap();
    let parsed: Vec<Student> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[0].id, "B20DCCN001");
}

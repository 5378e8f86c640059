//! Concurrent in-memory student store.
//!
//! The record map and the id counter live in one aggregate behind a single mutex, so an id
//! is reserved and inserted in the same critical section. Every operation holds the lock only
//! for the map access itself; callers perform I/O after the guard has been dropped.

use crate::records::types::{StoreError, Student, StudentFields, StudentId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct StoreState {
    records: HashMap<StudentId, Student>,
    next_id: StudentId,
}

/// Exclusive owner of all student records and the identifier counter.
///
/// Construct once per process and share it through an `Arc`.
pub struct StudentStore {
    state: Mutex<StoreState>,
}

impl StudentStore {
    /// Create an empty store whose first assigned id is `1`.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                records: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    // Each mutation is a single map operation plus a counter bump, so a poisoned guard
    // never exposes half-applied state.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a new record, assigning the next identifier.
    pub fn insert(&self, fields: StudentFields) -> Student {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let student = fields.with_id(id);
        state.records.insert(id, student.clone());
        student
    }

    /// Point-in-time snapshot of every stored record, in ascending id order.
    pub fn list(&self) -> Vec<Student> {
        let mut students: Vec<Student> = {
            let state = self.lock();
            state.records.values().cloned().collect()
        };
        students.sort_unstable_by_key(|student| student.id);
        students
    }

    /// Fetch a record by identifier.
    pub fn get(&self, id: StudentId) -> Result<Student, StoreError> {
        self.lock()
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Replace every field of an existing record, keeping its identifier.
    pub fn update(&self, id: StudentId, fields: StudentFields) -> Result<Student, StoreError> {
        let mut state = self.lock();
        let slot = state.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = fields.with_id(id);
        Ok(slot.clone())
    }

    /// Remove a record. The identifier is never handed out again.
    pub fn delete(&self, id: StudentId) -> Result<(), StoreError> {
        self.lock()
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StudentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn fields(name: &str, age: i64, email: &str) -> StudentFields {
        StudentFields {
            name: name.into(),
            age,
            email: email.into(),
        }
    }

    #[test]
    fn freed_ids_are_never_reassigned() {
        let store = StudentStore::new();
        let ann = store.insert(fields("Ann", 20, "a@x.com"));
        let bo = store.insert(fields("Bo", 21, "b@x.com"));
        assert_eq!(ann.id, 1);
        assert_eq!(bo.id, 2);

        let fetched = store.get(1).expect("ann stored");
        assert_eq!(fetched.name, "Ann");

        store.delete(1).expect("delete ann");
        assert_eq!(store.get(1), Err(StoreError::NotFound(1)));

        let cy = store.insert(fields("Cy", 19, "c@x.com"));
        assert_eq!(cy.id, 3);
    }

    #[test]
    fn insert_then_get_returns_same_fields() {
        let store = StudentStore::new();
        let input = fields("Dee", 30, "d@x.com");
        let stored = store.insert(input.clone());
        let fetched = store.get(stored.id).expect("stored");
        assert_eq!(StudentFields::from(fetched), input);
    }

    #[test]
    fn update_missing_id_leaves_store_untouched() {
        let store = StudentStore::new();
        assert_eq!(
            store.update(99, fields("X", 1, "x@x.com")),
            Err(StoreError::NotFound(99))
        );
        assert!(store.is_empty());

        store.insert(fields("Ann", 20, "a@x.com"));
        let before = store.list();
        assert!(store.update(42, fields("X", 1, "x@x.com")).is_err());
        assert_eq!(store.list(), before);
    }

    #[test]
    fn update_keeps_original_id() {
        let store = StudentStore::new();
        let ann = store.insert(fields("Ann", 20, "a@x.com"));
        let updated = store
            .update(ann.id, fields("Ann B", 22, "ab@x.com"))
            .expect("update");
        assert_eq!(updated.id, ann.id);
        assert_eq!(updated.name, "Ann B");
        assert_eq!(store.get(ann.id).expect("present"), updated);
    }

    #[test]
    fn delete_missing_id_signals_not_found() {
        let store = StudentStore::new();
        assert_eq!(store.delete(7), Err(StoreError::NotFound(7)));
    }

    #[test]
    fn list_size_tracks_inserts_minus_deletes() {
        let store = StudentStore::new();
        for idx in 0..10 {
            store.insert(fields(&format!("s{idx}"), idx, "s@x.com"));
        }
        store.delete(3).expect("delete 3");
        store.delete(7).expect("delete 7");
        assert!(store.delete(7).is_err());
        assert_eq!(store.list().len(), 8);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn concurrent_inserts_receive_unique_sequential_ids() {
        let store = Arc::new(StudentStore::new());
        let workers = 8;
        let per_worker = 250;

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut ids = Vec::with_capacity(per_worker);
                    for n in 0..per_worker {
                        let student = store.insert(fields(
                            &format!("w{worker}-{n}"),
                            n as i64,
                            "w@x.com",
                        ));
                        ids.push(student.id);
                    }
                    ids
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let ids = handle.join().expect("worker");
            // Ids observed by a single caller are strictly increasing.
            assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(ids);
        }

        let total = (workers * per_worker) as i64;
        assert_eq!(all.len() as i64, total);
        assert_eq!(all, (1..=total).collect::<HashSet<_>>());
        assert_eq!(store.len(), workers * per_worker);
    }
}

//! Student records: the concurrent store and the service that fronts it.

mod service;
pub mod store;
pub mod types;

pub use service::{RecordApi, RecordService, decode_fields, parse_student_id};
pub use store::StudentStore;
pub use types::{RecordError, StoreError, Student, StudentFields, StudentId};

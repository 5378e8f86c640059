//! Record service adapting inbound requests to store operations.

use crate::{
    config::Config,
    metrics::{MetricsSnapshot, RegistryMetrics},
    records::{
        store::StudentStore,
        types::{RecordError, Student, StudentFields, StudentId},
    },
    summarization::{SummarizationClient, SummarizationClientError, get_summarization_client},
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Abstraction over the record service used by the HTTP surface.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Insert a new student and return it with its assigned id.
    fn create(&self, fields: StudentFields) -> Student;

    /// Snapshot every stored student.
    fn list(&self) -> Vec<Student>;

    /// Fetch a single student.
    fn get(&self, id: StudentId) -> Result<Student, RecordError>;

    /// Replace a student's fields, keeping its id.
    fn update(&self, id: StudentId, fields: StudentFields) -> Result<Student, RecordError>;

    /// Remove a student.
    fn delete(&self, id: StudentId) -> Result<(), RecordError>;

    /// Ask the summarization collaborator to describe a student.
    async fn summarize(&self, id: StudentId) -> Result<String, RecordError>;

    /// Current activity counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;

    /// Number of students currently stored.
    fn stored_count(&self) -> usize;
}

/// Coordinates the student store, the summarization collaborator, and activity metrics.
///
/// Construct once near process start and share it through an `Arc`.
pub struct RecordService {
    store: Arc<StudentStore>,
    summarizer: Box<dyn SummarizationClient>,
    summary_timeout: Duration,
    metrics: RegistryMetrics,
}

impl RecordService {
    /// Assemble a service from explicit parts.
    pub fn new(
        store: Arc<StudentStore>,
        summarizer: Box<dyn SummarizationClient>,
        summary_timeout: Duration,
    ) -> Self {
        Self {
            store,
            summarizer,
            summary_timeout,
            metrics: RegistryMetrics::new(),
        }
    }

    /// Build a service with a fresh store and the configured summarization provider.
    pub fn from_config(config: &Config) -> Result<Self, SummarizationClientError> {
        tracing::info!(
            provider = ?config.summarization_provider,
            "Initializing summarization client"
        );
        let summarizer = get_summarization_client(config)?;
        Ok(Self::new(
            Arc::new(StudentStore::new()),
            summarizer,
            config.summary_timeout(),
        ))
    }
}

#[async_trait]
impl RecordApi for RecordService {
    fn create(&self, fields: StudentFields) -> Student {
        let student = self.store.insert(fields);
        self.metrics.record_created();
        tracing::info!(id = student.id, "Student created");
        student
    }

    fn list(&self) -> Vec<Student> {
        let students = self.store.list();
        tracing::debug!(count = students.len(), "Listed students");
        students
    }

    fn get(&self, id: StudentId) -> Result<Student, RecordError> {
        Ok(self.store.get(id)?)
    }

    fn update(&self, id: StudentId, fields: StudentFields) -> Result<Student, RecordError> {
        let student = self.store.update(id, fields)?;
        self.metrics.record_updated();
        tracing::info!(id, "Student updated");
        Ok(student)
    }

    fn delete(&self, id: StudentId) -> Result<(), RecordError> {
        self.store.delete(id)?;
        self.metrics.record_deleted();
        tracing::info!(id, "Student deleted");
        Ok(())
    }

    async fn summarize(&self, id: StudentId) -> Result<String, RecordError> {
        // The store guard is released inside `get`; the collaborator runs lock-free.
        let student = self.store.get(id)?;
        let outcome =
            tokio::time::timeout(self.summary_timeout, self.summarizer.summarize_student(&student))
                .await;

        let result = match outcome {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(error)) => {
                tracing::warn!(id, %error, "Summarization failed");
                Err(RecordError::SummaryUnavailable(error.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    id,
                    timeout_ms = self.summary_timeout.as_millis() as u64,
                    "Summarization timed out"
                );
                Err(RecordError::SummaryUnavailable(format!(
                    "timed out after {:?}",
                    self.summary_timeout
                )))
            }
        };
        self.metrics.record_summary(result.is_ok());
        result
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn stored_count(&self) -> usize {
        self.store.len()
    }
}

/// Parse a path segment into a student id.
pub fn parse_student_id(raw: &str) -> Result<StudentId, RecordError> {
    raw.parse()
        .map_err(|_| RecordError::InvalidIdentifier(raw.to_string()))
}

/// Decode a JSON request body into student fields.
pub fn decode_fields(body: &[u8]) -> Result<StudentFields, RecordError> {
    serde_json::from_slice(body).map_err(|error| RecordError::MalformedInput(error.to_string()))
}

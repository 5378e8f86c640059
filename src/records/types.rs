//! Core data types and error definitions for student records.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Identifier assigned to a stored student by the record store.
pub type StudentId = i64;

/// A stored student record as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned identifier, unique and never reused.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Age in years; not range-checked.
    pub age: i64,
    /// Contact address; not format-checked.
    pub email: String,
}

/// Caller-supplied fields for creating or replacing a student.
///
/// Any `id` present in the inbound payload is ignored during decoding. Missing or `null`
/// fields decode to their zero value; only syntax and type errors are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentFields {
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Age in years.
    #[serde(deserialize_with = "null_as_default")]
    pub age: i64,
    /// Contact address.
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StudentFields {
    /// Stamp the fields with an identifier, producing a full record.
    pub(crate) fn with_id(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            age: self.age,
            email: self.email,
        }
    }
}

impl From<Student> for StudentFields {
    fn from(student: Student) -> Self {
        Self {
            name: student.name,
            age: student.age,
            email: student.email,
        }
    }
}

/// Failure signalled by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record exists for the identifier.
    #[error("Student {0} not found")]
    NotFound(StudentId),
}

/// Errors surfaced by the record service to the request boundary.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Request body could not be decoded into student fields.
    #[error("Invalid request payload: {0}")]
    MalformedInput(String),
    /// Path identifier is not an integer.
    #[error("Invalid student ID: {0}")]
    InvalidIdentifier(String),
    /// No record exists for the identifier.
    #[error("Student not found")]
    NotFound(StudentId),
    /// Summarization collaborator failed or timed out.
    #[error("Error generating summary: {0}")]
    SummaryUnavailable(String),
}

impl From<StoreError> for RecordError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(id),
        }
    }
}

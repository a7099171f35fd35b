use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::{constants::ID_FIELD, error::Result};

/// A student record, the only shape the walkthrough writes itself.
///
/// Stored documents stay schema-free; this type is used for what the
/// walkthrough constructs and for reading records back when all three fields
/// are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Display name
    pub name:  String,
    /// Age in years
    pub age:   i32,
    /// Field of study
    pub major: String,
}

impl Student {
    /// Creates a new student record.
    pub fn new(name: &str, age: i32, major: &str) -> Self {
        Self {
            name: name.to_owned(),
            age,
            major: major.to_owned(),
        }
    }

    /// Serializes the record into a BSON document without a key.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::BsonSerialization` if serialization fails.
    pub fn to_document(&self) -> Result<Document> { Ok(bson::to_document(self)?) }

    /// Reads a record back from a stored document, ignoring extra fields.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::BsonDeserialization` when a field is missing or
    /// has the wrong type.
    pub fn from_document(doc: Document) -> Result<Self> { Ok(bson::from_document(doc)?) }
}

/// Returns the unique key of a stored document, if it has one.
pub fn document_id(doc: &Document) -> Option<&Bson> { doc.get(ID_FIELD) }

/// Renders a document as relaxed extended JSON for log output.
pub fn render(doc: &Document) -> String { Bson::Document(doc.clone()).into_relaxed_extjson().to_string() }

/// Renders a list of documents as a JSON array for log output.
pub fn render_all(docs: &[Document]) -> String {
    let values: Vec<serde_json::Value> = docs
        .iter()
        .map(|doc| Bson::Document(doc.clone()).into_relaxed_extjson())
        .collect();
    serde_json::Value::Array(values).to_string()
}

#[cfg(test)]
mod tests {
    use bson::{doc, oid::ObjectId};

    use super::*;

    #[test]
    fn test_student_round_trips_through_document() {
        let student = Student::new("John Doe", 25, "Computer Science");
        let doc = student.to_document().unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "John Doe");
        assert_eq!(doc.get_i32("age").unwrap(), 25);
        assert_eq!(doc.get_str("major").unwrap(), "Computer Science");
        assert!(document_id(&doc).is_none());
    }

    #[test]
    fn test_student_from_stored_document_ignores_key() {
        let doc = doc! {
            "_id": ObjectId::new(),
            "name": "Hans",
            "age": 37,
            "major": "Carpenter",
        };
        let student = Student::from_document(doc).unwrap();
        assert_eq!(student, Student::new("Hans", 37, "Carpenter"));
    }

    #[test]
    fn test_student_from_partial_document_fails() {
        let doc = doc! { "name": "Hans", "age": 37 };
        assert!(Student::from_document(doc).is_err());
    }

    #[test]
    fn test_render() {
        let doc = doc! { "name": "Peter", "age": 33 };
        assert_eq!(render(&doc), r#"{"name":"Peter","age":33}"#);
        assert_eq!(render_all(&[doc.clone(), doc]), r#"[{"name":"Peter","age":33},{"name":"Peter","age":33}]"#);
        assert_eq!(render_all(&[]), "[]");
    }
}

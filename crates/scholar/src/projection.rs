//! Document projection utilities.

use bson::{Bson, Document};

use crate::constants::ID_FIELD;

/// Which fields a query or `$project` stage returns.
///
/// Inclusion-style, as in `{ name: 1, age: 1, _id: 0 }`: the listed fields
/// are kept, everything else is dropped, and the key is kept unless
/// explicitly excluded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    /// Fields to include
    pub fields:     Vec<String>,
    /// Whether the `_id` key is suppressed
    pub exclude_id: bool,
}

impl Projection {
    /// Includes the given fields and keeps the key.
    pub fn include(fields: &[&str]) -> Self {
        Self {
            fields:     fields.iter().map(|s| (*s).to_owned()).collect(),
            exclude_id: false,
        }
    }

    /// Suppresses the key field in results.
    pub const fn without_id(mut self) -> Self {
        self.exclude_id = true;
        self
    }

    /// Renders the projection as a MongoDB projection document.
    pub fn to_document(&self) -> Document {
        let mut spec = Document::new();
        for field in &self.fields {
            spec.insert(field.clone(), 1_i32);
        }
        if self.exclude_id {
            spec.insert(ID_FIELD, 0_i32);
        }
        spec
    }

    /// Applies the projection to a document.
    ///
    /// Output fields follow the source document's order, like the server's.
    /// An empty field list with the key kept returns the document unchanged.
    pub fn apply(&self, doc: &Document) -> Document {
        if self.fields.is_empty() && !self.exclude_id {
            return doc.clone();
        }
        let mut projected = Document::new();
        for (key, value) in doc {
            let keep = if key == ID_FIELD {
                !self.exclude_id
            }
            else {
                self.fields.is_empty() || self.fields.iter().any(|f| f == key)
            };
            if keep {
                projected.insert(key.clone(), value.clone());
            }
        }
        projected
    }
}

impl From<Projection> for Bson {
    fn from(projection: Projection) -> Self { Self::Document(projection.to_document()) }
}

#[cfg(test)]
mod tests {
    use bson::{doc, oid::ObjectId};

    use super::*;

    #[test]
    fn test_to_document() {
        let projection = Projection::include(&["name", "age"]).without_id();
        assert_eq!(projection.to_document(), doc! { "name": 1, "age": 1, "_id": 0 });

        let projection = Projection::include(&["name", "age"]);
        assert_eq!(projection.to_document(), doc! { "name": 1, "age": 1 });
    }

    #[test]
    fn test_apply_excludes_id() {
        let doc = doc! { "_id": ObjectId::new(), "name": "Peter", "age": 33, "major": "Data" };
        let projected = Projection::include(&["name", "age"]).without_id().apply(&doc);
        assert_eq!(projected, doc! { "name": "Peter", "age": 33 });
    }

    #[test]
    fn test_apply_keeps_id_by_default() {
        let id = ObjectId::new();
        let doc = doc! { "_id": id, "name": "Peter", "age": 33, "major": "Data" };
        let projected = Projection::include(&["age", "name"]).apply(&doc);
        assert_eq!(projected, doc! { "_id": id, "name": "Peter", "age": 33 });
    }

    #[test]
    fn test_apply_skips_missing_fields() {
        let doc = doc! { "name": "Peter" };
        let projected = Projection::include(&["name", "age"]).without_id().apply(&doc);
        assert_eq!(projected, doc! { "name": "Peter" });
    }

    #[test]
    fn test_empty_projection() {
        let doc = doc! { "_id": 1, "name": "Peter" };
        assert_eq!(Projection::default().apply(&doc), doc);
        assert_eq!(Projection::default().without_id().apply(&doc), doc! { "name": "Peter" });
    }
}

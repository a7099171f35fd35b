use bson::{doc, Bson, Document};

use crate::comparison::values_equal;

/// A `$set` update: assigns the given fields on the matched document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    /// Field assignments
    pub set: Document,
}

impl Update {
    /// Starts an update assigning a single field.
    pub fn set(field: &str, value: impl Into<Bson>) -> Self { Self::default().and_set(field, value) }

    /// Adds another field assignment.
    pub fn and_set(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.set.insert(field, value.into());
        self
    }

    /// Renders the update as a MongoDB update document.
    pub fn to_document(&self) -> Document { doc! { "$set": self.set.clone() } }

    /// Applies the assignments in place, returning whether anything changed.
    pub fn apply(&self, doc: &mut Document) -> bool {
        let mut changed = false;
        for (field, value) in &self.set {
            let same = doc.get(field).is_some_and(|current| values_equal(current, value));
            if !same {
                doc.insert(field.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }
}

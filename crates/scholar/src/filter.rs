use std::cmp::Ordering;

use bson::{doc, Bson, Document};

use crate::comparison::{compare_bson_values, values_equal};

/// A filter condition selecting documents in a collection.
///
/// Renders to a MongoDB query document with [`Filter::to_document`] and can
/// be evaluated in-process with [`Filter::matches`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Equality filter: field == value
    Equals(String, Bson),
    /// Greater than filter: field > value
    GreaterThan(String, Bson),
    /// Greater or equal filter: field >= value
    GreaterOrEqual(String, Bson),
    /// Less than filter: field < value
    LessThan(String, Bson),
    /// Less or equal filter: field <= value
    LessOrEqual(String, Bson),
    /// In filter: field value is in the provided list
    In(String, Vec<Bson>),
    /// Exists filter: field exists (or doesn't exist if false)
    Exists(String, bool),
    /// Every child matches
    And(Vec<Self>),
    /// At least one child matches
    Or(Vec<Self>),
}

impl Filter {
    /// Equality on a field.
    pub fn equals(field: &str, value: impl Into<Bson>) -> Self { Self::Equals(field.to_owned(), value.into()) }

    /// Strict greater-than on a field.
    pub fn greater_than(field: &str, value: impl Into<Bson>) -> Self { Self::GreaterThan(field.to_owned(), value.into()) }

    /// Greater-or-equal on a field.
    pub fn greater_or_equal(field: &str, value: impl Into<Bson>) -> Self { Self::GreaterOrEqual(field.to_owned(), value.into()) }

    /// Strict less-than on a field.
    pub fn less_than(field: &str, value: impl Into<Bson>) -> Self { Self::LessThan(field.to_owned(), value.into()) }

    /// Less-or-equal on a field.
    pub fn less_or_equal(field: &str, value: impl Into<Bson>) -> Self { Self::LessOrEqual(field.to_owned(), value.into()) }

    /// Combines this filter with another; both must match.
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All => other,
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            },
            first => Self::And(vec![first, other]),
        }
    }

    /// Combines this filter with another; either may match.
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut children) => {
                children.push(other);
                Self::Or(children)
            },
            first => Self::Or(vec![first, other]),
        }
    }

    /// Renders the filter as a MongoDB query document.
    pub fn to_document(&self) -> Document {
        match *self {
            Self::All => doc! {},
            Self::Equals(ref field, ref value) => doc! { field: value.clone() },
            Self::GreaterThan(ref field, ref value) => doc! { field: { "$gt": value.clone() } },
            Self::GreaterOrEqual(ref field, ref value) => doc! { field: { "$gte": value.clone() } },
            Self::LessThan(ref field, ref value) => doc! { field: { "$lt": value.clone() } },
            Self::LessOrEqual(ref field, ref value) => doc! { field: { "$lte": value.clone() } },
            Self::In(ref field, ref values) => doc! { field: { "$in": values.clone() } },
            Self::Exists(ref field, exists) => doc! { field: { "$exists": exists } },
            Self::And(ref children) => {
                let children: Vec<Document> = children.iter().map(Self::to_document).collect();
                doc! { "$and": children }
            },
            Self::Or(ref children) => {
                let children: Vec<Document> = children.iter().map(Self::to_document).collect();
                doc! { "$or": children }
            },
        }
    }

    /// Checks whether a document satisfies the filter.
    ///
    /// Comparisons only match values of the same type bracket, so
    /// `{age: {$gt: 35}}` never matches a document whose `age` is a string.
    pub fn matches(&self, doc: &Document) -> bool {
        match *self {
            Self::All => true,
            Self::Equals(ref field, ref value) => doc.get(field).is_some_and(|v| values_equal(v, value)),
            Self::GreaterThan(ref field, ref value) => compare_field(doc, field, value) == Some(Ordering::Greater),
            Self::GreaterOrEqual(ref field, ref value) => {
                matches!(
                    compare_field(doc, field, value),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            },
            Self::LessThan(ref field, ref value) => compare_field(doc, field, value) == Some(Ordering::Less),
            Self::LessOrEqual(ref field, ref value) => {
                matches!(
                    compare_field(doc, field, value),
                    Some(Ordering::Less | Ordering::Equal)
                )
            },
            Self::In(ref field, ref values) => {
                doc.get(field)
                    .is_some_and(|v| values.iter().any(|candidate| values_equal(v, candidate)))
            },
            Self::Exists(ref field, exists) => doc.contains_key(field) == exists,
            Self::And(ref children) => children.iter().all(|child| child.matches(doc)),
            Self::Or(ref children) => children.iter().any(|child| child.matches(doc)),
        }
    }

    /// Fields pinned by equality, used to seed a document on upsert.
    ///
    /// Only top-level equalities and equalities nested in `And` count; an
    /// `Or` pins nothing.
    pub fn equality_fields(&self) -> Document {
        let mut seed = Document::new();
        self.collect_equalities(&mut seed);
        seed
    }

    /// Accumulates equality conditions into `seed`.
    fn collect_equalities(&self, seed: &mut Document) {
        match *self {
            Self::Equals(ref field, ref value) => {
                seed.insert(field.clone(), value.clone());
            },
            Self::And(ref children) => {
                for child in children {
                    child.collect_equalities(seed);
                }
            },
            _ => {},
        }
    }
}

impl Default for Filter {
    fn default() -> Self { Self::All }
}

/// Compares a document field against a value when both share a type bracket.
fn compare_field(doc: &Document, field: &str, value: &Bson) -> Option<Ordering> {
    let actual = doc.get(field)?;
    if std::mem::discriminant(actual) == std::mem::discriminant(value) || both_numeric(actual, value) {
        Some(compare_bson_values(actual, value))
    }
    else {
        None
    }
}

/// True when both values are numbers of any width.
fn both_numeric(a: &Bson, b: &Bson) -> bool {
    crate::comparison::as_f64(a).is_some() && crate::comparison::as_f64(b).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, age: i32) -> Document { doc! { "name": name, "age": age, "major": "Carpenter" } }

    #[test]
    fn test_equals_matches_and_renders() {
        let filter = Filter::equals("name", "Hans");
        assert!(filter.matches(&student("Hans", 37)));
        assert!(!filter.matches(&student("Sir Hans", 253)));
        assert_eq!(filter.to_document(), doc! { "name": "Hans" });
    }

    #[test]
    fn test_greater_than() {
        let filter = Filter::greater_than("age", 35);
        assert!(filter.matches(&student("Hans", 37)));
        assert!(!filter.matches(&student("Peter", 33)));
        assert!(!filter.matches(&student("Edge", 35)));
        assert_eq!(filter.to_document(), doc! { "age": { "$gt": 35 } });
    }

    #[test]
    fn test_comparisons_skip_other_types() {
        let doc = doc! { "name": "Hans", "age": "old" };
        assert!(!Filter::greater_than("age", 35).matches(&doc));
        assert!(!Filter::less_than("age", 35).matches(&doc));
        assert!(!Filter::greater_than("missing", 0).matches(&doc));
    }

    #[test]
    fn test_comparisons_across_number_widths() {
        let doc = doc! { "age": 850_i64 };
        assert!(Filter::greater_or_equal("age", 850).matches(&doc));
        assert!(Filter::less_or_equal("age", 850.0).matches(&doc));
        assert!(!Filter::less_than("age", 850).matches(&doc));
    }

    #[test]
    fn test_in_and_exists() {
        let filter = Filter::In("age".to_owned(), vec![Bson::Int32(25), Bson::Int32(253)]);
        assert!(filter.matches(&student("Soeren", 253)));
        assert!(!filter.matches(&student("Peter", 33)));

        assert!(Filter::Exists("major".to_owned(), true).matches(&student("Peter", 33)));
        assert!(Filter::Exists("email".to_owned(), false).matches(&student("Peter", 33)));
        assert_eq!(
            Filter::Exists("email".to_owned(), false).to_document(),
            doc! { "email": { "$exists": false } }
        );
    }

    #[test]
    fn test_logical_combinators() {
        let filter = Filter::equals("major", "Carpenter").and(Filter::greater_than("age", 100));
        assert!(filter.matches(&student("Soeren", 253)));
        assert!(!filter.matches(&student("Hans", 37)));
        assert_eq!(
            filter.to_document(),
            doc! { "$and": [ { "major": "Carpenter" }, { "age": { "$gt": 100 } } ] }
        );

        let filter = Filter::equals("name", "Hans").or(Filter::equals("name", "Peter"));
        assert!(filter.matches(&student("Peter", 33)));
        assert!(!filter.matches(&student("Soeren", 253)));
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(Filter::All.matches(&Document::new()));
        assert_eq!(Filter::default().to_document(), Document::new());
        assert_eq!(Filter::All.and(Filter::equals("name", "Hans")), Filter::equals("name", "Hans"));
    }

    #[test]
    fn test_equality_fields() {
        let filter = Filter::equals("name", "Hans").and(Filter::greater_than("age", 30));
        assert_eq!(filter.equality_fields(), doc! { "name": "Hans" });

        let filter = Filter::equals("name", "Hans").or(Filter::equals("name", "Peter"));
        assert!(filter.equality_fields().is_empty());
    }
}

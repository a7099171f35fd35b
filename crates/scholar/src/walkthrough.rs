//! The narrated CRUD and aggregation walkthrough over the `students`
//! collection.
//!
//! Every step is awaited before the next one starts and its result is logged.
//! The first failing step ends the walkthrough; releasing the store is the
//! session's job, not this module's.

use bson::{Bson, Document};
use tracing::info;

use crate::{
    document::{render, render_all, Student},
    error::Result,
    filter::Filter,
    pipeline::{Pipeline, SortOrder},
    projection::Projection,
    store::{DeleteOutcome, DocumentStore, UpdateOutcome},
    update::Update,
};

/// Name the walkthrough looks up, updates and deletes.
pub const FOCUS_NAME: &str = "Hans";

/// Age the focused student is updated to.
pub const UPDATED_AGE: i32 = 52;

/// Ages strictly above this are removed in the bulk delete.
pub const AGE_CUTOFF: i32 = 35;

/// The student inserted on its own.
pub fn first_student() -> Student { Student::new("John Doe", 25, "Computer Science") }

/// The students inserted in one batch.
pub fn roster() -> Vec<Student> {
    vec![
        Student::new("Peter", 33, "Data-Technician with speciality in programming"),
        Student::new("Hans", 37, "Carpenter"),
        Student::new("Sir Hans", 253, "Knight"),
        Student::new("Soeren", 253, "Carpenter"),
        Student::new("Sir Peter", 850, "Data-Technician with speciality in programming"),
    ]
}

/// Projection used when listing the collection: name and age, no key.
pub fn listing_projection() -> Projection { Projection::include(&["name", "age"]).without_id() }

/// Everything the walkthrough observed, step by step.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughReport {
    /// Documents removed by the initial reset
    pub cleared:        DeleteOutcome,
    /// Key of the single inserted student
    pub inserted_id:    Bson,
    /// Keys of the batch, in input order
    pub inserted_ids:   Vec<Bson>,
    /// First student named `FOCUS_NAME` before any change
    pub found:          Option<Document>,
    /// Name and age of every student
    pub listing:        Vec<Document>,
    /// Collection size after the inserts
    pub count:          u64,
    /// Result of the upserting update
    pub update:         UpdateOutcome,
    /// First student named `FOCUS_NAME` after the update
    pub found_updated:  Option<Document>,
    /// Student counts per age
    pub by_age:         Vec<Document>,
    /// Student counts per major
    pub by_major:       Vec<Document>,
    /// First two students, projected
    pub limited:        Vec<Document>,
    /// Four oldest students, projected
    pub oldest:         Vec<Document>,
    /// Result of deleting one `FOCUS_NAME`
    pub deleted_one:    DeleteOutcome,
    /// Result of deleting everyone above `AGE_CUTOFF`
    pub deleted_many:   DeleteOutcome,
    /// First student named `FOCUS_NAME` after the deletes
    pub found_after:    Option<Document>,
    /// Listing after the deletes
    pub listing_after:  Vec<Document>,
    /// Collection size after the deletes
    pub count_after:    u64,
}

/// Logs a lookup that may have come back empty.
fn log_found(label: &str, found: Option<&Document>) {
    match found {
        Some(doc) => info!("{}: {}", label, render(doc)),
        None => info!("{}: none", label),
    }
}

/// Runs the full walkthrough against `store`.
///
/// # Errors
///
/// Returns the first error any step reports; later steps are not attempted.
pub async fn run(store: &dyn DocumentStore) -> Result<WalkthroughReport> {
    // Fixture reset so reruns start from an empty collection.
    let cleared = store.clear().await?;
    info!("Cleared {} documents from previous runs", cleared.deleted);

    let inserted = store.insert_one(first_student().to_document()?).await?;
    info!("Inserted document: {}", inserted.id);

    let batch = roster()
        .iter()
        .map(Student::to_document)
        .collect::<Result<Vec<_>>>()?;
    let inserted_many = store.insert_many(batch).await?;
    info!(
        "Inserted {} documents: {}",
        inserted_many.ids.len(),
        render_ids(&inserted_many.ids)
    );

    let focus = Filter::equals("name", FOCUS_NAME);
    let found = store.find_one(&focus, None).await?;
    log_found("Found document", found.as_ref());

    let listing = store
        .find_many(&Filter::All, Some(&listing_projection()))
        .await?;
    info!("Listing names and ages: {}", render_all(&listing));

    let count = store.count(&Filter::All).await?;
    info!("Documents in collection: {}", count);

    let update = store
        .update_one(&focus, &Update::set("age", UPDATED_AGE), true)
        .await?;
    info!(
        "Update matched {}, modified {}, upserted {}",
        update.matched,
        update.modified,
        update
            .upserted_id
            .as_ref()
            .map_or_else(|| "nothing".to_owned(), ToString::to_string)
    );
    let found_updated = store.find_one(&focus, None).await?;
    log_found("Found document after update", found_updated.as_ref());

    let by_age = store.aggregate(&Pipeline::new().group_count("age")).await?;
    info!("Students per age: {}", render_all(&by_age));

    let by_major = store.aggregate(&Pipeline::new().group_count("major")).await?;
    info!("Students per major: {}", render_all(&by_major));

    let limited = store
        .aggregate(
            &Pipeline::new()
                .project(Projection::include(&["name", "major", "age"]).without_id())
                .limit(2),
        )
        .await?;
    info!("First two students: {}", render_all(&limited));

    let oldest = store
        .aggregate(
            &Pipeline::new()
                .sort("age", SortOrder::Descending)
                .project(Projection::include(&["name", "age"]))
                .limit(4),
        )
        .await?;
    info!("Oldest four students: {}", render_all(&oldest));

    let deleted_one = store.delete_one(&focus).await?;
    info!("Deleted {} document named {}", deleted_one.deleted, FOCUS_NAME);

    let deleted_many = store
        .delete_many(&Filter::greater_than("age", AGE_CUTOFF))
        .await?;
    info!(
        "Deleted {} documents with age above {}",
        deleted_many.deleted, AGE_CUTOFF
    );

    let found_after = store.find_one(&focus, None).await?;
    log_found("Found document after deletes", found_after.as_ref());

    let listing_after = store
        .find_many(&Filter::All, Some(&listing_projection()))
        .await?;
    info!("Listing after deletes: {}", render_all(&listing_after));

    let count_after = store.count(&Filter::All).await?;
    info!("Documents in collection: {}", count_after);

    Ok(WalkthroughReport {
        cleared,
        inserted_id: inserted.id,
        inserted_ids: inserted_many.ids,
        found,
        listing,
        count,
        update,
        found_updated,
        by_age,
        by_major,
        limited,
        oldest,
        deleted_one,
        deleted_many,
        found_after,
        listing_after,
        count_after,
    })
}

/// Joins keys for a single log line.
fn render_ids(ids: &[Bson]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_walkthrough_on_empty_store() {
        let store = MemoryStore::new();
        let report = run(&store).await.unwrap();

        assert_eq!(report.cleared.deleted, 0);
        assert_eq!(report.inserted_ids.len(), 5);
        assert_eq!(report.count, 6);
        assert_eq!(report.found.unwrap().get_i32("age").unwrap(), 37);
        assert_eq!(report.update.matched, 1);
        assert_eq!(report.update.modified, 1);
        assert!(report.update.upserted_id.is_none());
        assert_eq!(report.found_updated.unwrap().get_i32("age").unwrap(), 52);
    }

    #[tokio::test]
    async fn test_walkthrough_listing_has_no_keys() {
        let store = MemoryStore::new();
        let report = run(&store).await.unwrap();
        assert_eq!(report.listing.len(), 6);
        assert!(report.listing.iter().all(|d| !d.contains_key("_id")));
        assert_eq!(report.listing[0], doc! { "name": "John Doe", "age": 25 });
        assert!(report.listing_after.iter().all(|d| !d.contains_key("_id")));
    }

    #[tokio::test]
    async fn test_walkthrough_aggregations() {
        let store = MemoryStore::new();
        let report = run(&store).await.unwrap();

        // Hans is already 52 by the time the groups run.
        assert_eq!(
            report.by_age,
            vec![
                doc! { "_id": 25, "count": 1 },
                doc! { "_id": 33, "count": 1 },
                doc! { "_id": 52, "count": 1 },
                doc! { "_id": 253, "count": 2 },
                doc! { "_id": 850, "count": 1 },
            ]
        );
        let carpenters = report
            .by_major
            .iter()
            .find(|d| d.get_str("_id").ok() == Some("Carpenter"))
            .unwrap();
        assert_eq!(carpenters.get_i32("count").unwrap(), 2);
        assert_eq!(report.by_major.len(), 4);

        assert_eq!(report.limited.len(), 2);
        assert_eq!(
            report.limited[0],
            doc! { "name": "John Doe", "age": 25, "major": "Computer Science" }
        );

        let oldest: Vec<&str> = report
            .oldest
            .iter()
            .map(|d| d.get_str("name").unwrap())
            .collect();
        assert_eq!(oldest, vec!["Sir Peter", "Sir Hans", "Soeren", "Hans"]);
        assert!(report.oldest.iter().all(|d| d.contains_key("_id")));
    }

    #[tokio::test]
    async fn test_walkthrough_deletes() {
        let store = MemoryStore::new();
        let report = run(&store).await.unwrap();

        assert_eq!(report.deleted_one.deleted, 1);
        // Sir Hans, Soeren and Sir Peter are above the cutoff.
        assert_eq!(report.deleted_many.deleted, 3);
        assert!(report.found_after.is_none());
        assert_eq!(report.count_after, 2);
        assert_eq!(
            report.listing_after,
            vec![
                doc! { "name": "John Doe", "age": 25 },
                doc! { "name": "Peter", "age": 33 },
            ]
        );
    }

    #[tokio::test]
    async fn test_walkthrough_is_repeatable() {
        let store = MemoryStore::new();
        let first = run(&store).await.unwrap();
        let second = run(&store).await.unwrap();

        assert_eq!(second.cleared.deleted, first.count_after);
        assert_eq!(second.count, first.count);
        assert_eq!(second.by_age, first.by_age);
        assert_eq!(second.count_after, first.count_after);
    }
}

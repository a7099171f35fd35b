//! Aggregation pipelines: the group, project, sort and limit stages.

use bson::{doc, Bson, Document};
use tracing::trace;

use crate::{
    comparison::{compare_bson_values, values_equal},
    constants::{COUNT_FIELD, ID_FIELD},
    error::{Result, ScholarError},
    projection::Projection,
};

/// Sort order for a `$sort` stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order
    Ascending,
    /// Descending order
    Descending,
}

impl SortOrder {
    /// The direction value MongoDB expects in a sort specification.
    pub const fn direction(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// One step of an aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Partition documents by a field's value and count each partition.
    Group {
        /// Field whose value becomes the group key
        by:          String,
        /// Output field holding the member count
        count_field: String,
    },
    /// Restrict the fields of every document.
    Project(Projection),
    /// Order documents by a field.
    Sort {
        /// Field to sort by
        field: String,
        /// Direction
        order: SortOrder,
    },
    /// Keep only the first N documents.
    Limit(u64),
}

impl Stage {
    /// Renders the stage as a MongoDB pipeline stage document.
    pub fn to_document(&self) -> Document {
        match *self {
            Self::Group {
                ref by,
                ref count_field,
            } => {
                let mut group = doc! { ID_FIELD: format!("${}", by) };
                group.insert(count_field.clone(), doc! { "$sum": 1_i32 });
                doc! { "$group": group }
            },
            Self::Project(ref projection) => doc! { "$project": projection.to_document() },
            Self::Sort {
                ref field,
                order,
            } => doc! { "$sort": { field: order.direction() } },
            Self::Limit(n) => doc! { "$limit": i64::try_from(n).unwrap_or(i64::MAX) },
        }
    }

    /// Evaluates the stage over an in-memory stream of documents.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::InvalidPipeline` for stages the server would
    /// also reject: an empty group field, an empty projection, a zero limit.
    pub fn evaluate(&self, docs: Vec<Document>) -> Result<Vec<Document>> {
        match *self {
            Self::Group {
                ref by,
                ref count_field,
            } => {
                if by.is_empty() || count_field.is_empty() {
                    return Err(ScholarError::InvalidPipeline {
                        reason: "group stage needs a field and an output name".to_owned(),
                    });
                }
                Ok(group_count(&docs, by, count_field))
            },
            Self::Project(ref projection) => {
                if projection.fields.is_empty() && !projection.exclude_id {
                    return Err(ScholarError::InvalidPipeline {
                        reason: "projection must name at least one field".to_owned(),
                    });
                }
                Ok(docs.iter().map(|doc| projection.apply(doc)).collect())
            },
            Self::Sort {
                ref field,
                order,
            } => {
                let mut docs = docs;
                docs.sort_by(|a, b| {
                    let ord = compare_bson_values(
                        a.get(field).unwrap_or(&Bson::Null),
                        b.get(field).unwrap_or(&Bson::Null),
                    );
                    match order {
                        SortOrder::Ascending => ord,
                        SortOrder::Descending => ord.reverse(),
                    }
                });
                Ok(docs)
            },
            Self::Limit(n) => {
                if n == 0 {
                    return Err(ScholarError::InvalidPipeline {
                        reason: "limit must be positive".to_owned(),
                    });
                }
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                Ok(docs.into_iter().take(n).collect())
            },
        }
    }
}

/// Counts documents per distinct value of `by`, in first-seen order.
///
/// Documents missing the field are grouped under `null`.
fn group_count(docs: &[Document], by: &str, count_field: &str) -> Vec<Document> {
    let mut groups: Vec<(Bson, i32)> = Vec::new();
    for doc in docs {
        let key = doc.get(by).cloned().unwrap_or(Bson::Null);
        match groups.iter_mut().find(|entry| values_equal(&entry.0, &key)) {
            Some(entry) => entry.1 = entry.1.saturating_add(1),
            None => groups.push((key, 1)),
        }
    }
    groups
        .into_iter()
        .map(|(key, count)| {
            let mut out = doc! { ID_FIELD: key };
            out.insert(count_field, count);
            out
        })
        .collect()
}

/// An ordered list of aggregation stages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    /// Stages in execution order
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub const fn new() -> Self {
        Self {
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Appends `{ $group: { _id: "$field", count: { $sum: 1 } } }`.
    pub fn group_count(self, field: &str) -> Self {
        self.stage(Stage::Group {
            by:          field.to_owned(),
            count_field: COUNT_FIELD.to_owned(),
        })
    }

    /// Appends a `$project` stage.
    pub fn project(self, projection: Projection) -> Self { self.stage(Stage::Project(projection)) }

    /// Appends a `$sort` stage on one field.
    pub fn sort(self, field: &str, order: SortOrder) -> Self {
        self.stage(Stage::Sort {
            field: field.to_owned(),
            order,
        })
    }

    /// Appends a `$limit` stage.
    pub fn limit(self, n: u64) -> Self { self.stage(Stage::Limit(n)) }

    /// The stages in order.
    pub fn stages(&self) -> &[Stage] { &self.stages }

    /// Renders the pipeline as the list of stage documents the driver takes.
    pub fn to_documents(&self) -> Vec<Document> { self.stages.iter().map(Stage::to_document).collect() }

    /// Runs every stage in order over the given documents.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::InvalidPipeline` if any stage is invalid.
    pub fn evaluate(&self, docs: Vec<Document>) -> Result<Vec<Document>> {
        self.stages.iter().try_fold(docs, |docs, stage| {
            trace!("Evaluating stage {:?} over {} documents", stage, docs.len());
            stage.evaluate(docs)
        })
    }
}

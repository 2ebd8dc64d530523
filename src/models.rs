//! Data model for WIQL queries and their results.
//!
//! A query comes back in one of two shapes: a flat list of work item
//! references, or a tree of work item links. [`WorkItemsQueryResult`] holds
//! either one, and the two concrete types can be requested directly when the
//! caller already knows the shape.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A WIQL query to execute against the work item tracking service.
///
/// Only the query text is sent to the server. `is_hierarchical` decides which
/// result shape the client asks the transport to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItemsQuery {
    /// WIQL query text.
    pub query: String,
    /// Whether the query returns a tree of work item links.
    #[serde(skip)]
    pub is_hierarchical: bool,
}

impl WorkItemsQuery {
    /// Creates a query with an explicit result shape.
    pub fn get(query: impl Into<String>, is_hierarchical: bool) -> Self {
        Self {
            query: query.into(),
            is_hierarchical,
        }
    }

    /// Creates a query expecting a flat list of work items.
    pub fn flat(query: impl Into<String>) -> Self {
        Self::get(query, false)
    }

    /// Creates a query expecting a tree of work item links.
    pub fn hierarchical(query: impl Into<String>) -> Self {
        Self::get(query, true)
    }
}

/// The kind of WIQL query that produced a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryType {
    #[default]
    Flat,
    Tree,
    OneHop,
}

/// What the entries of a query result refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryResultType {
    #[default]
    WorkItem,
    WorkItemLink,
}

/// A field reference used in the result's column list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnReference {
    pub reference_name: String,
    pub name: String,
    pub url: Option<String>,
}

/// A sort column of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortColumn {
    pub field: ColumnReference,
    pub descending: bool,
}

/// A reference to a single work item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemReference {
    pub id: i32,
    pub url: Option<String>,
}

/// A link between two work items in a hierarchical result.
///
/// Root entries have no `source` and no `rel`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemLink {
    pub rel: Option<String>,
    pub source: Option<WorkItemReference>,
    pub target: Option<WorkItemReference>,
}

/// Flat (list shaped) query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlatWorkItemsQueryResult {
    pub query_type: QueryType,
    pub query_result_type: QueryResultType,
    /// Point in time the query was evaluated at.
    pub as_of: DateTime<Utc>,
    pub columns: Vec<ColumnReference>,
    pub sort_columns: Vec<SortColumn>,
    pub work_items: Vec<WorkItemReference>,
}

/// Hierarchical (tree shaped) query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HierarchicalWorkItemsQueryResult {
    pub query_type: QueryType,
    pub query_result_type: QueryResultType,
    pub as_of: DateTime<Utc>,
    pub columns: Vec<ColumnReference>,
    pub sort_columns: Vec<SortColumn>,
    pub work_item_relations: Vec<WorkItemLink>,
}

/// Result of a WIQL query in either shape.
///
/// Deserializing this type directly picks the variant from the response
/// itself: `queryResultType == "workItemLink"` or the presence of
/// `workItemRelations` selects [`WorkItemsQueryResult::Hierarchical`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkItemsQueryResult {
    Flat(FlatWorkItemsQueryResult),
    Hierarchical(HierarchicalWorkItemsQueryResult),
}

impl WorkItemsQueryResult {
    /// Returns true for the tree shaped variant.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Hierarchical(_))
    }

    /// Point in time the query was evaluated at.
    pub fn as_of(&self) -> DateTime<Utc> {
        match self {
            Self::Flat(result) => result.as_of,
            Self::Hierarchical(result) => result.as_of,
        }
    }

    /// Distinct work item ids in the order they first appear.
    ///
    /// For hierarchical results both link ends are considered.
    pub fn work_item_ids(&self) -> Vec<i32> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut push = |id: i32| {
            if seen.insert(id) {
                ids.push(id);
            }
        };
        match self {
            Self::Flat(result) => result.work_items.iter().for_each(|w| push(w.id)),
            Self::Hierarchical(result) => {
                for link in &result.work_item_relations {
                    if let Some(source) = &link.source {
                        push(source.id);
                    }
                    if let Some(target) = &link.target {
                        push(target.id);
                    }
                }
            }
        }
        ids
    }

    /// Returns the flat result, if this is one.
    pub fn into_flat(self) -> Option<FlatWorkItemsQueryResult> {
        match self {
            Self::Flat(result) => Some(result),
            Self::Hierarchical(_) => None,
        }
    }

    /// Returns the hierarchical result, if this is one.
    pub fn into_hierarchical(self) -> Option<HierarchicalWorkItemsQueryResult> {
        match self {
            Self::Flat(_) => None,
            Self::Hierarchical(result) => Some(result),
        }
    }
}

impl From<FlatWorkItemsQueryResult> for WorkItemsQueryResult {
    fn from(result: FlatWorkItemsQueryResult) -> Self {
        Self::Flat(result)
    }
}

impl From<HierarchicalWorkItemsQueryResult> for WorkItemsQueryResult {
    fn from(result: HierarchicalWorkItemsQueryResult) -> Self {
        Self::Hierarchical(result)
    }
}

impl<'de> Deserialize<'de> for WorkItemsQueryResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_link_result = value
            .get("queryResultType")
            .and_then(|v| v.as_str())
            .is_some_and(|t| t == "workItemLink");

        if is_link_result || value.get("workItemRelations").is_some() {
            serde_json::from_value(value)
                .map(Self::Hierarchical)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Flat)
                .map_err(D::Error::custom)
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::FlatWorkItemsQueryResult {}
    impl Sealed for super::HierarchicalWorkItemsQueryResult {}
    impl Sealed for super::WorkItemsQueryResult {}
}

/// A result type a stored query can be decoded into.
///
/// Implemented for [`FlatWorkItemsQueryResult`],
/// [`HierarchicalWorkItemsQueryResult`] and [`WorkItemsQueryResult`] (which
/// takes whatever shape the server returns).
pub trait QueryResultShape:
    sealed::Sealed + serde::de::DeserializeOwned + Send + 'static
{
    /// Short name of the shape, used in logs.
    const SHAPE: &'static str;
}

impl QueryResultShape for FlatWorkItemsQueryResult {
    const SHAPE: &'static str = "flat";
}

impl QueryResultShape for HierarchicalWorkItemsQueryResult {
    const SHAPE: &'static str = "hierarchical";
}

impl QueryResultShape for WorkItemsQueryResult {
    const SHAPE: &'static str = "auto";
}

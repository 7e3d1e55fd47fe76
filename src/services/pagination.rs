//! Pagination over a query handle
//!
//! `paginate` asks a [`DocumentQuery`] for the total count and for one window
//! of documents, then derives the navigation metadata. Query errors are
//! returned to the caller untouched.
//!
//! [`MemoryQuery`] is a query handle over in-memory JSON documents. The gateway
//! uses it to paginate list responses that the backend returned as bare arrays.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{PaginateOptions, PaginationResult};

/// Window requested from a query handle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: u64,
    pub sort: Option<String>,
    pub populate: Vec<String>,
    pub select: Vec<String>,
}

impl From<&PaginateOptions> for FindOptions {
    fn from(options: &PaginateOptions) -> Self {
        Self {
            skip: options.skip(),
            limit: options.limit,
            sort: options.sort.clone(),
            populate: options.populate.clone(),
            select: options.select.clone(),
        }
    }
}

/// A countable, windowed query over some document collection
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    type Doc: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Total number of documents matched by the query
    async fn count(&self) -> Result<u64, Self::Error>;

    /// Documents in the requested window
    async fn find(&self, options: &FindOptions) -> Result<Vec<Self::Doc>, Self::Error>;
}

/// Run `query` for the page described by `options`
pub async fn paginate<Q>(query: &Q, options: &PaginateOptions) -> Result<PaginationResult<Q::Doc>, Q::Error>
where
    Q: DocumentQuery + ?Sized,
{
    let find = FindOptions::from(options);
    let (total, docs) = tokio::try_join!(query.count(), query.find(&find))?;

    tracing::debug!(
        page = options.page,
        limit = options.limit,
        total,
        returned = docs.len(),
        "Paginated query"
    );

    Ok(PaginationResult::new(docs, total, options.page, options.limit))
}

/// Errors raised by [`MemoryQuery`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid sort key: {0:?}")]
    InvalidSort(String),

    #[error("Cannot mix inclusion and exclusion in select: {0}")]
    MixedProjection(String),
}

/// Query handle over in-memory JSON documents
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    docs: Vec<Value>,
    /// Collections used to resolve `populate`, keyed by field name
    lookups: HashMap<String, Vec<Value>>,
}

impl MemoryQuery {
    pub fn new(docs: Vec<Value>) -> Self {
        Self {
            docs,
            lookups: HashMap::new(),
        }
    }

    /// Register the collection that `populate` resolves `field` against
    pub fn with_lookup(mut self, field: impl Into<String>, collection: Vec<Value>) -> Self {
        self.lookups.insert(field.into(), collection);
        self
    }

    fn populate(&self, doc: &mut Value, fields: &[String]) {
        let Some(object) = doc.as_object_mut() else {
            return;
        };
        for field in fields {
            let Some(collection) = self.lookups.get(field) else {
                continue;
            };
            if let Some(value) = object.get_mut(field) {
                match value {
                    Value::Array(items) => {
                        for item in items.iter_mut() {
                            resolve_reference(item, collection);
                        }
                    }
                    other => resolve_reference(other, collection),
                }
            }
        }
    }
}

#[async_trait]
impl DocumentQuery for MemoryQuery {
    type Doc = Value;
    type Error = QueryError;

    async fn count(&self) -> Result<u64, QueryError> {
        Ok(self.docs.len() as u64)
    }

    async fn find(&self, options: &FindOptions) -> Result<Vec<Value>, QueryError> {
        let keys = parse_sort(options.sort.as_deref())?;
        let projection = Projection::parse(&options.select)?;

        let mut docs: Vec<&Value> = self.docs.iter().collect();
        if !keys.is_empty() {
            // Stable sort keeps backend order for ties
            docs.sort_by(|a, b| compare_docs(a, b, &keys));
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(options.limit).unwrap_or(usize::MAX);

        Ok(docs
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| {
                let mut doc = doc.clone();
                self.populate(&mut doc, &options.populate);
                projection.apply(doc)
            })
            .collect())
    }
}

fn resolve_reference(value: &mut Value, collection: &[Value]) {
    let Some(id) = value.as_str() else {
        return;
    };
    if let Some(found) = collection.iter().find(|doc| document_id(doc) == Some(id)) {
        *value = found.clone();
    }
}

fn document_id(doc: &Value) -> Option<&str> {
    doc.get("_id")
        .or_else(|| doc.get("id"))
        .and_then(Value::as_str)
}

/// One sort key: field name and direction
#[derive(Debug, Clone, PartialEq, Eq)]
struct SortKey {
    field: String,
    descending: bool,
}

fn parse_sort(sort: Option<&str>) -> Result<Vec<SortKey>, QueryError> {
    let Some(sort) = sort else {
        return Ok(Vec::new());
    };

    sort.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|token| {
            let (field, descending) = match token.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (token.strip_prefix('+').unwrap_or(token), false),
            };
            if field.is_empty() {
                return Err(QueryError::InvalidSort(token.to_string()));
            }
            Ok(SortKey {
                field: field.to_string(),
                descending,
            })
        })
        .collect()
}

fn compare_docs(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = a.get(&key.field).unwrap_or(&Value::Null);
        let right = b.get(&key.field).unwrap_or(&Value::Null);
        let ordering = compare_values(left, right);
        let ordering = if key.descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[derive(Debug)]
enum Projection {
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    fn parse(select: &[String]) -> Result<Self, QueryError> {
        if select.is_empty() {
            return Ok(Projection::All);
        }
        let excluded = select.iter().filter(|f| f.starts_with('-')).count();
        if excluded == 0 {
            Ok(Projection::Include(select.to_vec()))
        } else if excluded == select.len() {
            Ok(Projection::Exclude(
                select.iter().map(|f| f.trim_start_matches('-').to_string()).collect(),
            ))
        } else {
            Err(QueryError::MixedProjection(select.join(",")))
        }
    }

    fn apply(&self, doc: Value) -> Value {
        let Value::Object(object) = doc else {
            return doc;
        };
        match self {
            Projection::All => Value::Object(object),
            Projection::Include(fields) => {
                let kept: Map<String, Value> = object
                    .into_iter()
                    .filter(|(key, _)| key == "_id" || key == "id" || fields.iter().any(|f| f == key))
                    .collect();
                Value::Object(kept)
            }
            Projection::Exclude(fields) => {
                let kept: Map<String, Value> = object
                    .into_iter()
                    .filter(|(key, _)| !fields.iter().any(|f| f == key))
                    .collect();
                Value::Object(kept)
            }
        }
    }
}

//! Cypher builders for directory operations.
//!
//! Every builder returns a [`Cypher`]: fixed query text plus bound
//! parameters. Caller-supplied values only ever travel as parameters;
//! filter fields and operators are turned into text from closed enums.

pub mod departments;
pub mod employees;

use neo4rs::{Query, Row};
use orgdir_core::employee::model::Salary;
use orgdir_core::filter::{Comparison, Direction, FieldSet, FilterValue, ListQuery};
use orgdir_core::{DirectoryError, DirectoryResult};
use serde::de::DeserializeOwned;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Number(f64),
    TextList(Vec<String>),
}

impl From<FilterValue> for Param {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Text(s) => Param::Text(s),
            FilterValue::Number(n) => Param::Number(n),
        }
    }
}

/// Query text with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Cypher {
    pub text: String,
    pub params: Vec<(String, Param)>,
}

impl Cypher {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn text_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), Param::Text(value.into())));
        self
    }

    pub fn number_param(mut self, key: &str, value: f64) -> Self {
        self.params.push((key.to_string(), Param::Number(value)));
        self
    }

    pub fn list_param(mut self, key: &str, values: Vec<String>) -> Self {
        self.params.push((key.to_string(), Param::TextList(values)));
        self
    }

    /// Build the driver query.
    pub fn into_query(self) -> Query {
        let mut query = Query::new(self.text);
        for (key, value) in self.params {
            query = match value {
                Param::Text(s) => query.param(&key, s),
                Param::Number(n) => query.param(&key, n),
                Param::TextList(list) => query.param(&key, list),
            };
        }
        query
    }
}

/// `WHERE` and `ORDER BY` fragments compiled from a listing query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledListing {
    /// Empty, or `WHERE ...` with a leading space.
    pub where_clause: String,
    /// Always ` ORDER BY ...`; ends with the default key as a tiebreaker.
    pub order_clause: String,
    pub params: Vec<(String, Param)>,
}

/// Compile a parsed listing query over projected columns.
///
/// Columns must already be bound by a preceding `WITH` so that filters
/// and sorts reference aliases, never node properties.
pub fn compile_listing<F: FieldSet>(query: &ListQuery<F>, default_sort: F) -> CompiledListing {
    let mut conditions = Vec::with_capacity(query.filter.conditions.len());
    let mut params = Vec::with_capacity(query.filter.conditions.len());

    for (i, condition) in query.filter.conditions.iter().enumerate() {
        let key = format!("f{}", i);
        conditions.push(format!(
            "{} {} ${}",
            condition.field.column(),
            cypher_operator(condition.op),
            key
        ));
        params.push((key, Param::from(condition.value.clone())));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let mut order: Vec<String> = query
        .sort
        .keys
        .iter()
        .map(|key| {
            let direction = match key.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", key.field.column(), direction)
        })
        .collect();
    order.push(format!("{} ASC", default_sort.column()));

    CompiledListing {
        where_clause,
        order_clause: format!(" ORDER BY {}", order.join(", ")),
        params,
    }
}

fn cypher_operator(op: Comparison) -> &'static str {
    match op {
        Comparison::Eq => "=",
        Comparison::Ne => "<>",
        Comparison::Lt => "<",
        Comparison::Le => "<=",
        Comparison::Gt => ">",
        Comparison::Ge => ">=",
        Comparison::Contains => "CONTAINS",
    }
}

/// Read a typed field from a result row.
pub(crate) fn field<T: DeserializeOwned>(row: &Row, key: &str) -> DirectoryResult<T> {
    row.get::<T>(key)
        .map_err(|e| DirectoryError::store(format!("Failed to read field '{}': {:?}", key, e)))
}

/// Read an optional salary column.
pub(crate) fn salary_field(row: &Row, key: &str) -> DirectoryResult<Option<Salary>> {
    Ok(field::<Option<f64>>(row, key)?.and_then(Salary::new))
}

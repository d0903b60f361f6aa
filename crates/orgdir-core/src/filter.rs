//! Allow-list filter and sort expressions.
//!
//! Listing endpoints accept `filter` and `sort` query parameters. Both are
//! parsed into typed terms over a closed field enum; a store compiles the
//! terms into its own query language and binds every value as a parameter.
//!
//! ```text
//! filter := clause ("," clause)*        clauses are ANDed
//! clause := field op value              op: = != < <= > >= ~
//! sort   := key ("," key)*
//! key    := field [":" ("asc" | "desc")] | "-" field
//! ```

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{DirectoryError, DirectoryResult};

const MAX_VALUE_LEN: usize = 200;

/// Characters never accepted inside a filter value.
const FORBIDDEN_VALUE_CHARS: &[char] = &[';', '"', '`', '\\', '{', '}', '=', '<', '>', '~'];

/// Value type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// A closed set of fields that a listing can be filtered and sorted by.
pub trait FieldSet: Copy + Eq + Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Token accepted in `filter` and `sort` parameters.
    fn name(self) -> &'static str;

    /// Column name of the field in the listing's result rows.
    fn column(self) -> &'static str;

    fn kind(self) -> FieldKind;

    fn parse(token: &str) -> DirectoryResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(token))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                DirectoryError::validation(format!(
                    "Unknown field '{}'. Allowed fields: {}",
                    token,
                    allowed.join(", ")
                ))
            })
    }
}

/// Fields of an employee listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeField {
    Employee,
    Position,
    Salary,
    Department,
}

impl FieldSet for EmployeeField {
    const ALL: &'static [Self] = &[
        Self::Employee,
        Self::Position,
        Self::Salary,
        Self::Department,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Position => "position",
            Self::Salary => "salary",
            Self::Department => "department",
        }
    }

    fn column(self) -> &'static str {
        self.name()
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Salary => FieldKind::Number,
            _ => FieldKind::Text,
        }
    }
}

/// Fields of a department listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentField {
    Department,
    EmployeeCount,
}

impl FieldSet for DepartmentField {
    const ALL: &'static [Self] = &[Self::Department, Self::EmployeeCount];

    fn name(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::EmployeeCount => "employee_count",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Department => "department_name",
            Self::EmployeeCount => "employee_count",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Department => FieldKind::Text,
            Self::EmployeeCount => FieldKind::Number,
        }
    }
}

/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
}

impl Comparison {
    /// Longest operator first so `<=` is not read as `<`.
    const TOKENS: &'static [(&'static str, Comparison)] = &[
        ("!=", Comparison::Ne),
        ("<=", Comparison::Le),
        (">=", Comparison::Ge),
        ("=", Comparison::Eq),
        ("<", Comparison::Lt),
        (">", Comparison::Gt),
        ("~", Comparison::Contains),
    ];

    /// Parse the operator at the start of `s`, returning it and its length.
    fn parse_prefix(s: &str) -> Option<(Self, usize)> {
        Self::TOKENS
            .iter()
            .find(|(token, _)| s.starts_with(token))
            .map(|(token, op)| (*op, token.len()))
    }
}

/// A bound filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
}

/// One `field op value` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition<F> {
    pub field: F,
    pub op: Comparison,
    pub value: FilterValue,
}

/// Conjunction of conditions. Empty means "no filter".
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    pub conditions: Vec<Condition<F>>,
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: Direction,
}

/// Ordered sort keys. Empty means "store default order".
#[derive(Debug, Clone, PartialEq)]
pub struct Sort<F> {
    pub keys: Vec<SortKey<F>>,
}

impl<F> Default for Sort<F> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

/// Parsed `filter` and `sort` parameters of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    pub filter: Filter<F>,
    pub sort: Sort<F>,
}

impl<F> Default for ListQuery<F> {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            sort: Sort::default(),
        }
    }
}

impl<F: FieldSet> ListQuery<F> {
    pub fn parse(filter: Option<&str>, sort: Option<&str>) -> DirectoryResult<Self> {
        Ok(Self {
            filter: Filter::parse(filter)?,
            sort: Sort::parse(sort)?,
        })
    }
}

impl<F: FieldSet> Filter<F> {
    pub fn parse(input: Option<&str>) -> DirectoryResult<Self> {
        let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        let conditions = input
            .split(',')
            .map(parse_condition)
            .collect::<DirectoryResult<Vec<_>>>()?;
        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches<R: Record<F>>(&self, record: &R) -> bool {
        self.conditions
            .iter()
            .all(|c| c.matches(record.field(c.field)))
    }
}

fn parse_condition<F: FieldSet>(clause: &str) -> DirectoryResult<Condition<F>> {
    let clause = clause.trim();
    if clause.is_empty() {
        return Err(DirectoryError::validation("Empty filter clause"));
    }

    let op_start = clause
        .find(|c: char| matches!(c, '=' | '!' | '<' | '>' | '~'))
        .ok_or_else(|| {
            DirectoryError::validation(format!(
                "Filter clause '{}' has no comparison operator",
                clause
            ))
        })?;

    let field = F::parse(clause[..op_start].trim())?;
    let rest = &clause[op_start..];
    let (op, op_len) = Comparison::parse_prefix(rest).ok_or_else(|| {
        DirectoryError::validation(format!("Invalid operator in filter clause '{}'", clause))
    })?;
    let raw = rest[op_len..].trim();

    if raw.is_empty() {
        return Err(DirectoryError::validation(format!(
            "Filter on '{}' is missing a value",
            field.name()
        )));
    }
    if raw.chars().count() > MAX_VALUE_LEN {
        return Err(DirectoryError::validation(format!(
            "Filter value for '{}' exceeds {} characters",
            field.name(),
            MAX_VALUE_LEN
        )));
    }
    if raw
        .chars()
        .any(|c| c.is_control() || FORBIDDEN_VALUE_CHARS.contains(&c))
    {
        return Err(DirectoryError::validation(format!(
            "Filter value for '{}' contains disallowed characters",
            field.name()
        )));
    }

    let value = match field.kind() {
        FieldKind::Text => FilterValue::Text(raw.to_string()),
        FieldKind::Number => {
            if op == Comparison::Contains {
                return Err(DirectoryError::validation(format!(
                    "Operator '~' is not supported on numeric field '{}'",
                    field.name()
                )));
            }
            let number = raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    DirectoryError::validation(format!(
                        "Filter value for '{}' must be a number",
                        field.name()
                    ))
                })?;
            FilterValue::Number(number)
        }
    };

    Ok(Condition { field, op, value })
}

impl<F: FieldSet> Sort<F> {
    pub fn parse(input: Option<&str>) -> DirectoryResult<Self> {
        let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        let keys = input
            .split(',')
            .map(parse_sort_key)
            .collect::<DirectoryResult<Vec<_>>>()?;
        Ok(Self { keys })
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compare two records by the sort keys, in order.
    pub fn compare<R: Record<F>>(&self, a: &R, b: &R) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(a.field(key.field), b.field(key.field));
            let ordering = match key.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn parse_sort_key<F: FieldSet>(key: &str) -> DirectoryResult<SortKey<F>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(DirectoryError::validation("Empty sort key"));
    }

    if let Some(field) = key.strip_prefix('-') {
        return Ok(SortKey {
            field: F::parse(field.trim())?,
            direction: Direction::Desc,
        });
    }

    let (field, direction) = match key.split_once(':') {
        Some((field, dir)) => {
            let direction = match dir.trim().to_ascii_lowercase().as_str() {
                "asc" => Direction::Asc,
                "desc" => Direction::Desc,
                _ => {
                    return Err(DirectoryError::validation(format!(
                        "Invalid sort direction in '{}'. Use asc or desc",
                        key
                    )))
                }
            };
            (field.trim(), direction)
        }
        None => (key, Direction::Asc),
    };

    Ok(SortKey {
        field: F::parse(field)?,
        direction,
    })
}

/// A field value read from a record for in-process evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

/// A listing row whose fields can be read by `F`.
pub trait Record<F> {
    fn field(&self, field: F) -> FieldValue<'_>;
}

impl<F> Condition<F> {
    /// Evaluate against a field value. Missing numbers never match.
    pub fn matches(&self, actual: FieldValue<'_>) -> bool {
        match (actual, &self.value) {
            (FieldValue::Text(actual), FilterValue::Text(expected)) => match self.op {
                Comparison::Contains => actual.contains(expected.as_str()),
                op => holds(op, actual.cmp(expected.as_str())),
            },
            (FieldValue::Number(Some(actual)), FilterValue::Number(expected)) => actual
                .partial_cmp(expected)
                .is_some_and(|ordering| holds(self.op, ordering)),
            _ => false,
        }
    }
}

fn holds(op: Comparison, ordering: Ordering) -> bool {
    match op {
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Ne => ordering != Ordering::Equal,
        Comparison::Lt => ordering == Ordering::Less,
        Comparison::Le => ordering != Ordering::Greater,
        Comparison::Gt => ordering == Ordering::Greater,
        Comparison::Ge => ordering != Ordering::Less,
        Comparison::Contains => false,
    }
}

/// Nulls sort after every number in ascending order.
fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
        (FieldValue::Number(Some(a)), FieldValue::Number(Some(b))) => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Number(None), FieldValue::Number(Some(_))) => Ordering::Greater,
        (FieldValue::Number(Some(_)), FieldValue::Number(None)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

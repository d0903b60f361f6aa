//! Employee domain models.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::{EmployeeField, FieldValue, Record};

/// Position value that marks an employee as a department manager.
pub const MANAGER_POSITION: &str = "manager";

/// Largest integer an f64 represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Normalize an employee name for identifier matching.
///
/// Update, delete and the duplicate check compare names with every space
/// removed, so `"Ann Lee"` and `"AnnLee"` address the same employee.
pub fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| *c != ' ').collect()
}

/// A salary amount.
///
/// Always finite. Integral amounts serialize as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Salary(f64);

impl Salary {
    pub fn new(amount: f64) -> Option<Self> {
        amount.is_finite().then_some(Self(amount))
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    /// Parse a salary from a JSON value. Only numbers are accepted.
    pub fn from_json(value: &Value) -> DirectoryResult<Self> {
        value
            .as_f64()
            .and_then(Self::new)
            .ok_or_else(|| DirectoryError::validation("Field 'salary' must be a number"))
    }
}

impl Serialize for Salary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Salary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Salary::new(amount).ok_or_else(|| serde::de::Error::custom("salary must be finite"))
    }
}

/// How a newly created employee attaches to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Employee works in the given department.
    WorksIn,
    /// Employee works in the given department and manages the listed employees.
    Manages,
}

impl Relation {
    pub fn parse(s: &str) -> DirectoryResult<Self> {
        match s.trim() {
            "WORKS_IN" => Ok(Self::WorksIn),
            "MANAGES" => Ok(Self::Manages),
            other => Err(DirectoryError::validation(format!(
                "Invalid relation '{}'. Valid relations: WORKS_IN, MANAGES",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorksIn => "WORKS_IN",
            Self::Manages => "MANAGES",
        }
    }
}

/// Body of a create-employee request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub salary: Option<Value>,
    pub relation: Option<String>,
    pub employees: Option<Vec<String>>,
}

impl CreateEmployeeRequest {
    /// Check required fields and the relation kind.
    pub fn validate(self) -> DirectoryResult<NewEmployee> {
        let name = required_text("name", self.name)?;
        let position = required_text("position", self.position)?;
        let department = required_text("department", self.department)?;
        let salary = match self.salary {
            Some(Value::Null) | None => {
                return Err(DirectoryError::validation("Missing required field 'salary'"))
            }
            Some(value) => Salary::from_json(&value)?,
        };
        let relation = Relation::parse(&required_text("relation", self.relation)?)?;

        let mut subordinates: Vec<String> = Vec::new();
        if relation == Relation::Manages {
            let listed = self.employees.unwrap_or_default();
            for entry in listed {
                let entry = entry.trim().to_string();
                if entry.is_empty() {
                    return Err(DirectoryError::validation(
                        "Field 'employees' must not contain blank names",
                    ));
                }
                if entry == name {
                    return Err(DirectoryError::validation(format!(
                        "Employee '{}' cannot manage themselves",
                        name
                    )));
                }
                if !subordinates.contains(&entry) {
                    subordinates.push(entry);
                }
            }
            if subordinates.is_empty() {
                return Err(DirectoryError::validation(
                    "Relation MANAGES requires a non-empty 'employees' list",
                ));
            }
        }

        Ok(NewEmployee {
            name,
            position,
            department,
            salary,
            relation,
            subordinates,
        })
    }
}

fn required_text(field: &str, value: Option<String>) -> DirectoryResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DirectoryError::validation(format!(
            "Missing required field '{}'",
            field
        ))),
    }
}

/// A validated employee ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub position: String,
    pub department: String,
    pub salary: Salary,
    pub relation: Relation,
    /// Names of managed employees. Empty unless `relation` is `Manages`.
    pub subordinates: Vec<String>,
}

/// Allow-listed attribute changes for an existing employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub salary: Option<Salary>,
    /// Moves the WORKS_IN edge to this department.
    pub department: Option<String>,
}

impl EmployeeUpdate {
    pub const ALLOWED_ATTRIBUTES: &'static [&'static str] =
        &["name", "position", "salary", "department"];

    /// Build an update from a caller-supplied attribute map.
    ///
    /// Keys outside [`Self::ALLOWED_ATTRIBUTES`] are rejected rather than
    /// ignored, so a typo never turns into a silent no-op.
    pub fn from_attributes(attributes: &Map<String, Value>) -> DirectoryResult<Self> {
        if attributes.is_empty() {
            return Err(DirectoryError::validation("No attributes to update"));
        }

        let mut update = Self::default();
        for (key, value) in attributes {
            match key.as_str() {
                "name" => update.name = Some(text_attribute(key, value)?),
                "position" => update.position = Some(text_attribute(key, value)?),
                "department" => update.department = Some(text_attribute(key, value)?),
                "salary" => update.salary = Some(Salary::from_json(value)?),
                other => {
                    return Err(DirectoryError::validation(format!(
                        "Attribute '{}' cannot be updated. Allowed attributes: {}",
                        other,
                        Self::ALLOWED_ATTRIBUTES.join(", ")
                    )))
                }
            }
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.position.is_none()
            && self.salary.is_none()
            && self.department.is_none()
    }
}

fn text_attribute(key: &str, value: &Value) -> DirectoryResult<String> {
    match value.as_str().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DirectoryError::validation(format!(
            "Attribute '{}' must be a non-empty string",
            key
        ))),
    }
}

/// An employee joined with their department, as listed by `GET /employees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee: String,
    pub position: String,
    pub salary: Option<Salary>,
    pub department: String,
}

impl Record<EmployeeField> for EmployeeRecord {
    fn field(&self, field: EmployeeField) -> FieldValue<'_> {
        match field {
            EmployeeField::Employee => FieldValue::Text(&self.employee),
            EmployeeField::Position => FieldValue::Text(&self.position),
            EmployeeField::Salary => FieldValue::Number(self.salary.map(Salary::amount)),
            EmployeeField::Department => FieldValue::Text(&self.department),
        }
    }
}

/// An employee without department, as returned by roster queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub name: String,
    pub position: String,
    pub salary: Option<Salary>,
}

/// What a delete removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub employee: String,
    /// Set when the employee was the last occupant of a department they managed.
    pub removed_department: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> CreateEmployeeRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_name_strips_spaces() {
        assert_eq!(normalize_name(" Ann  Lee "), "AnnLee");
        assert_eq!(normalize_name("AnnLee"), "AnnLee");
    }

    #[test]
    fn test_salary_serializes_integral_amounts_as_integers() {
        let whole = Salary::new(9000.0).unwrap();
        let part = Salary::new(9000.5).unwrap();
        assert_eq!(serde_json::to_string(&whole).unwrap(), "9000");
        assert_eq!(serde_json::to_string(&part).unwrap(), "9000.5");
        assert!(Salary::new(f64::NAN).is_none());
    }

    #[test]
    fn test_salary_rejects_strings() {
        let err = Salary::from_json(&json!("9000")).unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
    }

    #[test]
    fn test_validate_works_in() {
        let new = request(json!({
            "name": "Ann Lee", "position": "manager", "department": "R&D",
            "salary": 9000, "relation": "WORKS_IN"
        }))
        .validate()
        .unwrap();
        assert_eq!(new.name, "Ann Lee");
        assert_eq!(new.relation, Relation::WorksIn);
        assert!(new.subordinates.is_empty());
    }

    #[test]
    fn test_validate_missing_field() {
        let err = request(json!({
            "name": "Ann Lee", "position": "manager", "salary": 9000, "relation": "WORKS_IN"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field 'department'");
    }

    #[test]
    fn test_validate_blank_field_counts_as_missing() {
        let err = request(json!({
            "name": "  ", "position": "dev", "department": "R&D", "salary": 1, "relation": "WORKS_IN"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
    }

    #[test]
    fn test_validate_unknown_relation() {
        let err = request(json!({
            "name": "Ann", "position": "dev", "department": "R&D", "salary": 1, "relation": "LIKES"
        }))
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("Invalid relation 'LIKES'"));
    }

    #[test]
    fn test_validate_manages_requires_employees() {
        let err = request(json!({
            "name": "Ann", "position": "manager", "department": "R&D", "salary": 1,
            "relation": "MANAGES", "employees": []
        }))
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("non-empty 'employees'"));
    }

    #[test]
    fn test_validate_manages_dedups_and_rejects_self() {
        let new = request(json!({
            "name": "Ann", "position": "manager", "department": "R&D", "salary": 1,
            "relation": "MANAGES", "employees": ["Bob", " Bob ", "Cy"]
        }))
        .validate()
        .unwrap();
        assert_eq!(new.subordinates, vec!["Bob".to_string(), "Cy".to_string()]);

        let err = request(json!({
            "name": "Ann", "position": "manager", "department": "R&D", "salary": 1,
            "relation": "MANAGES", "employees": ["Ann"]
        }))
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("cannot manage themselves"));
    }

    #[test]
    fn test_update_from_attributes() {
        let attrs = json!({"salary": 1200, "position": "lead"});
        let update = EmployeeUpdate::from_attributes(attrs.as_object().unwrap()).unwrap();
        assert_eq!(update.salary, Salary::new(1200.0));
        assert_eq!(update.position.as_deref(), Some("lead"));
        assert!(update.name.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_rejects_unknown_attribute() {
        let attrs = json!({"salary = 0, e.admin": true});
        let err = EmployeeUpdate::from_attributes(attrs.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("cannot be updated"));
    }

    #[test]
    fn test_update_rejects_empty_and_mistyped() {
        let empty = Map::new();
        assert!(EmployeeUpdate::from_attributes(&empty).is_err());

        let attrs = json!({"position": 3});
        assert!(EmployeeUpdate::from_attributes(attrs.as_object().unwrap()).is_err());
    }
}

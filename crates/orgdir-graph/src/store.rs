//! Transactional `DirectoryStore` backed by Neo4j.
//!
//! Reads run as single auto-commit statements. Every write operation runs
//! its checks and mutations in one explicit transaction, committed only
//! when all steps succeed. Transactions that fail with a transient server
//! error (deadlock, leader switch) are retried a bounded number of times.

use std::time::Duration;

use async_trait::async_trait;
use neo4rs::{Neo4jError, Neo4jErrorKind, Row, Txn};
use orgdir_core::department::model::{DepartmentInfo, DepartmentSummary};
use orgdir_core::employee::model::{
    DeleteOutcome, EmployeeRecord, EmployeeSummary, EmployeeUpdate, NewEmployee, Relation,
    MANAGER_POSITION,
};
use orgdir_core::filter::{DepartmentField, EmployeeField, ListQuery};
use orgdir_core::{DirectoryError, DirectoryResult, DirectoryStore};
use tracing::{debug, error, warn};

use crate::queries::{departments, employees, field, Cypher};
use crate::GraphClient;

const MAX_WRITE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Failure inside a write transaction.
#[derive(Debug, thiserror::Error)]
enum TxnError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Neo4j(#[from] neo4rs::Error),
}

impl TxnError {
    fn into_directory(self, operation: &'static str) -> DirectoryError {
        match self {
            Self::Directory(err) => err,
            Self::Neo4j(err) if is_constraint_violation(&err) => {
                warn!(operation, error = %err, "Uniqueness constraint rejected write");
                DirectoryError::conflict("An employee with this name already exists")
            }
            Self::Neo4j(err) => {
                error!(operation, error = %err, "Graph store write failed");
                DirectoryError::store(err.to_string())
            }
        }
    }
}

const CONSTRAINT_VIOLATION_CODE: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

fn server_error(err: &neo4rs::Error) -> Option<&Neo4jError> {
    match err {
        neo4rs::Error::Neo4j(err) => Some(err),
        _ => None,
    }
}

/// Neo4j reports retryable failures under the `Neo.TransientError` classification.
fn is_transient(err: &neo4rs::Error) -> bool {
    server_error(err).is_some_and(|err| err.kind() == Neo4jErrorKind::Transient)
}

fn is_constraint_violation(err: &neo4rs::Error) -> bool {
    server_error(err).is_some_and(|err| err.code() == CONSTRAINT_VIOLATION_CODE)
}

enum Attempt<T> {
    Done(DirectoryResult<T>),
    Retry,
}

/// Directory store over a Neo4j database.
#[derive(Clone)]
pub struct GraphStore {
    client: GraphClient,
}

impl GraphStore {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    async fn read(&self, cypher: Cypher, operation: &'static str) -> DirectoryResult<Vec<Row>> {
        debug!(operation, query = %cypher.text, "Running read query");
        self.client.query(cypher.into_query()).await.map_err(|err| {
            error!(operation, error = %format!("{:#}", err), "Graph store read failed");
            DirectoryError::store(format!("{:#}", err))
        })
    }

    async fn begin(&self, operation: &'static str) -> DirectoryResult<Txn> {
        self.client
            .start_txn()
            .await
            .map_err(|err| TxnError::from(err).into_directory(operation))
    }

    /// Commit or roll back one attempt and decide whether to retry.
    async fn finish<T>(
        &self,
        txn: Txn,
        result: Result<T, TxnError>,
        operation: &'static str,
        attempt: u32,
    ) -> Attempt<T> {
        let outcome = match result {
            Ok(value) => txn.commit().await.map(|_| value).map_err(TxnError::from),
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(operation, error = %rollback, "Transaction rollback failed");
                }
                Err(err)
            }
        };

        match outcome {
            Ok(value) => Attempt::Done(Ok(value)),
            Err(TxnError::Neo4j(err)) if is_transient(&err) && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(operation, attempt, error = %err, "Transient graph store error, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                Attempt::Retry
            }
            Err(err) => Attempt::Done(Err(err.into_directory(operation))),
        }
    }
}

async fn fetch_all(txn: &mut Txn, cypher: Cypher) -> Result<Vec<Row>, TxnError> {
    let mut stream = txn.execute(cypher.into_query()).await?;
    let mut rows = Vec::new();
    while let Some(row) = stream.next(txn.handle()).await? {
        rows.push(row);
    }
    Ok(rows)
}

async fn fetch_one(txn: &mut Txn, cypher: Cypher) -> Result<Option<Row>, TxnError> {
    Ok(fetch_all(txn, cypher).await?.into_iter().next())
}

async fn create_employee_txn(txn: &mut Txn, employee: &NewEmployee) -> Result<(), TxnError> {
    if fetch_one(txn, employees::find_by_normalized_name(&employee.name))
        .await?
        .is_some()
    {
        return Err(DirectoryError::employee_exists(&employee.name).into());
    }

    if employee.relation == Relation::Manages {
        if let Some(row) = fetch_one(txn, employees::first_missing(&employee.subordinates)).await? {
            let missing: String = field(&row, "name")?;
            return Err(DirectoryError::employee_not_found(&missing).into());
        }
    }

    txn.run(employees::create(employee).into_query()).await?;

    if employee.relation == Relation::Manages {
        let row = fetch_one(
            txn,
            employees::link_subordinates(&employee.name, &employee.subordinates),
        )
        .await?;
        let linked: i64 = match row {
            Some(row) => field(&row, "linked")?,
            None => 0,
        };
        if linked as usize != employee.subordinates.len() {
            return Err(DirectoryError::not_found(format!(
                "Only {} of {} subordinates of '{}' exist",
                linked,
                employee.subordinates.len(),
                employee.name
            ))
            .into());
        }
    }
    Ok(())
}

async fn update_employee_txn(
    txn: &mut Txn,
    name: &str,
    update: &EmployeeUpdate,
) -> Result<EmployeeRecord, TxnError> {
    let current: String = match fetch_one(txn, employees::find_by_normalized_name(name)).await? {
        Some(row) => field(&row, "name")?,
        None => return Err(DirectoryError::employee_not_found(name).into()),
    };

    if let Some(new_name) = &update.name {
        if fetch_one(txn, employees::find_other_by_normalized_name(new_name, &current))
            .await?
            .is_some()
        {
            return Err(DirectoryError::employee_exists(new_name).into());
        }
    }

    if let Some(department) = &update.department {
        txn.run(employees::move_to_department(&current, department).into_query())
            .await?;
    }
    if let Some(cypher) = employees::set_attributes(&current, update) {
        txn.run(cypher.into_query()).await?;
    }

    let target = update.name.as_deref().unwrap_or(&current);
    match fetch_one(txn, employees::get(target)).await? {
        Some(row) => Ok(employees::parse_record(&row)?),
        None => Err(DirectoryError::employee_not_found(name).into()),
    }
}

async fn delete_employee_txn(txn: &mut Txn, name: &str) -> Result<DeleteOutcome, TxnError> {
    let row = fetch_one(txn, employees::find_by_normalized_name(name))
        .await?
        .ok_or_else(|| DirectoryError::employee_not_found(name))?;
    let current: String = field(&row, "name")?;
    let position: Option<String> = field(&row, "position")?;
    let department: Option<String> = field(&row, "department")?;

    txn.run(employees::delete(&current).into_query()).await?;

    let mut removed_department = None;
    if let (Some(MANAGER_POSITION), Some(department)) = (position.as_deref(), department) {
        let removed: i64 = match fetch_one(txn, departments::delete_if_empty(&department)).await? {
            Some(row) => field(&row, "removed")?,
            None => 0,
        };
        if removed > 0 {
            removed_department = Some(department);
        }
    }

    Ok(DeleteOutcome {
        employee: current,
        removed_department,
    })
}

#[async_trait]
impl DirectoryStore for GraphStore {
    async fn ping(&self) -> DirectoryResult<()> {
        self.client.ping().await.map_err(|err| {
            error!(error = %format!("{:#}", err), "Graph store ping failed");
            DirectoryError::store(format!("{:#}", err))
        })
    }

    async fn list_employees(
        &self,
        query: &ListQuery<EmployeeField>,
    ) -> DirectoryResult<Vec<EmployeeRecord>> {
        let rows = self.read(employees::list(query), "list_employees").await?;
        rows.iter().map(employees::parse_record).collect()
    }

    async fn create_employee(&self, employee: &NewEmployee) -> DirectoryResult<()> {
        let mut attempt = 1;
        loop {
            let mut txn = self.begin("create_employee").await?;
            let result = create_employee_txn(&mut txn, employee).await;
            match self.finish(txn, result, "create_employee", attempt).await {
                Attempt::Done(result) => return result,
                Attempt::Retry => attempt += 1,
            }
        }
    }

    async fn update_employee(
        &self,
        name: &str,
        update: &EmployeeUpdate,
    ) -> DirectoryResult<EmployeeRecord> {
        let mut attempt = 1;
        loop {
            let mut txn = self.begin("update_employee").await?;
            let result = update_employee_txn(&mut txn, name, update).await;
            match self.finish(txn, result, "update_employee", attempt).await {
                Attempt::Done(result) => return result,
                Attempt::Retry => attempt += 1,
            }
        }
    }

    async fn delete_employee(&self, name: &str) -> DirectoryResult<DeleteOutcome> {
        let mut attempt = 1;
        loop {
            let mut txn = self.begin("delete_employee").await?;
            let result = delete_employee_txn(&mut txn, name).await;
            match self.finish(txn, result, "delete_employee", attempt).await {
                Attempt::Done(result) => return result,
                Attempt::Retry => attempt += 1,
            }
        }
    }

    async fn list_subordinates(&self, manager: &str) -> DirectoryResult<Vec<EmployeeSummary>> {
        let rows = self
            .read(employees::subordinates(manager), "list_subordinates")
            .await?;
        rows.iter().map(employees::parse_summary).collect()
    }

    async fn department_info(&self, department: &str) -> DirectoryResult<Option<DepartmentInfo>> {
        let rows = self
            .read(departments::info(department), "department_info")
            .await?;
        rows.first().map(departments::parse_info).transpose()
    }

    async fn list_departments(
        &self,
        query: &ListQuery<DepartmentField>,
    ) -> DirectoryResult<Vec<DepartmentSummary>> {
        let rows = self.read(departments::list(query), "list_departments").await?;
        rows.iter().map(departments::parse_summary).collect()
    }

    async fn list_department_employees(
        &self,
        department: &str,
    ) -> DirectoryResult<Vec<EmployeeSummary>> {
        let rows = self
            .read(departments::employees(department), "list_department_employees")
            .await?;
        rows.iter().map(employees::parse_summary).collect()
    }
}

//! Scripted in-memory connection for tests.
//!
//! `MockConnection` records every executed statement with its bound parameters and
//! answers queries from a queue of canned row sets. It never parses SQL beyond looking
//! at the leading keyword and a trailing `RETURNING` clause.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::{Connection, ConnectionProvider, Statement};
use crate::driver::{Dialect, QueryDriver};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;

/// A statement executed against a [`MockConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    executed: Vec<ExecutedStatement>,
    responses: VecDeque<Vec<Row>>,
    last_id: i64,
    last_insert_id: Option<Value>,
    fail_next: Option<String>,
    fail_matching: Vec<(String, String)>,
}

/// A connection that logs statements and replays queued results.
///
/// - `SELECT` statements, and statements with a `RETURNING` clause, consume the next
///   queued row set (an empty result when the queue is empty).
/// - `INSERT` statements advance an id counter that backs `last_insert_id`. An INSERT
///   with `RETURNING <col>` and no queued row set returns `{col: id}`.
#[derive(Debug, Default)]
pub struct MockConnection {
    state: Mutex<MockState>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the result set for the next query.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.state().responses.push_back(rows);
    }

    /// Queue a single-row result set.
    pub fn push_row(&self, row: Row) {
        self.push_rows(vec![row]);
    }

    /// Queue an empty result set.
    pub fn push_empty(&self) {
        self.push_rows(Vec::new());
    }

    /// Fail the next executed statement with a storage fault.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state().fail_next = Some(message.into());
    }

    /// Fail the first statement whose SQL contains `fragment`.
    pub fn fail_matching(&self, fragment: impl Into<String>, message: impl Into<String>) {
        self.state()
            .fail_matching
            .push((fragment.into(), message.into()));
    }

    /// The next INSERT will report `id` as its generated key.
    pub fn set_next_id(&self, id: i64) {
        self.state().last_id = id - 1;
    }

    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.state().executed.clone()
    }

    /// SQL text of every executed statement, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state()
            .executed
            .iter()
            .map(|e| e.sql.clone())
            .collect()
    }

    pub fn execute_count(&self) -> usize {
        self.state().executed.len()
    }

    pub fn last_executed(&self) -> Option<ExecutedStatement> {
        self.state().executed.last().cloned()
    }

    pub fn clear_log(&self) {
        self.state().executed.clear();
    }
}

fn leading_keyword(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

fn returning_column(sql: &str) -> Option<&str> {
    let upper = sql.to_ascii_uppercase();
    let at = upper.rfind(" RETURNING ")?;
    sql.get(at + " RETURNING ".len()..)
        .map(|rest| rest.trim().trim_matches(|c| c == '"' || c == '`'))
}

struct MockStatement<'a> {
    conn: &'a MockConnection,
    sql: String,
    rows: VecDeque<Row>,
}

impl Statement for MockStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<()> {
        let mut state = self.conn.state();
        state.executed.push(ExecutedStatement {
            sql: self.sql.clone(),
            params: params.to_vec(),
        });

        if let Some(message) = state.fail_next.take() {
            return Err(Error::storage(message));
        }
        if let Some(pos) = state
            .fail_matching
            .iter()
            .position(|(fragment, _)| self.sql.contains(fragment.as_str()))
        {
            let (_, message) = state.fail_matching.remove(pos);
            return Err(Error::storage(message));
        }

        let keyword = leading_keyword(&self.sql);
        if keyword == "INSERT" {
            state.last_id += 1;
            state.last_insert_id = Some(Value::Int(state.last_id));
        }

        let returning = returning_column(&self.sql);
        if keyword == "SELECT" || returning.is_some() {
            let rows = match state.responses.pop_front() {
                Some(rows) => rows,
                None => match (keyword.as_str(), returning) {
                    ("INSERT", Some(column)) => {
                        vec![Row::from_pairs([(column, Value::Int(state.last_id))])]
                    }
                    _ => Vec::new(),
                },
            };
            self.rows = rows.into();
        }
        Ok(())
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

impl Connection for MockConnection {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        Ok(Box::new(MockStatement {
            conn: self,
            sql: sql.to_string(),
            rows: VecDeque::new(),
        }))
    }

    fn last_insert_id(&self) -> Result<Option<Value>> {
        Ok(self.state().last_insert_id.clone())
    }
}

/// Serves one [`MockConnection`] for every data source id and records which ids were
/// asked for.
#[derive(Debug)]
pub struct MockProvider {
    connection: Arc<MockConnection>,
    driver: QueryDriver,
    requests: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(connection: Arc<MockConnection>, driver: QueryDriver) -> Self {
        Self {
            connection,
            driver,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn sqlite(connection: Arc<MockConnection>) -> Self {
        Self::new(connection, QueryDriver::new(Dialect::Sqlite))
    }

    /// Data source ids passed to `connection`, in order.
    pub fn requested_sources(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConnectionProvider for MockProvider {
    fn connection(&self, source_id: &str) -> Result<Arc<dyn Connection>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(source_id.to_string());
        Ok(Arc::clone(&self.connection) as Arc<dyn Connection>)
    }

    fn query_driver(&self, _source_id: &str) -> Result<QueryDriver> {
        Ok(self.driver)
    }
}

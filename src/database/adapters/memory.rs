//! Scripted in-memory implementation of the [`QueryExecutor`] port.
//!
//! Replies are chosen by SQL fragment, so services can be exercised without a
//! database. Every call is journaled for later inspection. Suitable for tests
//! only.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::database::ports::{ExecutorError, ExecutorResult, QueryExecutor, Row};
use crate::dialect::Statement;

type Responder = Arc<dyn Fn(&Statement) -> ExecutorResult<Reply> + Send + Sync>;

/// Canned reply returned for a matching statement.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Rows returned to a select.
    Rows(Vec<Row>),
    /// Affected-row count returned to an execute.
    Affected(u64),
    /// Failure raised by the statement.
    Fail(ExecutorError),
}

#[derive(Clone)]
enum Response {
    Fixed(Reply),
    Dynamic(Responder),
}

#[derive(Clone)]
struct Rule {
    fragment: String,
    response: Response,
}

/// Call recorded by [`ScriptedExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    /// A query sent through [`QueryExecutor::select_set`].
    Select(Statement),
    /// A statement sent through [`QueryExecutor::execute`].
    Execute(Statement),
    /// An explicit transaction was opened.
    Begin,
    /// The open transaction was rolled back.
    Rollback,
    /// The open transaction was committed.
    Commit,
}

impl JournalEntry {
    /// Returns the statement carried by the entry, if any.
    #[must_use]
    pub const fn statement(&self) -> Option<&Statement> {
        match self {
            Self::Select(statement) | Self::Execute(statement) => Some(statement),
            Self::Begin | Self::Rollback | Self::Commit => None,
        }
    }
}

/// [`QueryExecutor`] answering from a list of rules.
///
/// The first rule whose fragment occurs in the statement SQL wins. Unmatched
/// selects return no row and unmatched executes affect no row.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    rules: Arc<RwLock<Vec<Rule>>>,
    journal: Arc<RwLock<Vec<JournalEntry>>>,
}

impl ScriptedExecutor {
    /// Creates an executor without rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push_rule(&self, fragment: &str, response: Response) {
        if let Ok(mut rules) = self.rules.write() {
            rules.push(Rule {
                fragment: fragment.to_owned(),
                response,
            });
        }
    }

    /// Answers statements containing `fragment` with `rows`.
    #[must_use]
    pub fn on(self, fragment: &str, rows: Vec<Row>) -> Self {
        self.push_rule(fragment, Response::Fixed(Reply::Rows(rows)));
        self
    }

    /// Answers statements containing `fragment` with one single-column row.
    #[must_use]
    pub fn on_value(self, fragment: &str, column: &str, value: impl Into<serde_json::Value>) -> Self {
        self.on(fragment, vec![Row::new().with(column, value)])
    }

    /// Answers executes containing `fragment` with an affected-row count.
    #[must_use]
    pub fn on_affected(self, fragment: &str, count: u64) -> Self {
        self.push_rule(fragment, Response::Fixed(Reply::Affected(count)));
        self
    }

    /// Fails statements containing `fragment`.
    #[must_use]
    pub fn on_error(self, fragment: &str, error: ExecutorError) -> Self {
        self.push_rule(fragment, Response::Fixed(Reply::Fail(error)));
        self
    }

    /// Answers statements containing `fragment` by calling `responder`.
    #[must_use]
    pub fn on_dynamic<F>(self, fragment: &str, responder: F) -> Self
    where
        F: Fn(&Statement) -> ExecutorResult<Reply> + Send + Sync + 'static,
    {
        self.push_rule(fragment, Response::Dynamic(Arc::new(responder)));
        self
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Returns every recorded statement in order.
    #[must_use]
    pub fn statements(&self) -> Vec<Statement> {
        self.journal()
            .iter()
            .filter_map(JournalEntry::statement)
            .cloned()
            .collect()
    }

    /// Counts recorded statements whose SQL contains `fragment`.
    #[must_use]
    pub fn count_matching(&self, fragment: &str) -> usize {
        self.statements()
            .iter()
            .filter(|statement| statement.sql().contains(fragment))
            .count()
    }

    fn record(&self, entry: JournalEntry) -> ExecutorResult<()> {
        self.journal
            .write()
            .map(|mut entries| entries.push(entry))
            .map_err(|err| ExecutorError::connection(err.to_string()))
    }

    fn reply_for(&self, statement: &Statement) -> ExecutorResult<Option<Reply>> {
        let rules = self
            .rules
            .read()
            .map_err(|err| ExecutorError::connection(err.to_string()))?;
        let matched = rules
            .iter()
            .find(|rule| statement.sql().contains(&rule.fragment))
            .map(|rule| rule.response.clone());
        drop(rules);
        matched
            .map(|response| match response {
                Response::Fixed(reply) => Ok(reply),
                Response::Dynamic(responder) => responder(statement),
            })
            .transpose()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn select_set(&self, statement: &Statement) -> ExecutorResult<Vec<Row>> {
        self.record(JournalEntry::Select(statement.clone()))?;
        match self.reply_for(statement)? {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Affected(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&self, statement: &Statement) -> ExecutorResult<u64> {
        self.record(JournalEntry::Execute(statement.clone()))?;
        match self.reply_for(statement)? {
            Some(Reply::Affected(count)) => Ok(count),
            Some(Reply::Rows(rows)) => Ok(rows.len() as u64),
            Some(Reply::Fail(error)) => Err(error),
            None => Ok(0),
        }
    }

    async fn begin_transaction(&self) -> ExecutorResult<()> {
        self.record(JournalEntry::Begin)
    }

    async fn rollback_transaction(&self) -> ExecutorResult<()> {
        self.record(JournalEntry::Rollback)
    }

    async fn end_transaction(&self) -> ExecutorResult<()> {
        self.record(JournalEntry::Commit)
    }
}

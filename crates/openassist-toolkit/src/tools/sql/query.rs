use openassist::async_trait;
use openassist::core::tool::{ToolCallError, ToolOutput, ToolRuntime};
use openassist_derive::{ToolInput, tool};
use log::debug;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Opens a connection to the application's database. Injected so the tool
/// never owns connection configuration.
pub type DbConnector = Arc<dyn Fn() -> Result<Connection, rusqlite::Error> + Send + Sync>;

const DEFAULT_PREVIEW_ROWS: usize = 50;

#[derive(Serialize, Deserialize, ToolInput, Debug)]
pub struct QueryArgs {
    #[input(description = "SQL SELECT statement to run against the database")]
    sql: String,
}

#[tool(
    name = "query",
    description = "Run a read-only SQL query against the session database and return the matching rows",
    input = QueryArgs,
)]
pub struct QueryTool {
    connector: DbConnector,
    preview_rows: usize,
}

impl QueryTool {
    pub fn new(connector: DbConnector) -> Self {
        Self {
            connector,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// Cap on rows included in the model-visible preview. The full result
    /// set always goes out of band.
    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }
}

impl fmt::Debug for QueryTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTool")
            .field("preview_rows", &self.preview_rows)
            .finish_non_exhaustive()
    }
}

fn sql_error(e: rusqlite::Error) -> ToolCallError {
    ToolCallError::RuntimeError(Box::new(e))
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(r) => json!(r),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[async_trait]
impl ToolRuntime for QueryTool {
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolCallError> {
        let QueryArgs { sql } = serde_json::from_value(args)?;

        debug!("Query Executing: {sql}");

        let connector = self.connector.clone();
        let (columns, rows) = tokio::task::spawn_blocking(move || {
            let conn = connector().map_err(sql_error)?;
            let mut stmt = conn.prepare(&sql).map_err(sql_error)?;

            // sqlite3_stmt_readonly: catches writes regardless of surface
            // syntax, including CTE-wrapped DML like `WITH x AS (...) DELETE`.
            if !stmt.readonly() {
                return Err(ToolCallError::RuntimeError(
                    "Only read-only statements are allowed".into(),
                ));
            }

            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let column_count = columns.len();

            let mut rows = Vec::new();
            let mut query = stmt.query([]).map_err(sql_error)?;
            while let Some(row) = query.next().map_err(sql_error)? {
                let mut record = Vec::with_capacity(column_count);
                for index in 0..column_count {
                    record.push(column_value(row.get_ref(index).map_err(sql_error)?));
                }
                rows.push(Value::Array(record));
            }
            Ok((columns, rows))
        })
        .await
        .map_err(|e| ToolCallError::RuntimeError(Box::new(e)))??;

        let preview: Vec<Value> = rows.iter().take(self.preview_rows).cloned().collect();
        let truncated = rows.len() > preview.len();

        Ok(ToolOutput::with_additional_data(
            json!({
                "success": true,
                "columns": columns,
                "row_count": rows.len(),
                "preview": preview,
                "truncated": truncated,
            }),
            json!({
                "columns": columns,
                "rows": rows,
            }),
        ))
    }
}

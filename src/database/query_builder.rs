use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool};

use crate::database::manager::DatabaseError;

/// Parameterised SQL ready to bind
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Builds the handful of dynamic statements the survey store needs.
/// Table and column names come from compile-time constants; every value is a bind parameter.
pub struct QueryBuilder {
    table_name: &'static str,
    columns: &'static [&'static str],
}

impl QueryBuilder {
    pub fn new(table_name: &'static str, columns: &'static [&'static str]) -> Self {
        Self { table_name, columns }
    }

    /// `SELECT ... WHERE "<column>" = $1 ORDER BY "id"`
    pub fn select_where_eq(&self, column: &str, value: Value) -> SqlResult {
        SqlResult {
            query: format!(
                "SELECT {} FROM {} WHERE {} = $1 ORDER BY \"id\"",
                self.column_list(),
                quote_identifier(self.table_name),
                quote_identifier(column)
            ),
            params: vec![value],
        }
    }

    /// Case-insensitive substring match of `term` against any of `fields`.
    pub fn select_matching_any(&self, fields: &[&str], term: &str) -> SqlResult {
        let clauses: Vec<String> = fields
            .iter()
            .map(|field| format!("{} ILIKE $1", quote_identifier(field)))
            .collect();

        SqlResult {
            query: format!(
                "SELECT {} FROM {} WHERE {} ORDER BY \"id\"",
                self.column_list(),
                quote_identifier(self.table_name),
                clauses.join(" OR ")
            ),
            params: vec![Value::String(format!("%{}%", escape_like(term)))],
        }
    }

    /// `UPDATE ... SET "a" = $1, "b" = $2 WHERE "id" = $3 RETURNING ...`
    pub fn update_by_id(&self, id: i32, changes: &[(&'static str, Value)]) -> Result<SqlResult, DatabaseError> {
        if changes.is_empty() {
            return Err(DatabaseError::QueryError(format!(
                "update of {} requires at least one column",
                self.table_name
            )));
        }

        let mut params = Vec::with_capacity(changes.len() + 1);
        let assignments: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(i, (column, value))| {
                params.push(value.clone());
                format!("{} = ${}", quote_identifier(column), i + 1)
            })
            .collect();
        params.push(Value::from(id));

        Ok(SqlResult {
            query: format!(
                "UPDATE {} SET {} WHERE \"id\" = ${} RETURNING {}",
                quote_identifier(self.table_name),
                assignments.join(", "),
                params.len(),
                self.column_list()
            ),
            params,
        })
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub async fn fetch_all<T>(sql_result: &SqlResult, pool: &PgPool) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_all(pool).await?)
}

pub async fn fetch_optional<T>(sql_result: &SqlResult, pool: &PgPool) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_optional(pool).await?)
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Ids are INTEGER columns
                match i32::try_from(i) {
                    Ok(small) => q.bind(small),
                    Err(_) => q.bind(i),
                }
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(sqlx::types::Json(v)), // JSONB
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

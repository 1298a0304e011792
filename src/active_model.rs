//! ActiveModel trait for records that have not been written yet
//!
//! An active model carries the column values of a row to insert. The session
//! turns it into an `INSERT` statement when it is staged, and the store assigns
//! the primary key on commit.

use crate::executor::LifeError;
use crate::query::value_conversion::convert_values;
use crate::query::{Ident, LifeModelTrait};
use rusqlite::types::Value as SqlValue;
use sea_query::{Expr, Query, SqliteQueryBuilder, Value};

/// Trait for insertable records
pub trait ActiveModelTrait: std::fmt::Debug {
    /// The Entity type that this ActiveModel belongs to
    type Entity: LifeModelTrait;

    /// Column values to write, primary key excluded
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Build the `INSERT` statement for this record
    fn insert_statement(&self) -> Result<(String, Vec<SqlValue>), LifeError> {
        let table = <Self::Entity as LifeModelTrait>::table();
        let values = self.values();
        if values.is_empty() {
            return Ok((format!(r#"INSERT INTO "{table}" DEFAULT VALUES"#), Vec::new()));
        }

        let mut stmt = Query::insert();
        stmt.into_table(Ident(table))
            .columns(values.iter().map(|(column, _)| Ident(*column)));
        stmt.values(values.into_iter().map(|(_, value)| Expr::val(value)))
            .map_err(|e| LifeError::QueryError(format!("invalid insert for {table}: {e}")))?;

        let (sql, params) = stmt.build(SqliteQueryBuilder);
        Ok((sql, convert_values(&params)?))
    }
}

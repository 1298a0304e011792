//! Query execution methods for `SelectQuery`.

use crate::executor::{LifeError, LifeExecutor};
use crate::query::select::SelectQuery;
use crate::query::traits::{FromRow, LifeModelTrait};

impl<E> SelectQuery<E>
where
    E: LifeModelTrait,
{
    /// Execute the query and return every matching model
    pub fn all<Ex>(&self, executor: &Ex) -> Result<Vec<E::Model>, LifeError>
    where
        Ex: LifeExecutor + ?Sized,
    {
        let (sql, values) = self.build()?;
        let rows = executor.query_all(&sql, &values)?;
        rows.iter().map(<E::Model as FromRow>::from_row).collect()
    }

    /// Execute the query with `LIMIT 1` and return the first model, if any
    pub fn one<Ex>(&self, executor: &Ex) -> Result<Option<E::Model>, LifeError>
    where
        Ex: LifeExecutor + ?Sized,
    {
        let models = self.clone().limit(1).all(executor)?;
        Ok(models.into_iter().next())
    }

    /// Count the rows the query would return
    pub fn count<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<u64, LifeError> {
        let (sql, values) = self.build()?;
        let sql = format!("SELECT COUNT(*) FROM ({sql}) AS counted");
        let row = executor.query_one(&sql, &values)?;
        let count: i64 = row.get_idx(0)?;
        u64::try_from(count).map_err(|_| LifeError::ParseError(format!("negative count {count}")))
    }
}

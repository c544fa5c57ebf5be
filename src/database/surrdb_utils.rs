use serde::de::DeserializeOwned;
use surrealdb::opt::QueryResult;
use surrealdb::Response;

use crate::middleware::error::AppResult;
use crate::middleware::utils::db_utils::CountRow;

/// Value of the trailing `RETURN` statement, e.g. after a transaction block.
pub fn take_last<T>(res: &mut Response) -> AppResult<T>
where
    T: DeserializeOwned,
    usize: QueryResult<T>,
{
    let idx = res.num_statements().saturating_sub(1);
    Ok(res.take(idx)?)
}

/// Reads a `SELECT count() AS count ... GROUP ALL` result, no rows means zero.
pub fn take_count(res: &mut Response, idx: usize) -> AppResult<u64> {
    let row: Option<CountRow> = res.take(idx)?;
    Ok(row.map_or(0, |r| r.count.max(0) as u64))
}

/// `AND created > $cutoff` when a cutoff applies.
pub fn cutoff_clause(field: &str, cutoff: Option<i64>) -> String {
    match cutoff {
        Some(_) => format!(" AND {field} > $cutoff"),
        None => String::new(),
    }
}

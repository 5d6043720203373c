use crate::catalog::CatalogRow;
use crate::postgres_client_wrapper::PostgresClientWrapper;
use crate::{DatabaseConfig, Result};
use std::future::Future;
use tracing::{info, instrument};

/// Runs generated SQL. No statement is inspected or refused here.
pub trait SqlExecutor: Sync {
    fn execute_sql(&self, sql: &str) -> impl Future<Output = Result<Vec<CatalogRow>>> + Send;
}

impl SqlExecutor for PostgresClientWrapper {
    #[instrument(skip_all)]
    async fn execute_sql(&self, sql: &str) -> Result<Vec<CatalogRow>> {
        let rows = self.simple_query_rows(sql).await?;
        info!(rows = rows.len(), "Executed query");
        Ok(rows)
    }
}

/// Opens a connection for a single statement and closes it again on every path.
#[instrument(skip_all)]
pub async fn execute_with_config(config: &DatabaseConfig, sql: &str) -> Result<Vec<CatalogRow>> {
    let connection = PostgresClientWrapper::connect(config).await?;
    let result = connection.execute_sql(sql).await;
    drop(connection);
    result
}

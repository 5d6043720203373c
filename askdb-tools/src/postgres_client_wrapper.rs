use crate::catalog::{CatalogQueryExecutor, CatalogRow, CatalogValue};
use crate::{AskDbError, DatabaseConfig, Result};
use bytes::BytesMut;
use std::error::Error;
use tokio::task::JoinHandle;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls, Row, SimpleQueryMessage};
use tracing::{debug, instrument};

pub struct PostgresClientWrapper {
    client: Client,
    join_handle: JoinHandle<Result<()>>,
}

impl PostgresClientWrapper {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(AskDbError::Connection)?;

        // Drives the socket. Aborted when the wrapper is dropped.
        let join_handle = tokio::spawn(async move {
            match connection.await {
                Err(e) => Err(AskDbError::PostgresError(e)),
                Ok(_) => Ok(()),
            }
        });

        Ok(PostgresClientWrapper {
            client,
            join_handle,
        })
    }

    #[instrument(skip_all)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        debug!("Connecting to database: {}", config.describe());
        Self::new(&config.to_connection_string()).await
    }

    pub async fn execute_non_query(&self, sql: &str) -> Result {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| AskDbError::PostgresErrorWithQuery {
                source: e,
                query: sql.to_string(),
            })?;

        Ok(())
    }

    /// Runs arbitrary SQL through the simple query protocol. Every value comes
    /// back as text, which is the only representation that works for any
    /// result type without knowing it up front.
    pub async fn simple_query_rows(&self, sql: &str) -> Result<Vec<CatalogRow>> {
        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| AskDbError::PostgresErrorWithQuery {
                source: e,
                query: sql.to_string(),
            })?;

        let mut output = Vec::new();

        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let mut catalog_row = CatalogRow::new();
                for (idx, column) in row.columns().iter().enumerate() {
                    catalog_row.push(column.name(), row.try_get(idx)?.map(|v| v.to_string()));
                }
                output.push(catalog_row);
            }
        }

        Ok(output)
    }

    pub async fn get_single_results(&self, sql: &str) -> Result<Vec<String>> {
        let rows = self.query_catalog(sql, &[]).await?;

        rows.iter().map(|r| r.try_get(0)).collect()
    }
}

impl Drop for PostgresClientWrapper {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}

impl CatalogQueryExecutor for PostgresClientWrapper {
    async fn query_catalog(&self, sql: &str, params: &[CatalogValue]) -> Result<Vec<CatalogRow>> {
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let query_results = self.client.query(sql, &params).await.map_err(|e| {
            AskDbError::PostgresErrorWithQuery {
                source: e,
                query: sql.to_string(),
            }
        })?;

        let mut output = Vec::with_capacity(query_results.len());

        for row in query_results.iter() {
            output.push(to_catalog_row(row)?);
        }

        Ok(output)
    }
}

fn to_catalog_row(row: &Row) -> Result<CatalogRow> {
    let mut catalog_row = CatalogRow::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value: CatalogValue = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx)?.into()
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx)?.map(i64::from).into()
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx)?.into()
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx)?.into()
        } else if *ty == Type::OID {
            row.try_get::<_, Option<u32>>(idx)?.map(i64::from).into()
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::NAME
            || *ty == Type::BPCHAR
        {
            row.try_get::<_, Option<String>>(idx)?.into()
        } else if *ty == Type::TEXT_ARRAY || *ty == Type::NAME_ARRAY || *ty == Type::VARCHAR_ARRAY {
            row.try_get::<_, Option<Vec<String>>>(idx)?.into()
        } else {
            return Err(AskDbError::UnsupportedColumnType {
                column: column.name().to_string(),
                type_name: ty.name().to_string(),
            });
        };

        catalog_row.push(column.name(), value);
    }

    Ok(catalog_row)
}

impl ToSql for CatalogValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            CatalogValue::Null => Ok(IsNull::Yes),
            CatalogValue::Bool(b) => b.to_sql(ty, out),
            CatalogValue::Int(i) => {
                if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql(ty, out)
                } else {
                    i.to_sql(ty, out)
                }
            }
            CatalogValue::Text(s) => s.to_sql(ty, out),
            CatalogValue::TextArray(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

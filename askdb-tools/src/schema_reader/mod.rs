use crate::catalog::{CatalogQueryExecutor, CatalogValue};
use crate::postgres_client_wrapper::PostgresClientWrapper;
use crate::schema_reader::builder::SchemaBuilder;
use crate::{DatabaseConfig, DatabaseSchema, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

mod builder;
mod check_constraint;
mod foreign_key_column;
mod index;
mod primary_key;
mod table_column;
#[cfg(test)]
mod tests;

pub use builder::ExtractionStats;

/// What to extract. No schema set (or an empty one) means every non-system schema.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ExtractionOptions {
    pub schemas: Option<BTreeSet<String>>,
    pub include_indexes: bool,
    pub include_check_constraints: bool,
}

impl ExtractionOptions {
    pub fn for_schemas<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtractionOptions {
            schemas: Some(schemas.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    fn schema_filter(&self) -> CatalogValue {
        match &self.schemas {
            Some(schemas) if !schemas.is_empty() => {
                CatalogValue::TextArray(schemas.iter().cloned().collect())
            }
            _ => CatalogValue::Null,
        }
    }
}

pub struct SchemaReader<'a, E: CatalogQueryExecutor> {
    executor: &'a E,
}

impl<'a, E: CatalogQueryExecutor> SchemaReader<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        SchemaReader { executor }
    }

    pub async fn extract_schema(&self, options: &ExtractionOptions) -> Result<DatabaseSchema> {
        let (schema, _) = self.extract_schema_with_stats(options).await?;
        Ok(schema)
    }

    /// Runs the catalog passes one after the other and reconciles them into a
    /// schema. Nothing is returned unless every pass succeeds.
    #[instrument(skip_all)]
    pub async fn extract_schema_with_stats(
        &self,
        options: &ExtractionOptions,
    ) -> Result<(DatabaseSchema, ExtractionStats)> {
        let mut builder = SchemaBuilder::default();

        for row in self.get_columns(&[options.schema_filter()]).await? {
            builder.add_column(row);
        }

        for row in self.get_primary_key_columns(&[]).await? {
            builder.mark_primary_key(&row);
        }

        for row in self.get_foreign_key_columns(&[]).await? {
            builder.add_foreign_key(row);
        }

        if options.include_indexes {
            for row in self.get_indexes(&[]).await? {
                builder.add_index(row);
            }
        }

        if options.include_check_constraints {
            for row in self.get_check_constraints(&[]).await? {
                builder.add_check_constraint(row);
            }
        }

        let (schema, stats) = builder.build(Utc::now());

        if stats.skipped_primary_key_rows > 0 || stats.skipped_foreign_key_rows > 0 {
            debug!(
                skipped_primary_key_rows = stats.skipped_primary_key_rows,
                skipped_foreign_key_rows = stats.skipped_foreign_key_rows,
                "Skipped constraint rows for tables outside the extracted set"
            );
        }

        info!(
            tables = stats.tables,
            columns = stats.columns,
            foreign_keys = stats.foreign_key_rows,
            "Extracted schema"
        );

        Ok((schema, stats))
    }
}

/// Opens a connection, extracts, and closes the connection again before
/// returning, whether extraction succeeded or not.
#[instrument(skip_all)]
pub async fn extract_from_config(
    config: &DatabaseConfig,
    options: &ExtractionOptions,
) -> Result<(DatabaseSchema, ExtractionStats)> {
    let connection = PostgresClientWrapper::connect(config).await?;
    let reader = SchemaReader::new(&connection);
    let result = reader.extract_schema_with_stats(options).await;
    drop(connection);
    result
}

macro_rules! define_catalog_query {
    ($fn_name:ident, $query_name:ident, $result:ident, $query:literal) => {
        pub(crate) const $query_name: &str = $query;

        impl<E: $crate::catalog::CatalogQueryExecutor> $crate::schema_reader::SchemaReader<'_, E> {
            #[tracing::instrument(skip_all)]
            pub(in crate::schema_reader) async fn $fn_name(
                &self,
                params: &[$crate::catalog::CatalogValue],
            ) -> $crate::Result<Vec<$result>> {
                $crate::catalog::fetch_rows(self.executor, $query_name, params).await
            }
        }
    };
}

pub(crate) use define_catalog_query;

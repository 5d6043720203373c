
use super::check_constraint::CHECK_CONSTRAINTS_QUERY;
use super::foreign_key_column::FOREIGN_KEY_COLUMNS_QUERY;
use super::index::INDEXES_QUERY;
use super::primary_key::PRIMARY_KEY_COLUMNS_QUERY;
use super::table_column::COLUMNS_QUERY;
use super::*;
use crate::catalog::CatalogRow;
use crate::{AskDbError, ColumnInfo, Relationship, TableInfo};
use similar_asserts::assert_eq;
use std::sync::Mutex;

struct FakeColumn {
    schema: String,
    table: String,
    name: String,
    data_type: String,
    ordinal_position: i32,
}

/// An in-memory catalog that answers the extraction queries the way Postgres
/// would, including the schema filter and the ordering of the column query.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    columns: Vec<FakeColumn>,
    primary_keys: Vec<CatalogRow>,
    foreign_keys: Vec<CatalogRow>,
    indexes: Vec<CatalogRow>,
    check_constraints: Vec<CatalogRow>,
    failing_query: Option<&'static str>,
    executed: Mutex<Vec<&'static str>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table. Columns get ordinal positions in the given order.
    pub fn table(mut self, schema: &str, table: &str, columns: &[(&str, &str)]) -> Self {
        for (idx, (name, data_type)) in columns.iter().enumerate() {
            self.columns.push(FakeColumn {
                schema: schema.to_string(),
                table: table.to_string(),
                name: name.to_string(),
                data_type: data_type.to_string(),
                ordinal_position: idx as i32 + 1,
            });
        }
        self
    }

    pub fn primary_key(mut self, schema: &str, table: &str, columns: &[&str]) -> Self {
        for column in columns {
            self.primary_keys.push(
                CatalogRow::new()
                    .with("table_schema", schema)
                    .with("table_name", table)
                    .with("column_name", *column),
            );
        }
        self
    }

    pub fn foreign_key(
        mut self,
        constraint: &str,
        (schema, table): (&str, &str),
        columns: &[&str],
        (foreign_schema, foreign_table): (&str, &str),
        foreign_columns: &[&str],
    ) -> Self {
        for (column, foreign_column) in columns.iter().zip(foreign_columns) {
            self.foreign_keys.push(
                CatalogRow::new()
                    .with("constraint_name", constraint)
                    .with("table_schema", schema)
                    .with("table_name", table)
                    .with("column_name", *column)
                    .with("foreign_table_schema", foreign_schema)
                    .with("foreign_table_name", foreign_table)
                    .with("foreign_column_name", *foreign_column),
            );
        }
        self
    }

    pub fn index(mut self, (schema, table): (&str, &str), name: &str, unique: bool, primary: bool, columns: &[&str]) -> Self {
        self.indexes.push(
            CatalogRow::new()
                .with("table_schema", schema)
                .with("table_name", table)
                .with("index_name", name)
                .with("is_unique", unique)
                .with("is_primary", primary)
                .with("index_type", "btree")
                .with("columns", columns.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
        );
        self
    }

    pub fn check_constraint(mut self, (schema, table): (&str, &str), name: &str, clause: &str) -> Self {
        self.check_constraints.push(
            CatalogRow::new()
                .with("table_schema", schema)
                .with("table_name", table)
                .with("constraint_name", name)
                .with("check_clause", clause),
        );
        self
    }

    pub fn failing_on(mut self, query: &'static str) -> Self {
        self.failing_query = Some(query);
        self
    }

    fn executed(&self) -> Vec<&'static str> {
        self.executed.lock().unwrap().clone()
    }

    fn column_rows(&self, params: &[CatalogValue]) -> Vec<CatalogRow> {
        let filter = match params.first() {
            Some(CatalogValue::TextArray(schemas)) => Some(schemas.clone()),
            Some(CatalogValue::Null) => None,
            other => panic!("Unexpected schema filter parameter {:?}", other),
        };

        let mut columns: Vec<&FakeColumn> = self
            .columns
            .iter()
            .filter(|c| filter.as_ref().map_or(true, |f| f.contains(&c.schema)))
            .collect();

        columns.sort_by(|a, b| {
            (&a.schema, &a.table, a.ordinal_position).cmp(&(&b.schema, &b.table, b.ordinal_position))
        });

        columns
            .into_iter()
            .map(|c| {
                CatalogRow::new()
                    .with("table_schema", c.schema.as_str())
                    .with("table_name", c.table.as_str())
                    .with("column_name", c.name.as_str())
                    .with("ordinal_position", c.ordinal_position)
                    .with("data_type", c.data_type.as_str())
                    .with("is_nullable", true)
                    .with("column_default", CatalogValue::Null)
                    .with("character_maximum_length", CatalogValue::Null)
                    .with("numeric_precision", CatalogValue::Null)
                    .with("numeric_scale", CatalogValue::Null)
            })
            .collect()
    }
}

impl CatalogQueryExecutor for FakeCatalog {
    async fn query_catalog(&self, sql: &str, params: &[CatalogValue]) -> Result<Vec<CatalogRow>> {
        let known = [
            COLUMNS_QUERY,
            PRIMARY_KEY_COLUMNS_QUERY,
            FOREIGN_KEY_COLUMNS_QUERY,
            INDEXES_QUERY,
            CHECK_CONSTRAINTS_QUERY,
        ];
        let query = *known
            .iter()
            .find(|q| **q == sql)
            .unwrap_or_else(|| panic!("Unexpected query: {}", sql));

        self.executed.lock().unwrap().push(query);

        if self.failing_query == Some(query) {
            return Err(AskDbError::IoError(std::io::Error::other("connection reset by peer")));
        }

        let rows = if query == COLUMNS_QUERY {
            self.column_rows(params)
        } else if query == PRIMARY_KEY_COLUMNS_QUERY {
            self.primary_keys.clone()
        } else if query == FOREIGN_KEY_COLUMNS_QUERY {
            self.foreign_keys.clone()
        } else if query == INDEXES_QUERY {
            self.indexes.clone()
        } else {
            self.check_constraints.clone()
        };

        Ok(rows)
    }
}

fn shop_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .table("public", "orders", &[("id", "integer"), ("customer_id", "integer")])
        .table("public", "customers", &[("id", "integer"), ("name", "text")])
        .primary_key("public", "orders", &["id"])
        .primary_key("public", "customers", &["id"])
        .foreign_key(
            "orders_customer_id_fkey",
            ("public", "orders"),
            &["customer_id"],
            ("public", "customers"),
            &["id"],
        )
}

async fn extract(catalog: &FakeCatalog, options: ExtractionOptions) -> (DatabaseSchema, ExtractionStats) {
    SchemaReader::new(catalog)
        .extract_schema_with_stats(&options)
        .await
        .unwrap()
}

fn assert_foreign_keys_consistent(table: &TableInfo) {
    for column in &table.columns {
        match table.foreign_key_of(column) {
            Some(fk) => {
                assert!(column.is_foreign_key());
                assert_eq!(fk.column_name, column.column_name);
                assert!(
                    table.foreign_keys.iter().any(|owned| std::ptr::eq(owned, fk)),
                    "foreign key of {}.{} is not owned by the table",
                    table.full_name(),
                    column.column_name
                );
            }
            None => assert!(!column.is_foreign_key()),
        }
    }
}

#[tokio::test]
async fn reads_orders_and_customers() {
    let catalog = shop_catalog();

    let (schema, _) = extract(&catalog, ExtractionOptions::default()).await;

    let orders = schema.get_table_by_full_name("public.orders").unwrap();
    assert_eq!(orders.primary_key_columns(), vec!["id"]);
    assert_eq!(orders.foreign_key_columns(), vec!["customer_id"]);

    let related = schema.related("public.customers");
    assert_eq!(related.referenced_by, vec!["public.orders".to_string()]);
    assert!(related.references_to.is_empty());

    assert_eq!(
        schema.relationships(),
        vec![Relationship {
            from_table: "public.orders".to_string(),
            from_column: "customer_id".to_string(),
            to_table: "public.customers".to_string(),
            to_column: "id".to_string(),
            constraint_name: "orders_customer_id_fkey".to_string(),
        }]
    );
}

#[tokio::test]
async fn builds_columns_in_catalog_order() {
    let catalog = shop_catalog();

    let (schema, stats) = extract(&catalog, ExtractionOptions::default()).await;

    // Ordered by schema, then table name; customers sorts before orders.
    let names: Vec<String> = schema.tables.iter().map(|t| t.full_name()).collect();
    assert_eq!(names, vec!["public.customers", "public.orders"]);

    let customers = &schema.tables[0];
    assert_eq!(
        customers.columns,
        vec![
            ColumnInfo {
                column_name: "id".to_string(),
                ordinal_position: 1,
                data_type: "integer".to_string(),
                is_nullable: true,
                is_primary_key: true,
                ..Default::default()
            },
            ColumnInfo {
                column_name: "name".to_string(),
                ordinal_position: 2,
                data_type: "text".to_string(),
                is_nullable: true,
                ..Default::default()
            },
        ]
    );

    assert_eq!(stats.tables, 2);
    assert_eq!(stats.columns, 4);
    assert_eq!(stats.primary_key_rows, 2);
    assert_eq!(stats.foreign_key_rows, 1);
}

#[tokio::test]
async fn composite_keys_mark_every_column() {
    let catalog = FakeCatalog::new()
        .table("public", "warehouses", &[("region", "text"), ("code", "text"), ("name", "text")])
        .table("public", "stock", &[("id", "bigint"), ("region", "text"), ("code", "text"), ("quantity", "integer")])
        .primary_key("public", "warehouses", &["region", "code"])
        .primary_key("public", "stock", &["id"])
        .foreign_key(
            "stock_warehouse_fkey",
            ("public", "stock"),
            &["region", "code"],
            ("public", "warehouses"),
            &["region", "code"],
        );

    let (schema, _) = extract(&catalog, ExtractionOptions::default()).await;

    let warehouses = schema.get_table("public", "warehouses").unwrap();
    assert_eq!(warehouses.primary_key_columns(), vec!["region", "code"]);

    let stock = schema.get_table("public", "stock").unwrap();
    assert_eq!(stock.foreign_key_columns(), vec!["region", "code"]);
    assert_eq!(stock.foreign_keys.len(), 2);
    assert_eq!(stock.get_foreign_key_for_column("code").unwrap().referenced_column, "code");

    let relationships = schema.relationships();
    let total: usize = schema.tables.iter().map(|t| t.foreign_keys.len()).sum();
    assert_eq!(relationships.len(), total);
    assert!(relationships.iter().all(|r| r.constraint_name == "stock_warehouse_fkey"));

    for table in &schema.tables {
        assert_foreign_keys_consistent(table);
    }
}

#[tokio::test]
async fn self_reference_is_on_both_sides() {
    let catalog = FakeCatalog::new()
        .table("hr", "employees", &[("id", "integer"), ("manager_id", "integer")])
        .primary_key("hr", "employees", &["id"])
        .foreign_key("employees_manager_fkey", ("hr", "employees"), &["manager_id"], ("hr", "employees"), &["id"]);

    let (schema, _) = extract(&catalog, ExtractionOptions::default()).await;

    let related = schema.related("hr.employees");
    assert_eq!(related.references_to, vec!["hr.employees".to_string()]);
    assert_eq!(related.referenced_by, vec!["hr.employees".to_string()]);
}

#[tokio::test]
async fn restriction_keeps_only_named_schemas() {
    let catalog = FakeCatalog::new()
        .table("s1", "invoices", &[("id", "integer"), ("account_id", "integer")])
        .table("s2", "accounts", &[("id", "integer")])
        .primary_key("s1", "invoices", &["id"])
        .primary_key("s2", "accounts", &["id"])
        .foreign_key("invoices_account_fkey", ("s1", "invoices"), &["account_id"], ("s2", "accounts"), &["id"])
        .foreign_key("accounts_self_fkey", ("s2", "accounts"), &["id"], ("s2", "accounts"), &["id"]);

    let (schema, stats) = extract(&catalog, ExtractionOptions::for_schemas(["s1"])).await;

    assert!(schema.tables.iter().all(|t| t.schema_name == "s1"));
    assert_eq!(schema.tables.len(), 1);

    let invoices = schema.get_table("s1", "invoices").unwrap();
    assert_eq!(invoices.foreign_keys.len(), 1);
    assert_eq!(invoices.foreign_keys[0].referenced_table_full_name(), "s2.accounts");
    assert_foreign_keys_consistent(invoices);

    assert_eq!(stats.skipped_primary_key_rows, 1);
    assert_eq!(stats.skipped_foreign_key_rows, 1);
}

#[tokio::test]
async fn empty_restriction_means_every_schema() {
    let catalog = FakeCatalog::new()
        .table("s1", "a", &[("id", "integer")])
        .table("s2", "b", &[("id", "integer")]);

    let (schema, _) = extract(
        &catalog,
        ExtractionOptions {
            schemas: Some(Default::default()),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(schema.tables.len(), 2);
}

#[tokio::test]
async fn restriction_to_an_empty_schema_yields_no_tables() {
    let catalog = shop_catalog();

    let (schema, stats) = extract(&catalog, ExtractionOptions::for_schemas(["archive"])).await;

    assert!(schema.tables.is_empty());
    assert_eq!(stats.skipped_primary_key_rows, 2);
    assert_eq!(stats.skipped_foreign_key_rows, 1);
}

#[tokio::test]
async fn extracting_twice_gives_the_same_structure() {
    let catalog = shop_catalog();

    let (first, _) = extract(&catalog, ExtractionOptions::default()).await;
    let (second, _) = extract(&catalog, ExtractionOptions::default()).await;

    assert_eq!(first.tables, second.tables);
}

#[tokio::test]
async fn runs_passes_in_order_and_skips_optional_ones() {
    let catalog = shop_catalog();

    extract(&catalog, ExtractionOptions::default()).await;

    assert_eq!(
        catalog.executed(),
        vec![COLUMNS_QUERY, PRIMARY_KEY_COLUMNS_QUERY, FOREIGN_KEY_COLUMNS_QUERY]
    );
}

#[tokio::test]
async fn reads_indexes_and_check_constraints_when_asked() {
    let catalog = shop_catalog()
        .index(("public", "orders"), "orders_pkey", true, true, &["id"])
        .index(("public", "orders"), "orders_customer_idx", false, false, &["customer_id"])
        .index(("audit", "log"), "log_pkey", true, true, &["id"])
        .check_constraint(("public", "customers"), "customers_name_check", "((length(name) > 0))");

    let (schema, stats) = extract(
        &catalog,
        ExtractionOptions {
            include_indexes: true,
            include_check_constraints: true,
            ..Default::default()
        },
    )
    .await;

    let orders = schema.get_table("public", "orders").unwrap();
    assert_eq!(orders.indexes.len(), 2);
    assert!(orders.indexes[0].is_primary);
    assert_eq!(orders.indexes[1].columns, vec!["customer_id".to_string()]);
    assert_eq!(orders.indexes[1].index_type, "btree");

    let customers = schema.get_table("public", "customers").unwrap();
    assert_eq!(customers.check_constraints.len(), 1);
    assert_eq!(customers.check_constraints[0].check_clause, "((length(name) > 0))");

    assert_eq!(stats.skipped_index_rows, 1);
    assert_eq!(catalog.executed().len(), 5);
}

#[tokio::test]
async fn failing_pass_fails_the_whole_extraction() {
    let catalog = shop_catalog().failing_on(FOREIGN_KEY_COLUMNS_QUERY);

    let result = SchemaReader::new(&catalog)
        .extract_schema(&ExtractionOptions::default())
        .await;

    assert!(matches!(result, Err(AskDbError::IoError(_))));
}

#[tokio::test]
async fn malformed_catalog_row_is_an_error() {
    struct BrokenCatalog;

    impl CatalogQueryExecutor for BrokenCatalog {
        async fn query_catalog(&self, _sql: &str, _params: &[CatalogValue]) -> Result<Vec<CatalogRow>> {
            Ok(vec![CatalogRow::new().with("table_schema", "public").with("table_name", 42i64)])
        }
    }

    let result = SchemaReader::new(&BrokenCatalog)
        .extract_schema(&ExtractionOptions::default())
        .await;

    match result {
        Err(AskDbError::CatalogTypeMismatch { column, expected, actual }) => {
            assert_eq!(column, "table_name");
            assert_eq!(expected, "text");
            assert_eq!(actual, "int");
        }
        other => panic!("Expected a type mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn dotted_names_do_not_merge_tables() {
    let catalog = FakeCatalog::new()
        .table("a.b", "c", &[("x", "integer")])
        .table("a", "b.c", &[("y", "integer"), ("z", "integer")])
        .primary_key("a", "b.c", &["y"]);

    let (schema, stats) = extract(&catalog, ExtractionOptions::default()).await;

    assert_eq!(stats.tables, 2);

    let dotted_schema = schema.get_table("a.b", "c").unwrap();
    assert_eq!(dotted_schema.columns.len(), 1);
    assert!(dotted_schema.primary_key_columns().is_empty());

    let dotted_table = schema.get_table("a", "b.c").unwrap();
    let names: Vec<&str> = dotted_table.columns.iter().map(|c| c.column_name.as_str()).collect();
    assert_eq!(names, vec!["y", "z"]);
    assert_eq!(dotted_table.primary_key_columns(), vec!["y"]);

    schema.validate().unwrap();
}

#[tokio::test]
async fn extracted_schema_survives_the_cache() {
    let catalog = FakeCatalog::new()
        .table("public", "warehouses", &[("region", "text"), ("code", "text")])
        .table("public", "stock", &[("id", "bigint"), ("region", "text"), ("code", "text")])
        .primary_key("public", "warehouses", &["region", "code"])
        .primary_key("public", "stock", &["id"])
        .foreign_key(
            "stock_warehouse_fkey",
            ("public", "stock"),
            &["region", "code"],
            ("public", "warehouses"),
            &["region", "code"],
        )
        .index(("public", "stock"), "stock_pkey", true, true, &["id"])
        .index(("public", "stock"), "stock_warehouse_idx", false, false, &["region", "code"])
        .check_constraint(("public", "warehouses"), "warehouses_code_check", "((length(code) = 3))");

    let (schema, _) = extract(
        &catalog,
        ExtractionOptions {
            include_indexes: true,
            include_check_constraints: true,
            ..Default::default()
        },
    )
    .await;

    let directory = std::env::temp_dir().join(format!("askdb-extracted-{}", uuid::Uuid::new_v4()));
    let path = directory.join("schema.json");

    crate::save_schema(&schema, &path).await.unwrap();
    let loaded = crate::load_schema(&path).await.unwrap();

    assert_eq!(loaded, schema);
    let stock = loaded.get_table("public", "stock").unwrap();
    assert_eq!(stock.indexes.len(), 2);
    assert_foreign_keys_consistent(stock);

    tokio::fs::remove_dir_all(&directory).await.unwrap();
}

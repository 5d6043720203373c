use crate::catalog::{CatalogRow, FromCatalogRow};
use crate::schema_reader::define_catalog_query;
use crate::IndexInfo;

#[derive(Debug, Eq, PartialEq)]
pub struct IndexResult {
    pub table_schema: String,
    pub table_name: String,
    pub index_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    pub index_type: String,
    pub columns: Vec<String>,
}

impl FromCatalogRow for IndexResult {
    fn from_catalog_row(row: CatalogRow) -> crate::Result<Self> {
        Ok(IndexResult {
            table_schema: row.try_get(0)?,
            table_name: row.try_get(1)?,
            index_name: row.try_get(2)?,
            is_unique: row.try_get(3)?,
            is_primary: row.try_get(4)?,
            index_type: row.try_get(5)?,
            columns: row.try_get(6)?,
        })
    }
}

impl IndexResult {
    pub fn into_index_info(self) -> IndexInfo {
        IndexInfo {
            index_name: self.index_name,
            is_unique: self.is_unique,
            is_primary: self.is_primary,
            columns: self.columns,
            index_type: self.index_type,
        }
    }
}

//language=postgresql
define_catalog_query!(get_indexes, INDEXES_QUERY, IndexResult, r#"
select ns.nspname::text          as table_schema,
       tab.relname::text         as table_name,
       idx.relname::text         as index_name,
       i.indisunique             as is_unique,
       i.indisprimary            as is_primary,
       am.amname::text           as index_type,
       array(select pg_get_indexdef(i.indexrelid, k, true)
             from generate_series(1, i.indnkeyatts::int4) as k
             order by k)::text[] as columns
from pg_catalog.pg_index i
         join pg_catalog.pg_class idx on idx.oid = i.indexrelid
         join pg_catalog.pg_class tab on tab.oid = i.indrelid
         join pg_catalog.pg_namespace ns on ns.oid = tab.relnamespace
         join pg_catalog.pg_am am on am.oid = idx.relam
where ns.nspname not in ('pg_catalog', 'information_schema', 'pg_toast')
order by ns.nspname, tab.relname, idx.relname;
"#);

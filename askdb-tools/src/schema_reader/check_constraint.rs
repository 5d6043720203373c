use crate::catalog::{CatalogRow, FromCatalogRow};
use crate::schema_reader::define_catalog_query;
use crate::CheckConstraintInfo;

#[derive(Debug, Eq, PartialEq)]
pub struct CheckConstraintResult {
    pub table_schema: String,
    pub table_name: String,
    pub constraint_name: String,
    pub check_clause: String,
}

impl FromCatalogRow for CheckConstraintResult {
    fn from_catalog_row(row: CatalogRow) -> crate::Result<Self> {
        Ok(CheckConstraintResult {
            table_schema: row.try_get(0)?,
            table_name: row.try_get(1)?,
            constraint_name: row.try_get(2)?,
            check_clause: row.try_get(3)?,
        })
    }
}

impl CheckConstraintResult {
    pub fn into_check_constraint_info(self) -> CheckConstraintInfo {
        CheckConstraintInfo {
            constraint_name: self.constraint_name,
            check_clause: self.check_clause,
        }
    }
}

// pg_get_constraintdef renders "CHECK (...)"; the prefix is cut off.
//language=postgresql
define_catalog_query!(get_check_constraints, CHECK_CONSTRAINTS_QUERY, CheckConstraintResult, r#"
select ns.nspname::text                                     as table_schema,
       cl.relname::text                                     as table_name,
       ct.conname::text                                     as constraint_name,
       substring(pg_get_constraintdef(ct.oid) from 7)::text as check_clause
from pg_catalog.pg_constraint ct
         join pg_catalog.pg_class cl on cl.oid = ct.conrelid
         join pg_catalog.pg_namespace ns on ns.oid = cl.relnamespace
where ct.contype = 'c'
  and ns.nspname not in ('pg_catalog', 'information_schema')
order by ns.nspname, cl.relname, ct.conname;
"#);

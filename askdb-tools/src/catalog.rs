//! The seam between schema extraction and whatever can run catalog queries.
//!
//! Rows come back as ordered name/value pairs. Every catalog query decodes its
//! rows straight into a typed projection through [`FromCatalogRow`], so the
//! reconciliation code never looks fields up by name.

use crate::{AskDbError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::future::Future;

/// A single value in a catalog (or query) result.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CatalogValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    TextArray(Vec<String>),
}

impl CatalogValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            CatalogValue::Null => "null",
            CatalogValue::Bool(_) => "bool",
            CatalogValue::Int(_) => "int",
            CatalogValue::Text(_) => "text",
            CatalogValue::TextArray(_) => "text[]",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CatalogValue::Null)
    }
}

impl From<&str> for CatalogValue {
    fn from(value: &str) -> Self {
        CatalogValue::Text(value.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(value: String) -> Self {
        CatalogValue::Text(value)
    }
}

impl From<bool> for CatalogValue {
    fn from(value: bool) -> Self {
        CatalogValue::Bool(value)
    }
}

impl From<i64> for CatalogValue {
    fn from(value: i64) -> Self {
        CatalogValue::Int(value)
    }
}

impl From<i32> for CatalogValue {
    fn from(value: i32) -> Self {
        CatalogValue::Int(value as i64)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => CatalogValue::Null,
        }
    }
}

impl From<Vec<String>> for CatalogValue {
    fn from(value: Vec<String>) -> Self {
        CatalogValue::TextArray(value)
    }
}

impl Serialize for CatalogValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CatalogValue::Null => serializer.serialize_none(),
            CatalogValue::Bool(b) => serializer.serialize_bool(*b),
            CatalogValue::Int(i) => serializer.serialize_i64(*i),
            CatalogValue::Text(s) => serializer.serialize_str(s),
            CatalogValue::TextArray(v) => v.serialize(serializer),
        }
    }
}

/// One result row: column names in result order, paired with their values.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct CatalogRow {
    columns: Vec<String>,
    values: Vec<CatalogValue>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. Builder style, used by executors and tests alike.
    pub fn with(mut self, column: &str, value: impl Into<CatalogValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &str, value: impl Into<CatalogValue>) {
        self.columns.push(column.to_string());
        self.values.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogValue)> {
        self.columns.iter().map(|c| c.as_str()).zip(self.values.iter())
    }

    pub fn get<I: CatalogRowIndex>(&self, idx: I) -> Option<&CatalogValue> {
        idx.position(self).map(|p| &self.values[p])
    }

    pub fn try_get<I: CatalogRowIndex, T: FromCatalogValue>(&self, idx: I) -> Result<T> {
        let position = idx
            .position(self)
            .ok_or_else(|| AskDbError::CatalogColumnMissing(idx.describe()))?;
        T::from_catalog_value(&self.columns[position], &self.values[position])
    }
}

impl Serialize for CatalogRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Something that can address a column in a [`CatalogRow`], by position or by name.
pub trait CatalogRowIndex {
    fn position(&self, row: &CatalogRow) -> Option<usize>;
    fn describe(&self) -> String;
}

impl CatalogRowIndex for usize {
    fn position(&self, row: &CatalogRow) -> Option<usize> {
        (*self < row.len()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("#{}", self)
    }
}

impl CatalogRowIndex for &str {
    fn position(&self, row: &CatalogRow) -> Option<usize> {
        row.columns.iter().position(|c| c.as_str() == *self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

pub trait FromCatalogValue: Sized {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self>;
}

fn type_mismatch(column: &str, expected: &'static str, value: &CatalogValue) -> AskDbError {
    AskDbError::CatalogTypeMismatch {
        column: column.to_string(),
        expected,
        actual: value.type_name(),
    }
}

impl FromCatalogValue for String {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self> {
        match value {
            CatalogValue::Text(s) => Ok(s.clone()),
            _ => Err(type_mismatch(column, "text", value)),
        }
    }
}

impl FromCatalogValue for bool {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self> {
        match value {
            CatalogValue::Bool(b) => Ok(*b),
            _ => Err(type_mismatch(column, "bool", value)),
        }
    }
}

impl FromCatalogValue for i64 {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self> {
        match value {
            CatalogValue::Int(i) => Ok(*i),
            _ => Err(type_mismatch(column, "int", value)),
        }
    }
}

impl FromCatalogValue for i32 {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self> {
        match value {
            CatalogValue::Int(i) => {
                i32::try_from(*i).map_err(|_| type_mismatch(column, "int4", value))
            }
            _ => Err(type_mismatch(column, "int", value)),
        }
    }
}

impl FromCatalogValue for Vec<String> {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self> {
        match value {
            CatalogValue::TextArray(v) => Ok(v.clone()),
            _ => Err(type_mismatch(column, "text[]", value)),
        }
    }
}

impl<T: FromCatalogValue> FromCatalogValue for Option<T> {
    fn from_catalog_value(column: &str, value: &CatalogValue) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_catalog_value(column, value).map(Some)
        }
    }
}

/// A typed projection of one catalog row.
pub trait FromCatalogRow: Sized {
    fn from_catalog_row(row: CatalogRow) -> Result<Self>;
}

/// Runs read-only metadata queries. Rows are returned in the order the
/// database produced them.
pub trait CatalogQueryExecutor: Sync {
    fn query_catalog(
        &self,
        sql: &str,
        params: &[CatalogValue],
    ) -> impl Future<Output = Result<Vec<CatalogRow>>> + Send;
}

pub(crate) async fn fetch_rows<T: FromCatalogRow, E: CatalogQueryExecutor>(
    executor: &E,
    sql: &str,
    params: &[CatalogValue],
) -> Result<Vec<T>> {
    let rows = executor.query_catalog(sql, params).await?;

    let mut output = Vec::with_capacity(rows.len());

    for row in rows.into_iter() {
        output.push(T::from_catalog_row(row)?);
    }

    Ok(output)
}

//! User record types
//!
//! `UserRecord` is what the mapper produces from one CSV row and what the
//! loader writes; `StoredUser` is what comes back out of the `users` table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-to-string mapping used for the nested `address` and
/// `additional_info` groups.
///
/// Columns that are neither part of the name, the age nor an `address.*`
/// field accumulate in `additional_info` under their original header.
pub type FieldMap = BTreeMap<String, String>;

/// A structured user ready for persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// First and last name joined with a single space
    pub name: String,
    /// Age in years
    pub age: i32,
    /// Fields taken from `address.*` columns, prefix stripped
    #[serde(default)]
    pub address: FieldMap,
    /// Every other non-empty column, keyed by its header
    #[serde(default)]
    pub additional_info: FieldMap,
}

impl UserRecord {
    /// Create a record with empty address and additional info
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
            address: FieldMap::new(),
            additional_info: FieldMap::new(),
        }
    }

    /// JSON text for the `address` column
    pub fn address_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.address)
    }

    /// JSON text for the `additional_info` column
    pub fn additional_info_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.additional_info)
    }
}

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    /// Identity assigned on insert, restarting at 1 after every ingestion run
    pub id: i64,
    pub name: String,
    pub age: i32,
    /// Stored JSON document, `None` when the column is NULL
    pub address: Option<serde_json::Value>,
    /// Stored JSON document, `None` when the column is NULL
    pub additional_info: Option<serde_json::Value>,
}

impl StoredUser {
    /// Rebuild a stored row from column values, parsing the JSON columns
    pub fn from_columns(
        id: i64,
        name: String,
        age: i32,
        address: Option<&str>,
        additional_info: Option<&str>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id,
            name,
            age,
            address: address.map(serde_json::from_str).transpose()?,
            additional_info: additional_info.map(serde_json::from_str).transpose()?,
        })
    }
}

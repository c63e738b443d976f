//! Structure name → SNET identifier table.
//!
//! The b-file only knows structures by SNET id.  Names come from the model
//! geometry, where the id of a structure is its row in the structure
//! attribute table plus [`SNET_ID_OFFSET`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SNET_ID_OFFSET;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureLookup {
    ids: HashMap<String, i64>,
}

impl StructureLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign ids from the ordered "Connection" column of the geometry
    /// structure table.  Later duplicates win, as with a plain map insert.
    pub fn from_connection_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: names.into_iter().map(Into::into).zip(SNET_ID_OFFSET..).collect(),
        }
    }

    /// Read a JSON object of `{"name": id, …}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    /// Read a JSON array of connection names in table order.
    pub fn from_connections_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let names: Vec<String> = serde_json::from_slice(&fs::read(path)?)?;
        Ok(Self::from_connection_names(names))
    }

    pub fn insert(&mut self, name: impl Into<String>, id: i64) -> Option<i64> {
        self.ids.insert(name.into(), id)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for StructureLookup {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        Self { ids: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

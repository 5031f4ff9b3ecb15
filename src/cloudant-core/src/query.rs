use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn default_limit() -> usize {
    25
}

/// Sort direction of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// Body of a `_find` request.
///
/// The selector maps field names to either a literal (implicit equality) or
/// an operator object such as `{"$gt": 1800}`. Sort entries hold exactly one
/// field each and are sent in the order they were added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub selector: Map<String, Value>,
    #[serde(default)]
    pub sort: Vec<BTreeMap<String, SortDirection>>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            selector: Map::new(),
            sort: Vec::new(),
            limit: default_limit(),
            skip: 0,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-field sort after any existing ones
    pub fn sort(&mut self, field: impl Into<String>, ascending: bool) -> &mut Self {
        let mut entry = BTreeMap::new();
        entry.insert(field.into(), SortDirection::from_ascending(ascending));
        self.sort.push(entry);
        self
    }

    /// Add a selector criterion: a literal value or an operator object
    pub fn selector(&mut self, field: impl Into<String>, criteria: impl Into<Value>) -> &mut Self {
        self.selector.insert(field.into(), criteria.into());
        self
    }

    pub fn limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn skip(&mut self, skip: usize) -> &mut Self {
        self.skip = skip;
        self
    }

    /// Sort fields in order, with their directions
    pub fn sort_fields(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.sort
            .iter()
            .flat_map(|entry| entry.iter().map(|(field, dir)| (field.as_str(), *dir)))
    }
}

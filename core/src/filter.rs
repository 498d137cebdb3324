//! Filter translation.
//!
//! Callers describe server-side predicates as `(name, operator, value)`
//! tuples. Before a tuple goes on the wire it is checked against the
//! filter schema advertised by the manager, then encoded in the shape the
//! target endpoint expects.

use crate::error::FilterError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

/// A single predicate: `name operator value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub operator: String,
    pub value: String,
}

impl Filter {
    pub fn new(
        name: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl<A, B, C> From<(A, B, C)> for Filter
where
    A: Into<String>,
    B: Into<String>,
    C: Into<String>,
{
    fn from((name, operator, value): (A, B, C)) -> Self {
        Filter::new(name, operator, value)
    }
}

impl FromStr for Filter {
    type Err = String;

    /// Parses `name:operator:value`. The value keeps any further colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(operator), Some(value))
                if !name.is_empty() && !operator.is_empty() =>
            {
                Ok(Filter::new(name, operator, value))
            }
            _ => Err(format!("expected NAME:OPERATOR:VALUE, got '{}'", s)),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.operator, self.value)
    }
}

/// Constraints the manager places on one filter name.
#[derive(Debug, Clone, Default)]
pub struct FilterDescriptor {
    operators: BTreeSet<String>,
    choices: Option<BTreeSet<String>>,
    pattern: Option<Regex>,
}

impl FilterDescriptor {
    pub fn new<I, S>(operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operators: operators.into_iter().map(Into::into).collect(),
            choices: None,
            pattern: None,
        }
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Values must match `pattern` in full, not just contain a match.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(&format!("^(?:{})$", pattern))?);
        Ok(self)
    }

    pub fn operators(&self) -> impl Iterator<Item = &str> {
        self.operators.iter().map(String::as_str)
    }

    pub fn choices(&self) -> Option<impl Iterator<Item = &str>> {
        self.choices.as_ref().map(|c| c.iter().map(String::as_str))
    }

    pub fn allows_operator(&self, operator: &str) -> bool {
        !operator.is_empty() && self.operators.contains(operator)
    }

    pub fn allows_value(&self, value: &str) -> bool {
        if let Some(choices) = &self.choices {
            if !choices.is_empty() && !choices.contains(value) {
                return false;
            }
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(value),
            None => true,
        }
    }
}

/// Catalog of filterable names for one resource.
#[derive(Debug, Clone, Default)]
pub struct FilterSchema {
    filters: HashMap<String, FilterDescriptor>,
}

impl FilterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, descriptor: FilterDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: FilterDescriptor) {
        self.filters.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&FilterDescriptor> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a schema from a `filters/...` listing.
    ///
    /// Each entry contributes its `operators`; `control.list` becomes the
    /// choice set and `control.regex` the value pattern.
    pub fn from_listing(listing: &Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct Listing {
            #[serde(default)]
            filters: Vec<Entry>,
        }

        #[derive(Deserialize)]
        struct Entry {
            name: String,
            #[serde(default)]
            operators: Vec<String>,
            #[serde(default)]
            control: Option<Control>,
        }

        #[derive(Deserialize)]
        struct Control {
            #[serde(default)]
            list: Option<Vec<Value>>,
            #[serde(default)]
            regex: Option<String>,
        }

        let listing: Listing =
            serde_json::from_value(listing.clone()).map_err(|e| e.to_string())?;

        let mut schema = FilterSchema::new();
        for entry in listing.filters {
            let mut descriptor = FilterDescriptor::new(entry.operators);

            if let Some(control) = entry.control {
                if let Some(list) = control.list {
                    descriptor = descriptor.with_choices(list.iter().filter_map(choice_text));
                }
                if let Some(regex) = control.regex.filter(|r| !r.is_empty()) {
                    descriptor = descriptor.with_pattern(&regex).map_err(|e| {
                        format!("filter '{}' has an invalid pattern: {}", entry.name, e)
                    })?;
                }
            }

            schema.insert(entry.name, descriptor);
        }

        Ok(schema)
    }
}

fn choice_text(choice: &Value) -> Option<String> {
    match choice {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => obj.get("value").and_then(choice_text),
        _ => None,
    }
}

/// Wire shape for a set of filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterEncoding {
    /// `filter.<i>.filter`, `filter.<i>.quality`, `filter.<i>.value` query keys.
    Expanded,
    /// A `filters` list of `{filter, quality, value}` records for JSON bodies.
    List,
    /// Repeated `f=name:operator:value` query keys.
    Colon,
}

impl FilterEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterEncoding::Expanded => "expanded",
            FilterEncoding::List => "list",
            FilterEncoding::Colon => "colon",
        }
    }
}

impl std::fmt::Display for FilterEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expanded" => Ok(FilterEncoding::Expanded),
            "list" => Ok(FilterEncoding::List),
            "colon" => Ok(FilterEncoding::Colon),
            other => Err(format!("unknown filter encoding '{}'", other)),
        }
    }
}

/// How multiple filters combine on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterJoin {
    #[default]
    And,
    Or,
}

impl FilterJoin {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterJoin::And => "and",
            FilterJoin::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRecord {
    pub filter: String,
    pub quality: String,
    pub value: String,
}

/// Output of [`translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedFilters {
    Expanded(Vec<(String, String)>),
    List(Vec<FilterRecord>),
    Colon(Vec<String>),
}

impl EncodedFilters {
    pub fn encoding(&self) -> FilterEncoding {
        match self {
            EncodedFilters::Expanded(_) => FilterEncoding::Expanded,
            EncodedFilters::List(_) => FilterEncoding::List,
            EncodedFilters::Colon(_) => FilterEncoding::Colon,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            EncodedFilters::Expanded(pairs) => pairs.is_empty(),
            EncodedFilters::List(records) => records.is_empty(),
            EncodedFilters::Colon(items) => items.is_empty(),
        }
    }

    /// Query-string pairs in insertion order.
    ///
    /// `None` for the list encoding, which only has a body form (see
    /// [`EncodedFilters::to_json`]).
    pub fn query_pairs(&self) -> Option<Vec<(String, String)>> {
        match self {
            EncodedFilters::Expanded(pairs) => Some(pairs.clone()),
            EncodedFilters::Colon(items) => Some(
                items
                    .iter()
                    .map(|item| ("f".to_string(), item.clone()))
                    .collect(),
            ),
            EncodedFilters::List(_) => None,
        }
    }

    /// The encoding as a JSON object, ready to merge into a body.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            EncodedFilters::Expanded(pairs) => {
                for (key, value) in pairs {
                    map.insert(key.clone(), Value::String(value.clone()));
                }
            }
            EncodedFilters::List(records) => {
                let records = records
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "filter": r.filter,
                            "quality": r.quality,
                            "value": r.value,
                        })
                    })
                    .collect();
                map.insert("filters".to_string(), Value::Array(records));
            }
            EncodedFilters::Colon(items) => {
                let items = items.iter().cloned().map(Value::String).collect();
                map.insert("f".to_string(), Value::Array(items));
            }
        }
        map
    }
}

/// Checks one tuple against the schema.
pub fn validate(filter: &Filter, schema: &FilterSchema) -> Result<(), FilterError> {
    let descriptor = match schema.get(&filter.name) {
        Some(d) if !filter.name.is_empty() => d,
        _ => {
            return Err(FilterError::UnknownFilter {
                name: filter.name.clone(),
            })
        }
    };

    if !descriptor.allows_operator(&filter.operator) {
        return Err(FilterError::InvalidOperator {
            name: filter.name.clone(),
            operator: filter.operator.clone(),
        });
    }

    if !descriptor.allows_value(&filter.value) {
        return Err(FilterError::InvalidValue {
            name: filter.name.clone(),
            value: filter.value.clone(),
        });
    }

    Ok(())
}

/// Validates every filter, then encodes them in input order.
///
/// The first invalid filter aborts the call.
pub fn translate(
    filters: &[Filter],
    schema: &FilterSchema,
    encoding: FilterEncoding,
) -> Result<EncodedFilters, FilterError> {
    for filter in filters {
        validate(filter, schema)?;
    }

    let encoded = match encoding {
        FilterEncoding::Expanded => {
            let mut pairs = Vec::with_capacity(filters.len() * 3);
            for (i, f) in filters.iter().enumerate() {
                pairs.push((format!("filter.{}.filter", i), f.name.clone()));
                pairs.push((format!("filter.{}.quality", i), f.operator.clone()));
                pairs.push((format!("filter.{}.value", i), f.value.clone()));
            }
            EncodedFilters::Expanded(pairs)
        }
        FilterEncoding::List => EncodedFilters::List(
            filters
                .iter()
                .map(|f| FilterRecord {
                    filter: f.name.clone(),
                    quality: f.operator.clone(),
                    value: f.value.clone(),
                })
                .collect(),
        ),
        FilterEncoding::Colon => {
            EncodedFilters::Colon(filters.iter().map(Filter::to_string).collect())
        }
    };

    Ok(encoded)
}

/*!
Loading a [`Sequence`] from the JSON rows a server responds with.

```json
{
    "rows": [
        {"__id": 1, "__parent": null, "title": "Fruits"},
        {"__id": 2, "__parent": 1, "title": "Apple"}
    ]
}
```

Keys starting with `__` are reserved for the tree structure, all other keys become the fields of the row.
*/

use std::borrow::Cow;

use serde::Deserialize as _;
use serde_json::{Map, Value};

use crate::config::{Column, SortOrder, TableConfig};
use crate::error::{Error, Result};
use crate::node::{Node, RowFields};
use crate::sequence::Sequence;

/// Fields of a row loaded from JSON.
pub type JsonFields = Map<String, Value>;

const ID: &str = "__id";
const PARENT: &str = "__parent";

impl RowFields for Map<String, Value> {
    fn cell(&self, column: &str) -> Option<Cow<'_, str>> {
        match self.get(column)? {
            Value::Null => None,
            Value::String(string) => Some(Cow::Borrowed(string)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(string) => Some(string.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn malformed(message: String) -> Error<String> {
    Error::MalformedInput(message)
}

/// Convert one row into a [`Node`].
///
/// # Errors
///
/// [`Error::MalformedInput`] when the row is not an object, `__id` is missing or not a string or number,
/// or the `__parent` key is missing or not null, a string or a number.
pub fn node(row: &Value) -> Result<Node<String, JsonFields>, String> {
    let Value::Object(object) = row else {
        return Err(malformed(format!("row is not an object: {row}")));
    };

    let id = object
        .get(ID)
        .ok_or_else(|| malformed(format!("row does not have a '{ID}' field: {row}")))?;
    let id = identifier(id)
        .ok_or_else(|| malformed(format!("'{ID}' is neither a string nor a number: {row}")))?;

    let parent = match object.get(PARENT) {
        None => {
            return Err(malformed(format!(
                "row {id:?} does not have a '{PARENT}' field"
            )))
        }
        Some(Value::Null) => None,
        Some(Value::String(parent)) if parent.is_empty() => None,
        Some(parent) => Some(identifier(parent).ok_or_else(|| {
            malformed(format!(
                "'{PARENT}' of row {id:?} is neither null, a string nor a number"
            ))
        })?),
    };

    let fields = object
        .iter()
        .filter(|(key, _)| !key.starts_with("__"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Node::new(id, parent, fields))
}

/// Convert the `rows` of a response into [`Node`]s in response order.
///
/// # Errors
///
/// [`Error::MalformedInput`] when `rows` is missing or not an array, or a row is malformed.
pub fn nodes(response: &Value) -> Result<Vec<Node<String, JsonFields>>, String> {
    let rows = response
        .get("rows")
        .ok_or_else(|| malformed("response does not contain a 'rows' key".to_owned()))?
        .as_array()
        .ok_or_else(|| malformed("'rows' is not an array".to_owned()))?;
    rows.iter().map(node).collect()
}

impl Sequence<String, JsonFields> {
    /// Load and linearize a rows response.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] for malformed rows, duplicated identifiers or parent cycles.
    pub fn from_json(response: &Value) -> Result<Self, String> {
        Self::new(nodes(response)?)
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    fields: String,
    rows_url: Option<String>,
    sort_field: Option<String>,
    #[serde(default)]
    sort_order: SortOrder,
}

impl TableConfig {
    /// Read the configuration from JSON.
    ///
    /// `fields` is a list of `name:title` definitions, see [`Column::parse_list`].
    ///
    /// ```
    /// # use tree_table::TableConfig;
    /// let config = TableConfig::from_json(&serde_json::json!({
    ///     "fields": "title:Title,author:Author",
    ///     "rowsUrl": "/api/rows",
    ///     "sortField": "title",
    ///     "sortOrder": "desc"
    /// }))?;
    /// assert_eq!(config.columns().len(), 2);
    /// # Ok::<(), tree_table::Error<String>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] when the JSON does not describe a configuration.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let raw = RawConfig::deserialize(value)
            .map_err(|err| malformed(format!("invalid table configuration: {err}")))?;
        let mut config = Self::new(Column::parse_list(&raw.fields)).sort_order(raw.sort_order);
        config.rows_url = raw.rows_url;
        config.sort_field = raw.sort_field;
        Ok(config)
    }
}

#[cfg(test)]
use serde_json::json;

#[test]
fn rows_become_linearized_sequence() {
    let response = json!({
        "rows": [
            {"__id": "apple", "__parent": "fruits", "title": "Apple"},
            {"__id": "fruits", "__parent": null, "title": "Fruits"},
            {"__id": 7, "__parent": "", "title": "Seven", "count": 3}
        ]
    });
    let sequence = Sequence::from_json(&response).unwrap();
    let ids = sequence
        .iter()
        .map(|node| node.id().as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["fruits", "apple", "7"]);

    let seven = sequence.node(&"7".to_owned()).unwrap();
    assert!(seven.is_root());
    assert_eq!(seven.fields().len(), 2);
    assert_eq!(seven.fields().cell("count").as_deref(), Some("3"));
    assert_eq!(seven.fields().cell("title").as_deref(), Some("Seven"));
    assert!(!seven.fields().contains_key(ID));
}

#[test]
fn missing_rows_key() {
    let error = Sequence::from_json(&json!({"items": []})).unwrap_err();
    assert_eq!(
        error,
        Error::MalformedInput("response does not contain a 'rows' key".to_owned())
    );
}

#[test]
#[should_panic = "does not have a '__id' field"]
fn missing_id() {
    nodes(&json!({"rows": [{"__parent": null}]})).unwrap();
}

#[test]
#[should_panic = "does not have a '__parent' field"]
fn missing_parent_key() {
    nodes(&json!({"rows": [{"__id": 1}]})).unwrap();
}

#[test]
#[should_panic = "neither null, a string nor a number"]
fn parent_of_wrong_type() {
    nodes(&json!({"rows": [{"__id": 1, "__parent": [2]}]})).unwrap();
}

#[test]
fn config_from_json() {
    let config = TableConfig::from_json(&json!({
        "fields": "title:Title,author:Author",
        "rowsUrl": "/api/rows",
        "sortField": "title",
        "sortOrder": "desc"
    }))
    .unwrap();
    assert_eq!(
        config.columns(),
        [Column::new("title", "Title"), Column::new("author", "Author")]
    );
    assert_eq!(config.get_rows_url(), Some("/api/rows"));
    assert_eq!(
        config.query(),
        [("sort", "title".to_owned()), ("order", "desc".to_owned())]
    );
}

#[test]
fn config_with_invalid_sort_order() {
    let error = TableConfig::from_json(&json!({"sortOrder": "sideways"})).unwrap_err();
    assert!(matches!(error, Error::MalformedInput(_)));
}

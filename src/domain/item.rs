//! Items: identifiers, JSON payloads and nested tree nodes

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Names of the payload fields that carry structure.
///
/// Everything else in an item is opaque user data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    /// Unique identifier field (default `id`)
    pub id: String,
    /// Parent identifier field (default `parentId`)
    pub parent_id: String,
    /// Display name field (default `name`)
    pub name: String,
    /// Expansion state field (default `isOpen`)
    pub is_open: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: "id".into(),
            parent_id: "parentId".into(),
            name: "name".into(),
            is_open: "isOpen".into(),
        }
    }
}

impl FieldNames {
    /// Whether `field` may only be changed through structural operations.
    pub fn is_structural(&self, field: &str) -> bool {
        field == self.id || field == self.parent_id || field == CHILDREN
    }
}

/// Key under which nested children are serialised.
pub const CHILDREN: &str = "children";

/// Item identifier: integer or string, as found in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl ItemId {
    /// Read an identifier from a JSON value.
    ///
    /// Only integers and strings qualify; root sentinels (`0`, `""`) are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value {
            Value::Number(n) => ItemId::Int(n.as_i64()?),
            Value::String(s) => ItemId::Str(s.clone()),
            _ => return None,
        };
        (!id.is_root_sentinel()).then_some(id)
    }

    /// Parse user input: numeric text becomes an integer id.
    pub fn from_input(input: &str) -> Self {
        input
            .parse::<i64>()
            .map(ItemId::Int)
            .unwrap_or_else(|_| ItemId::Str(input.to_string()))
    }

    pub fn is_root_sentinel(&self) -> bool {
        match self {
            ItemId::Int(n) => *n == 0,
            ItemId::Str(s) => s.is_empty(),
        }
    }

    /// The "no parent" value matching this id's type.
    pub fn root_sentinel(&self) -> Value {
        match self {
            ItemId::Int(_) => Value::from(0),
            ItemId::Str(_) => Value::from(""),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ItemId::Int(n) => Value::from(*n),
            ItemId::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(n) => write!(f, "{}", n),
            ItemId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Int(value)
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        ItemId::Int(value.into())
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Str(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId::Str(value)
    }
}

/// A node's payload: a JSON object with structural fields plus user data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: Map<String, Value>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn id(&self, names: &FieldNames) -> Option<ItemId> {
        self.get(&names.id).and_then(ItemId::from_value)
    }

    /// Parent id, `None` for roots (absent, `null` or sentinel parent).
    pub fn parent_id(&self, names: &FieldNames) -> Option<ItemId> {
        self.get(&names.parent_id).and_then(ItemId::from_value)
    }

    pub fn name(&self, names: &FieldNames) -> Option<&str> {
        self.get(&names.name).and_then(Value::as_str)
    }

    /// Truthiness of a boolean field; absent or non-boolean reads as false.
    pub fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Human readable label: `name (id)`, or just the id.
    pub fn label(&self, names: &FieldNames) -> String {
        let id = self
            .id(names)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".into());
        match self.name(names) {
            Some(name) => format!("{} ({})", name, id),
            None => id,
        }
    }
}

impl From<Map<String, Value>> for Item {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Nested tree node: an item owning its ordered children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeItem {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default)]
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    pub fn new(item: Item) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeItem>) -> Self {
        self.children = children;
        self
    }

    /// Number of items in this subtree, including itself.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeItem::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Total number of items in a nested tree.
pub fn count_items(tree: &[TreeItem]) -> usize {
    tree.iter().map(TreeItem::len).sum()
}

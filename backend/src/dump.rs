use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// A kernel's variables as written to disk: a JSON array of these.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableDump {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// String-keyed children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub named: Vec<VariableDump>,
    /// Array-like children, in index order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexed: Vec<VariableDump>,
}

impl VariableDump {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn sized(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn named(mut self, children: Vec<VariableDump>) -> Self {
        self.named = children;
        self
    }

    pub fn indexed(mut self, children: Vec<VariableDump>) -> Self {
        self.indexed = children;
        self
    }
}

pub fn parse_dump(content: &str) -> Result<Vec<VariableDump>, SnapshotError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_dump(path: impl AsRef<Path>) -> Result<Vec<VariableDump>, SnapshotError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_dump(&content)
}

/// The variables the panel shows when no kernel is attached.
pub fn sample_dump() -> Vec<VariableDump> {
    let numbers = |values: &[&str]| {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| VariableDump::new(index.to_string(), *value).typed("number"))
            .collect::<Vec<_>>()
    };

    vec![
        VariableDump::new("array", "[1, 2, 3]")
            .typed("list")
            .sized("list(3)")
            .indexed(numbers(&["1", "2", "3"])),
        VariableDump::new("dictA", "{ \"a\": 1, ... }").named(vec![
            VariableDump::new("a", "1").typed("number"),
            VariableDump::new("b", "2").typed("number"),
        ]),
        VariableDump::new("df", "a, b")
            .sized("DataFrame(3, 2)")
            .indexed(vec![
                VariableDump::new("0", "1 4"),
                VariableDump::new("1", "2 5"),
                VariableDump::new("2", "3 6"),
            ]),
        VariableDump::new("number", "1").typed("number").sized("int"),
        VariableDump::new("someInstance", "SomeClass")
            .named(vec![VariableDump::new("x", "1").typed("number")]),
        VariableDump::new("string", "hello world")
            .typed("string")
            .sized("str(11)"),
    ]
}

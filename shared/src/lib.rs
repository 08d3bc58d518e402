use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod relay;

pub use config::{ConfigError, SnapshotSection, ViewConfig, ViewSection};
pub use relay::{Relay, relay};

// ===== PROVIDER PROTOCOL TYPES =====

/// Partition of a container's children requested from a provider.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariablesRequestKind {
    /// String-keyed properties.
    Named,
    /// Integer-indexed, array-like elements.
    Indexed,
}

impl VariablesRequestKind {
    pub fn as_static_str(&self) -> &'static str {
        match self {
            VariablesRequestKind::Named => "named",
            VariablesRequestKind::Indexed => "indexed",
        }
    }
}

/// A variable as reported by a provider.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Variable {
    /// The variable's name.
    pub name: String,
    /// The variable's value. Can be multi-line; structured values should use a
    /// one-line summary. An empty string shows no value.
    pub value: String,
    /// The type of the variable's value.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Size if defined for this type (array length, data frame dimensions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Opaque handle the provider uses to resolve this variable's children.
    /// Zero when the provider does not hand one out.
    #[serde(default)]
    pub variables_reference: u64,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_reference(mut self, variables_reference: u64) -> Self {
        self.variables_reference = variables_reference;
        self
    }
}

/// One item of a `get_children` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VariablesResult {
    pub variable: Variable,
    pub named_variable_count: usize,
    pub indexed_variable_count: usize,
}

impl VariablesResult {
    pub fn leaf(variable: Variable) -> Self {
        Self {
            variable,
            named_variable_count: 0,
            indexed_variable_count: 0,
        }
    }

    pub fn child_count(&self) -> usize {
        self.named_variable_count + self.indexed_variable_count
    }
}

/// Supplies root and child variables on demand. Implemented by the extension
/// side (for example a kernel bridge).
pub trait NotebookVariableProvider: Send + Sync {
    /// Fires when variables change for reasons outside the view's control,
    /// such as background tasks or interactive output widgets.
    fn on_did_change_variables(&self) -> BoxStream<'static, ()>;

    /// `parent == None` requests the root variables. Otherwise requests the
    /// `kind` children of `parent`, starting at offset `start`. A provider may
    /// answer with fewer items than the parent's count; callers page by
    /// re-requesting with a larger `start`.
    fn get_children(
        &self,
        parent: Option<&Variable>,
        kind: VariablesRequestKind,
        start: usize,
    ) -> BoxStream<'static, anyhow::Result<VariablesResult>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_json_uses_type_key() {
        let variable = Variable::new("array", "[1, 2, 3]")
            .with_type("list")
            .with_size("3");

        let json = serde_json::to_value(&variable).unwrap();
        assert_eq!(json["type"], "list");
        assert_eq!(json["size"], "3");
        assert!(json.get("type_name").is_none());
    }

    #[test]
    fn test_variable_json_optional_fields() {
        let variable: Variable = serde_json::from_str(r#"{"name":"x","value":""}"#).unwrap();
        assert_eq!(variable.name, "x");
        assert_eq!(variable.value, "");
        assert_eq!(variable.type_name, None);
        assert_eq!(variable.size, None);
        assert_eq!(variable.variables_reference, 0);
    }

    #[test]
    fn test_child_count() {
        let result = VariablesResult {
            variable: Variable::new("df", "a, b"),
            named_variable_count: 2,
            indexed_variable_count: 3,
        };
        assert_eq!(result.child_count(), 5);
        assert_eq!(VariablesResult::leaf(Variable::new("n", "1")).child_count(), 0);
    }
}

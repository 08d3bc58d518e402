//! Immutable variable snapshot model.
//!
//! A [`NotebookVariableSession`] and its [`NotebookVariable`] graph are built
//! once per snapshot and never patched. Refreshing means building a new graph
//! and handing it to the tree as its new input, so the graph can be read from
//! any number of in-flight renders and fetches without coordination.

use std::sync::Arc;

use crate::error::{Result, VariablesError};

/// One named value node of the inspected state.
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookVariable {
    name: String,
    metadata: String,
    type_name: Option<String>,
    value: String,
    children: Vec<Arc<NotebookVariable>>,
    has_children: bool,
}

impl NotebookVariable {
    /// A variable without children. An empty `type_name` means no type.
    pub fn new(
        name: impl Into<String>,
        metadata: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::with_children(name, metadata, type_name, value, Vec::new())
    }

    pub fn with_children(
        name: impl Into<String>,
        metadata: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
        children: Vec<NotebookVariable>,
    ) -> Self {
        let type_name = type_name.into();
        let children: Vec<_> = children.into_iter().map(Arc::new).collect();
        Self {
            name: name.into(),
            metadata: metadata.into(),
            type_name: (!type_name.is_empty()).then_some(type_name),
            value: value.into(),
            has_children: !children.is_empty(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text annotation shown beside the name, e.g. `list(3)`.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Identity among siblings. Callers keep names unique per parent.
    pub fn get_id(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Arc<NotebookVariable>] {
        &self.children
    }

    /// Resolves to the children fixed at construction; performs no I/O.
    pub async fn get_children(&self) -> Vec<Arc<NotebookVariable>> {
        self.children.clone()
    }

    /// Deferred child computation for expensive values. No provider supports
    /// it yet.
    pub async fn evaluate_lazy(&self) -> Result<()> {
        Err(VariablesError::NotImplemented("evaluate_lazy"))
    }
}

/// Root sentinel holding the top-level variables of one snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotebookVariableSession {
    children: Vec<Arc<NotebookVariable>>,
}

impl NotebookVariableSession {
    pub fn new(children: Vec<NotebookVariable>) -> Self {
        Self {
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn children(&self) -> &[Arc<NotebookVariable>] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Anything the data source can be asked about.
#[derive(Debug, Clone)]
pub enum VariableNode {
    Session(Arc<NotebookVariableSession>),
    Variable(Arc<NotebookVariable>),
}

impl From<Arc<NotebookVariableSession>> for VariableNode {
    fn from(session: Arc<NotebookVariableSession>) -> Self {
        VariableNode::Session(session)
    }
}

impl From<Arc<NotebookVariable>> for VariableNode {
    fn from(variable: Arc<NotebookVariable>) -> Self {
        VariableNode::Variable(variable)
    }
}

/// The six variables the view shows when no kernel has reported any.
pub fn sample_session() -> NotebookVariableSession {
    NotebookVariableSession::new(vec![
        NotebookVariable::with_children(
            "array",
            "list(3)",
            "list",
            "[1, 2, 3]",
            vec![
                NotebookVariable::new("0", "", "number", "1"),
                NotebookVariable::new("1", "", "number", "2"),
                NotebookVariable::new("2", "", "number", "3"),
            ],
        ),
        NotebookVariable::with_children(
            "dictA",
            "",
            "",
            "{ \"a\": 1, ... }",
            vec![
                NotebookVariable::new("a", "", "number", "1"),
                NotebookVariable::new("b", "", "number", "2"),
            ],
        ),
        NotebookVariable::with_children(
            "df",
            "DataFrame(3, 2)",
            "",
            "a, b",
            vec![
                NotebookVariable::new("0", "", "", "1 4"),
                NotebookVariable::new("1", "", "", "2 5"),
                NotebookVariable::new("2", "", "", "3 6"),
            ],
        ),
        NotebookVariable::new("number", "int", "number", "1"),
        NotebookVariable::with_children(
            "someInstance",
            "",
            "",
            "SomeClass",
            vec![NotebookVariable::new("x", "", "number", "1")],
        ),
        NotebookVariable::new("string", "str(11)", "string", "hello world"),
    ])
}

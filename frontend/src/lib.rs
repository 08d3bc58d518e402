//! Notebook variables side panel.
//!
//! Shows a notebook kernel's variables as a lazily expanded tree:
//!
//! - [`entities`] - the immutable snapshot graph ([`NotebookVariableSession`],
//!   [`NotebookVariable`])
//! - [`data_source`] - answers the tree's child queries
//! - [`renderer`] / [`value_format`] - fill recycled row templates
//! - [`accessibility`] - row and widget labels
//! - [`tree`] - the tree widget seam plus a headless implementation
//! - [`view_pane`] - owns the tree and the current snapshot
//! - [`snapshot`] - collects snapshots from an extension's variable provider

pub mod accessibility;
pub mod data_source;
pub mod entities;
pub mod error;
pub mod lifecycle;
pub mod renderer;
pub mod snapshot;
pub mod tree;
pub mod value_format;
pub mod view_pane;

pub use accessibility::{AccessibilityProvider, NotebookVariablesAccessibilityProvider};
pub use data_source::{AsyncDataSource, NotebookVariablesDataSource};
pub use entities::{NotebookVariable, NotebookVariableSession, VariableNode, sample_session};
pub use error::{Result, VariablesError};
pub use lifecycle::DisposableStore;
pub use renderer::{ExpressionTemplate, Label, RenderedRow, TreeRenderer, VariablesRenderer};
pub use snapshot::{NotebookController, collect_session};
pub use tree::{BoundRow, HeadlessTree, NodePath, TreeParts, TreeWidget};
pub use value_format::{DebugValueFormatter, RenderValueOptions, ValueField, ValueFormatter, ValueKind};
pub use view_pane::{
    NOTEBOOK_VARIABLES_PANEL_ID, NOTEBOOK_VARIABLES_VIEW_ID, NotebookVariablesDelegate,
    NotebookVariablesViewPane,
};

use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;

use crate::entities::{NotebookVariable, VariableNode};
use crate::error::Result;

/// Lazily answers a tree's questions about a node's children.
///
/// `get_children` is future-returning so that sources backed by an
/// out-of-process kernel can fetch without blocking the caller. Failures are
/// returned to the tree unchanged.
pub trait AsyncDataSource: Send + Sync {
    fn has_children(&self, element: &VariableNode) -> bool;

    fn get_children(
        &self,
        element: &VariableNode,
    ) -> BoxFuture<'static, Result<Vec<Arc<NotebookVariable>>>>;
}

/// Data source over an in-memory snapshot graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotebookVariablesDataSource;

impl AsyncDataSource for NotebookVariablesDataSource {
    fn has_children(&self, element: &VariableNode) -> bool {
        match element {
            // Always expandable so an empty session can show its empty state.
            VariableNode::Session(_) => true,
            VariableNode::Variable(variable) => variable.has_children(),
        }
    }

    fn get_children(
        &self,
        element: &VariableNode,
    ) -> BoxFuture<'static, Result<Vec<Arc<NotebookVariable>>>> {
        match element {
            VariableNode::Session(session) => {
                let children = session.children().to_vec();
                async move { Ok(children) }.boxed()
            }
            VariableNode::Variable(variable) => {
                let variable = Arc::clone(variable);
                async move { Ok(variable.get_children().await) }.boxed()
            }
        }
    }
}

//! Turning a provider's paginated answers into an immutable snapshot.
//!
//! The whole graph is collected up front, down to `max_depth`, so the tree
//! never talks to the provider directly. Each request kind is paged by
//! re-requesting with `start` set to the number of items received so far.

use futures::FutureExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use shared::{NotebookVariableProvider, SnapshotSection, Variable, VariablesRequestKind, VariablesResult};
use std::sync::Arc;

use crate::entities::{NotebookVariable, NotebookVariableSession};
use crate::error::Result;

/// The notebook-side handle an extension attaches its provider to.
#[derive(Clone, Default)]
pub struct NotebookController {
    pub variable_provider: Option<Arc<dyn NotebookVariableProvider>>,
}

impl NotebookController {
    pub fn new(variable_provider: Arc<dyn NotebookVariableProvider>) -> Self {
        Self {
            variable_provider: Some(variable_provider),
        }
    }

    /// Collect a snapshot, or an empty session when no provider is attached.
    pub async fn collect_session(&self, limits: &SnapshotSection) -> Result<NotebookVariableSession> {
        match &self.variable_provider {
            Some(provider) => collect_session(provider.as_ref(), limits).await,
            None => Ok(NotebookVariableSession::default()),
        }
    }
}

impl std::fmt::Debug for NotebookController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotebookController")
            .field("has_variable_provider", &self.variable_provider.is_some())
            .finish()
    }
}

/// Build a new session graph from `provider`. Any provider error aborts the
/// collection and is returned unchanged.
pub async fn collect_session(
    provider: &dyn NotebookVariableProvider,
    limits: &SnapshotSection,
) -> Result<NotebookVariableSession> {
    let roots = fetch_kind(provider, None, VariablesRequestKind::Named, None, limits.max_children).await?;

    let mut children = Vec::with_capacity(roots.len());
    for root in roots {
        children.push(collect_variable(provider, root, 0, limits).await?);
    }
    log::debug!("collected {} root variables", children.len());
    Ok(NotebookVariableSession::new(children))
}

fn collect_variable<'a>(
    provider: &'a dyn NotebookVariableProvider,
    result: VariablesResult,
    depth: usize,
    limits: &'a SnapshotSection,
) -> BoxFuture<'a, Result<NotebookVariable>> {
    async move {
        let mut children = Vec::new();
        if depth < limits.max_depth {
            for (kind, count) in [
                (VariablesRequestKind::Named, result.named_variable_count),
                (VariablesRequestKind::Indexed, result.indexed_variable_count),
            ] {
                if count == 0 {
                    continue;
                }
                let fetched = fetch_kind(
                    provider,
                    Some(&result.variable),
                    kind,
                    Some(count),
                    limits.max_children,
                )
                .await?;
                for child in fetched {
                    children.push(collect_variable(provider, child, depth + 1, limits).await?);
                }
            }
        }

        let Variable {
            name,
            value,
            type_name,
            size,
            ..
        } = result.variable;
        Ok(NotebookVariable::with_children(
            name,
            size.unwrap_or_default(),
            type_name.unwrap_or_default(),
            value,
            children,
        ))
    }
    .boxed()
}

/// Page through one kind of children. With `expected == None` (roots) paging
/// continues until a page comes back empty. Stops early on an empty page
/// either way.
async fn fetch_kind(
    provider: &dyn NotebookVariableProvider,
    parent: Option<&Variable>,
    kind: VariablesRequestKind,
    expected: Option<usize>,
    max_children: usize,
) -> Result<Vec<VariablesResult>> {
    let target = expected.map_or(max_children, |expected| expected.min(max_children));
    let mut results = Vec::new();

    loop {
        let start = results.len();
        let mut page = provider.get_children(parent, kind, start);
        while let Some(item) = page.next().await {
            results.push(item?);
            if results.len() >= target {
                break;
            }
        }

        let received = results.len() - start;
        log::debug!(
            "fetched {} {} variables of {} from offset {}",
            received,
            kind.as_static_str(),
            parent.map_or("<root>", |parent| parent.name.as_str()),
            start
        );

        if results.len() >= target {
            break;
        }
        if received == 0 {
            if expected.is_some() {
                log::debug!(
                    "provider returned {} of {} {} variables",
                    results.len(),
                    target,
                    kind.as_static_str()
                );
            }
            break;
        }
    }

    results.truncate(target);
    Ok(results)
}

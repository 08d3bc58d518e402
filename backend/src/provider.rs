//! Variable provider serving a [`VariableDump`] in pages.
//!
//! Every dumped variable gets a `variables_reference` made of the dump's
//! generation (upper 32 bits) and its arena slot plus one (lower 32 bits).
//! Replacing the dump bumps the generation, so references handed out for an
//! older dump are rejected instead of resolving to unrelated variables.

use anyhow::anyhow;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use shared::{NotebookVariableProvider, Relay, Variable, VariablesRequestKind, VariablesResult};
use std::sync::{PoisonError, RwLock};

use crate::dump::VariableDump;

pub const DEFAULT_PAGE_SIZE: usize = 100;

struct ArenaNode {
    variable: Variable,
    named: Vec<usize>,
    indexed: Vec<usize>,
}

struct Arena {
    generation: u32,
    roots: Vec<usize>,
    nodes: Vec<ArenaNode>,
}

impl Arena {
    fn build(dump: &[VariableDump], generation: u32) -> Self {
        let mut arena = Self {
            generation,
            roots: Vec::new(),
            nodes: Vec::new(),
        };
        let roots = dump.iter().map(|variable| arena.insert(variable)).collect();
        arena.roots = roots;
        arena
    }

    fn insert(&mut self, dump: &VariableDump) -> usize {
        let named = dump.named.iter().map(|child| self.insert(child)).collect();
        let indexed = dump.indexed.iter().map(|child| self.insert(child)).collect();
        let index = self.nodes.len();
        let variable = Variable {
            name: dump.name.clone(),
            value: dump.value.clone(),
            type_name: dump.type_name.clone(),
            size: dump.size.clone(),
            variables_reference: self.reference(index),
        };
        self.nodes.push(ArenaNode {
            variable,
            named,
            indexed,
        });
        index
    }

    fn reference(&self, index: usize) -> u64 {
        (u64::from(self.generation) << 32) | (index as u64 + 1)
    }

    fn resolve(&self, reference: u64) -> Option<&ArenaNode> {
        let generation = (reference >> 32) as u32;
        let slot = (reference & 0xffff_ffff) as usize;
        if generation != self.generation || slot == 0 {
            return None;
        }
        self.nodes.get(slot - 1)
    }

    fn result(&self, index: usize) -> VariablesResult {
        let node = &self.nodes[index];
        VariablesResult {
            variable: node.variable.clone(),
            named_variable_count: node.named.len(),
            indexed_variable_count: node.indexed.len(),
        }
    }
}

pub struct SnapshotVariableProvider {
    arena: RwLock<Arena>,
    page_size: usize,
    variables_changed_relay: Relay<()>,
}

impl SnapshotVariableProvider {
    pub fn new(dump: Vec<VariableDump>) -> Self {
        Self::with_page_size(dump, DEFAULT_PAGE_SIZE)
    }

    /// A `page_size` of zero is treated as one.
    pub fn with_page_size(dump: Vec<VariableDump>, page_size: usize) -> Self {
        Self {
            arena: RwLock::new(Arena::build(&dump, 0)),
            page_size: page_size.max(1),
            variables_changed_relay: Relay::new(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Swap in a new dump and tell subscribers the variables changed.
    pub fn replace(&self, dump: Vec<VariableDump>) {
        {
            let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
            let generation = arena.generation.wrapping_add(1);
            *arena = Arena::build(&dump, generation);
            log::info!(
                "variable snapshot replaced: {} roots, generation {}",
                arena.roots.len(),
                generation
            );
        }
        self.variables_changed_relay.send(());
    }
}

impl NotebookVariableProvider for SnapshotVariableProvider {
    fn on_did_change_variables(&self) -> BoxStream<'static, ()> {
        self.variables_changed_relay.subscribe().boxed()
    }

    fn get_children(
        &self,
        parent: Option<&Variable>,
        kind: VariablesRequestKind,
        start: usize,
    ) -> BoxStream<'static, anyhow::Result<VariablesResult>> {
        let arena = self.arena.read().unwrap_or_else(PoisonError::into_inner);
        let ids: &[usize] = match (parent, kind) {
            (None, VariablesRequestKind::Named) => &arena.roots,
            (None, VariablesRequestKind::Indexed) => &[],
            (Some(parent), kind) => match arena.resolve(parent.variables_reference) {
                Some(node) if kind == VariablesRequestKind::Named => &node.named,
                Some(node) => &node.indexed,
                None => {
                    let error = anyhow!(
                        "unknown or stale variable reference {:#x} for '{}'",
                        parent.variables_reference,
                        parent.name
                    );
                    return stream::iter([Err(error)]).boxed();
                }
            },
        };

        let page: Vec<_> = ids
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&index| Ok(arena.result(index)))
            .collect();
        stream::iter(page).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::sample_dump;
    use notebook_variables::{collect_session, sample_session};
    use shared::SnapshotSection;

    async fn collect(
        provider: &SnapshotVariableProvider,
        parent: Option<&Variable>,
        kind: VariablesRequestKind,
        start: usize,
    ) -> Vec<anyhow::Result<VariablesResult>> {
        provider.get_children(parent, kind, start).collect().await
    }

    fn long_list(length: usize) -> Vec<VariableDump> {
        vec![VariableDump::new("values", "[...]").indexed(
            (0..length)
                .map(|index| VariableDump::new(index.to_string(), index.to_string()))
                .collect(),
        )]
    }

    #[tokio::test]
    async fn test_roots_and_counts() {
        let provider = SnapshotVariableProvider::new(sample_dump());
        let roots = collect(&provider, None, VariablesRequestKind::Named, 0).await;

        assert_eq!(roots.len(), 6);
        let array = roots[0].as_ref().unwrap();
        assert_eq!(array.variable.name, "array");
        assert_eq!(array.named_variable_count, 0);
        assert_eq!(array.indexed_variable_count, 3);
        let dict = roots[1].as_ref().unwrap();
        assert_eq!(dict.named_variable_count, 2);

        assert!(collect(&provider, None, VariablesRequestKind::Indexed, 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_children_are_paged() {
        let provider = SnapshotVariableProvider::with_page_size(long_list(5), 2);
        let roots = collect(&provider, None, VariablesRequestKind::Named, 0).await;
        let values = roots[0].as_ref().unwrap().variable.clone();

        let names = |page: Vec<anyhow::Result<VariablesResult>>| -> Vec<String> {
            page.into_iter().map(|item| item.unwrap().variable.name).collect()
        };
        assert_eq!(
            names(collect(&provider, Some(&values), VariablesRequestKind::Indexed, 0).await),
            ["0", "1"]
        );
        assert_eq!(
            names(collect(&provider, Some(&values), VariablesRequestKind::Indexed, 4).await),
            ["4"]
        );
        assert!(collect(&provider, Some(&values), VariablesRequestKind::Indexed, 9).await.is_empty());
        assert!(collect(&provider, Some(&values), VariablesRequestKind::Named, 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_notifies_and_invalidates_references() {
        let provider = SnapshotVariableProvider::new(long_list(3));
        let mut changes = provider.on_did_change_variables();
        let roots = collect(&provider, None, VariablesRequestKind::Named, 0).await;
        let stale = roots[0].as_ref().unwrap().variable.clone();

        provider.replace(long_list(1));

        assert_eq!(changes.next().await, Some(()));
        let page = collect(&provider, Some(&stale), VariablesRequestKind::Indexed, 0).await;
        assert_eq!(page.len(), 1);
        assert!(page[0].as_ref().unwrap_err().to_string().contains("stale"));
    }

    #[tokio::test]
    async fn test_zero_reference_is_rejected() {
        let provider = SnapshotVariableProvider::new(sample_dump());
        let orphan = Variable::new("orphan", "");
        let page = collect(&provider, Some(&orphan), VariablesRequestKind::Named, 0).await;
        assert!(page[0].is_err());
    }

    #[tokio::test]
    async fn test_sample_dump_collects_into_sample_session() {
        let provider = SnapshotVariableProvider::with_page_size(sample_dump(), 2);
        let session = collect_session(&provider, &SnapshotSection::default())
            .await
            .unwrap();
        assert_eq!(session, sample_session());
    }
}

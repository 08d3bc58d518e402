//! Tree widget seam and an in-process implementation of it.
//!
//! [`TreeWidget`] is what the view pane drives. [`HeadlessTree`] implements
//! it without a display: it pulls children through the data source as nodes
//! are expanded, keeps expansion state by id path across inputs, and binds
//! the rows inside the current viewport through the renderer, recycling row
//! templates between binds.

use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexSet;
use std::sync::Arc;

use crate::accessibility::AccessibilityProvider;
use crate::data_source::AsyncDataSource;
use crate::entities::{NotebookVariable, NotebookVariableSession, VariableNode};
use crate::error::{Result, VariablesError};
use crate::renderer::{ExpressionTemplate, TreeRenderer, VariablesRenderer};
use crate::view_pane::NotebookVariablesDelegate;

/// Ids from a root variable down to a node.
pub type NodePath = Vec<String>;

/// The tree the view pane owns.
pub trait TreeWidget: Send {
    /// Show a new root. Resolves once the root's children are loaded.
    fn set_input(&mut self, root: Arc<NotebookVariableSession>) -> BoxFuture<'_, Result<()>>;

    fn layout(&mut self, width: f64, height: f64);
}

/// Everything a tree is built from.
pub struct TreeParts {
    pub user: &'static str,
    pub delegate: NotebookVariablesDelegate,
    pub renderer: VariablesRenderer,
    pub data_source: Arc<dyn AsyncDataSource>,
    pub accessibility_provider: Arc<dyn AccessibilityProvider>,
}

struct TreeEntry {
    element: Arc<NotebookVariable>,
    path: NodePath,
    /// `None` until fetched.
    children: Option<Vec<TreeEntry>>,
    error: Option<String>,
}

impl TreeEntry {
    fn new(element: Arc<NotebookVariable>, parent: &[String]) -> Self {
        let mut path = parent.to_vec();
        path.push(element.get_id().to_string());
        Self {
            element,
            path,
            children: None,
            error: None,
        }
    }
}

fn entries_for(children: Vec<Arc<NotebookVariable>>, parent: &[String]) -> Vec<TreeEntry> {
    children
        .into_iter()
        .map(|child| TreeEntry::new(child, parent))
        .collect()
}

// Duplicate sibling ids resolve to the first match.
fn find_entry<'a>(entries: &'a [TreeEntry], path: &[String]) -> Option<&'a TreeEntry> {
    let (first, rest) = path.split_first()?;
    let entry = entries.iter().find(|entry| entry.element.get_id() == first)?;
    if rest.is_empty() {
        Some(entry)
    } else {
        find_entry(entry.children.as_deref()?, rest)
    }
}

fn find_entry_mut<'a>(entries: &'a mut [TreeEntry], path: &[String]) -> Option<&'a mut TreeEntry> {
    let (first, rest) = path.split_first()?;
    let entry = entries
        .iter_mut()
        .find(|entry| entry.element.get_id() == first)?;
    if rest.is_empty() {
        Some(entry)
    } else {
        find_entry_mut(entry.children.as_deref_mut()?, rest)
    }
}

fn load_expanded<'a>(
    data_source: &'a dyn AsyncDataSource,
    expanded: &'a IndexSet<NodePath>,
    entries: &'a mut [TreeEntry],
    user: &'static str,
    first_error: &'a mut Option<VariablesError>,
) -> BoxFuture<'a, ()> {
    async move {
        for entry in entries.iter_mut() {
            if entry.error.is_some() || !expanded.contains(&entry.path) {
                continue;
            }
            if entry.children.is_none() {
                let node = VariableNode::Variable(Arc::clone(&entry.element));
                if !data_source.has_children(&node) {
                    continue;
                }
                match data_source.get_children(&node).await {
                    Ok(children) => entry.children = Some(entries_for(children, &entry.path)),
                    Err(error) => {
                        log::warn!("[{}] failed to load children of {:?}: {}", user, entry.path, error);
                        entry.error = Some(error.to_string());
                        first_error.get_or_insert(error);
                        continue;
                    }
                }
            }
            if let Some(children) = entry.children.as_deref_mut() {
                load_expanded(data_source, expanded, children, user, first_error).await;
            }
        }
    }
    .boxed()
}

/// Whether `path` names a variable that is known to be gone. Paths below a
/// node whose children are not loaded are not stale.
fn is_stale(entries: &[TreeEntry], path: &[String]) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return false;
    };
    match entries.iter().find(|entry| entry.element.get_id() == first) {
        None => true,
        Some(_) if rest.is_empty() => false,
        Some(entry) => entry
            .children
            .as_deref()
            .is_some_and(|children| is_stale(children, rest)),
    }
}

/// A bound, visible row.
#[derive(Debug)]
pub struct BoundRow {
    pub element: Arc<NotebookVariable>,
    pub path: NodePath,
    pub depth: usize,
    pub collapsible: bool,
    pub expanded: bool,
    pub error: Option<String>,
    pub aria_label: String,
    pub template: ExpressionTemplate,
}

impl BoundRow {
    pub fn line(&self) -> String {
        let twistie = match (self.collapsible, self.expanded) {
            (false, _) => "  ",
            (true, false) => "▸ ",
            (true, true) => "▾ ",
        };
        let row = &self.template.row;
        let mut line = format!(
            "{}{}{}{}",
            "  ".repeat(self.depth),
            twistie,
            row.name.text,
            row.metadata.text
        );
        if !row.value.text.is_empty() {
            line.push(' ');
            line.push_str(&row.value.text);
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" (error: {error})"));
        }
        line
    }
}

pub struct HeadlessTree {
    user: &'static str,
    delegate: NotebookVariablesDelegate,
    renderer: VariablesRenderer,
    data_source: Arc<dyn AsyncDataSource>,
    accessibility_provider: Arc<dyn AccessibilityProvider>,
    input: Option<Arc<NotebookVariableSession>>,
    input_error: Option<String>,
    roots: Vec<TreeEntry>,
    expanded: IndexSet<NodePath>,
    viewport: Option<(f64, f64)>,
    scroll_top: usize,
    rows: Vec<BoundRow>,
    spare_templates: Vec<ExpressionTemplate>,
}

impl HeadlessTree {
    pub fn new(parts: TreeParts) -> Self {
        Self {
            user: parts.user,
            delegate: parts.delegate,
            renderer: parts.renderer,
            data_source: parts.data_source,
            accessibility_provider: parts.accessibility_provider,
            input: None,
            input_error: None,
            roots: Vec::new(),
            expanded: IndexSet::new(),
            viewport: None,
            scroll_top: 0,
            rows: Vec::new(),
            spare_templates: Vec::new(),
        }
    }

    pub fn user(&self) -> &'static str {
        self.user
    }

    pub fn input(&self) -> Option<&Arc<NotebookVariableSession>> {
        self.input.as_ref()
    }

    /// Failure message from the last root fetch, if it failed.
    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn widget_aria_label(&self) -> String {
        self.accessibility_provider.widget_aria_label()
    }

    pub fn rows(&self) -> &[BoundRow] {
        &self.rows
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(BoundRow::line).collect()
    }

    /// The loaded variable at `path`, whether or not it is visible.
    pub fn element_at(&self, path: &[String]) -> Option<&Arc<NotebookVariable>> {
        find_entry(&self.roots, path).map(|entry| &entry.element)
    }

    pub fn is_expanded(&self, path: &[String]) -> bool {
        self.expanded.contains(path)
    }

    /// Rows that would be shown with an unbounded viewport.
    pub fn visible_row_count(&self) -> usize {
        let mut count = 0;
        self.walk_visible(&self.roots, 0, &mut |_, _, _| count += 1);
        count
    }

    pub fn set_scroll_top(&mut self, row_index: usize) {
        self.scroll_top = row_index;
        self.bind_rows();
    }

    /// Expand a node, fetching its children on first expansion. Returns
    /// `false` when the node is unknown or cannot have children.
    pub async fn expand(&mut self, path: &[String]) -> Result<bool> {
        let Some(entry) = find_entry_mut(&mut self.roots, path) else {
            return Ok(false);
        };
        let node = VariableNode::Variable(Arc::clone(&entry.element));
        if !self.data_source.has_children(&node) {
            return Ok(false);
        }
        // An explicit expand retries a failed fetch.
        entry.error = None;

        self.expanded.insert(path.to_vec());
        let result = self.load_pending().await;
        self.bind_rows();
        result.map(|()| true)
    }

    /// Returns whether the node was expanded.
    pub fn collapse(&mut self, path: &[String]) -> bool {
        let removed = self.expanded.shift_remove(path);
        if removed {
            self.bind_rows();
        }
        removed
    }

    /// Expand every node that can have children, fetching as needed.
    pub async fn expand_all(&mut self) -> Result<()> {
        let mut first_error = None;
        loop {
            let mut collapsed = Vec::new();
            self.collect_collapsed(&self.roots, &mut collapsed);
            if collapsed.is_empty() {
                break;
            }
            self.expanded.extend(collapsed);
            if let Err(error) = self.load_pending().await {
                first_error.get_or_insert(error);
            }
        }
        self.bind_rows();
        first_error.map_or(Ok(()), Err)
    }

    fn collect_collapsed(&self, entries: &[TreeEntry], collapsed: &mut Vec<NodePath>) {
        for entry in entries {
            if entry.error.is_some() {
                continue;
            }
            if !self.expanded.contains(&entry.path)
                && self
                    .data_source
                    .has_children(&VariableNode::Variable(Arc::clone(&entry.element)))
            {
                collapsed.push(entry.path.clone());
            }
            if let Some(children) = &entry.children {
                self.collect_collapsed(children, collapsed);
            }
        }
    }

    /// Fetch children for every expanded node that has none loaded yet.
    async fn load_pending(&mut self) -> Result<()> {
        let mut first_error = None;
        let data_source = Arc::clone(&self.data_source);
        load_expanded(
            data_source.as_ref(),
            &self.expanded,
            &mut self.roots,
            self.user,
            &mut first_error,
        )
        .await;
        first_error.map_or(Ok(()), Err)
    }

    fn walk_visible<'a>(
        &self,
        entries: &'a [TreeEntry],
        depth: usize,
        visit: &mut dyn FnMut(&'a TreeEntry, usize, bool),
    ) {
        for entry in entries {
            let expanded = self.expanded.contains(&entry.path);
            visit(entry, depth, expanded);
            if expanded {
                if let Some(children) = &entry.children {
                    self.walk_visible(children, depth + 1, visit);
                }
            }
        }
    }

    fn visible_capacity(&self) -> usize {
        match self.viewport {
            Some((_, height)) if height > 0.0 => {
                (height / f64::from(self.delegate.row_height())).ceil() as usize
            }
            Some(_) => 0,
            None => usize::MAX,
        }
    }

    fn bind_rows(&mut self) {
        self.unbind_rows();

        let mut visible = Vec::new();
        self.walk_visible(&self.roots, 0, &mut |entry, depth, expanded| {
            visible.push((
                Arc::clone(&entry.element),
                entry.path.clone(),
                depth,
                expanded,
                entry.error.clone(),
            ));
        });

        let capacity = self.visible_capacity();
        let first = self.scroll_top;
        for (offset, (element, path, depth, expanded, error)) in
            visible.into_iter().skip(first).take(capacity).enumerate()
        {
            let index = first + offset;
            let mut template = self
                .spare_templates
                .pop()
                .unwrap_or_else(|| self.renderer.render_template());
            self.renderer.render_element(&element, index, &mut template);
            let collapsible = self
                .data_source
                .has_children(&VariableNode::Variable(Arc::clone(&element)));
            let aria_label = self.accessibility_provider.aria_label(&element);
            self.rows.push(BoundRow {
                element,
                path,
                depth,
                collapsible,
                expanded,
                error,
                aria_label,
                template,
            });
        }
    }

    fn unbind_rows(&mut self) {
        let first = self.scroll_top;
        for (offset, mut row) in self.rows.drain(..).enumerate() {
            self.renderer
                .dispose_element(&row.element, first + offset, &mut row.template);
            self.spare_templates.push(row.template);
        }
    }

    fn dispose(&mut self) {
        self.unbind_rows();
        for template in self.spare_templates.drain(..) {
            self.renderer.dispose_template(template);
        }
    }
}

impl TreeWidget for HeadlessTree {
    fn set_input(&mut self, root: Arc<NotebookVariableSession>) -> BoxFuture<'_, Result<()>> {
        async move {
            log::debug!("[{}] set_input with {} roots", self.user, root.children().len());
            let fetched = self
                .data_source
                .get_children(&VariableNode::Session(Arc::clone(&root)))
                .await;
            self.input = Some(root);

            let result = match fetched {
                Ok(children) => {
                    self.input_error = None;
                    self.roots = entries_for(children, &[]);
                    let loaded = self.load_pending().await;
                    let roots = &self.roots;
                    self.expanded.retain(|path| !is_stale(roots, path));
                    loaded
                }
                Err(error) => {
                    self.input_error = Some(error.to_string());
                    self.roots.clear();
                    Err(error)
                }
            };
            self.bind_rows();
            result
        }
        .boxed()
    }

    fn layout(&mut self, width: f64, height: f64) {
        log::debug!("[{}] layout {}x{}", self.user, width, height);
        self.viewport = Some((width, height));
        self.bind_rows();
    }
}

impl Drop for HeadlessTree {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for HeadlessTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessTree")
            .field("user", &self.user)
            .field("roots", &self.roots.len())
            .field("expanded", &self.expanded)
            .field("viewport", &self.viewport)
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}

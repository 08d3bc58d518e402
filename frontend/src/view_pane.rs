use futures::StreamExt;
use shared::{NotebookVariableProvider, ViewConfig, ViewSection};
use std::sync::Arc;

use crate::accessibility::NotebookVariablesAccessibilityProvider;
use crate::data_source::NotebookVariablesDataSource;
use crate::entities::{NotebookVariable, NotebookVariableSession};
use crate::error::{Result, VariablesError};
use crate::renderer::VariablesRenderer;
use crate::snapshot::collect_session;
use crate::tree::{TreeParts, TreeWidget};
use crate::value_format::{DebugValueFormatter, RenderValueOptions, ValueFormatter};

pub const NOTEBOOK_VARIABLES_PANEL_ID: &str = "workbench.panel.notebookVariables";
pub const NOTEBOOK_VARIABLES_VIEW_ID: &str = "workbench.panel.notebookVariables.view";

/// Row sizing and template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotebookVariablesDelegate {
    row_height: u32,
}

impl NotebookVariablesDelegate {
    pub fn new(row_height: u32) -> Self {
        Self { row_height }
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn get_height(&self, _element: &NotebookVariable) -> u32 {
        self.row_height
    }

    pub fn get_template_id(&self, _element: &NotebookVariable) -> &'static str {
        VariablesRenderer::ID
    }
}

impl Default for NotebookVariablesDelegate {
    fn default() -> Self {
        Self::new(ViewSection::DEFAULT_ROW_HEIGHT)
    }
}

/// Side-panel view owning the variables tree and the snapshot it shows.
pub struct NotebookVariablesViewPane<W: TreeWidget> {
    config: ViewConfig,
    formatter: Arc<dyn ValueFormatter>,
    tree: Option<W>,
    session: Option<Arc<NotebookVariableSession>>,
    size: Option<(f64, f64)>,
}

impl<W: TreeWidget> NotebookVariablesViewPane<W> {
    pub fn new(config: ViewConfig) -> Self {
        Self::with_formatter(config, Arc::new(DebugValueFormatter))
    }

    pub fn with_formatter(config: ViewConfig, formatter: Arc<dyn ValueFormatter>) -> Self {
        Self {
            config,
            formatter,
            tree: None,
            session: None,
            size: None,
        }
    }

    /// Build the tree. Called once; later calls keep the existing tree.
    pub fn render_body<F>(&mut self, create_tree: F) -> &mut W
    where
        F: FnOnce(TreeParts) -> W,
    {
        let config = &self.config;
        let formatter = &self.formatter;
        let size = self.size;
        self.tree.get_or_insert_with(|| {
            let parts = TreeParts {
                user: "NotebookVariables",
                delegate: NotebookVariablesDelegate::new(config.view.row_height),
                renderer: VariablesRenderer::new(
                    Arc::clone(formatter),
                    RenderValueOptions::from(&config.view),
                ),
                data_source: Arc::new(NotebookVariablesDataSource),
                accessibility_provider: Arc::new(NotebookVariablesAccessibilityProvider),
            };
            let mut tree = create_tree(parts);
            if let Some((width, height)) = size {
                tree.layout(width, height);
            }
            tree
        })
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn tree(&self) -> Option<&W> {
        self.tree.as_ref()
    }

    pub fn tree_mut(&mut self) -> Option<&mut W> {
        self.tree.as_mut()
    }

    pub fn session(&self) -> Option<&Arc<NotebookVariableSession>> {
        self.session.as_ref()
    }

    /// Replace the shown snapshot.
    pub async fn set_session(&mut self, session: NotebookVariableSession) -> Result<()> {
        let tree = self.tree.as_mut().ok_or(VariablesError::NoTree)?;
        let session = Arc::new(session);
        log::debug!("showing {} root variables", session.children().len());
        self.session = Some(Arc::clone(&session));
        tree.set_input(session).await
    }

    pub fn layout_body(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
        if let Some(tree) = self.tree.as_mut() {
            tree.layout(width, height);
        }
    }

    /// Collect a fresh snapshot from `provider` and show it.
    pub async fn refresh(&mut self, provider: &dyn NotebookVariableProvider) -> Result<()> {
        if self.tree.is_none() {
            return Err(VariablesError::NoTree);
        }
        let session = collect_session(provider, &self.config.snapshot).await?;
        self.set_session(session).await
    }

    /// Refresh whenever `provider` reports a change, until it stops reporting.
    /// A failed refresh is logged and the previous snapshot stays visible.
    pub async fn watch(&mut self, provider: Arc<dyn NotebookVariableProvider>) {
        let mut changes = provider.on_did_change_variables();
        while changes.next().await.is_some() {
            if let Err(error) = self.refresh(provider.as_ref()).await {
                log::warn!("failed to refresh notebook variables: {}", error);
            }
        }
        log::debug!("variable provider stopped reporting changes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sample_session;
    use crate::tree::HeadlessTree;
    use futures::future::BoxFuture;
    use futures::stream::{self, BoxStream};
    use futures::FutureExt;
    use shared::{Relay, Variable, VariablesRequestKind, VariablesResult};
    use std::sync::Mutex;

    /// Records calls instead of drawing anything.
    #[derive(Default)]
    struct RecordingTree {
        inputs: Vec<Arc<NotebookVariableSession>>,
        layouts: Vec<(f64, f64)>,
        row_height: u32,
    }

    impl TreeWidget for RecordingTree {
        fn set_input(&mut self, root: Arc<NotebookVariableSession>) -> BoxFuture<'_, Result<()>> {
            self.inputs.push(root);
            async { Ok(()) }.boxed()
        }

        fn layout(&mut self, width: f64, height: f64) {
            self.layouts.push((width, height));
        }
    }

    fn recording(parts: TreeParts) -> RecordingTree {
        RecordingTree {
            row_height: parts.delegate.row_height(),
            ..RecordingTree::default()
        }
    }

    /// Serves a fixed list of roots; `fail` makes every request error.
    struct RootsProvider {
        roots: Mutex<Vec<Variable>>,
        fail: Mutex<bool>,
        variables_changed_relay: Relay<()>,
    }

    impl RootsProvider {
        fn new(names: &[&str]) -> Self {
            Self {
                roots: Mutex::new(names.iter().map(|name| Variable::new(*name, "1")).collect()),
                fail: Mutex::new(false),
                variables_changed_relay: Relay::new(),
            }
        }
    }

    impl NotebookVariableProvider for RootsProvider {
        fn on_did_change_variables(&self) -> BoxStream<'static, ()> {
            self.variables_changed_relay.subscribe().boxed()
        }

        fn get_children(
            &self,
            parent: Option<&Variable>,
            _kind: VariablesRequestKind,
            start: usize,
        ) -> BoxStream<'static, anyhow::Result<VariablesResult>> {
            if *self.fail.lock().unwrap() {
                return stream::iter([Err(anyhow::anyhow!("kernel restarting"))]).boxed();
            }
            let items: Vec<_> = match parent {
                None => self.roots.lock().unwrap()[start..]
                    .iter()
                    .cloned()
                    .map(|variable| Ok(VariablesResult::leaf(variable)))
                    .collect(),
                Some(_) => Vec::new(),
            };
            stream::iter(items).boxed()
        }
    }

    #[test]
    fn test_delegate() {
        let delegate = NotebookVariablesDelegate::default();
        let variable = NotebookVariable::new("x", "", "", "1");
        assert_eq!(delegate.get_height(&variable), 22);
        assert_eq!(delegate.get_template_id(&variable), "variable");
    }

    #[test]
    fn test_render_body_builds_tree_once() {
        let mut config = ViewConfig::default();
        config.view.row_height = 30;
        let mut pane = NotebookVariablesViewPane::new(config);
        pane.layout_body(200.0, 100.0);

        assert_eq!(pane.render_body(recording).row_height, 30);
        pane.render_body(|_| panic!("tree created twice"));

        let tree = pane.tree().unwrap();
        assert_eq!(tree.layouts, [(200.0, 100.0)]);
    }

    #[test]
    fn test_layout_is_forwarded() {
        let mut pane = NotebookVariablesViewPane::new(ViewConfig::default());
        pane.render_body(recording);
        pane.layout_body(320.0, 480.0);
        assert_eq!(pane.tree().unwrap().layouts, [(320.0, 480.0)]);
    }

    #[tokio::test]
    async fn test_set_session_requires_tree() {
        let mut pane = NotebookVariablesViewPane::<RecordingTree>::new(ViewConfig::default());
        let error = pane.set_session(sample_session()).await.unwrap_err();
        assert!(matches!(error, VariablesError::NoTree));
    }

    #[tokio::test]
    async fn test_set_session_sets_input() {
        let mut pane = NotebookVariablesViewPane::new(ViewConfig::default());
        pane.render_body(recording);
        pane.set_session(sample_session()).await.unwrap();

        let tree = pane.tree().unwrap();
        assert_eq!(tree.inputs.len(), 1);
        assert!(Arc::ptr_eq(&tree.inputs[0], pane.session().unwrap()));
    }

    #[tokio::test]
    async fn test_refresh_from_provider_with_headless_tree() {
        let provider = RootsProvider::new(&["a", "b"]);
        let mut pane = NotebookVariablesViewPane::new(ViewConfig::default());
        pane.render_body(HeadlessTree::new);

        pane.refresh(&provider).await.unwrap();

        assert_eq!(pane.tree().unwrap().lines(), ["  a: 1", "  b: 1"]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_snapshot() {
        let provider = RootsProvider::new(&["a"]);
        let mut pane = NotebookVariablesViewPane::new(ViewConfig::default());
        pane.render_body(recording);
        pane.refresh(&provider).await.unwrap();

        *provider.fail.lock().unwrap() = true;
        let error = pane.refresh(&provider).await.unwrap_err();

        assert_eq!(error.to_string(), "kernel restarting");
        assert_eq!(pane.tree().unwrap().inputs.len(), 1);
        assert_eq!(pane.session().unwrap().children()[0].name(), "a");
    }

    #[tokio::test]
    async fn test_watch_refreshes_on_change() {
        let provider = Arc::new(RootsProvider::new(&["a"]));
        let mut pane = NotebookVariablesViewPane::new(ViewConfig::default());
        pane.render_body(recording);

        let relay = provider.variables_changed_relay.clone();
        let roots_provider = Arc::clone(&provider);
        let watcher = async {
            pane.watch(provider.clone()).await;
        };
        let driver = async move {
            tokio::task::yield_now().await;
            roots_provider
                .roots
                .lock()
                .unwrap()
                .push(Variable::new("b", "2"));
            relay.send(());
            tokio::task::yield_now().await;
            drop(relay);
            drop(roots_provider);
        };
        let _ = tokio::time::timeout(std::time::Duration::from_millis(200), async {
            futures::join!(watcher, driver);
        })
        .await;

        let tree = pane.tree().unwrap();
        assert!(!tree.inputs.is_empty());
        let names: Vec<_> = tree.inputs[tree.inputs.len() - 1]
            .children()
            .iter()
            .map(|variable| variable.name().to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }
}

use std::sync::Arc;

use crate::entities::NotebookVariable;
use crate::lifecycle::DisposableStore;
use crate::value_format::{DebugValueFormatter, RenderValueOptions, ValueField, ValueFormatter};

/// Text with an optional tooltip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub title: Option<String>,
}

impl Label {
    pub fn set(&mut self, text: impl Into<String>, title: Option<String>) {
        self.text = text.into();
        self.title = title;
    }
}

/// Content of one variable row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedRow {
    pub name: Label,
    pub metadata: Label,
    pub value: ValueField,
}

/// Recycled row slot. Allocated once per slot and rebound as the visible
/// range moves.
#[derive(Debug, Default)]
pub struct ExpressionTemplate {
    pub row: RenderedRow,
    pub lazy_button_visible: bool,
    pub current_element: Option<Arc<NotebookVariable>>,
    /// Released on unbind and before every rebind.
    pub element_disposables: DisposableStore,
    /// Released when the slot is destroyed.
    pub template_disposables: DisposableStore,
}

/// Row renderer contract consumed by a tree widget.
pub trait TreeRenderer: Send + Sync {
    type Template;

    fn template_id(&self) -> &'static str;

    /// Allocate a row slot.
    fn render_template(&self) -> Self::Template;

    /// Bind `element` into a slot. Rebinding fully replaces earlier content.
    fn render_element(&self, element: &Arc<NotebookVariable>, index: usize, template: &mut Self::Template);

    /// Release what the last bind acquired.
    fn dispose_element(&self, element: &Arc<NotebookVariable>, index: usize, template: &mut Self::Template);

    /// Release the slot for good.
    fn dispose_template(&self, template: Self::Template);
}

#[derive(Clone)]
pub struct VariablesRenderer {
    formatter: Arc<dyn ValueFormatter>,
    value_options: RenderValueOptions,
}

impl VariablesRenderer {
    pub const ID: &'static str = "variable";

    pub fn new(formatter: Arc<dyn ValueFormatter>, value_options: RenderValueOptions) -> Self {
        Self {
            formatter,
            value_options,
        }
    }

    /// Map a variable to its row content.
    pub fn render_row(&self, variable: &NotebookVariable) -> RenderedRow {
        let mut row = RenderedRow::default();
        self.render_expression(variable, &mut row);
        row
    }

    fn render_expression(&self, variable: &NotebookVariable, row: &mut RenderedRow) {
        let mut text = variable.name().to_string();
        if !variable.value().is_empty() {
            text.push(':');
        }
        let title = variable.type_name().unwrap_or(variable.name()).to_string();
        row.name.set(text, Some(title));

        let metadata = if variable.metadata().is_empty() {
            String::new()
        } else {
            format!(" {}", variable.metadata())
        };
        row.metadata.set(metadata, None);

        self.formatter
            .format(variable, &mut row.value, &self.value_options);
    }
}

impl Default for VariablesRenderer {
    fn default() -> Self {
        Self::new(Arc::new(DebugValueFormatter), RenderValueOptions::default())
    }
}

impl std::fmt::Debug for VariablesRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariablesRenderer")
            .field("value_options", &self.value_options)
            .finish_non_exhaustive()
    }
}

impl TreeRenderer for VariablesRenderer {
    type Template = ExpressionTemplate;

    fn template_id(&self) -> &'static str {
        Self::ID
    }

    fn render_template(&self) -> ExpressionTemplate {
        ExpressionTemplate::default()
    }

    fn render_element(&self, element: &Arc<NotebookVariable>, _index: usize, template: &mut ExpressionTemplate) {
        template.element_disposables.clear();
        template.current_element = Some(Arc::clone(element));
        template.lazy_button_visible = false;
        self.render_expression(element, &mut template.row);
    }

    fn dispose_element(&self, _element: &Arc<NotebookVariable>, _index: usize, template: &mut ExpressionTemplate) {
        template.element_disposables.clear();
    }

    fn dispose_template(&self, mut template: ExpressionTemplate) {
        template.element_disposables.dispose();
        template.template_disposables.dispose();
    }
}

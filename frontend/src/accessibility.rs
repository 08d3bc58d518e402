use crate::entities::NotebookVariable;

/// Labels read out by assistive technology. Must stay pure: called once per
/// row bind and once for the widget.
pub trait AccessibilityProvider: Send + Sync {
    fn widget_aria_label(&self) -> String;

    fn aria_label(&self, element: &NotebookVariable) -> String;
}

/// Placeholder labels; both are empty until the view gets localized strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotebookVariablesAccessibilityProvider;

impl AccessibilityProvider for NotebookVariablesAccessibilityProvider {
    fn widget_aria_label(&self) -> String {
        String::new()
    }

    fn aria_label(&self, _element: &NotebookVariable) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sample_session;

    #[test]
    fn test_labels_are_empty() {
        let provider = NotebookVariablesAccessibilityProvider;
        assert_eq!(provider.widget_aria_label(), "");
        for variable in sample_session().children() {
            assert_eq!(provider.aria_label(variable), "");
        }
    }
}

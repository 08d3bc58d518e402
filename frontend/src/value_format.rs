use crate::entities::NotebookVariable;

/// Colour class assigned to a rendered value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueKind {
    #[default]
    Plain,
    Boolean,
    Number,
    String,
}

impl ValueKind {
    /// Style class added next to `value`, if any.
    pub fn class_name(&self) -> Option<&'static str> {
        match self {
            ValueKind::Plain => None,
            ValueKind::Boolean => Some("boolean"),
            ValueKind::Number => Some("number"),
            ValueKind::String => Some("string"),
        }
    }

    /// Classify a raw value string the way debug views colour them.
    pub fn classify(value: &str) -> Self {
        if is_number(value) {
            ValueKind::Number
        } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            ValueKind::Boolean
        } else if is_quoted(value) {
            ValueKind::String
        } else {
            ValueKind::Plain
        }
    }
}

fn is_number(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && matches!(trimmed.parse::<f64>(), Ok(n) if !n.is_nan())
}

fn is_quoted(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 2
        && matches!(bytes[0], b'"' | b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
        && !value.contains('\n')
}

/// The value cell of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueField {
    pub text: String,
    pub kind: ValueKind,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderValueOptions {
    pub colorize: bool,
    pub show_hover: bool,
    pub max_value_length: Option<usize>,
}

impl Default for RenderValueOptions {
    fn default() -> Self {
        Self {
            colorize: true,
            show_hover: false,
            max_value_length: Some(shared::ViewSection::DEFAULT_MAX_VALUE_LENGTH),
        }
    }
}

impl From<&shared::ViewSection> for RenderValueOptions {
    fn from(view: &shared::ViewSection) -> Self {
        Self {
            colorize: view.colorize_values,
            show_hover: view.show_hover,
            max_value_length: view.max_value_length(),
        }
    }
}

/// Fills a row's value cell from a variable.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, variable: &NotebookVariable, target: &mut ValueField, options: &RenderValueOptions);
}

/// Colours primitives and cuts over-long values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugValueFormatter;

impl ValueFormatter for DebugValueFormatter {
    fn format(&self, variable: &NotebookVariable, target: &mut ValueField, options: &RenderValueOptions) {
        let value = variable.value();

        target.kind = if options.colorize {
            ValueKind::classify(value)
        } else {
            ValueKind::Plain
        };

        target.text = match options.max_value_length {
            Some(max) if value.chars().count() > max => {
                let mut cut: String = value.chars().take(max).collect();
                cut.push_str("...");
                cut
            }
            _ => value.to_string(),
        };

        target.title = options.show_hover.then(|| value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(value: &str, options: RenderValueOptions) -> ValueField {
        let variable = NotebookVariable::new("v", "", "", value);
        let mut field = ValueField::default();
        DebugValueFormatter.format(&variable, &mut field, &options);
        field
    }

    #[test]
    fn test_classify() {
        assert_eq!(ValueKind::classify("1"), ValueKind::Number);
        assert_eq!(ValueKind::classify("-2.5e3"), ValueKind::Number);
        assert_eq!(ValueKind::classify("True"), ValueKind::Boolean);
        assert_eq!(ValueKind::classify("false"), ValueKind::Boolean);
        assert_eq!(ValueKind::classify("'hello world'"), ValueKind::String);
        assert_eq!(ValueKind::classify("\"a\""), ValueKind::String);
        assert_eq!(ValueKind::classify("'mixed\""), ValueKind::Plain);
        assert_eq!(ValueKind::classify("'"), ValueKind::Plain);
        assert_eq!(ValueKind::classify("NaN"), ValueKind::Plain);
        assert_eq!(ValueKind::classify(""), ValueKind::Plain);
        assert_eq!(ValueKind::classify("[1, 2, 3]"), ValueKind::Plain);
    }

    #[test]
    fn test_colorize_off_is_plain() {
        let options = RenderValueOptions {
            colorize: false,
            ..RenderValueOptions::default()
        };
        let field = format("42", options);
        assert_eq!(field.text, "42");
        assert_eq!(field.kind, ValueKind::Plain);
    }

    #[test]
    fn test_long_value_is_cut() {
        let options = RenderValueOptions {
            max_value_length: Some(5),
            ..RenderValueOptions::default()
        };
        assert_eq!(format("hello world", options).text, "hello...");
        assert_eq!(format("héllo", options).text, "héllo");
        assert_eq!(format("héllo!", options).text, "héllo...");
    }

    #[test]
    fn test_hover_carries_full_value() {
        let options = RenderValueOptions {
            show_hover: true,
            max_value_length: Some(3),
            ..RenderValueOptions::default()
        };
        let field = format("line one\nline two", options);
        assert_eq!(field.text, "lin...");
        assert_eq!(field.title.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_reformat_overwrites_previous_state() {
        let mut field = ValueField::default();
        let options = RenderValueOptions {
            show_hover: true,
            ..RenderValueOptions::default()
        };
        DebugValueFormatter.format(&NotebookVariable::new("a", "", "", "1"), &mut field, &options);
        DebugValueFormatter.format(
            &NotebookVariable::new("b", "", "", ""),
            &mut field,
            &RenderValueOptions::default(),
        );
        assert_eq!(field, ValueField::default());
    }
}

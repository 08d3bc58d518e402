use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub view: ViewSection,
    pub snapshot: SnapshotSection,
}

/// How variable rows are laid out and rendered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewSection {
    pub row_height: u32,
    pub colorize_values: bool,
    /// Values longer than this many characters are cut. Zero disables the cut.
    pub max_value_length: usize,
    pub show_hover: bool,
}

impl ViewSection {
    pub const DEFAULT_ROW_HEIGHT: u32 = 22;
    pub const DEFAULT_MAX_VALUE_LENGTH: usize = 1024;

    pub fn max_value_length(&self) -> Option<usize> {
        (self.max_value_length > 0).then_some(self.max_value_length)
    }
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            row_height: Self::DEFAULT_ROW_HEIGHT,
            colorize_values: true,
            max_value_length: Self::DEFAULT_MAX_VALUE_LENGTH,
            show_hover: false,
        }
    }
}

/// Limits applied when a provider's variables are collected into a snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SnapshotSection {
    /// Levels below the roots whose children are fetched.
    pub max_depth: usize,
    /// Children kept per variable and request kind.
    pub max_children: usize,
}

impl SnapshotSection {
    pub const DEFAULT_MAX_DEPTH: usize = 4;
    pub const DEPTH_LIMIT: usize = 64;
    pub const DEFAULT_MAX_CHILDREN: usize = 1000;
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_children: Self::DEFAULT_MAX_CHILDREN,
        }
    }
}

impl ViewConfig {
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Replace out-of-range values with usable ones and describe each change.
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.view.row_height == 0 {
            warnings.push(format!(
                "view.row_height must be positive, using {}",
                ViewSection::DEFAULT_ROW_HEIGHT
            ));
            self.view.row_height = ViewSection::DEFAULT_ROW_HEIGHT;
        }

        if self.snapshot.max_children == 0 {
            warnings.push(format!(
                "snapshot.max_children must be positive, using {}",
                SnapshotSection::DEFAULT_MAX_CHILDREN
            ));
            self.snapshot.max_children = SnapshotSection::DEFAULT_MAX_CHILDREN;
        }

        if self.snapshot.max_depth > SnapshotSection::DEPTH_LIMIT {
            warnings.push(format!(
                "snapshot.max_depth {} exceeds {}, clamping",
                self.snapshot.max_depth,
                SnapshotSection::DEPTH_LIMIT
            ));
            self.snapshot.max_depth = SnapshotSection::DEPTH_LIMIT;
        }

        warnings
    }
}

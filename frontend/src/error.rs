/// Errors surfaced by the variables view.
#[derive(Debug, thiserror::Error)]
pub enum VariablesError {
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    /// A provider failed while enumerating variables. Passed through as-is.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
    #[error("the variables tree has not been created yet")]
    NoTree,
}

pub type Result<T, E = VariablesError> = std::result::Result<T, E>;

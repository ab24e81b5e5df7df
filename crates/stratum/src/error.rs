#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node capacity must be at least 2, got {capacity}")]
    InvalidConfiguration { capacity: usize },
}

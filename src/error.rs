use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitterError {
    #[error("Invalid node count {0}, expected at least 1")]
    InvalidNodeCount(i64),

    #[error("Node index {index} out of range for {node_count} nodes")]
    NodeIndexOutOfRange { index: i64, node_count: usize },

    #[error("Unexpected status code {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty report: {0}")]
    EmptyReport(String),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::DeError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SplitterError>;

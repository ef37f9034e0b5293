use tabula_api::CursorError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("input '{path}': {source}")]
    Input { path: String, source: std::io::Error },

    #[error("dataset: {0}")]
    Dataset(#[from] CursorError),

    #[error("json output: {0}")]
    Json(#[from] format_json::FormatError),

    #[error("xml output: {0}")]
    Xml(#[from] format_xml::FormatError),

    #[error("schema output: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("stdout: {0}")]
    Stdout(#[from] std::io::Error),
}

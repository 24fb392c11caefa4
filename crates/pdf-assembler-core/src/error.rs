use thiserror::Error;

/// Unified error type for pdf-assembler-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Batch operations (filtering, run preconditions)
/// - Decoding inputs (images, PDFs)
/// - Document engine and export failures
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Batch Errors
    // ==========================================================================
    /// None of the offered files matched the batch's media type
    #[error("no valid {expected} files in selection")]
    NoValidFiles { expected: &'static str },

    /// Trigger pressed with nothing in the batch
    #[error("batch is empty")]
    EmptyBatch,

    /// Trigger pressed with fewer files than the pipeline needs
    #[error("at least {required} files are required (batch has {actual})")]
    InsufficientFiles { required: usize, actual: usize },

    /// A run is already in progress for this pipeline
    #[error("a run is already in progress")]
    Busy,

    // ==========================================================================
    // Decode Errors
    // ==========================================================================
    /// Failed to decode an image file
    #[error("failed to decode image '{file}': {reason}")]
    ImageDecode { file: String, reason: String },

    /// Page index outside the document
    #[error("invalid page number {page} (document has {total} pages)")]
    PdfInvalidPage { page: usize, total: usize },

    /// Failed to parse a PDF file
    #[error("failed to load PDF '{file}': {reason}")]
    PdfDecode { file: String, reason: String },

    // ==========================================================================
    // Engine / Export Errors
    // ==========================================================================
    /// Underlying document engine failure
    #[error("document engine error: {0}")]
    Engine(String),

    /// Failed to hand the artifact to the export sink
    #[error("failed to export artifact: {0}")]
    Export(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Self::Engine(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

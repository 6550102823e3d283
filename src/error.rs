//! Crate-wide error taxonomy.
//!
//! Parse failures carry the offending value so a caller can log it without
//! re-parsing; IO and handler failures wrap their source.

use thiserror::Error;

pub type IcapResult<T> = Result<T, IcapError>;

#[derive(Debug, Error)]
pub enum IcapError {
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("unknown ICAP method: {0:?}")]
    BadIcapMethod(String),

    #[error("malformed header line: {0:?}")]
    MalformedHeaderLine(String),

    #[error("header block exceeds {limit} bytes")]
    HeaderBlockTooLarge { limit: usize },

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Encapsulated header is required for this method")]
    MissingEncapsulatedHeader,

    #[error("multiple Encapsulated headers present")]
    MultipleEncapsulatedHeaders,

    #[error("unknown encapsulated entity name: {0:?}")]
    BadEncapsulatedEntityName(String),

    #[error("duplicate encapsulated entity name: {0:?}")]
    DuplicateEncapsulatedEntityName(String),

    #[error("encapsulated offset is not an integer: {0:?}")]
    EncapsulatedOffsetNotInteger(String),

    #[error("negative encapsulated offset: {0}")]
    NegativeEncapsulatedOffset(i64),

    #[error("encapsulated offset does not increase: {previous} -> {next}")]
    NonIncreasingEncapsulatedOffset { previous: u64, next: u64 },

    #[error("malformed chunk size: {0:?}")]
    MalformedChunkSize(String),

    #[error("chunk size exceeds {limit} bytes")]
    ChunkTooLarge { limit: usize },

    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("no status line registered for code {0}")]
    UnknownStatusCode(u16),

    #[error("handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

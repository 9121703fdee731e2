use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Truncated mismatch stream: a mismatched-bases line has no offset line after it")]
    TruncatedMismatchStream,

    #[error(
        "Copy run of {run} bases at reference position {cursor} falls outside the reference (length {reference_len})"
    )]
    ReferenceOutOfBounds {
        cursor: i64,
        run: usize,
        reference_len: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

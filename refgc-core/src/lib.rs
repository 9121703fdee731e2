//! # refgc-core: reference-based genome decompression
//!
//! This crate decodes a reference-based genomic sequence compression format:
//! given a reference sequence and a compact diff-encoded description of a
//! target sequence, it reconstructs the original target byte-for-byte.
//!
//! # Module Structure
//!
//! The decode pipeline runs through these modules, leaf-first:
//!
//! - `reference` - loads and cleans the reference sequence (uppercase ACGT)
//! - `metadata` - parses the 7-line metadata block into a [`CompressedRecord`]
//! - `mismatch` - parses the mismatch stream into [`MismatchEntry`] records
//! - `reconstruct` - rebuilds the uppercase ACGT target from reference
//!   copy-runs and substituted bases
//! - `overlay` - applies the three positional annotation passes (special
//!   characters, ambiguous-base runs, lowercase casing)
//! - `output` - re-wraps the final sequence into fixed-width lines
//! - `decode` - ties the pipeline together in a [`DecodeContext`]

pub mod decode;
pub mod errors;
pub mod metadata;
pub mod mismatch;
pub mod output;
pub mod overlay;
pub mod reconstruct;
pub mod reference;
pub mod utils;

pub mod consts {
    /// Fixed minimum copy-run length added to every run. The compressor
    /// anchors mismatches relative to a k-mer match boundary, so every
    /// copy-run overshoots by the anchor length.
    pub const KMER_ANCHOR_LEN: usize = 20;

    /// Upper bound on reference and target sequence lengths.
    pub const MAX_SEQ_LENGTH: usize = 1 << 28;
}

// Re-exports
pub use decode::{DecodeContext, DecodedSequence, decompress_to_file};
pub use errors::DecodeError;
pub use metadata::{CompressedRecord, LinePlan, RangeList, SpecialCharCatalog};
pub use mismatch::MismatchEntry;
pub use reference::ReferenceSequence;

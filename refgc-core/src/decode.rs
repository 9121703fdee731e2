//! The decode pipeline, tied together in one owned session value. No
//! component reaches into ambient state: the reference, the parsed record,
//! and the mismatch entries travel through the pipeline explicitly.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

use crate::metadata::{self, CompressedRecord, LinePlan};
use crate::mismatch::{self, MismatchEntry};
use crate::output;
use crate::overlay;
use crate::reconstruct;
use crate::reference::ReferenceSequence;
use crate::utils::get_dynamic_reader;

/// One decode session: everything a single target needs, owned together for
/// the lifetime of the decode.
pub struct DecodeContext {
    pub reference: ReferenceSequence,
    pub record: CompressedRecord,
    pub entries: Vec<MismatchEntry>,
}

/// A fully decoded target, ready for line-wrapped output. The formatter
/// consumes it by value.
pub struct DecodedSequence {
    pub header: String,
    pub line_plan: LinePlan,
    pub sequence: Vec<u8>,
}

impl DecodeContext {
    /// Parses a whole compressed target - metadata block, then the mismatch
    /// stream - from a single pass over `reader`.
    pub fn from_reader<R: BufRead>(reference: ReferenceSequence, mut reader: R) -> Result<Self> {
        let record = metadata::parse_metadata(&mut reader)
            .context("Failed to parse compressed target metadata")?;
        let entries = mismatch::parse_mismatch_stream(&mut reader)
            .context("Failed to parse mismatch stream")?;

        Ok(DecodeContext {
            reference,
            record,
            entries,
        })
    }

    /// Reconstructs the ACGT sequence and applies the overlay passes,
    /// consuming the session.
    pub fn decode(self) -> Result<DecodedSequence> {
        let DecodeContext {
            reference,
            record,
            entries,
        } = self;

        let target = reconstruct::reconstruct(
            &reference,
            record.initial_cursor,
            record.initial_run_length,
            &entries,
        )?;
        let sequence = overlay::apply_overlays(target, &record)?;

        Ok(DecodedSequence {
            header: record.header,
            line_plan: record.line_plan,
            sequence,
        })
    }
}

/// One-shot batch decode: load and clean the reference, parse the compressed
/// target, reconstruct, overlay, and write the wrapped output file. Output
/// is written only once the full reconstruction has succeeded.
pub fn decompress_to_file(
    reference_path: &Path,
    target_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let reference = ReferenceSequence::from_fasta(reference_path)?;
    let reader = get_dynamic_reader(target_path)
        .with_context(|| format!("Failed to open compressed target file: {:?}", target_path))?;

    let decoded = DecodeContext::from_reader(reference, reader)?.decode()?;

    output::write_reconstructed(
        output_path,
        &decoded.header,
        &decoded.line_plan,
        &decoded.sequence,
    )
}

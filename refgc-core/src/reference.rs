use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

use crate::consts::MAX_SEQ_LENGTH;
use crate::utils::get_dynamic_reader;

/// The cleaned reference sequence: an ordered, 0-indexed run of uppercase
/// ACGT bases. Immutable after load; the decode pipeline only ever reads
/// slices out of it.
pub struct ReferenceSequence {
    bases: Vec<u8>,
}

impl ReferenceSequence {
    /// Loads a reference from FASTA-like text, plain or gzipped.
    ///
    /// Lines starting with `>` are headers and are skipped. Every other
    /// character is uppercased; anything outside {A, C, G, T} is discarded.
    pub fn from_fasta<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let reader = get_dynamic_reader(path)
            .with_context(|| format!("Failed to open reference file: {:?}", path))?;

        // Reserve using the on-disk size as a hint so the push loop below
        // does not reallocate for large genomes.
        let size_hint = std::fs::metadata(path).map(|m| m.len() as usize).unwrap_or(0);
        let mut bases: Vec<u8> = Vec::with_capacity(size_hint.min(MAX_SEQ_LENGTH));

        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| {
                format!("There was an error reading line {} of the reference", index + 1)
            })?;

            if line.starts_with('>') {
                continue;
            }

            for c in line.bytes() {
                match c.to_ascii_uppercase() {
                    b @ (b'A' | b'C' | b'G' | b'T') => bases.push(b),
                    _ => {}
                }
            }
        }

        if bases.len() > MAX_SEQ_LENGTH {
            anyhow::bail!(
                "Reference sequence is too long: {} bases (max {})",
                bases.len(),
                MAX_SEQ_LENGTH
            );
        }

        Ok(ReferenceSequence { bases })
    }

    /// Wraps an already-cleaned base vector. The caller is responsible for
    /// it containing only uppercase ACGT.
    pub fn from_bases(bases: Vec<u8>) -> Self {
        ReferenceSequence { bases }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> &[u8] {
        &self.bases
    }
}

//! Rebuilds the uppercase ACGT target sequence: reference copy-runs
//! alternating with substituted bases, driven by signed cursor offsets.

use crate::consts::KMER_ANCHOR_LEN;
use crate::errors::DecodeError;
use crate::mismatch::MismatchEntry;
use crate::reference::ReferenceSequence;

/// Maps mismatch base codes 0-3 to bases, in that fixed order.
pub const BASE_DECODE_TABLE: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Produces the ACGT-only target sequence, casing and annotations not yet
/// applied.
///
/// The cursor starts at `initial_cursor` and the first copy-run is
/// `initial_run_length` plus the k-mer anchor floor. Each entry then appends
/// its substituted bases (substitutions do not consume reference positions),
/// jumps the cursor by `offset_from_prev`, and copies `continue_for` plus the
/// floor from the reference.
pub fn reconstruct(
    reference: &ReferenceSequence,
    initial_cursor: usize,
    initial_run_length: usize,
    entries: &[MismatchEntry],
) -> Result<Vec<u8>, DecodeError> {
    // The copy-runs are the hot path for chromosome-scale targets, so the
    // final length is computed up front and every run is a bulk slice copy.
    let mut target = Vec::with_capacity(decoded_len(initial_run_length, entries));
    let mut cursor = initial_cursor as i64;

    copy_run(
        reference,
        &mut target,
        &mut cursor,
        initial_run_length as i64 + KMER_ANCHOR_LEN as i64,
    )?;

    for entry in entries {
        target.extend(
            entry
                .base_codes
                .iter()
                .map(|&code| BASE_DECODE_TABLE[code as usize]),
        );

        cursor += entry.offset_from_prev;
        copy_run(
            reference,
            &mut target,
            &mut cursor,
            entry.continue_for + KMER_ANCHOR_LEN as i64,
        )?;
    }

    Ok(target)
}

/// Copies `run` bases from the reference at the cursor, advancing the cursor
/// past them. A non-positive effective run copies nothing and leaves the
/// cursor untouched.
fn copy_run(
    reference: &ReferenceSequence,
    target: &mut Vec<u8>,
    cursor: &mut i64,
    run: i64,
) -> Result<(), DecodeError> {
    if run <= 0 {
        return Ok(());
    }

    let start = *cursor;
    let end = start + run;
    if start < 0 || end > reference.len() as i64 {
        return Err(DecodeError::ReferenceOutOfBounds {
            cursor: start,
            run: run as usize,
            reference_len: reference.len(),
        });
    }

    target.extend_from_slice(&reference.bases()[start as usize..end as usize]);
    *cursor = end;
    Ok(())
}

/// Exact decoded length: the initial run plus, per entry, its substituted
/// bases and its effective copy-run.
fn decoded_len(initial_run_length: usize, entries: &[MismatchEntry]) -> usize {
    let floor = KMER_ANCHOR_LEN as i64;
    let mut len = initial_run_length + KMER_ANCHOR_LEN;
    for entry in entries {
        len += entry.base_codes.len();
        len += (entry.continue_for + floor).max(0) as usize;
    }
    len
}

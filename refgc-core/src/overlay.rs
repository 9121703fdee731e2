//! Overlays the three positional annotation streams onto the reconstructed
//! ACGT sequence: special characters, then ambiguous-base runs, then
//! lowercase casing. The order is load-bearing: each pass's positions were
//! encoded against the coordinate space left behind by the passes before it.

use crate::errors::DecodeError;
use crate::metadata::{CompressedRecord, RangeList, SpecialCharCatalog};

/// The character inserted for ambiguous-base runs.
const AMBIGUOUS_BASE: u8 = b'N';

/// Applies all three overlay passes in their required order. With empty
/// annotation streams the sequence passes through unchanged.
pub fn apply_overlays(
    target: Vec<u8>,
    record: &CompressedRecord,
) -> Result<Vec<u8>, DecodeError> {
    let target = insert_special_characters(target, &record.special_chars)?;
    let mut target = insert_ambiguous_runs(target, &record.ambiguous_ranges)?;
    apply_lowercase_ranges(&mut target, &record.lowercase_ranges)?;
    Ok(target)
}

/// Inserts each catalogued special character at its decoded position.
///
/// The encoder walks `pos += delta; record(pos); pos += 1`, the trailing
/// increment being the slot the inserted character itself occupies in the
/// next delta's frame. Subtracting the running insertion count turns those
/// positions back into counts of original bytes, so the whole pass is one
/// linear merge into a buffer of exact final size instead of repeated
/// mid-vector insertions.
fn insert_special_characters(
    seq: Vec<u8>,
    catalog: &SpecialCharCatalog,
) -> Result<Vec<u8>, DecodeError> {
    if catalog.is_empty() {
        return Ok(seq);
    }

    let mut out = Vec::with_capacity(seq.len() + catalog.deltas.len());
    let mut copied = 0usize;
    let mut orig_pos = 0usize;

    for (&delta, &index) in catalog.deltas.iter().zip(&catalog.order) {
        orig_pos += delta;
        if orig_pos > seq.len() {
            return Err(DecodeError::MalformedMetadata(format!(
                "special character falls {} bytes past the reconstructed sequence",
                orig_pos - seq.len()
            )));
        }
        out.extend_from_slice(&seq[copied..orig_pos]);
        copied = orig_pos;
        out.push(catalog.alphabet[index]);
    }
    out.extend_from_slice(&seq[copied..]);

    Ok(out)
}

/// Inserts the ambiguous-base runs. Each range's start is a delta from the
/// end of the previous range; as with the special characters, stripping the
/// previously inserted lengths out of the cumulative positions reduces the
/// pass to a single linear merge.
fn insert_ambiguous_runs(seq: Vec<u8>, ranges: &RangeList) -> Result<Vec<u8>, DecodeError> {
    if ranges.is_empty() {
        return Ok(seq);
    }

    let inserted: usize = ranges.ranges.iter().map(|&(_, length)| length).sum();
    let mut out = Vec::with_capacity(seq.len() + inserted);
    let mut copied = 0usize;
    let mut orig_pos = 0usize;

    for &(start_delta, length) in &ranges.ranges {
        orig_pos += start_delta;
        if orig_pos > seq.len() {
            return Err(DecodeError::MalformedMetadata(format!(
                "ambiguous-base run falls {} bytes past the reconstructed sequence",
                orig_pos - seq.len()
            )));
        }
        out.extend_from_slice(&seq[copied..orig_pos]);
        copied = orig_pos;
        out.resize(out.len() + length, AMBIGUOUS_BASE);
    }
    out.extend_from_slice(&seq[copied..]);

    Ok(out)
}

/// Lower-cases the annotated ranges in place. Same cumulative-delta algebra,
/// but computed over the post-insertion sequence; no length change, so no
/// coordinate remapping is needed.
fn apply_lowercase_ranges(seq: &mut [u8], ranges: &RangeList) -> Result<(), DecodeError> {
    let mut prev_end = 0usize;

    for &(start_delta, length) in &ranges.ranges {
        let begin = prev_end + start_delta;
        let end = begin + length;
        if end > seq.len() {
            return Err(DecodeError::MalformedMetadata(format!(
                "lowercase range {begin}..{end} falls outside the reconstructed sequence (length {})",
                seq.len()
            )));
        }
        seq[begin..end].make_ascii_lowercase();
        prev_end = end;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog(deltas: Vec<usize>, alphabet: Vec<u8>, order: Vec<usize>) -> SpecialCharCatalog {
        SpecialCharCatalog {
            deltas,
            alphabet,
            order,
        }
    }

    fn ranges(pairs: &[(usize, usize)]) -> RangeList {
        RangeList {
            ranges: pairs.to_vec(),
        }
    }

    /// One-at-a-time insertion oracle: walks the delta list and inserts each
    /// character mid-vector, exactly how the positions were encoded.
    fn insert_specials_naive(seq: &[u8], catalog: &SpecialCharCatalog) -> Vec<u8> {
        let mut seq = seq.to_vec();
        let mut pos = 0usize;
        for (&delta, &index) in catalog.deltas.iter().zip(&catalog.order) {
            pos += delta;
            seq.insert(pos, catalog.alphabet[index]);
            pos += 1;
        }
        seq
    }

    /// One-at-a-time oracle for ambiguous runs, cumulative offsets included.
    fn insert_ambiguous_naive(seq: &[u8], ranges: &RangeList) -> Vec<u8> {
        let mut seq = seq.to_vec();
        let mut prev_pos = 0usize;
        for &(start, length) in &ranges.ranges {
            for j in 0..length {
                seq.insert(j + start + prev_pos, b'N');
            }
            prev_pos += start + length;
        }
        seq
    }

    #[test]
    fn inserts_a_single_special_character() {
        let catalog = catalog(vec![4], vec![b'-'], vec![0]);
        let out = insert_special_characters(b"ACGTACGT".to_vec(), &catalog).unwrap();
        assert_eq!(out, b"ACGT-ACGT");
    }

    #[test]
    fn adjacent_special_characters_keep_catalog_order() {
        let catalog = catalog(vec![1, 0], vec![b'X', b'Y'], vec![0, 1]);
        let out = insert_special_characters(b"ACGT".to_vec(), &catalog).unwrap();
        assert_eq!(out, b"AXYCGT");
    }

    #[test]
    fn special_merge_matches_the_insertion_oracle() {
        let seq = b"ACGTACGTACGTACGT";
        let catalog = catalog(
            vec![0, 3, 0, 5, 2],
            vec![b'N', b'R', b'Y'],
            vec![2, 0, 1, 1, 0],
        );
        let merged = insert_special_characters(seq.to_vec(), &catalog).unwrap();
        assert_eq!(merged, insert_specials_naive(seq, &catalog));
    }

    #[test]
    fn inserts_ambiguous_runs_with_cumulative_offsets() {
        let out = insert_ambiguous_runs(b"ACGTACGT".to_vec(), &ranges(&[(2, 3), (1, 2)])).unwrap();
        assert_eq!(out, b"ACNNNGNNTACGT");
    }

    #[test]
    fn ambiguous_merge_matches_the_insertion_oracle() {
        let seq = b"ACGTACGTACGTACGTACGT";
        let list = ranges(&[(0, 2), (4, 1), (0, 3), (7, 5)]);
        let merged = insert_ambiguous_runs(seq.to_vec(), &list).unwrap();
        assert_eq!(merged, insert_ambiguous_naive(seq, &list));
    }

    #[test]
    fn lowercases_ranges_in_place() {
        let mut seq = b"ACGTACGT".to_vec();
        apply_lowercase_ranges(&mut seq, &ranges(&[(1, 2), (2, 1)])).unwrap();
        assert_eq!(seq, b"AcgTAcGT");
    }

    #[test]
    fn lowercase_range_past_the_end_is_an_error() {
        let mut seq = b"ACGT".to_vec();
        let err = apply_lowercase_ranges(&mut seq, &ranges(&[(2, 5)])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn empty_overlays_leave_the_sequence_unchanged() {
        let record = CompressedRecord::default();
        let out = apply_overlays(b"ACGTACGT".to_vec(), &record).unwrap();
        assert_eq!(out, b"ACGTACGT");
    }

    #[test]
    fn passes_apply_in_their_fixed_order() {
        // special '-' goes in first, the N run is positioned against the
        // post-special sequence, and the lowercase range covers an inserted N
        let record = CompressedRecord {
            special_chars: catalog(vec![2], vec![b'-'], vec![0]),
            ambiguous_ranges: ranges(&[(4, 2)]),
            lowercase_ranges: ranges(&[(3, 3)]),
            ..Default::default()
        };
        let out = apply_overlays(b"ACGTACGT".to_vec(), &record).unwrap();

        // "ACGTACGT" -> "AC-GTACGT" -> "AC-GNNTACGT" -> "AC-gnnTACGT"
        assert_eq!(out, b"AC-gnnTACGT");
    }

    #[test]
    fn special_character_past_the_end_is_an_error() {
        let catalog = catalog(vec![9], vec![b'-'], vec![0]);
        let err = insert_special_characters(b"ACGT".to_vec(), &catalog).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }
}

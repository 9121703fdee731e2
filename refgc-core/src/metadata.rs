//! Parser for the 7-line metadata block at the head of a compressed target.
//!
//! The block is, in order: header, blank separator, line-layout,
//! lowercase-ranges, ambiguous-ranges, special-characters, cursor-state.
//! All numeric lines share the same micro-format: ASCII digits with single
//! spaces between consecutive integers, no signs, no other delimiters.

use std::io::BufRead;

use crate::errors::DecodeError;

/// How the reconstructed sequence is chunked into fixed-width lines for
/// output: `(line_length, repeat_count)` pairs, consumed in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinePlan {
    pub chunks: Vec<(usize, usize)>,
}

/// A cumulative-offset range list: `(start_delta, length)` pairs where each
/// start is relative to the end of the previous range, not absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeList {
    pub ranges: Vec<(usize, usize)>,
}

impl RangeList {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Catalog of non-ACGT special characters to re-insert into the target.
///
/// Each occurrence is located by a start-delta (a range of implicit length
/// one); `order` holds one alphabet index per occurrence, in position order.
/// The order sequence is a dense single-digit run on disk, so the alphabet
/// is limited to fewer than 10 distinct characters. That is a format
/// limitation, not a decoder choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialCharCatalog {
    pub deltas: Vec<usize>,
    /// Distinct special characters, already decoded from their `'A'`-relative
    /// offsets.
    pub alphabet: Vec<u8>,
    pub order: Vec<usize>,
}

impl SpecialCharCatalog {
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Everything the metadata block describes about one compressed target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedRecord {
    pub header: String,
    pub line_plan: LinePlan,
    pub lowercase_ranges: RangeList,
    pub ambiguous_ranges: RangeList,
    pub special_chars: SpecialCharCatalog,
    /// Reference position the first copy-run starts from.
    pub initial_cursor: usize,
    /// Length of the copy-run before the first mismatch entry, without the
    /// k-mer anchor floor.
    pub initial_run_length: usize,
}

/// Consumes exactly 7 logical lines from `reader` and produces a
/// [`CompressedRecord`]. Fails with [`DecodeError::MalformedMetadata`] if a
/// line is missing or structurally short.
pub fn parse_metadata<R: BufRead>(reader: &mut R) -> Result<CompressedRecord, DecodeError> {
    let header = next_line(reader, "header")?;
    next_line(reader, "blank separator")?;

    let line_plan = parse_line_plan(&next_line(reader, "line-layout")?)?;
    let lowercase_ranges =
        parse_range_list(&next_line(reader, "lowercase-ranges")?, "lowercase-ranges")?;
    let ambiguous_ranges =
        parse_range_list(&next_line(reader, "ambiguous-ranges")?, "ambiguous-ranges")?;
    let special_chars = parse_special_catalog(&next_line(reader, "special-characters")?)?;

    let cursor_fields = parse_digit_fields(&next_line(reader, "cursor-state")?, "cursor-state")?;
    if cursor_fields.len() != 2 {
        return Err(DecodeError::MalformedMetadata(format!(
            "cursor-state line has {} values, expected 2",
            cursor_fields.len()
        )));
    }

    Ok(CompressedRecord {
        header,
        line_plan,
        lowercase_ranges,
        ambiguous_ranges,
        special_chars,
        initial_cursor: cursor_fields[0],
        initial_run_length: cursor_fields[1],
    })
}

/// Reads one logical line, stripping the trailing newline. Running out of
/// input here means the metadata block is short, which is an explicit error
/// rather than silently parsing garbage.
fn next_line<R: BufRead>(reader: &mut R, what: &str) -> Result<String, DecodeError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(DecodeError::MalformedMetadata(format!(
            "missing {what} line"
        )));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// The shared integer micro-format: accumulate `value * 10 + digit`, flush on
/// each space, final flush at end of line. No signs are permitted here.
fn parse_digit_fields(line: &str, what: &str) -> Result<Vec<usize>, DecodeError> {
    let mut values = Vec::new();
    let mut curr: usize = 0;

    for c in line.bytes() {
        match c {
            b' ' => {
                values.push(curr);
                curr = 0;
            }
            b'0'..=b'9' => curr = curr * 10 + (c - b'0') as usize,
            _ => {
                return Err(DecodeError::MalformedMetadata(format!(
                    "unexpected character {:?} in {what} line",
                    c as char
                )));
            }
        }
    }
    values.push(curr);

    Ok(values)
}

/// Line-layout: the first integer is the number of subsequent integers (not
/// pairs), which alternate line length and repeat count.
fn parse_line_plan(line: &str) -> Result<LinePlan, DecodeError> {
    let fields = parse_digit_fields(line, "line-layout")?;
    let count = fields[0];

    if fields.len() < count + 1 {
        return Err(DecodeError::MalformedMetadata(format!(
            "line-layout line is short: expected {} values after the count, found {}",
            count,
            fields.len() - 1
        )));
    }
    if count % 2 != 0 {
        return Err(DecodeError::MalformedMetadata(format!(
            "line-layout has an odd number of values ({count}), expected (length, repeat) pairs"
        )));
    }

    let chunks = fields[1..=count]
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    Ok(LinePlan { chunks })
}

/// Range lists: count, then `2 * count` integers as (start_delta, length)
/// pairs.
fn parse_range_list(line: &str, what: &str) -> Result<RangeList, DecodeError> {
    let fields = parse_digit_fields(line, what)?;
    let count = fields[0];

    if fields.len() < 2 * count + 1 {
        return Err(DecodeError::MalformedMetadata(format!(
            "{what} line is short: expected {} values after the count, found {}",
            2 * count,
            fields.len() - 1
        )));
    }

    let ranges = fields[1..=2 * count]
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    Ok(RangeList { ranges })
}

/// Special-characters: count, `count` start-deltas, the alphabet size, that
/// many `'A'`-relative character offsets, and finally a dense digit run with
/// one alphabet index per occurrence. The dense run is the only token on the
/// line that is not space-separated integers.
fn parse_special_catalog(line: &str) -> Result<SpecialCharCatalog, DecodeError> {
    let (prefix, order_run) = match line.rfind(' ') {
        Some(idx) => (&line[..idx], &line[idx + 1..]),
        None => (line, ""),
    };

    let fields = parse_digit_fields(prefix, "special-characters")?;
    let count = fields[0];
    if count == 0 {
        return Ok(SpecialCharCatalog::default());
    }

    if fields.len() < count + 2 {
        return Err(DecodeError::MalformedMetadata(format!(
            "special-characters line is short: expected {count} start-deltas and an alphabet size"
        )));
    }
    let deltas = fields[1..=count].to_vec();

    let unique = fields[count + 1];
    if fields.len() < count + 2 + unique {
        return Err(DecodeError::MalformedMetadata(format!(
            "special-characters line is short: expected {unique} alphabet offsets"
        )));
    }
    let alphabet: Vec<u8> = fields[count + 2..count + 2 + unique]
        .iter()
        .map(|&offset| (b'A' as usize + offset) as u8)
        .collect();

    let mut order = Vec::with_capacity(count);
    for c in order_run.bytes() {
        if !c.is_ascii_digit() {
            return Err(DecodeError::MalformedMetadata(format!(
                "unexpected character {:?} in special-characters order run",
                c as char
            )));
        }
        let index = (c - b'0') as usize;
        if index >= alphabet.len() {
            return Err(DecodeError::MalformedMetadata(format!(
                "special-characters order index {index} exceeds alphabet size {}",
                alphabet.len()
            )));
        }
        order.push(index);
    }
    if order.len() != count {
        return Err(DecodeError::MalformedMetadata(format!(
            "special-characters order run has {} entries for {count} occurrences",
            order.len()
        )));
    }

    Ok(SpecialCharCatalog {
        deltas,
        alphabet,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const METADATA_BLOCK: &str = "\
>chr21 test\n\
\n\
4 60 2 30 1\n\
2 5 3 10 2\n\
1 7 4\n\
2 3 1 2 13 44 01\n\
12 7\n";

    #[test]
    fn parses_a_full_metadata_block() {
        let mut reader = Cursor::new(METADATA_BLOCK);
        let record = parse_metadata(&mut reader).unwrap();

        assert_eq!(record.header, ">chr21 test");
        assert_eq!(record.line_plan.chunks, vec![(60, 2), (30, 1)]);
        assert_eq!(record.lowercase_ranges.ranges, vec![(5, 3), (10, 2)]);
        assert_eq!(record.ambiguous_ranges.ranges, vec![(7, 4)]);
        assert_eq!(record.special_chars.deltas, vec![3, 1]);
        // offsets 13 and 44 from 'A' are 'N' and 'm'
        assert_eq!(record.special_chars.alphabet, vec![b'N', b'm']);
        assert_eq!(record.special_chars.order, vec![0, 1]);
        assert_eq!(record.initial_cursor, 12);
        assert_eq!(record.initial_run_length, 7);
    }

    #[test]
    fn zero_counts_mean_empty_lists() {
        let mut reader = Cursor::new(">h\n\n0\n0\n0\n0\n0 0\n");
        let record = parse_metadata(&mut reader).unwrap();

        assert!(record.line_plan.chunks.is_empty());
        assert!(record.lowercase_ranges.is_empty());
        assert!(record.ambiguous_ranges.is_empty());
        assert!(record.special_chars.is_empty());
    }

    #[test]
    fn missing_metadata_line_is_explicit() {
        let mut reader = Cursor::new(">h\n\n2 60 1\n");
        let err = parse_metadata(&mut reader).unwrap_err();

        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
        assert!(err.to_string().contains("lowercase-ranges"));
    }

    #[test]
    fn short_range_list_is_an_error() {
        let err = parse_range_list("2 5 3", "lowercase-ranges").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn odd_line_layout_count_is_an_error() {
        let err = parse_line_plan("3 60 2 30").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn sign_characters_are_rejected_in_the_unsigned_micro_format() {
        let err = parse_digit_fields("5 -3", "cursor-state").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn order_run_length_must_match_occurrence_count() {
        let err = parse_special_catalog("2 3 1 1 13 0").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn order_index_outside_alphabet_is_an_error() {
        let err = parse_special_catalog("1 3 1 13 7").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn cursor_state_needs_exactly_two_values() {
        let mut reader = Cursor::new(">h\n\n0\n0\n0\n0\n12\n");
        let err = parse_metadata(&mut reader).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }
}

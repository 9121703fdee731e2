use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::metadata::LinePlan;

/// Writes the decoded target: the original header line, one blank line, then
/// the sequence re-wrapped per the line plan - for each (length, repeat)
/// pair, `repeat` lines of exactly `length` characters.
///
/// Callers run this only after the full reconstruction has succeeded, so a
/// decode failure never leaves a partial output file behind.
pub fn write_reconstructed(
    path: &Path,
    header: &str,
    plan: &LinePlan,
    seq: &[u8],
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{header}")?;
    writeln!(out)?;

    let mut cursor = 0usize;
    for &(length, repeat) in &plan.chunks {
        for _ in 0..repeat {
            let end = cursor + length;
            if end > seq.len() {
                anyhow::bail!(
                    "line plan overruns the reconstructed sequence: needs {} characters, have {}",
                    end,
                    seq.len()
                );
            }
            out.write_all(&seq[cursor..end])?;
            out.write_all(b"\n")?;
            cursor = end;
        }
    }

    out.flush()?;
    Ok(())
}

//! Sample source parsing
//!
//! A sample source is line oriented text with one reading per line: three
//! whitespace separated signed 16-bit integers for X, Y and Z.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Error;
use crate::sample::Sample;

/// Parse every line of `reader` into a [Sample].
///
/// Whitespace-only lines are skipped. Any other line that is not exactly three
/// `i16` tokens rejects the whole source; nothing parsed so far is returned.
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<Sample>, Error> {
    let mut samples = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Some(sample) => samples.push(sample),
            None => {
                return Err(Error::Format {
                    line: index + 1,
                    content: line,
                })
            }
        }
    }

    Ok(samples)
}

/// Open and parse the sample file at `path`
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, Error> {
    let file = File::open(path)?;
    parse_samples(BufReader::new(file))
}

fn parse_line(line: &str) -> Option<Sample> {
    let mut tokens = line.split_whitespace();
    let x = tokens.next()?.parse().ok()?;
    let y = tokens.next()?.parse().ok()?;
    let z = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(Sample::new(x, y, z))
}

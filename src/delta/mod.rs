//! Milestone delta parsing
//!
//! The delta source is line-oriented text, one update instruction per line:
//!
//!   <CropName>:<TierIndex>:<Amount>
//!
//! Blank lines and `#` comments are skipped. Amounts are human-formatted
//! integers; spaces, periods and commas are stripped before conversion, so
//! `1,000,000`, `1.000.000` and `1 000 000` all parse to the same value.
//! The stripping is locale-agnostic on purpose.
//!
//! The full delta source is the external file followed by the compiled-in
//! override block, so overrides win on exact conflicts within a pass.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::crop;

/// Deltas applied after the contents of the milestones file. Confirmed by
/// in-game verification; these take precedence over the file on conflict.
const OVERRIDE_LINES: &[&str] = &["Wheat:4:350"];

/// A parsed update instruction: set `crop`'s milestone at `tier` to `amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    /// Canonical crop identifier
    pub crop: String,
    /// Zero-based milestone tier index
    pub tier: usize,
    /// Target threshold amount
    pub amount: u64,
}

/// Errors for delta line parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected <crop>:<tier>:<amount>, got {0:?}")]
    FieldCount(String),

    #[error("invalid tier index in {line:?}")]
    InvalidTier { line: String },

    #[error("invalid amount in {line:?}")]
    InvalidAmount { line: String },
}

/// Errors for loading a delta source file
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn amount_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ .,]").expect("separator pattern"))
}

/// Parse a human-formatted integer amount, stripping thousand separators.
pub fn parse_amount(raw: &str) -> Result<u64, std::num::ParseIntError> {
    amount_separators().replace_all(raw, "").parse()
}

/// Parse a single delta line.
///
/// Returns `Ok(None)` for lines that produce no delta: blank lines, `#`
/// comments, and deltas for legacy crops whose historical data is dropped.
pub fn parse_line(line: &str) -> Result<Option<Delta>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split(':').collect();
    let &[name, tier, amount] = fields.as_slice() else {
        return Err(ParseError::FieldCount(line.to_string()));
    };

    let crop_id = crop::canonical_id(name);
    if crop::is_legacy(&crop_id) {
        return Ok(None);
    }

    let tier: usize = tier.trim().parse().map_err(|_| ParseError::InvalidTier {
        line: line.to_string(),
    })?;
    let amount = parse_amount(amount).map_err(|_| ParseError::InvalidAmount {
        line: line.to_string(),
    })?;

    Ok(Some(Delta {
        crop: crop_id,
        tier,
        amount,
    }))
}

/// Parse an ordered sequence of lines, dropping skipped ones.
pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Vec<Delta>, ParseError> {
    let mut deltas = Vec::new();
    for line in lines {
        if let Some(delta) = parse_line(line)? {
            deltas.push(delta);
        }
    }
    Ok(deltas)
}

/// Load the full delta source: the external file, then the compiled-in
/// override block.
pub fn load_source(path: &Path) -> Result<Vec<Delta>, SourceError> {
    let contents = fs::read_to_string(path)?;
    let mut deltas = parse_lines(contents.lines())?;
    deltas.extend(parse_lines(OVERRIDE_LINES.iter().copied())?);
    Ok(deltas)
}

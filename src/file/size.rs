//! Human-readable byte sizes.
//!
//! Sizes use binary (1024-based) units. Bytes print without decimals, every
//! larger unit with two. Folder totals stop at GB; system-wide totals go up
//! to PB.

use serde::Serialize;

/// Which set of units to format with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLadder {
    /// B, KB, MB, GB. Used for per-folder totals.
    Folder,
    /// B, KB, MB, GB, TB, PB. Used everywhere else.
    Full,
}

impl SizeLadder {
    fn units(&self) -> &'static [&'static str] {
        match self {
            SizeLadder::Folder => &["B", "KB", "MB", "GB"],
            SizeLadder::Full => &["B", "KB", "MB", "GB", "TB", "PB"],
        }
    }
}

/// Format a byte count with the full B..PB ladder.
pub fn humanize_size(bytes: u64) -> String {
    humanize_size_with(bytes, SizeLadder::Full)
}

/// Format a byte count, picking the smallest unit whose magnitude is below 1024.
///
/// Values beyond the last unit of the ladder stay in that unit.
pub fn humanize_size_with(bytes: u64, ladder: SizeLadder) -> String {
    let units = ladder.units();
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < units.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", units[unit])
}

/// A byte total with its human-readable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct SizeSummary {
    /// Total size in bytes.
    pub bytes: u64,
    /// Human-readable total, e.g. "2.00 KB".
    pub human: String,
}

impl SizeSummary {
    /// Summarise a byte total on the given ladder.
    pub fn new(bytes: u64, ladder: SizeLadder) -> Self {
        Self {
            bytes,
            human: humanize_size_with(bytes, ladder),
        }
    }
}

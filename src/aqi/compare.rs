//! Side-by-side comparison of the slow and fast index measures.

use crate::aqi::nowcast::{self, ObservationWindow};
use crate::aqi::{AqiError, AqiIndex, AqiScale, PollutantKind};

/// The 24-hour-average index and the NowCast index for the same window.
///
/// The two are intentionally divergent measures: the standard index moves
/// slowly with the daily average while NowCast tracks the current episode.
/// Both are always reported, never collapsed into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AqiComparison {
    pub standard_index: AqiIndex,
    pub nowcast_index: AqiIndex,
}

/// Computes both indices for one observation window.
///
/// `daily_average` is the 24-hour average concentration when the caller has
/// one; omitted, it defaults to the arithmetic mean of the window.
pub fn compare(
    window: &ObservationWindow,
    daily_average: Option<f64>,
    kind: PollutantKind,
    scale: &AqiScale,
) -> Result<AqiComparison, AqiError> {
    let daily_average = match daily_average {
        Some(value) => value,
        None => window.mean().ok_or(AqiError::EmptyWindow)?,
    };

    let standard_index = scale.index_for(daily_average, kind)?;
    let nowcast_index = nowcast::nowcast(window, kind, scale)?;

    Ok(AqiComparison {
        standard_index,
        nowcast_index,
    })
}

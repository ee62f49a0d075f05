//! Piecewise-linear breakpoint tables mapping concentrations to index values.
//!
//! Each pollutant has an ordered set of `(conc_low, conc_high, index_low,
//! index_high)` segments taken from the EPA breakpoint definitions. A
//! concentration is truncated to the table's reporting resolution, located in
//! its unique segment, and linearly interpolated to an index. Tables are
//! validated when constructed; a malformed table is rejected at load time,
//! never at conversion time.

use crate::aqi::{AQI_CEILING, AqiIndex};
use thiserror::Error;

/// One segment of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: AqiIndex,
    pub index_high: AqiIndex,
}

impl Breakpoint {
    pub const fn new(
        conc_low: f64,
        conc_high: f64,
        index_low: AqiIndex,
        index_high: AqiIndex,
    ) -> Self {
        Self {
            conc_low,
            conc_high,
            index_low,
            index_high,
        }
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("breakpoint table is empty")]
    Empty,
    #[error("invalid reporting resolution: {0}")]
    InvalidResolution(f64),
    #[error("first breakpoint must start at 0, got {0}")]
    NonZeroStart(f64),
    #[error("breakpoint {index} has an inverted concentration range")]
    InvertedRange { index: usize },
    #[error("breakpoint {index} has a decreasing index range")]
    DecreasingIndex { index: usize },
    #[error("breakpoints {0} and {1} overlap")]
    Overlap(usize, usize),
    #[error("gap between breakpoints {0} and {1} exceeds the reporting resolution")]
    Gap(usize, usize),
}

/// Validated breakpoint table for one pollutant.
///
/// `resolution` is the reporting granularity of the concentration scale
/// (0.1 ug/m3 for PM2.5, 1 ug/m3 for PM10, 0.001 ppm for O3). Adjacent
/// segments may be separated by at most one resolution step, so a truncated
/// concentration always falls inside exactly one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    resolution: f64,
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new(resolution: f64, breakpoints: Vec<Breakpoint>) -> Result<Self, TableError> {
        if !(resolution > 0.0) || !resolution.is_finite() {
            return Err(TableError::InvalidResolution(resolution));
        }
        if breakpoints.is_empty() {
            return Err(TableError::Empty);
        }
        if breakpoints[0].conc_low != 0.0 {
            return Err(TableError::NonZeroStart(breakpoints[0].conc_low));
        }
        for (index, segment) in breakpoints.iter().enumerate() {
            if segment.conc_low >= segment.conc_high {
                return Err(TableError::InvertedRange { index });
            }
            if segment.index_low > segment.index_high {
                return Err(TableError::DecreasingIndex { index });
            }
        }
        // Half a resolution step of float tolerance on the contiguity check.
        let tolerance = resolution * 0.5;
        for (index, pair) in breakpoints.windows(2).enumerate() {
            let gap = pair[1].conc_low - pair[0].conc_high;
            if gap <= 0.0 {
                return Err(TableError::Overlap(index, index + 1));
            }
            if gap > resolution + tolerance {
                return Err(TableError::Gap(index, index + 1));
            }
        }
        Ok(Self {
            resolution,
            breakpoints,
        })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Converts a concentration to an index value.
    ///
    /// Negative input clamps to 0. The concentration is truncated to the
    /// table's reporting resolution, then interpolated within its segment and
    /// rounded half away from zero. Anything above the top segment saturates
    /// to the ceiling value rather than failing.
    pub fn index_for(&self, concentration: f64) -> AqiIndex {
        let concentration = self.truncate(concentration.max(0.0));

        for segment in &self.breakpoints {
            if concentration >= segment.conc_low && concentration <= segment.conc_high {
                let span = f64::from(segment.index_high - segment.index_low);
                let slope = span / (segment.conc_high - segment.conc_low);
                let index = slope * (concentration - segment.conc_low)
                    + f64::from(segment.index_low);
                return index.round() as AqiIndex;
            }
        }

        AQI_CEILING
    }

    /// Truncates toward zero to the reporting resolution, absorbing float
    /// error so that e.g. 12.1 does not truncate to 12.0 at resolution 0.1.
    fn truncate(&self, concentration: f64) -> f64 {
        let steps = (concentration / self.resolution + 1e-9).floor();
        steps * self.resolution
    }
}

/// EPA PM2.5 breakpoints, 24-hour average, ug/m3.
pub fn pm25_table() -> Result<BreakpointTable, TableError> {
    BreakpointTable::new(
        0.1,
        vec![
            Breakpoint::new(0.0, 12.0, 0, 50),
            Breakpoint::new(12.1, 35.4, 51, 100),
            Breakpoint::new(35.5, 55.4, 101, 150),
            Breakpoint::new(55.5, 150.4, 151, 200),
            Breakpoint::new(150.5, 250.4, 201, 300),
            Breakpoint::new(250.5, 500.4, 301, 500),
        ],
    )
}

/// EPA PM10 breakpoints, 24-hour average, ug/m3.
pub fn pm10_table() -> Result<BreakpointTable, TableError> {
    BreakpointTable::new(
        1.0,
        vec![
            Breakpoint::new(0.0, 54.0, 0, 50),
            Breakpoint::new(55.0, 154.0, 51, 100),
            Breakpoint::new(155.0, 254.0, 101, 150),
            Breakpoint::new(255.0, 354.0, 151, 200),
            Breakpoint::new(355.0, 424.0, 201, 300),
            Breakpoint::new(425.0, 604.0, 301, 500),
        ],
    )
}

/// EPA ozone breakpoints, 8-hour average, ppm.
pub fn o3_table() -> Result<BreakpointTable, TableError> {
    BreakpointTable::new(
        0.001,
        vec![
            Breakpoint::new(0.0, 0.054, 0, 50),
            Breakpoint::new(0.055, 0.070, 51, 100),
            Breakpoint::new(0.071, 0.085, 101, 150),
            Breakpoint::new(0.086, 0.105, 151, 200),
            Breakpoint::new(0.106, 0.200, 201, 300),
        ],
    )
}

//! Air quality index computation.
//!
//! `AqiScale` holds the validated breakpoint tables for the pollutants the
//! deployment cares about. It is built once at startup and passed by
//! reference into everything that converts concentrations, so no conversion
//! reads ambient global state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod breakpoints;
pub mod compare;
pub mod nowcast;

use breakpoints::{BreakpointTable, TableError, o3_table, pm10_table, pm25_table};

/// Index value on the 0-500 scale.
pub type AqiIndex = u16;

/// Top of the index scale; concentrations above every breakpoint saturate here.
pub const AQI_CEILING: AqiIndex = 500;

/// Pollutants with a registered breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollutantKind {
    Pm25,
    Pm10,
    O3,
}

impl PollutantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollutantKind::Pm25 => "pm25",
            PollutantKind::Pm10 => "pm10",
            PollutantKind::O3 => "o3",
        }
    }

    /// Measurement unit of the concentration scale for this pollutant.
    pub fn unit(&self) -> &'static str {
        match self {
            PollutantKind::Pm25 | PollutantKind::Pm10 => "ug/m3",
            PollutantKind::O3 => "ppm",
        }
    }
}

impl fmt::Display for PollutantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AqiError {
    #[error("no breakpoint table registered for pollutant: {0}")]
    UnsupportedPollutant(PollutantKind),
    #[error("observation window is empty")]
    EmptyWindow,
}

/// Health-impact category for an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn for_index(index: AqiIndex) -> Self {
        match index {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for sensitive groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

/// Registry of validated breakpoint tables, one per active pollutant.
#[derive(Debug, Clone)]
pub struct AqiScale {
    tables: HashMap<PollutantKind, BreakpointTable>,
}

impl AqiScale {
    pub fn new(tables: HashMap<PollutantKind, BreakpointTable>) -> Self {
        Self { tables }
    }

    /// Scale with the standard EPA tables for PM2.5, PM10 and ozone.
    pub fn epa() -> Result<Self, TableError> {
        let mut tables = HashMap::new();
        tables.insert(PollutantKind::Pm25, pm25_table()?);
        tables.insert(PollutantKind::Pm10, pm10_table()?);
        tables.insert(PollutantKind::O3, o3_table()?);
        Ok(Self::new(tables))
    }

    pub fn supports(&self, kind: PollutantKind) -> bool {
        self.tables.contains_key(&kind)
    }

    /// Converts a concentration to an index for the given pollutant.
    ///
    /// Rounding is half away from zero; see `BreakpointTable::index_for` for
    /// the truncation and saturation rules.
    pub fn index_for(&self, concentration: f64, kind: PollutantKind) -> Result<AqiIndex, AqiError> {
        let table = self
            .tables
            .get(&kind)
            .ok_or(AqiError::UnsupportedPollutant(kind))?;
        Ok(table.index_for(concentration))
    }
}

//! Unit handling for archive quantities
//!
//! Archive quantities are stored in SI units.

use log::warn;
use serde::{Deserialize, Serialize};

const ELECTRON_VOLT: f64 = 1.602_176_634e-19;

/// Conversion factor and SI unit for a unit symbol
#[must_use]
pub fn to_si(unit: &str) -> Option<(f64, &'static str)> {
    let conversion = match unit.trim() {
        "eV" => (ELECTRON_VOLT, "J"),
        "keV" => (ELECTRON_VOLT * 1e3, "J"),
        "meV" => (ELECTRON_VOLT * 1e-3, "J"),
        "J" => (1.0, "J"),
        "A" => (1.0, "A"),
        "mA" => (1e-3, "A"),
        "uA" | "µA" => (1e-6, "A"),
        "nA" => (1e-9, "A"),
        "V" => (1.0, "V"),
        "mV" => (1e-3, "V"),
        _ => return None,
    };
    Some(conversion)
}

/// Array of values with a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: Vec<f64>,
    pub unit: String,
}

impl Quantity {
    /// Build an SI quantity from values given in `unit`
    ///
    /// Values in a unit without a known SI conversion are kept as they are.
    #[must_use]
    pub fn from_values(values: &[f64], unit: &str) -> Self {
        match to_si(unit) {
            Some((factor, si_unit)) => Self {
                magnitude: values.iter().map(|v| v * factor).collect(),
                unit: si_unit.to_string(),
            },
            None => {
                warn!("no SI conversion for unit `{unit}`, keeping values unconverted");
                Self {
                    magnitude: values.to_vec(),
                    unit: unit.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }
}

//! NOMAD-style archive entries built from a dataset
//!
//! Each spectrum becomes a measurement. Counts and the energy axis get
//! dedicated slots; every other channel is kept as an additional channel.

use crate::units::Quantity;
use crate::vocabulary;
use serde::{Deserialize, Serialize};
use xps_ast::{Dataset, Spectrum};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub measurement: Vec<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Results>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub method_name: String,
    pub instrument: Vec<Instrument>,
    pub xps: XpsMeasurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub xps: XpsInstrument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpsInstrument {
    pub n_scans: Option<String>,
    pub dwell_time: Option<String>,
    pub excitation_energy: Option<String>,
    pub source_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpsMeasurement {
    pub spectrum: ArchiveSpectrum,
    pub spectrum_region: Option<String>,
}

/// Label and unit of a channel without a dedicated slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumChannel {
    pub channel_id: String,
    pub label: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSpectrum {
    pub n_values: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<Quantity>,
    pub n_more_channels: usize,
    pub additional_channels: Vec<SpectrumChannel>,
    pub additional_channel_data: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub method: Method,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub method_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub spectroscopy: SpectroscopyProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectroscopyProperties {
    pub spectrum: ArchiveSpectrum,
}

/// Where a channel ends up in the archive spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Count,
    Energy,
    Additional,
}

fn slot_for(label: &str) -> Slot {
    match label.to_lowercase().replace(' ', "_").as_str() {
        "count" | "total_counts" => Slot::Count,
        "energy" | "kinetic_energy" => Slot::Energy,
        _ => Slot::Additional,
    }
}

impl ArchiveSpectrum {
    #[must_use]
    pub fn from_spectrum(spectrum: &Spectrum) -> Self {
        let mut archived = Self {
            n_values: spectrum.n_values(),
            ..Self::default()
        };

        for (label, values) in spectrum.metadata.data_labels.iter().zip(&spectrum.data) {
            match slot_for(&label.label) {
                Slot::Count => archived.count = Some(values.clone()),
                Slot::Energy => archived.energy = Some(Quantity::from_values(values, &label.unit)),
                Slot::Additional => {
                    archived.additional_channels.push(SpectrumChannel {
                        channel_id: label.channel_id.to_string(),
                        label: label.label.clone(),
                        unit: label.unit.clone(),
                    });
                    archived.additional_channel_data.push(values.clone());
                }
            }
        }
        archived.n_more_channels = archived.additional_channels.len();

        archived
    }
}

impl Measurement {
    #[must_use]
    pub fn from_spectrum(spectrum: &Spectrum) -> Self {
        let metadata = &spectrum.metadata;
        Self {
            method_name: metadata.method_type.clone(),
            instrument: vec![Instrument {
                xps: XpsInstrument {
                    n_scans: metadata.n_scans.clone(),
                    dwell_time: metadata.dwell_time.clone(),
                    excitation_energy: metadata.excitation_energy.clone(),
                    source_label: metadata.source_label.clone(),
                },
            }],
            xps: XpsMeasurement {
                spectrum: ArchiveSpectrum::from_spectrum(spectrum),
                spectrum_region: metadata.spectrum_region.clone(),
            },
        }
    }
}

impl Archive {
    /// One measurement per spectrum; results point at the last spectrum
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let measurement: Vec<Measurement> = dataset.iter().map(Measurement::from_spectrum).collect();
        let results = measurement.last().map(|last| Results {
            method: Method {
                method_name: vocabulary::DEFAULT_METHOD_TYPE.to_string(),
            },
            properties: Properties {
                spectroscopy: SpectroscopyProperties {
                    spectrum: last.xps.spectrum.clone(),
                },
            },
        });

        Self {
            measurement,
            results,
        }
    }
}

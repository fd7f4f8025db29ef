//! Spectrum dataset model
//!
//! A [`Dataset`] is what a converted `.xy` file turns into: one [`Spectrum`]
//! per primary channel group, with the x axis stored as the first value
//! array. It serializes as a plain JSON list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role a channel plays inside a spectrum group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Energy axis shared by every channel of the group
    Axis,
    /// Analyzer signal of the region
    Primary,
    /// Auxiliary signal recorded alongside the primary channel
    External,
}

/// Instrument settings attached to one channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub device_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer_lens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer_slit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector_voltage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workfunction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_mode: Option<String>,
}

impl DeviceSettings {
    /// Set a settings attribute by name, returning `false` for unknown names
    pub fn set(&mut self, attribute: &str, value: &str) -> bool {
        let slot = match attribute {
            "analysis_method" => &mut self.analysis_method,
            "analyzer_lens" => &mut self.analyzer_lens,
            "analyzer_slit" => &mut self.analyzer_slit,
            "detector_voltage" => &mut self.detector_voltage,
            "workfunction" => &mut self.workfunction,
            "scan_mode" => &mut self.scan_mode,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }
}

/// Label and unit of one value array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLabel {
    pub channel_id: usize,
    pub label: String,
    pub unit: String,
}

/// A channel before it is folded into [`Spectrum`]
#[derive(Debug, Clone, PartialEq)]
pub struct DataChannel {
    pub channel_id: usize,
    pub kind: ChannelKind,
    pub label: String,
    pub unit: String,
    pub values: Vec<f64>,
    pub device_settings: DeviceSettings,
}

/// Spectrum metadata
///
/// Header-derived fields stay strings: Prodigy writes them with units and
/// locale-dependent formatting that downstream consumers interpret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub timestamp: Option<String>,
    pub dwell_time: Option<String>,
    pub n_scans: Option<String>,
    pub excitation_energy: Option<String>,
    pub method_type: String,
    pub data_labels: Vec<DataLabel>,
    pub device_settings: Vec<DeviceSettings>,
    pub group_name: Option<String>,
    pub spectrum_region: Option<String>,
    pub n_values: Option<String>,
    pub source_label: Option<String>,
    pub author: Option<String>,
    pub sample: Option<String>,
    pub experiment_id: Option<String>,
    pub project: Option<String>,
    pub axis_id: usize,
    pub primary_channel_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_parameters: Option<BTreeMap<String, String>>,
}

impl Metadata {
    /// Set a header-derived attribute by name, returning `false` for unknown names
    pub fn set(&mut self, attribute: &str, value: &str) -> bool {
        let slot = match attribute {
            "timestamp" => &mut self.timestamp,
            "dwell_time" => &mut self.dwell_time,
            "group_name" => &mut self.group_name,
            "n_scans" => &mut self.n_scans,
            "spectrum_region" => &mut self.spectrum_region,
            "excitation_energy" => &mut self.excitation_energy,
            "n_values" => &mut self.n_values,
            "source_label" => &mut self.source_label,
            "author" => &mut self.author,
            "sample" => &mut self.sample,
            "experiment_id" => &mut self.experiment_id,
            "project" => &mut self.project,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }
}

/// One spectrum: metadata plus one value array per channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub metadata: Metadata,
    pub data: Vec<Vec<f64>>,
}

impl Spectrum {
    /// Fold channels into the spectrum, moving their labels and device
    /// settings into the metadata.
    #[must_use]
    pub fn from_channels(mut metadata: Metadata, channels: Vec<DataChannel>) -> Self {
        metadata.data_labels.clear();
        metadata.device_settings.clear();

        let mut data = Vec::with_capacity(channels.len());
        for channel in channels {
            let mut settings = channel.device_settings;
            settings.channel_id = Some(channel.channel_id);
            metadata.device_settings.push(settings);
            metadata.data_labels.push(DataLabel {
                channel_id: channel.channel_id,
                label: channel.label,
                unit: channel.unit,
            });
            data.push(channel.values);
        }

        Self { metadata, data }
    }

    /// Number of points on the x axis
    #[must_use]
    pub fn n_values(&self) -> usize {
        self.data.get(self.metadata.axis_id).map_or(0, Vec::len)
    }

    /// Values of the first channel carrying `label`
    #[must_use]
    pub fn channel(&self, label: &str) -> Option<&[f64]> {
        self.metadata
            .data_labels
            .iter()
            .position(|l| l.label == label)
            .and_then(|idx| self.data.get(idx))
            .map(Vec::as_slice)
    }

    /// Alignment spectra are calibration runs, not measurements
    #[must_use]
    pub fn is_align(&self) -> bool {
        self.metadata
            .spectrum_region
            .as_deref()
            .is_some_and(|region| region.to_lowercase().contains("align"))
    }
}

/// All spectra of one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub spectra: Vec<Spectrum>,
}

impl Dataset {
    #[must_use]
    pub const fn new(spectra: Vec<Spectrum>) -> Self {
        Self { spectra }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spectrum> {
        self.spectra.iter()
    }

    /// Drop alignment spectra, returning how many were removed
    pub fn remove_align(&mut self) -> usize {
        let before = self.spectra.len();
        self.spectra.retain(|spectrum| !spectrum.is_align());
        before - self.spectra.len()
    }

    /// Distinct region names in first-seen order
    #[must_use]
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = Vec::new();
        for region in self
            .spectra
            .iter()
            .filter_map(|s| s.metadata.spectrum_region.as_deref())
        {
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        regions
    }
}

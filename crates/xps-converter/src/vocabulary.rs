//! Prodigy header vocabulary
//!
//! Maps header keys and channel descriptions written by SpecsLab Prodigy
//! onto dataset attribute names, labels, units and device names.

/// Header keys that describe a whole spectrum group
pub const GROUP_METADATA_ATTRIBUTES: &[(&str, &str)] = &[
    ("Acquisition Date", "timestamp"),
    ("Dwell Time", "dwell_time"),
    ("Group", "group_name"),
    ("Number of Scans", "n_scans"),
    ("Region", "spectrum_region"),
    ("Excitation Energy", "excitation_energy"),
    ("Values/Curve", "n_values"),
    ("Source", "source_label"),
];

/// Header keys that describe instrument settings
pub const SETTINGS_ATTRIBUTES: &[(&str, &str)] = &[
    ("Analysis Method", "analysis_method"),
    ("Analyzer Lens", "analyzer_lens"),
    ("Analyzer Slit", "analyzer_slit"),
    ("Detector Voltage", "detector_voltage"),
    ("Eff. Workfunction", "workfunction"),
    ("Scan Mode", "scan_mode"),
];

pub const KNOWN_CHANNEL_LABELS: &[(&str, &str)] = &[
    ("Ring Current", "ring current"),
    ("I_mirror", "mirror current"),
    ("Excitation Energy", "excitation energy"),
    ("TEY", "total electron yield"),
];

pub const KNOWN_CHANNEL_UNITS: &[(&str, &str)] = &[("[mA]", "mA"), ("[V]", "V"), ("[eV]", "eV")];

pub const KNOWN_DEVICE_NAMES: &[(&str, &str)] = &[
    ("AMC Mono (TCP)", "monochromator"),
    ("UE56/2-PGM1 (TCP)", "beamline"),
    ("ARMIN-ADC3", "armin"),
    ("Armin10", "armin"),
];

/// Substring (lower case) marking an external channel header key
pub const EXTERNAL_CHANNEL_INDICATOR: &str = "external channel";

pub const DEFAULT_ENERGY_UNIT: &str = "eV";
pub const DEFAULT_PRIMARY_DEVICE_NAME: &str = "Phoibos Hemispherical Analyzer";
pub const DEFAULT_AXIS_DEVICE_NAME: &str = "HSA 3500 plus";
pub const DEFAULT_METHOD_TYPE: &str = "XPS";
pub const NEXAFS_METHOD_TYPE: &str = "NEXAFS";
pub const NEXAFS_AXIS_LABEL: &str = "excitation energy";
pub const NEXAFS_SCAN_MODE: &str = "ConstantFinalState";
pub const UNKNOWN_DATA_LABEL: &str = "unknown data label";
pub const UNKNOWN_DEVICE_NAME: &str = "unknown device";

pub const DEFAULT_AXIS_CHANNEL_ID: usize = 0;
pub const DEFAULT_PRIMARY_CHANNEL_ID: usize = 1;

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn first_contained(table: &[(&str, &'static str)], text: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, v)| *v)
}

/// Metadata attribute for a group header key
#[must_use]
pub fn group_attribute(key: &str) -> Option<&'static str> {
    lookup(GROUP_METADATA_ATTRIBUTES, key)
}

/// Device settings attribute for a header key
#[must_use]
pub fn settings_attribute(key: &str) -> Option<&'static str> {
    lookup(SETTINGS_ATTRIBUTES, key)
}

#[must_use]
pub fn known_label(description: &str) -> Option<&'static str> {
    first_contained(KNOWN_CHANNEL_LABELS, description)
}

#[must_use]
pub fn known_unit(description: &str) -> Option<&'static str> {
    first_contained(KNOWN_CHANNEL_UNITS, description)
}

#[must_use]
pub fn known_device(description: &str) -> Option<&'static str> {
    first_contained(KNOWN_DEVICE_NAMES, description)
}

/// Whether a header key introduces an external channel
#[must_use]
pub fn is_external_channel_key(key: &str) -> bool {
    key.to_lowercase().contains(EXTERNAL_CHANNEL_INDICATOR)
}

/// Label and unit of the primary channel, from the `Count Rate` header value
#[must_use]
pub fn primary_label_and_unit(count_rate: Option<&str>) -> (&'static str, &'static str) {
    match count_rate {
        Some("Counts") => ("total counts", "counts"),
        Some("Counts per Second") => ("count rate", "counts per second"),
        _ => ("", ""),
    }
}

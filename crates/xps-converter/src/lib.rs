//! Conversion of parsed XY documents into spectrum datasets
//!
//! Blocks are grouped into spectra (a primary channel followed by its
//! external channels), metadata is collected from the block and global
//! headers, and every group becomes one [`Spectrum`] whose first value
//! array is the energy axis.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use xps_ast::{
    ChannelKind, DataBlock, DataChannel, Dataset, DeviceSettings, Header, Metadata, SourceMap,
    Spanned, Spectrum, XpsError, XyDocument,
};
use xps_parser::Parser;

pub mod archive;
pub mod export;
pub mod matching;
pub mod tags;
pub mod units;
pub mod vocabulary;

pub use archive::Archive;
pub use matching::ParserInfo;

/// Errors raised while converting files
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Xps(#[from] XpsError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// User supplied metadata and processing switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub author: Option<String>,
    pub sample: Option<String>,
    pub experiment_id: Option<String>,
    pub project: Option<String>,
    pub axis_id: usize,
    pub primary_channel_id: usize,
    /// Drop alignment spectra
    pub remove_align: bool,
    /// Move `#key: value` group name tags into experiment parameters
    pub extract_tags: bool,
    /// Decimal places kept for parsed values
    pub precision: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            author: None,
            sample: None,
            experiment_id: None,
            project: None,
            axis_id: vocabulary::DEFAULT_AXIS_CHANNEL_ID,
            primary_channel_id: vocabulary::DEFAULT_PRIMARY_CHANNEL_ID,
            remove_align: true,
            extract_tags: true,
            precision: xps_parser::DEFAULT_PRECISION,
        }
    }
}

/// A primary block and the external blocks recorded with it
struct ChannelGroup<'doc> {
    blocks: Vec<(ChannelKind, &'doc Spanned<DataBlock>)>,
}

impl<'doc> ChannelGroup<'doc> {
    fn primary(&self) -> &'doc Spanned<DataBlock> {
        self.blocks[0].1
    }

    fn headers(&self) -> impl Iterator<Item = &'doc Header> + '_ {
        self.blocks.iter().map(|&(_, block)| &block.node.header)
    }

    fn is_nexafs(&self) -> bool {
        self.headers().any(|header| {
            header.get("Scan Mode") == Some(vocabulary::NEXAFS_SCAN_MODE)
                || header
                    .get("ColumnLabels")
                    .is_some_and(|labels| labels.contains("Excitation Energy"))
        })
    }

    /// The first `Analysis Method` in the group wins over later blocks
    fn method_type(&self) -> String {
        if self.is_nexafs() {
            return vocabulary::NEXAFS_METHOD_TYPE.to_string();
        }
        self.headers()
            .find_map(|header| header.get("Analysis Method"))
            .unwrap_or(vocabulary::DEFAULT_METHOD_TYPE)
            .to_string()
    }
}

/// Region and group names inherited by spectra whose header omits them
#[derive(Debug, Default)]
struct CarryOver {
    region: Option<String>,
    group: Option<String>,
}

/// Location context for conversion errors
struct Source<'a> {
    source_map: &'a SourceMap,
    filename: &'a str,
}

pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    #[must_use]
    pub const fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Parse and convert XY text
    ///
    /// # Errors
    ///
    /// Returns `XpsError` for malformed input or channels that cannot be assembled
    pub fn convert_str(&self, input: &str, filename: &str) -> Result<Dataset, XpsError> {
        let parser = Parser::new_with_filename(input, filename)?.with_precision(self.options.precision);
        self.convert_parsed(&parser)
    }

    /// Read, parse and convert an XY file
    ///
    /// # Errors
    ///
    /// Returns `ConvertError` if the file cannot be read or converted
    pub fn convert_file(&self, path: &Path) -> Result<Dataset, ConvertError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
        Ok(self.convert_str(&content, &path.display().to_string())?)
    }

    /// Convert the document produced by `parser`
    ///
    /// # Errors
    ///
    /// Returns `XpsError` for malformed input or channels that cannot be assembled
    pub fn convert_parsed(&self, parser: &Parser) -> Result<Dataset, XpsError> {
        let document = parser.parse()?;
        self.convert_document(&document, parser.source_map(), parser.filename())
    }

    /// Convert a parsed document
    ///
    /// # Errors
    ///
    /// Returns `XpsError` when an external channel precedes every primary
    /// channel or a row lacks its value column
    pub fn convert_document(
        &self,
        document: &XyDocument,
        source_map: &SourceMap,
        filename: &str,
    ) -> Result<Dataset, XpsError> {
        let source = Source {
            source_map,
            filename,
        };
        let groups = group_spectra(document, &source)?;
        let global = &document.global_header;

        let mut carry = CarryOver::default();
        let mut spectra = Vec::with_capacity(groups.len());
        for group in &groups {
            let metadata = self.group_metadata(group, global, &mut carry);
            let channels = channels(group, global, &source)?;
            debug!(
                "spectrum {:?}: {} channels, method {}",
                metadata.spectrum_region,
                channels.len(),
                metadata.method_type
            );
            spectra.push(Spectrum::from_channels(metadata, channels));
        }

        let mut dataset = Dataset::new(spectra);
        if self.options.remove_align {
            let removed = dataset.remove_align();
            if removed > 0 {
                debug!("removed {removed} alignment spectra");
            }
        }
        if self.options.extract_tags {
            tags::extract_all_tags(&mut dataset);
        }

        Ok(dataset)
    }

    /// Collect the metadata of one group: primary block header first, then
    /// the global header, then user options.
    fn group_metadata(&self, group: &ChannelGroup<'_>, global: &Header, carry: &mut CarryOver) -> Metadata {
        let mut metadata = Metadata::default();
        let header = &group.primary().node.header;

        apply_group_attributes(&mut metadata, header);

        // Repeated scans of a region omit Region and Group.
        match header.get("Region") {
            Some(region) => carry.region = Some(region.to_string()),
            None => metadata.spectrum_region.clone_from(&carry.region),
        }
        match header.get("Group") {
            Some(group_name) => carry.group = Some(group_name.to_string()),
            None => metadata.group_name.clone_from(&carry.group),
        }

        apply_group_attributes(&mut metadata, global);

        let options = &self.options;
        for (attribute, value) in [
            ("author", &options.author),
            ("sample", &options.sample),
            ("experiment_id", &options.experiment_id),
            ("project", &options.project),
        ] {
            if let Some(value) = value {
                metadata.set(attribute, value);
            }
        }
        metadata.axis_id = options.axis_id;
        metadata.primary_channel_id = options.primary_channel_id;
        metadata.method_type = group.method_type();

        metadata
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

fn apply_group_attributes(metadata: &mut Metadata, header: &Header) {
    for (key, value) in header.iter() {
        if let Some(attribute) = vocabulary::group_attribute(key) {
            metadata.set(attribute, value);
        }
    }
}

fn is_external(block: &DataBlock) -> bool {
    block.header.keys().any(vocabulary::is_external_channel_key)
}

/// Attach every external block to the primary block before it
fn group_spectra<'doc>(
    document: &'doc XyDocument,
    source: &Source<'_>,
) -> Result<Vec<ChannelGroup<'doc>>, XpsError> {
    let mut groups: Vec<ChannelGroup<'doc>> = Vec::new();

    for block in &document.blocks {
        if is_external(&block.node) {
            let group = groups.last_mut().ok_or_else(|| {
                XpsError::orphan_channel(block.span, source.source_map, source.filename)
            })?;
            group.blocks.push((ChannelKind::External, block));
        } else {
            groups.push(ChannelGroup {
                blocks: vec![(ChannelKind::Primary, block)],
            });
        }
    }

    Ok(groups)
}

/// The axis channel followed by one channel per block of the group
fn channels(
    group: &ChannelGroup<'_>,
    global: &Header,
    source: &Source<'_>,
) -> Result<Vec<DataChannel>, XpsError> {
    let mut channels = Vec::with_capacity(group.blocks.len() + 1);

    let axis_label = if group.is_nexafs() {
        vocabulary::NEXAFS_AXIS_LABEL
    } else {
        global.get("Energy Axis").unwrap_or_default()
    };
    channels.push(DataChannel {
        channel_id: 0,
        kind: ChannelKind::Axis,
        label: axis_label.to_string(),
        unit: vocabulary::DEFAULT_ENERGY_UNIT.to_string(),
        values: column(group.primary(), 0, source)?,
        device_settings: device_settings(ChannelKind::Axis, None, global),
    });

    for (kind, block) in &group.blocks {
        let header = &block.node.header;
        let (label, unit) = match kind {
            ChannelKind::External => external_label_and_unit(header),
            _ => {
                let (label, unit) = vocabulary::primary_label_and_unit(global.get("Count Rate"));
                (label.to_string(), unit.to_string())
            }
        };
        channels.push(DataChannel {
            channel_id: channels.len(),
            kind: *kind,
            label,
            unit,
            values: column(block, 1, source)?,
            device_settings: device_settings(*kind, Some(header), global),
        });
    }

    Ok(channels)
}

fn column(block: &Spanned<DataBlock>, index: usize, source: &Source<'_>) -> Result<Vec<f64>, XpsError> {
    block
        .node
        .rows
        .iter()
        .map(|row| {
            row.get(index).copied().ok_or_else(|| {
                XpsError::missing_column(
                    index + 1,
                    row.len(),
                    block.span,
                    source.source_map,
                    source.filename,
                )
            })
        })
        .collect()
}

/// Description written after the `External Channel...` key of a block
fn external_description(header: &Header) -> Option<&str> {
    header
        .iter()
        .find(|(key, _)| vocabulary::is_external_channel_key(key))
        .map(|(_, value)| value)
}

fn external_label_and_unit(header: &Header) -> (String, String) {
    let description = external_description(header).unwrap_or_default();
    let label = vocabulary::known_label(description).unwrap_or_else(|| {
        warn!("unrecognised external channel `{description}`");
        vocabulary::UNKNOWN_DATA_LABEL
    });
    let unit = vocabulary::known_unit(description).unwrap_or_default();
    (label.to_string(), unit.to_string())
}

/// Settings from the block header, overridden by the global header
fn device_settings(kind: ChannelKind, header: Option<&Header>, global: &Header) -> DeviceSettings {
    let mut settings = DeviceSettings::default();

    for source in header.into_iter().chain(std::iter::once(global)) {
        for (key, value) in source.iter() {
            if let Some(attribute) = vocabulary::settings_attribute(key) {
                settings.set(attribute, value);
            }
        }
    }

    settings.device_name = match kind {
        ChannelKind::Axis => vocabulary::DEFAULT_AXIS_DEVICE_NAME,
        ChannelKind::Primary => vocabulary::DEFAULT_PRIMARY_DEVICE_NAME,
        ChannelKind::External => header
            .and_then(external_description)
            .and_then(vocabulary::known_device)
            .unwrap_or(vocabulary::UNKNOWN_DEVICE_NAME),
    }
    .to_string();

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBAL: &str = "\
# Created by:        SpecsLab Prodigy, Version 4.64.1-r88350
# Energy Axis:       Kinetic Energy
# Count Rate:        Counts per Second
# Analyzer Slit:     1:7x20\\B:open
#
#
";

    fn convert(body: &str) -> Result<Dataset, XpsError> {
        Converter::default().convert_str(&format!("{GLOBAL}{body}"), "test.xy")
    }

    #[test]
    fn test_single_region() {
        let dataset = convert(
            "# Group: Survey\n# Region: C1s\n# Analysis Method: XPS\n280.0 10.5\n281.0 11.5\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 1);
        let spectrum = &dataset.spectra[0];
        assert_eq!(spectrum.data, vec![vec![280.0, 281.0], vec![10.5, 11.5]]);
        assert_eq!(spectrum.metadata.spectrum_region.as_deref(), Some("C1s"));
        assert_eq!(spectrum.metadata.method_type, "XPS");

        let labels = &spectrum.metadata.data_labels;
        assert_eq!(labels[0].label, "Kinetic Energy");
        assert_eq!(labels[0].unit, "eV");
        assert_eq!(labels[1].label, "count rate");
        assert_eq!(labels[1].unit, "counts per second");

        let settings = &spectrum.metadata.device_settings;
        assert_eq!(settings[0].device_name, "HSA 3500 plus");
        assert_eq!(settings[1].device_name, "Phoibos Hemispherical Analyzer");
        assert_eq!(settings[1].analyzer_slit.as_deref(), Some("1:7x20\\B:open"));
    }

    #[test]
    fn test_external_channels_join_previous_primary() {
        let dataset = convert(
            "# Region: C1s\n1 10\n2 20\n\n\
             # External Channel Data Cycle: 0, Channel: Ring Current [mA] (UE56/2-PGM1 (TCP))\n1 299.5\n2 299.4\n\n\
             # External Channel Data Cycle: 0, Channel: TEY [V] (ARMIN-ADC3)\n1 0.1\n2 0.2\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 1);
        let metadata = &dataset.spectra[0].metadata;
        let labels: Vec<&str> = metadata.data_labels.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Kinetic Energy", "count rate", "ring current", "total electron yield"]
        );
        assert_eq!(metadata.data_labels[2].unit, "mA");
        assert_eq!(metadata.data_labels[3].channel_id, 3);
        assert_eq!(metadata.device_settings[2].device_name, "beamline");
        assert_eq!(metadata.device_settings[3].device_name, "armin");
        assert_eq!(dataset.spectra[0].data[2], vec![299.5, 299.4]);
    }

    #[test]
    fn test_unknown_external_channel() {
        let dataset = convert(
            "# Region: C1s\n1 10\n\n# External Channel: Thermocouple [K]\n1 300\n",
        )
        .unwrap();

        let metadata = &dataset.spectra[0].metadata;
        assert_eq!(metadata.data_labels[2].label, "unknown data label");
        assert_eq!(metadata.data_labels[2].unit, "");
        assert_eq!(metadata.device_settings[2].device_name, "unknown device");
    }

    #[test]
    fn test_region_and_group_carry_over() {
        let dataset = convert(
            "# Group: Oxidation\n# Region: Ir4f\n1 10\n\n# Cycle: 1\n1 11\n\n# Group: Reduction\n# Region: Ru3d\n1 12\n",
        )
        .unwrap();

        let regions: Vec<_> = dataset
            .iter()
            .map(|s| s.metadata.spectrum_region.as_deref())
            .collect();
        assert_eq!(regions, vec![Some("Ir4f"), Some("Ir4f"), Some("Ru3d")]);
        assert_eq!(dataset.spectra[1].metadata.group_name.as_deref(), Some("Oxidation"));
    }

    #[test]
    fn test_nexafs_detection() {
        let dataset = convert(
            "# Region: O K-edge\n# Scan Mode: ConstantFinalState\n# Analysis Method: XPS\n530 1\n531 2\n",
        )
        .unwrap();

        let metadata = &dataset.spectra[0].metadata;
        assert_eq!(metadata.method_type, "NEXAFS");
        assert_eq!(metadata.data_labels[0].label, "excitation energy");
    }

    #[test]
    fn test_nexafs_detection_from_column_labels() {
        let dataset = convert(
            "# Region: O K-edge\n# ColumnLabels: Excitation Energy counts\n530 1\n531 2\n",
        )
        .unwrap();

        let metadata = &dataset.spectra[0].metadata;
        assert_eq!(metadata.method_type, "NEXAFS");
        assert_eq!(metadata.data_labels[0].label, "excitation energy");
    }

    #[test]
    fn test_method_from_analysis_method() {
        let dataset = convert(
            "# Region: Valence\n# Analysis Method: UPS\n1 10\n\n\
             # External Channel Data Cycle: 0, Channel: Ring Current [mA] (UE56/2-PGM1 (TCP))\n\
             # Analysis Method: XPS\n1 299.5\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.spectra[0].metadata.method_type, "UPS");
    }

    #[test]
    fn test_method_defaults_to_xps() {
        let dataset = convert("# Region: C1s\n1 10\n").unwrap();
        assert_eq!(dataset.spectra[0].metadata.method_type, "XPS");
    }

    #[test]
    fn test_global_header_overrides_group_metadata() {
        let input = "# Source: Al Ka\n#\n#\n# Region: C1s\n# Source: Mg Ka\n1 10\n";
        let dataset = Converter::default().convert_str(input, "test.xy").unwrap();

        assert_eq!(dataset.spectra[0].metadata.source_label.as_deref(), Some("Al Ka"));
    }

    #[test]
    fn test_options_are_applied() {
        let options = ConvertOptions {
            author: Some("M. Greiner".to_string()),
            sample: Some("S434".to_string()),
            experiment_id: Some("236".to_string()),
            ..ConvertOptions::default()
        };
        let input = format!("{GLOBAL}# Region: C1s\n1 10\n");
        let dataset = Converter::new(options).convert_str(&input, "test.xy").unwrap();

        let metadata = &dataset.spectra[0].metadata;
        assert_eq!(metadata.author.as_deref(), Some("M. Greiner"));
        assert_eq!(metadata.sample.as_deref(), Some("S434"));
        assert_eq!(metadata.experiment_id.as_deref(), Some("236"));
        assert_eq!(metadata.project, None);
        assert_eq!(metadata.axis_id, 0);
        assert_eq!(metadata.primary_channel_id, 1);
    }

    #[test]
    fn test_align_spectra_removed_unless_disabled() {
        let input = format!("{GLOBAL}# Region: Align\n1 10\n\n# Region: C1s\n1 10\n");

        let dataset = Converter::default().convert_str(&input, "test.xy").unwrap();
        assert_eq!(dataset.len(), 1);

        let options = ConvertOptions {
            remove_align: false,
            ..ConvertOptions::default()
        };
        let dataset = Converter::new(options).convert_str(&input, "test.xy").unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_tags_extracted_by_default() {
        let dataset = convert("# Group: Fe2p #temperature: 300 K\n# Region: Fe2p\n1 10\n").unwrap();

        let metadata = &dataset.spectra[0].metadata;
        assert_eq!(metadata.group_name.as_deref(), Some("Fe2p"));
        assert_eq!(
            metadata
                .experiment_parameters
                .as_ref()
                .and_then(|p| p.get("temperature"))
                .map(String::as_str),
            Some("300 K")
        );
    }

    #[test]
    fn test_orphan_external_channel() {
        let result = convert("# External Channel: Ring Current [mA]\n1 10\n");

        match result {
            Err(XpsError::OrphanChannel { line, .. }) => assert_eq!(line, 7),
            _ => panic!("Expected orphan channel error"),
        }
    }

    #[test]
    fn test_missing_value_column() {
        let result = convert("# Region: C1s\n1\n");

        match result {
            Err(XpsError::MissingColumn {
                expected, found, ..
            }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            _ => panic!("Expected missing column error"),
        }
    }

    #[test]
    fn test_convert_file_not_found() {
        let result = Converter::default().convert_file(Path::new("does/not/exist.xy"));
        assert!(matches!(result, Err(ConvertError::Io { .. })));
    }
}

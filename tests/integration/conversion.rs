//! Integration tests for parser + converter pipeline
//! Tests dataset assembly, JSON export and archive mapping on real exports

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xpsparser::converter::export;
use xpsparser::{parse_archive, parse_file, Archive, ConvertOptions};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn test_multiple_channels_dataset() {
    let dataset = parse_file(&fixture_path("multiple_channels.xy"), ConvertOptions::default()).unwrap();

    // The align spectrum is dropped; the second cycle inherits region and group.
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.regions(), vec!["Ir4f"]);

    let first = &dataset.spectra[0];
    assert_eq!(first.data.len(), 4);
    assert_eq!(first.n_values(), 5);
    assert_eq!(first.channel("ring current").map(<[f64]>::len), Some(5));
    assert_eq!(first.channel("mirror current").map(|v| v[0]), Some(0.012));

    let metadata = &first.metadata;
    assert_eq!(metadata.group_name.as_deref(), Some("Oxidation"));
    assert_eq!(metadata.source_label.as_deref(), Some("Al"));
    assert_eq!(metadata.n_scans.as_deref(), Some("3"));
    let parameters = metadata.experiment_parameters.as_ref().unwrap();
    assert_eq!(parameters.get("gas").map(String::as_str), Some("O2"));
    assert_eq!(parameters.get("temperature").map(String::as_str), Some("450 K"));

    let second = &dataset.spectra[1].metadata;
    assert_eq!(second.spectrum_region.as_deref(), Some("Ir4f"));
    assert_eq!(second.group_name.as_deref(), Some("Oxidation"));
}

#[test]
fn test_device_settings_per_channel() {
    let dataset = parse_file(&fixture_path("multiple_channels.xy"), ConvertOptions::default()).unwrap();
    let settings = &dataset.spectra[0].metadata.device_settings;

    let names: Vec<&str> = settings.iter().map(|s| s.device_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["HSA 3500 plus", "Phoibos Hemispherical Analyzer", "beamline", "monochromator"]
    );
    assert!(settings.iter().all(|s| s.workfunction.as_deref() == Some("4.49")));
    assert_eq!(settings[3].channel_id, Some(3));
}

#[test]
fn test_keep_align_and_raw_tags() {
    let options = ConvertOptions {
        remove_align: false,
        extract_tags: false,
        ..ConvertOptions::default()
    };
    let dataset = parse_file(&fixture_path("multiple_channels.xy"), options).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.spectra[0].metadata.spectrum_region.as_deref(), Some("Align Au4f"));
    assert_eq!(
        dataset.spectra[1].metadata.group_name.as_deref(),
        Some("Oxidation #temperature: 450 K, #gas: O2")
    );
    assert!(dataset.spectra[1].metadata.experiment_parameters.is_none());
}

#[test]
fn test_archive_channel_counts() {
    let test_cases = vec![("multiple_channels.xy", 5, 3), ("single_region.xy", 6, 0)];

    for (name, n_values, n_more_channels) in test_cases {
        let archive = parse_archive(&fixture_path(name)).unwrap();
        let spectrum = &archive.measurement[0].xps.spectrum;

        assert_eq!(archive.measurement[0].method_name, "XPS", "{name}");
        assert_eq!(spectrum.n_values, n_values, "{name}");
        assert_eq!(spectrum.n_more_channels, n_more_channels, "{name}");
        assert_eq!(spectrum.additional_channels.len(), n_more_channels, "{name}");
        assert_eq!(spectrum.additional_channel_data.len(), n_more_channels, "{name}");
    }
}

#[test]
fn test_single_region_counts_and_energy() {
    let archive = parse_archive(&fixture_path("single_region.xy")).unwrap();
    let spectrum = &archive.measurement[0].xps.spectrum;

    assert_eq!(spectrum.count.as_ref().map(Vec::len), Some(6));
    let energy = spectrum.energy.as_ref().unwrap();
    assert_eq!(energy.unit, "J");
    assert_eq!(energy.len(), 6);
    assert_eq!(archive.measurement[0].xps.spectrum_region.as_deref(), Some("Survey"));
    assert_eq!(
        archive.measurement[0].instrument[0].xps.dwell_time.as_deref(),
        Some("0.2")
    );
}

#[test]
fn test_json_export_then_archive() {
    let dir = TempDir::new().unwrap();
    let dataset = parse_file(&fixture_path("multiple_channels.xy"), ConvertOptions::default()).unwrap();
    let json_path = dir.path().join(
        export::json_path_for(Path::new("multiple_channels.xy"))
            .file_name()
            .unwrap(),
    );

    export::write_json(&dataset, &json_path).unwrap();
    let loaded = export::read_dataset(&json_path).unwrap();

    assert_eq!(loaded, dataset);
    assert_eq!(Archive::from_dataset(&loaded), Archive::from_dataset(&dataset));

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(raw[0]["metadata"]["data_labels"][2]["label"], "ring current");
    assert_eq!(raw[0]["metadata"]["device_settings"][0]["channel_id"], 0);
}

#[test]
fn test_missing_file() {
    let result = parse_file(Path::new("tests/data/missing.xy"), ConvertOptions::default());
    assert!(result.is_err());
}

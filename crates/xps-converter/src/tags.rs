//! User tags embedded in Prodigy group names
//!
//! Operators annotate a group as `Fe2p #temperature: 300 K, #pressure: 1e-6 mbar`.
//! Each `#key: value` part becomes an experiment parameter and the group
//! name is reduced to the text before the first `#`.

use std::collections::BTreeMap;
use xps_ast::{Dataset, Metadata};

const TAG_MARKER: char = '#';

/// Extract tags from the group name of every spectrum
pub fn extract_all_tags(dataset: &mut Dataset) {
    for spectrum in &mut dataset.spectra {
        extract_tags(&mut spectrum.metadata);
    }
}

/// Move `#key: value` tags from the group name into `experiment_parameters`
///
/// When the group name has no text before its first tag, the tag values
/// joined by `, ` stand in for it.
pub fn extract_tags(metadata: &mut Metadata) {
    let mut parameters = BTreeMap::new();

    if let Some(group_name) = metadata.group_name.take() {
        let mut parts = group_name.split(TAG_MARKER);
        let name = parts.next().unwrap_or_default().trim();
        let mut values = String::new();
        let mut tagged = false;

        for part in parts {
            tagged = true;
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let value = value.trim().trim_matches(',').trim();
            if !value.is_empty() {
                parameters.insert(key.trim().to_string(), value.to_string());
                values.push_str(value);
                values.push_str(", ");
            }
        }

        metadata.group_name = Some(if !tagged {
            group_name.clone()
        } else if name.is_empty() {
            values
        } else {
            name.to_string()
        });
    }

    metadata.experiment_parameters = Some(parameters);
}

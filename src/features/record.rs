/*
 *  features/record.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Feature metadata cached for one monitor model
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::BTreeMap;
use super::feature_list::FeatureList;
use super::metadata::{FeatureMetadata, MccsVersion};
use crate::model_key::MonitorModelKey;

/// Whether a definition was found for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// No usable definition; cached so the lookup is not repeated
    NotFound,
    Populated,
}

/// Feature metadata for one monitor model.
///
/// Records are owned by a [`FeatureRegistry`](super::FeatureRegistry);
/// callers only ever borrow them.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicFeaturesRecord {
    key: MonitorModelKey,
    source: Option<String>,
    vspec: MccsVersion,
    status: RecordStatus,
    features: BTreeMap<u8, FeatureMetadata>,
}

impl DynamicFeaturesRecord {
    pub(crate) fn not_found(key: MonitorModelKey, source: Option<&str>) -> Self {
        Self {
            key,
            source: source.map(str::to_string),
            vspec: MccsVersion::UNKNOWN,
            status: RecordStatus::NotFound,
            features: BTreeMap::new(),
        }
    }

    pub(crate) fn populated(
        key: MonitorModelKey,
        source: Option<&str>,
        vspec: MccsVersion,
        features: BTreeMap<u8, FeatureMetadata>,
    ) -> Self {
        Self {
            key,
            source: source.map(str::to_string),
            vspec,
            status: RecordStatus::Populated,
            features,
        }
    }

    pub fn key(&self) -> &MonitorModelKey {
        &self.key
    }

    /// Where the definition came from, e.g. a file path
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn vspec(&self) -> MccsVersion {
        self.vspec
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn is_not_found(&self) -> bool {
        self.status == RecordStatus::NotFound
    }

    pub fn lookup_feature(&self, feature_code: u8) -> Option<&FeatureMetadata> {
        self.features.get(&feature_code)
    }

    /// Features in ascending feature code order
    pub fn features(&self) -> impl Iterator<Item = &FeatureMetadata> {
        self.features.values()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Codes of the features this record defines
    pub fn feature_list(&self) -> FeatureList {
        self.features.keys().copied().collect()
    }

    /// Multi-line debug report, indented by `depth` levels.
    pub fn report(&self, depth: usize) -> String {
        let indent = "   ".repeat(depth);
        let mut lines = vec![
            format!("{}Dynamic features for {}", indent, self.key),
            format!("{}   source:   {}", indent, self.source.as_deref().unwrap_or("(none)")),
            format!("{}   vspec:    {}", indent, self.vspec),
            format!("{}   status:   {:?}", indent, self.status),
            format!("{}   codes:    {}", indent, self.feature_list()),
        ];
        for meta in self.features() {
            lines.push(format!("{}   0x{:02x} {} {:?}", indent, meta.feature_code, meta.name, meta.flags));
            if let Some(desc) = &meta.description {
                lines.push(format!("{}         {}", indent, desc));
            }
            for (value, name) in &meta.simple_values {
                lines.push(format!("{}         0x{:02x}: {}", indent, value, name));
            }
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

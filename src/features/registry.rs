/*
 *  features/registry.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cache of dynamic feature records keyed by monitor model
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

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::debug;
use thiserror::Error;

use super::metadata::FeatureMetadata;
use super::parser::{DefinitionError, ParsedDefinition, parse_definition};
use super::record::DynamicFeaturesRecord;
use crate::model_key::MonitorModelKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureRegistryError {
    #[error("cannot register features for an undefined monitor model key")]
    UndefinedKey,
}

/// Result of [`FeatureRegistry::get_or_create`].
#[derive(Debug)]
pub struct Created<'a> {
    pub record: &'a DynamicFeaturesRecord,
    /// `false` when the record was already cached
    pub created: bool,
    /// Problems found while parsing; always empty for cached records
    pub diagnostics: Vec<DefinitionError>,
}

/// Per-model feature metadata, at most one record per [`MonitorModelKey`].
///
/// Not internally synchronized. Share it between threads behind a `Mutex`
/// or `RwLock`; record creation needs the exclusive lock.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    records: HashMap<MonitorModelKey, DynamicFeaturesRecord>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record for `key`, creating it on a miss.
    ///
    /// On a miss `lines` are parsed into a new record. Absent lines, or
    /// lines with nothing but comments, produce a record marked not found
    /// so the same model is not resolved again. On a hit `lines` are not
    /// looked at.
    pub fn get_or_create<S: AsRef<str>>(
        &mut self,
        key: &MonitorModelKey,
        lines: Option<&[S]>,
        source: Option<&str>,
    ) -> Result<Created<'_>, FeatureRegistryError> {
        if !key.is_defined() {
            return Err(FeatureRegistryError::UndefinedKey);
        }

        match self.records.entry(key.clone()) {
            Entry::Occupied(entry) => Ok(Created {
                record: entry.into_mut(),
                created: false,
                diagnostics: Vec::new(),
            }),
            Entry::Vacant(entry) => {
                let (parsed, diagnostics) = match lines {
                    Some(lines) => parse_definition(key, lines),
                    None => (ParsedDefinition::Empty, Vec::new()),
                };
                let record = match parsed {
                    ParsedDefinition::Empty => DynamicFeaturesRecord::not_found(key.clone(), source),
                    ParsedDefinition::Parsed { vspec, features } => {
                        DynamicFeaturesRecord::populated(key.clone(), source, vspec, features)
                    }
                };
                debug!("Created dynamic features record for {}: {:?}, {} features, {} diagnostics",
                    key, record.status(), record.feature_count(), diagnostics.len());

                Ok(Created {
                    record: entry.insert(record),
                    created: true,
                    diagnostics,
                })
            }
        }
    }

    pub fn get(&self, key: &MonitorModelKey) -> Option<&DynamicFeaturesRecord> {
        self.records.get(key)
    }

    pub fn lookup_feature(&self, key: &MonitorModelKey, feature_code: u8) -> Option<&FeatureMetadata> {
        self.records.get(key)?.lookup_feature(feature_code)
    }

    /// Drops the record for `key`; the next lookup resolves it again.
    pub fn invalidate(&mut self, key: &MonitorModelKey) -> bool {
        let removed = self.records.remove(key).is_some();
        if removed {
            debug!("Invalidated dynamic features record for {}", key);
        }
        removed
    }

    pub fn clear_all(&mut self) {
        debug!("Clearing {} dynamic features records", self.records.len());
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MonitorModelKey> {
        self.records.keys()
    }
}

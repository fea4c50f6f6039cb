/*
 *  features/mod.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dynamic (per model) VCP feature definitions
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

pub mod metadata;
pub mod feature_list;
pub mod record;
pub mod parser;
pub mod registry;
pub mod loader;

pub use metadata::{FeatureFlags, FeatureMetadata, MccsVersion};
pub use feature_list::FeatureList;
pub use record::{DynamicFeaturesRecord, RecordStatus};
pub use parser::{DefinitionError, DefinitionErrorKind, ParsedDefinition, parse_definition};
pub use registry::{Created, FeatureRegistry, FeatureRegistryError};
pub use loader::{FeatureDefinitionLoader, LoaderError};

/*
 *  model_key.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Monitor identity used to key per-model feature metadata
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

use std::fmt;
use thiserror::Error;

/// EDID manufacturer id field size, including the trailing NUL
pub const EDID_MFG_ID_FIELD_SIZE: usize = 4;

/// EDID model name field size, including the trailing NUL
pub const EDID_MODEL_NAME_FIELD_SIZE: usize = 14;

pub const MAX_MFG_ID_LEN: usize = EDID_MFG_ID_FIELD_SIZE - 1;
pub const MAX_MODEL_NAME_LEN: usize = EDID_MODEL_NAME_FIELD_SIZE - 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelKeyError {
    #[error("invalid argument: {field} '{value}' exceeds {max} bytes")]
    InvalidArgument {
        field: &'static str,
        value: String,
        max: usize,
    },
}

// The undefined key is its own variant, so no combination of real field
// values (empty strings, product code 0) can ever compare equal to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyRepr {
    Undefined,
    Defined {
        mfg_id: String,
        model_name: String,
        product_code: u16,
    },
}

/// Manufacturer id, model name and product code, as found in the EDID.
///
/// Equality is field-wise and case sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonitorModelKey(KeyRepr);

impl MonitorModelKey {
    /// Fields longer than their EDID counterparts are rejected, never truncated.
    pub fn new(mfg_id: &str, model_name: &str, product_code: u16) -> Result<Self, ModelKeyError> {
        if mfg_id.len() > MAX_MFG_ID_LEN {
            return Err(ModelKeyError::InvalidArgument {
                field: "mfg_id",
                value: mfg_id.to_string(),
                max: MAX_MFG_ID_LEN,
            });
        }
        if model_name.len() > MAX_MODEL_NAME_LEN {
            return Err(ModelKeyError::InvalidArgument {
                field: "model_name",
                value: model_name.to_string(),
                max: MAX_MODEL_NAME_LEN,
            });
        }
        Ok(MonitorModelKey(KeyRepr::Defined {
            mfg_id: mfg_id.to_string(),
            model_name: model_name.to_string(),
            product_code,
        }))
    }

    pub fn undefined() -> Self {
        MonitorModelKey(KeyRepr::Undefined)
    }

    pub fn is_defined(&self) -> bool {
        matches!(self.0, KeyRepr::Defined { .. })
    }

    pub fn mfg_id(&self) -> Option<&str> {
        match &self.0 {
            KeyRepr::Defined { mfg_id, .. } => Some(mfg_id),
            KeyRepr::Undefined => None,
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        match &self.0 {
            KeyRepr::Defined { model_name, .. } => Some(model_name),
            KeyRepr::Undefined => None,
        }
    }

    pub fn product_code(&self) -> Option<u16> {
        match &self.0 {
            KeyRepr::Defined { product_code, .. } => Some(*product_code),
            KeyRepr::Undefined => None,
        }
    }

    /// File-name safe identifier `MFG-MODEL-CODE`.
    ///
    /// Characters of the model name outside `[A-Za-z0-9]` become `_`, so
    /// `"DELL U2415"` yields `DEL-DELL_U2415-41060`.
    pub fn model_id_string(&self) -> Option<String> {
        match &self.0 {
            KeyRepr::Defined { mfg_id, model_name, product_code } => {
                let model: String = model_name
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                    .collect();
                Some(format!("{}-{}-{}", mfg_id, model, product_code))
            }
            KeyRepr::Undefined => None,
        }
    }
}

impl Default for MonitorModelKey {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Diagnostics only: `mfg:model:product_code`
impl fmt::Display for MonitorModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            KeyRepr::Defined { mfg_id, model_name, product_code } => {
                write!(f, "{}:{}:{}", mfg_id, model_name, product_code)
            }
            KeyRepr::Undefined => f.write_str("[undefined]"),
        }
    }
}

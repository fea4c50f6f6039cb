/*
 *  features/metadata.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per-feature interpretation metadata
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
use std::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Access and type attributes of a VCP feature
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u16 {
        const RO           = 0x0001;
        const WO           = 0x0002;
        const RW           = 0x0004;
        /// Continuous value (range)
        const CONTINUOUS   = 0x0010;
        /// Non-continuous value with a list of named values
        const SIMPLE_NC    = 0x0020;
        const TABLE        = 0x0040;
        /// Defined by a user supplied definition rather than MCCS
        const USER_DEFINED = 0x1000;

        const ACCESS = Self::RO.bits() | Self::WO.bits() | Self::RW.bits();
        const KIND   = Self::CONTINUOUS.bits() | Self::SIMPLE_NC.bits() | Self::TABLE.bits();
    }
}

impl FeatureFlags {
    /// Flag for one `ATTRS` token, `None` for an unrecognized token.
    pub fn from_attr_token(token: &str) -> Option<FeatureFlags> {
        match token.to_ascii_uppercase().as_str() {
            "RO" => Some(FeatureFlags::RO),
            "WO" => Some(FeatureFlags::WO),
            "RW" => Some(FeatureFlags::RW),
            "C" => Some(FeatureFlags::CONTINUOUS),
            "NC" => Some(FeatureFlags::SIMPLE_NC),
            "T" => Some(FeatureFlags::TABLE),
            _ => None,
        }
    }

    pub fn is_readable(self) -> bool {
        self.intersects(FeatureFlags::RO | FeatureFlags::RW)
    }

    pub fn is_writable(self) -> bool {
        self.intersects(FeatureFlags::WO | FeatureFlags::RW)
    }
}

/// How one feature code is to be interpreted for a particular model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMetadata {
    pub feature_code: u8,
    pub name: String,
    pub description: Option<String>,
    pub flags: FeatureFlags,
    /// Named values of a non-continuous feature, in definition order
    pub simple_values: Vec<(u8, String)>,
}

impl FeatureMetadata {
    pub fn new(feature_code: u8, name: &str) -> Self {
        Self {
            feature_code,
            name: name.to_string(),
            description: None,
            flags: FeatureFlags::USER_DEFINED,
            simple_values: Vec::new(),
        }
    }

    pub fn value_name(&self, value: u8) -> Option<&str> {
        self.simple_values
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, name)| name.as_str())
    }
}

/// MCCS version a definition was written against; `0.0` when unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MccsVersion {
    pub major: u8,
    pub minor: u8,
}

impl MccsVersion {
    pub const UNKNOWN: MccsVersion = MccsVersion { major: 0, minor: 0 };
    pub const V20: MccsVersion = MccsVersion { major: 2, minor: 0 };
    pub const V21: MccsVersion = MccsVersion { major: 2, minor: 1 };
    pub const V22: MccsVersion = MccsVersion { major: 2, minor: 2 };
    pub const V30: MccsVersion = MccsVersion { major: 3, minor: 0 };

    pub fn is_known(self) -> bool {
        self != Self::UNKNOWN
    }
}

impl FromStr for MccsVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.trim().split_once('.').ok_or(())?;
        Ok(MccsVersion {
            major: major.parse().map_err(|_| ())?,
            minor: minor.parse().map_err(|_| ())?,
        })
    }
}

impl fmt::Display for MccsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_tokens() {
        assert_eq!(FeatureFlags::from_attr_token("rw"), Some(FeatureFlags::RW));
        assert_eq!(FeatureFlags::from_attr_token("NC"), Some(FeatureFlags::SIMPLE_NC));
        assert_eq!(FeatureFlags::from_attr_token("XX"), None);
        assert!((FeatureFlags::RO | FeatureFlags::CONTINUOUS).is_readable());
        assert!(!FeatureFlags::RO.is_writable());
    }

    #[test]
    fn test_value_name() {
        let mut meta = FeatureMetadata::new(0x14, "Select color preset");
        meta.simple_values.push((0x05, "6500 K".to_string()));
        assert_eq!(meta.value_name(0x05), Some("6500 K"));
        assert_eq!(meta.value_name(0x0b), None);
    }

    #[test]
    fn test_mccs_version() {
        assert_eq!("2.1".parse::<MccsVersion>(), Ok(MccsVersion::V21));
        assert!("2".parse::<MccsVersion>().is_err());
        assert!("x.y".parse::<MccsVersion>().is_err());
        assert_eq!(MccsVersion::V22.to_string(), "2.2");
        assert!(!MccsVersion::default().is_known());
    }
}

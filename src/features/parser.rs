/*
 *  features/parser.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Best-effort parser for user supplied feature definitions
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

//! Definitions are line oriented. Blank lines and lines starting with `*`
//! or `#` are ignored. Header keywords come first, then one block per
//! feature:
//!
//! ```text
//! MFG_ID        DEL
//! MODEL         AW3418DW
//! PRODUCT_CODE  41059
//! MCCS_VERSION  2.1
//! FEATURE_CODE  14  Select color preset
//!    DESC   Select a color temperature
//!    ATTRS  RW NC
//!    VALUE  05 6500 K
//! ```
//!
//! Errors are collected per line; a broken block never stops the blocks
//! after it from being read.

use std::collections::BTreeMap;

use thiserror::Error;

use super::metadata::{FeatureFlags, FeatureMetadata, MccsVersion};
use crate::model_key::MonitorModelKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionErrorKind {
    #[error("unrecognized keyword '{0}'")]
    UnknownKeyword(String),
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid feature code '{0}'")]
    InvalidFeatureCode(String),
    #[error("duplicate feature code 0x{0:02x}, block ignored")]
    DuplicateFeatureCode(u8),
    #[error("invalid value code '{0}'")]
    InvalidValueCode(String),
    #[error("unrecognized attribute '{0}'")]
    InvalidAttribute(String),
    #[error("conflicting attributes '{0}'")]
    ConflictingAttributes(String),
    #[error("{0} outside of a FEATURE_CODE block")]
    AttributeOutsideFeature(&'static str),
    #[error("invalid product code '{0}'")]
    InvalidProductCode(String),
    #[error("invalid MCCS version '{0}'")]
    InvalidMccsVersion(String),
    #[error("{field} '{found}' does not match monitor value '{expected}'")]
    KeyMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },
    #[error("feature 0x{0:02x} has VALUE lines but is not NC")]
    ValuesWithoutNc(u8),
}

/// One problem found in a definition, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct DefinitionError {
    pub line: usize,
    pub kind: DefinitionErrorKind,
}

/// Outcome of parsing one definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDefinition {
    /// Nothing left after filtering comments and blank lines
    Empty,
    Parsed {
        vspec: MccsVersion,
        features: BTreeMap<u8, FeatureMetadata>,
    },
}

struct OpenBlock {
    line: usize,
    meta: FeatureMetadata,
    attrs_seen: bool,
}

struct Parser<'k> {
    key: &'k MonitorModelKey,
    vspec: MccsVersion,
    features: BTreeMap<u8, FeatureMetadata>,
    errors: Vec<DefinitionError>,
    block: Option<OpenBlock>,
    // attribute lines of a rejected block are dropped silently
    skipping: bool,
}

fn parse_hex_byte(s: &str) -> Option<u8> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('x'))
        .or_else(|| s.strip_prefix('X'))
        .unwrap_or(s);
    // from_str_radix alone would take a sign
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (s, ""),
    }
}

impl<'k> Parser<'k> {
    fn new(key: &'k MonitorModelKey) -> Self {
        Self {
            key,
            vspec: MccsVersion::UNKNOWN,
            features: BTreeMap::new(),
            errors: Vec::new(),
            block: None,
            skipping: false,
        }
    }

    fn error(&mut self, line: usize, kind: DefinitionErrorKind) {
        self.errors.push(DefinitionError { line, kind });
    }

    fn close_block(&mut self) {
        let Some(OpenBlock { line, mut meta, attrs_seen }) = self.block.take() else {
            return;
        };
        if !attrs_seen {
            meta.flags |= FeatureFlags::RW | FeatureFlags::CONTINUOUS;
        }
        if !meta.simple_values.is_empty() && !meta.flags.contains(FeatureFlags::SIMPLE_NC) {
            self.error(line, DefinitionErrorKind::ValuesWithoutNc(meta.feature_code));
        }
        self.features.insert(meta.feature_code, meta);
    }

    fn check_header(&mut self, line: usize, field: &'static str, expected: Option<&str>, found: &str) {
        if let Some(expected) = expected {
            if expected != found {
                self.error(line, DefinitionErrorKind::KeyMismatch {
                    field,
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
        }
    }

    fn feature_code(&mut self, line: usize, rest: &str) {
        self.close_block();
        self.skipping = true;

        let (code_text, name) = split_word(rest);
        if code_text.is_empty() {
            self.error(line, DefinitionErrorKind::MissingValue("FEATURE_CODE"));
            return;
        }
        let Some(code) = parse_hex_byte(code_text) else {
            self.error(line, DefinitionErrorKind::InvalidFeatureCode(code_text.to_string()));
            return;
        };
        if name.is_empty() {
            self.error(line, DefinitionErrorKind::MissingValue("feature name"));
            return;
        }
        if self.features.contains_key(&code) {
            self.error(line, DefinitionErrorKind::DuplicateFeatureCode(code));
            return;
        }

        self.skipping = false;
        self.block = Some(OpenBlock {
            line,
            meta: FeatureMetadata::new(code, name),
            attrs_seen: false,
        });
    }

    fn attrs(&mut self, line: usize, rest: &str) {
        let mut flags = FeatureFlags::empty();
        let mut bad = Vec::new();
        for token in rest.split_whitespace() {
            match FeatureFlags::from_attr_token(token) {
                Some(f) => flags |= f,
                None => bad.push(token.to_string()),
            }
        }
        for token in bad {
            self.error(line, DefinitionErrorKind::InvalidAttribute(token));
        }
        if (flags & FeatureFlags::ACCESS).bits().count_ones() > 1
            || (flags & FeatureFlags::KIND).bits().count_ones() > 1
        {
            self.error(line, DefinitionErrorKind::ConflictingAttributes(rest.to_string()));
        }
        if !flags.intersects(FeatureFlags::ACCESS) {
            flags |= FeatureFlags::RW;
        }
        if !flags.intersects(FeatureFlags::KIND) {
            flags |= FeatureFlags::CONTINUOUS;
        }
        if let Some(block) = self.block.as_mut() {
            block.meta.flags = flags | FeatureFlags::USER_DEFINED;
            block.attrs_seen = true;
        }
    }

    fn value(&mut self, line: usize, rest: &str) {
        let (code_text, name) = split_word(rest);
        match parse_hex_byte(code_text) {
            Some(code) if !name.is_empty() => {
                if let Some(block) = self.block.as_mut() {
                    block.meta.simple_values.push((code, name.to_string()));
                }
            }
            Some(_) => self.error(line, DefinitionErrorKind::MissingValue("VALUE name")),
            None => self.error(line, DefinitionErrorKind::InvalidValueCode(code_text.to_string())),
        }
    }

    fn line(&mut self, line: usize, text: &str) {
        let key = self.key;
        let (keyword, rest) = split_word(text);
        let keyword = keyword.to_ascii_uppercase();

        match keyword.as_str() {
            "FEATURE_CODE" => self.feature_code(line, rest),
            "DESC" | "ATTRS" | "VALUE" => {
                let kw: &'static str = match keyword.as_str() {
                    "DESC" => "DESC",
                    "ATTRS" => "ATTRS",
                    _ => "VALUE",
                };
                if self.skipping {
                    return;
                }
                if self.block.is_none() {
                    self.error(line, DefinitionErrorKind::AttributeOutsideFeature(kw));
                    return;
                }
                if rest.is_empty() {
                    self.error(line, DefinitionErrorKind::MissingValue(kw));
                    return;
                }
                match kw {
                    "DESC" => {
                        if let Some(block) = self.block.as_mut() {
                            block.meta.description = Some(rest.to_string());
                        }
                    }
                    "ATTRS" => self.attrs(line, rest),
                    _ => self.value(line, rest),
                }
            }
            "MFG_ID" => {
                if rest.is_empty() {
                    self.error(line, DefinitionErrorKind::MissingValue("MFG_ID"));
                } else {
                    self.check_header(line, "MFG_ID", key.mfg_id(), rest);
                }
            }
            "MODEL" => {
                if rest.is_empty() {
                    self.error(line, DefinitionErrorKind::MissingValue("MODEL"));
                } else {
                    self.check_header(line, "MODEL", key.model_name(), rest);
                }
            }
            "PRODUCT_CODE" => match rest.parse::<u16>() {
                Ok(code) => {
                    let expected = key.product_code().map(|c| c.to_string());
                    self.check_header(line, "PRODUCT_CODE", expected.as_deref(), &code.to_string());
                }
                Err(_) => self.error(line, DefinitionErrorKind::InvalidProductCode(rest.to_string())),
            },
            "MCCS_VERSION" => match rest.parse::<MccsVersion>() {
                Ok(v) => self.vspec = v,
                Err(()) => self.error(line, DefinitionErrorKind::InvalidMccsVersion(rest.to_string())),
            },
            _ => self.error(line, DefinitionErrorKind::UnknownKeyword(keyword)),
        }
    }
}

/// Parses a definition for `key`, collecting every error instead of
/// stopping at the first.
pub fn parse_definition<S: AsRef<str>>(
    key: &MonitorModelKey,
    lines: &[S],
) -> (ParsedDefinition, Vec<DefinitionError>) {
    let mut parser = Parser::new(key);
    let mut significant = 0usize;

    for (idx, raw) in lines.iter().enumerate() {
        let text = raw.as_ref().trim();
        if text.is_empty() || text.starts_with('*') || text.starts_with('#') {
            continue;
        }
        significant += 1;
        parser.line(idx + 1, text);
    }

    if significant == 0 {
        return (ParsedDefinition::Empty, parser.errors);
    }
    parser.close_block();

    let parsed = ParsedDefinition::Parsed {
        vspec: parser.vspec,
        features: parser.features,
    };
    (parsed, parser.errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> MonitorModelKey {
        MonitorModelKey::new("DEL", "AW3418DW", 41059).unwrap()
    }

    fn features(parsed: ParsedDefinition) -> BTreeMap<u8, FeatureMetadata> {
        match parsed {
            ParsedDefinition::Parsed { features, .. } => features,
            ParsedDefinition::Empty => panic!("expected parsed definition"),
        }
    }

    #[test]
    fn test_full_definition() {
        let lines = [
            "* Dell AW3418DW",
            "MFG_ID DEL",
            "MODEL AW3418DW",
            "PRODUCT_CODE 41059",
            "MCCS_VERSION 2.1",
            "",
            "FEATURE_CODE 14 Select color preset",
            "   DESC Select a color temperature",
            "   ATTRS RW NC",
            "   VALUE 05 6500 K",
            "   VALUE 0b User 1",
            "FEATURE_CODE 10 Brightness",
        ];
        let (parsed, errors) = parse_definition(&key(), &lines);
        assert!(errors.is_empty(), "{:?}", errors);

        let ParsedDefinition::Parsed { vspec, features } = parsed else {
            panic!("expected parsed definition");
        };
        assert_eq!(vspec, MccsVersion::V21);
        assert_eq!(features.len(), 2);

        let preset = &features[&0x14];
        assert_eq!(preset.name, "Select color preset");
        assert_eq!(preset.description.as_deref(), Some("Select a color temperature"));
        assert!(preset.flags.contains(FeatureFlags::RW | FeatureFlags::SIMPLE_NC | FeatureFlags::USER_DEFINED));
        assert_eq!(preset.value_name(0x0b), Some("User 1"));

        let brightness = &features[&0x10];
        assert!(brightness.flags.contains(FeatureFlags::RW | FeatureFlags::CONTINUOUS));
    }

    #[test]
    fn test_comments_only_is_empty() {
        let (parsed, errors) = parse_definition(&key(), &["* nothing here", "# or here", "   "]);
        assert_eq!(parsed, ParsedDefinition::Empty);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_bad_block_does_not_stop_later_blocks() {
        let lines = [
            "FEATURE_CODE zz Broken",
            "   ATTRS RW C",
            "FEATURE_CODE 10 Brightness",
            "   ATTRS RW C",
            "BOGUS line",
            "FEATURE_CODE 12 Contrast",
        ];
        let (parsed, errors) = parse_definition(&key(), &lines);
        let features = features(parsed);
        assert_eq!(features.keys().copied().collect::<Vec<_>>(), vec![0x10, 0x12]);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[0].kind, DefinitionErrorKind::InvalidFeatureCode("zz".to_string()));
        assert_eq!(errors[1].line, 5);
        assert!(matches!(errors[1].kind, DefinitionErrorKind::UnknownKeyword(_)));
    }

    #[test]
    fn test_duplicate_feature_code_keeps_first() {
        let lines = [
            "FEATURE_CODE 10 Brightness",
            "FEATURE_CODE 0x10 Luminance",
            "   DESC ignored",
        ];
        let (parsed, errors) = parse_definition(&key(), &lines);
        let features = features(parsed);
        assert_eq!(features[&0x10].name, "Brightness");
        assert_eq!(features[&0x10].description, None);
        assert_eq!(errors, vec![DefinitionError {
            line: 2,
            kind: DefinitionErrorKind::DuplicateFeatureCode(0x10),
        }]);
    }

    #[test]
    fn test_header_mismatch_reported() {
        let lines = ["MFG_ID ACI", "PRODUCT_CODE 1", "FEATURE_CODE 10 Brightness"];
        let (parsed, errors) = parse_definition(&key(), &lines);
        assert_eq!(features(parsed).len(), 1);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0].kind, DefinitionErrorKind::KeyMismatch { field: "MFG_ID", .. }));
        assert!(matches!(errors[1].kind, DefinitionErrorKind::KeyMismatch { field: "PRODUCT_CODE", .. }));
    }

    #[test]
    fn test_attribute_problems() {
        let lines = [
            "ATTRS RW",
            "FEATURE_CODE 60 Input source",
            "   ATTRS RW QQ",
            "   VALUE 0f DisplayPort-1",
            "   VALUE gg Broken",
            "FEATURE_CODE 62 Volume",
            "   ATTRS RO RW C",
        ];
        let (parsed, errors) = parse_definition(&key(), &lines);
        let features = features(parsed);

        let kinds: Vec<_> = errors.iter().map(|e| (e.line, e.kind.clone())).collect();
        assert_eq!(kinds, vec![
            (1, DefinitionErrorKind::AttributeOutsideFeature("ATTRS")),
            (3, DefinitionErrorKind::InvalidAttribute("QQ".to_string())),
            (5, DefinitionErrorKind::InvalidValueCode("gg".to_string())),
            (2, DefinitionErrorKind::ValuesWithoutNc(0x60)),
            (7, DefinitionErrorKind::ConflictingAttributes("RO RW C".to_string())),
        ]);
        // value kept despite the diagnostic
        assert_eq!(features[&0x60].value_name(0x0f), Some("DisplayPort-1"));
        assert!(features.contains_key(&0x62));
    }

    #[test]
    fn test_signed_codes_rejected() {
        assert_eq!(parse_hex_byte("+f"), None);
        assert_eq!(parse_hex_byte("x+5"), None);
        assert_eq!(parse_hex_byte("0x1F"), Some(0x1f));

        let lines = [
            "FEATURE_CODE +f Bogus",
            "FEATURE_CODE 60 Input source",
            "   ATTRS RW NC",
            "   VALUE +5 x",
            "   VALUE 11 HDMI-1",
        ];
        let (parsed, errors) = parse_definition(&key(), &lines);
        let features = features(parsed);
        assert_eq!(features.keys().copied().collect::<Vec<_>>(), vec![0x60]);
        assert_eq!(features[&0x60].simple_values, vec![(0x11, "HDMI-1".to_string())]);

        let kinds: Vec<_> = errors.iter().map(|e| (e.line, e.kind.clone())).collect();
        assert_eq!(kinds, vec![
            (1, DefinitionErrorKind::InvalidFeatureCode("+f".to_string())),
            (4, DefinitionErrorKind::InvalidValueCode("+5".to_string())),
        ]);
    }

    #[test]
    fn test_error_display() {
        let err = DefinitionError {
            line: 7,
            kind: DefinitionErrorKind::InvalidFeatureCode("zz".to_string()),
        };
        assert_eq!(err.to_string(), "line 7: invalid feature code 'zz'");
    }
}

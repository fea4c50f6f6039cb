/*
 *  features/feature_list.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Set of VCP feature codes
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

/// Membership of all 256 feature codes, one bit each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeatureList {
    bits: [u64; 4],
}

impl FeatureList {
    pub const fn new() -> Self {
        Self { bits: [0; 4] }
    }

    const fn slot(code: u8) -> (usize, u64) {
        ((code >> 6) as usize, 1u64 << (code & 0x3f))
    }

    pub fn insert(&mut self, code: u8) {
        let (word, mask) = Self::slot(code);
        self.bits[word] |= mask;
    }

    pub fn remove(&mut self, code: u8) {
        let (word, mask) = Self::slot(code);
        self.bits[word] &= !mask;
    }

    pub fn contains(&self, code: u8) -> bool {
        let (word, mask) = Self::slot(code);
        self.bits[word] & mask != 0
    }

    /// Codes in `self` but not in `other`
    pub fn minus(&self, other: &FeatureList) -> FeatureList {
        let mut out = *self;
        for (w, o) in out.bits.iter_mut().zip(other.bits) {
            *w &= !o;
        }
        out
    }

    pub fn union(&self, other: &FeatureList) -> FeatureList {
        let mut out = *self;
        for (w, o) in out.bits.iter_mut().zip(other.bits) {
            *w |= o;
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |code| self.contains(*code))
    }

    /// Renders each code as `prefix` plus two hex digits, joined by `sep`.
    pub fn to_string_with(&self, prefix: &str, sep: &str) -> String {
        self.iter()
            .map(|code| format!("{}{:02x}", prefix, code))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl FromIterator<u8> for FeatureList {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut list = FeatureList::new();
        for code in iter {
            list.insert(code);
        }
        list
    }
}

impl fmt::Display for FeatureList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with("x", ","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_membership_at_word_edges() {
        let list: FeatureList = [0x00, 0x3f, 0x40, 0xff].into_iter().collect();
        assert_eq!(list.len(), 4);
        for code in [0x00, 0x3f, 0x40, 0xff] {
            assert!(list.contains(code), "0x{:02x}", code);
        }
        assert!(!list.contains(0x41));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![0x00, 0x3f, 0x40, 0xff]);

        let mut list = list;
        list.remove(0x3f);
        assert!(!list.contains(0x3f));
        assert!(FeatureList::new().is_empty());
    }

    #[test]
    fn test_color_minus_profile() {
        let profile: FeatureList = [0x10, 0x12, 0x14].into_iter().collect();
        let color: FeatureList = [0x14, 0x16, 0x18, 0x1a].into_iter().collect();

        let unread = color.minus(&profile);
        assert_eq!(unread.to_string(), "x16,x18,x1a");
        assert_eq!(unread.to_string_with("0x", " "), "0x16 0x18 0x1a");
        assert_eq!(profile.union(&color).len(), 6);
        assert_eq!(FeatureList::new().to_string(), "");
    }

    proptest! {
        #[test]
        fn prop_minus_and_union(a in proptest::collection::vec(any::<u8>(), 0..40),
                                b in proptest::collection::vec(any::<u8>(), 0..40)) {
            let la: FeatureList = a.iter().copied().collect();
            let lb: FeatureList = b.iter().copied().collect();
            for code in 0..=u8::MAX {
                prop_assert_eq!(la.minus(&lb).contains(code), a.contains(&code) && !b.contains(&code));
                prop_assert_eq!(la.union(&lb).contains(code), a.contains(&code) || b.contains(&code));
            }
        }
    }
}

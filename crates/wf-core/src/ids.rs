//! Identifier types

use serde::{Deserialize, Serialize};

/// Index of a segment on the wheel (0-based, counter-clockwise from 0°)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(pub u16);

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u16)
    }

    /// Next segment, wrapping around `count`
    pub fn next(self, count: usize) -> Self {
        if count == 0 {
            return self;
        }
        Self::from_index((self.index() + 1) % count)
    }

    /// Previous segment, wrapping around `count`
    pub fn previous(self, count: usize) -> Self {
        if count == 0 {
            return self;
        }
        Self::from_index((self.index() + count - 1) % count)
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SegmentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u16>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_wrap() {
        assert_eq!(SegmentId(53).next(54), SegmentId(0));
        assert_eq!(SegmentId(0).previous(54), SegmentId(53));
        assert_eq!(SegmentId(3).next(0), SegmentId(3));
    }

    #[test]
    fn test_segment_parse() {
        assert_eq!(" 12".parse::<SegmentId>().unwrap(), SegmentId(12));
        assert!("x".parse::<SegmentId>().is_err());
    }
}

//! Finger names and captured fingerprint images

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the ten fingers, in capture order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerName {
    /// Left thumb
    LeftThumb,
    /// Left index finger
    LeftIndex,
    /// Left middle finger
    LeftMiddle,
    /// Left ring finger
    LeftRing,
    /// Left little finger
    LeftPinky,
    /// Right thumb
    RightThumb,
    /// Right index finger
    RightIndex,
    /// Right middle finger
    RightMiddle,
    /// Right ring finger
    RightRing,
    /// Right little finger
    RightPinky,
}

impl FingerName {
    /// All fingers in the order the scanner walks through them
    pub const ORDER: [FingerName; 10] = [
        Self::LeftThumb,
        Self::LeftIndex,
        Self::LeftMiddle,
        Self::LeftRing,
        Self::LeftPinky,
        Self::RightThumb,
        Self::RightIndex,
        Self::RightMiddle,
        Self::RightRing,
        Self::RightPinky,
    ];

    /// Wire name, e.g. `left_thumb`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftThumb => "left_thumb",
            Self::LeftIndex => "left_index",
            Self::LeftMiddle => "left_middle",
            Self::LeftRing => "left_ring",
            Self::LeftPinky => "left_pinky",
            Self::RightThumb => "right_thumb",
            Self::RightIndex => "right_index",
            Self::RightMiddle => "right_middle",
            Self::RightRing => "right_ring",
            Self::RightPinky => "right_pinky",
        }
    }
}

impl fmt::Display for FingerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown finger: '{s}'"))
    }
}

/// A captured fingerprint image, from the scanner or a file upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintImage {
    /// Which finger this is
    pub finger: FingerName,
    /// Original file name
    pub file_name: String,
    /// MIME type of the image
    pub content_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl FingerprintImage {
    /// Create an image with a default `image/png` content type
    #[must_use]
    pub fn new(finger: FingerName, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            finger,
            file_name: file_name.into(),
            content_type: "image/png".to_string(),
            bytes,
        }
    }

    /// Override the content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Images captured so far, at most one per finger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintSet {
    images: BTreeMap<FingerName, FingerprintImage>,
}

impl FingerprintSet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a capture, replacing any earlier one for the same finger
    pub fn insert(&mut self, image: FingerprintImage) -> Option<FingerprintImage> {
        self.images.insert(image.finger, image)
    }

    /// Drop the capture for a finger
    pub fn remove(&mut self, finger: FingerName) -> Option<FingerprintImage> {
        self.images.remove(&finger)
    }

    /// Capture for a finger
    #[inline]
    #[must_use]
    pub fn get(&self, finger: FingerName) -> Option<&FingerprintImage> {
        self.images.get(&finger)
    }

    /// First finger in scan order without a capture
    #[must_use]
    pub fn next_missing(&self) -> Option<FingerName> {
        FingerName::ORDER
            .iter()
            .copied()
            .find(|f| !self.images.contains_key(f))
    }

    /// Captures in scan order
    pub fn iter(&self) -> impl Iterator<Item = &FingerprintImage> {
        self.images.values()
    }

    /// Number of captured fingers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing has been captured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl FromIterator<FingerprintImage> for FingerprintSet {
    fn from_iter<I: IntoIterator<Item = FingerprintImage>>(iter: I) -> Self {
        let mut set = Self::new();
        for image in iter {
            set.insert(image);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finger_names_roundtrip_through_str() {
        for finger in FingerName::ORDER {
            assert_eq!(finger.as_str().parse::<FingerName>().unwrap(), finger);
        }
        assert!("left_toe".parse::<FingerName>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&FingerName::RightPinky).unwrap();
        assert_eq!(json, "\"right_pinky\"");
    }

    #[test]
    fn set_iterates_in_scan_order() {
        let set: FingerprintSet = [
            FingerprintImage::new(FingerName::RightThumb, "rt.png", vec![2]),
            FingerprintImage::new(FingerName::LeftThumb, "lt.png", vec![1]),
        ]
        .into_iter()
        .collect();

        let order: Vec<_> = set.iter().map(|i| i.finger).collect();
        assert_eq!(order, vec![FingerName::LeftThumb, FingerName::RightThumb]);
        assert_eq!(set.next_missing(), Some(FingerName::LeftIndex));
    }
}

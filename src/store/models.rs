/// Detection record model
///
/// The unit of data flowing through the system. Records are created by
/// the external pipeline writing to the store and are immutable once
/// stored; this core only reads them.
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of a detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Invariant: xmin <= xmax and ymin <= ymax
    pub fn is_valid(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// A single object detection event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Store-assigned identifier (SQLite rowid), opaque to the core
    pub id: i64,

    /// Detection time, RFC 3339 UTC text; the watermark key.
    /// Lexicographic order equals chronological order for this format.
    pub timestamp: String,

    /// Detected class (non-empty)
    pub label: String,

    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,

    pub bbox: BoundingBox,

    /// Origin stream/device identifier (non-empty)
    pub source: String,
}

impl Detection {
    /// Check record invariants
    pub fn is_valid(&self) -> bool {
        !self.label.is_empty()
            && !self.source.is_empty()
            && (0.0..=1.0).contains(&self.confidence)
            && self.bbox.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Detection {
        Detection {
            id: 1,
            timestamp: "2026-08-06T12:00:00Z".to_string(),
            label: "person".to_string(),
            confidence: 0.91,
            bbox: BoundingBox {
                xmin: 10.0,
                ymin: 20.0,
                xmax: 110.0,
                ymax: 220.0,
            },
            source: "cam-entrance".to_string(),
        }
    }

    #[test]
    fn test_validity() {
        assert!(sample().is_valid());

        let mut bad = sample();
        bad.confidence = 1.2;
        assert!(!bad.is_valid());

        let mut bad = sample();
        bad.bbox.xmax = bad.bbox.xmin - 1.0;
        assert!(!bad.is_valid());

        let mut bad = sample();
        bad.label.clear();
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_serde_roundtrip_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["label"], "person");
        assert_eq!(json["bbox"]["xmin"], 10.0);
        assert_eq!(json["source"], "cam-entrance");
    }

    #[test]
    fn test_rfc3339_text_orders_chronologically() {
        let earlier = "2026-08-06T12:00:00Z";
        let later = "2026-08-06T12:00:01Z";
        assert!(later > earlier);
    }
}

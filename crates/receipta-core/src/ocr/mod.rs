//! OCR input as returned by the external text-detection call.
//!
//! The first annotation carries the whole text block; the following ones
//! are individual words or lines with their bounding polygons.

use serde::{Deserialize, Serialize};

/// A vertex of an annotation's bounding polygon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
}

/// Bounding polygon (normally a quadrilateral).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingPoly {
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> Option<(f32, f32, f32, f32)> {
        if self.vertices.is_empty() {
            return None;
        }

        let min_x = self.vertices.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
        let max_x = self.vertices.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = self.vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
        let max_y = self.vertices.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

        Some((min_x, min_y, max_x, max_y))
    }

    /// Center point of the polygon.
    pub fn center(&self) -> Option<(f32, f32)> {
        if self.vertices.is_empty() {
            return None;
        }

        let n = self.vertices.len() as f32;
        let x = self.vertices.iter().map(|v| v.x).sum::<f32>() / n;
        let y = self.vertices.iter().map(|v| v.y).sum::<f32>() / n;
        Some((x, y))
    }
}

/// One text annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAnnotation {
    /// Recognized text.
    pub description: String,

    /// Detected language code, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Bounding polygon, if reported.
    #[serde(
        rename = "boundingPoly",
        alias = "bounding_poly",
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_poly: Option<BoundingPoly>,
}

/// Text-detection response for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrDocument {
    #[serde(rename = "textAnnotations", alias = "text_annotations", alias = "annotations")]
    pub annotations: Vec<TextAnnotation>,
}

/// Vertical distance under which two word boxes share a line.
const LINE_TOLERANCE: f32 = 15.0;

impl OcrDocument {
    /// Wrap a plain text block as a single-annotation document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            annotations: vec![TextAnnotation {
                description: text.into(),
                ..Default::default()
            }],
        }
    }

    /// Parse a JSON text-detection response.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Whether the detector returned nothing at all.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// The full text block, or `None` when no text was detected.
    pub fn full_text(&self) -> Option<&str> {
        self.annotations.first().map(|a| a.description.as_str())
    }

    /// Word/line annotations following the full-text block.
    pub fn words(&self) -> &[TextAnnotation] {
        self.annotations.get(1..).unwrap_or(&[])
    }

    /// Rebuild text from the word annotations in reading order.
    ///
    /// Words whose centers lie within a small vertical distance form one
    /// line; lines run top to bottom, words left to right. Words without a
    /// bounding polygon are ignored.
    pub fn text_from_words(&self) -> String {
        let mut positioned: Vec<(f32, f32, &str)> = self
            .words()
            .iter()
            .filter(|w| !w.description.trim().is_empty())
            .filter_map(|w| {
                let (x, y) = w.bounding_poly.as_ref()?.center()?;
                Some((y, x, w.description.trim()))
            })
            .collect();

        positioned.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut lines: Vec<Vec<(f32, &str)>> = Vec::new();
        let mut current_y = f32::NEG_INFINITY;

        for (y, x, text) in positioned {
            if (y - current_y).abs() < LINE_TOLERANCE {
                if let Some(line) = lines.last_mut() {
                    line.push((x, text));
                    continue;
                }
            }
            lines.push(vec![(x, text)]);
            current_y = y;
        }

        lines
            .into_iter()
            .map(|mut line| {
                line.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                line.into_iter().map(|(_, t)| t).collect::<Vec<_>>().join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//! Visual feedback for a stored frame: one box and caption per face.

use crate::types::FaceRegion;

/// Captions sit above the box unless that would leave the frame.
const CAPTION_ABOVE_MIN_Y: f64 = 20.0;
const CAPTION_ABOVE_OFFSET: f64 = 5.0;
const CAPTION_BELOW_OFFSET: f64 = 15.0;

/// One rectangle with its label caption, in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub caption: String,
    pub caption_x: f64,
    pub caption_y: f64,
}

/// Everything to draw over the live view after a successful step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlay {
    pub boxes: Vec<OverlayBox>,
}

impl Overlay {
    pub fn from_regions(regions: &[FaceRegion]) -> Self {
        Self {
            boxes: regions.iter().map(OverlayBox::from_region).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl OverlayBox {
    fn from_region(region: &FaceRegion) -> Self {
        let caption_y = if region.ymin() > CAPTION_ABOVE_MIN_Y {
            region.ymin() - CAPTION_ABOVE_OFFSET
        } else {
            region.ymin() + CAPTION_BELOW_OFFSET
        };
        Self {
            x: region.xmin(),
            y: region.ymin(),
            width: region.width(),
            height: region.height(),
            caption: caption(region),
            caption_x: region.xmin(),
            caption_y,
        }
    }
}

/// `"name (97.3%)"`
fn caption(region: &FaceRegion) -> String {
    format!("{} ({:.1}%)", region.name(), region.confidence() * 100.0)
}

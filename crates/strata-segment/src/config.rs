use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// The world Y coordinate of the segment's lowest layer; typically a multiple of 16.
    pub base_y: i32,
    /// When false, sky light always reads as 0 (e.g. for worlds without a sky).
    pub has_sky_light: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            base_y: 0,
            has_sky_light: true,
        }
    }
}

//! Activation zone evaluation
//!
//! A display's activation zone is the strip of `band_height` pixel rows just
//! above its bottom edge. The display's own edges are exclusive: a cursor
//! sitting exactly on any edge is not inside the display. When displays
//! overlap the first one in list order wins.

use crate::types::{Display, Point};

/// Point strictly inside the display rectangle
pub fn within(display: &Display, point: Point) -> bool {
    point.x > display.left()
        && point.x < display.right()
        && point.y > display.top()
        && point.y < display.bottom()
}

/// Row lies in the band above the bottom edge
pub fn is_bottom(display: &Display, y: i32, band_height: i32) -> bool {
    y < display.bottom() && y >= display.bottom().saturating_sub(band_height)
}

/// First display whose activation zone contains `point`
pub fn evaluate(point: Point, displays: &[Display], band_height: i32) -> Option<&Display> {
    displays
        .iter()
        .find(|display| within(display, point) && is_bottom(display, point.y, band_height))
}

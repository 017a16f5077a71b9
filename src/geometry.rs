//! Parser for the output layout report printed by `xrandr`

use anyhow::{Context, Result, bail};

use crate::constants::xrandr::{CONNECTED_MARKER, PRIMARY_TOKEN};
use crate::types::{Dimensions, Display, Point};

/// Parse every connected output from a raw report
///
/// Any malformed connected line fails the whole call, so callers never see a
/// partial layout.
pub fn parse_displays(raw: &str) -> Result<Vec<Display>> {
    raw.lines()
        .filter(|line| line.contains(CONNECTED_MARKER))
        .map(parse_display_line)
        .collect()
}

/// Parse a single `NAME connected [primary] WxH+X+Y ...` line
fn parse_display_line(line: &str) -> Result<Display> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 3 {
        bail!("Unexpected connected output line from xrandr: {line:?}");
    }

    let (primary, geometry) = if cols[2] == PRIMARY_TOKEN {
        let geometry = cols
            .get(3)
            .with_context(|| format!("Primary output has no geometry: {line:?}"))?;
        (true, *geometry)
    } else {
        (false, cols[2])
    };

    let (size, offset) = parse_geometry(geometry)
        .with_context(|| format!("Invalid geometry for output {}", cols[0]))?;

    Ok(Display {
        name: cols[0].to_string(),
        size,
        offset,
        primary,
    })
}

/// Split `1920x1080+0+0` into its size and offset
fn parse_geometry(token: &str) -> Result<(Dimensions, Point)> {
    let parts: Vec<&str> = token
        .split(['x', '+'])
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 4 {
        bail!("Expected WIDTHxHEIGHT+X+Y, got {token:?}");
    }

    let mut values = [0i32; 4];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .parse()
            .with_context(|| format!("Non-numeric geometry component {part:?} in {token:?}"))?;
    }

    let [width, height, x, y] = values;
    if width < 0 || height < 0 {
        bail!("Negative output size in {token:?}");
    }
    // Edges are computed as offset + size
    if x.checked_add(width).is_none() || y.checked_add(height).is_none() {
        bail!("Output extends past the coordinate range: {token:?}");
    }

    Ok((Dimensions::new(width, height), Point::new(x, y)))
}

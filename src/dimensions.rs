//! Aspect ratio to pixel dimension resolution.

use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Base size used when none is given: the geometric mean of width and height.
pub const DEFAULT_BASE_SIZE: u32 = 512;

/// Dimensions are floored to this multiple.
const ALIGNMENT: u32 = 16;

/// Largest side the resolver will hand to the upstream.
const MAX_SIDE: u32 = 65_536;

/// Pixel dimensions of a requested image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Resolve an aspect ratio such as `"16/9"` into pixel dimensions.
///
/// The ratio is scaled so that `sqrt(width * height)` equals `base_size`,
/// each side is rounded, then floored to a multiple of 16. `"W:H"` is
/// accepted as well as `"W/H"`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if the ratio is malformed,
/// either side is not a positive finite number, or a resolved side ends up
/// below 16 or above 65536 pixels.
pub fn resolve_dimensions(aspect_ratio: &str, base_size: u32) -> Result<Dimensions, ImageError> {
    let (w, h) = parse_ratio(aspect_ratio)?;
    let scale = f64::from(base_size) / (w * h).sqrt();
    let dimensions = Dimensions { width: align(w * scale), height: align(h * scale) };

    let in_range = |side: u32| (ALIGNMENT..=MAX_SIDE).contains(&side);
    if !(in_range(dimensions.width) && in_range(dimensions.height)) {
        return Err(ImageError::InvalidArgument(format!(
            "Aspect ratio '{aspect_ratio}' at base size {base_size} resolves to {dimensions}; \
             each side must be between {ALIGNMENT} and {MAX_SIDE} pixels"
        )));
    }
    Ok(dimensions)
}

fn parse_ratio(aspect_ratio: &str) -> Result<(f64, f64), ImageError> {
    let invalid = || {
        ImageError::InvalidArgument(format!(
            "Unsupported aspect ratio '{aspect_ratio}'. Expected W/H with positive numbers, e.g. 16/9"
        ))
    };

    let (w, h) = aspect_ratio.split_once(['/', ':']).ok_or_else(invalid)?;
    let w: f64 = w.trim().parse().map_err(|_| invalid())?;
    let h: f64 = h.trim().parse().map_err(|_| invalid())?;

    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(invalid());
    }
    Ok((w, h))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn align(side: f64) -> u32 {
    let rounded = side.round().clamp(0.0, f64::from(u32::MAX)) as u32;
    rounded / ALIGNMENT * ALIGNMENT
}

//! Wall obstacle mask: a single-channel opacity image sampled by the
//! flocking kernel for avoidance steering and by the wall render pass for
//! display, per §3's "painted wall obstacles".

/// Canvas-to-mask resolution divisor ("single-channel image at
/// 1/WALL_SCALE resolution, default x1/4").
pub const WALL_SCALE: u32 = 4;

/// Host-side wall mask: one byte per texel, uploaded as an `R8Unorm`
/// texture so GPU sampling sees values in `[0, 1]`. The painting UI that
/// would author a non-trivial mask is out of scope here, so the mask
/// defaults to all-zero (no obstacles) and is only ever resized, never
/// drawn into, by this crate.
#[derive(Debug, Clone)]
pub struct WallMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl WallMask {
    /// An obstacle-free mask sized from the canvas extent at [`WALL_SCALE`].
    pub fn empty(canvas_width: f32, canvas_height: f32) -> Self {
        let width = ((canvas_width / WALL_SCALE as f32).ceil() as u32).max(1);
        let height = ((canvas_height / WALL_SCALE as f32).ceil() as u32).max(1);
        Self {
            width,
            height,
            data: vec![0u8; (width * height) as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_is_sized_from_canvas_and_wall_scale() {
        let mask = WallMask::empty(1280.0, 720.0);
        assert_eq!(mask.width, 320);
        assert_eq!(mask.height, 180);
        assert!(mask.data.iter().all(|&v| v == 0));
        assert_eq!(mask.data.len(), (mask.width * mask.height) as usize);
    }

    #[test]
    fn empty_mask_rounds_up_fractional_texel_coverage() {
        let mask = WallMask::empty(801.0, 601.0);
        assert_eq!(mask.width, 201);
        assert_eq!(mask.height, 151);
    }
}

// SPDX-License-Identifier: MIT
// CPU letterboxing built on fast_image_resize (SIMD-accelerated).
// RGB8 in → RGB8 canvas out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImageMut, TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::plan::{FitPlan, Size};

/// Solid black, the default padding color.
pub const BLACK: [u8; 3] = [0, 0, 0];

#[derive(Debug)]
pub enum ScaleError {
    EmptyImage(Size),
    SourceTooSmall { expected: usize, actual: usize },
    BufferTooSmall { expected: usize, actual: usize },
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Crop(fir::CropBoxError),
}

impl From<fir::ResizeError> for ScaleError {
    fn from(e: fir::ResizeError) -> Self {
        Self::Fir(e)
    }
}

impl From<fir::ImageBufferError> for ScaleError {
    fn from(e: fir::ImageBufferError) -> Self {
        Self::ImageBuf(e)
    }
}

impl From<fir::CropBoxError> for ScaleError {
    fn from(e: fir::CropBoxError) -> Self {
        Self::Crop(e)
    }
}

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::EmptyImage(s) => write!(f, "Image has no pixels ({}x{})", s.w, s.h),
            ScaleError::SourceTooSmall { expected, actual } => {
                write!(f, "Source buffer too small: expected {} bytes, got {}", expected, actual)
            }
            ScaleError::BufferTooSmall { expected, actual } => {
                write!(f, "Canvas buffer too small: expected {} bytes, got {}", expected, actual)
            }
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            ScaleError::Crop(e) => write!(f, "Crop error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            ScaleError::Crop(e) => Some(e),
            _ => None,
        }
    }
}

/// Resize tightly packed RGB8 `src_rgb` into the plan's content rectangle of `dst`
/// and fill everything else with `bg`.
/// `dst` must hold at least `plan.canvas.w * plan.canvas.h * 3` bytes.
pub fn letterbox_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    plan: &FitPlan,
    dst: &mut [u8],
    bg: [u8; 3],
) -> Result<(), ScaleError> {
    let src = plan.input;
    let src_len = src.byte_len(3);
    if src_rgb.len() < src_len {
        return Err(ScaleError::SourceTooSmall { expected: src_len, actual: src_rgb.len() });
    }
    let dst_len = plan.canvas.byte_len(3);
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall { expected: dst_len, actual: dst.len() });
    }

    let src_view = TypedImageRef::<U8x3>::from_buffer(src.w, src.h, &src_rgb[..src_len])?;

    // Background first; the resize below only touches the content rectangle.
    fill_rgb(&mut dst[..dst_len], bg);
    let mut canvas =
        TypedImage::<U8x3>::from_buffer(plan.canvas.w, plan.canvas.h, &mut dst[..dst_len])?;

    let (x, y, w, h) = plan.content_roi();
    let mut roi = TypedCroppedImageMut::from_ref(&mut canvas, x, y, w, h)?;

    let opts = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer.resize_typed::<U8x3>(&src_view, &mut roi, &opts)?;

    Ok(())
}

/// Allocating convenience wrapper around [`letterbox_rgb_cpu`].
pub fn letterbox_rgb(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    plan: &FitPlan,
    bg: [u8; 3],
) -> Result<Vec<u8>, ScaleError> {
    if plan.canvas.is_empty() {
        return Err(ScaleError::EmptyImage(plan.canvas));
    }
    let mut dst = vec![0u8; plan.canvas.byte_len(3)];
    letterbox_rgb_cpu(resizer, src_rgb, plan, &mut dst, bg)?;
    Ok(dst)
}

#[inline]
fn fill_rgb(dst: &mut [u8], bg: [u8; 3]) {
    for px in dst.chunks_exact_mut(3) {
        px.copy_from_slice(&bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::build_plan;

    fn solid(size: Size, rgb: [u8; 3]) -> Vec<u8> {
        let mut buf = vec![0u8; size.byte_len(3)];
        fill_rgb(&mut buf, rgb);
        buf
    }

    fn pixel(buf: &[u8], canvas: Size, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * canvas.w + x) * 3) as usize;
        [buf[i], buf[i + 1], buf[i + 2]]
    }

    #[test]
    fn pads_wide_source_with_background() {
        let src = Size::new(200, 100);
        let canvas = Size::new(64, 64);
        let plan = build_plan(src, canvas).unwrap();
        let mut resizer = Resizer::new();

        let out = letterbox_rgb(&mut resizer, &solid(src, [255, 255, 255]), &plan, BLACK).unwrap();
        assert_eq!(out.len(), canvas.byte_len(3));

        for y in 0..canvas.h {
            for x in 0..canvas.w {
                let px = pixel(&out, canvas, x, y);
                if plan.is_padding(x, y) {
                    assert_eq!(px, BLACK, "padding at ({x},{y})");
                } else {
                    assert!(px.iter().all(|&c| c >= 250), "content at ({x},{y}): {px:?}");
                }
            }
        }
    }

    #[test]
    fn custom_background_is_used() {
        let src = Size::new(10, 40);
        let canvas = Size::new(40, 40);
        let plan = build_plan(src, canvas).unwrap();
        let mut resizer = Resizer::new();

        let out = letterbox_rgb(&mut resizer, &solid(src, [0, 200, 0]), &plan, [9, 8, 7]).unwrap();
        assert_eq!(pixel(&out, canvas, 0, 20), [9, 8, 7]);
        assert_eq!(pixel(&out, canvas, 39, 20), [9, 8, 7]);
        let center = pixel(&out, canvas, 20, 20);
        assert!(center[0] <= 2 && center[1].abs_diff(200) <= 2 && center[2] <= 2, "{center:?}");
    }

    #[test]
    fn rejects_short_buffers() {
        let src = Size::new(8, 8);
        let plan = build_plan(src, Size::new(4, 4)).unwrap();
        let mut resizer = Resizer::new();

        let err = letterbox_rgb(&mut resizer, &[0u8; 10], &plan, BLACK).unwrap_err();
        assert!(matches!(err, ScaleError::SourceTooSmall { expected: 192, actual: 10 }));

        let mut small = vec![0u8; 5];
        let err = letterbox_rgb_cpu(&mut resizer, &solid(src, BLACK), &plan, &mut small, BLACK)
            .unwrap_err();
        assert!(matches!(err, ScaleError::BufferTooSmall { expected: 48, .. }));
    }
}

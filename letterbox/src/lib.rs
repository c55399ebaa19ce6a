// SPDX-License-Identifier: MIT
//! # letterbox: Fit-Within Scaling onto Fixed Canvases
//!
//! Turns arbitrarily sized RGB images into uniformly sized training inputs.
//! The source is scaled by a single factor so it fits inside the canvas, then
//! centered on a solid background. Aspect ratio is preserved to within one
//! pixel of rounding.
//!
//! ## Key Components
//!
//! - [`plan`]: placement computation (scale factor, content size, offset)
//! - [`cpu`]: SIMD resize into the content rectangle via fast_image_resize
//!
//! ## Usage Example
//!
//! ```rust
//! use letterbox::{cpu::{letterbox_rgb, BLACK}, plan::{build_plan, Size}};
//!
//! let input = Size::new(4, 2);
//! let plan = build_plan(input, Size::new(8, 8)).expect("non-empty sizes");
//! assert_eq!(plan.content, Size::new(8, 4));
//! assert_eq!(plan.offset, (0, 2));
//!
//! let src = vec![255u8; input.byte_len(3)];
//! let mut resizer = fast_image_resize::Resizer::new();
//! let canvas = letterbox_rgb(&mut resizer, &src, &plan, BLACK)?;
//! assert_eq!(canvas.len(), 8 * 8 * 3);
//! # Ok::<(), letterbox::cpu::ScaleError>(())
//! ```

pub mod cpu;
pub mod plan;

pub use cpu::{letterbox_rgb, letterbox_rgb_cpu, ScaleError, BLACK};
pub use plan::{build_plan, FitPlan, Size};

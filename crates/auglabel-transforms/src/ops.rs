//! Pixel-level image operations.
//!
//! Every function takes an [`Image`] by reference and returns a new one of the
//! same dimensions. Flips, blur, inversion and the brightness, contrast and
//! hue adjustments run on `image::imageops`. Randomness, where needed, comes
//! from the caller's RNG.

use auglabel_core::prelude::*;
use image::{imageops, Rgb, RgbImage};
use rand::seq::SliceRandom;
use rand::Rng;

fn require_pixels(image: &Image, transform: &str) -> Result<()> {
    if image.is_empty() {
        return Err(TransformError::EmptyImage(transform.to_string()).into());
    }
    Ok(())
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Mirror left-right.
pub fn horizontal_flip(image: &Image) -> Image {
    imageops::flip_horizontal(image.as_rgb()).into()
}

/// Mirror top-bottom.
pub fn vertical_flip(image: &Image) -> Image {
    imageops::flip_vertical(image.as_rgb()).into()
}

/// Zero-pad by `padding` on every side, then crop back to the original size
/// at offset (`x0`, `y0`) inside the padded canvas.
pub fn crop_at(image: &Image, padding: usize, x0: usize, y0: usize) -> Result<Image> {
    require_pixels(image, "crop")?;
    if x0 > 2 * padding || y0 > 2 * padding {
        return Err(AugError::invalid_parameter(
            "crop",
            format!("offset ({}, {}) outside padded canvas", x0, y0),
        ));
    }
    let src = image.as_rgb();
    let mut canvas = RgbImage::new(src.width(), src.height());
    let pad = padding as i64;
    imageops::overlay(&mut canvas, src, pad - x0 as i64, pad - y0 as i64);
    Ok(canvas.into())
}

/// Random crop of the original size from the zero-padded image.
pub fn random_crop<R: Rng + ?Sized>(image: &Image, padding: usize, rng: &mut R) -> Result<Image> {
    require_pixels(image, "crop")?;
    let x0 = rng.gen_range(0..=2 * padding);
    let y0 = rng.gen_range(0..=2 * padding);
    crop_at(image, padding, x0, y0)
}

/// Rotate counter-clockwise by `angle` degrees about the image center.
///
/// Nearest-neighbor sampling; pixels that fall outside the source are black.
pub fn rotate_by(image: &Image, angle: f32) -> Result<Image> {
    require_pixels(image, "rotate")?;
    let src = image.as_rgb();
    let (w, h) = (src.width(), src.height());
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let (sin, cos) = angle.to_radians().sin_cos();

    let out = RgbImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let sx = (cx + dx * cos - dy * sin).round();
        let sy = (cy + dx * sin + dy * cos).round();
        if sx >= 0.0 && sy >= 0.0 && (sx as u32) < w && (sy as u32) < h {
            *src.get_pixel(sx as u32, sy as u32)
        } else {
            Rgb([0; CHANNELS])
        }
    });
    Ok(out.into())
}

/// Rotate by an angle drawn uniformly from `[-degrees, degrees]`.
pub fn random_rotate<R: Rng + ?Sized>(image: &Image, degrees: f32, rng: &mut R) -> Result<Image> {
    if !degrees.is_finite() || degrees < 0.0 {
        return Err(AugError::invalid_parameter(
            "rotate",
            format!("degrees must be finite and non-negative, got {}", degrees),
        ));
    }
    let angle = if degrees > 0.0 {
        rng.gen_range(-degrees..=degrees)
    } else {
        0.0
    };
    rotate_by(image, angle)
}

/// `255 - v` on every channel.
pub fn invert(image: &Image) -> Image {
    let mut out = image.clone();
    imageops::invert(out.as_rgb_mut());
    out
}

/// Invert every channel value at or above `threshold`.
pub fn solarize(image: &Image, threshold: u8) -> Image {
    let mut out = image.clone();
    for v in out.pixels_mut() {
        if *v >= threshold {
            *v = 255 - *v;
        }
    }
    out
}

/// ITU-R 601-2 luma of one pixel.
#[inline]
pub fn luma(rgb: [u8; CHANNELS]) -> u8 {
    let [r, g, b] = rgb.map(u32::from);
    ((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8
}

/// 601-2 luma replicated to all three channels.
///
/// `imageops::grayscale` weighs channels with Rec. 709 coefficients, so the
/// luma is computed here.
pub fn grayscale(image: &Image) -> Image {
    let mut out = image.as_rgb().clone();
    for px in out.pixels_mut() {
        *px = Rgb([luma(px.0); CHANNELS]);
    }
    out.into()
}

/// Gaussian blur with standard deviation `sigma`.
pub fn gaussian_blur(image: &Image, sigma: f32) -> Result<Image> {
    require_pixels(image, "blur")?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AugError::invalid_parameter(
            "blur",
            format!("sigma must be positive, got {}", sigma),
        ));
    }
    Ok(imageops::blur(image.as_rgb(), sigma).into())
}

/// Scale brightness by `factor`, applied as an additive offset of
/// `(factor - 1) * 255`.
pub fn adjust_brightness(image: &Image, factor: f32) -> Image {
    let offset = ((factor - 1.0) * 255.0).round() as i32;
    imageops::brighten(image.as_rgb(), offset).into()
}

/// Stretch values about mid-gray by `factor`.
pub fn adjust_contrast(image: &Image, factor: f32) -> Image {
    // imageops scales by ((100 + c) / 100)^2
    let percent = (factor.max(0.0).sqrt() - 1.0) * 100.0;
    imageops::contrast(image.as_rgb(), percent).into()
}

/// Blend each pixel towards its own luma.
pub fn adjust_saturation(image: &Image, factor: f32) -> Image {
    let mut out = image.as_rgb().clone();
    for px in out.pixels_mut() {
        let l = luma(px.0) as f32;
        *px = Rgb(px.0.map(|v| to_u8(l + factor * (v as f32 - l))));
    }
    out.into()
}

/// Rotate hue by `shift` turns (`shift` in [-0.5, 0.5]).
pub fn adjust_hue(image: &Image, shift: f32) -> Image {
    let degrees = (shift * 360.0).round() as i32;
    imageops::huerotate(image.as_rgb(), degrees).into()
}

fn jitter_factor<R: Rng + ?Sized>(magnitude: f32, rng: &mut R) -> f32 {
    rng.gen_range((1.0 - magnitude).max(0.0)..=1.0 + magnitude)
}

#[derive(Debug, Clone, Copy)]
enum JitterOp {
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Hue(f32),
}

/// Random brightness, contrast, saturation and hue changes in random order.
///
/// Each multiplicative factor is drawn from `[max(0, 1 - m), 1 + m]` and the
/// hue shift from `[-hue, hue]`. Adjustments with a zero magnitude are
/// skipped.
pub fn color_jitter<R: Rng + ?Sized>(
    image: &Image,
    brightness: f32,
    contrast: f32,
    saturation: f32,
    hue: f32,
    rng: &mut R,
) -> Result<Image> {
    for (name, m) in [
        ("brightness", brightness),
        ("contrast", contrast),
        ("saturation", saturation),
    ] {
        if !m.is_finite() || m < 0.0 {
            return Err(AugError::invalid_parameter(
                "colorjitter",
                format!("{} must be non-negative, got {}", name, m),
            ));
        }
    }
    if !hue.is_finite() || !(0.0..=0.5).contains(&hue) {
        return Err(AugError::invalid_parameter(
            "colorjitter",
            format!("hue must be in [0, 0.5], got {}", hue),
        ));
    }

    let mut ops = Vec::with_capacity(4);
    if brightness > 0.0 {
        ops.push(JitterOp::Brightness(jitter_factor(brightness, rng)));
    }
    if contrast > 0.0 {
        ops.push(JitterOp::Contrast(jitter_factor(contrast, rng)));
    }
    if saturation > 0.0 {
        ops.push(JitterOp::Saturation(jitter_factor(saturation, rng)));
    }
    if hue > 0.0 {
        ops.push(JitterOp::Hue(rng.gen_range(-hue..=hue)));
    }
    ops.shuffle(rng);

    let mut out = image.clone();
    for op in ops {
        out = match op {
            JitterOp::Brightness(f) => adjust_brightness(&out, f),
            JitterOp::Contrast(f) => adjust_contrast(&out, f),
            JitterOp::Saturation(f) => adjust_saturation(&out, f),
            JitterOp::Hue(f) => adjust_hue(&out, f),
        };
    }
    Ok(out)
}

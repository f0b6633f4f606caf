use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// OCR accuracy drops sharply below this; small captures are upscaled.
const MIN_OCR_DIMENSION: u32 = 1200;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode processed image: {0}")]
    Encode(String),
}

/// Binarization strategy, picked at pipeline construction. Local-adaptive
/// thresholding handles unevenly lit photographs; the global-mean fallback
/// degrades accuracy but never fails.
pub trait Binarizer: Send + Sync {
    fn binarize(&self, gray: &GrayImage) -> GrayImage;
}

/// Threshold each pixel against the mean of its surrounding window, less a
/// fixed offset. Window sums come from a summed-area table so the cost stays
/// linear in the pixel count.
pub struct AdaptiveBinarizer {
    pub window: u32,
    pub offset: i16,
}

impl Default for AdaptiveBinarizer {
    fn default() -> Self {
        AdaptiveBinarizer { window: 11, offset: 2 }
    }
}

impl Binarizer for AdaptiveBinarizer {
    fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let (w, h) = gray.dimensions();
        let stride = (w + 1) as usize;

        // Summed-area table with a zero row/column of padding.
        let mut sat = vec![0u64; stride * (h + 1) as usize];
        for y in 0..h as usize {
            for x in 0..w as usize {
                let idx = (y + 1) * stride + (x + 1);
                sat[idx] = gray.get_pixel(x as u32, y as u32)[0] as u64 + sat[idx - 1]
                    + sat[idx - stride]
                    - sat[idx - stride - 1];
            }
        }

        let r = self.window / 2;
        ImageBuffer::from_fn(w, h, |x, y| {
            let x0 = x.saturating_sub(r) as usize;
            let y0 = y.saturating_sub(r) as usize;
            let x1 = (x + r + 1).min(w) as usize;
            let y1 = (y + r + 1).min(h) as usize;
            let area = ((x1 - x0) * (y1 - y0)) as u64;
            let sum =
                sat[y1 * stride + x1] + sat[y0 * stride + x0] - sat[y0 * stride + x1] - sat[y1 * stride + x0];
            let local_mean = (sum / area) as i16;
            if gray.get_pixel(x, y)[0] as i16 > local_mean - self.offset {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}

/// Global mean threshold over the whole frame.
pub struct GlobalMeanBinarizer;

impl Binarizer for GlobalMeanBinarizer {
    fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let mean = mean_luma(gray);
        ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] as f32 > mean {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }
}

/// Decode raw upload bytes and normalize them into an OCR-ready frame.
pub fn normalize_from_bytes(
    data: &[u8],
    binarizer: &dyn Binarizer,
) -> Result<GrayImage, PreprocessError> {
    let img = image::load_from_memory(data)?;
    Ok(normalize(img, binarizer))
}

/// Grayscale → binarize → contrast/sharpen → denoise → upscale.
fn normalize(img: DynamicImage, binarizer: &dyn Binarizer) -> GrayImage {
    // Flatten palette/indexed/alpha formats before grayscaling.
    let gray = DynamicImage::ImageRgb8(img.into_rgb8()).into_luma8();

    let bin = binarizer.binarize(&gray);
    let boosted = adjust_contrast(&bin, 2.5);
    let sharpened = unsharp(&boosted, 2.5);
    let denoised = median3(&sharpened);
    let final_pass = unsharp(&denoised, 2.0);
    upscale_if_small(final_pass)
}

/// Encode a normalized frame as PNG bytes for the OCR engine.
pub fn encode_png(gray: &GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    gray.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

fn mean_luma(gray: &GrayImage) -> f32 {
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    sum as f32 / count as f32
}

/// Scale pixel distance from the frame mean by `factor`.
fn adjust_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let mean = mean_luma(gray);
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0] as f32;
        Luma([(mean + factor * (v - mean)).clamp(0.0, 255.0) as u8])
    })
}

/// Unsharp mask against a 3×3 box blur: blur + amount × (original − blur).
fn unsharp(gray: &GrayImage, amount: f32) -> GrayImage {
    let blur = box_blur3(gray);
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let orig = gray.get_pixel(x, y)[0] as f32;
        let b = blur.get_pixel(x, y)[0] as f32;
        Luma([(b + amount * (orig - b)).clamp(0.0, 255.0) as u8])
    })
}

fn box_blur3(gray: &GrayImage) -> GrayImage {
    neighborhood3(gray, |values| {
        let sum: u32 = values.iter().map(|v| *v as u32).sum();
        (sum / values.len() as u32) as u8
    })
}

/// 3×3 median filter, the denoise pass for thermal-printer speckle.
fn median3(gray: &GrayImage) -> GrayImage {
    neighborhood3(gray, |values| {
        values.sort_unstable();
        values[values.len() / 2]
    })
}

fn neighborhood3(gray: &GrayImage, mut combine: impl FnMut(&mut Vec<u8>) -> u8) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut values = Vec::with_capacity(9);
    ImageBuffer::from_fn(w, h, |x, y| {
        values.clear();
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                let ny = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                values.push(gray.get_pixel(nx, ny)[0]);
            }
        }
        Luma([combine(&mut values)])
    })
}

fn upscale_if_small(gray: GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w >= MIN_OCR_DIMENSION && h >= MIN_OCR_DIMENSION {
        return gray;
    }
    let scale = (MIN_OCR_DIMENSION as f32 / w as f32).max(MIN_OCR_DIMENSION as f32 / h as f32);
    let nw = (w as f32 * scale).round() as u32;
    let nh = (h as f32 * scale).round() as u32;
    image::imageops::resize(&gray, nw, nh, image::imageops::FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> GrayImage {
        ImageBuffer::from_fn(width, height, |_, _| Luma([value]))
    }

    fn gradient_gray(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, _| Luma([(x * 255 / width) as u8]))
    }

    #[test]
    fn adaptive_binarizer_turns_uniform_frame_white() {
        // Every pixel equals its local mean, which beats mean − offset.
        let out = AdaptiveBinarizer::default().binarize(&solid_gray(32, 32, 128));
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn adaptive_binarizer_darkens_ink_on_paper() {
        // A dark stroke on a light background must come out black.
        let img: GrayImage = ImageBuffer::from_fn(64, 64, |x, _| {
            if (30..34).contains(&x) {
                Luma([10u8])
            } else {
                Luma([230u8])
            }
        });
        let out = AdaptiveBinarizer::default().binarize(&img);
        assert_eq!(out.get_pixel(31, 32)[0], 0);
        assert_eq!(out.get_pixel(5, 32)[0], 255);
    }

    #[test]
    fn global_mean_binarizer_produces_pure_black_and_white() {
        let out = GlobalMeanBinarizer.binarize(&gradient_gray(64, 8));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert!(out.pixels().any(|p| p[0] == 0));
        assert!(out.pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn small_capture_is_upscaled_to_minimum_dimension() {
        let out = upscale_if_small(solid_gray(300, 600, 200));
        assert!(out.width() >= MIN_OCR_DIMENSION);
        assert!(out.height() >= MIN_OCR_DIMENSION);
        // Aspect ratio preserved: width was the tighter constraint.
        assert_eq!(out.height(), out.width() * 2);
    }

    #[test]
    fn large_frame_is_left_alone() {
        let out = upscale_if_small(solid_gray(1600, 1400, 200));
        assert_eq!((out.width(), out.height()), (1600, 1400));
    }

    #[test]
    fn normalize_from_bytes_rejects_garbage() {
        let err = normalize_from_bytes(b"not an image", &GlobalMeanBinarizer);
        assert!(matches!(err, Err(PreprocessError::Decode(_))));
    }

    #[test]
    fn normalize_from_bytes_accepts_png() {
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(gradient_gray(16, 16))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let out = normalize_from_bytes(&png, &GlobalMeanBinarizer).unwrap();
        assert!(out.width() >= MIN_OCR_DIMENSION && out.height() >= MIN_OCR_DIMENSION);
    }

    #[test]
    fn encode_png_emits_png_magic() {
        let bytes = encode_png(&solid_gray(4, 4, 100)).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}

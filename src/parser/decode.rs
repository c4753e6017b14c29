//! Decoding of embedded image streams into rasters.
//!
//! JPEG payloads go straight to the `image` crate. Raw sample data (optionally
//! Flate-compressed, optionally PNG-predicted) is unpacked into an 8-bit
//! buffer of the declared geometry. Anything else is reported as an
//! [`Error::ImageDecode`] so the caller can flag that one image and move on.

use std::io::Read;

use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};
use crate::model::{DecodedImage, EmbeddedImage, PredictorParams};

/// Decode an embedded image.
pub fn decode_image(image: &EmbeddedImage) -> Result<DecodedImage> {
    let mut data = image.data.clone();
    let last = image.filters.len().saturating_sub(1);

    for (i, filter) in image.filters.iter().enumerate() {
        match filter.as_str() {
            "FlateDecode" | "Fl" => {
                data = inflate(&data)?;
                if let Some(params) = image.predictor {
                    data = unpredict(&data, &params)?;
                }
            }
            "DCTDecode" | "DCT" if i == last => {
                let pixels = image::load_from_memory_with_format(&data, ImageFormat::Jpeg)?;
                return Ok(DecodedImage::new(pixels));
            }
            other => {
                return Err(Error::ImageDecode(format!("unsupported filter /{}", other)));
            }
        }
    }

    decode_samples(image, &data).map(DecodedImage::new)
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match ZlibDecoder::new(data).read_to_end(&mut out) {
        Ok(_) => Ok(out),
        // Truncated streams are common; keep whatever was recovered.
        Err(_) if !out.is_empty() => Ok(out),
        Err(e) => Err(Error::ImageDecode(format!("Flate stream is corrupt: {}", e))),
    }
}

/// Undo a PNG predictor (`/Predictor` 10-15).
fn unpredict(data: &[u8], params: &PredictorParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => return Ok(data.to_vec()),
        10..=15 => {}
        other => {
            return Err(Error::ImageDecode(format!(
                "unsupported predictor {}",
                other
            )))
        }
    }

    let bits_per_pixel = params
        .colors
        .checked_mul(params.bits_per_component)
        .ok_or_else(too_large)?;
    let bpp = bits_per_pixel.div_ceil(8).max(1);
    let row_len = params
        .columns
        .checked_mul(bits_per_pixel)
        .ok_or_else(too_large)?
        .div_ceil(8);
    if row_len >= data.len() {
        return Err(Error::ImageDecode(format!(
            "predicted row of {} bytes exceeds {} bytes of data",
            row_len,
            data.len()
        )));
    }
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];

    for chunk in data.chunks(row_len + 1) {
        let (tag, row) = match chunk.split_first() {
            Some((tag, row)) if row.len() == row_len => (*tag, row),
            _ => break,
        };
        let mut cur = row.to_vec();
        for x in 0..row_len {
            let left = if x >= bpp { cur[x - bpp] } else { 0 };
            let up = prev[x];
            let up_left = if x >= bpp { prev[x - bpp] } else { 0 };
            let predicted = match tag {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                4 => paeth(left, up, up_left),
                t => return Err(Error::ImageDecode(format!("bad PNG row filter {}", t))),
            };
            cur[x] = cur[x].wrapping_add(predicted);
        }
        out.extend_from_slice(&cur);
        prev = cur;
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Build a raster from uncompressed sample data.
fn decode_samples(image: &EmbeddedImage, data: &[u8]) -> Result<DynamicImage> {
    let (width, height) = match (image.width, image.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(Error::ImageDecode("missing image dimensions".to_string())),
    };

    let (components, bpc) = if image.image_mask {
        (1, 1)
    } else {
        let components = image.components.ok_or_else(|| {
            Error::ImageDecode(format!(
                "unsupported color space {}",
                image.color_space.as_deref().unwrap_or("(none)")
            ))
        })?;
        (components as usize, image.bits_per_component.unwrap_or(8) as usize)
    };
    if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::ImageDecode(format!(
            "unsupported bits per component {}",
            bpc
        )));
    }

    let h = height as usize;
    let row_samples = (width as usize)
        .checked_mul(components)
        .ok_or_else(too_large)?;
    let row_len = row_samples
        .checked_mul(bpc)
        .ok_or_else(too_large)?
        .div_ceil(8);
    let expected = row_len.checked_mul(h).ok_or_else(too_large)?;
    if data.len() < expected {
        return Err(Error::ImageDecode(format!(
            "sample data truncated: {} bytes, expected {}",
            data.len(),
            expected
        )));
    }

    // Bounded by the data length checked above.
    let mut samples = Vec::with_capacity(row_samples * h);
    for row in data.chunks(row_len).take(h) {
        samples.extend(unpack_row(row, row_samples, bpc));
    }

    let pixels = match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => {
            let rgb = samples
                .chunks_exact(4)
                .flat_map(|p| cmyk_to_rgb(p[0], p[1], p[2], p[3]))
                .collect();
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
        n => {
            return Err(Error::ImageDecode(format!(
                "unsupported component count {}",
                n
            )))
        }
    };

    pixels.ok_or_else(|| Error::ImageDecode("sample buffer does not match dimensions".to_string()))
}

fn too_large() -> Error {
    Error::ImageDecode("image dimensions too large".to_string())
}

/// Expand one row of packed samples to one byte per sample.
fn unpack_row(row: &[u8], count: usize, bpc: usize) -> Vec<u8> {
    match bpc {
        8 => row[..count].to_vec(),
        16 => row.chunks_exact(2).take(count).map(|s| s[0]).collect(),
        _ => {
            let max = (1u16 << bpc) - 1;
            (0..count)
                .map(|i| {
                    let bit = i * bpc;
                    let byte = row[bit / 8];
                    let shift = 8 - bpc - (bit % 8);
                    let value = (u16::from(byte) >> shift) & max;
                    (value * 255 / max) as u8
                })
                .collect()
        }
    }
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = 255 - u16::from(k);
    let channel = |v: u8| ((255 - u16::from(v)) * k / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_jpeg() {
        let image = EmbeddedImage::jpeg(jpeg_bytes(850, 4));
        let decoded = decode_image(&image).unwrap();
        assert_eq!(decoded.width(), 850);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_corrupt_jpeg_is_decode_error() {
        let image = EmbeddedImage::jpeg(vec![0xFF, 0xD8, 0xFF, 0x00, 0x01, 0x02]);
        let err = decode_image(&image).unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
    }

    #[test]
    fn test_decode_flate_gray() {
        let image = EmbeddedImage::new(deflate(&[0u8; 6]))
            .with_filter("FlateDecode")
            .with_dimensions(3, 2)
            .with_color_space("DeviceGray", 1)
            .with_bits_per_component(8);
        let decoded = decode_image(&image).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn test_decode_raw_cmyk() {
        let image = EmbeddedImage::new(vec![0, 0, 0, 0, 255, 255, 255, 255])
            .with_dimensions(2, 1)
            .with_color_space("DeviceCMYK", 4)
            .with_bits_per_component(8);
        let decoded = decode_image(&image).unwrap();
        let rgb = decoded.pixels().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_decode_one_bit_mask() {
        let mut image = EmbeddedImage::new(vec![0b1010_0000, 0b0101_0000])
            .with_dimensions(4, 2);
        image.image_mask = true;
        let decoded = decode_image(&image).unwrap();
        let gray = decoded.pixels().to_luma8();
        assert_eq!(gray.get_pixel(0, 0).0, [255]);
        assert_eq!(gray.get_pixel(1, 0).0, [0]);
        assert_eq!(gray.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn test_truncated_samples() {
        let image = EmbeddedImage::new(vec![0; 5])
            .with_dimensions(3, 2)
            .with_color_space("DeviceGray", 1);
        let err = decode_image(&image).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_unsupported_filter() {
        let image = EmbeddedImage::new(vec![1, 2, 3]).with_filter("JPXDecode");
        let err = decode_image(&image).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Image decoding error: unsupported filter /JPXDecode"
        );
    }

    #[test]
    fn test_png_up_predictor() {
        let params = PredictorParams {
            predictor: 12,
            colors: 1,
            bits_per_component: 8,
            columns: 3,
        };
        // Row 1: None filter; row 2: Up filter adding 1 to each byte.
        let data = [0, 10, 20, 30, 2, 1, 1, 1];
        assert_eq!(
            unpredict(&data, &params).unwrap(),
            vec![10, 20, 30, 11, 21, 31]
        );
    }

    #[test]
    fn test_huge_dimensions_are_decode_error() {
        let image = EmbeddedImage::new(vec![0; 16])
            .with_dimensions(1 << 31, 1 << 31)
            .with_color_space("DeviceCMYK", 4)
            .with_bits_per_component(8);
        let err = decode_image(&image).unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
    }

    #[test]
    fn test_huge_predictor_columns_are_decode_error() {
        let params = PredictorParams {
            predictor: 12,
            colors: 4,
            bits_per_component: 16,
            columns: usize::MAX / 2,
        };
        let err = unpredict(&[0, 1, 2, 3], &params).unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));

        let params = PredictorParams {
            columns: 1 << 40,
            ..params
        };
        let err = unpredict(&[0, 1, 2, 3], &params).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_paeth() {
        assert_eq!(paeth(10, 20, 10), 20);
        assert_eq!(paeth(20, 10, 10), 20);
        assert_eq!(paeth(0, 0, 0), 0);
    }
}

// Raw message to Frame conversion
//
// Every supported encoding is converted into packed BGR8. Row padding is
// skipped and trailing bytes past the last row are ignored. 16-bit samples
// keep their high byte; yuv422 goes through BT.601.

use super::encoding::Encoding;
use super::{Frame, BGR8_CHANNELS};
use crate::middleware::RawImage;
use thiserror::Error;

/// Reasons a raw image cannot be turned into a Frame
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("row step {step} is smaller than the {min} bytes a row needs")]
    StepTooSmall { step: usize, min: usize },

    #[error("image data is {actual} bytes, expected at least {expected}")]
    DataTooShort { expected: usize, actual: usize },
}

/// Index of the most significant byte within a 16-bit sample
fn msb_index(is_bigendian: u8) -> usize {
    if is_bigendian != 0 {
        0
    } else {
        1
    }
}

/// High byte of each 16-bit sample in `px`, in order
fn high_bytes<const N: usize>(px: &[u8], msb: usize) -> [u8; N] {
    std::array::from_fn(|i| px[i * 2 + msb])
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// BT.601 YUV to BGR
fn yuv_to_bgr(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;
    [
        clamp_u8(y + 1.773 * u),
        clamp_u8(y - 0.344 * u - 0.714 * v),
        clamp_u8(y + 1.403 * v),
    ]
}

/// Convert one UYVY row of `width` pixels
///
/// An odd trailing pixel has no V sample and is treated as V = 128.
fn uyvy_row(row: &[u8], width: usize, out: &mut Vec<u8>) {
    for x in 0..width {
        let base = (x / 2) * 4;
        let u = row[base];
        let y = row[base + 1 + (x % 2) * 2];
        let v = row.get(base + 2).copied().unwrap_or(128);
        out.extend_from_slice(&yuv_to_bgr(y, u, v));
    }
}

/// Convert a raw message into a BGR8 frame
///
/// # Arguments
/// * `msg` - Raw image as received from the middleware
///
/// # Returns
/// The converted frame, carrying the message's frame id and stamp
pub fn to_bgr8(msg: &RawImage) -> Result<Frame, ConversionError> {
    let encoding: Encoding = msg
        .encoding
        .parse()
        .map_err(ConversionError::UnsupportedEncoding)?;

    if msg.width == 0 || msg.height == 0 {
        return Err(ConversionError::EmptyImage {
            width: msg.width,
            height: msg.height,
        });
    }

    let width = msg.width as usize;
    let height = msg.height as usize;
    let bpp = encoding.bytes_per_pixel();
    let row_len = width * bpp;
    let step = msg.step as usize;

    if step < row_len {
        return Err(ConversionError::StepTooSmall { step, min: row_len });
    }

    // The last row does not need its padding
    let expected = step * (height - 1) + row_len;
    if msg.data.len() < expected {
        return Err(ConversionError::DataTooShort {
            expected,
            actual: msg.data.len(),
        });
    }

    let mut out = Vec::with_capacity(width * height * BGR8_CHANNELS);
    for row in msg.data.chunks(step).take(height) {
        let row = &row[..row_len];
        match encoding {
            Encoding::Bgr8 => out.extend_from_slice(row),
            Encoding::Rgb8 => {
                for px in row.chunks_exact(3) {
                    out.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
            Encoding::Bgra8 => {
                for px in row.chunks_exact(4) {
                    out.extend_from_slice(&px[..3]);
                }
            }
            Encoding::Rgba8 => {
                for px in row.chunks_exact(4) {
                    out.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
            Encoding::Mono8 => {
                for &v in row {
                    out.extend_from_slice(&[v, v, v]);
                }
            }
            Encoding::Mono16 => {
                let msb = msb_index(msg.is_bigendian);
                for px in row.chunks_exact(2) {
                    let v = px[msb];
                    out.extend_from_slice(&[v, v, v]);
                }
            }
            Encoding::Bgr16 | Encoding::Bgra16 => {
                let msb = msb_index(msg.is_bigendian);
                for px in row.chunks_exact(bpp) {
                    out.extend_from_slice(&high_bytes::<3>(px, msb));
                }
            }
            Encoding::Rgb16 | Encoding::Rgba16 => {
                let msb = msb_index(msg.is_bigendian);
                for px in row.chunks_exact(bpp) {
                    let [r, g, b] = high_bytes::<3>(px, msb);
                    out.extend_from_slice(&[b, g, r]);
                }
            }
            Encoding::Yuv422 => uyvy_row(row, width, &mut out),
        }
    }

    Ok(Frame::from_bgr8(msg.width, msg.height, out)
        .with_source(msg.header.frame_id.clone(), msg.header.stamp))
}

// Pixel encodings understood by the converter
//
// Names follow the sensor_msgs/image_encodings conventions.

use std::fmt;
use std::str::FromStr;

/// Supported source pixel encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Bgr8,
    Rgb8,
    Bgra8,
    Rgba8,
    Mono8,
    Mono16,
    Bgr16,
    Rgb16,
    Bgra16,
    Rgba16,
    /// Packed 4:2:2 in U Y0 V Y1 order
    Yuv422,
}

impl Encoding {
    /// Bytes per pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Encoding::Mono8 => 1,
            Encoding::Mono16 | Encoding::Yuv422 => 2,
            Encoding::Bgr8 | Encoding::Rgb8 => 3,
            Encoding::Bgra8 | Encoding::Rgba8 => 4,
            Encoding::Bgr16 | Encoding::Rgb16 => 6,
            Encoding::Bgra16 | Encoding::Rgba16 => 8,
        }
    }

    /// Bytes per sample
    pub fn sample_size(self) -> usize {
        match self {
            Encoding::Mono16
            | Encoding::Bgr16
            | Encoding::Rgb16
            | Encoding::Bgra16
            | Encoding::Rgba16 => 2,
            _ => 1,
        }
    }

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Bgr8 => "bgr8",
            Encoding::Rgb8 => "rgb8",
            Encoding::Bgra8 => "bgra8",
            Encoding::Rgba8 => "rgba8",
            Encoding::Mono8 => "mono8",
            Encoding::Mono16 => "mono16",
            Encoding::Bgr16 => "bgr16",
            Encoding::Rgb16 => "rgb16",
            Encoding::Bgra16 => "bgra16",
            Encoding::Rgba16 => "rgba16",
            Encoding::Yuv422 => "yuv422",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 8UC1/8UC3 are the OpenCV aliases publishers commonly use
        match s {
            "bgr8" | "8UC3" => Ok(Encoding::Bgr8),
            "rgb8" => Ok(Encoding::Rgb8),
            "bgra8" | "8UC4" => Ok(Encoding::Bgra8),
            "rgba8" => Ok(Encoding::Rgba8),
            "mono8" | "8UC1" => Ok(Encoding::Mono8),
            "mono16" | "16UC1" => Ok(Encoding::Mono16),
            "bgr16" | "16UC3" => Ok(Encoding::Bgr16),
            "rgb16" => Ok(Encoding::Rgb16),
            "bgra16" | "16UC4" => Ok(Encoding::Bgra16),
            "rgba16" => Ok(Encoding::Rgba16),
            "yuv422" | "uyvy" => Ok(Encoding::Yuv422),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_encodings() {
        assert_eq!("bgr8".parse(), Ok(Encoding::Bgr8));
        assert_eq!("rgba8".parse(), Ok(Encoding::Rgba8));
        assert_eq!("8UC1".parse(), Ok(Encoding::Mono8));
        assert_eq!("16UC1".parse(), Ok(Encoding::Mono16));
        assert_eq!("rgba16".parse(), Ok(Encoding::Rgba16));
        assert_eq!("16UC3".parse(), Ok(Encoding::Bgr16));
        assert_eq!("uyvy".parse(), Ok(Encoding::Yuv422));
    }

    #[test]
    fn test_parse_unknown_encoding() {
        assert_eq!(
            "bayer_rggb8".parse::<Encoding>(),
            Err("bayer_rggb8".to_string())
        );
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(Encoding::Mono8.bytes_per_pixel(), 1);
        assert_eq!(Encoding::Mono16.bytes_per_pixel(), 2);
        assert_eq!(Encoding::Rgb8.bytes_per_pixel(), 3);
        assert_eq!(Encoding::Bgra8.bytes_per_pixel(), 4);
        assert_eq!(Encoding::Yuv422.bytes_per_pixel(), 2);
        assert_eq!(Encoding::Rgb16.bytes_per_pixel(), 6);
        assert_eq!(Encoding::Bgra16.bytes_per_pixel(), 8);
    }

    #[test]
    fn test_sample_size() {
        assert_eq!(Encoding::Mono8.sample_size(), 1);
        assert_eq!(Encoding::Yuv422.sample_size(), 1);
        assert_eq!(Encoding::Mono16.sample_size(), 2);
        assert_eq!(Encoding::Rgba16.sample_size(), 2);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Encoding::Mono16.to_string(), "mono16");
        assert_eq!(Encoding::Bgr8.to_string(), "bgr8");
    }
}

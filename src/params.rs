//! Client-side generation parameters: base size bounds and output format.

use std::fmt;
use std::str::FromStr;

/// Largest base size accepted from the command line.
const MAX_BASE_SIZE: u32 = 4096;

/// Validate the base size fed to the dimension resolver.
///
/// # Errors
///
/// Returns an error if the size is below the 16 pixel alignment or too
/// large. Whether a given ratio fits is checked by the dimension resolver.
pub fn validate_base_size(base_size: u32) -> Result<(), String> {
    if (16..=MAX_BASE_SIZE).contains(&base_size) {
        Ok(())
    } else {
        Err(format!("Unsupported base size {base_size}. Valid: 16..={MAX_BASE_SIZE}"))
    }
}

/// File format the CLI writes images in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// MIME type of bytes already in this format.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Encoder used when the upstream bytes are in another format.
    #[must_use]
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            _ => Err(format!("Unsupported format '{s}'. Valid: jpeg, png, webp")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_base_size_bounds() {
        assert!(validate_base_size(16).is_ok());
        assert!(validate_base_size(512).is_ok());
        assert!(validate_base_size(4096).is_ok());
        assert!(validate_base_size(0).is_err());
        assert!(validate_base_size(15).is_err());
        assert!(validate_base_size(8192).is_err());
    }

    #[test]
    fn parse_known_formats() {
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("webp".parse::<OutputFormat>(), Ok(OutputFormat::Webp));
    }

    #[test]
    fn reject_unknown_format() {
        let err = "gif".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unsupported format 'gif'"));
    }

    #[test]
    fn jpeg_uses_short_extension() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Jpeg.to_string(), "jpeg");
        assert_eq!(OutputFormat::Webp.mime_type(), "image/webp");
    }
}

use std::io::Cursor;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, RgbImage};

const DATA_URI_PREFIX: &str = "data:";

/// A captured still frame, rasterized to a fixed size and encoded as a
/// `data:image/png;base64,...` URI ready for upload.
#[derive(Debug, Clone)]
pub struct Snapshot {
    width: u32,
    height: u32,
    data_uri: String,
}

impl Snapshot {
    /// Rasterize `frame` into a `width` x `height` bitmap and PNG-encode it.
    pub fn from_frame(frame: &RgbImage, width: u32, height: u32) -> Result<Self> {
        let sized = if frame.dimensions() == (width, height) {
            frame.clone()
        } else {
            image::imageops::resize(frame, width, height, image::imageops::FilterType::Triangle)
        };
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(sized)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("encoding captured frame as PNG")?;
        Ok(Self {
            width,
            height,
            data_uri: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The encoded frame, as sent in the `selfie_data` upload field.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

/// Split a data URI into its media type and decoded payload.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix(DATA_URI_PREFIX)
        .context("not a data URI")?;
    let (header, payload) = rest.split_once(',').context("data URI has no payload")?;
    let media = header
        .strip_suffix(";base64")
        .context("only base64 data URIs are supported")?;
    let bytes = STANDARD
        .decode(payload)
        .context("decoding data URI payload")?;
    Ok((media.to_string(), bytes))
}

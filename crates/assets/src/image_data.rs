use crate::AssetError;

/// A decoded RGBA8 image, rows top to bottom, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Wrap raw RGBA8 pixels, checking the length against the dimensions.
    pub fn from_rgba(
        id: impl Into<String>,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::SizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            width,
            height,
            rgba,
        })
    }

    /// Decode an encoded image (PNG, JPEG, BMP) and convert it to RGBA8.
    pub fn decode(id: impl Into<String>, bytes: &[u8]) -> Result<Self, AssetError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            id: id.into(),
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Procedural two-tone checkerboard used when no image file is given.
    pub fn checkerboard(id: impl Into<String>, size: u32, cells: u32) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let light = [235u8, 235, 225, 255];
        let dark = [60u8, 90, 120, 255];

        let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let texel = if ((x / cell) + (y / cell)) % 2 == 0 {
                    light
                } else {
                    dark
                };
                rgba.extend_from_slice(&texel);
            }
        }
        Self {
            id: id.into(),
            width: size,
            height: size,
            rgba,
        }
    }

    /// Bytes per row of tightly packed RGBA8 data.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

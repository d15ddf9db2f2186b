//! The output frame buffer.
//!
//! A [`FrameBuffer`] is allocated once when a reader is constructed and is
//! overwritten in place by every converted frame. Its dimensions, stride and
//! pixel format never change afterwards. Callers that need to keep pixel data
//! across reads must copy it, e.g. with [`FrameBuffer::to_image`].

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::{configuration::PixelFormat, error::ReaderError};

/// Packed output image owned by a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    stride: usize,
    pixel_format: PixelFormat,
    data: Vec<u8>,
    populated: bool,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer of `width × height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Result<Self, ReaderError> {
        if width == 0 || height == 0 {
            return Err(ReaderError::InvalidDimensions { width, height });
        }

        let stride = width as usize * pixel_format.bytes_per_pixel();
        Ok(Self {
            width,
            height,
            stride,
            pixel_format,
            data: vec![0; stride * height as usize],
            populated: false,
        })
    }

    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row. Rows are tightly packed.
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel layout of [`data`](FrameBuffer::data).
    pub const fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// `true` once at least one frame has been converted into the buffer.
    pub const fn is_populated(&self) -> bool {
        self.populated
    }

    /// Raw pixel bytes, `stride × height` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes for [`MediaSource`](crate::MediaSource)
    /// implementations that write directly into the buffer.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// One row of pixels, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.data.get(start..start + self.stride)
    }

    /// The bytes of a single pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width {
            return None;
        }
        let bytes_per_pixel = self.pixel_format.bytes_per_pixel();
        let start = x as usize * bytes_per_pixel;
        self.row(y)?.get(start..start + bytes_per_pixel)
    }

    /// Copy a (possibly padded) source plane into the buffer.
    ///
    /// `source_stride` is the distance in bytes between source rows and must
    /// be at least [`stride`](FrameBuffer::stride).
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Conversion`] if the plane is too small for the
    /// buffer's dimensions.
    pub fn copy_from_plane(&mut self, plane: &[u8], source_stride: usize) -> Result<(), ReaderError> {
        let rows = self.height as usize;
        let required = source_stride
            .checked_mul(rows.saturating_sub(1))
            .and_then(|value| value.checked_add(self.stride));

        match required {
            Some(required) if source_stride >= self.stride && plane.len() >= required => {}
            _ => {
                return Err(ReaderError::Conversion(format!(
                    "plane of {} bytes with stride {} cannot fill a {}x{} buffer",
                    plane.len(),
                    source_stride,
                    self.width,
                    self.height,
                )));
            }
        }

        if source_stride == self.stride {
            // No padding: copy the whole plane at once.
            let length = self.data.len();
            self.data.copy_from_slice(&plane[..length]);
        } else {
            for (row, destination) in self.data.chunks_exact_mut(self.stride).enumerate() {
                let start = row * source_stride;
                destination.copy_from_slice(&plane[start..start + self.stride]);
            }
        }

        Ok(())
    }

    pub(crate) fn mark_populated(&mut self) {
        self.populated = true;
    }

    /// The pixels no longer describe the cursor position.
    pub(crate) fn invalidate(&mut self) {
        self.populated = false;
    }

    /// Copy the buffer into an owned [`DynamicImage`].
    ///
    /// Returns `None` if no frame has been converted yet.
    pub fn to_image(&self) -> Option<DynamicImage> {
        if !self.populated {
            return None;
        }

        let data = self.data.clone();
        match self.pixel_format {
            PixelFormat::Rgb8 => {
                RgbImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgb8)
            }
            PixelFormat::Rgba8 => {
                RgbaImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Gray8 => {
                GrayImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageLuma8)
            }
        }
    }

    /// Save the current frame. The format is inferred from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Conversion`] if the buffer was never populated,
    /// or [`ReaderError::Image`] if the image cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReaderError> {
        let image = self.to_image().ok_or_else(|| {
            ReaderError::Conversion("frame buffer has not been populated".to_string())
        })?;
        image.save(path)?;
        Ok(())
    }
}

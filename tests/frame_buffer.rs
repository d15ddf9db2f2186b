//! Output frame buffer tests.

use seekframe::{FrameBuffer, PixelFormat, ReaderError};

#[test]
fn new_buffer_is_zeroed_and_unpopulated() {
    let buffer = FrameBuffer::new(4, 3, PixelFormat::Rgb8).expect("Failed to allocate");
    assert_eq!(buffer.width(), 4);
    assert_eq!(buffer.height(), 3);
    assert_eq!(buffer.stride(), 12);
    assert_eq!(buffer.data().len(), 36);
    assert!(buffer.data().iter().all(|&byte| byte == 0));
    assert!(!buffer.is_populated());
    assert!(buffer.to_image().is_none());
}

#[test]
fn zero_dimensions_are_rejected() {
    assert!(matches!(
        FrameBuffer::new(0, 10, PixelFormat::Rgb8),
        Err(ReaderError::InvalidDimensions { width: 0, height: 10 })
    ));
    assert!(FrameBuffer::new(10, 0, PixelFormat::Gray8).is_err());
}

#[test]
fn copy_from_tightly_packed_plane() {
    let mut buffer = FrameBuffer::new(2, 2, PixelFormat::Gray8).expect("Failed to allocate");
    buffer
        .copy_from_plane(&[1, 2, 3, 4], 2)
        .expect("Failed to copy");
    assert_eq!(buffer.data(), &[1, 2, 3, 4]);
    assert_eq!(buffer.row(1), Some(&[3, 4][..]));
    assert!(buffer.row(2).is_none());
}

#[test]
fn copy_from_padded_plane_drops_padding() {
    let mut buffer = FrameBuffer::new(2, 2, PixelFormat::Rgb8).expect("Failed to allocate");
    // Rows of 6 bytes padded to 8; the last row needs no padding.
    let plane = [
        1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
        7, 8, 9, 10, 11, 12,
    ];
    buffer.copy_from_plane(&plane, 8).expect("Failed to copy");
    assert_eq!(buffer.data(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    assert_eq!(buffer.pixel(1, 1), Some(&[10, 11, 12][..]));
    assert!(buffer.pixel(2, 0).is_none());
}

#[test]
fn copy_rejects_short_planes_and_strides() {
    let mut buffer = FrameBuffer::new(2, 2, PixelFormat::Rgb8).expect("Failed to allocate");
    assert!(matches!(
        buffer.copy_from_plane(&[0; 11], 6),
        Err(ReaderError::Conversion(_))
    ));
    assert!(buffer.copy_from_plane(&[0; 12], 4).is_err());
    assert!(buffer.data().iter().all(|&byte| byte == 0));
}

#[test]
fn save_requires_a_populated_buffer() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let buffer = FrameBuffer::new(2, 2, PixelFormat::Rgb8).expect("Failed to allocate");
    assert!(matches!(
        buffer.save(directory.path().join("frame.png")),
        Err(ReaderError::Conversion(_))
    ));
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pixel buffer with cached dimensions.

use std::sync::Arc;

/// Pixel formats carried by capture sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Bi-planar YUV 4:2:0.
    Nv12,
    /// Packed 8-bit BGRA.
    Bgra32,
}

impl PixelFormat {
    fn byte_len(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::Nv12 => pixels + pixels / 2,
            PixelFormat::Bgra32 => pixels * 4,
        }
    }
}

struct PixelBufferInner {
    data: Vec<u8>,
    format: PixelFormat,
}

/// Pixel buffer with cached dimensions.
///
/// Wraps the pixel storage in an Arc for cheap cloning. Clone only increments
/// the refcount; the storage itself is never written after construction, so
/// every holder observes the same pixels.
#[derive(Clone)]
pub struct PixelBuffer {
    inner: Arc<PixelBufferInner>,
    /// Cached width (fixed at construction).
    pub width: u32,
    /// Cached height (fixed at construction).
    pub height: u32,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer of the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let data = vec![0u8; format.byte_len(width, height)];
        Self {
            inner: Arc::new(PixelBufferInner { data, format }),
            width,
            height,
        }
    }

    /// Get the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    /// Read-only view of the pixel storage.
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Whether two handles reference the same underlying storage.
    pub fn ptr_eq(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_storage() {
        let buffer = PixelBuffer::new(16, 16, PixelFormat::Nv12);
        let clone = buffer.clone();
        assert!(buffer.ptr_eq(&clone));
        assert!(!buffer.ptr_eq(&PixelBuffer::new(16, 16, PixelFormat::Nv12)));
    }

    #[test]
    fn test_allocation_sizes() {
        assert_eq!(PixelBuffer::new(16, 16, PixelFormat::Nv12).data().len(), 384);
        assert_eq!(
            PixelBuffer::new(16, 16, PixelFormat::Bgra32).data().len(),
            1024
        );
    }
}

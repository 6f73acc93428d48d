//! Opaque buffer references as seen by the surface tree.
//!
//! Buffer allocation and import live in the protocol/renderer layers. The tree
//! only needs to know which buffer a surface shows and how large it is, so a
//! [`BufferRef`] is a small copyable handle that the binding layer fills in
//! from its own buffer table.

/// Identifier of a client buffer, assigned by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Wraps a raw buffer identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Pixel formats the scene consumer may encounter.
///
/// These follow `wl_shm.format` / DRM fourcc naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFormat {
    /// 32-bit ARGB format, 8 bits per channel, alpha first.
    Argb8888,
    /// 32-bit XRGB format, alpha ignored.
    Xrgb8888,
    /// YUV, 2-plane Y followed by interleaved UV.
    Nv12,
}

/// A buffer attached to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRef {
    pub id: BufferId,
    /// Width in buffer pixels.
    pub width: u32,
    /// Height in buffer pixels.
    pub height: u32,
    pub format: BufferFormat,
}

impl BufferRef {
    pub fn new(id: BufferId, width: u32, height: u32, format: BufferFormat) -> Self {
        Self {
            id,
            width,
            height,
            format,
        }
    }

    /// Returns `true` if both dimensions are multiples of `scale`.
    pub fn fits_scale(&self, scale: i32) -> bool {
        scale > 0 && self.width % scale as u32 == 0 && self.height % scale as u32 == 0
    }
}

//! Platform seams: photo library access and the system clipboard.
//!
//! The manager only talks to these traits. The terminal session provides
//! real implementations; `crate::testing` provides scripted ones.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::ImageRef;

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Prompt dismissed without an answer
    Cancelled,
}

/// Outcome of the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Selected(ImageRef),
    Cancelled,
}

/// Parameters passed to the picker
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOptions {
    pub images_only: bool,
    pub allows_editing: bool,
    /// Crop aspect ratio (width, height)
    pub aspect: (u32, u32),
    /// Compression quality in `0.0..=1.0`
    pub quality: f32,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            images_only: true,
            allows_editing: true,
            aspect: (1, 1),
            quality: 0.8,
        }
    }
}

/// Photo library access
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn request_permission(&self) -> Result<Permission>;

    async fn pick_image(&self, options: &PickerOptions) -> Result<PickOutcome>;
}

/// System clipboard
#[async_trait]
pub trait ClipboardService: Send + Sync {
    /// Fails with `ClipboardUnavailable`
    async fn write(&self, text: &str) -> Result<()>;
}

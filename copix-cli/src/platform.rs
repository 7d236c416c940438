//! Terminal implementations of the photo library and clipboard services.
//!
//! Prompts are blocking (`inquire`), so they run under `block_in_place` on
//! the multi-threaded runtime; the copy-notice timer keeps ticking meanwhile.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cli_clipboard::{ClipboardContext, ClipboardProvider};
use copix_core::{
    ClipboardService, CopixError, ImageRef, ImageService, Permission, PickOutcome, PickerOptions,
    Result,
};
use inquire::error::InquireResult;
use inquire::{Confirm, InquireError, Select, Text};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{CopixConfig, PhotoPermission};

/// Picks images from a directory tree
pub struct FsImageService {
    root: PathBuf,
    extensions: Vec<String>,
    max_depth: usize,
    policy: PhotoPermission,
    granted: AtomicBool,
}

impl FsImageService {
    pub fn from_config(config: &CopixConfig) -> Self {
        Self {
            root: config.photos_dir(),
            extensions: config
                .photos
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_depth: config.photos.max_depth,
            policy: config.photos.permission,
            granted: AtomicBool::new(false),
        }
    }

    fn ask_permission(&self) -> Result<Permission> {
        let question = format!("Allow CopiX to access your photos in {}?", self.root.display());
        let answer = tokio::task::block_in_place(|| {
            Confirm::new(&question)
                .with_default(true)
                .with_help_message("Needed to attach a picture to a name")
                .prompt()
        });

        match answered(answer)? {
            Some(true) => {
                self.granted.store(true, Ordering::SeqCst);
                Ok(Permission::Granted)
            }
            Some(false) => Ok(Permission::Denied),
            None => Ok(Permission::Cancelled),
        }
    }

    fn prompt_for_path(&self) -> Result<PickOutcome> {
        let answer = tokio::task::block_in_place(|| {
            Text::new("Image path:")
                .with_help_message(&format!(
                    "No images found under {}; Esc to cancel",
                    self.root.display()
                ))
                .prompt()
        });

        let Some(raw) = answered(answer)? else {
            return Ok(PickOutcome::Cancelled);
        };

        let path = PathBuf::from(raw.trim());
        if raw.trim().is_empty() {
            return Ok(PickOutcome::Cancelled);
        }
        if !path.is_file() {
            return Err(CopixError::image_service(format!(
                "no such file: {}",
                path.display()
            )));
        }
        Ok(PickOutcome::Selected(image_ref(&path)))
    }
}

#[async_trait]
impl ImageService for FsImageService {
    async fn request_permission(&self) -> Result<Permission> {
        match self.policy {
            PhotoPermission::Granted => Ok(Permission::Granted),
            PhotoPermission::Denied => Ok(Permission::Denied),
            PhotoPermission::Ask if self.granted.load(Ordering::SeqCst) => Ok(Permission::Granted),
            PhotoPermission::Ask => self.ask_permission(),
        }
    }

    async fn pick_image(&self, options: &PickerOptions) -> Result<PickOutcome> {
        debug!(
            root = %self.root.display(),
            aspect = ?options.aspect,
            quality = options.quality,
            "opening picker (no cropping in the terminal)"
        );

        let candidates = scan_images(
            &self.root,
            &self.extensions,
            self.max_depth,
            options.images_only,
        );
        if candidates.is_empty() {
            return self.prompt_for_path();
        }

        let choices: Vec<PhotoChoice> = candidates
            .into_iter()
            .map(|path| PhotoChoice::new(&self.root, path))
            .collect();

        let answer = tokio::task::block_in_place(|| {
            Select::new("Add her image:", choices)
                .with_page_size(10)
                .with_help_message("↑↓ to move, type to filter, Esc to cancel")
                .prompt()
        });

        match answered(answer)? {
            Some(choice) => Ok(PickOutcome::Selected(image_ref(&choice.path))),
            None => Ok(PickOutcome::Cancelled),
        }
    }
}

/// Esc yields `None`; Ctrl-C surfaces as `Interrupted` so the session can quit.
fn answered<T>(answer: InquireResult<T>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(InquireError::OperationInterrupted) => Err(CopixError::Interrupted),
        Err(e) => Err(CopixError::image_service(e.to_string())),
    }
}

struct PhotoChoice {
    path: PathBuf,
    label: String,
}

impl PhotoChoice {
    fn new(root: &Path, path: PathBuf) -> Self {
        let label = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .display()
            .to_string();
        Self { path, label }
    }
}

impl fmt::Display for PhotoChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn image_ref(path: &Path) -> ImageRef {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    ImageRef::new(absolute.display().to_string())
}

/// Files under `root` whose extension is in `extensions`, sorted by path.
/// With `images_only` off every regular file qualifies.
pub fn scan_images(
    root: &Path,
    extensions: &[String],
    max_depth: usize,
    images_only: bool,
) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(max_depth.max(1))
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            !images_only
                || entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// System clipboard through `cli-clipboard`
pub struct SystemClipboard;

#[async_trait]
impl ClipboardService for SystemClipboard {
    async fn write(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut ctx =
                ClipboardContext::new().map_err(|e| CopixError::clipboard(e.to_string()))?;
            ctx.set_contents(text)
                .map_err(|e| CopixError::clipboard(e.to_string()))
        })
        .await
        .map_err(|e| CopixError::clipboard(e.to_string()))?
    }
}

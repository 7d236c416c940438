//! In-memory service implementations for tests and demos.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{CopixError, Result};
use crate::model::Clock;
use crate::services::{ClipboardService, ImageService, Permission, PickOutcome, PickerOptions};

/// Image service that replays queued answers.
///
/// With an empty queue it grants permission and cancels the picker.
#[derive(Default)]
pub struct ScriptedImageService {
    permissions: Mutex<VecDeque<Permission>>,
    picks: Mutex<VecDeque<Result<PickOutcome>>>,
    permission_calls: AtomicUsize,
    pick_calls: AtomicUsize,
    last_options: Mutex<Option<PickerOptions>>,
}

impl ScriptedImageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_permission(&self, permission: Permission) -> &Self {
        self.permissions.lock().unwrap().push_back(permission);
        self
    }

    pub fn push_pick(&self, outcome: PickOutcome) -> &Self {
        self.picks.lock().unwrap().push_back(Ok(outcome));
        self
    }

    pub fn push_pick_error(&self, err: CopixError) -> &Self {
        self.picks.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn permission_calls(&self) -> usize {
        self.permission_calls.load(Ordering::SeqCst)
    }

    pub fn pick_calls(&self) -> usize {
        self.pick_calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<PickerOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageService for ScriptedImageService {
    async fn request_permission(&self) -> Result<Permission> {
        self.permission_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Permission::Granted))
    }

    async fn pick_image(&self, options: &PickerOptions) -> Result<PickOutcome> {
        self.pick_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());
        self.picks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PickOutcome::Cancelled))
    }
}

/// Clipboard that records writes and can be switched to fail.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn contents(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ClipboardService for RecordingClipboard {
    async fn write(&self, text: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CopixError::clipboard("clipboard disabled"));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

//! NameListManager: owns the list, both dialog flows and the copy notice.
//!
//! Driven one UI event at a time. Commands that wait on the photo library
//! hold `&mut self` across the await and mark their flow as picking, so a
//! second attach/set for the same target is rejected until the call returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::copy::{CopyNotice, CopyReceipt, DEFAULT_NOTICE_TTL};
use crate::error::{CopixError, Result};
use crate::list::NameList;
use crate::model::{normalize_name, Clock, ImageRef, NameEntry, NameId, SystemClock};
use crate::services::{ClipboardService, ImageService, Permission, PickOutcome, PickerOptions};
use crate::workflow::{AddFlow, EditFlow};

/// Result of an image-choice command that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Entry created (add flow) or updated (edit flow)
    Applied(NameEntry),
    /// User closed the picker
    Cancelled,
}

pub struct NameListManager {
    list: NameList,
    add_flow: AddFlow,
    edit_flow: EditFlow,
    notice: CopyNotice,
    picker_options: PickerOptions,
    images: Arc<dyn ImageService>,
    clipboard: Arc<dyn ClipboardService>,
    clock: Arc<dyn Clock>,
}

impl NameListManager {
    pub fn new(images: Arc<dyn ImageService>, clipboard: Arc<dyn ClipboardService>) -> Self {
        Self {
            list: NameList::new(),
            add_flow: AddFlow::Idle,
            edit_flow: EditFlow::Idle,
            notice: CopyNotice::new(DEFAULT_NOTICE_TTL),
            picker_options: PickerOptions::default(),
            images,
            clipboard,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_copy_ttl(mut self, ttl: Duration) -> Self {
        self.notice = CopyNotice::new(ttl);
        self
    }

    pub fn with_picker_options(mut self, options: PickerOptions) -> Self {
        self.picker_options = options;
        self
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Favorites first, newest first within each group. Recomputed per call.
    pub fn view(&self) -> Vec<NameEntry> {
        self.list.sorted()
    }

    /// Current collection value; later mutations do not affect it.
    pub fn snapshot(&self) -> NameList {
        self.list.clone()
    }

    pub fn get(&self, id: NameId) -> Option<&NameEntry> {
        self.list.get(id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn add_flow(&self) -> &AddFlow {
        &self.add_flow
    }

    pub fn edit_flow(&self) -> &EditFlow {
        &self.edit_flow
    }

    pub fn copy_notice(&self) -> Option<CopyReceipt> {
        self.notice.current()
    }

    pub fn subscribe_copy_notice(&self) -> watch::Receiver<Option<CopyReceipt>> {
        self.notice.subscribe()
    }

    // ------------------------------------------------------------------
    // Add flow
    // ------------------------------------------------------------------

    /// Idle -> AwaitingName
    pub fn open_add_dialog(&mut self) -> Result<AddFlow> {
        let next = self.add_flow.open()?;
        self.set_add_flow(next);
        Ok(self.add_flow.clone())
    }

    /// AwaitingName (or Idle) -> AwaitingImageChoice. Blank names leave the
    /// flow where it was.
    pub fn add_name(&mut self, name: &str) -> Result<AddFlow> {
        let name = normalize_name(name)?;
        let next = self.add_flow.submit(name)?;
        self.set_add_flow(next);
        Ok(self.add_flow.clone())
    }

    /// Create the pending entry with `image`.
    pub fn attach_image(&mut self, image: ImageRef) -> Result<NameEntry> {
        let name = self.add_flow.ready_for_image("attach an image")?;
        Ok(self.create_pending(name, Some(image)))
    }

    /// Create the pending entry without an image.
    pub fn skip_image(&mut self) -> Result<NameEntry> {
        let name = self.add_flow.ready_for_image("skip the image")?;
        Ok(self.create_pending(name, None))
    }

    /// Back to Idle from any add state; returns the discarded pending name.
    pub fn cancel_add(&mut self) -> Option<String> {
        let discarded = self.add_flow.pending_name().map(str::to_string);
        self.set_add_flow(AddFlow::Idle);
        discarded
    }

    /// "Yes, add an image": ask for permission, run the picker, attach.
    pub async fn choose_image(&mut self) -> Result<ImageOutcome> {
        let picking = self.add_flow.begin_pick()?;
        self.set_add_flow(picking);

        match self.request_pick().await {
            Ok(PickOutcome::Selected(image)) => {
                let name = match self.add_flow.pending_name() {
                    Some(name) => name.to_string(),
                    None => {
                        let state = self.add_flow.name();
                        return Err(CopixError::workflow("attach an image", state));
                    }
                };
                Ok(ImageOutcome::Applied(self.create_pending(name, Some(image))))
            }
            Ok(PickOutcome::Cancelled) => {
                debug!("image selection cancelled; image dialog stays open");
                let reopened = self.add_flow.end_pick();
                self.set_add_flow(reopened);
                Ok(ImageOutcome::Cancelled)
            }
            Err(CopixError::PermissionDenied) => {
                self.set_add_flow(AddFlow::Idle);
                Err(CopixError::PermissionDenied)
            }
            Err(err) => {
                let reopened = self.add_flow.end_pick();
                self.set_add_flow(reopened);
                Err(err)
            }
        }
    }

    fn create_pending(&mut self, name: String, image: Option<ImageRef>) -> NameEntry {
        let entry = NameEntry::new(name, image, self.clock.now());
        self.list = self.list.prepend(entry.clone());
        self.set_add_flow(AddFlow::Idle);
        info!(id = %entry.id, name = %entry.name, has_image = entry.image.is_some(), "name added");
        entry
    }

    fn set_add_flow(&mut self, next: AddFlow) {
        if next != self.add_flow {
            debug!(from = self.add_flow.name(), to = next.name(), "add flow");
        }
        self.add_flow = next;
    }

    // ------------------------------------------------------------------
    // Direct mutations
    // ------------------------------------------------------------------

    pub fn toggle_favorite(&mut self, id: NameId) -> Result<NameEntry> {
        let current = self.require(id)?;
        let updated = current.with_favorite(!current.is_favorite);
        self.replace(updated)
    }

    /// Blank names fail with `InvalidInput` and change nothing.
    pub fn rename(&mut self, id: NameId, new_name: &str) -> Result<NameEntry> {
        let name = normalize_name(new_name)?;
        let updated = self.require(id)?.with_name(name);
        self.replace(updated)
    }

    pub fn set_image(&mut self, id: NameId, image: ImageRef) -> Result<NameEntry> {
        if self.edit_flow.is_picking_for(id) {
            return Err(CopixError::ImagePickInFlight);
        }
        self.apply_image(id, image)
    }

    /// Unconditional delete. Unknown ids are a no-op returning `None`.
    pub fn remove(&mut self, id: NameId) -> Option<NameEntry> {
        match self.list.without(id) {
            Some((list, removed)) => {
                self.list = list;
                info!(id = %id, name = %removed.name, "name removed");
                Some(removed)
            }
            None => {
                debug!(id = %id, "remove: no such entry");
                None
            }
        }
    }

    fn require(&self, id: NameId) -> Result<&NameEntry> {
        self.list.get(id).ok_or(CopixError::not_found(id))
    }

    fn apply_image(&mut self, id: NameId, image: ImageRef) -> Result<NameEntry> {
        let updated = self.require(id)?.with_image(image);
        self.replace(updated)
    }

    fn replace(&mut self, entry: NameEntry) -> Result<NameEntry> {
        let list = self
            .list
            .replace(entry.clone())
            .ok_or(CopixError::not_found(entry.id))?;
        self.list = list;
        debug!(id = %entry.id, name = %entry.name, favorite = entry.is_favorite, "entry updated");
        Ok(entry)
    }

    // ------------------------------------------------------------------
    // Edit flow
    // ------------------------------------------------------------------

    /// Idle -> EditChoice. Unknown ids leave the flow Idle.
    pub fn open_edit(&mut self, id: NameId) -> Result<EditFlow> {
        self.require(id)?;
        let next = self.edit_flow.open(id)?;
        self.set_edit_flow(next);
        Ok(self.edit_flow)
    }

    /// EditChoice -> EditingName; returns the current name to prefill.
    pub fn choose_edit_name(&mut self) -> Result<String> {
        let next = self.edit_flow.choose_name()?;
        let target = next.target().ok_or(CopixError::workflow("edit the name", "idle"))?;
        let current = match self.list.get(target) {
            Some(entry) => entry.name.clone(),
            None => {
                self.set_edit_flow(EditFlow::Idle);
                return Err(CopixError::not_found(target));
            }
        };
        self.set_edit_flow(next);
        Ok(current)
    }

    /// EditingName -> Idle. Blank names keep the dialog open.
    pub fn save_edit_name(&mut self, new_name: &str) -> Result<NameEntry> {
        let target = self.edit_flow.editing_name_target("save a name")?;
        match self.rename(target, new_name) {
            Err(CopixError::InvalidInput) => Err(CopixError::InvalidInput),
            result => {
                self.set_edit_flow(EditFlow::Idle);
                result
            }
        }
    }

    /// EditingName -> Idle without changes.
    pub fn cancel_edit_name(&mut self) -> Result<()> {
        self.edit_flow.editing_name_target("cancel renaming")?;
        self.set_edit_flow(EditFlow::Idle);
        Ok(())
    }

    /// EditChoice -> EditingImage -> Idle, whatever the picker says.
    pub async fn choose_edit_image(&mut self) -> Result<ImageOutcome> {
        let picking = self.edit_flow.choose_image()?;
        let target = picking.target().ok_or(CopixError::workflow("edit the image", "idle"))?;
        self.set_edit_flow(picking);

        let outcome = self.request_pick().await;
        self.set_edit_flow(EditFlow::Idle);

        match outcome? {
            PickOutcome::Selected(image) => {
                Ok(ImageOutcome::Applied(self.apply_image(target, image)?))
            }
            PickOutcome::Cancelled => {
                debug!(id = %target, "image selection cancelled");
                Ok(ImageOutcome::Cancelled)
            }
        }
    }

    /// Close the edit menu from any edit state.
    pub fn close_edit(&mut self) {
        self.set_edit_flow(EditFlow::Idle);
    }

    fn set_edit_flow(&mut self, next: EditFlow) {
        if next != self.edit_flow {
            debug!(from = self.edit_flow.name(), to = next.name(), "edit flow");
        }
        self.edit_flow = next;
    }

    // ------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------

    /// Permission then picker. Denial surfaces as `PermissionDenied`.
    async fn request_pick(&self) -> Result<PickOutcome> {
        match self.images.request_permission().await? {
            Permission::Granted => self.images.pick_image(&self.picker_options).await,
            Permission::Denied => {
                warn!("photo library permission denied");
                Err(CopixError::PermissionDenied)
            }
            Permission::Cancelled => {
                debug!("permission prompt dismissed");
                Ok(PickOutcome::Cancelled)
            }
        }
    }

    /// Write `text` to the clipboard and show the notice. On clipboard
    /// failure nothing is shown and the previous notice is left alone.
    pub async fn copy(&mut self, text: &str) -> Result<CopyReceipt> {
        if let Err(err) = self.clipboard.write(text).await {
            warn!(error = %err, "clipboard write failed");
            return Err(match err {
                CopixError::ClipboardUnavailable { .. } => err,
                other => CopixError::clipboard(other.to_string()),
            });
        }
        let receipt = self.notice.show(text, self.clock.now());
        debug!(text, ttl_ms = receipt.ttl.as_millis() as u64, "copied");
        Ok(receipt)
    }

    /// Hide the copy notice before its timer fires.
    pub fn dismiss_copy_notice(&mut self) {
        self.notice.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, RecordingClipboard, ScriptedImageService};

    fn manager() -> (NameListManager, Arc<ScriptedImageService>, Arc<ManualClock>) {
        let images = Arc::new(ScriptedImageService::new());
        let clock = Arc::new(ManualClock::default());
        let manager = NameListManager::new(images.clone(), Arc::new(RecordingClipboard::new()))
            .with_clock(clock.clone());
        (manager, images, clock)
    }

    fn add(manager: &mut NameListManager, name: &str) -> NameEntry {
        manager.add_name(name).unwrap();
        manager.skip_image().unwrap()
    }

    #[test]
    fn test_add_name_creates_nothing_until_image_choice() {
        let (mut manager, _, _) = manager();
        manager.open_add_dialog().unwrap();
        let flow = manager.add_name("  Alice ").unwrap();

        assert_eq!(flow.pending_name(), Some("Alice"));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_blank_name_keeps_dialog_open() {
        let (mut manager, _, _) = manager();
        manager.open_add_dialog().unwrap();

        assert_eq!(manager.add_name("   ").unwrap_err(), CopixError::InvalidInput);
        assert_eq!(manager.add_flow(), &AddFlow::AwaitingName);
    }

    #[test]
    fn test_attach_image_creates_entry() {
        let (mut manager, _, clock) = manager();
        manager.add_name("Alice").unwrap();
        let entry = manager.attach_image(ImageRef::new("/photos/alice.jpg")).unwrap();

        assert_eq!(entry.name, "Alice");
        assert_eq!(entry.image, Some(ImageRef::new("/photos/alice.jpg")));
        assert!(!entry.is_favorite);
        assert_eq!(entry.created_at, clock.now());
        assert!(manager.add_flow().is_idle());
        assert_eq!(manager.get(entry.id), Some(&entry));
    }

    #[test]
    fn test_skip_without_pending_name_is_rejected() {
        let (mut manager, _, _) = manager();
        let err = manager.skip_image().unwrap_err();
        assert!(matches!(err, CopixError::Workflow { .. }));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_cancel_add_discards_pending_name() {
        let (mut manager, _, _) = manager();
        manager.add_name("Carol").unwrap();

        assert_eq!(manager.cancel_add(), Some("Carol".to_string()));
        assert!(manager.add_flow().is_idle());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_rename_rejects_blank_and_unknown() {
        let (mut manager, _, _) = manager();
        let alice = add(&mut manager, "Alice");

        assert_eq!(manager.rename(alice.id, " "), Err(CopixError::InvalidInput));
        assert_eq!(manager.get(alice.id).unwrap().name, "Alice");

        let ghost = NameId::new();
        assert_eq!(manager.rename(ghost, "Bob"), Err(CopixError::not_found(ghost)));

        let renamed = manager.rename(alice.id, " Alicia ").unwrap();
        assert_eq!(renamed.name, "Alicia");
        assert_eq!(renamed.created_at, alice.created_at);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let (mut manager, _, _) = manager();
        let alice = add(&mut manager, "Alice");
        let before = manager.snapshot();

        manager.toggle_favorite(alice.id).unwrap();

        assert!(!before.get(alice.id).unwrap().is_favorite);
        assert!(manager.get(alice.id).unwrap().is_favorite);
    }

    #[test]
    fn test_open_edit_unknown_id_stays_idle() {
        let (mut manager, _, _) = manager();
        let ghost = NameId::new();

        assert!(manager.open_edit(ghost).unwrap_err().is_not_found());
        assert!(manager.edit_flow().is_idle());
    }

    #[test]
    fn test_edit_name_flow() {
        let (mut manager, _, _) = manager();
        let alice = add(&mut manager, "Alice");

        manager.open_edit(alice.id).unwrap();
        assert_eq!(manager.choose_edit_name().unwrap(), "Alice");

        assert_eq!(manager.save_edit_name(""), Err(CopixError::InvalidInput));
        assert_eq!(manager.edit_flow(), &EditFlow::EditingName { target: alice.id });

        let saved = manager.save_edit_name("Alicia").unwrap();
        assert_eq!(saved.name, "Alicia");
        assert!(manager.edit_flow().is_idle());
    }

    #[test]
    fn test_edit_name_after_removal_returns_to_idle() {
        let (mut manager, _, _) = manager();
        let alice = add(&mut manager, "Alice");

        manager.open_edit(alice.id).unwrap();
        manager.choose_edit_name().unwrap();
        manager.remove(alice.id);

        assert!(manager.save_edit_name("Alicia").unwrap_err().is_not_found());
        assert!(manager.edit_flow().is_idle());
    }

    #[test]
    fn test_cancel_edit_name_changes_nothing() {
        let (mut manager, _, _) = manager();
        let alice = add(&mut manager, "Alice");

        manager.open_edit(alice.id).unwrap();
        manager.choose_edit_name().unwrap();
        manager.cancel_edit_name().unwrap();

        assert!(manager.edit_flow().is_idle());
        assert_eq!(manager.get(alice.id).unwrap().name, "Alice");
        assert!(manager.cancel_edit_name().is_err());
    }

    #[tokio::test]
    async fn test_choose_image_attaches_selection() {
        let (mut manager, images, _) = manager();
        images.push_pick(PickOutcome::Selected(ImageRef::new("/photos/a.png")));

        manager.add_name("Alice").unwrap();
        let outcome = manager.choose_image().await.unwrap();

        let ImageOutcome::Applied(entry) = outcome else {
            panic!("expected an entry");
        };
        assert_eq!(entry.image, Some(ImageRef::new("/photos/a.png")));
        assert!(manager.add_flow().is_idle());
        assert_eq!(images.last_options(), Some(PickerOptions::default()));
    }

    #[tokio::test]
    async fn test_choose_image_cancel_keeps_pending_name() {
        let (mut manager, images, _) = manager();
        images.push_pick(PickOutcome::Cancelled);

        manager.add_name("Alice").unwrap();
        assert_eq!(manager.choose_image().await.unwrap(), ImageOutcome::Cancelled);

        assert_eq!(manager.add_flow().pending_name(), Some("Alice"));
        assert!(manager.is_empty());

        let entry = manager.skip_image().unwrap();
        assert_eq!(entry.name, "Alice");
        assert_eq!(entry.image, None);
    }

    #[tokio::test]
    async fn test_choose_image_denied_returns_to_idle() {
        let (mut manager, images, _) = manager();
        images.push_permission(Permission::Denied);

        manager.add_name("Alice").unwrap();
        assert_eq!(manager.choose_image().await, Err(CopixError::PermissionDenied));

        assert!(manager.add_flow().is_idle());
        assert!(manager.is_empty());
        assert_eq!(images.pick_calls(), 0);
    }

    #[tokio::test]
    async fn test_choose_image_service_error_reopens_dialog() {
        let (mut manager, images, _) = manager();
        images.push_pick_error(CopixError::image_service("picker crashed"));

        manager.add_name("Alice").unwrap();
        let err = manager.choose_image().await.unwrap_err();

        assert!(matches!(err, CopixError::ImageService { .. }));
        assert_eq!(
            manager.add_flow(),
            &AddFlow::AwaitingImageChoice {
                pending_name: "Alice".to_string(),
                picking: false,
            }
        );
    }

    #[tokio::test]
    async fn test_choose_edit_image_replaces_image() {
        let (mut manager, images, _) = manager();
        let alice = add(&mut manager, "Alice");
        images.push_pick(PickOutcome::Selected(ImageRef::new("/photos/new.png")));

        manager.open_edit(alice.id).unwrap();
        let outcome = manager.choose_edit_image().await.unwrap();

        assert!(matches!(outcome, ImageOutcome::Applied(ref e) if e.id == alice.id));
        assert_eq!(
            manager.get(alice.id).unwrap().image,
            Some(ImageRef::new("/photos/new.png"))
        );
        assert!(manager.edit_flow().is_idle());
    }

    #[tokio::test]
    async fn test_choose_edit_image_denied_or_cancelled_goes_idle() {
        let (mut manager, images, _) = manager();
        let alice = add(&mut manager, "Alice");
        images.push_permission(Permission::Denied);

        manager.open_edit(alice.id).unwrap();
        assert_eq!(manager.choose_edit_image().await, Err(CopixError::PermissionDenied));
        assert!(manager.edit_flow().is_idle());

        manager.open_edit(alice.id).unwrap();
        assert_eq!(manager.choose_edit_image().await.unwrap(), ImageOutcome::Cancelled);
        assert!(manager.edit_flow().is_idle());
        assert_eq!(manager.get(alice.id).unwrap().image, None);
    }

    #[test]
    fn test_set_image_rejected_while_picking_for_target() {
        let (mut manager, _, _) = manager();
        let alice = add(&mut manager, "Alice");
        manager.edit_flow = EditFlow::EditingImage { target: alice.id };

        assert_eq!(
            manager.set_image(alice.id, ImageRef::new("/x.png")),
            Err(CopixError::ImagePickInFlight)
        );
        assert_eq!(manager.get(alice.id).unwrap().image, None);
    }

    #[test]
    fn test_attach_rejected_while_picking() {
        let (mut manager, _, _) = manager();
        manager.add_name("Alice").unwrap();
        manager.add_flow = manager.add_flow.begin_pick().unwrap();

        assert_eq!(
            manager.attach_image(ImageRef::new("/x.png")),
            Err(CopixError::ImagePickInFlight)
        );
        assert_eq!(manager.skip_image(), Err(CopixError::ImagePickInFlight));

        // a dropped picker future is recovered by cancelling
        assert_eq!(manager.cancel_add(), Some("Alice".to_string()));
        assert!(manager.add_flow().is_idle());
    }
}

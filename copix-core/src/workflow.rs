//! Dialog state machines for the add and edit flows.
//!
//! Each flow is a single enum, so "two dialogs open at once" cannot be
//! expressed. Transitions return the next state or a `Workflow` error and
//! never mutate on failure; the manager assigns the result.

use crate::error::{CopixError, Result};
use crate::model::NameId;

/// Add-name flow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddFlow {
    #[default]
    Idle,
    /// Name-entry dialog open
    AwaitingName,
    /// Image dialog open for `pending_name`
    AwaitingImageChoice {
        pending_name: String,
        /// An image service call is pending
        picking: bool,
    },
}

impl AddFlow {
    pub fn name(&self) -> &'static str {
        match self {
            AddFlow::Idle => "idle",
            AddFlow::AwaitingName => "awaiting a name",
            AddFlow::AwaitingImageChoice { picking: false, .. } => "awaiting an image choice",
            AddFlow::AwaitingImageChoice { picking: true, .. } => "picking an image",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AddFlow::Idle)
    }

    pub fn pending_name(&self) -> Option<&str> {
        match self {
            AddFlow::AwaitingImageChoice { pending_name, .. } => Some(pending_name),
            _ => None,
        }
    }

    pub(crate) fn open(&self) -> Result<AddFlow> {
        match self {
            AddFlow::Idle | AddFlow::AwaitingName => Ok(AddFlow::AwaitingName),
            other => Err(CopixError::workflow("open the name dialog", other.name())),
        }
    }

    /// `name` must already be normalized.
    pub(crate) fn submit(&self, name: String) -> Result<AddFlow> {
        match self {
            AddFlow::Idle | AddFlow::AwaitingName => Ok(AddFlow::AwaitingImageChoice {
                pending_name: name,
                picking: false,
            }),
            other => Err(CopixError::workflow("submit a name", other.name())),
        }
    }

    /// Pending name, if the image dialog is open and idle.
    pub(crate) fn ready_for_image(&self, action: &'static str) -> Result<String> {
        match self {
            AddFlow::AwaitingImageChoice { picking: true, .. } => {
                Err(CopixError::ImagePickInFlight)
            }
            AddFlow::AwaitingImageChoice { pending_name, .. } => Ok(pending_name.clone()),
            other => Err(CopixError::workflow(action, other.name())),
        }
    }

    pub(crate) fn begin_pick(&self) -> Result<AddFlow> {
        let pending_name = self.ready_for_image("choose an image")?;
        Ok(AddFlow::AwaitingImageChoice {
            pending_name,
            picking: true,
        })
    }

    /// Picker came back without an image; the dialog stays open.
    pub(crate) fn end_pick(&self) -> AddFlow {
        match self {
            AddFlow::AwaitingImageChoice { pending_name, .. } => AddFlow::AwaitingImageChoice {
                pending_name: pending_name.clone(),
                picking: false,
            },
            other => other.clone(),
        }
    }
}

/// Edit flow for one target entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditFlow {
    #[default]
    Idle,
    /// Name-or-image menu open
    EditChoice { target: NameId },
    /// Rename dialog open
    EditingName { target: NameId },
    /// Image service call pending
    EditingImage { target: NameId },
}

impl EditFlow {
    pub fn name(&self) -> &'static str {
        match self {
            EditFlow::Idle => "idle",
            EditFlow::EditChoice { .. } => "choosing what to edit",
            EditFlow::EditingName { .. } => "editing a name",
            EditFlow::EditingImage { .. } => "picking an image",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditFlow::Idle)
    }

    pub fn target(&self) -> Option<NameId> {
        match *self {
            EditFlow::Idle => None,
            EditFlow::EditChoice { target }
            | EditFlow::EditingName { target }
            | EditFlow::EditingImage { target } => Some(target),
        }
    }

    pub(crate) fn open(&self, target: NameId) -> Result<EditFlow> {
        match self {
            EditFlow::Idle => Ok(EditFlow::EditChoice { target }),
            other => Err(CopixError::workflow("open the edit menu", other.name())),
        }
    }

    pub(crate) fn choose_name(&self) -> Result<EditFlow> {
        match *self {
            EditFlow::EditChoice { target } => Ok(EditFlow::EditingName { target }),
            other => Err(CopixError::workflow("edit the name", other.name())),
        }
    }

    pub(crate) fn choose_image(&self) -> Result<EditFlow> {
        match *self {
            EditFlow::EditChoice { target } => Ok(EditFlow::EditingImage { target }),
            EditFlow::EditingImage { .. } => Err(CopixError::ImagePickInFlight),
            other => Err(CopixError::workflow("edit the image", other.name())),
        }
    }

    pub(crate) fn editing_name_target(&self, action: &'static str) -> Result<NameId> {
        match *self {
            EditFlow::EditingName { target } => Ok(target),
            other => Err(CopixError::workflow(action, other.name())),
        }
    }

    pub(crate) fn is_picking_for(&self, id: NameId) -> bool {
        matches!(*self, EditFlow::EditingImage { target } if target == id)
    }
}

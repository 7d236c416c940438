pub mod copy;
pub mod error;
pub mod list;
pub mod manager;
pub mod model;
pub mod services;
pub mod testing;
pub mod workflow;

pub use copy::{CopyNotice, CopyReceipt, DEFAULT_NOTICE_TTL};
pub use error::{CopixError, Result};
pub use list::NameList;
pub use manager::{ImageOutcome, NameListManager};
pub use model::{normalize_name, Clock, ImageRef, NameEntry, NameId, SystemClock};
pub use services::{ClipboardService, ImageService, Permission, PickOutcome, PickerOptions};
pub use workflow::{AddFlow, EditFlow};

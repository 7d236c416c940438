//! Terminal rendering for the session: palettes and line formatting.
//!
//! Colors come from the CopiX green/black theme, one table per `Theme`.

use std::fmt;

use copix_core::{CopyReceipt, NameEntry, NameId};
use crossterm::style::{Color, StyledContent, Stylize};

use crate::config::Theme;

const FAVORITE_MARK: &str = "★";
const IMAGE_MARK: &str = "🖼";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub border: Color,
    pub error: Color,
    pub success: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: ((hex >> 16) & 0xff) as u8,
        g: ((hex >> 8) & 0xff) as u8,
        b: (hex & 0xff) as u8,
    }
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                primary: rgb(0x2e7d32),
                border: rgb(0x404040),
                error: rgb(0xef4444),
                success: rgb(0x22c55e),
            },
            Theme::Light => Self {
                primary: rgb(0x1b5e20),
                border: rgb(0xe5e7eb),
                error: rgb(0xdc2626),
                success: rgb(0x16a34a),
            },
        }
    }

    pub fn title(&self, text: &str) -> StyledContent<String> {
        text.to_string().with(self.primary).bold()
    }

    pub fn rule(&self, width: usize) -> StyledContent<String> {
        "─".repeat(width).with(self.border)
    }

    pub fn error(&self, text: &str) -> StyledContent<String> {
        format!("✗ {}", text).with(self.error)
    }

    pub fn success(&self, text: &str) -> StyledContent<String> {
        format!("✓ {}", text).with(self.success)
    }

    pub fn muted(&self, text: &str) -> StyledContent<String> {
        text.to_string().with(self.border)
    }
}

/// One-line label for an entry in the list menu
pub fn entry_label(entry: &NameEntry) -> String {
    let mut label = String::new();
    label.push_str(if entry.is_favorite { FAVORITE_MARK } else { " " });
    label.push(' ');
    label.push_str(&entry.name);
    if entry.image.is_some() {
        label.push(' ');
        label.push_str(IMAGE_MARK);
    }
    label
}

pub fn notice_line(receipt: &CopyReceipt) -> String {
    format!("📋 Copied \"{}\"", receipt.text)
}

/// Options of the main menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainChoice {
    Add,
    Entry { id: NameId, label: String },
    Quit,
}

impl MainChoice {
    pub fn entry(entry: &NameEntry) -> Self {
        MainChoice::Entry {
            id: entry.id,
            label: entry_label(entry),
        }
    }
}

impl fmt::Display for MainChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainChoice::Add => write!(f, "+ Add name"),
            MainChoice::Entry { label, .. } => write!(f, "{}", label),
            MainChoice::Quit => write!(f, "Quit"),
        }
    }
}

/// Per-entry action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Copy,
    ToggleFavorite { is_favorite: bool },
    Edit,
    Delete,
    Back,
}

impl EntryAction {
    pub fn menu(entry: &NameEntry) -> Vec<EntryAction> {
        vec![
            EntryAction::Copy,
            EntryAction::ToggleFavorite {
                is_favorite: entry.is_favorite,
            },
            EntryAction::Edit,
            EntryAction::Delete,
            EntryAction::Back,
        ]
    }
}

impl fmt::Display for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryAction::Copy => write!(f, "Copy"),
            EntryAction::ToggleFavorite { is_favorite: true } => write!(f, "Unfavorite"),
            EntryAction::ToggleFavorite { is_favorite: false } => write!(f, "Favorite"),
            EntryAction::Edit => write!(f, "Edit"),
            EntryAction::Delete => write!(f, "Delete"),
            EntryAction::Back => write!(f, "Back"),
        }
    }
}

/// Two-step edit menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditChoice {
    Name,
    Image,
    Close,
}

impl EditChoice {
    pub const ALL: [EditChoice; 3] = [EditChoice::Name, EditChoice::Image, EditChoice::Close];
}

impl fmt::Display for EditChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditChoice::Name => write!(f, "Edit name"),
            EditChoice::Image => write!(f, "Edit image"),
            EditChoice::Close => write!(f, "Close"),
        }
    }
}

/// "Add her image" dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageChoice {
    Yes,
    Skip,
}

impl ImageChoice {
    pub const ALL: [ImageChoice; 2] = [ImageChoice::Yes, ImageChoice::Skip];
}

impl fmt::Display for ImageChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageChoice::Yes => write!(f, "Yes"),
            ImageChoice::Skip => write!(f, "Skip"),
        }
    }
}

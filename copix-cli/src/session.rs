//! Interactive session: the list screen, its dialogs and menus.
//!
//! Every menu maps to a manager command. Esc follows the cancel transition
//! of whichever flow is open; Ctrl-C unwinds the open flow and quits.

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use copix_core::{CopixError, ImageOutcome, NameId, NameListManager};
use inquire::{Confirm, InquireError, Select, Text};
use tracing::debug;

use crate::config::CopixConfig;
use crate::ui::{self, EditChoice, EntryAction, ImageChoice, MainChoice, Palette};

/// Interactive prompts need a TTY on both ends
pub fn can_run_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

enum Answer<T> {
    Value(T),
    /// Esc
    Cancelled,
    /// Ctrl-C
    Interrupted,
}

fn ask<T>(prompt: impl FnOnce() -> inquire::error::InquireResult<T>) -> Result<Answer<T>> {
    match tokio::task::block_in_place(prompt) {
        Ok(value) => Ok(Answer::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Cancelled),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Interrupted),
        Err(e) => Err(anyhow!(e).context("Prompt failed")),
    }
}

pub struct Session {
    manager: NameListManager,
    palette: Palette,
    confirm_delete: bool,
}

impl Session {
    pub fn new(manager: NameListManager, config: &CopixConfig) -> Self {
        Self {
            manager,
            palette: Palette::for_theme(config.general.theme),
            confirm_delete: config.general.confirm_delete,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.render_header();

            let mut choices = vec![MainChoice::Add];
            choices.extend(self.manager.view().iter().map(MainChoice::entry));
            choices.push(MainChoice::Quit);

            let step = match ask(|| {
                Select::new("Names:", choices)
                    .with_page_size(15)
                    .with_help_message("Enter to open, Ctrl-C to quit")
                    .prompt()
            })? {
                Answer::Value(MainChoice::Add) => self.add_flow().await?,
                Answer::Value(MainChoice::Entry { id, .. }) => self.entry_menu(id).await?,
                Answer::Value(MainChoice::Quit) | Answer::Interrupted => Step::Quit,
                Answer::Cancelled => Step::Continue,
            };

            if step == Step::Quit {
                debug!(entries = self.manager.len(), "session ended");
                return Ok(());
            }
        }
    }

    fn render_header(&self) {
        println!();
        println!("{}", self.palette.title("CopiX"));
        println!("{}", self.palette.rule(24));
        if let Some(receipt) = self.manager.copy_notice() {
            println!("{}", self.palette.success(&ui::notice_line(&receipt)));
        }
        if self.manager.is_empty() {
            println!("{}", self.palette.muted("No names yet. Add one to get started."));
        }
    }

    /// Recoverable failure: tell the user, stay in the session.
    fn report(&self, err: &CopixError) {
        if err.is_not_found() {
            // the list changed under a stale menu line
            debug!(error = %err, "ignoring stale id");
            return;
        }
        eprintln!("{}", self.palette.error(&err.to_string()));
    }

    // ------------------------------------------------------------------
    // Add flow
    // ------------------------------------------------------------------

    async fn add_flow(&mut self) -> Result<Step> {
        if let Err(err) = self.manager.open_add_dialog() {
            self.report(&err);
            return Ok(Step::Continue);
        }

        loop {
            match ask(|| {
                Text::new("Enter her name:")
                    .with_help_message("Esc to cancel")
                    .prompt()
            })? {
                Answer::Value(raw) => match self.manager.add_name(&raw) {
                    Ok(_) => break,
                    Err(err) => self.report(&err),
                },
                Answer::Cancelled => {
                    self.manager.cancel_add();
                    return Ok(Step::Continue);
                }
                Answer::Interrupted => {
                    self.manager.cancel_add();
                    return Ok(Step::Quit);
                }
            }
        }

        loop {
            match ask(|| Select::new("Add her image?", ImageChoice::ALL.to_vec()).prompt())? {
                Answer::Value(ImageChoice::Skip) => {
                    let entry = self.manager.skip_image()?;
                    println!("{}", self.palette.success(&format!("Added {}", entry.name)));
                    return Ok(Step::Continue);
                }
                Answer::Value(ImageChoice::Yes) => match self.manager.choose_image().await {
                    Ok(ImageOutcome::Applied(entry)) => {
                        println!("{}", self.palette.success(&format!("Added {}", entry.name)));
                        return Ok(Step::Continue);
                    }
                    Ok(ImageOutcome::Cancelled) => continue,
                    Err(CopixError::Interrupted) => {
                        self.manager.cancel_add();
                        return Ok(Step::Quit);
                    }
                    Err(err @ CopixError::PermissionDenied) => {
                        self.report(&err);
                        return Ok(Step::Continue);
                    }
                    Err(err) => self.report(&err),
                },
                Answer::Cancelled => {
                    self.manager.cancel_add();
                    return Ok(Step::Continue);
                }
                Answer::Interrupted => {
                    self.manager.cancel_add();
                    return Ok(Step::Quit);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Entry actions
    // ------------------------------------------------------------------

    async fn entry_menu(&mut self, id: NameId) -> Result<Step> {
        let Some(entry) = self.manager.get(id).cloned() else {
            return Ok(Step::Continue);
        };

        let title = format!("{}:", entry.name);
        match ask(|| Select::new(&title, EntryAction::menu(&entry)).prompt())? {
            Answer::Value(EntryAction::Copy) => match self.manager.copy(&entry.name).await {
                Ok(receipt) => println!("{}", self.palette.success(&ui::notice_line(&receipt))),
                Err(err) => self.report(&err),
            },
            Answer::Value(EntryAction::ToggleFavorite { .. }) => {
                if let Err(err) = self.manager.toggle_favorite(id) {
                    self.report(&err);
                }
            }
            Answer::Value(EntryAction::Edit) => return self.edit_flow(id).await,
            Answer::Value(EntryAction::Delete) => return self.delete(id, &entry.name),
            Answer::Value(EntryAction::Back) | Answer::Cancelled => {}
            Answer::Interrupted => return Ok(Step::Quit),
        }
        Ok(Step::Continue)
    }

    fn delete(&mut self, id: NameId, name: &str) -> Result<Step> {
        if self.confirm_delete {
            let question = format!("Delete {}?", name);
            match ask(|| Confirm::new(&question).with_default(false).prompt())? {
                Answer::Value(true) => {}
                Answer::Value(false) | Answer::Cancelled => return Ok(Step::Continue),
                Answer::Interrupted => return Ok(Step::Quit),
            }
        }

        if let Some(removed) = self.manager.remove(id) {
            println!("{}", self.palette.muted(&format!("Deleted {}", removed.name)));
        }
        Ok(Step::Continue)
    }

    // ------------------------------------------------------------------
    // Edit flow
    // ------------------------------------------------------------------

    async fn edit_flow(&mut self, id: NameId) -> Result<Step> {
        if let Err(err) = self.manager.open_edit(id) {
            self.report(&err);
            return Ok(Step::Continue);
        }

        match ask(|| Select::new("Edit:", EditChoice::ALL.to_vec()).prompt())? {
            Answer::Value(EditChoice::Name) => return self.edit_name(),
            Answer::Value(EditChoice::Image) => match self.manager.choose_edit_image().await {
                Ok(ImageOutcome::Applied(entry)) => {
                    let line = format!("Updated image for {}", entry.name);
                    println!("{}", self.palette.success(&line));
                }
                Ok(ImageOutcome::Cancelled) => {}
                Err(CopixError::Interrupted) => {
                    self.manager.close_edit();
                    return Ok(Step::Quit);
                }
                Err(err) => self.report(&err),
            },
            Answer::Value(EditChoice::Close) | Answer::Cancelled => self.manager.close_edit(),
            Answer::Interrupted => {
                self.manager.close_edit();
                return Ok(Step::Quit);
            }
        }
        Ok(Step::Continue)
    }

    fn edit_name(&mut self) -> Result<Step> {
        let current = match self.manager.choose_edit_name() {
            Ok(current) => current,
            Err(err) => {
                self.report(&err);
                self.manager.close_edit();
                return Ok(Step::Continue);
            }
        };

        loop {
            match ask(|| {
                Text::new("Edit name:")
                    .with_initial_value(&current)
                    .with_help_message("Esc to cancel")
                    .prompt()
            })? {
                Answer::Value(raw) => match self.manager.save_edit_name(&raw) {
                    Ok(entry) => {
                        println!("{}", self.palette.success(&format!("Renamed to {}", entry.name)));
                        return Ok(Step::Continue);
                    }
                    Err(CopixError::InvalidInput) => self.report(&CopixError::InvalidInput),
                    Err(err) => {
                        self.report(&err);
                        return Ok(Step::Continue);
                    }
                },
                Answer::Cancelled => {
                    self.manager.cancel_edit_name()?;
                    return Ok(Step::Continue);
                }
                Answer::Interrupted => {
                    self.manager.close_edit();
                    return Ok(Step::Quit);
                }
            }
        }
    }
}

//! Line-driven shell over a [`Gallery`]

use anyhow::Result;
use app_core::persistence::{apply_changes, diff, PersistenceGateway};
use app_core::{
    BulkAction, CommandOutcome, Confirm, ContextAction, DragInteraction, Gallery, GalleryCommand,
    GalleryConfig, GalleryError, Item, ItemId, ItemKind, ItemRegistry, MoveTarget, Notification,
    NotificationKind, Notifier, RecordingNotifier, TracingNotifier,
};
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// One line typed into the shell
#[derive(Parser, Debug)]
#[command(name = "gallery", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// List the current folder
    #[command(alias = "dir")]
    Ls,
    /// Print the whole tree
    Tree,
    /// Enter a folder; `..` goes up, `/` goes to the root
    Cd { target: String },
    Back,
    Forward,
    /// Open a presentation or enter a folder
    Open { id: String },
    /// Create a folder, in the current folder unless `--parent` is given
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Create a presentation, in the current folder unless `--parent` is given
    New {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    Rename { id: String, name: String },
    /// Delete items
    Rm {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Move items into a folder or to the root
    Mv {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long, conflicts_with = "root")]
        to: Option<String>,
        #[arg(long)]
        root: bool,
    },
    /// Toggle items in the selection
    Select {
        ids: Vec<String>,
        /// Select everything listed in the current folder
        #[arg(long, conflicts_with = "clear")]
        all: bool,
        #[arg(long)]
        clear: bool,
    },
    /// Run an action over the selection
    Bulk {
        action: BulkAction,
        target: Option<String>,
    },
    /// Show an item's context menu, or pick an entry from it
    Menu {
        id: String,
        action: Option<ContextAction>,
        input: Option<String>,
    },
    /// Drag-and-drop gesture
    Drag {
        #[command(subcommand)]
        step: DragStep,
    },
    /// Expand or collapse one folder
    Toggle { id: String },
    ExpandAll { id: String },
    CollapseAll { id: String },
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DragStep {
    Start { id: String },
    Over { id: Option<String> },
    End { id: Option<String> },
    Cancel,
}

/// Split a line into words, honouring single and double quotes.
///
/// A quoted empty string yields an empty word.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => word.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            None => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

enum Flow {
    Continue,
    Quit,
}

/// Confirmation read from the shell's own input
struct LineConfirm<'a, R> {
    input: &'a RefCell<R>,
    assume_yes: bool,
}

impl<R: BufRead> Confirm for LineConfirm<'_, R> {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", prompt);
        let mut answer = String::new();
        match self.input.borrow_mut().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

pub struct Shell<R, W> {
    gallery: Gallery,
    notes: Arc<RecordingNotifier>,
    log: TracingNotifier,
    input: RefCell<R>,
    out: W,
    store: Option<Box<dyn PersistenceGateway>>,
    synced: Vec<Item>,
    assume_yes: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(config: GalleryConfig, registry: ItemRegistry, input: R, out: W, assume_yes: bool) -> Self {
        let notes = Arc::new(RecordingNotifier::new());
        let gallery = Gallery::with_registry(config, registry, Box::new(notes.clone()));
        Self {
            gallery,
            notes,
            log: TracingNotifier,
            input: RefCell::new(input),
            out,
            store: None,
            synced: Vec::new(),
            assume_yes,
        }
    }

    /// Mirror every change into `store`, which currently holds `stored`
    pub fn with_store(mut self, store: Box<dyn PersistenceGateway>, stored: Vec<Item>) -> Result<Self> {
        let current = self.gallery.snapshot();
        let applied = apply_changes(store.as_ref(), &diff(&stored, &current))?;
        tracing::debug!("Initial store sync applied {} change(s)", applied);
        self.synced = current;
        self.store = Some(store);
        Ok(self)
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read and run lines until end of input or `quit`
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.out, "{}> ", self.location())?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.borrow_mut().read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            if let Flow::Quit = self.handle_line(&line)? {
                break;
            }
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.gallery
            .breadcrumbs()
            .last()
            .map(|crumb| crumb.name.clone())
            .unwrap_or_default()
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let words = match split_line(line) {
            Ok(words) if words.is_empty() => return Ok(Flow::Continue),
            Ok(words) => words,
            Err(e) => {
                writeln!(self.out, "error: {}", e)?;
                return Ok(Flow::Continue);
            }
        };

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(self.out, "{}", e)?;
                return Ok(Flow::Continue);
            }
        };

        if command == ShellCommand::Quit {
            return Ok(Flow::Quit);
        }

        tracing::debug!("Shell command: {:?}", command);
        let result = self.dispatch(command);
        let shown = self.flush_notifications()?;
        match result {
            Ok(Some(reply)) => writeln!(self.out, "{}", reply)?,
            Ok(None) => {}
            Err(e) if shown == 0 => writeln!(self.out, "error: {}", e)?,
            Err(_) => {}
        }

        self.sync_store()?;
        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<Option<String>, GalleryError> {
        match command {
            ShellCommand::Ls => Ok(Some(self.render_listing())),
            ShellCommand::Tree => Ok(Some(self.render_tree())),
            ShellCommand::Cd { target } => {
                match target.as_str() {
                    ".." => {
                        self.gallery.go_up();
                    }
                    "/" => self.gallery.navigate_to(None),
                    id => {
                        let id = ItemId::new(id);
                        if !self.gallery.get(&id)?.is_folder() {
                            return Err(GalleryError::NotAFolder(id));
                        }
                        self.gallery.navigate_to(Some(id));
                    }
                }
                Ok(None)
            }
            ShellCommand::Back => {
                self.gallery.go_back();
                Ok(None)
            }
            ShellCommand::Forward => {
                self.gallery.go_forward();
                Ok(None)
            }
            ShellCommand::Open { id } => {
                let outcome = self.gallery.open(&ItemId::new(&id))?;
                Ok(Some(describe(&outcome)))
            }
            ShellCommand::Mkdir { name, parent } => {
                let parent = self.parent_or_current(parent);
                self.execute(GalleryCommand::NewFolder { name, parent })
            }
            ShellCommand::New { name, parent } => {
                let parent = self.parent_or_current(parent);
                self.execute(GalleryCommand::NewPresentation { name, parent })
            }
            ShellCommand::Rename { id, name } => self.execute(GalleryCommand::Rename {
                id: ItemId::new(&id),
                name,
            }),
            ShellCommand::Rm { ids } => {
                self.execute(GalleryCommand::Delete(ids.iter().map(|id| ItemId::new(id)).collect()))
            }
            ShellCommand::Mv { ids, to, root } => {
                let target = match (to, root) {
                    (_, true) => MoveTarget::Root,
                    (Some(folder), false) => MoveTarget::Folder(ItemId::new(&folder)),
                    (None, false) => MoveTarget::Nowhere,
                };
                self.execute(GalleryCommand::Move {
                    ids: ids.iter().map(|id| ItemId::new(id)).collect(),
                    target,
                })
            }
            ShellCommand::Select { ids, all, clear } => {
                if clear {
                    self.gallery.clear_selection();
                } else if all {
                    self.gallery.select_visible();
                }
                for id in &ids {
                    self.gallery.toggle_selection(&ItemId::new(id));
                }
                Ok(Some(format!("{} selected", self.gallery.selection().len())))
            }
            ShellCommand::Bulk { action, target } => {
                let confirm = LineConfirm {
                    input: &self.input,
                    assume_yes: self.assume_yes,
                };
                let outcome = self.gallery.bulk_action(action, target.as_deref(), &confirm)?;
                Ok(Some(describe(&outcome)))
            }
            ShellCommand::Menu { id, action, input } => {
                let id = ItemId::new(&id);
                let Some(action) = action else {
                    let item_type = self.gallery.get(&id)?.item_type();
                    let entries: Vec<&str> = ContextAction::menu_for(item_type)
                        .iter()
                        .map(|action| action.as_str())
                        .collect();
                    return Ok(Some(entries.join("  ")));
                };
                let confirm = LineConfirm {
                    input: &self.input,
                    assume_yes: self.assume_yes,
                };
                let outcome = self.gallery.context_action(action, &id, input.as_deref(), &confirm)?;
                Ok(Some(describe(&outcome)))
            }
            ShellCommand::Drag { step } => self.drag(step),
            ShellCommand::Toggle { id } => {
                let expanded = self.gallery.toggle_folder_expansion(&ItemId::new(&id))?;
                Ok(Some(if expanded { "expanded" } else { "collapsed" }.to_string()))
            }
            ShellCommand::ExpandAll { id } => self.execute(GalleryCommand::ExpandAll(ItemId::new(&id))),
            ShellCommand::CollapseAll { id } => {
                self.execute(GalleryCommand::CollapseAll(ItemId::new(&id)))
            }
            ShellCommand::Quit => Ok(None),
        }
    }

    fn drag(&mut self, step: DragStep) -> Result<Option<String>, GalleryError> {
        match step {
            DragStep::Start { id } => {
                self.gallery.on_drag_start(&ItemId::new(&id))?;
                Ok(None)
            }
            DragStep::Over { id } => {
                let over = id.as_deref().map(ItemId::new);
                let verdict = self.gallery.on_drag_over(over.as_ref());
                Ok(Some(format!("{:?}", verdict)))
            }
            DragStep::End { id } => {
                let Some(dragged) = self.gallery.drag_phase().dragged().cloned() else {
                    return Ok(Some("no drag in progress".to_string()));
                };
                let over = id.as_deref().map(ItemId::new);
                self.gallery.on_drag_end(&dragged, over.as_ref())?;
                Ok(None)
            }
            DragStep::Cancel => {
                self.gallery.on_drag_cancel();
                Ok(None)
            }
        }
    }

    fn execute(&mut self, command: GalleryCommand) -> Result<Option<String>, GalleryError> {
        let confirm = LineConfirm {
            input: &self.input,
            assume_yes: self.assume_yes,
        };
        let outcome = self.gallery.execute(command, &confirm)?;
        Ok(match outcome {
            CommandOutcome::Done => None,
            other => Some(describe(&other)),
        })
    }

    fn parent_or_current(&self, parent: Option<String>) -> Option<ItemId> {
        match parent.as_deref() {
            Some("/") => None,
            Some(id) => Some(ItemId::new(id)),
            None => self.gallery.current_folder().cloned(),
        }
    }

    /// Print pending notifications; returns how many there were
    fn flush_notifications(&mut self) -> Result<usize> {
        let pending = self.notes.drain();
        for note in &pending {
            writeln!(self.out, "[{}] {}: {}", kind_label(note.kind), note.title, note.message)?;
            self.log.notify(Notification::clone(note));
        }
        Ok(pending.len())
    }

    fn sync_store(&mut self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let current = self.gallery.snapshot();
        let changes = diff(&self.synced, &current);
        if changes.is_empty() {
            return Ok(());
        }
        match apply_changes(store.as_ref(), &changes) {
            Ok(applied) => {
                tracing::debug!("Stored {} change(s)", applied);
                self.synced = current;
            }
            Err(e) => {
                tracing::warn!("Failed to store changes: {}", e);
                writeln!(self.out, "error: changes not saved: {}", e)?;
            }
        }
        Ok(())
    }

    fn render_listing(&self) -> String {
        let path: Vec<String> = self
            .gallery
            .breadcrumbs()
            .into_iter()
            .map(|crumb| crumb.name)
            .collect();

        let mut lines = vec![path.join(" / ")];
        for item in self.gallery.items_for_current_folder() {
            let marker = if self.gallery.is_selected(&item.id) { '*' } else { ' ' };
            lines.push(format!("{} {}", marker, describe_item(item)));
        }
        lines.join("\n")
    }

    fn render_tree(&self) -> String {
        let mut lines = vec![self.gallery.config().general.root_label.clone()];
        let mut stack: Vec<(&Item, usize)> = self
            .gallery
            .list_children(None)
            .into_iter()
            .rev()
            .map(|item| (item, 1))
            .collect();

        while let Some((item, depth)) = stack.pop() {
            lines.push(format!("{}{}", "  ".repeat(depth), describe_item(item)));
            if item.is_folder() {
                stack.extend(
                    self.gallery
                        .list_children(Some(&item.id))
                        .into_iter()
                        .rev()
                        .map(|child| (child, depth + 1)),
                );
            }
        }
        lines.join("\n")
    }
}

fn kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
        NotificationKind::Warning => "warn",
        NotificationKind::Info => "info",
    }
}

fn describe_item(item: &Item) -> String {
    match &item.kind {
        ItemKind::Folder {
            is_expanded,
            children_count,
        } => format!(
            "{} {:<20} {} ({} items)",
            if *is_expanded { '-' } else { '+' },
            item.id.as_str(),
            item.name,
            children_count
        ),
        ItemKind::Presentation { slide_count, .. } => {
            format!("  {:<20} {} ({} slides)", item.id.as_str(), item.name, slide_count)
        }
    }
}

fn describe(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Done => "done".to_string(),
        CommandOutcome::Created(id) => format!("created {}", id),
        CommandOutcome::Moved(summary) => format!("moved {} item(s)", summary.count()),
        CommandOutcome::Deleted(count) => format!("deleted {} item(s)", count),
        CommandOutcome::OpenFolder(id) => format!("entered {}", id),
        CommandOutcome::OpenPresentation(id) => format!("opening {}", id),
        CommandOutcome::Declined => "cancelled".to_string(),
    }
}

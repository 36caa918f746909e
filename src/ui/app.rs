use std::io;
use std::mem;

use anyhow::{Context, Result};
use crossterm::clipboard::CopyToClipboard;
use crossterm::event::KeyCode;
use crossterm::execute;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::models::CatalogEntry;
use crate::pipeline::{EntrySource, Feedback, Outcome, Pipeline, ScanOutcome};
use crate::scanner::{next_candidate, FrameSource};
use crate::store::CatalogStore;

use super::forms::{ConfirmBookDelete, ConverterForm, IsbnEntryForm, PathAction, PathPrompt};
use super::helpers::{
    centered_rect, detail_lines, feedback_color, outcome_message, process_log_line,
    surface_error,
};
use super::screens::{BookListState, ProcessLog};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header with catalog path, count and scanner state.
const HEADER_HEIGHT: u16 = 3;
/// Height of the process log pane beneath the detail panel.
const PROCESS_LOG_HEIGHT: u16 = 8;
/// Public Open Library page for a book, suffixed with its ISBN.
const BOOK_PAGE_URL: &str = "https://openlibrary.org/isbn/";

/// Fine-grained modes layered over the catalog view.
enum Mode {
    Normal,
    ManualEntry(IsbnEntryForm),
    Converter(ConverterForm),
    PathPrompt(PathPrompt),
    ConfirmDelete(ConfirmBookDelete),
    ConfirmNewCatalog,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Gray),
            StatusKind::Success => Style::default().fg(feedback_color(Feedback::Success)),
            StatusKind::Warning => Style::default().fg(feedback_color(Feedback::Warning)),
            StatusKind::Error => Style::default().fg(feedback_color(Feedback::Error)),
        }
    }
}

impl From<Feedback> for StatusKind {
    fn from(feedback: Feedback) -> Self {
        match feedback {
            Feedback::Success => StatusKind::Success,
            Feedback::Warning => StatusKind::Warning,
            Feedback::Error => StatusKind::Error,
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: CatalogStore,
    pipeline: Pipeline,
    feed: Option<Box<dyn FrameSource>>,
    scanning: bool,
    list: BookListState,
    process_log: ProcessLog,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        store: CatalogStore,
        pipeline: Pipeline,
        feed: Option<Box<dyn FrameSource>>,
    ) -> Self {
        let scanning = feed.is_some();
        Self {
            store,
            pipeline,
            feed,
            scanning,
            list: BookListState::default(),
            process_log: ProcessLog::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Show a failure that happened outside the event loop, such as the
    /// initial catalog load, in the footer.
    pub fn report_error(&mut self, err: &anyhow::Error) {
        self.set_status(surface_error(err), StatusKind::Error);
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ManualEntry(form) => self.handle_manual_entry(code, form)?,
            Mode::Converter(form) => self.handle_converter(code, form)?,
            Mode::PathPrompt(prompt) => self.handle_path_prompt(code, prompt)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::ConfirmNewCatalog => self.handle_confirm_new_catalog(code)?,
        };

        Ok(exit)
    }

    /// Called once per loop iteration. Runs at most one scanned identifier
    /// through the pipeline. While paused the feed is still drained, and what
    /// it yields is discarded.
    pub fn on_tick(&mut self) {
        let Some(feed) = self.feed.as_mut() else {
            return;
        };

        let candidate = if self.scanning {
            next_candidate(feed.as_mut())
        } else {
            let mut dropped = 0usize;
            while feed.poll().is_some() {
                dropped += 1;
            }
            if dropped > 0 {
                debug!(dropped, "discarded barcodes while paused");
            }
            None
        };
        let finished = feed.is_finished();
        if let Some(raw) = candidate {
            self.submit(&raw, EntrySource::Scanned);
        } else if finished {
            self.feed = None;
            self.scanning = false;
            self.set_status("Barcode feed closed.", StatusKind::Info);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let len = self.store.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.list.move_selection(-1, len),
            KeyCode::Down => self.list.move_selection(1, len),
            KeyCode::PageUp => self.list.move_selection(-10, len),
            KeyCode::PageDown => self.list.move_selection(10, len),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(len),
            KeyCode::Char('a') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::ManualEntry(IsbnEntryForm::default()));
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(entry) = self.current_entry().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(ConfirmBookDelete { entry }));
                }
                self.set_status("No book selected.", StatusKind::Error);
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.clear_status();
                return Ok(Mode::ConfirmNewCatalog);
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                return Ok(Mode::PathPrompt(PathPrompt::new(PathAction::Import)));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.clear_status();
                return Ok(Mode::PathPrompt(PathPrompt::new(PathAction::Export)));
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.clear_status();
                return Ok(Mode::Converter(ConverterForm::default()));
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.toggle_scanning(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload_catalog(),
            KeyCode::Enter | KeyCode::Char('o') | KeyCode::Char('O') => self.open_book_page(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_manual_entry(&mut self, code: KeyCode, mut form: IsbnEntryForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Manual entry closed.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.submission() {
                Ok(raw) => {
                    if self.submit(&raw, EntrySource::Manual) {
                        form.clear();
                    } else {
                        form.error = self.status.as_ref().map(|status| status.text.clone());
                    }
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::ManualEntry(form))
    }

    fn handle_converter(&mut self, code: KeyCode, mut form: ConverterForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => form.convert(),
            KeyCode::Tab => self.copy_conversion(&form),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Converter(form))
    }

    fn handle_path_prompt(&mut self, code: KeyCode, mut prompt: PathPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", prompt.action.title()),
                    StatusKind::Info,
                );
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => match self.run_path_action(&prompt) {
                Ok(()) => return Ok(Mode::Normal),
                Err(err) => {
                    let message = surface_error(&err);
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if prompt.push_char(ch) {
                    prompt.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::PathPrompt(prompt))
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_confirm_new_catalog(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Kept the current catalog.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self
                    .store
                    .reset()
                    .context("failed to start a new catalog");
                match result {
                    Ok(()) => {
                        self.list.select_first();
                        self.set_status("New catalog created.", StatusKind::Success);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmNewCatalog)
                    }
                }
            }
            _ => Ok(Mode::ConfirmNewCatalog),
        }
    }

    /// Run one raw identifier through the pipeline and render its outcome.
    /// Returns true when a book was stored.
    fn submit(&mut self, raw: &str, source: EntrySource) -> bool {
        let result = self
            .pipeline
            .process(&mut self.store, raw, source)
            .context("failed to save catalog");
        match result {
            Ok(outcome) => self.apply_outcome(&outcome),
            Err(err) => {
                self.set_status(
                    format!("Save failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
                false
            }
        }
    }

    fn apply_outcome(&mut self, result: &ScanOutcome) -> bool {
        self.set_status(outcome_message(result), result.outcome.feedback().into());
        if let Some(line) = process_log_line(result) {
            self.process_log.push(line);
        }

        let len = self.store.len();
        match &result.outcome {
            Outcome::Stored { .. } => {
                self.list.select_last(len);
                true
            }
            Outcome::Duplicate { isbn } => {
                if let Some(position) = self.store.catalog().position(isbn) {
                    self.list.select(position, len);
                }
                false
            }
            Outcome::NotFound { .. } | Outcome::Invalid { .. } => false,
        }
    }

    fn run_path_action(&mut self, prompt: &PathPrompt) -> Result<()> {
        let path = prompt.parse_path()?;
        match prompt.action {
            PathAction::Import => {
                let count = self
                    .store
                    .import(&path)
                    .with_context(|| format!("failed to import {}", path.display()))?;
                self.list.select_first();
                self.set_status(
                    format!("Imported {count} books from {}.", path.display()),
                    StatusKind::Success,
                );
            }
            PathAction::Export => {
                let count = self
                    .store
                    .export(&path)
                    .with_context(|| format!("failed to export to {}", path.display()))?;
                self.set_status(
                    format!("Exported {count} books to {}.", path.display()),
                    StatusKind::Success,
                );
            }
        }
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        let isbn = confirm.entry.isbn();
        self.store
            .delete(isbn)
            .with_context(|| format!("failed to delete {isbn}"))?;
        self.list.ensure_in_bounds(self.store.len());
        self.set_status(format!("Deleted book with ISBN: {isbn}"), StatusKind::Success);
        Ok(())
    }

    fn reload_catalog(&mut self) {
        let path = self.store.path().display().to_string();
        let result = self
            .store
            .load()
            .with_context(|| format!("failed to load {path}"));
        match result {
            Ok(()) => {
                self.list.ensure_in_bounds(self.store.len());
                self.set_status(
                    format!("Reloaded {} books from {path}.", self.store.len()),
                    StatusKind::Success,
                );
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    /// Put the converter's result on the system clipboard through the
    /// terminal (OSC 52).
    fn copy_conversion(&mut self, form: &ConverterForm) {
        let Some(converted) = form.converted() else {
            self.set_status("Nothing to copy yet.", StatusKind::Info);
            return;
        };
        match execute!(io::stdout(), CopyToClipboard::to_clipboard_from(converted)) {
            Ok(()) => self.set_status(
                format!("Copied {converted} to the clipboard."),
                StatusKind::Success,
            ),
            Err(err) => self.set_status(format!("Failed to copy: {err}"), StatusKind::Error),
        }
    }

    fn toggle_scanning(&mut self) {
        if self.feed.is_none() {
            self.set_status(
                "No barcode feed configured (start with --feed).",
                StatusKind::Error,
            );
            return;
        }
        self.scanning = !self.scanning;
        if self.scanning {
            self.set_status("Scanner resumed.", StatusKind::Info);
        } else {
            self.set_status("Scanner paused.", StatusKind::Info);
        }
    }

    fn open_book_page(&mut self) {
        let Some(entry) = self.current_entry() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        let url = format!("{BOOK_PAGE_URL}{}", entry.isbn());
        let title = entry.record.title.clone();
        match open_link(&url) {
            Ok(()) => self.set_status(format!("Opened {title}."), StatusKind::Info),
            Err(err) => self.set_status(format!("Failed to open link: {err}"), StatusKind::Error),
        }
    }

    fn current_entry(&self) -> Option<&CatalogEntry> {
        self.store.entries().get(self.list.selected)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_catalog(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::ManualEntry(form) => self.draw_manual_entry(frame, area, form),
            Mode::Converter(form) => self.draw_converter(frame, area, form),
            Mode::PathPrompt(prompt) => self.draw_path_prompt(frame, area, prompt),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmNewCatalog => self.draw_confirm_new_catalog(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_catalog(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
            .split(area);
        self.draw_header(frame, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);
        self.draw_book_list(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(PROCESS_LOG_HEIGHT)])
            .split(columns[1]);
        self.draw_details(frame, right[0]);
        self.draw_process_log(frame, right[1]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let access = if self.store.is_writable() {
            ""
        } else {
            "  •  read-only (failed to load)"
        };
        let scanner = match (&self.feed, self.scanning) {
            (None, _) => "no feed",
            (Some(_), true) => "scanning",
            (Some(_), false) => "paused",
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{} books", self.store.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  •  {}", self.store.path().display())),
            Span::raw(format!("  •  scanner: {scanner}")),
            Span::styled(access, Style::default().fg(Color::Red)),
        ]))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("ISBN Shelf"));
        frame.render_widget(header, area);
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Books");
        if self.store.is_empty() {
            let message = Paragraph::new("No books yet. Scan a barcode or press 'a' to type one.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .store
            .entries()
            .iter()
            .map(|entry| ListItem::new(entry.list_label()))
            .collect();
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default().with_selected(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let lines = match self.current_entry() {
            Some(entry) => {
                let mut lines = detail_lines(&entry.record);
                lines.push(Line::from(Span::styled(
                    format!("Added: {}", entry.timestamp()),
                    Style::default().fg(Color::Gray),
                )));
                lines
            }
            None => vec![Line::from(Span::styled(
                "Select a book to see its details.",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_process_log(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Process Log");
        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .process_log
            .tail(visible)
            .map(|line| Line::from(line.clone()))
            .collect();
        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::ManualEntry(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Look Up   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            Mode::Converter(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Convert   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Copy   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            Mode::PathPrompt(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmDelete(_) | Mode::ConfirmNewCatalog => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Yes   "),
                Span::styled("[n]", key_style),
                Span::raw(" No"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[a]", key_style),
                Span::raw(" Add ISBN   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[o]", key_style),
                Span::raw(" Open Page   "),
                Span::styled("[s]", key_style),
                Span::raw(" Scanner   "),
                Span::styled("[c]", key_style),
                Span::raw(" Converter   "),
                Span::styled("[i/e]", key_style),
                Span::raw(" Import/Export   "),
                Span::styled("[n]", key_style),
                Span::raw(" New   "),
                Span::styled("[r]", key_style),
                Span::raw(" Reload   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_manual_entry(&self, frame: &mut Frame, area: Rect, form: &IsbnEntryForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add ISBN").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), form.info_line(), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to look up • Esc to close",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "ISBN: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.char_count() as u16, inner.y));
    }

    fn draw_converter(&self, frame: &mut Frame, area: Rect, form: &ConverterForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("ISBN Converter").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.build_lines();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "ISBN-10 converts to ISBN-13 and back • Enter to convert • Tab to copy • Esc to close",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "ISBN: ".len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.input.chars().count() as u16,
            inner.y,
        ));
    }

    fn draw_path_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(prompt.action.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let hint = match prompt.action {
            PathAction::Import => "Replaces the current catalog with the file's rows.",
            PathAction::Export => "Writes the current catalog to the file.",
        };
        let mut lines = vec![
            prompt.build_line(),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
            Line::from(""),
        ];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "File: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + prompt.value_len() as u16, inner.y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete '{}' ({})?",
                confirm.entry.record.title,
                confirm.entry.isbn()
            )),
            Line::from("The catalog file is rewritten immediately."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_new_catalog(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("New Catalog").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Start a new, empty catalog?"),
            Line::from(format!(
                "All {} books in {} will be removed.",
                self.store.len(),
                self.store.path().display()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::warn;
use open::that as open_file;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;

use crate::export::{export_report, export_spreadsheet};
use crate::models::Student;
use crate::store::{StoreError, StudentStore};

use super::forms::{ConfirmStudentDelete, StudentField, StudentForm};
use super::helpers::{centered_rect, gauge_bar, gpa_style, rank_color, surface_error};
use super::screens::{RosterScreen, StatsScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Width of the textual gauge bars on the stats screen.
const GPA_GAUGE_WIDTH: usize = 24;
/// GPAs live on a 0–4 scale; the gauges are normalized against the top end.
const GPA_SCALE_MAX: f64 = 4.0;

/// High-level navigation states. The roster table is the home screen; the
/// statistics view replaces it until dismissed.
enum Screen {
    Roster,
    Stats(StatsScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingStudent(StudentForm),
    EditingStudent { id: String, form: StudentForm },
    ConfirmDelete(ConfirmStudentDelete),
    Searching(SearchState),
}

/// State for an active inline search. The previous filter is kept so Esc can
/// restore it.
struct SearchState {
    query: String,
    previous: Option<String>,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: StudentStore,
    roster: RosterScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: StudentStore) -> Self {
        let roster = RosterScreen::new(store.all().to_vec());
        Self {
            store,
            roster,
            screen: Screen::Roster,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingStudent(form) => self.handle_add_student(code, form)?,
            Mode::EditingStudent { id, form } => self.handle_edit_student(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Ctrl+E exports the roster as a spreadsheet. Ignored while a modal is
    /// open so the shortcut never fires mid-edit.
    pub fn handle_ctrl_e(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal) {
            self.run_export(export_spreadsheet, "spreadsheet");
        }
        Ok(())
    }

    /// Ctrl+P exports the printable report.
    pub fn handle_ctrl_p(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal) {
            self.run_export(export_report, "report");
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Roster => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        // Esc first drops an active filter, then quits.
                        if self.roster.filter.is_some() {
                            self.roster.set_filter(None);
                            self.clear_status();
                        } else {
                            *exit = true;
                        }
                    }
                    KeyCode::Up => self.roster.move_selection(-1),
                    KeyCode::Down => self.roster.move_selection(1),
                    KeyCode::PageUp => self.roster.move_selection(-5),
                    KeyCode::PageDown => self.roster.move_selection(5),
                    KeyCode::Home => self.roster.select_first(),
                    KeyCode::End => self.roster.select_last(),
                    KeyCode::Char('f') | KeyCode::Char('/') => {
                        self.clear_status();
                        return Ok(Mode::Searching(SearchState {
                            query: self.roster.filter.clone().unwrap_or_default(),
                            previous: self.roster.filter.clone(),
                        }));
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingStudent(StudentForm::default()));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                        if let Some(student) = self.roster.current_student() {
                            let id = student.id.clone();
                            let form = StudentForm::from_student(student);
                            self.clear_status();
                            return Ok(Mode::EditingStudent { id, form });
                        } else {
                            self.set_status("No student selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('-') | KeyCode::Delete => {
                        if let Some(student) = self.roster.current_student() {
                            let confirm = ConfirmStudentDelete::from(student);
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(confirm));
                        } else {
                            self.set_status("No student selected to remove.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.screen = Screen::Stats(StatsScreen::from_students(self.store.all()));
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Stats(_) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.screen = Screen::Roster;
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab => form.toggle_field(),
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => match form.parse_inputs() {
                Ok(input) => {
                    let student = Student::new(
                        input.id,
                        input.name.clone(),
                        input.dob,
                        input.class_name,
                        input.gpa,
                    );
                    match self.store.add(student) {
                        Ok(()) => {
                            self.refresh_roster();
                            self.set_status(
                                format!("Added student {}.", input.name),
                                StatusKind::Info,
                            );
                            return Ok(Mode::Normal);
                        }
                        Err(err) => {
                            form.error = Some(store_error_message(&err));
                        }
                    }
                }
                Err(err) => {
                    form.error = Some(surface_error(&err));
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingStudent(form))
    }

    fn handle_edit_student(
        &mut self,
        code: KeyCode,
        id: String,
        mut form: StudentForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab => form.toggle_field(),
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => match form.parse_inputs() {
                Ok(input) => {
                    match self
                        .store
                        .update(&id, &input.name, input.dob, &input.class_name, input.gpa)
                    {
                        Ok(()) => {
                            self.refresh_roster();
                            self.set_status(
                                format!("Updated student {}.", input.name),
                                StatusKind::Info,
                            );
                            return Ok(Mode::Normal);
                        }
                        Err(err) => {
                            form.error = Some(store_error_message(&err));
                        }
                    }
                }
                Err(err) => {
                    form.error = Some(surface_error(&err));
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::EditingStudent { id, form })
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmStudentDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.remove(&confirm.id) {
                    Ok(()) => {
                        self.refresh_roster();
                        self.set_status(
                            format!("Removed student {} from the roster.", confirm.name),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        self.set_status(store_error_message(&err), StatusKind::Error);
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.roster.set_filter(state.previous);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_search(&state.query);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                self.apply_search(&state.query);
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    /// Filters are applied live on every keystroke; whitespace-only input is
    /// the same as no filter.
    fn apply_search(&mut self, query: &str) {
        let filter = if query.trim().is_empty() {
            None
        } else {
            Some(query.to_string())
        };
        self.roster.set_filter(filter);
    }

    fn run_export(&mut self, exporter: fn(&[Student]) -> Result<PathBuf>, label: &str) {
        match exporter(self.store.all()) {
            Ok(path) => {
                // Opening is best-effort: the export succeeded either way.
                if let Err(err) = open_file(&path) {
                    warn!("failed to open exported file: {err}");
                }
                self.set_status(
                    format!("Exported {label} to {}.", path.display()),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                warn!("{label} export failed: {err:#}");
                self.set_status(
                    format!("Export failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    fn refresh_roster(&mut self) {
        self.roster.set_students(self.store.all().to_vec());
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(area);

        match &self.screen {
            Screen::Roster => self.draw_roster(frame, chunks[0]),
            Screen::Stats(stats) => draw_stats(frame, chunks[0], stats),
        }
        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::AddingStudent(form) => {
                self.draw_student_form(frame, area, "Add Student", form);
            }
            Mode::EditingStudent { form, .. } => {
                self.draw_student_form(frame, area, "Edit Student", form);
            }
            Mode::ConfirmDelete(confirm) => {
                draw_confirm_delete(frame, area, confirm);
            }
            Mode::Searching(_) | Mode::Normal => {}
        }
    }

    fn draw_roster(&self, frame: &mut Frame, area: Rect) {
        let shown = self.roster.filtered.len();
        let total = self.roster.students.len();
        let mut title = format!(" Students ({shown}/{total}) ");
        if let Some(filter) = &self.roster.filter {
            title = format!(" Students ({shown}/{total}) — filter: {filter} ");
        }

        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.roster.filtered.is_empty() {
            let message = if total == 0 {
                "No students yet. Press [+] to add the first record."
            } else {
                "No students match the current search."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, inner);
            return;
        }

        let header = Row::new(
            ["ID", "Full Name", "Date of Birth", "Class", "GPA"]
                .into_iter()
                .map(|h| Cell::from(Span::styled(h, Style::default().add_modifier(Modifier::BOLD)))),
        )
        .bottom_margin(1);

        let rows: Vec<Row> = self
            .roster
            .filtered
            .iter()
            .map(|student| {
                Row::new(vec![
                    Cell::from(student.id.clone()),
                    Cell::from(student.name.clone()),
                    Cell::from(student.display_dob()),
                    Cell::from(student.class_name.clone()),
                    Cell::from(Span::styled(
                        format!("{:.2}", student.gpa),
                        gpa_style(student.gpa),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        table_state.select(Some(self.roster.selected));
        frame.render_stateful_widget(table, inner, &mut table_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Mode::Searching(state) = &self.mode {
            let line = Line::from(vec![
                Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(state.query.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
            let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
            return;
        }

        if let Some(status) = &self.status {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )))
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
            return;
        }

        frame.render_widget(Paragraph::new(self.instructions()), inner);
    }

    fn instructions(&self) -> Line<'static> {
        let key_style = Style::default().fg(Color::Cyan);
        match self.screen {
            Screen::Roster => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Move   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[s]", key_style),
                Span::raw(" Stats   "),
                Span::styled("[Ctrl+E]", key_style),
                Span::raw(" Spreadsheet   "),
                Span::styled("[Ctrl+P]", key_style),
                Span::raw(" Report   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            Screen::Stats(_) => Line::from(vec![
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(70, 55, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("ID", StudentField::Id),
            form.build_line("Name", StudentField::Name),
            form.build_line("Date of Birth", StudentField::Dob),
            form.build_line("Class", StudentField::ClassName),
            form.build_line("GPA", StudentField::Gpa),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            StudentField::Id => ("ID: ", 0),
            StudentField::Name => ("Name: ", 1),
            StudentField::Dob => ("Date of Birth: ", 2),
            StudentField::ClassName => ("Class: ", 3),
            StudentField::Gpa => ("GPA: ", 4),
        };
        let cursor_x = inner.x + prefix.len() as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }
}

/// Turn a store error into the footer/form message. Duplicate and not-found
/// carry their own wording; persistence failures get surfaced through the
/// anyhow chain.
fn store_error_message(err: &StoreError) -> String {
    match err {
        StoreError::DuplicateId(_) | StoreError::NotFound(_) => err.to_string(),
        StoreError::Persistence(inner) => format!("Failed to save: {}", surface_error(inner)),
    }
}

fn draw_stats(frame: &mut Frame, area: Rect, stats: &StatsScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Total students: "),
            Span::styled(
                stats.total.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Overall average GPA: "),
            Span::styled(
                format!("{:.2}", stats.overall_average),
                gpa_style(stats.overall_average).add_modifier(Modifier::BOLD),
            ),
        ]),
    ])
    .block(Block::default().title(" Statistics ").borders(Borders::ALL));
    frame.render_widget(summary, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    draw_class_averages(frame, columns[0], stats);
    draw_rank_distribution(frame, columns[1], stats);
}

fn draw_class_averages(frame: &mut Frame, area: Rect, stats: &StatsScreen) {
    let block = Block::default()
        .title(" Average GPA by Class ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if stats.class_rows.is_empty() {
        let paragraph = Paragraph::new("No records to aggregate.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, inner);
        return;
    }

    let name_width = stats
        .class_rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = stats
        .class_rows
        .iter()
        .map(|row| {
            let padding = name_width.saturating_sub(row.name.chars().count());
            Line::from(vec![
                Span::raw(format!("{}{}  ", row.name, " ".repeat(padding))),
                Span::styled(
                    gauge_bar(row.average, GPA_SCALE_MAX, GPA_GAUGE_WIDTH),
                    gpa_style(row.average),
                ),
                Span::raw(format!("  {:.2}  ({})", row.average, row.count)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_rank_distribution(frame: &mut Frame, area: Rect, stats: &StatsScreen) {
    let block = Block::default()
        .title(" Rank Distribution ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if stats.ranks.is_empty() {
        let paragraph = Paragraph::new("No records to classify.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, inner);
        return;
    }

    let lines: Vec<Line> = stats
        .ranks
        .iter()
        .map(|slice| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(rank_color(slice.rank))),
                Span::raw(format!(
                    "{} ({}): ",
                    slice.rank.label(),
                    slice.rank.range_label()
                )),
                Span::styled(
                    slice.count.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm_delete(frame: &mut Frame, area: Rect, confirm: &ConfirmStudentDelete) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Confirm Removal")
        .borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let lines = vec![
        Line::from(format!(
            "Remove {} ({}) from the roster?",
            confirm.name, confirm.id
        )),
        Line::from("This cannot be undone."),
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

use arboard::Clipboard;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, error, info, trace, warn};

use crate::actions::{Action, ActionKind, TOOLBAR};
use crate::domain::{HELP_TEXT, Message, TableSelector, TrackerConfig, TrackerError};
use crate::entry::{EntryForm, FormTarget, apply_form};
use crate::export::{export_delimited, export_positional, record_line};
use crate::inputter::{InputResult, Inputter};
use crate::table::{Summary, Tables};
use crate::ui::{STATUSLINE_HEIGHT, SUMMARY_HEIGHT, TABLE_HEADER_HEIGHT, TOOLBAR_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    CMDINPUT,
    FORM,
    POPUP,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupKind {
    Info,
    Error,
    Help,
}

#[derive(Debug, Clone)]
pub struct Popup {
    pub kind: PopupKind,
    pub title: String,
    pub message: String,
}

/// Everything the UI needs for one frame.
pub struct UIData<'a> {
    pub tables: &'a Tables,
    pub summary: &'a Summary,
    pub focus: TableSelector,
    pub top_row: usize,
    pub bottom_row: usize,
    pub selected_action: usize,
    pub selector_prompt: Option<&'a InputResult>,
    pub form: Option<(&'a EntryForm, &'a InputResult)>,
    pub popup: Option<&'a Popup>,
    pub status_message: &'a str,
}

pub struct Model {
    config: TrackerConfig,
    pub status: Status,
    modus: Modus,
    tables: Tables,
    summary: Summary,
    focus: TableSelector,
    top_row: usize,
    bottom_row: usize,
    page_size: usize,
    selected_action: usize,
    input: Inputter,
    last_input: InputResult,
    form: Option<EntryForm>,
    popup: Option<Popup>,
    clipboard: Option<Clipboard>,
    status_message: String,
}

impl Model {
    pub fn init(config: &TrackerConfig, ui_height: usize) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            tables: Tables::new(),
            summary: Summary::default(),
            focus: TableSelector::Top,
            top_row: 0,
            bottom_row: 0,
            page_size: 1,
            selected_action: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
            form: None,
            popup: None,
            clipboard: None,
            status_message: String::new(),
        };
        model.ui_resize(0, ui_height);
        model.set_status_message("Started! Press ? for help.");
        model
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn get_uidata(&self) -> UIData<'_> {
        UIData {
            tables: &self.tables,
            summary: &self.summary,
            focus: self.focus,
            top_row: self.top_row,
            bottom_row: self.bottom_row,
            selected_action: self.selected_action,
            selector_prompt: (self.modus == Modus::CMDINPUT).then_some(&self.last_input),
            form: match (self.modus, &self.form) {
                (Modus::FORM, Some(form)) => Some((form, &self.last_input)),
                _ => None,
            },
            popup: self.popup.as_ref(),
            status_message: &self.status_message,
        }
    }

    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::CMDINPUT | Modus::FORM)
    }

    pub fn quit(&mut self) {
        info!("Quitting ...");
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized! w:{}, h:{}", width, height);
        let chrome = TOOLBAR_HEIGHT + SUMMARY_HEIGHT + STATUSLINE_HEIGHT + 2 * TABLE_HEADER_HEIGHT;
        self.page_size = std::cmp::max(1, height.saturating_sub(chrome) / 2);
    }

    pub fn update(&mut self, message: Message) -> Result<(), TrackerError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(1),
                Message::MoveDown => self.move_selection_down(1),
                Message::MovePageUp => self.move_selection_up(self.page_size),
                Message::MovePageDown => self.move_selection_down(self.page_size),
                Message::MoveBeginning => self.move_selection_beginning(),
                Message::MoveEnd => self.move_selection_end(),
                Message::SwitchTable => self.switch_table(),
                Message::PreviousAction => {
                    self.selected_action = self.selected_action.checked_sub(1).unwrap_or(TOOLBAR.len() - 1);
                }
                Message::NextAction => {
                    self.selected_action = (self.selected_action + 1) % TOOLBAR.len();
                }
                Message::Enter => self.press(TOOLBAR[self.selected_action]),
                Message::Trigger(action) => self.press(action),
                Message::EditSummary => self.open_form(EntryForm::for_summary(&self.summary)),
                Message::CopyRow => self.copy_selected_row(),
                Message::Help => self.show_popup(PopupKind::Help, "Help", HELP_TEXT),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CMDINPUT => match message {
                Message::RawKey(key) => self.selector_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::FORM => match message {
                Message::RawKey(key) => self.form_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- Command dispatching ---------------------- //

    fn press(&mut self, action: Action) {
        if let Some(idx) = TOOLBAR.iter().position(|&a| a == action) {
            self.selected_action = idx;
        }
        match action.kind() {
            ActionKind::EntryCollector => self.start_entry(),
            ActionKind::Wired | ActionKind::Unimplemented => self.dispatch(action),
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("Dispatch {:?}", action);
        match action {
            Action::ClearAll => self.clear_all(),
            Action::Reports => self.generate_report(),
            other => {
                info!("Action \"{}\" is not implemented", other.label());
                self.set_status_message(format!("{}: not implemented", other.label()));
            }
        }
    }

    fn clear_all(&mut self) {
        self.tables.clear_all();
        self.summary.clear();
        self.top_row = 0;
        self.bottom_row = 0;
        info!("Cleared all tables");
        self.set_status_message("Cleared all tables");
    }

    fn generate_report(&mut self) {
        let csv_path = self.config.csv_report_path();
        let pdf_path = self.config.pdf_report_path();
        let result = export_delimited(&csv_path, &self.tables.payments, &self.tables.invoices)
            .and_then(|_| export_positional(&pdf_path, &self.tables.payments, &self.tables.invoices));

        match result {
            Ok(()) => {
                self.set_status_message(format!(
                    "Wrote {} and {}",
                    csv_path.display(),
                    pdf_path.display()
                ));
                self.show_popup(PopupKind::Info, "Report", "Report generated successfully");
            }
            Err(e) => {
                error!("Report generation failed: {e:?}");
                self.set_status_message("Report generation failed");
                self.show_popup(PopupKind::Error, "Error", e.to_string());
            }
        }
    }

    // -------------------- Entry collection ---------------------- //

    fn start_entry(&mut self) {
        trace!("Asking for table selection ...");
        self.modus = Modus::CMDINPUT;
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn selector_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if !self.last_input.finished {
            return;
        }
        // A dismissed prompt is an empty selection
        let choice = self.last_input.input.clone();
        self.modus = Modus::TABLE;
        match TableSelector::parse(&choice) {
            Ok(selector) => {
                debug!("Selected {:?} table", selector);
                self.open_form(EntryForm::for_table(selector, self.tables.get(selector).columns()));
            }
            Err(e) => {
                warn!("{e}");
                self.show_popup(PopupKind::Error, "Error", e.to_string());
            }
        }
    }

    fn open_form(&mut self, form: EntryForm) {
        self.modus = Modus::FORM;
        self.form = Some(form);
        self.load_current_field();
    }

    fn load_current_field(&mut self) {
        self.input.clear();
        if let Some(value) = self
            .form
            .as_ref()
            .and_then(|f| f.current_field())
            .and_then(|f| f.value.as_deref())
        {
            self.input.set(value);
        }
        self.last_input = self.input.get();
    }

    fn form_input(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.modus = Modus::TABLE;
            return;
        };

        if key.code == KeyCode::F(2) {
            // the line buffer holds the field as shown, even when erased
            form.accept(self.input.get().input);
            form.submit_now();
        } else {
            self.last_input = self.input.read(key);
            if !self.last_input.finished {
                return;
            }
            if self.last_input.canceled {
                form.skip();
            } else {
                form.accept(self.last_input.input.clone());
            }
        }

        if form.is_complete() {
            self.finish_form();
        } else {
            self.load_current_field();
        }
    }

    fn finish_form(&mut self) {
        self.modus = Modus::TABLE;
        let Some(form) = self.form.take() else {
            return;
        };
        match apply_form(form, &mut self.tables, &mut self.summary) {
            FormTarget::Table(selector) => {
                self.focus = selector;
                let last = self.tables.get(selector).len().saturating_sub(1);
                *self.cursor_row_mut() = last;
                self.set_status_message(format!(
                    "Added entry to {}",
                    self.tables.get(selector).name()
                ));
            }
            FormTarget::Summary => self.set_status_message("Updated summary"),
        }
    }

    // -------------------- Popups ---------------------- //

    fn show_popup(&mut self, kind: PopupKind, title: &str, message: impl Into<String>) {
        self.modus = Modus::POPUP;
        self.popup = Some(Popup {
            kind,
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.popup = None;
        self.modus = Modus::TABLE;
    }

    // -------------------- Table navigation ---------------------- //

    fn cursor_row_mut(&mut self) -> &mut usize {
        match self.focus {
            TableSelector::Top => &mut self.top_row,
            TableSelector::Bottom => &mut self.bottom_row,
        }
    }

    fn focused_len(&self) -> usize {
        self.tables.get(self.focus).len()
    }

    fn switch_table(&mut self) {
        self.focus = match self.focus {
            TableSelector::Top => TableSelector::Bottom,
            TableSelector::Bottom => TableSelector::Top,
        };
    }

    fn move_selection_up(&mut self, size: usize) {
        let row = self.cursor_row_mut();
        *row = row.saturating_sub(size);
    }

    fn move_selection_down(&mut self, size: usize) {
        let last = self.focused_len().saturating_sub(1);
        let row = self.cursor_row_mut();
        *row = std::cmp::min(*row + size, last);
    }

    fn move_selection_beginning(&mut self) {
        *self.cursor_row_mut() = 0;
    }

    fn move_selection_end(&mut self) {
        let last = self.focused_len().saturating_sub(1);
        *self.cursor_row_mut() = last;
    }

    fn copy_selected_row(&mut self) {
        let row = match self.focus {
            TableSelector::Top => self.top_row,
            TableSelector::Bottom => self.bottom_row,
        };
        let Some(record) = self.tables.get(self.focus).records().get(row) else {
            self.set_status_message("Nothing to copy");
            return;
        };
        let line = match record_line(record) {
            Ok(line) => line,
            Err(e) => {
                error!("Could not format row: {e:?}");
                return;
            }
        };

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    warn!("Clipboard not available: {:?}", e);
                    self.set_status_message("Clipboard not available");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(line) {
                Ok(_) => {
                    trace!("Copied row content to clipboard.");
                    self.set_status_message(format!("Copied row {}", row + 1));
                }
                Err(e) => {
                    trace!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Copy to clipboard failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::init(&TrackerConfig::default(), 40)
    }

    fn type_line(model: &mut Model, text: &str) {
        for c in text.chars() {
            model.update(Message::RawKey(KeyEvent::from(KeyCode::Char(c)))).unwrap();
        }
        model.update(Message::RawKey(KeyCode::Enter.into())).unwrap();
    }

    fn press(model: &mut Model, action: Action) {
        model.update(Message::Trigger(action)).unwrap();
    }

    #[test]
    fn add_entry_to_top_table() {
        let mut m = model();
        press(&mut m, Action::AddEntry);
        assert!(m.raw_keyevents());
        type_line(&mut m, "top");
        for value in ["Alice", "2024-01-05", "250.00", "Wire", "Consulting", "bank1.csv"] {
            type_line(&mut m, value);
        }

        assert!(!m.raw_keyevents());
        assert_eq!(m.tables().payments.len(), 1);
        assert_eq!(m.tables().invoices.len(), 0);
        assert_eq!(
            m.tables().payments.records()[0],
            vec!["Alice", "2024-01-05", "250.00", "Wire", "Consulting", "bank1.csv"]
        );
        assert_eq!(m.get_uidata().focus, TableSelector::Top);
    }

    #[test]
    fn escaped_fields_are_stored_empty() {
        let mut m = model();
        press(&mut m, Action::AddEntry);
        type_line(&mut m, "bottom");
        type_line(&mut m, "K-1");
        m.update(Message::RawKey(KeyCode::Esc.into())).unwrap();
        type_line(&mut m, "INV-3");
        m.update(Message::RawKey(KeyCode::F(2).into())).unwrap();

        let record = &m.tables().invoices.records()[0];
        assert_eq!(record.len(), 11);
        assert_eq!(record[0], "K-1");
        assert_eq!(record[1], "");
        assert_eq!(record[2], "INV-3");
        assert!(m.tables().payments.is_empty());
        assert_eq!(m.get_uidata().focus, TableSelector::Bottom);
    }

    #[test]
    fn invalid_selection_shows_error() {
        for choice in ["", "middle", "TOP"] {
            let mut m = model();
            press(&mut m, Action::AddEntry);
            type_line(&mut m, choice);

            let popup = m.get_uidata().popup.cloned().unwrap();
            assert_eq!(popup.kind, PopupKind::Error);
            assert!(popup.message.contains("Invalid table selection"));
            assert!(m.tables().payments.is_empty());
            assert!(m.tables().invoices.is_empty());

            m.update(Message::Exit).unwrap();
            assert!(m.get_uidata().popup.is_none());
        }
    }

    #[test]
    fn dismissed_selector_is_invalid() {
        let mut m = model();
        press(&mut m, Action::AddEntry);
        m.update(Message::RawKey(KeyCode::Esc.into())).unwrap();
        assert_eq!(m.get_uidata().popup.unwrap().kind, PopupKind::Error);
    }

    #[test]
    fn clear_all_resets_tables_and_summary() {
        let mut m = model();
        m.update(Message::EditSummary).unwrap();
        type_line(&mut m, "100");
        type_line(&mut m, "80");
        type_line(&mut m, "20");
        assert_eq!(m.summary().difference, "20");

        press(&mut m, Action::AddEntry);
        type_line(&mut m, "top");
        m.update(Message::RawKey(KeyCode::F(2).into())).unwrap();
        assert_eq!(m.tables().payments.len(), 1);

        press(&mut m, Action::ClearAll);
        assert!(m.tables().payments.is_empty());
        assert!(m.tables().invoices.is_empty());
        assert_eq!(m.summary(), &Summary::default());
        assert_eq!(m.tables().payments.columns().len(), 6);
    }

    #[test]
    fn submitting_an_erased_summary_field_stores_it_empty() {
        let mut m = model();
        m.update(Message::EditSummary).unwrap();
        type_line(&mut m, "100");
        type_line(&mut m, "80");
        type_line(&mut m, "20");

        m.update(Message::EditSummary).unwrap();
        for _ in 0..3 {
            m.update(Message::RawKey(KeyCode::Backspace.into())).unwrap();
        }
        m.update(Message::RawKey(KeyCode::F(2).into())).unwrap();

        assert!(!m.raw_keyevents());
        assert_eq!(m.summary().billed, "");
        assert_eq!(m.summary().paid, "80");
        assert_eq!(m.summary().difference, "20");
    }

    #[test]
    fn add_entry_through_dispatch_is_inert() {
        let mut m = model();
        m.dispatch(Action::AddEntry);
        assert!(!m.raw_keyevents());
        assert!(m.tables().payments.is_empty());
    }

    #[test]
    fn unimplemented_actions_do_nothing() {
        let mut m = model();
        for action in TOOLBAR.iter().filter(|a| a.kind() == ActionKind::Unimplemented) {
            press(&mut m, *action);
            assert!(m.get_uidata().popup.is_none());
            assert!(!m.raw_keyevents());
            assert!(m.get_uidata().status_message.ends_with("not implemented"));
        }
        assert!(m.tables().payments.is_empty());
        assert!(m.tables().invoices.is_empty());
    }

    #[test]
    fn reports_write_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrackerConfig::default().with_output_dir(dir.path());
        let mut m = Model::init(&cfg, 40);
        press(&mut m, Action::Reports);

        let popup = m.get_uidata().popup.cloned().unwrap();
        assert_eq!(popup.kind, PopupKind::Info);
        assert_eq!(popup.message, "Report generated successfully");
        assert!(dir.path().join("table_data.csv").exists());
        assert!(dir.path().join("table_data.pdf").exists());
    }

    #[test]
    fn report_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrackerConfig::default().with_output_dir(dir.path().join("does-not-exist"));
        let mut m = Model::init(&cfg, 40);
        press(&mut m, Action::Reports);

        assert_eq!(m.get_uidata().popup.unwrap().kind, PopupKind::Error);
        assert_eq!(m.status, Status::READY);
    }

    #[test]
    fn toolbar_selection_wraps() {
        let mut m = model();
        m.update(Message::PreviousAction).unwrap();
        assert_eq!(m.get_uidata().selected_action, TOOLBAR.len() - 1);
        m.update(Message::NextAction).unwrap();
        assert_eq!(m.get_uidata().selected_action, 0);

        // Enter presses the selected button, "Add Entry" is the last one
        m.update(Message::PreviousAction).unwrap();
        m.update(Message::Enter).unwrap();
        assert!(m.raw_keyevents());
    }

    #[test]
    fn cursor_stays_inside_table() {
        let mut m = model();
        for name in ["a", "b", "c"] {
            press(&mut m, Action::AddEntry);
            type_line(&mut m, "top");
            type_line(&mut m, name);
            m.update(Message::RawKey(KeyCode::F(2).into())).unwrap();
        }
        assert_eq!(m.get_uidata().top_row, 2);
        m.update(Message::MoveDown).unwrap();
        assert_eq!(m.get_uidata().top_row, 2);
        m.update(Message::MoveBeginning).unwrap();
        m.update(Message::MoveUp).unwrap();
        assert_eq!(m.get_uidata().top_row, 0);
        m.update(Message::MovePageDown).unwrap();
        assert_eq!(m.get_uidata().top_row, 2);

        m.update(Message::SwitchTable).unwrap();
        m.update(Message::MoveDown).unwrap();
        assert_eq!(m.get_uidata().bottom_row, 0);
    }

    #[test]
    fn quit_from_table() {
        let mut m = model();
        m.update(Message::Quit).unwrap();
        assert_eq!(m.status, Status::QUITTING);
    }
}

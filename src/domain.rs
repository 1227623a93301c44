use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::actions::Action;

pub const PAYMENT_COLUMNS: [&str; 6] = [
    "Pay Name",
    "Pay Date",
    "Pay Amount ($)",
    "Pay Type",
    "Pay Description",
    "Bank File Name",
];

pub const INVOICE_COLUMNS: [&str; 11] = [
    "Consultant Id",
    "Client Id",
    "Invoice No",
    "Inv From Date",
    "Inv To Date",
    "Inv Qty",
    "Inv City",
    "Inv Date",
    "Inv Rate",
    "Inv Amount",
    "Inv Paid",
];

pub const SUMMARY_FIELDS: [&str; 3] = ["Billed Amount", "Paid Amount", "(+/-)"];

pub const CSV_REPORT_NAME: &str = "table_data.csv";
pub const PDF_REPORT_NAME: &str = "table_data.pdf";

pub const HELP_TEXT: &str = "Expense Invoice Tracker

Toolbar
  Left/Right   select button
  Enter        press selected button
  a            add entry (top / bottom)
  c            clear all
  r            generate reports

Tables
  Tab          switch table
  Up/Down      move selection
  PgUp/PgDn    move selection by page
  Home/End     first / last row
  y            copy selected row
  s            edit summary fields

Forms
  Enter        accept field
  Esc          skip field (left empty)
  F2           submit now

?  help    Esc  close popup    q  quit";

#[derive(Debug)]
pub enum TrackerError {
    IoError(Error),
    CsvError(csv::Error),
    PdfError(printpdf::Error),
    InvalidSelection(String),
    LoggingSetup(String),
    Config(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::IoError(e) => write!(f, "I/O error: {e}"),
            TrackerError::CsvError(e) => write!(f, "CSV error: {e}"),
            TrackerError::PdfError(e) => write!(f, "PDF error: {e:?}"),
            TrackerError::InvalidSelection(choice) => {
                write!(f, "Invalid table selection: \"{choice}\"")
            }
            TrackerError::LoggingSetup(msg) => write!(f, "Could not set up logging: {msg}"),
            TrackerError::Config(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<Error> for TrackerError {
    fn from(err: Error) -> Self {
        TrackerError::IoError(err)
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::CsvError(err)
    }
}

impl From<printpdf::Error> for TrackerError {
    fn from(err: printpdf::Error) -> Self {
        TrackerError::PdfError(err)
    }
}

/// Which of the two tables an entry goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSelector {
    Top,
    Bottom,
}

impl TableSelector {
    /// Only the exact lowercase identifiers are accepted.
    pub fn parse(input: &str) -> Result<Self, TrackerError> {
        match input {
            "top" => Ok(TableSelector::Top),
            "bottom" => Ok(TableSelector::Bottom),
            other => Err(TrackerError::InvalidSelection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TrackerConfig {
    pub event_poll_time: u64,
    pub column_width: u16,
    #[setters(into)]
    pub output_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            column_width: 16,
            output_dir: PathBuf::from("."),
        }
    }
}

impl TrackerConfig {
    pub fn csv_report_path(&self) -> PathBuf {
        self.output_dir.join(CSV_REPORT_NAME)
    }

    pub fn pdf_report_path(&self) -> PathBuf {
        self.output_dir.join(PDF_REPORT_NAME)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    SwitchTable,
    PreviousAction,
    NextAction,
    Enter,
    Exit,
    Trigger(Action),
    EditSummary,
    CopyRow,
    Help,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_accepts_exact_identifiers() {
        assert_eq!(TableSelector::parse("top").unwrap(), TableSelector::Top);
        assert_eq!(TableSelector::parse("bottom").unwrap(), TableSelector::Bottom);
    }

    #[test]
    fn selector_rejects_everything_else() {
        for choice in ["", "middle", "TOP", " top", "bottom "] {
            match TableSelector::parse(choice) {
                Err(TrackerError::InvalidSelection(c)) => assert_eq!(c, choice),
                other => panic!("unexpected result for {choice:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn report_paths_live_in_output_dir() {
        let cfg = TrackerConfig::default().with_output_dir("/tmp/reports");
        assert_eq!(cfg.csv_report_path(), PathBuf::from("/tmp/reports/table_data.csv"));
        assert_eq!(cfg.pdf_report_path(), PathBuf::from("/tmp/reports/table_data.pdf"));
    }
}

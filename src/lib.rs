//! Expense and invoice tracker: two in-memory tables edited from a terminal
//! UI and exported as a csv file and a single page pdf.

pub mod actions;
pub mod controller;
pub mod domain;
pub mod entry;
pub mod export;
pub mod inputter;
pub mod model;
pub mod table;
pub mod ui;

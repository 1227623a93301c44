use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::actions::TOOLBAR;
use crate::domain::{SUMMARY_FIELDS, TableSelector, TrackerConfig};
use crate::entry::{EntryForm, FormTarget};
use crate::inputter::InputResult;
use crate::model::{Model, PopupKind, UIData};
use crate::table::Table as DataTable;

pub const TOOLBAR_HEIGHT: usize = 3;
pub const SUMMARY_HEIGHT: usize = 3;
pub const STATUSLINE_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 3; // borders + header line
pub const SUMMARY_FIELD_WIDTH: usize = 10;

const SELECTOR_PROMPT: &str =
    "Enter 'top' to add to the top table or 'bottom' to add to the bottom table:";

#[derive(Debug)]
pub struct TrackerUI {
    column_width: u16,
}

impl TrackerUI {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            column_width: config.column_width,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let column_width = self.column_width;

        let [toolbar_area, top_area, bottom_area, summary_area, status_area] = Layout::vertical([
            Constraint::Length(TOOLBAR_HEIGHT as u16),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(SUMMARY_HEIGHT as u16),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.render_toolbar(&uidata, frame, toolbar_area);
        self.render_table(
            &uidata.tables.payments,
            uidata.top_row,
            uidata.focus == TableSelector::Top,
            column_width,
            frame,
            top_area,
        );
        self.render_table(
            &uidata.tables.invoices,
            uidata.bottom_row,
            uidata.focus == TableSelector::Bottom,
            column_width,
            frame,
            bottom_area,
        );
        self.render_summary(&uidata, frame, summary_area);
        frame.render_widget(
            Paragraph::new(Line::from(uidata.status_message.to_string()).dark_gray()),
            status_area,
        );

        if let Some(input) = uidata.selector_prompt {
            self.render_selector_prompt(input, frame);
        }
        if let Some((form, input)) = uidata.form {
            self.render_form(&uidata, form, input, frame);
        }
        if let Some(popup) = uidata.popup {
            let color = match popup.kind {
                PopupKind::Error => Color::Red,
                PopupKind::Info => Color::Green,
                PopupKind::Help => Color::Blue,
            };
            let text = Text::from(popup.message.clone());
            let width = text.width().clamp(30, 90) as u16 + 4;
            let height = text.height() as u16 + 4;
            let area = popup_area(frame.area(), width, height);
            let block = Block::bordered()
                .title(Line::from(format!(" {} ", popup.title)).bold().centered())
                .title_bottom(Line::from(" <Esc> close ").centered())
                .border_set(border::THICK)
                .border_style(Style::default().fg(color));
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(text).wrap(Wrap { trim: false }).block(block),
                area,
            );
        }
    }

    fn render_toolbar(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::with_capacity(TOOLBAR.len() * 2);
        for (idx, action) in TOOLBAR.iter().enumerate() {
            let label = format!(" {} ", action.label());
            if idx == uidata.selected_action {
                spans.push(Span::styled(label, Style::default().add_modifier(Modifier::REVERSED)));
            } else {
                spans.push(Span::raw(label));
            }
            spans.push(Span::raw("|"));
        }
        let block = Block::bordered().title(Line::from(" Expense Invoice Tracker ".bold()));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_table(
        &self,
        table: &DataTable,
        selected_row: usize,
        focused: bool,
        column_width: u16,
        frame: &mut Frame,
        area: Rect,
    ) {
        let header = Row::new(
            table
                .columns()
                .iter()
                .map(|c| Cell::from(Line::from(c.clone()).centered())),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = table.records().iter().map(|record| {
            Row::new(
                record
                    .iter()
                    .map(|v| Cell::from(Line::from(v.replace('\n', " ↵ ")).centered())),
            )
        });

        let widths = vec![Constraint::Length(column_width); table.columns().len()];
        let title = format!(" {} ({}) ", table.name(), table.len());
        let mut block = Block::bordered().title(Line::from(title));
        let mut highlight = Style::default();
        if focused {
            block = block.border_set(border::THICK).border_style(Style::default().fg(Color::Yellow));
            highlight = highlight.add_modifier(Modifier::REVERSED);
        }

        let widget = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(highlight);

        let mut state = TableState::default();
        if !table.is_empty() {
            state.select(Some(selected_row));
        }
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn render_summary(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (label, value) in SUMMARY_FIELDS.iter().zip(uidata.summary.values()) {
            spans.push(Span::raw(format!(" {label} ")));
            spans.push(Span::styled(
                format!("[{value:<width$}]", width = SUMMARY_FIELD_WIDTH),
                Style::default().fg(Color::Cyan),
            ));
        }
        let block = Block::bordered().title(Line::from(" Summary (s to edit) "));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_selector_prompt(&self, input: &InputResult, frame: &mut Frame) {
        let width = SELECTOR_PROMPT.len() as u16 + 4;
        let area = popup_area(frame.area(), width, 5);
        let block = Block::bordered()
            .title(Line::from(" Table Selection ").bold().centered())
            .border_set(border::THICK);
        let text = Text::from(vec![
            Line::from(SELECTOR_PROMPT),
            Line::from(format!("> {}", input.input)).yellow(),
        ]);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
        frame.set_cursor_position((area.x + 3 + input.cursor_pos as u16, area.y + 2));
    }

    fn render_form(&self, uidata: &UIData, form: &EntryForm, input: &InputResult, frame: &mut Frame) {
        let title = match form.target() {
            FormTarget::Table(selector) => format!(" Add entry: {} ", uidata.tables.get(selector).name()),
            FormTarget::Summary => " Edit summary ".to_string(),
        };
        let label_width = form.fields().iter().map(|f| f.label.len()).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(form.fields().len());
        let mut cursor = None;
        for (idx, field) in form.fields().iter().enumerate() {
            let label = format!("{:>label_width$} : ", field.label);
            let line = if idx == form.current() {
                cursor = Some((label.chars().count() + input.cursor_pos, idx));
                Line::from(vec![label.bold(), input.input.clone().yellow()])
            } else if idx < form.current() {
                let value = field.value.clone().unwrap_or_else(|| "<empty>".to_string());
                Line::from(vec![Span::raw(label), Span::raw(value)])
            } else {
                Line::from(label).dark_gray()
            };
            lines.push(line);
        }

        let height = lines.len() as u16 + 2;
        let area = popup_area(frame.area(), 70, height);
        let block = Block::bordered()
            .title(Line::from(title).bold().centered())
            .title_bottom(Line::from(" <Enter> next  <Esc> skip  <F2> submit ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
        if let Some((x, y)) = cursor {
            frame.set_cursor_position((area.x + 1 + x as u16, area.y + 1 + y as u16));
        }
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

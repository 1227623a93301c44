use tracing::{debug, info};

use crate::domain::{SUMMARY_FIELDS, TableSelector, TrackerError};
use crate::table::{Record, Summary, Tables};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Table(TableSelector),
    Summary,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: Option<String>, // None: skipped or not reached yet
}

/// One record worth of fields, filled in order.
/// Skipped fields end up as empty values, the form is never rejected.
#[derive(Debug, Clone)]
pub struct EntryForm {
    target: FormTarget,
    fields: Vec<FormField>,
    current: usize,
}

impl EntryForm {
    pub fn for_table(selector: TableSelector, columns: &[String]) -> Self {
        Self {
            target: FormTarget::Table(selector),
            fields: columns
                .iter()
                .map(|c| FormField {
                    label: c.clone(),
                    value: None,
                })
                .collect(),
            current: 0,
        }
    }

    pub fn for_summary(summary: &Summary) -> Self {
        Self {
            target: FormTarget::Summary,
            fields: SUMMARY_FIELDS
                .iter()
                .zip(summary.values())
                .map(|(label, value)| FormField {
                    label: label.to_string(),
                    value: Some(value.to_string()),
                })
                .collect(),
            current: 0,
        }
    }

    pub fn target(&self) -> FormTarget {
        self.target
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_field(&self) -> Option<&FormField> {
        self.fields.get(self.current)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.fields.len()
    }

    pub fn accept(&mut self, value: String) {
        if let Some(field) = self.fields.get_mut(self.current) {
            field.value = Some(value);
            self.current += 1;
        }
    }

    pub fn skip(&mut self) {
        if let Some(field) = self.fields.get_mut(self.current) {
            debug!("Skipping field {}", field.label);
            field.value = None;
            self.current += 1;
        }
    }

    pub fn submit_now(&mut self) {
        self.current = self.fields.len();
    }

    pub fn into_record(self) -> (FormTarget, Record) {
        let record = self
            .fields
            .into_iter()
            .map(|f| f.value.unwrap_or_default())
            .collect();
        (self.target, record)
    }
}

/// Writes a completed form to its target.
pub fn apply_form(form: EntryForm, tables: &mut Tables, summary: &mut Summary) -> FormTarget {
    let (target, record) = form.into_record();
    match target {
        FormTarget::Table(selector) => {
            let table = tables.get_mut(selector);
            table.append(record);
            info!("Added entry to {} ({} rows)", table.name(), table.len());
        }
        FormTarget::Summary => {
            let mut values = record.into_iter();
            summary.billed = values.next().unwrap_or_default();
            summary.paid = values.next().unwrap_or_default();
            summary.difference = values.next().unwrap_or_default();
            info!("Updated summary fields");
        }
    }
    target
}

/// Non interactive entry: validates the table choice, feeds one response per
/// column (`None` for a cancelled prompt) and appends the resulting record.
/// Missing responses are treated as cancelled.
pub fn collect_entry<I>(
    tables: &mut Tables,
    choice: &str,
    responses: I,
) -> Result<TableSelector, TrackerError>
where
    I: IntoIterator<Item = Option<String>>,
{
    let selector = TableSelector::parse(choice)?;
    let mut form = EntryForm::for_table(selector, tables.get(selector).columns());
    let mut responses = responses.into_iter();
    while !form.is_complete() {
        match responses.next() {
            Some(Some(value)) => form.accept(value),
            Some(None) => form.skip(),
            None => form.submit_now(),
        }
    }
    let table = tables.get_mut(selector);
    let (_, record) = form.into_record();
    table.append(record);
    Ok(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<Option<String>> {
        v.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn valid_selector_appends_to_one_table_only() {
        let mut tables = Tables::new();
        let selected = collect_entry(&mut tables, "top", values(&["Alice"; 6])).unwrap();
        assert_eq!(selected, TableSelector::Top);
        assert_eq!(tables.payments.len(), 1);
        assert_eq!(tables.invoices.len(), 0);

        let selected = collect_entry(&mut tables, "bottom", values(&["x"; 11])).unwrap();
        assert_eq!(selected, TableSelector::Bottom);
        assert_eq!(tables.payments.len(), 1);
        assert_eq!(tables.invoices.len(), 1);
    }

    #[test]
    fn invalid_selector_appends_nothing() {
        let mut tables = Tables::new();
        for choice in ["", "middle", "TOP"] {
            let result = collect_entry(&mut tables, choice, values(&["a"; 11]));
            assert!(matches!(result, Err(TrackerError::InvalidSelection(_))));
        }
        assert!(tables.payments.is_empty());
        assert!(tables.invoices.is_empty());
    }

    #[test]
    fn cancelled_fields_become_empty() {
        let mut tables = Tables::new();
        let responses = vec![
            Some("Alice".to_string()),
            None,
            Some("250.00".to_string()),
            None,
            None,
            Some("bank1.csv".to_string()),
        ];
        collect_entry(&mut tables, "top", responses).unwrap();
        assert_eq!(
            tables.payments.records()[0],
            vec!["Alice", "", "250.00", "", "", "bank1.csv"]
        );
    }

    #[test]
    fn running_out_of_responses_still_appends() {
        let mut tables = Tables::new();
        collect_entry(&mut tables, "bottom", values(&["C-7"])).unwrap();
        let record = &tables.invoices.records()[0];
        assert_eq!(record.len(), 11);
        assert_eq!(record[0], "C-7");
        assert!(record[1..].iter().all(|v| v.is_empty()));
    }

    #[test]
    fn form_walks_fields_in_order() {
        let tables = Tables::new();
        let mut form = EntryForm::for_table(TableSelector::Top, tables.payments.columns());
        assert_eq!(form.current_field().unwrap().label, "Pay Name");
        form.accept("Alice".to_string());
        assert_eq!(form.current_field().unwrap().label, "Pay Date");
        form.skip();
        assert_eq!(form.current(), 2);
        form.submit_now();
        assert!(form.is_complete());
        assert!(form.current_field().is_none());

        // further input after completion is ignored
        form.accept("late".to_string());
        let (target, record) = form.into_record();
        assert_eq!(target, FormTarget::Table(TableSelector::Top));
        assert_eq!(record, vec!["Alice", "", "", "", "", ""]);
    }

    #[test]
    fn summary_form_is_prefilled_and_applied() {
        let mut tables = Tables::new();
        let mut summary = Summary {
            billed: "100".to_string(),
            ..Summary::default()
        };
        let mut form = EntryForm::for_summary(&summary);
        assert_eq!(form.fields()[0].value.as_deref(), Some("100"));
        assert_eq!(form.fields()[2].label, "(+/-)");

        form.accept("120".to_string());
        form.accept("90".to_string());
        form.skip();
        let target = apply_form(form, &mut tables, &mut summary);

        assert_eq!(target, FormTarget::Summary);
        assert_eq!(summary.billed, "120");
        assert_eq!(summary.paid, "90");
        assert_eq!(summary.difference, "");
        assert!(tables.payments.is_empty());
    }
}

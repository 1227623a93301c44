use tracing::{trace, warn};

use crate::domain::{INVOICE_COLUMNS, PAYMENT_COLUMNS, TableSelector};

pub type Record = Vec<String>;

/// An insertion ordered list of records sharing one column set.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn create(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record as the last row.
    /// Short records are padded with empty values, long ones are truncated,
    /// so every stored record has exactly one value per column.
    pub fn append(&mut self, mut record: Record) {
        let ncols = self.columns.len();
        if record.len() != ncols {
            warn!(
                "Record for {} has {} values but {} columns, {}",
                self.name,
                record.len(),
                ncols,
                if record.len() < ncols { "padding" } else { "truncating" }
            );
            record.resize(ncols, String::new());
        }
        trace!("Append to {}: {:?}", self.name, record);
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        trace!("Clear {} ({} rows)", self.name, self.records.len());
        self.records.clear();
    }
}

/// The payments table on top and the invoice lines below it.
#[derive(Debug, Clone)]
pub struct Tables {
    pub payments: Table,
    pub invoices: Table,
}

impl Tables {
    pub fn new() -> Self {
        Self {
            payments: Table::create("Payments", &PAYMENT_COLUMNS),
            invoices: Table::create("Invoice Lines", &INVOICE_COLUMNS),
        }
    }

    pub fn get(&self, selector: TableSelector) -> &Table {
        match selector {
            TableSelector::Top => &self.payments,
            TableSelector::Bottom => &self.invoices,
        }
    }

    pub fn get_mut(&mut self, selector: TableSelector) -> &mut Table {
        match selector {
            TableSelector::Top => &mut self.payments,
            TableSelector::Bottom => &mut self.invoices,
        }
    }

    pub fn clear_all(&mut self) {
        self.payments.clear();
        self.invoices.clear();
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

// Billed / paid / difference. Free text, never derived from the tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub billed: String,
    pub paid: String,
    pub difference: String,
}

impl Summary {
    pub fn clear(&mut self) {
        self.billed.clear();
        self.paid.clear();
        self.difference.clear();
    }

    pub fn values(&self) -> [&str; 3] {
        [&self.billed, &self.paid, &self.difference]
    }
}

use crate::commands::{CmdMessage, CmdResult, Record};
use crate::error::{GramVaultError, Result};
use crate::model::NewEntry;
use crate::state::AppState;
use crate::store::StorageBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryFilter {
    #[default]
    Active,
    Trashed,
    All,
}

/// Field changes for an existing entry. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryEdit {
    pub id: String,
    pub invoice_number: Option<String>,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub date: Option<String>,
}

impl EntryEdit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

fn validate(invoice_number: &str, weight: f64) -> Result<()> {
    if invoice_number.trim().is_empty() {
        return Err(GramVaultError::Api(
            "Invoice number cannot be empty".to_string(),
        ));
    }
    if !weight.is_finite() || weight < 0.0 {
        return Err(GramVaultError::Api(format!("Invalid weight: {}", weight)));
    }
    Ok(())
}

/// Adds an entry for the current user, whatever owner `new_entry` names.
pub fn add<B: StorageBackend>(state: &mut AppState<B>, new_entry: NewEntry) -> Result<CmdResult> {
    validate(&new_entry.invoice_number, new_entry.weight)?;
    let new_entry = NewEntry {
        user_id: state.current_user_id().to_string(),
        invoice_number: new_entry.invoice_number.trim().to_string(),
        ..new_entry
    };
    let entry = state.add_entry(new_entry)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added {} ({} g)",
        entry.invoice_number,
        crate::state::format_weight(entry.weight)
    )));
    Ok(result.with_affected(vec![Record::Entry(entry)]))
}

pub fn edit<B: StorageBackend>(state: &mut AppState<B>, edit: &EntryEdit) -> Result<CmdResult> {
    let Some(mut entry) = state.find_entry(&edit.id).cloned() else {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No entry with id {}",
            edit.id
        ))));
    };

    if let Some(invoice) = &edit.invoice_number {
        entry.invoice_number = invoice.trim().to_string();
    }
    if let Some(weight) = edit.weight {
        entry.weight = weight;
    }
    if let Some(description) = &edit.description {
        entry.description = description.clone();
    }
    if edit.category.is_some() {
        entry.category = edit.category.clone();
    }
    if edit.quantity.is_some() {
        entry.quantity = edit.quantity;
    }
    if edit.date.is_some() {
        entry.date = edit.date.clone();
    }
    validate(&entry.invoice_number, entry.weight)?;

    state.update_entry(entry.clone())?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Updated {}", entry.invoice_number)));
    Ok(result.with_affected(vec![Record::Entry(entry)]))
}

/// The current user's entries. Active ones come in invoice order.
pub fn list<B: StorageBackend>(state: &AppState<B>, filter: EntryFilter) -> Result<CmdResult> {
    let mut records: Vec<Record> = Vec::new();
    if matches!(filter, EntryFilter::Active | EntryFilter::All) {
        records.extend(state.active_entries().into_iter().cloned().map(Record::Entry));
    }
    if matches!(filter, EntryFilter::Trashed | EntryFilter::All) {
        records.extend(state.trashed_entries().into_iter().cloned().map(Record::Entry));
    }

    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info("No entries."));
    }
    Ok(result.with_listed(records))
}

/// Total weight of the current user's live entries.
pub fn total<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let count = state.active_entries().len();
    Ok(CmdResult::message(CmdMessage::info(format!(
        "Total weight: {} g across {} entries ({})",
        state.formatted_total_weight(),
        count,
        state.active_user().name
    ))))
}

//! DAI records: dispatch and receipt tracking.
//!
//! A record starts `waiting`, moves to `out` when the batch leaves and to `in` when it
//! comes back. Any of the three can be set at any time; `trash` is reached only through
//! the recycle bin.

use crate::commands::{CmdMessage, CmdResult, Record};
use crate::error::Result;
use crate::model::{DaiStatus, NewDaiEntry};
use crate::state::AppState;
use crate::store::StorageBackend;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaiEdit {
    pub id: String,
    pub di_number: Option<String>,
    pub date: Option<String>,
    pub details: Option<String>,
}

impl DaiEdit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

pub fn add<B: StorageBackend>(state: &mut AppState<B>, new_entry: NewDaiEntry) -> Result<CmdResult> {
    let entry = state.add_dai_entry(new_entry)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added DAI {}", entry.di_number)));
    Ok(result.with_affected(vec![Record::Dai(entry)]))
}

/// With no status, every record outside the trash.
pub fn list<B: StorageBackend>(state: &AppState<B>, status: Option<DaiStatus>) -> Result<CmdResult> {
    let entries = match status {
        Some(status) => state.dai_entries_with_status(status),
        None => state.active_dai_entries(),
    };
    let records: Vec<Record> = entries.into_iter().cloned().map(Record::Dai).collect();

    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info("No DAI entries."));
    }
    Ok(result.with_listed(records))
}

pub fn set_status<B: StorageBackend>(
    state: &mut AppState<B>,
    id: &str,
    status: DaiStatus,
) -> Result<CmdResult> {
    if !state.set_dai_status(id, status)? {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No DAI entry {} outside the trash",
            id
        ))));
    }
    let mut result = CmdResult::default();
    if let Some(entry) = state.find_dai_entry(id).cloned() {
        result.add_message(CmdMessage::success(format!(
            "DAI {} is now {}",
            entry.di_number, status
        )));
        result.affected.push(Record::Dai(entry));
    }
    Ok(result)
}

pub fn edit<B: StorageBackend>(state: &mut AppState<B>, edit: &DaiEdit) -> Result<CmdResult> {
    let Some(mut entry) = state.find_dai_entry(&edit.id).cloned() else {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No DAI entry with id {}",
            edit.id
        ))));
    };
    if let Some(di_number) = &edit.di_number {
        entry.di_number = di_number.clone();
    }
    if let Some(date) = &edit.date {
        entry.date = date.clone();
    }
    if let Some(details) = &edit.details {
        entry.details = details.clone();
    }
    state.update_dai_entry(entry.clone())?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Updated DAI {}", entry.di_number)));
    Ok(result.with_affected(vec![Record::Dai(entry)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    fn add_one(state: &mut AppState<MemBackend>, di: &str) -> String {
        let result = add(state, NewDaiEntry::new(di, "2024-05-01", "Chains")).unwrap();
        result.affected[0].id().to_string()
    }

    #[test]
    fn status_workflow_and_filtering() {
        let mut state = state();
        let a = add_one(&mut state, "DI-1");
        add_one(&mut state, "DI-2");

        set_status(&mut state, &a, DaiStatus::Out).unwrap();
        assert_eq!(list(&state, Some(DaiStatus::Out)).unwrap().listed.len(), 1);
        assert_eq!(list(&state, Some(DaiStatus::Waiting)).unwrap().listed.len(), 1);
        assert_eq!(list(&state, None).unwrap().listed.len(), 2);

        set_status(&mut state, &a, DaiStatus::In).unwrap();
        assert_eq!(state.find_dai_entry(&a).unwrap().status, DaiStatus::In);
    }

    #[test]
    fn trashed_entries_ignore_status_changes() {
        let mut state = state();
        let a = add_one(&mut state, "DI-1");
        crate::recycle_bin::RecycleBin::new(&mut state)
            .delete(crate::lifecycle::EntityKind::Dai, &a)
            .unwrap();

        let result = set_status(&mut state, &a, DaiStatus::Out).unwrap();
        assert!(result.affected.is_empty());
        assert_eq!(state.find_dai_entry(&a).unwrap().status, DaiStatus::Trash);
        assert!(list(&state, None).unwrap().listed.is_empty());
    }

    #[test]
    fn edit_keeps_status() {
        let mut state = state();
        let a = add_one(&mut state, "DI-1");
        set_status(&mut state, &a, DaiStatus::Out).unwrap();

        let change = DaiEdit {
            details: Some("Chains and bangles".into()),
            ..DaiEdit::new(a.clone())
        };
        edit(&mut state, &change).unwrap();

        let stored = state.find_dai_entry(&a).unwrap();
        assert_eq!(stored.details, "Chains and bangles");
        assert_eq!(stored.status, DaiStatus::Out);
        assert_eq!(stored.di_number, "DI-1");
    }

    #[test]
    fn empty_di_number_is_rejected() {
        let mut state = state();
        assert!(add(&mut state, NewDaiEntry::new(" ", "2024-05-01", "x")).is_err());
    }
}

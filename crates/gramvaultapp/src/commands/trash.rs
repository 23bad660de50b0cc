use crate::commands::{CmdMessage, CmdResult, Record};
use crate::confirm::Confirm;
use crate::error::Result;
use crate::lifecycle::EntityKind;
use crate::model::View;
use crate::recycle_bin::{EmptyTrashOutcome, RecycleBin};
use crate::state::AppState;
use crate::store::StorageBackend;

fn snapshot<B: StorageBackend>(state: &AppState<B>, kind: EntityKind, id: &str) -> Option<Record> {
    match kind {
        EntityKind::Entry => state.find_entry(id).cloned().map(Record::Entry),
        EntityKind::User => state.find_user(id).cloned().map(Record::User),
        EntityKind::Dai => state.find_dai_entry(id).cloned().map(Record::Dai),
    }
}

#[derive(Clone, Copy)]
enum Transition {
    Delete,
    Restore,
    Purge,
}

impl Transition {
    fn verb(self) -> &'static str {
        match self {
            Transition::Delete => "Deleted",
            Transition::Restore => "Restored",
            Transition::Purge => "Purged",
        }
    }

    fn unchanged(self) -> &'static str {
        match self {
            Transition::Delete => "not found or already in the trash",
            Transition::Restore | Transition::Purge => "not in the trash",
        }
    }
}

fn run<B: StorageBackend>(
    state: &mut AppState<B>,
    kind: EntityKind,
    ids: &[String],
    transition: Transition,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for id in ids {
        let before = snapshot(state, kind, id);
        let mut bin = RecycleBin::new(state);
        let changed = match transition {
            Transition::Delete => bin.delete(kind, id)?,
            Transition::Restore => bin.restore(kind, id)?,
            Transition::Purge => bin.purge(kind, id)?,
        };

        if !changed {
            result.add_message(CmdMessage::info(format!(
                "{} {} {}",
                kind,
                id,
                transition.unchanged()
            )));
            continue;
        }

        // Purged records are gone, so report what they were.
        let record = match transition {
            Transition::Purge => before,
            _ => snapshot(state, kind, id),
        };
        if let Some(record) = record {
            result.add_message(CmdMessage::success(format!(
                "{} {} {}",
                transition.verb(),
                kind.label().to_lowercase(),
                describe(&record)
            )));
            result.affected.push(record);
        }
    }
    Ok(result)
}

fn describe(record: &Record) -> String {
    match record {
        Record::Entry(e) => e.invoice_number.clone(),
        Record::User(u) => u.name.clone(),
        Record::Dai(d) => d.di_number.clone(),
        other => other.id().to_string(),
    }
}

pub fn delete<B: StorageBackend>(
    state: &mut AppState<B>,
    kind: EntityKind,
    ids: &[String],
) -> Result<CmdResult> {
    run(state, kind, ids, Transition::Delete)
}

pub fn restore<B: StorageBackend>(
    state: &mut AppState<B>,
    kind: EntityKind,
    ids: &[String],
) -> Result<CmdResult> {
    run(state, kind, ids, Transition::Restore)
}

pub fn purge<B: StorageBackend>(
    state: &mut AppState<B>,
    kind: EntityKind,
    ids: &[String],
) -> Result<CmdResult> {
    run(state, kind, ids, Transition::Purge)
}

/// Everything in the bin: the current user's entries and DAI records, and all trashed
/// users. Switches to the trash view.
pub fn list<B: StorageBackend>(state: &mut AppState<B>) -> Result<CmdResult> {
    state.set_view(View::Trash);

    let mut records: Vec<Record> = Vec::new();
    records.extend(state.trashed_entries().into_iter().cloned().map(Record::Entry));
    records.extend(state.trashed_users().into_iter().cloned().map(Record::User));
    records.extend(state.trashed_dai_entries().into_iter().cloned().map(Record::Dai));

    let summary = crate::recycle_bin::summary(state);
    let mut result = CmdResult::default();
    if summary.is_empty() {
        result.add_message(CmdMessage::info("Recycle bin is empty."));
    } else {
        result.add_message(CmdMessage::info(format!(
            "{} entries, {} users, {} DAI entries in the recycle bin",
            summary.entries, summary.users, summary.dai_entries
        )));
    }
    Ok(result.with_listed(records))
}

pub fn empty<B: StorageBackend, C: Confirm + ?Sized>(
    state: &mut AppState<B>,
    confirm: &mut C,
) -> Result<CmdResult> {
    let message = match RecycleBin::new(state).empty(confirm)? {
        EmptyTrashOutcome::AlreadyEmpty => CmdMessage::info("Recycle bin is already empty."),
        EmptyTrashOutcome::Declined => CmdMessage::info("Recycle bin left as it was."),
        EmptyTrashOutcome::Emptied(removed) => CmdMessage::success(format!(
            "Permanently deleted {} entries, {} users and {} DAI entries",
            removed.entries, removed.users, removed.dai_entries
        )),
    };
    Ok(CmdResult::message(message))
}

use chrono::Utc;
use std::fs;
use std::path::Path;

use crate::backup::{backup_filename, export_document, parse_backup, prepare_import};
use crate::commands::{CmdMessage, CmdResult};
use crate::confirm::Confirm;
use crate::error::Result;
use crate::state::AppState;
use crate::store::StorageBackend;

/// Writes a full backup. A directory target receives the dated default filename.
pub fn export<B: StorageBackend>(state: &AppState<B>, target: &Path) -> Result<CmdResult> {
    let path = if target.is_dir() {
        target.join(backup_filename(Utc::now().date_naive()))
    } else {
        target.to_path_buf()
    };

    let document = export_document(state.persistence(), state.users(), state.settings());
    fs::write(&path, document.to_json()?)?;

    let data = &document.data;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Backup written to {} ({} entries, {} users, {} DAI entries, {} notes)",
        path.display(),
        data.entries.len(),
        data.users.len(),
        data.dai_entries.len(),
        data.notes.len()
    )));
    Ok(result.with_paths(vec![path]))
}

/// Merges a backup from text. Nothing is written unless `confirm` agrees.
pub fn import_text<B: StorageBackend, C: Confirm + ?Sized>(
    state: &mut AppState<B>,
    text: &str,
    confirm: &mut C,
) -> Result<CmdResult> {
    let payload = parse_backup(text)?;
    let prepared = prepare_import(state.persistence(), payload);

    if !confirm.confirm(&prepared.prompt()) {
        return Ok(CmdResult::message(CmdMessage::info(
            "Import cancelled. Nothing was changed.",
        )));
    }

    let counts = prepared.commit(state.persistence())?;
    state.reload()?;

    let message = if counts.is_empty() {
        CmdMessage::info("Nothing new to import.")
    } else {
        CmdMessage::success(format!("Imported {}", counts.describe().join(", ")))
    };
    Ok(CmdResult::message(message))
}

pub fn import_file<B: StorageBackend, C: Confirm + ?Sized>(
    state: &mut AppState<B>,
    path: &Path,
    confirm: &mut C,
) -> Result<CmdResult> {
    let text = fs::read_to_string(path)?;
    import_text(state, &text, confirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::confirm::{AssumeYes, Prompt};
    use crate::error::{GramVaultError, ImportError};
    use crate::model::{NewEntry, DEFAULT_USER_ID};
    use crate::store::mem_backend::MemBackend;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    #[test]
    fn export_to_directory_uses_dated_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state();
        state
            .add_entry(NewEntry::new(DEFAULT_USER_ID, "INV-1", 1.0, ""))
            .unwrap();

        let result = export(&state, dir.path()).unwrap();
        let path = &result.paths[0];
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pro-jewellery-backup-"));
        assert!(name.ends_with(".json"));

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("PRO_JEWELLERY_FULL_BACKUP"));
        assert!(text.contains("INV-1"));
    }

    #[test]
    fn export_then_import_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("backup.json");

        let mut source = state();
        let ravi = source.add_user("Ravi").unwrap();
        source
            .add_entry(NewEntry::new(&ravi.id, "INV-7", 7.0, "Anklet"))
            .unwrap();
        source.save_billing_rate(6100.0).unwrap();
        export(&source, &file).unwrap();

        let mut target = state();
        let result = import_file(&mut target, &file, &mut AssumeYes).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert_eq!(target.users().len(), 2);
        assert_eq!(target.entries().len(), 1);
        assert_eq!(target.persistence().billing_rate(&ravi.id), 6100.0);

        // A second import of the same file adds nothing.
        let again = import_file(&mut target, &file, &mut AssumeYes).unwrap();
        assert_eq!(again.messages[0].content, "Nothing new to import.");
        assert_eq!(target.entries().len(), 1);
    }

    #[test]
    fn declined_import_changes_nothing() {
        let mut state = state();
        let legacy = r#"[{"id":"e1","userId":"default","invoiceNumber":"INV-1","weight":1.0,
            "description":"","createdAt":1,"isDeleted":false}]"#;

        let mut seen = Vec::new();
        let mut decline = |prompt: &Prompt| {
            seen.push(prompt.title.clone());
            false
        };
        let result = import_text(&mut state, legacy, &mut decline).unwrap();
        assert!(result.messages[0].content.starts_with("Import cancelled"));
        assert_eq!(seen, vec!["Merge 1 new entries from a legacy backup?".to_string()]);
        assert!(state.entries().is_empty());
        assert!(state.persistence().entries().is_empty());
    }

    #[test]
    fn bad_input_never_prompts() {
        let mut state = state();
        let mut asked = false;
        let mut gate = |_: &Prompt| {
            asked = true;
            true
        };
        let err = import_text(&mut state, "not json", &mut gate).unwrap_err();
        assert!(matches!(err, GramVaultError::Import(ImportError::Parse(_))));
        let err = import_text(&mut state, r#"{"x":1}"#, &mut gate).unwrap_err();
        assert!(matches!(
            err,
            GramVaultError::Import(ImportError::InvalidFormat(_))
        ));
        assert!(!asked);
    }

    #[test]
    fn import_reloads_state() {
        let mut state = state();
        let legacy = r#"[{"id":"e1","userId":"default","invoiceNumber":"INV-1","weight":2.5,
            "description":"","createdAt":1,"isDeleted":false}]"#;
        import_text(&mut state, legacy, &mut AssumeYes).unwrap();
        assert_eq!(state.total_weight(), 2.5);
    }
}

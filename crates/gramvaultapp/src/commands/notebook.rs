//! Notes, emergency contacts and DAI images.
//!
//! These collections are not part of the in-memory state. Commands read them from
//! storage, change them and write them straight back. None of them has a trash: notes
//! and contacts are removed outright, and images can only be added.

use crate::commands::{CmdMessage, CmdResult, Record};
use crate::error::{GramVaultError, Result};
use crate::model::{DaiImage, EmergencyContact, Note};
use crate::state::AppState;
use crate::store::StorageBackend;

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GramVaultError::Api(format!("{} cannot be empty", what)));
    }
    Ok(())
}

// --- Notes ---

/// Newest notes come first.
pub fn add_note<B: StorageBackend>(state: &AppState<B>, content: &str) -> Result<CmdResult> {
    require(content, "Note")?;
    let persistence = state.persistence();
    let note = Note::new(content);
    let mut notes = persistence.notes();
    notes.insert(0, note.clone());
    persistence.save_notes(&notes)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Note saved"));
    Ok(result.with_affected(vec![Record::Note(note)]))
}

pub fn list_notes<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let notes: Vec<Record> = state
        .persistence()
        .notes()
        .into_iter()
        .map(Record::Note)
        .collect();
    let mut result = CmdResult::default();
    if notes.is_empty() {
        result.add_message(CmdMessage::info("No notes."));
    }
    Ok(result.with_listed(notes))
}

pub fn remove_note<B: StorageBackend>(state: &AppState<B>, id: &str) -> Result<CmdResult> {
    let persistence = state.persistence();
    let mut notes = persistence.notes();
    let Some(pos) = notes.iter().position(|n| n.id == id) else {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No note with id {}",
            id
        ))));
    };
    let removed = notes.remove(pos);
    persistence.save_notes(&notes)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Note removed"));
    Ok(result.with_affected(vec![Record::Note(removed)]))
}

// --- Emergency contacts ---

pub fn add_contact<B: StorageBackend>(
    state: &AppState<B>,
    name: &str,
    number: &str,
) -> Result<CmdResult> {
    require(name, "Contact name")?;
    require(number, "Contact number")?;
    let persistence = state.persistence();
    let contact = EmergencyContact::new(name.trim(), number.trim());
    let mut contacts = persistence.emergency_contacts();
    contacts.push(contact.clone());
    persistence.save_emergency_contacts(&contacts)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added contact {}", contact.name)));
    Ok(result.with_affected(vec![Record::Contact(contact)]))
}

pub fn list_contacts<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let contacts: Vec<Record> = state
        .persistence()
        .emergency_contacts()
        .into_iter()
        .map(Record::Contact)
        .collect();
    let mut result = CmdResult::default();
    if contacts.is_empty() {
        result.add_message(CmdMessage::info("No emergency contacts."));
    }
    Ok(result.with_listed(contacts))
}

pub fn remove_contact<B: StorageBackend>(state: &AppState<B>, id: &str) -> Result<CmdResult> {
    let persistence = state.persistence();
    let mut contacts = persistence.emergency_contacts();
    let Some(pos) = contacts.iter().position(|c| c.id == id) else {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No contact with id {}",
            id
        ))));
    };
    let removed = contacts.remove(pos);
    persistence.save_emergency_contacts(&contacts)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Removed contact {}", removed.name)));
    Ok(result.with_affected(vec![Record::Contact(removed)]))
}

// --- DAI images ---

pub fn add_dai_image<B: StorageBackend>(
    state: &AppState<B>,
    url: &str,
    title: &str,
) -> Result<CmdResult> {
    require(url, "Image")?;
    let persistence = state.persistence();
    let image = DaiImage::new(url, title);
    let mut images = persistence.dai_images();
    images.insert(0, image.clone());
    persistence.save_dai_images(&images)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Image saved"));
    Ok(result.with_affected(vec![Record::DaiImage(image)]))
}

pub fn list_dai_images<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let images: Vec<Record> = state
        .persistence()
        .dai_images()
        .into_iter()
        .map(Record::DaiImage)
        .collect();
    let mut result = CmdResult::default();
    if images.is_empty() {
        result.add_message(CmdMessage::info("No DAI images."));
    }
    Ok(result.with_listed(images))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    #[test]
    fn notes_are_newest_first_and_removable() {
        let state = state();
        add_note(&state, "first").unwrap();
        let second = add_note(&state, "second").unwrap();
        let second_id = second.affected[0].id().to_string();

        let listed = list_notes(&state).unwrap().listed;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id(), second_id);

        remove_note(&state, &second_id).unwrap();
        let remaining = state.persistence().notes();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content, "first");

        let again = remove_note(&state, &second_id).unwrap();
        assert!(again.affected.is_empty());
    }

    #[test]
    fn blank_note_is_rejected() {
        let state = state();
        assert!(add_note(&state, "  ").is_err());
        assert!(list_notes(&state).unwrap().listed.is_empty());
    }

    #[test]
    fn contacts_keep_insertion_order() {
        let state = state();
        add_contact(&state, "Police", "100").unwrap();
        add_contact(&state, " Ambulance ", "108").unwrap();
        let contacts = state.persistence().emergency_contacts();
        assert_eq!(contacts[0].name, "Police");
        assert_eq!(contacts[1].name, "Ambulance");
        assert!(add_contact(&state, "Nobody", "").is_err());

        let id = contacts[0].id.clone();
        remove_contact(&state, &id).unwrap();
        assert_eq!(list_contacts(&state).unwrap().listed.len(), 1);
    }

    #[test]
    fn images_are_stored_opaquely() {
        let state = state();
        add_dai_image(&state, "data:image/jpeg;base64,AAAA", "Batch 4").unwrap();
        let images = state.persistence().dai_images();
        assert_eq!(images[0].url, "data:image/jpeg;base64,AAAA");
        assert_eq!(list_dai_images(&state).unwrap().listed.len(), 1);
    }
}

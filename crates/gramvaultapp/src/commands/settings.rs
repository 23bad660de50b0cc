use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Theme;
use crate::state::AppState;
use crate::store::StorageBackend;

pub fn show<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let settings = state.settings();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "Primary title: {}",
        settings.primary_title
    )));
    result.add_message(CmdMessage::info(format!(
        "Secondary title: {}",
        settings.secondary_title
    )));
    result.add_message(CmdMessage::info(format!("Theme: {}", state.theme().as_str())));
    result.add_message(CmdMessage::info(format!(
        "Current user: {}",
        state.active_user().name
    )));
    Ok(result)
}

/// Changes either title; a missing one keeps its current value.
pub fn set_titles<B: StorageBackend>(
    state: &mut AppState<B>,
    primary: Option<String>,
    secondary: Option<String>,
) -> Result<CmdResult> {
    if primary.is_none() && secondary.is_none() {
        return Ok(CmdResult::message(CmdMessage::info("Nothing to change.")));
    }
    let current = state.settings().clone();
    let primary = primary.unwrap_or(current.primary_title);
    let secondary = secondary.unwrap_or(current.secondary_title);
    state.update_settings(primary, secondary)?;
    Ok(CmdResult::message(CmdMessage::success(format!(
        "Titles set to {} / {}",
        state.settings().primary_title,
        state.settings().secondary_title
    ))))
}

pub fn theme<B: StorageBackend>(state: &mut AppState<B>, theme: Option<Theme>) -> Result<CmdResult> {
    let Some(theme) = theme else {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "Theme: {}",
            state.theme().as_str()
        ))));
    };
    state.set_theme(theme)?;
    Ok(CmdResult::message(CmdMessage::success(format!(
        "Theme set to {}",
        theme.as_str()
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    #[test]
    fn partial_title_update() {
        let mut state = state();
        set_titles(&mut state, Some("GOLD HOUSE".into()), None).unwrap();
        assert_eq!(state.settings().primary_title, "GOLD HOUSE");
        assert_eq!(state.settings().secondary_title, "Gram Tracker Pro");
        assert_eq!(
            state.persistence().settings().unwrap().primary_title,
            "GOLD HOUSE"
        );
    }

    #[test]
    fn theme_round_trips_through_storage() {
        let mut state = state();
        theme(&mut state, Some(Theme::Dark)).unwrap();
        assert_eq!(state.persistence().theme(), Theme::Dark);
        let shown = theme(&mut state, None).unwrap();
        assert_eq!(shown.messages[0].content, "Theme: dark");
    }

    #[test]
    fn show_lists_titles() {
        let state = state();
        let result = show(&state).unwrap();
        assert_eq!(result.messages[0].content, "Primary title: PRO JEWELLERY");
        assert_eq!(result.messages.len(), 4);
    }
}

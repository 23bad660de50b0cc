use crate::commands::{CmdMessage, CmdResult, Record};
use crate::error::Result;
use crate::model::UserUpdate;
use crate::state::AppState;
use crate::store::StorageBackend;

/// Creates a user and selects it.
pub fn add<B: StorageBackend>(state: &mut AppState<B>, name: &str) -> Result<CmdResult> {
    let user = state.add_user(name)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added user {}, now the current user",
        user.name
    )));
    Ok(result.with_affected(vec![Record::User(user)]))
}

/// Active users, in stored order.
pub fn list<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let users = state
        .active_users()
        .into_iter()
        .cloned()
        .map(Record::User)
        .collect();
    Ok(CmdResult::default().with_listed(users))
}

pub fn select<B: StorageBackend>(state: &mut AppState<B>, id: &str) -> Result<CmdResult> {
    if !state.select_user(id)? {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No active user with id {}",
            id
        ))));
    }
    let user = state.active_user().clone();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Switched to {}", user.name)));
    Ok(result.with_affected(vec![Record::User(user)]))
}

pub fn edit<B: StorageBackend>(state: &mut AppState<B>, update: &UserUpdate) -> Result<CmdResult> {
    if update.is_empty() {
        return Ok(CmdResult::message(CmdMessage::info("Nothing to change.")));
    }
    if !state.update_user(update)? {
        return Ok(CmdResult::message(CmdMessage::info(format!(
            "No user with id {}",
            update.id
        ))));
    }
    let mut result = CmdResult::default();
    if let Some(user) = state.find_user(&update.id).cloned() {
        result.add_message(CmdMessage::success(format!("Updated {}", user.name)));
        result.affected.push(Record::User(user));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::model::DEFAULT_USER_ID;
    use crate::store::mem_backend::MemBackend;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    #[test]
    fn add_selects_new_user() {
        let mut state = state();
        let result = add(&mut state, "Ravi").unwrap();
        let Record::User(user) = &result.affected[0] else {
            panic!("expected a user");
        };
        assert_eq!(state.current_user_id(), user.id);
        assert!(add(&mut state, "   ").is_err());
    }

    #[test]
    fn list_hides_trashed_users() {
        let mut state = state();
        add(&mut state, "Ravi").unwrap();
        let ravi = state.current_user_id().to_string();
        crate::recycle_bin::RecycleBin::new(&mut state)
            .delete(crate::lifecycle::EntityKind::User, &ravi)
            .unwrap();

        let result = list(&state).unwrap();
        assert_eq!(result.listed.len(), 1);
        assert_eq!(result.listed[0].id(), DEFAULT_USER_ID);
    }

    #[test]
    fn select_reports_unknown() {
        let mut state = state();
        let result = select(&mut state, "ghost").unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Info);
        assert_eq!(state.current_user_id(), DEFAULT_USER_ID);
    }

    #[test]
    fn edit_applies_partial_update() {
        let mut state = state();
        let update = UserUpdate {
            phone: Some("98400 12345".into()),
            ..UserUpdate::new(DEFAULT_USER_ID)
        };
        let result = edit(&mut state, &update).unwrap();
        assert_eq!(result.affected.len(), 1);
        let user = state.find_user(DEFAULT_USER_ID).unwrap();
        assert_eq!(user.phone.as_deref(), Some("98400 12345"));
        assert_eq!(user.name, "Master User");

        let noop = edit(&mut state, &UserUpdate::new(DEFAULT_USER_ID)).unwrap();
        assert_eq!(noop.messages[0].content, "Nothing to change.");
    }
}

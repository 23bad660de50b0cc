//! Billing: a per-user rate per gram and an estimate over the current user's live
//! entries.

use serde::Serialize;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::state::AppState;
use crate::store::StorageBackend;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingLine {
    pub invoice_number: String,
    pub description: String,
    pub weight: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingEstimate {
    pub user_name: String,
    pub rate: f64,
    pub lines: Vec<BillingLine>,
    pub total_weight: f64,
    pub total_amount: f64,
}

impl BillingEstimate {
    /// Lines follow the invoice order of the entry list.
    pub fn for_current_user<B: StorageBackend>(state: &AppState<B>) -> Self {
        let rate = state.billing_rate();
        let lines: Vec<BillingLine> = state
            .active_entries()
            .into_iter()
            .map(|e| BillingLine {
                invoice_number: e.invoice_number.clone(),
                description: e.description.clone(),
                weight: e.weight,
                amount: e.weight * rate,
            })
            .collect();
        Self {
            user_name: state.active_user().name.clone(),
            rate,
            total_weight: lines.iter().map(|l| l.weight).sum(),
            total_amount: lines.iter().map(|l| l.amount).sum(),
            lines,
        }
    }
}

/// Two decimals, e.g. `"6250.00"`.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn estimate<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    let estimate = BillingEstimate::for_current_user(state);
    let mut result = CmdResult::default();
    if estimate.rate == 0.0 {
        result.add_message(CmdMessage::warning(
            "No billing rate set for this user; use `rate <value>` first.",
        ));
    }
    result.estimate = Some(estimate);
    Ok(result)
}

pub fn set_rate<B: StorageBackend>(state: &mut AppState<B>, rate: f64) -> Result<CmdResult> {
    state.save_billing_rate(rate)?;
    Ok(CmdResult::message(CmdMessage::success(format!(
        "Billing rate for {} set to {} per gram",
        state.active_user().name,
        format_amount(rate)
    ))))
}

pub fn show_rate<B: StorageBackend>(state: &AppState<B>) -> Result<CmdResult> {
    Ok(CmdResult::message(CmdMessage::info(format!(
        "Billing rate for {}: {} per gram",
        state.active_user().name,
        format_amount(state.billing_rate())
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::model::NewEntry;
    use crate::store::mem_backend::MemBackend;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    #[test]
    fn estimate_multiplies_weight_by_rate() {
        let mut state = state();
        state
            .add_entry(NewEntry::new("default", "INV-2", 2.0, "Chain"))
            .unwrap();
        state
            .add_entry(NewEntry::new("default", "INV-1", 1.5, "Ring"))
            .unwrap();
        set_rate(&mut state, 100.0).unwrap();

        let result = estimate(&state).unwrap();
        let estimate = result.estimate.unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(estimate.lines.len(), 2);
        assert_eq!(estimate.lines[0].invoice_number, "INV-1");
        assert_eq!(estimate.lines[0].amount, 150.0);
        assert_eq!(estimate.total_weight, 3.5);
        assert_eq!(estimate.total_amount, 350.0);
        assert_eq!(format_amount(estimate.total_amount), "350.00");
    }

    #[test]
    fn missing_rate_warns() {
        let state = state();
        let result = estimate(&state).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert_eq!(result.estimate.unwrap().total_amount, 0.0);
    }

    #[test]
    fn rate_is_validated_and_reported() {
        let mut state = state();
        assert!(set_rate(&mut state, -5.0).is_err());
        set_rate(&mut state, 6250.0).unwrap();
        let shown = show_rate(&state).unwrap();
        assert!(shown.messages[0].content.contains("6250.00"));
    }
}

//! Terminal output for command results.
//!
//! Records are printed as fixed-width rows: a short id, the main columns and a relative
//! age. Messages follow, colored by level.

use chrono::{TimeZone, Utc};
use colored::Colorize;
use gramvaultapp::commands::billing::{format_amount, BillingEstimate};
use gramvaultapp::commands::{CmdMessage, MessageLevel, Record};
use gramvaultapp::model::DaiStatus;
use gramvaultapp::state::format_weight;
use std::time::Duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 8;
const TIME_WIDTH: usize = 14;
const WEIGHT_WIDTH: usize = 10;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        let styled = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        println!("{}", styled);
    }
}

/// Prints each record on one line. `current_user` marks the selected user in user lists.
pub fn print_records(records: &[Record], current_user: &str) {
    for record in records {
        println!("{}", format_record(record, current_user));
    }
}

pub fn format_record(record: &Record, current_user: &str) -> String {
    let id = short_id(record.id());
    match record {
        Record::Entry(entry) => {
            let marker = if entry.is_deleted { "x" } else { " " };
            let weight = format!("{} g", format_weight(entry.weight));
            let mut label = entry.invoice_number.clone();
            if !entry.description.is_empty() {
                label = format!("{}  {}", label, entry.description);
            }
            if let Some(category) = &entry.category {
                label = format!("{} [{}]", label, category);
            }
            let fixed = ID_WIDTH + 3 + WEIGHT_WIDTH + TIME_WIDTH + 2;
            format!(
                "{} {} {}{:>w$} {}",
                id.dimmed(),
                marker.red(),
                pad_to_width(&truncate_to_width(&label, LINE_WIDTH - fixed), LINE_WIDTH - fixed),
                weight,
                format_time_ago(entry.created_at).dimmed(),
                w = WEIGHT_WIDTH,
            )
        }
        Record::User(user) => {
            let marker = if user.id == current_user { "*" } else { " " };
            let mut details: Vec<&str> = Vec::new();
            details.extend(user.phone.as_deref());
            details.extend(user.email.as_deref());
            let name = if user.is_deleted() {
                format!("{} (deleted)", user.name)
            } else {
                user.name.clone()
            };
            format!(
                "{} {} {}  {}",
                id.dimmed(),
                marker.green(),
                name,
                details.join("  ").dimmed()
            )
        }
        Record::Dai(dai) => {
            let status = format!("{:<8}", dai.status.to_string());
            let status = match dai.status {
                DaiStatus::Waiting => status.yellow(),
                DaiStatus::Out => status.cyan(),
                DaiStatus::In => status.green(),
                DaiStatus::Trash => status.red(),
            };
            let label = format!("{}  {}  {}", dai.di_number, dai.date, dai.details);
            format!(
                "{} {} {}",
                id.dimmed(),
                status,
                truncate_to_width(&label, LINE_WIDTH - ID_WIDTH - 10)
            )
        }
        Record::Note(note) => format!(
            "{} {} {}",
            id.dimmed(),
            pad_to_width(&format_time_ago(note.timestamp), TIME_WIDTH).dimmed(),
            truncate_to_width(&first_line(&note.content), LINE_WIDTH - ID_WIDTH - TIME_WIDTH - 2)
        ),
        Record::Contact(contact) => {
            format!("{} {}  {}", id.dimmed(), contact.name, contact.number.bold())
        }
        Record::DaiImage(image) => {
            let title = if image.title.is_empty() {
                "(untitled)"
            } else {
                image.title.as_str()
            };
            format!(
                "{} {} {}",
                id.dimmed(),
                pad_to_width(&format_time_ago(image.timestamp), TIME_WIDTH).dimmed(),
                title
            )
        }
    }
}

pub fn print_estimate(estimate: &BillingEstimate) {
    println!(
        "{}",
        format!(
            "Billing for {} at {} per gram",
            estimate.user_name,
            format_amount(estimate.rate)
        )
        .bold()
    );
    for line in &estimate.lines {
        let label = if line.description.is_empty() {
            line.invoice_number.clone()
        } else {
            format!("{}  {}", line.invoice_number, line.description)
        };
        let width = LINE_WIDTH - WEIGHT_WIDTH - 16;
        println!(
            "{}{:>w$}{:>16}",
            pad_to_width(&truncate_to_width(&label, width), width),
            format!("{} g", format_weight(line.weight)),
            format_amount(line.amount),
            w = WEIGHT_WIDTH,
        );
    }
    println!(
        "{}",
        format!(
            "Total: {} g, {}",
            format_weight(estimate.total_weight),
            format_amount(estimate.total_amount)
        )
        .bold()
    );
}

fn short_id(id: &str) -> String {
    id.chars().take(ID_WIDTH).collect()
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

/// Truncates to `max` display columns, ending in `…` when shortened.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(pad))
}

/// Relative age of an epoch-millis timestamp, e.g. "5 minutes ago".
pub fn format_time_ago(millis: i64) -> String {
    let Some(then) = Utc.timestamp_millis_opt(millis).single() else {
        return String::new();
    };
    let elapsed = (Utc::now() - then).to_std().unwrap_or(Duration::ZERO);
    let mut formatter = timeago::Formatter::new();
    formatter.num_items(1);
    formatter.convert(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramvaultapp::model::{EmergencyContact, InventoryEntry, User};

    fn entry() -> InventoryEntry {
        InventoryEntry {
            id: "0123456789abcdef".to_string(),
            user_id: "default".to_string(),
            invoice_number: "INV-4".to_string(),
            weight: 3.5,
            description: "Chain".to_string(),
            category: None,
            quantity: None,
            date: None,
            photo: None,
            created_at: 0,
            is_deleted: false,
        }
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_to_width("ring", 10), "ring");
    }

    #[test]
    fn truncate_counts_display_columns() {
        let out = truncate_to_width("汉字汉字汉字", 7);
        assert!(out.ends_with('…'));
        assert!(out.width() <= 7);
    }

    #[test]
    fn entry_row_shows_short_id_and_weight() {
        colored::control::set_override(false);
        let row = format_record(&Record::Entry(entry()), "default");
        assert!(row.starts_with("01234567 "));
        assert!(row.contains("INV-4  Chain"));
        assert!(row.contains("3.5 g"));
    }

    #[test]
    fn current_user_is_marked() {
        colored::control::set_override(false);
        let user = User::new("Ravi");
        let row = format_record(&Record::User(user.clone()), &user.id);
        assert!(row.contains(" * Ravi"));
        let row = format_record(&Record::User(user), "someone-else");
        assert!(!row.contains('*'));
    }

    #[test]
    fn contact_row() {
        colored::control::set_override(false);
        let row = format_record(
            &Record::Contact(EmergencyContact::new("Police", "100")),
            "default",
        );
        assert!(row.contains("Police  100"));
    }
}

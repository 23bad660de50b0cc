use super::render::{print_estimate, print_messages, print_records};
use super::setup::{
    BackupCommands, Cli, Commands, ContactCommands, DaiCommands, EntryCommands, ImageCommands,
    NoteCommands, SettingsCommands, TrashCommands, UserCommands,
};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use gramvaultapp::api::{DaiEdit, EntityKind, EntryEdit, EntryFilter, GramVaultApi};
use gramvaultapp::commands::CmdResult;
use gramvaultapp::config::GramVaultConfig;
use gramvaultapp::confirm::{AssumeYes, Confirm, Prompt};
use gramvaultapp::model::{DaiStatus, NewDaiEntry, NewEntry, UserUpdate};
use gramvaultapp::state::AppState;
use gramvaultapp::store::fs_backend::FsBackend;
use std::io::{self, BufRead, Write};

struct AppContext {
    api: GramVaultApi<FsBackend>,
}

impl AppContext {
    fn current_user(&self) -> String {
        self.api.state().current_user_id().to_string()
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut ctx = init_context(&cli)?;

    match cli.command {
        None => handle_entry_list(&mut ctx, EntryFilter::Active),
        Some(Commands::Entry { action }) => handle_entry(&mut ctx, action),
        Some(Commands::Total) => handle_simple(ctx.api.total()),
        Some(Commands::Bill) => handle_bill(&mut ctx),
        Some(Commands::Rate { value }) => match value {
            Some(rate) => handle_simple(ctx.api.set_rate(rate)),
            None => handle_simple(ctx.api.show_rate()),
        },
        Some(Commands::User { action }) => handle_user(&mut ctx, action),
        Some(Commands::Dai { action }) => handle_dai(&mut ctx, action),
        Some(Commands::Trash { action }) => handle_trash(&mut ctx, action),
        Some(Commands::Note { action }) => handle_note(&mut ctx, action),
        Some(Commands::Contact { action }) => handle_contact(&mut ctx, action),
        Some(Commands::Image { action }) => handle_image(&mut ctx, action),
        Some(Commands::Backup { action }) => handle_backup(&mut ctx, action),
        Some(Commands::Settings { action }) => match action {
            None | Some(SettingsCommands::Show) => handle_simple(ctx.api.show_settings()),
            Some(SettingsCommands::Titles { primary, secondary }) => {
                handle_simple(ctx.api.set_titles(primary, secondary))
            }
        },
        Some(Commands::Theme { theme }) => handle_simple(ctx.api.theme(theme.map(Into::into))),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_file = cli
        .config
        .clone()
        .or_else(GramVaultConfig::default_config_file);
    let mut config =
        GramVaultConfig::load(config_file.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    let data_dir = config.data_dir();
    log::debug!("using data directory {}", data_dir.display());
    let state = AppState::load(FsBackend::new(&data_dir))
        .with_context(|| format!("Failed to open data in {}", data_dir.display()))?;

    Ok(AppContext {
        api: GramVaultApi::new(state, config.backup_dir()),
    })
}

/// Prints the messages of a command that lists nothing.
fn handle_simple(result: gramvaultapp::error::Result<CmdResult>) -> Result<()> {
    print_messages(&result?.messages);
    Ok(())
}

fn print_listing(ctx: &AppContext, result: &CmdResult) {
    print_records(&result.listed, &ctx.current_user());
    print_messages(&result.messages);
}

fn handle_entry(ctx: &mut AppContext, action: EntryCommands) -> Result<()> {
    match action {
        EntryCommands::Add {
            invoice,
            weight,
            description,
            category,
            quantity,
            date,
        } => {
            let new_entry = NewEntry {
                category,
                quantity,
                date,
                ..NewEntry::new(ctx.current_user(), invoice, weight, description.join(" "))
            };
            handle_simple(ctx.api.add_entry(new_entry))
        }
        EntryCommands::List { deleted, all } => {
            let filter = if all {
                EntryFilter::All
            } else if deleted {
                EntryFilter::Trashed
            } else {
                EntryFilter::Active
            };
            handle_entry_list(ctx, filter)
        }
        EntryCommands::Edit {
            id,
            invoice,
            weight,
            description,
            category,
            quantity,
            date,
        } => {
            let edit = EntryEdit {
                invoice_number: invoice,
                weight,
                description,
                category,
                quantity,
                date,
                ..EntryEdit::new(id)
            };
            handle_simple(ctx.api.edit_entry(edit))
        }
        EntryCommands::Delete { ids } => handle_simple(ctx.api.delete(EntityKind::Entry, &ids)),
        EntryCommands::Restore { ids } => handle_simple(ctx.api.restore(EntityKind::Entry, &ids)),
        EntryCommands::Purge { ids } => handle_simple(ctx.api.purge(EntityKind::Entry, &ids)),
    }
}

fn handle_entry_list(ctx: &mut AppContext, filter: EntryFilter) -> Result<()> {
    let result = ctx.api.list_entries(filter)?;
    print_listing(ctx, &result);
    Ok(())
}

fn handle_bill(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.bill()?;
    print_messages(&result.messages);
    if let Some(estimate) = &result.estimate {
        print_estimate(estimate);
    }
    Ok(())
}

fn handle_user(ctx: &mut AppContext, action: UserCommands) -> Result<()> {
    match action {
        UserCommands::Add { name } => handle_simple(ctx.api.add_user(&name.join(" "))),
        UserCommands::List => {
            let result = ctx.api.list_users()?;
            print_listing(ctx, &result);
            Ok(())
        }
        UserCommands::Select { id } => handle_simple(ctx.api.select_user(&id)),
        UserCommands::Edit {
            id,
            name,
            phone,
            address,
            email,
            photo,
        } => {
            let update = UserUpdate {
                name,
                phone,
                address,
                email,
                photo,
                ..UserUpdate::new(id)
            };
            handle_simple(ctx.api.edit_user(update))
        }
        UserCommands::Delete { ids } => handle_simple(ctx.api.delete(EntityKind::User, &ids)),
        UserCommands::Restore { ids } => handle_simple(ctx.api.restore(EntityKind::User, &ids)),
        UserCommands::Purge { ids } => handle_simple(ctx.api.purge(EntityKind::User, &ids)),
    }
}

fn handle_dai(ctx: &mut AppContext, action: DaiCommands) -> Result<()> {
    match action {
        DaiCommands::Add {
            di_number,
            date,
            details,
        } => {
            let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            handle_simple(
                ctx.api
                    .add_dai(NewDaiEntry::new(di_number, date, details.join(" "))),
            )
        }
        DaiCommands::List { status } => {
            let result = ctx.api.list_dai(status.map(Into::into))?;
            print_listing(ctx, &result);
            Ok(())
        }
        DaiCommands::Out { ids } => set_status(ctx, &ids, DaiStatus::Out),
        DaiCommands::In { ids } => set_status(ctx, &ids, DaiStatus::In),
        DaiCommands::Wait { ids } => set_status(ctx, &ids, DaiStatus::Waiting),
        DaiCommands::Edit {
            id,
            di_number,
            date,
            details,
        } => {
            let edit = DaiEdit {
                di_number,
                date,
                details,
                ..DaiEdit::new(id)
            };
            handle_simple(ctx.api.edit_dai(edit))
        }
        DaiCommands::Delete { ids } => handle_simple(ctx.api.delete(EntityKind::Dai, &ids)),
        DaiCommands::Restore { ids } => handle_simple(ctx.api.restore(EntityKind::Dai, &ids)),
        DaiCommands::Purge { ids } => handle_simple(ctx.api.purge(EntityKind::Dai, &ids)),
    }
}

fn set_status(ctx: &mut AppContext, ids: &[String], status: DaiStatus) -> Result<()> {
    for id in ids {
        handle_simple(ctx.api.set_dai_status(id, status))?;
    }
    Ok(())
}

fn handle_trash(ctx: &mut AppContext, action: Option<TrashCommands>) -> Result<()> {
    match action {
        None | Some(TrashCommands::List) => {
            let result = ctx.api.list_trash()?;
            print_listing(ctx, &result);
            Ok(())
        }
        Some(TrashCommands::Empty { yes }) => {
            let result = if yes {
                ctx.api.empty_trash(&mut AssumeYes)?
            } else {
                ctx.api.empty_trash(&mut TerminalConfirm)?
            };
            print_messages(&result.messages);
            Ok(())
        }
    }
}

fn handle_note(ctx: &mut AppContext, action: NoteCommands) -> Result<()> {
    match action {
        NoteCommands::Add { text } => handle_simple(ctx.api.add_note(&text.join(" "))),
        NoteCommands::List => {
            let result = ctx.api.list_notes()?;
            print_listing(ctx, &result);
            Ok(())
        }
        NoteCommands::Remove { id } => handle_simple(ctx.api.remove_note(&id)),
    }
}

fn handle_contact(ctx: &mut AppContext, action: ContactCommands) -> Result<()> {
    match action {
        ContactCommands::Add { name, number } => {
            handle_simple(ctx.api.add_contact(&name, &number))
        }
        ContactCommands::List => {
            let result = ctx.api.list_contacts()?;
            print_listing(ctx, &result);
            Ok(())
        }
        ContactCommands::Remove { id } => handle_simple(ctx.api.remove_contact(&id)),
    }
}

fn handle_image(ctx: &mut AppContext, action: ImageCommands) -> Result<()> {
    match action {
        ImageCommands::Add { url, title } => {
            handle_simple(ctx.api.add_dai_image(&url, &title.join(" ")))
        }
        ImageCommands::List => {
            let result = ctx.api.list_dai_images()?;
            print_listing(ctx, &result);
            Ok(())
        }
    }
}

fn handle_backup(ctx: &mut AppContext, action: BackupCommands) -> Result<()> {
    match action {
        BackupCommands::Export { output } => handle_simple(ctx.api.export_backup(output.as_deref())),
        BackupCommands::Import { file, yes } => {
            let result = if yes {
                ctx.api.import_backup(&file, &mut AssumeYes)
            } else {
                ctx.api.import_backup(&file, &mut TerminalConfirm)
            }
            .with_context(|| format!("Failed to import {}", file.display()))?;
            print_messages(&result.messages);
            Ok(())
        }
    }
}

/// Asks on stdin. Anything other than y/yes, including EOF, declines.
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        println!("{}", prompt.title);
        for detail in &prompt.details {
            println!("  {}", detail);
        }
        print!("Continue? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

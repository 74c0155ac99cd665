use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{ChatlensError, Result};
use crate::markdown::MarkdownRenderer;
use crate::metrics::ReportZone;
use crate::session::{ChatMessage, ChatSession, Role};
use crate::storage::SessionSummary;
use colored::Colorize;
use prettytable::{format, Table};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let storage = config.open_storage()?;
    let zone = config.report_zone()?;

    match command {
        HistoryCommand::List => {
            let sessions = storage.list_sessions()?;

            if sessions.is_empty() {
                println!("{}", "No chat history found.".yellow());
                return Ok(());
            }

            println!("\nChat History:");
            session_table(&sessions).printstd();
            println!();
            println!(
                "Use {} to read a session.",
                "chatlens history show <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id, plain } => {
            let session = storage
                .load_session(&id)?
                .ok_or_else(|| ChatlensError::NotFound(format!("session {}", id)))?;

            let renderer = if plain {
                MarkdownRenderer::plain()
            } else {
                MarkdownRenderer::styled()
            };
            print!("{}", render_session(&session, &renderer, zone));
        }
        HistoryCommand::Delete { id } => {
            let removed = storage.delete_session(&id)?;
            if removed == 0 {
                println!("{}", format!("No session matching {}", id).yellow());
            } else {
                println!("{}", format!("Deleted session {}", id).green());
            }
        }
        HistoryCommand::Import { path } => {
            let imported = storage.import_json(&path)?;
            println!(
                "{}",
                format!("Imported {} sessions from {}", imported, path.display()).green()
            );
        }
        HistoryCommand::Export { path } => {
            let exported = storage.export_json(&path)?;
            println!(
                "{}",
                format!("Exported {} sessions to {}", exported, path.display()).green()
            );
        }
    }

    Ok(())
}

/// Listing table, one row per stored session
pub fn session_table(sessions: &[SessionSummary]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Preview".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let id_short: String = session.id.chars().take(8).collect();
        let preview = if session.preview.is_empty() {
            "-".to_string()
        } else {
            session.preview.clone()
        };
        let updated = session
            .updated_at
            .with_timezone(&chrono::Local)
            .format(TIME_FORMAT)
            .to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            preview,
            session.message_count,
            updated
        ]);
    }

    table
}

/// Transcript of a session, one block per message
pub fn render_session(
    session: &ChatSession,
    renderer: &MarkdownRenderer,
    zone: ReportZone,
) -> String {
    let mut out = String::new();
    for message in &session.messages {
        out.push_str(&message_header(message, zone));
        out.push('\n');
        out.push_str(&renderer.render(&message.content));
        out.push_str("\n\n");
    }
    out
}

fn message_header(message: &ChatMessage, zone: ReportZone) -> String {
    let time = zone.format_millis(message.timestamp, TIME_FORMAT);
    match message.role {
        Role::User => format!("{} {}", "You".cyan().bold(), time.dimmed()),
        Role::Assistant => format!("{} {}", "Assistant".green().bold(), time.dimmed()),
    }
}

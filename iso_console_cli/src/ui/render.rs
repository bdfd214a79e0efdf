use crossterm::style::{StyledContent, Stylize};
use iso_console_core::api::ConnectionRecord;
use iso_console_core::{ActivityLogEntry, LogKind, PresentationAdapter};

/// Draws console state to stdout.
///
/// Polls replace the snapshot every few seconds; the table is only reprinted
/// when its content actually changed.
#[derive(Default)]
pub struct TerminalView {
    last_rendered: Option<Vec<ConnectionRecord>>,
}

impl PresentationAdapter for TerminalView {
    fn render_connections(&mut self, snapshot: &[ConnectionRecord]) {
        if self.last_rendered.as_deref() == Some(snapshot) {
            return;
        }
        println!("{}", connections_table(snapshot));
        self.last_rendered = Some(snapshot.to_vec());
    }

    fn render_log_entry(&mut self, entry: &ActivityLogEntry) {
        println!("{}", log_line(entry));
    }

    fn render_log_cleared(&mut self, entry: &ActivityLogEntry) {
        println!("{}", "─".repeat(40).dark_grey());
        println!("{}", log_line(entry));
    }

    fn render_log_resync(&mut self, entries: &[ActivityLogEntry]) {
        println!("{}", "Display fell behind, full activity log follows:".yellow());
        for entry in entries {
            println!("{}", log_line(entry));
        }
    }
}

fn styled_message(entry: &ActivityLogEntry) -> StyledContent<&str> {
    let message = entry.message.as_str();
    match entry.kind {
        LogKind::Info => message.white(),
        LogKind::Success => message.green(),
        LogKind::Error => message.red().bold(),
        LogKind::Request => message.cyan(),
        LogKind::Response => message.magenta(),
    }
}

pub fn log_line(entry: &ActivityLogEntry) -> String {
    format!(
        "{} {}",
        format!("[{}]", entry.formatted_timestamp()).dark_grey(),
        styled_message(entry)
    )
}

fn status(record: &ConnectionRecord) -> &'static str {
    if record.connected {
        "Connected"
    } else {
        "Disconnected"
    }
}

/// Plain-text table of the snapshot, one row per connection.
pub fn connections_table(records: &[ConnectionRecord]) -> String {
    if records.is_empty() {
        return "No connections yet. Add one with `add <id> <host> <port>`.".to_string();
    }
    let id_width = records
        .iter()
        .map(|r| r.connection_id.len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    let addr_width = records
        .iter()
        .map(|r| r.host.len() + 1 + r.port.to_string().len())
        .max()
        .unwrap_or(0)
        .max("ENDPOINT".len());

    let mut out = format!("{:<id_width$}  {:<addr_width$}  STATUS", "ID", "ENDPOINT");
    for record in records {
        let endpoint = format!("{}:{}", record.host, record.port);
        out.push('\n');
        out.push_str(&format!(
            "{:<id_width$}  {:<addr_width$}  {}",
            record.connection_id,
            endpoint,
            status(record)
        ));
    }
    out
}

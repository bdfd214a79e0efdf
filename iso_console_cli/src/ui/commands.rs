use clap::{Parser, Subcommand};

/// One line typed at the console prompt.
#[derive(Parser, Debug)]
#[command(name = "iso-console", no_binary_name = true, disable_version_flag = true)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    /// Show the last known connection list
    #[command(alias = "ls")]
    List,
    /// Re-fetch the connection list now
    Refresh,
    /// Register a new connection with the backend
    Add {
        connection_id: String,
        host: String,
        /// Checked by the console, so typos are reported rather than rejected here
        port: String,
    },
    /// Remove a connection (asks for confirmation)
    #[command(alias = "rm")]
    Remove {
        connection_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open the connection's socket on the backend
    Connect { connection_id: String },
    /// Close the connection's socket on the backend
    Disconnect { connection_id: String },
    /// Pick the target for `echo`, `send` and `sample`
    Select { connection_id: String },
    /// Send a network management echo to the selected connection
    Echo,
    /// Send a raw message to the selected connection
    Send {
        #[arg(
            value_name = "TEXT",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        words: Vec<String>,
        /// Everything after the keyword, spacing included.
        #[arg(skip)]
        text: String,
    },
    /// List the built-in sample messages
    Samples,
    /// Send a built-in sample message to the selected connection
    Sample { key: String },
    /// Print the whole activity log
    Log,
    /// Clear the activity log
    Clear,
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

/// `Ok(None)` for a blank line. Help requests come back as a `clap::Error`
/// whose `Display` is the help text.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, clap::Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut command = ReplLine::try_parse_from(tokens)?.command;
    if let ReplCommand::Send { text, .. } = &mut command {
        // Fixed-width fields are space padded, so the tokens cannot be rejoined.
        *text = text_after_keyword(line).to_string();
    }
    Ok(Some(command))
}

fn text_after_keyword(line: &str) -> &str {
    let line = line.trim_start();
    let keyword_end = line.find(char::is_whitespace).unwrap_or(line.len());
    line[keyword_end..].trim_start()
}

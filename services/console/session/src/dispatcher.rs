//! Command parsing for console input lines.
//!
//! A line is preprocessed (leading spaces and tabs stripped, trailing
//! CR/LF stripped) and then matched against the fixed command vocabulary.
//! Matching is case-sensitive and exact, except the `tc ` prefix which
//! carries the parameter name as its argument.

/// The input cursor shown after every non-terminal response.
pub const CURSOR: &str = "> ";

/// Fixed help text for `?` / `h` / `help`.
pub const HELP_TEXT: &str = concat!(
    "\n",
    "  ?, h, help - print this text\n\n",
    "  quit, q, exit, bye - end CLI session\n\n",
    "  stop, shutdown, halt - shutdown Relay Server\n\n",
    "  pc - print configuration\n\n",
    "  tc <param-name> - toggle configuration parameter\n",
    "     (see pc command output for 'toggleable' param names)\n\n"
);

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Whitespace-only input; redisplay the cursor and nothing else
    Empty,
    /// End the session
    Quit,
    /// Shut the whole relay process down
    Shutdown,
    /// Print the help text
    Help,
    /// Print the configuration snapshot
    PrintConfig,
    /// Toggle the named parameter
    Toggle(&'a str),
    /// Anything else
    Unknown,
}

/// Strip leading spaces/tabs and trailing CR/LF from an input line.
pub fn trim_line(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
        .trim_end_matches(['\r', '\n'])
}

impl<'a> Command<'a> {
    /// Parse an already-trimmed line into a command, in priority order.
    pub fn parse(line: &'a str) -> Self {
        if line.is_empty() {
            return Command::Empty;
        }
        match line {
            "bye" | "quit" | "exit" | "q" => Command::Quit,
            "halt" | "shutdown" | "stop" => Command::Shutdown,
            "?" | "h" | "help" => Command::Help,
            "pc" => Command::PrintConfig,
            _ => match line.strip_prefix("tc ") {
                Some(param) => Command::Toggle(param),
                None => Command::Unknown,
            },
        }
    }
}

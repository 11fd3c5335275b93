//! Slash-command parsing for the transport layer.

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Join { category: String },
    Leave { category: String },
    Done { category: String },
    Confirm { category: String },
    Reject { category: String },
    AddUser { username: String, category: String },
    RemoveUser { username: String, category: String },
}

/// Usage text shown for `/help` and unrecognized commands.
pub const HELP_TEXT: &str = "Commands:\n\
    /join <category> — join a rotation\n\
    /leave <category> — leave a rotation\n\
    /done <category> — mark your duty as done (head only)\n\
    /confirm <category> — supervisor: confirm completion, advance rotation\n\
    /reject <category> — supervisor: reject a pending claim\n\
    /adduser <name> <category> — supervisor: add a participant by name\n\
    /removeuser <name> <category> — supervisor: remove a participant by name\n\
    /status — show all queues";

/// Parse a message text.
///
/// Returns `None` for plain chatter (no leading `/`), and `Some(Err(usage))`
/// for a recognized command with the wrong argument count. Telegram appends
/// `@botname` to commands in groups; that suffix is stripped.
pub fn parse(text: &str) -> Option<Result<Command, &'static str>> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    let mut words = text.split_whitespace();
    let command = words.next()?;
    let command = command.split('@').next().unwrap_or(command);
    let args: Vec<&str> = words.collect();

    let one = |make: fn(String) -> Command, usage| match args.as_slice() {
        [category] => Ok(make((*category).to_string())),
        _ => Err(usage),
    };

    let parsed = match command {
        "/start" => Ok(Command::Start),
        "/help" => Ok(Command::Help),
        "/status" | "/show" => Ok(Command::Status),
        "/join" => one(|category| Command::Join { category }, "Usage: /join <category>"),
        "/leave" => one(|category| Command::Leave { category }, "Usage: /leave <category>"),
        "/done" => one(|category| Command::Done { category }, "Usage: /done <category>"),
        "/confirm" => one(
            |category| Command::Confirm { category },
            "Usage: /confirm <category>",
        ),
        "/reject" => one(
            |category| Command::Reject { category },
            "Usage: /reject <category>",
        ),
        "/adduser" => match args.as_slice() {
            [username, category] => Ok(Command::AddUser {
                username: (*username).to_string(),
                category: (*category).to_string(),
            }),
            _ => Err("Usage: /adduser <name> <category>"),
        },
        "/removeuser" => match args.as_slice() {
            [username, category] => Ok(Command::RemoveUser {
                username: (*username).to_string(),
                category: (*category).to_string(),
            }),
            _ => Err("Usage: /removeuser <name> <category>"),
        },
        _ => Err("Unknown command. /help lists the available commands."),
    };
    Some(parsed)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Noop,
    Stop,
    List,
    Kick(u64),
    Help,
    InvalidUsage(String),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Noop;
    }

    let input = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if input.is_empty() {
        return Command::Noop;
    }

    let mut head_tail = input.splitn(2, char::is_whitespace);
    let command = head_tail.next().unwrap_or_default().to_ascii_lowercase();
    let rest = head_tail.next().unwrap_or("").trim();

    match command.as_str() {
        "stop" => Command::Stop,
        "list" => Command::List,
        "kick" => match rest.parse::<u64>() {
            Ok(client_id) => Command::Kick(client_id),
            Err(_) => Command::InvalidUsage("Usage: /kick <client id>".to_string()),
        },
        "help" => Command::Help,
        _ => Command::Unknown(input.to_string()),
    }
}

//! Shell input parsing
//!
//! Plain text goes to the chat; slash commands drive the itinerary. Place
//! numbers are 1-based positions in the `/places` listing.

use crate::domain::Algorithm;
use crate::roles::Anchor;

/// One parsed line of shell input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Places,
    Result,
    Session,
    Chat(String),
    Find {
        business_type: String,
        location: String,
        count: Option<u32>,
    },
    Add {
        name: String,
        address: String,
    },
    Remove(usize),
    Move {
        from: usize,
        to: usize,
    },
    /// Toggle `anchor` on place number `index`
    Role {
        anchor: Anchor,
        index: usize,
    },
    Optimize {
        algo: Option<Algorithm>,
        return_to_start: Option<bool>,
    },
    Apply,
    Discard,
}

fn position(arg: Option<&str>, usage: &str) -> Result<usize, String> {
    let raw = arg.ok_or_else(|| format!("Usage: {}", usage))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{}' is not a place number", raw)),
    }
}

/// Parse one non-empty line
pub fn parse(input: &str) -> Result<Command, String> {
    let input = input.trim();
    if !input.starts_with('/') {
        return Ok(Command::Chat(input.to_string()));
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    let cmd = parts.first().copied().unwrap_or("");
    let args = &parts[1..];

    match cmd {
        "/help" | "/h" => Ok(Command::Help),
        "/quit" | "/q" | "/exit" => Ok(Command::Quit),
        "/places" | "/p" | "/ls" => Ok(Command::Places),
        "/result" => Ok(Command::Result),
        "/session" => Ok(Command::Session),
        "/find" => parse_find(args),
        "/add" => parse_add(input.trim_start_matches("/add")),
        "/remove" | "/rm" => Ok(Command::Remove(position(args.first().copied(), "/remove <n>")?)),
        "/move" | "/mv" => Ok(Command::Move {
            from: position(args.first().copied(), "/move <from> <to>")?,
            to: position(args.get(1).copied(), "/move <from> <to>")?,
        }),
        "/start" | "/end" => {
            let anchor = if cmd == "/start" { Anchor::Start } else { Anchor::End };
            let usage = format!("{} <n>", cmd);
            Ok(Command::Role {
                anchor,
                index: position(args.first().copied(), &usage)?,
            })
        }
        "/optimize" | "/opt" => parse_optimize(args),
        "/apply" => Ok(Command::Apply),
        "/discard" | "/clear" => Ok(Command::Discard),
        _ => Err(format!("Unknown command: {}", cmd)),
    }
}

/// `/find <type> <location...> [count]`
fn parse_find(args: &[&str]) -> Result<Command, String> {
    const USAGE: &str = "Usage: /find <type> <location> [count]";
    let (business_type, rest) = args.split_first().ok_or(USAGE)?;

    let (location, count) = match rest.split_last() {
        Some((last, head)) if !head.is_empty() && last.parse::<u32>().is_ok() => {
            (head.join(" "), last.parse::<u32>().ok())
        }
        _ => (rest.join(" "), None),
    };
    if location.is_empty() {
        return Err(USAGE.to_string());
    }

    Ok(Command::Find {
        business_type: business_type.to_string(),
        location,
        count,
    })
}

/// `/add <name> | <address>`
fn parse_add(rest: &str) -> Result<Command, String> {
    let (name, address) = rest
        .split_once('|')
        .ok_or("Usage: /add <name> | <address>")?;
    Ok(Command::Add {
        name: name.trim().to_string(),
        address: address.trim().to_string(),
    })
}

/// `/optimize [nn|nn2opt|ga] [loop|noloop]`
fn parse_optimize(args: &[&str]) -> Result<Command, String> {
    let mut algo = None;
    let mut return_to_start = None;
    for arg in args {
        match *arg {
            "loop" => return_to_start = Some(true),
            "noloop" => return_to_start = Some(false),
            other => algo = Some(other.parse::<Algorithm>()?),
        }
    }
    Ok(Command::Optimize { algo, return_to_start })
}

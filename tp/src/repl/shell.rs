//! Interactive planning shell

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast;
use tracing::debug;

use super::commands::{self, Command};
use super::render;
use crate::config::PlannerConfig;
use crate::domain::Place;
use crate::planner::{Intent, Notice, Outcome, Planner};
use crate::roles::{self, Anchor};

/// Interactive shell bound to one planning session
pub struct ReplSession {
    planner: Planner,
    defaults: PlannerConfig,
    notices: broadcast::Receiver<Notice>,
}

impl ReplSession {
    pub fn new(planner: Planner, defaults: PlannerConfig) -> Self {
        let notices = planner.subscribe_notices();
        Self {
            planner,
            defaults,
            notices,
        }
    }

    /// Run the shell main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome().await;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match commands::parse(input) {
                        Ok(command) => {
                            if let SlashResult::Quit = self.handle(command).await? {
                                break;
                            }
                        }
                        Err(message) => {
                            println!("{} {}", "?".yellow(), message);
                            println!("Type {} for available commands", "/help".yellow());
                        }
                    }
                    self.print_notices();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        // Let pending reorder confirmations land before the store goes away
        self.planner.shutdown().await;
        self.print_notices();
        println!("Goodbye!");
        Ok(())
    }

    async fn print_welcome(&self) {
        println!();
        println!("{}", "Trip Planner".bright_cyan().bold());
        match self.planner.session_id().await {
            Some(id) => println!("Session: {}", id.dimmed()),
            None => println!("{}", "No session yet - your first message starts one.".dimmed()),
        }
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:34} Chat with the planner", "<text>".yellow());
        println!("  {:34} Show the itinerary", "/places".yellow());
        println!("  {:34} Search and add places", "/find <type> <location> [count]".yellow());
        println!("  {:34} Geocode and add a place", "/add <name> | <address>".yellow());
        println!("  {:34} Remove place n", "/remove <n>".yellow());
        println!("  {:34} Move place from one position to another", "/move <from> <to>".yellow());
        println!("  {:34} Toggle place n as start point", "/start <n>".yellow());
        println!("  {:34} Toggle place n as end point", "/end <n>".yellow());
        println!("  {:34} Optimize the route", "/optimize [nn|nn2opt|ga] [loop|noloop]".yellow());
        println!("  {:34} Show the last optimization", "/result".yellow());
        println!("  {:34} Use the optimized order as itinerary", "/apply".yellow());
        println!("  {:34} Dismiss the optimization", "/discard".yellow());
        println!("  {:34} Show the session id", "/session".yellow());
        println!("  {:34} Exit the shell", "/quit".yellow());
        println!();
    }

    fn print_notices(&mut self) {
        loop {
            match self.notices.try_recv() {
                Ok(notice) => println!("{}", render::notice(&notice)),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    debug!(skipped = n, "print_notices: lagged");
                }
                Err(_) => break,
            }
        }
    }

    async fn print_places(&self) -> Result<()> {
        let snapshot = self.planner.snapshot().await?;
        print!("{}", render::itinerary(&snapshot.data));
        Ok(())
    }

    async fn print_result(&self) -> Result<()> {
        match self.planner.snapshot().await?.result {
            Some(result) => print!("{}", render::result(&result)),
            None => println!("{}", "No optimization result.".dimmed()),
        }
        Ok(())
    }

    /// Place at `index` in the current list
    async fn place_at(&self, index: usize) -> Result<Option<Place>> {
        let data = self.planner.snapshot().await?.data;
        let place = data.places.get(index).cloned();
        if place.is_none() {
            println!("{} No place number {}", "?".yellow(), index + 1);
        }
        Ok(place)
    }

    async fn handle(&mut self, command: Command) -> Result<SlashResult> {
        debug!(?command, "handle: called");
        let intent = match command {
            Command::Help => {
                self.print_help();
                return Ok(SlashResult::Continue);
            }
            Command::Quit => return Ok(SlashResult::Quit),
            Command::Places => {
                self.print_places().await?;
                return Ok(SlashResult::Continue);
            }
            Command::Result => {
                self.print_result().await?;
                return Ok(SlashResult::Continue);
            }
            Command::Session => {
                match self.planner.session_id().await {
                    Some(id) => println!("Session: {}", id),
                    None => println!("{}", "No session yet.".dimmed()),
                }
                return Ok(SlashResult::Continue);
            }
            Command::Chat(query) => Intent::Chat { query },
            Command::Find {
                business_type,
                location,
                count,
            } => Intent::FindPlaces {
                business_type,
                location,
                count: count.unwrap_or(self.defaults.find_count),
            },
            Command::Add { name, address } => Intent::AddCustomPlace { name, address },
            Command::Remove(index) => {
                let Some(place) = self.place_at(index).await? else {
                    return Ok(SlashResult::Continue);
                };
                let Some(place_id) = place.id else {
                    println!("{} {} has not been stored yet", "?".yellow(), place.name);
                    return Ok(SlashResult::Continue);
                };
                Intent::RemovePlace { place_id }
            }
            Command::Move { from, to } => Intent::Reorder { from, to },
            Command::Role { anchor, index } => {
                let Some(place) = self.place_at(index).await? else {
                    return Ok(SlashResult::Continue);
                };
                let data = self.planner.snapshot().await?.data;
                let has_role = match anchor {
                    Anchor::Start => roles::is_start(&data, &place),
                    Anchor::End => roles::is_end(&data, &place),
                };
                Intent::ToggleRole {
                    place,
                    role: anchor,
                    checked: !has_role,
                }
            }
            Command::Optimize { algo, return_to_start } => {
                let algo = algo.unwrap_or(self.defaults.algorithm);
                println!("{}", format!("Optimizing with {}...", algo.label()).dimmed());
                Intent::Optimize {
                    algo,
                    return_to_start: return_to_start.unwrap_or(self.defaults.return_to_start),
                }
            }
            Command::Apply => Intent::ApplyResult,
            Command::Discard => Intent::DiscardResult,
        };

        let shows_result = matches!(intent, Intent::Optimize { .. });
        match self.planner.dispatch(intent).await {
            Outcome::Replied { message, notice } => {
                if !message.is_empty() {
                    println!("{} {}", "Planner:".bright_blue(), message);
                }
                if notice.is_some() {
                    self.print_places().await?;
                }
            }
            Outcome::Applied(_) if shows_result => self.print_result().await?,
            Outcome::Applied(_) => self.print_places().await?,
            Outcome::Skipped(reason) => println!("{} {}", "!".yellow(), reason),
            // Notice printed from the broadcast
            Outcome::Failed(_) => {}
        }
        Ok(SlashResult::Continue)
    }
}

/// Result of handling a command
enum SlashResult {
    Continue,
    Quit,
}

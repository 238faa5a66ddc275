//! Chat command dispatch.
//!
//! Maps `/command args` text onto the reporting facade. Report failures are
//! turned into a short reply; nothing here returns an error.

use crate::reporting::{ReportKind, ReportingFacade};
use fantasy_rust_core::error::ReportError;
use std::sync::Arc;
use tracing::{info, warn};

pub const WELCOME_TEXT: &str = "Welcome to CoachBot! Use /help to see available commands.";

pub const HELP_TEXT: &str = "Available commands:\n\
/scores - Get current scores\n\
/standings - Get league standings\n\
/team <team> - View team's roster and points\n\
/whohas <player> - Check which team has a player\n\
/monitor - Get players to monitor\n\
/finalscore - Get final score report\n\
/mondaynight - Get close games for Monday night\n\
/matchup - Get matchups for this week";

pub const UNKNOWN_COMMAND_TEXT: &str = "Unknown command. Use /help to see available commands.";

/// Split `/Command@bot rest of line` into (`command`, `rest of line`).
/// Returns `None` for text that is not a command.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;

    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let command = head.split('@').next().unwrap_or_default().to_lowercase();
    if command.is_empty() {
        return None;
    }
    Some((command, args.to_string()))
}

pub struct CommandHandler {
    facade: Arc<ReportingFacade>,
}

impl CommandHandler {
    pub fn new(facade: Arc<ReportingFacade>) -> Self {
        Self { facade }
    }

    /// Reply text for one chat message. Non-command text gets `None`.
    pub async fn handle(&self, text: &str) -> Option<String> {
        let (command, args) = parse_command(text)?;
        info!("Handling command /{}", command);

        let reply = match command.as_str() {
            "start" => WELCOME_TEXT.to_string(),
            "help" => HELP_TEXT.to_string(),
            "scores" => reply(
                self.facade.render(ReportKind::Scoreboard).await,
                "fetching scores",
            ),
            "standings" => reply(
                self.facade.render(ReportKind::Standings).await,
                "fetching standings",
            ),
            "whohas" => {
                if args.is_empty() {
                    "Please provide a player name. Usage: /whohas <player name>".to_string()
                } else {
                    reply(self.facade.who_has(&args).await, "checking who has player")
                }
            }
            "monitor" => reply(
                self.facade.render(ReportKind::PlayersToMonitor).await,
                "fetching players to monitor",
            ),
            "finalscore" => reply(
                self.facade.render(ReportKind::FinalScores).await,
                "generating final score report",
            ),
            "mondaynight" => reply(
                self.facade.render(ReportKind::CloseGames).await,
                "generating Monday night close games report",
            ),
            "matchup" => reply(
                self.facade.render(ReportKind::Matchups).await,
                "generating matchups report",
            ),
            "team" => {
                if args.is_empty() {
                    "Please provide a team name. Usage: /team <team name>".to_string()
                } else {
                    reply(self.facade.team_roster(&args).await, "getting team roster")
                }
            }
            _ => UNKNOWN_COMMAND_TEXT.to_string(),
        };

        Some(reply)
    }
}

fn reply(result: Result<String, ReportError>, doing: &str) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("Command failed while {}: {}", doing, e);
            format!("Error {doing}: {e}")
        }
    }
}

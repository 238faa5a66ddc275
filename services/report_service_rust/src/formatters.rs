//! Report text rendering.
//!
//! Every function here is pure: plain data in, Markdown text out. Empty
//! inputs render a placeholder line instead of an empty report.

use fantasy_rust_core::models::{
    CloseGame, FinalScoreReport, PlayersToMonitorReport, RosterPlayer, RosterView, TeamStanding,
    TrophyCategory, WhoHasResult,
};

/// One matchup line for the scoreboard and preview reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLine {
    pub home_team: String,
    pub away_team: String,
    pub home_score: f64,
    pub away_score: f64,
    pub home_projected: f64,
    pub away_projected: f64,
    pub is_completed: bool,
}

pub fn format_standings(standings: &[TeamStanding]) -> String {
    let mut out = String::new();
    out.push_str("🏆 *Current Standings*\n\n");

    if standings.is_empty() {
        out.push_str("No standings available.");
        return out;
    }

    for team in standings {
        out.push_str(&format!("{}. *{}*\n", team.rank, team.name));
        out.push_str(&format!(
            "   Record: {}-{}-{}\n",
            team.wins, team.losses, team.ties
        ));
        out.push_str(&format!("   Points For: {:.2}\n", team.points_for));
        out.push_str(&format!("   Points Against: {:.2}\n\n", team.points_against));
    }
    out
}

pub fn format_current_scores(week: u32, scores: &[ScoreLine]) -> String {
    let mut out = String::new();
    out.push_str(&format!("🏈 *Week {week} Current Scores*\n\n"));

    if scores.is_empty() {
        out.push_str("No matchups this week.");
        return out;
    }

    for s in scores {
        out.push_str(&format!("*{}* vs *{}*\n", s.home_team, s.away_team));
        out.push_str(&format!(
            "Current: {:.2} - {:.2}\n",
            s.home_score, s.away_score
        ));
        out.push_str(&format!(
            "Projected: {:.2} - {:.2}\n",
            s.home_projected, s.away_projected
        ));
        if s.is_completed {
            out.push_str("(Final)\n");
        }
        out.push('\n');
    }
    out
}

/// Week preview. The current line only appears once scoring has started.
pub fn format_matchups(week: u32, scores: &[ScoreLine]) -> String {
    let mut out = String::new();
    out.push_str(&format!("🏈 *Week {week} Matchups*\n\n"));

    if scores.is_empty() {
        out.push_str("No matchups this week.");
        return out;
    }

    for s in scores {
        out.push_str(&format!("*{}* vs *{}*\n", s.home_team, s.away_team));
        out.push_str(&format!(
            "Projected: {:.2} - {:.2}\n",
            s.home_projected, s.away_projected
        ));
        if s.home_score > 0.0 || s.away_score > 0.0 {
            out.push_str(&format!(
                "Current: {:.2} - {:.2}",
                s.home_score, s.away_score
            ));
            if s.is_completed {
                out.push_str(" (Final)");
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn format_who_has(query: &str, result: &WhoHasResult) -> String {
    if !result.found {
        return format!("🔍 No player found matching '{query}'.");
    }

    let mut out = String::new();
    out.push_str(&format!(
        "*{}* ({} - {})\n",
        result.player_name, result.position, result.pro_team
    ));
    out.push_str("━━━━━━━━━━━━━━━━\n");

    if result.team_id.is_some() {
        out.push_str(&format!("*{}*\n", result.team_name));
        match result.lineup_slot.as_str() {
            slot @ ("Bench" | "IR") => out.push_str(&format!("{slot}\n")),
            _ => out.push_str("Starting\n"),
        }
    } else {
        out.push_str("Free Agent\n");
    }

    let points = if result.points > 0.0 {
        format!("{:.2}", result.points)
    } else {
        "TBD".to_string()
    };
    out.push_str(&format!("\n{points} pts"));
    if result.is_projected {
        out.push_str(" (Projected)");
    }
    out.push_str(&format!("\n{:.1}% Rostered", result.percent_owned));
    out
}

pub fn format_players_to_monitor(week: u32, report: &PlayersToMonitorReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("🚑 *Week {week} Players to Monitor*\n\n"));

    if report.teams.is_empty() {
        out.push_str("No players to monitor at this time.");
        return out;
    }

    for team in &report.teams {
        out.push_str(&format!("*{}:*\n", team.team_name));
        for player in &team.players {
            out.push_str(&format!(
                "  • {} {} - {}\n",
                player.position, player.name, player.injury_status
            ));
        }
        out.push('\n');
    }
    out
}

fn trophy_line(category: TrophyCategory, team: &str, value: f64) -> String {
    match category {
        TrophyCategory::HighScore => format!("Highest Score: {team} ({value:.2})\n"),
        TrophyCategory::LowScore => format!("Lowest Score: {team} ({value:.2})\n"),
        TrophyCategory::BiggestWin => format!("Biggest Win: {team} (Margin: {value:.2})\n"),
        TrophyCategory::ClosestWin => format!("Closest Win: {team} (Margin: {value:.2})\n"),
    }
}

/// Matchups are printed in the order given; the aggregator has already
/// sorted them.
pub fn format_final_score_report(report: &FinalScoreReport) -> String {
    let mut out = String::new();
    out.push_str("📊 *Final Scores:*\n\n");

    if report.matchups.is_empty() {
        out.push_str("No final scores this week.");
        return out;
    }

    for m in &report.matchups {
        out.push_str(&format!(
            "{} {:.2} - {:.2} {}\n",
            m.home_team, m.home_score, m.away_score, m.away_team
        ));
    }

    out.push_str("\n🏆 *Trophies:*\n");
    for t in &report.trophies {
        out.push_str(&trophy_line(t.category, &t.team_name, t.value));
    }
    out
}

pub fn format_close_games(games: &[CloseGame]) -> String {
    let mut out = String::new();
    out.push_str("🏈 *Monday Night Watch List*\n\n");

    if games.is_empty() {
        out.push_str("No close games this week. All outcomes are likely decided.");
        return out;
    }

    for g in games {
        out.push_str(&format!(
            "{} {:.2} - {:.2} {} (Margin: {:.2})\n",
            g.home_team, g.home_score, g.away_score, g.away_team, g.margin
        ));
    }
    out
}

pub fn format_team_not_found(query: &str) -> String {
    format!("Team not found: {query}")
}

/// Short injury tag shown after a player's name, if any.
fn injury_suffix(status: Option<&str>) -> String {
    match status {
        None | Some("") | Some("ACTIVE") | Some("INJURY_RESERVE") => String::new(),
        Some("QUESTIONABLE") => " (Q)".to_string(),
        Some("DOUBTFUL") => " (D)".to_string(),
        Some("OUT") => " (O)".to_string(),
        Some(other) => format!(" ({other})"),
    }
}

fn roster_line(player: &RosterPlayer) -> String {
    let points = match player.points_label.as_str() {
        label @ ("IR" | "BYE") => label.to_string(),
        label => format!("{label} pts"),
    };
    format!(
        "▫️ {} {}{} - {}\n",
        player.position,
        player.name,
        injury_suffix(player.injury_status.as_deref()),
        points
    )
}

pub fn format_team_roster(roster: &RosterView) -> String {
    let mut out = String::new();
    out.push_str(&format!("📋 *{}'s Roster*\n\n", roster.team_name));

    out.push_str("*Starting Lineup:*\n");
    for player in roster.players.iter().filter(|p| p.is_starter) {
        out.push_str(&roster_line(player));
    }

    out.push_str("\n*Bench:*\n");
    for player in roster.players.iter().filter(|p| !p.is_starter) {
        out.push_str(&roster_line(player));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantasy_rust_core::aggregator;
    use fantasy_rust_core::models::{
        MatchupScore, PlayerToMonitor, TeamMonitorReport,
    };

    fn line(home: &str, away: &str, hs: f64, aws: f64, completed: bool) -> ScoreLine {
        ScoreLine {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: hs,
            away_score: aws,
            home_projected: 110.0,
            away_projected: 98.5,
            is_completed: completed,
        }
    }

    fn roster_player(name: &str, position: &str, label: &str, starter: bool, injury: Option<&str>) -> RosterPlayer {
        RosterPlayer {
            name: name.to_string(),
            position: position.to_string(),
            points_label: label.to_string(),
            is_starter: starter,
            lineup_slot: if starter { position.to_string() } else { "Bench".to_string() },
            injury_status: injury.map(str::to_string),
        }
    }

    #[test]
    fn test_standings() {
        let standings = vec![TeamStanding {
            rank: 1,
            team_id: 2,
            name: "Coach Dad".to_string(),
            abbreviation: "CD".to_string(),
            wins: 5,
            losses: 2,
            ties: 0,
            points_for: 812.25,
            points_against: 700.0,
            win_percentage: 0.714,
            playoff_seed: 1,
        }];
        assert_eq!(
            format_standings(&standings),
            "🏆 *Current Standings*\n\n1. *Coach Dad*\n   Record: 5-2-0\n   Points For: 812.25\n   Points Against: 700.00\n\n"
        );
        assert!(format_standings(&[]).ends_with("No standings available."));
    }

    #[test]
    fn test_current_scores_final_marker() {
        let text = format_current_scores(7, &[line("A", "B", 100.5, 90.0, true)]);
        assert_eq!(
            text,
            "🏈 *Week 7 Current Scores*\n\n*A* vs *B*\nCurrent: 100.50 - 90.00\nProjected: 110.00 - 98.50\n(Final)\n\n"
        );
    }

    #[test]
    fn test_matchups_hide_current_before_kickoff() {
        let text = format_matchups(3, &[line("A", "B", 0.0, 0.0, false)]);
        assert!(!text.contains("Current:"));

        let text = format_matchups(3, &[line("A", "B", 12.0, 0.0, true)]);
        assert!(text.contains("Current: 12.00 - 0.00 (Final)\n"));
    }

    #[test]
    fn test_who_has_not_found() {
        let result = WhoHasResult::not_found("Nobody");
        assert_eq!(
            format_who_has("Nobody", &result),
            "🔍 No player found matching 'Nobody'."
        );
    }

    #[test]
    fn test_who_has_owned_bench_player() {
        let result = WhoHasResult {
            player_name: "Travis Kelce".to_string(),
            team_name: "UGF Pandas".to_string(),
            team_id: Some(4),
            found: true,
            percent_owned: 99.94,
            position: "TE".to_string(),
            pro_team: "KC".to_string(),
            points: 0.0,
            is_projected: true,
            lineup_slot: "Bench".to_string(),
        };
        assert_eq!(
            format_who_has("kelce", &result),
            "*Travis Kelce* (TE - KC)\n━━━━━━━━━━━━━━━━\n*UGF Pandas*\nBench\n\nTBD pts (Projected)\n99.9% Rostered"
        );
    }

    #[test]
    fn test_who_has_free_agent() {
        let result = WhoHasResult {
            player_name: "Some Kicker".to_string(),
            found: true,
            position: "K".to_string(),
            pro_team: "DEN".to_string(),
            points: 8.0,
            percent_owned: 3.0,
            ..Default::default()
        };
        let text = format_who_has("some kicker", &result);
        assert!(text.contains("Free Agent\n"));
        assert!(text.contains("\n8.00 pts\n"));
    }

    #[test]
    fn test_monitor_placeholder_and_lines() {
        assert!(format_players_to_monitor(4, &PlayersToMonitorReport::default())
            .ends_with("No players to monitor at this time."));

        let report = PlayersToMonitorReport {
            teams: vec![TeamMonitorReport {
                team_name: "Coach Dad".to_string(),
                players: vec![PlayerToMonitor {
                    name: "Josh Allen".to_string(),
                    position: "QB".to_string(),
                    injury_status: "QUESTIONABLE".to_string(),
                }],
            }],
        };
        assert_eq!(
            format_players_to_monitor(4, &report),
            "🚑 *Week 4 Players to Monitor*\n\n*Coach Dad:*\n  • QB Josh Allen - QUESTIONABLE\n\n"
        );
    }

    #[test]
    fn test_final_score_report() {
        let report = aggregator::aggregate(&[
            MatchupScore::new("X", "Y", 10.0, 20.0),
            MatchupScore::new("Z", "W", 30.0, 25.0),
        ]);
        assert_eq!(
            format_final_score_report(&report),
            "📊 *Final Scores:*\n\nZ 30.00 - 25.00 W\nX 10.00 - 20.00 Y\n\n🏆 *Trophies:*\n\
             Highest Score: Z (30.00)\nLowest Score: X (10.00)\n\
             Biggest Win: Y (Margin: 10.00)\nClosest Win: Z (Margin: 5.00)\n"
        );
    }

    #[test]
    fn test_final_score_report_empty() {
        let text = format_final_score_report(&aggregator::aggregate(&[]));
        assert_eq!(text, "📊 *Final Scores:*\n\nNo final scores this week.");
    }

    #[test]
    fn test_close_games() {
        assert_eq!(
            format_close_games(&[]),
            "🏈 *Monday Night Watch List*\n\nNo close games this week. All outcomes are likely decided."
        );

        let games = aggregator::find_close_games(&[MatchupScore::new("A", "B", 100.0, 95.25)]);
        assert_eq!(
            format_close_games(&games),
            "🏈 *Monday Night Watch List*\n\nA 100.00 - 95.25 B (Margin: 4.75)\n"
        );
    }

    #[test]
    fn test_team_roster() {
        let roster = RosterView {
            team_name: "Coach Dad".to_string(),
            players: vec![
                roster_player("Josh Allen", "QB", "25.46", true, Some("QUESTIONABLE")),
                roster_player("Bye Guy", "WR", "BYE", true, None),
                roster_player("Hurt Guy", "RB", "IR", false, Some("INJURY_RESERVE")),
                roster_player("Later Guy", "TE", "TBD", false, Some("SUSPENSION")),
            ],
        };
        assert_eq!(
            format_team_roster(&roster),
            "📋 *Coach Dad's Roster*\n\n*Starting Lineup:*\n\
             ▫️ QB Josh Allen (Q) - 25.46 pts\n\
             ▫️ WR Bye Guy - BYE\n\
             \n*Bench:*\n\
             ▫️ RB Hurt Guy - IR\n\
             ▫️ TE Later Guy (SUSPENSION) - TBD pts\n"
        );
    }

    #[test]
    fn test_formatters_are_idempotent() {
        let scores = vec![line("A", "B", 50.0, 49.0, false)];
        assert_eq!(format_current_scores(2, &scores), format_current_scores(2, &scores));
        assert_eq!(format_matchups(2, &scores), format_matchups(2, &scores));

        let report = aggregator::aggregate(&[MatchupScore::new("A", "B", 1.0, 2.0)]);
        assert_eq!(format_final_score_report(&report), format_final_score_report(&report));
    }
}

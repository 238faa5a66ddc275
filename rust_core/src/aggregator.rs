//! Weekly score aggregation.
//!
//! Pure functions over a week's matchups: ordering for the final-score
//! report, the four trophies, the close-game filter and standings ranking.

use crate::models::{CloseGame, FinalScoreReport, MatchupScore, TeamStanding, Trophy, TrophyCategory};
use std::cmp::Ordering;

/// Largest margin (inclusive) that still counts as a close game.
pub const CLOSE_GAME_MARGIN: f64 = 16.0;

/// Matchups sorted by combined score (descending) plus the weekly trophies.
///
/// Every team score is considered for high/low, home before away. Margins
/// are credited to the higher-scoring side; a dead-even matchup is credited
/// to the home team. With no matchups the trophies carry empty team names
/// and their infinite starting values.
pub fn aggregate(matchups: &[MatchupScore]) -> FinalScoreReport {
    let mut high = (String::new(), f64::NEG_INFINITY);
    let mut low = (String::new(), f64::INFINITY);
    let mut biggest = (String::new(), f64::NEG_INFINITY);
    let mut closest = (String::new(), f64::INFINITY);

    for m in matchups {
        for (team, score) in [(&m.home_team, m.home_score), (&m.away_team, m.away_score)] {
            if score > high.1 {
                high = (team.clone(), score);
            }
            if score < low.1 {
                low = (team.clone(), score);
            }
        }

        let margin = m.margin();
        if margin > biggest.1 {
            biggest = (m.winner().to_string(), margin);
        }
        if margin < closest.1 {
            closest = (m.winner().to_string(), margin);
        }
    }

    let mut ordered = matchups.to_vec();
    ordered.sort_by(|a, b| b.total().total_cmp(&a.total()));

    let trophy = |category, (team_name, value): (String, f64)| Trophy {
        category,
        team_name,
        value,
    };

    FinalScoreReport {
        matchups: ordered,
        trophies: vec![
            trophy(TrophyCategory::HighScore, high),
            trophy(TrophyCategory::LowScore, low),
            trophy(TrophyCategory::BiggestWin, biggest),
            trophy(TrophyCategory::ClosestWin, closest),
        ],
    }
}

/// Matchups decided by at most [`CLOSE_GAME_MARGIN`], closest first.
pub fn find_close_games(matchups: &[MatchupScore]) -> Vec<CloseGame> {
    let mut games: Vec<CloseGame> = matchups
        .iter()
        .filter(|m| m.margin() <= CLOSE_GAME_MARGIN)
        .map(|m| CloseGame {
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            home_score: m.home_score,
            away_score: m.away_score,
            margin: m.margin(),
        })
        .collect();

    games.sort_by(|a, b| a.margin.total_cmp(&b.margin));
    games
}

/// Sort by win percentage, then points for (both descending) and assign
/// 1-based ranks.
pub fn rank_standings(mut standings: Vec<TeamStanding>) -> Vec<TeamStanding> {
    standings.sort_by(|a, b| match b.win_percentage.total_cmp(&a.win_percentage) {
        Ordering::Equal => b.points_for.total_cmp(&a.points_for),
        other => other,
    });

    for (i, team) in standings.iter_mut().enumerate() {
        team.rank = i as u32 + 1;
    }
    standings
}

//! The fixed weekly report schedule.

use crate::reporting::{ReportKind, ReportingFacade};
use crate::scheduler::ScheduledJob;
use crate::telegram_client::MessageSink;
use anyhow::Context;
use chrono::{NaiveTime, Weekday};
use std::sync::Arc;
use tracing::{error, info};

struct WeeklyJob {
    name: &'static str,
    kind: ReportKind,
    weekdays: &'static [Weekday],
    times: &'static [(u32, u32)],
}

const WEEKLY_JOBS: &[WeeklyJob] = &[
    WeeklyJob {
        name: "close_games",
        kind: ReportKind::CloseGames,
        weekdays: &[Weekday::Mon],
        times: &[(17, 30)],
    },
    WeeklyJob {
        name: "scoreboard",
        kind: ReportKind::Scoreboard,
        weekdays: &[Weekday::Mon, Weekday::Tue, Weekday::Fri],
        times: &[(7, 30)],
    },
    WeeklyJob {
        name: "trophies",
        kind: ReportKind::FinalScores,
        weekdays: &[Weekday::Tue],
        times: &[(7, 30)],
    },
    WeeklyJob {
        name: "standings",
        kind: ReportKind::Standings,
        weekdays: &[Weekday::Wed],
        times: &[(7, 30)],
    },
    WeeklyJob {
        name: "matchups",
        kind: ReportKind::Matchups,
        weekdays: &[Weekday::Thu],
        times: &[(18, 30)],
    },
    WeeklyJob {
        name: "players_to_monitor",
        kind: ReportKind::PlayersToMonitor,
        weekdays: &[Weekday::Sun],
        times: &[(7, 30)],
    },
    WeeklyJob {
        name: "sunday_scoreboard",
        kind: ReportKind::Scoreboard,
        weekdays: &[Weekday::Sun],
        times: &[(15, 0), (19, 0)],
    },
];

/// Build the weekly jobs. Each one renders its report and hands the text to
/// `sink`.
pub fn build_jobs(facade: Arc<ReportingFacade>, sink: Arc<dyn MessageSink>) -> Vec<ScheduledJob> {
    WEEKLY_JOBS
        .iter()
        .map(|entry| {
            let times: Vec<NaiveTime> = entry
                .times
                .iter()
                .filter_map(|(h, m)| NaiveTime::from_hms_opt(*h, *m, 0))
                .collect();
            let kind = entry.kind;
            let name = entry.name;
            let facade = Arc::clone(&facade);
            let sink = Arc::clone(&sink);

            ScheduledJob::new(name, entry.weekdays, &times, move || {
                let facade = Arc::clone(&facade);
                let sink = Arc::clone(&sink);
                async move { send_report(&facade, sink.as_ref(), name, kind).await }
            })
        })
        .collect()
}

async fn send_report(
    facade: &ReportingFacade,
    sink: &dyn MessageSink,
    name: &str,
    kind: ReportKind,
) -> anyhow::Result<()> {
    let text = match facade.render(kind).await {
        Ok(text) => text,
        Err(e) => {
            error!("Job {} failed to render {} report: {}", name, kind.as_str(), e);
            return Err(e).context(format!("rendering {} report", kind.as_str()));
        }
    };

    if let Err(e) = sink.send(&text).await {
        error!("Job {} failed to send {} report: {:#}", name, kind.as_str(), e);
        return Err(e.context(format!("sending {} report", kind.as_str())));
    }

    info!("Job {} sent {} report", name, kind.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Chicago;
    use fantasy_rust_core::clock::ManualClock;
    use fantasy_rust_core::error::SourceError;
    use fantasy_rust_core::league_config::LeagueConfig;
    use fantasy_rust_core::metadata_cache::MetadataCache;
    use fantasy_rust_core::models::{LeagueMetadata, TeamStanding};
    use fantasy_rust_core::providers::memory::{InMemoryLeagueProvider, LeagueData};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn send(&self, text: &str) -> anyhow::Result<()> {
            self.sent.lock().push(text.to_string());
            Ok(())
        }
    }

    fn facade(provider: Arc<InMemoryLeagueProvider>) -> Arc<ReportingFacade> {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 10, 9, 12, 0, 0).unwrap()));
        Arc::new(ReportingFacade::new(
            provider,
            Arc::new(MetadataCache::default()),
            clock,
            Arc::new(LeagueConfig::nfl_defaults()),
        ))
    }

    fn league_data() -> LeagueData {
        LeagueData {
            metadata: Some(LeagueMetadata {
                league_id: 7,
                name: "Test".to_string(),
                current_week: 6,
                current_scoring_period: 6,
                season_id: 2024,
                first_week: 1,
                last_week: 17,
                is_active: true,
                last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            }),
            standings: vec![TeamStanding {
                team_id: 1,
                name: "Coach Dad".to_string(),
                wins: 4,
                losses: 1,
                points_for: 600.0,
                points_against: 500.0,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn job<'a>(jobs: &'a [ScheduledJob], name: &str) -> &'a ScheduledJob {
        jobs.iter().find(|j| j.name() == name).unwrap()
    }

    #[test]
    fn test_weekly_job_times() {
        let provider = Arc::new(InMemoryLeagueProvider::new(LeagueData::default()));
        let jobs = build_jobs(facade(provider), Arc::new(RecordingSink::default()));
        assert_eq!(jobs.len(), 7);

        // Monday 2024-10-07 00:00 Chicago
        let monday = Chicago
            .with_ymd_and_hms(2024, 10, 7, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let local = |name: &str| {
            job(&jobs, name)
                .next_fire_after(monday, Chicago)
                .unwrap()
                .with_timezone(&Chicago)
                .naive_local()
                .to_string()
        };

        assert_eq!(local("close_games"), "2024-10-07 17:30:00");
        assert_eq!(local("scoreboard"), "2024-10-07 07:30:00");
        assert_eq!(local("trophies"), "2024-10-08 07:30:00");
        assert_eq!(local("standings"), "2024-10-09 07:30:00");
        assert_eq!(local("matchups"), "2024-10-10 18:30:00");
        assert_eq!(local("players_to_monitor"), "2024-10-13 07:30:00");
        assert_eq!(local("sunday_scoreboard"), "2024-10-13 15:00:00");

        let after_first = Chicago
            .with_ymd_and_hms(2024, 10, 13, 15, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let second = job(&jobs, "sunday_scoreboard")
            .next_fire_after(after_first, Chicago)
            .unwrap()
            .with_timezone(&Chicago);
        assert_eq!(second.naive_local().to_string(), "2024-10-13 19:00:00");
    }

    #[tokio::test]
    async fn test_render_and_send() {
        let provider = Arc::new(InMemoryLeagueProvider::new(league_data()));
        let sink = Arc::new(RecordingSink::default());
        let facade = facade(provider);
        let expected = facade.standings().await.unwrap();

        send_report(&facade, sink.as_ref(), "standings", ReportKind::Standings)
            .await
            .unwrap();

        assert_eq!(*sink.sent.lock(), vec![expected]);
    }

    #[tokio::test]
    async fn test_render_failure_sends_nothing() {
        let provider = Arc::new(InMemoryLeagueProvider::new(league_data()));
        provider.set_failure(Some(SourceError::Transport("connection refused".to_string())));
        let sink = Arc::new(RecordingSink::default());

        let err = send_report(&facade(provider), sink.as_ref(), "standings", ReportKind::Standings)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("error fetching standings"));
        assert!(sink.sent.lock().is_empty());
    }
}

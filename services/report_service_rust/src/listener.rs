//! Telegram command listener: long-poll for messages and answer commands.

use crate::commands::CommandHandler;
use crate::telegram_client::{TelegramClient, Update};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Run until `shutdown` flips to true (or its sender is dropped).
pub async fn run_command_listener(
    client: TelegramClient,
    handler: Arc<CommandHandler>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Command listener started");
    let mut offset: Option<i64> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let updates = tokio::select! {
            res = client.get_updates(offset) => res,
            _ = shutdown.changed() => break,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Failed to poll for updates: {:#}", e);
                tokio::select! {
                    _ = tokio::time::sleep(ERROR_BACKOFF) => continue,
                    _ = shutdown.changed() => break,
                }
            }
        };

        for update in updates {
            offset = Some(next_offset(offset, &update));
            let Some((chat_id, text)) = command_text(&update) else {
                continue;
            };

            debug!("Command from chat {}: {}", chat_id, text);
            spawn_reply(
                client.clone(),
                Arc::clone(&handler),
                chat_id,
                text.to_string(),
            );
        }
    }

    info!("Command listener stopped");
}

/// Answer one command on its own task so a slow report does not hold up
/// polling.
fn spawn_reply(
    client: TelegramClient,
    handler: Arc<CommandHandler>,
    chat_id: i64,
    text: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(reply) = handler.handle(&text).await else {
            return;
        };
        if let Err(e) = client.send_message(chat_id, &reply).await {
            error!("Failed to reply to chat {}: {:#}", chat_id, e);
        }
    })
}

fn next_offset(current: Option<i64>, update: &Update) -> i64 {
    let next = update.update_id + 1;
    current.map_or(next, |cur| cur.max(next))
}

/// Chat id and text of a message that looks like a command.
fn command_text(update: &Update) -> Option<(i64, &str)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    text.trim_start()
        .starts_with('/')
        .then_some((message.chat.id, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::ReportingFacade;
    use crate::telegram_client::{Chat, Message};
    use fantasy_rust_core::clock::SystemClock;
    use fantasy_rust_core::league_config::LeagueConfig;
    use fantasy_rust_core::metadata_cache::MetadataCache;
    use fantasy_rust_core::providers::memory::{InMemoryLeagueProvider, LeagueData};

    fn update(id: i64, text: Option<&str>) -> Update {
        Update {
            update_id: id,
            message: Some(Message {
                message_id: id,
                chat: Chat { id: -42 },
                text: text.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_offset_advances_past_update() {
        assert_eq!(next_offset(None, &update(100, None)), 101);
        assert_eq!(next_offset(Some(205), &update(100, None)), 205);
        assert_eq!(next_offset(Some(101), &update(300, None)), 301);
    }

    #[test]
    fn test_only_commands_are_picked_up() {
        assert_eq!(command_text(&update(1, Some("/scores"))), Some((-42, "/scores")));
        assert_eq!(command_text(&update(2, Some("good game"))), None);
        assert_eq!(command_text(&update(3, None)), None);
        assert_eq!(
            command_text(&Update {
                update_id: 4,
                message: None
            }),
            None
        );
    }

    fn facade(provider: Arc<InMemoryLeagueProvider>) -> Arc<ReportingFacade> {
        Arc::new(ReportingFacade::new(
            provider,
            Arc::new(MetadataCache::default()),
            Arc::new(SystemClock),
            Arc::new(LeagueConfig::nfl_defaults()),
        ))
    }

    // nothing listens here; every request fails fast
    fn unreachable_client() -> TelegramClient {
        TelegramClient::with_base_url(
            "http://127.0.0.1:9",
            "token".to_string(),
            1,
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_reply_runs_off_the_poll_loop() {
        let provider = Arc::new(InMemoryLeagueProvider::new(LeagueData::default()));
        let handler = Arc::new(CommandHandler::new(facade(provider.clone())));

        let task = spawn_reply(unreachable_client(), handler, -42, "/standings".to_string());
        // single-threaded runtime: the command has not run until we yield
        assert_eq!(provider.total_calls(), 0);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(provider.total_calls() > 0);
    }

    #[tokio::test]
    async fn test_exits_on_shutdown() {
        let provider = Arc::new(InMemoryLeagueProvider::new(LeagueData::default()));
        let handler = Arc::new(CommandHandler::new(facade(provider)));

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(run_command_listener(unreachable_client(), handler, rx));
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use fantasy_rust_core::clients::EspnCredentials;
use fantasy_rust_core::league_config::LeagueConfig;
use fantasy_rust_core::metadata_cache::DEFAULT_METADATA_TTL_HOURS;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub chat_id: i64,

    pub espn: EspnCredentials,
    pub request_timeout: Duration,

    pub schedule_timezone: Tz,
    pub metadata_ttl: chrono::Duration,
    pub health_port: u16,

    pub league: LeagueConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_token = env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN must be set")?;
        let chat_id = parse_required_env::<i64>("CHAT_ID")?;

        let year = parse_required_env::<u32>("YEAR")?.to_string();
        let league_id = parse_required_env::<u64>("LEAGUE_ID")?.to_string();
        let swid = env::var("SWID").context("SWID must be set")?;
        let espn_s2 = env::var("ESPN_S2").context("ESPN_S2 must be set")?;

        let request_timeout =
            Duration::from_secs(parse_u64_env("REQUEST_TIMEOUT_SECS", 10).context("REQUEST_TIMEOUT_SECS")?);

        let tz_str = env::var("SCHEDULE_TIMEZONE").unwrap_or_else(|_| "America/Chicago".to_string());
        let schedule_timezone = Tz::from_str(&tz_str).map_err(|_| {
            anyhow!(
                "Invalid SCHEDULE_TIMEZONE: {} (expected IANA tz like America/Chicago)",
                tz_str
            )
        })?;

        let ttl_hours = parse_u64_env("METADATA_TTL_HOURS", DEFAULT_METADATA_TTL_HOURS.unsigned_abs())
            .context("METADATA_TTL_HOURS")?;
        let ttl_hours = i64::try_from(ttl_hours)
            .map_err(|_| anyhow!("Invalid METADATA_TTL_HOURS: {ttl_hours}"))?;
        let metadata_ttl = chrono::Duration::hours(ttl_hours);

        let health_port = parse_u64_env("HEALTH_PORT", 80).context("HEALTH_PORT")?;
        let health_port = u16::try_from(health_port)
            .map_err(|_| anyhow!("Invalid HEALTH_PORT: {health_port} (expected 0-65535)"))?;

        let mut league = match env::var("LEAGUE_CONFIG_PATH") {
            Ok(path) => LeagueConfig::load(Path::new(&path))
                .with_context(|| format!("Failed to load LEAGUE_CONFIG_PATH {path}"))?,
            Err(_) => LeagueConfig::nfl_defaults(),
        };
        if let Ok(raw) = env::var("LEAGUE_TEAMS") {
            let teams = parse_team_table(&raw).context("LEAGUE_TEAMS")?;
            league = league.with_teams(teams);
        }

        Ok(Self {
            telegram_token,
            chat_id,
            espn: EspnCredentials {
                year,
                league_id,
                swid,
                espn_s2,
            },
            request_timeout,
            schedule_timezone,
            metadata_ttl,
            health_port,
            league,
        })
    }
}

/// Parse `1=Coach Dad;2=UGF Pandas` into (team id, name) pairs.
pub fn parse_team_table(raw: &str) -> Result<Vec<(u32, String)>> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (id, name) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected id=Name, got '{pair}'"))?;
            let id = id
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid team id in '{pair}'"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(anyhow!("empty team name for id {id}"));
            }
            Ok((id, name.to_string()))
        })
        .collect()
}

fn parse_required_env<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).with_context(|| format!("{key} must be set"))?;
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Invalid {key}: {raw}"))
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer)"))
}

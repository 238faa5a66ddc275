pub mod espn;

pub use espn::{EspnCredentials, EspnFantasyClient};

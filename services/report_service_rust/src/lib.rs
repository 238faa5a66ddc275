//! Fantasy Report Service
//!
//! Weekly fantasy football reports delivered to a Telegram chat, plus an
//! on-demand command interface over the same reports.

pub mod commands;
pub mod config;
pub mod formatters;
pub mod health;
pub mod jobs;
pub mod listener;
pub mod reporting;
pub mod scheduler;
pub mod telegram_client;

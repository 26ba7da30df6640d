// ABOUTME: Environment-based configuration for event stream connections
// ABOUTME: Parses channel capacity, keep-alive, and idle-timeout settings
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

//! Environment-based stream configuration.
//!
//! All settings come from `SSE_BRIDGE_*` environment variables; unset variables fall
//! back to defaults, values that fail to parse are configuration errors.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default capacity of the broadcast channel behind a source
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Default SSE keep-alive interval in seconds
pub const DEFAULT_KEEPALIVE_SECS: u64 = 15;

/// Settings governing event stream connections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Capacity of the broadcast channel behind the source
    pub channel_capacity: usize,
    /// Interval between SSE keep-alive comments, in seconds
    pub keepalive_interval_secs: u64,
    /// Close a connection after this many seconds without a frame; `None` disables
    pub idle_timeout_secs: Option<u64>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            keepalive_interval_secs: DEFAULT_KEEPALIVE_SECS,
            idle_timeout_secs: None,
        }
    }
}

impl StreamSettings {
    /// Load settings from `SSE_BRIDGE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a variable is present but not a valid
    /// positive number.
    pub fn from_env() -> AppResult<Self> {
        let channel_capacity = match env::var("SSE_BRIDGE_CHANNEL_CAPACITY") {
            Ok(raw) => {
                let value = parse_positive(&raw, "SSE_BRIDGE_CHANNEL_CAPACITY")?;
                usize::try_from(value).map_err(|_| {
                    AppError::config("SSE_BRIDGE_CHANNEL_CAPACITY is too large for this platform")
                })?
            }
            Err(_) => DEFAULT_CHANNEL_CAPACITY,
        };

        let keepalive_interval_secs = match env::var("SSE_BRIDGE_KEEPALIVE_SECS") {
            Ok(raw) => parse_positive(&raw, "SSE_BRIDGE_KEEPALIVE_SECS")?,
            Err(_) => DEFAULT_KEEPALIVE_SECS,
        };

        let idle_timeout_secs = match env::var("SSE_BRIDGE_IDLE_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_positive(&raw, "SSE_BRIDGE_IDLE_TIMEOUT_SECS")?),
            Err(_) => None,
        };

        Ok(Self {
            channel_capacity,
            keepalive_interval_secs,
            idle_timeout_secs,
        })
    }

    /// Keep-alive interval as a [`Duration`]
    #[must_use]
    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    /// Idle timeout as a [`Duration`], when enabled
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_positive(raw: &str, name: &str) -> AppResult<u64> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{name} must be a number, got {raw:?}")))?;
    if value == 0 {
        return Err(AppError::config(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

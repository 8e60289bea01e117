// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Service configuration.
//!
//! Every setting resolves as explicit flag, then environment variable,
//! then built-in default.

use crate::renderer::chromium::ChromiumOptions;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Settings for the HTTP service and its browser.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for non-API paths, if any.
    pub static_dir: Option<PathBuf>,
    pub chromium: ChromiumOptions,
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(overrides: ConfigOverrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let host = overrides
            .host
            .or_else(|| env("WEBSIFT_HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = overrides
            .port
            .or_else(|| env("WEBSIFT_PORT").and_then(|p| p.parse().ok()))
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let static_dir = overrides
            .static_dir
            .or_else(|| env("WEBSIFT_STATIC_DIR").map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_STATIC_DIR);
                default.is_dir().then_some(default)
            });

        let chromium = ChromiumOptions {
            executable: env("WEBSIFT_CHROMIUM_PATH").map(PathBuf::from),
            sandbox: env("WEBSIFT_CHROMIUM_SANDBOX").is_some_and(|v| v == "1" || v == "true"),
        };

        Self {
            host,
            port,
            static_dir,
            chromium,
        }
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

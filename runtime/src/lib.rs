// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Websift runtime library: web extraction and search-driven scraping.
//!
//! Pages are extracted either from their raw source or from a headless
//! Chromium render, search results come from HTML result pages, and a batch
//! coordinator scrapes a result set concurrently. The same services back
//! the `websift` CLI and its REST API.

pub mod acquisition;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod renderer;
pub mod rest;
pub mod search;

// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP-based acquisition: plain fetches, static extraction, and the
//! advisory robots.txt check. The browser is only needed for rendered
//! extraction (see [`crate::renderer`]).

pub mod http_client;
pub mod policy;
pub mod static_extractor;

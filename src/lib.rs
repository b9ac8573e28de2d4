//! # Contact Link
//!
//! Resolves contact signals (an email address and/or a phone number) into
//! linked contact identities stored in SQLite, and serves them over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  HTTP / CLI  │──▶│   Resolver   │──▶│    SQLite    │
//! │ (axum/clap)  │   │ QueryService │◀──│   contacts   │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! The resolver and query service live in `contact-link-core` and only see
//! the [`ContactStore`](contact_link_core::store::ContactStore) trait; this
//! crate supplies the SQLite backend, configuration, logging and the two
//! front ends.
//!
//! ## Quick Start
//!
//! ```bash
//! clink init                                    # create database
//! clink interact --email a@x.com --phone 555    # record a signal
//! clink serve                                   # start HTTP server
//! curl 'http://127.0.0.1:8080/interaction?email=a@x.com&phone=666'
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`db`] | Database connection pool |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite `ContactStore` |
//! | [`server`] | HTTP server |
//! | [`commands`] | CLI command runners |
//! | [`stats`] | Database statistics |

pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod sqlite_store;
pub mod stats;

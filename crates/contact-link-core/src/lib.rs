//! # Contact Link Core
//!
//! Shared, I/O-free logic for contact-link: the contact data model, the
//! [`store::ContactStore`] abstraction, identity resolution and the
//! aggregated identity view.
//!
//! This crate contains no tokio, sqlx, filesystem or network code. Storage
//! backends live in the application crate; [`store::memory::InMemoryStore`]
//! is provided for tests and embedding.
//!
//! ## Flow
//!
//! ```text
//!  (email, phone) ──▶ Resolver ──▶ ContactStore ◀── QueryService ──▶ ContactView
//!                    (write path)                  (read path)
//! ```

pub mod error;
pub mod models;
pub mod query;
pub mod resolve;
pub mod service;
pub mod store;
pub mod view;

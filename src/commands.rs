//! CLI command runners for `clink interact`, `clink details` and `clink get`.
//!
//! Each command opens its own pool, performs one operation through the same
//! core services the HTTP server uses, and prints a plain-text summary.

use anyhow::{bail, Result};
use std::sync::Arc;

use contact_link_core::models::Contact;
use contact_link_core::resolve::ResolveOutcome;
use contact_link_core::service::IdentityService;
use contact_link_core::store::ContactStore;
use contact_link_core::view::{format_ts_iso, ContactView};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

async fn open_service(config: &Config) -> Result<(Arc<SqliteStore>, IdentityService)> {
    let pool = db::connect(config).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let service = IdentityService::new(store.clone(), config.resolver.policy);
    Ok((store, service))
}

/// Record one signal and print the identity it belongs to.
pub async fn run_interact(config: &Config, email: Option<&str>, phone: Option<&str>) -> Result<()> {
    let (store, service) = open_service(config).await?;
    let result = service.interact(email, phone).await;
    store.pool().close().await;
    let (outcome, view) = result?;

    match &outcome {
        ResolveOutcome::CreatedPrimary(c) => println!("Inserted primary contact {}.", c.id),
        ResolveOutcome::CreatedSecondary {
            primary_id,
            contact,
        } => println!(
            "Inserted secondary contact {} linked to {}.",
            contact.id, primary_id
        ),
    }
    println!();
    print_view("Contact Information", &view);
    Ok(())
}

/// Print rows matching both email and phone. Read-only.
pub async fn run_details(config: &Config, email: Option<&str>, phone: Option<&str>) -> Result<()> {
    let (store, service) = open_service(config).await?;
    let result = service.details(email, phone).await;
    store.pool().close().await;

    print_view("Contact Details", &result?);
    Ok(())
}

/// Print a single row by id.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let contact = store.get(id).await;
    store.pool().close().await;

    match contact? {
        Some(c) => print_contact(&c),
        None => bail!("contact not found: {}", id),
    }
    Ok(())
}

fn print_view(title: &str, view: &ContactView) {
    println!("--- {} ---", title);
    println!("email:           {}", view.email.as_deref().unwrap_or(""));
    println!("phone numbers:   [{}]", view.phone_numbers.join(", "));
    println!("id:              {}", view.id);
    println!(
        "linked id:       {}",
        view.linked_id.map(|id| id.to_string()).unwrap_or_default()
    );
    println!("link precedence: {}", view.link_precedence);
    println!("created_at:      {}", format_ts_iso(&view.created_at));
    println!("updated_at:      {}", format_ts_iso(&view.updated_at));
    if let Some(ts) = &view.deleted_at {
        println!("deleted_at:      {}", format_ts_iso(ts));
    }
}

fn print_contact(c: &Contact) {
    println!("--- Contact ---");
    println!("id:              {}", c.id);
    println!("email:           {}", c.email.as_deref().unwrap_or(""));
    println!("phone number:    {}", c.phone_number.as_deref().unwrap_or(""));
    println!(
        "linked id:       {}",
        c.linked_id.map(|id| id.to_string()).unwrap_or_default()
    );
    println!("link precedence: {}", c.link_precedence);
    println!("created_at:      {}", format_ts_iso(&c.created_at));
    println!("updated_at:      {}", format_ts_iso(&c.updated_at));
    if let Some(ts) = &c.deleted_at {
        println!("deleted_at:      {}", format_ts_iso(ts));
    }
}

//! Provision an admin account.
//!
//! Usage: `create-admin <USERNAME> [PASSWORD]`. When the password is omitted
//! it is read from the first line of stdin.

use std::io::BufRead;

use anyhow::{Context, Result, bail};

use resale_api::auth::hash_password;
use resale_api::config::Config;
use resale_db::Database;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let username = args
        .next()
        .context("Usage: create-admin <USERNAME> [PASSWORD]")?
        .trim()
        .to_string();
    if username.is_empty() {
        bail!("Username must not be empty");
    }

    let password = match args.next() {
        Some(p) => p,
        None => {
            eprint!("Password for '{}': ", username);
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let config = Config::from_env()?;
    let db = Database::open(&config.db_path)?;

    if db.get_admin_by_username(&username)?.is_some() {
        bail!("Admin '{}' already exists", username);
    }

    let hash = hash_password(&password)?;
    let id = db.create_admin(&username, &hash)?;

    println!("Admin user '{}' created (id {}).", username, id);
    Ok(())
}

use crate::db::connection::{init_db, Database};
use crate::domain::market::MarketResolver;
use crate::mailings::BrevoMailer;
use crate::router::{handle, AppContext};
use astra::Server;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

mod db;
mod domain;
mod errors;
mod mailings;
mod responses;
mod router;
mod spreadsheets;

#[cfg(test)]
mod tests;

fn main() {
    // 1️⃣ Create the database handle
    let db = Database::new("whiteboard.sqlite3");

    // 2️⃣ Initialize database from schema.sql
    if let Err(e) = init_db(&db, "sql/schema.sql") {
        eprintln!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Load the market range table
    let resolver = match MarketResolver::load("config/markets.json") {
        Ok(r) => r,
        Err(e) => {
            eprintln!("❌ Market table load failed: {e}");
            std::process::exit(1);
        }
    };

    // 4️⃣ Wire up the mailer from the environment
    let mailer = BrevoMailer::new(
        env::var("BREVO_API_KEY").unwrap_or_default(),
        env::var("SENDER_EMAIL").unwrap_or_else(|_| "tracker@example.com".to_string()),
        env::var("SENDER_NAME").unwrap_or_else(|_| "Site Tracker".to_string()),
    );

    let ctx = Arc::new(AppContext::new(db, resolver, Arc::new(mailer)));

    // 5️⃣ Start the server
    let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
    println!("Starting site tracker at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &ctx) {
        Ok(resp) => resp,
        Err(err) => responses::error_to_response(err),
    });

    if let Err(e) = result {
        eprintln!("Server ended with error: {e}");
    }

    println!("Server shut down cleanly.");
}

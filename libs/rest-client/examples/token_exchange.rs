//! Token exchange example
//!
//! Signs a customer login with OAuth 1.0a, then uses the returned token as a
//! bearer token for a follow-up call.
//!
//! To run this example:
//! ```bash
//! export REST_CLIENT_BASE_URL="https://shop.example.com/rest"
//! export REST_CLIENT_CONSUMER_KEY="..."
//! export REST_CLIENT_CONSUMER_SECRET="..."
//! export REST_CLIENT_ACCESS_TOKEN="..."
//! export REST_CLIENT_ACCESS_TOKEN_SECRET="..."
//! export CUSTOMER_EMAIL="jane@example.com"
//! export CUSTOMER_PASSWORD="..."
//! cargo run --example token_exchange
//! ```

use anyhow::Context;
use rest_client::{CallOptions, ClientConfig, DiagnosticLogger, RequestDispatcher};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = RequestDispatcher::new(ClientConfig::from_env()?)?
        .logger(DiagnosticLogger::new(std::env::var_os("DEV").is_some()));

    println!("=== Exchanging customer credentials ===\n");

    let token = client
        .consumer_token(&json!({
            "username": std::env::var("CUSTOMER_EMAIL").context("CUSTOMER_EMAIL not set")?,
            "password": std::env::var("CUSTOMER_PASSWORD").context("CUSTOMER_PASSWORD not set")?,
        }))
        .await?;
    let token = token
        .as_str()
        .context("token endpoint did not return a string")?
        .to_owned();

    println!("=== Fetching the customer profile ===\n");

    let options = CallOptions::new()
        .bearer(token)
        .on_progress(|p| println!("  {:>5.1}% ({} bytes)", p.percent * 100.0, p.bytes_transferred));

    match client.get("/customers/me", options).await {
        Ok(me) => println!("Customer: {}", serde_json::to_string_pretty(&me)?),
        Err(e) if e.is_api() => println!("Server rejected the call: {e}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

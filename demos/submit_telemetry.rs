//! Submit a wallet-signed telemetry batch.
//!
//! ```text
//! ETHYS_PRIVATE_KEY=0x... ETHYS_AGENT_ID=agent_... cargo run --example submit_telemetry
//! ```

use anyhow::Context;
use ethys402::signing::now_unix;
use ethys402::{crypto, EthysClient, TelemetryEvent, TelemetryOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let private_key =
        std::env::var("ETHYS_PRIVATE_KEY").context("ETHYS_PRIVATE_KEY environment variable required")?;
    let agent_id =
        std::env::var("ETHYS_AGENT_ID").context("ETHYS_AGENT_ID environment variable required")?;
    let address = crypto::address_from_private_key(&private_key)?;

    let now = now_unix();
    let events = vec![
        TelemetryEvent::new("agent_start", now)
            .with_data("version", "1.0.0")
            .with_data("capabilities", serde_json::json!(["nlp", "data_processing"])),
        TelemetryEvent::new("task_completed", now)
            .with_data("task_id", "task_123")
            .with_data("duration_ms", 1500)
            .with_data("success", true),
    ];

    println!("Submitting {} events for {agent_id} ({address})", events.len());

    let client = EthysClient::from_env()?;
    let resp = client
        .telemetry(&agent_id, &address, events, TelemetryOptions::with_private_key(private_key))
        .await?;

    if resp.success {
        println!("Recorded {} events", resp.recorded);
    } else {
        println!("Telemetry was not recorded");
    }
    Ok(())
}

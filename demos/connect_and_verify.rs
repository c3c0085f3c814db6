//! Connect an agent with a wallet signature, then verify its activation payment.
//!
//! ```text
//! ETHYS_PRIVATE_KEY=0x... ETHYS_TX_HASH=0x... cargo run --example connect_and_verify
//! ```

use ethys402::{crypto, signing, ConnectRequest, EthysClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (private_key, address) = match std::env::var("ETHYS_PRIVATE_KEY") {
        Ok(key) => {
            let address = crypto::address_from_private_key(&key)?;
            (key, address)
        }
        Err(_) => {
            let (key, address) = crypto::generate_keypair();
            println!("No ETHYS_PRIVATE_KEY set; using a throwaway account {address}");
            (key, address)
        }
    };

    let client = EthysClient::from_env()?;

    let info = client.get_info().await?;
    println!("Protocol: {} v{}", info.protocol, info.version);
    println!(
        "Network: {} (chain id {})",
        info.network.get("name").and_then(|v| v.as_str()).unwrap_or("unknown"),
        info.network.get("chainId").cloned().unwrap_or_default()
    );
    if let Some(pricing) = info.pricing_info() {
        println!("Activation fee: {:?}", pricing.activation_fee.get("usd"));
    }

    let signed = signing::sign_connect_message(&private_key, &address, None)?;
    let connected = client
        .connect(&ConnectRequest {
            address: address.clone(),
            signature: signed.signature,
            message: signed.message,
            token_contract: None,
            token_id: None,
        })
        .await?;
    println!("Connected: agent id {}", connected.agent_id);
    if let Some(key) = &connected.agent_id_key {
        println!("Agent id key: {key}");
    }

    match std::env::var("ETHYS_TX_HASH") {
        Ok(tx_hash) => {
            let verified = client.verify_payment(&connected.agent_id, &tx_hash).await?;
            if verified.activated {
                println!("Payment verified, agent activated");
            } else {
                println!("Payment not verified");
            }
        }
        Err(_) => println!("Set ETHYS_TX_HASH to verify the activation payment"),
    }

    Ok(())
}

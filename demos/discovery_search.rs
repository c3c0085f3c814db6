//! Search the discovery directory, with both the blocking and async clients.

use ethys402::{BlockingEthysClient, DiscoveryQuery, EthysClient};
use tracing_subscriber::EnvFilter;

fn print_agents(agents: &[ethys402::JsonMap], limit: usize) {
    for agent in agents.iter().take(limit) {
        let id = agent.get("agentId").and_then(|v| v.as_str()).unwrap_or("unknown");
        let tags: Vec<&str> = agent
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|t| t.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        println!("  {id} [{}]", tags.join(", "));
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== blocking ===");
    let client = BlockingEthysClient::from_env()?;
    let resp = client.discovery_search(&DiscoveryQuery {
        tags: Some("nlp,data".into()),
        min_trust: Some(600),
        service_types: None,
    })?;
    println!("Found {} agents (total {:?})", resp.agents.len(), resp.total);
    print_agents(&resp.agents, 5);
    drop(client);

    println!("=== async ===");
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let client = EthysClient::from_env()?;
        let resp = client
            .discovery_search(&DiscoveryQuery {
                tags: Some("nlp".into()),
                min_trust: Some(500),
                ..Default::default()
            })
            .await?;
        println!("Found {} agents", resp.agents.len());
        print_agents(&resp.agents, 3);
        Ok::<_, anyhow::Error>(())
    })
}

//! `parley classify`: Show how a query would be routed, without calling anything.

use parley_providers::build_from_config;
use parley_routing::{Router, ToolDetector};

pub async fn run(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let router = Router::from_config(build_from_config(&config).into_providers(), &config.routing);

    println!("Query:     {query}");
    println!("Category:  {}", router.classify(query));

    match ToolDetector::new().needs_tool(query) {
        Some(tool) => println!("Tool:      {} on {} ({})", tool.tool_name, tool.target_server, tool.reason),
        None => println!("Tool:      none"),
    }

    match router.decide(query).await {
        Ok(decision) => {
            println!("Provider:  {}", decision.selected_provider);
            if !decision.fallback_chain.is_empty() {
                println!("Fallback:  {}", decision.fallback_chain.join(" -> "));
            }
            println!("Reason:    {}", decision.reason);
        }
        Err(e) => println!("Provider:  none ({e})"),
    }

    Ok(())
}

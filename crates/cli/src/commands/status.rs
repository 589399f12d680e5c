//! `parley status`: Show the loaded configuration.

use parley_config::{AppConfig, StoreKind};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let keyed = config.keyed_providers();

    println!("Parley Status");
    println!("=============");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!(
        "  Providers:      {}",
        if keyed.is_empty() { "(no API keys)".to_string() } else { keyed.join(", ") }
    );
    println!("  Fallback order: {}", config.routing.fallback_order.join(", "));
    println!("  Call timeout:   {}s", config.routing.call_timeout_secs);
    println!("  Health checks:  every {}s", config.routing.health_check_interval_secs);
    println!("  Temperature:    {}", config.routing.temperature);
    println!(
        "  Memory:         window {}, cleanup at {}, retention {}h",
        config.memory.active_window, config.memory.cleanup_threshold, config.memory.retention_hours
    );
    match config.memory.store {
        StoreKind::Memory => println!("  Store:          in-memory"),
        StoreKind::File => println!("  Store:          {}", config.memory.resolved_store_path().display()),
    }
    println!(
        "  Summarizer:     {}",
        if config.summarizer.is_disabled() { "disabled" } else { config.summarizer.provider.as_str() }
    );
    println!("  Agent:          {}", config.agent.name);

    let tools = parley_tools::build_from_config(&config.tools);
    if tools.is_empty() {
        println!("  Tool servers:   (none, tool requests answered by models)");
    } else {
        println!("  Tool servers:   timeout {}s", config.tools.timeout_secs);
        for name in tools.names() {
            if let Some(server) = tools.get(name) {
                println!(
                    "    {name:<12} {}  {}",
                    server.url(),
                    server.description().unwrap_or("")
                );
            }
        }
    }

    if AppConfig::config_path().exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file: run `parley onboard` first");
    }

    Ok(())
}

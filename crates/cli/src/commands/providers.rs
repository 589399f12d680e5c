//! `parley providers`: Show configured providers and their availability.

use parley_core::ProviderRole;
use parley_providers::build_from_config;
use parley_routing::Router;

pub async fn run(probe: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let router = Router::from_config(build_from_config(&config).into_providers(), &config.routing);

    if probe {
        eprintln!("  Probing providers...");
        router.probe_all().await;
    }

    println!("Providers");
    println!("=========");
    let statuses = router.status().await;
    if statuses.is_empty() {
        println!("  (none configured: no API keys found)");
    }
    for status in statuses {
        let model = config
            .providers
            .get(&status.provider_id)
            .and_then(|p| p.model.as_deref())
            .unwrap_or("-");
        println!(
            "  {:<12} {:<28} {:<12} checked {}",
            status.provider_id,
            model,
            if status.available { "available" } else { "unavailable" },
            status.last_checked.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }

    println!();
    println!("Roles");
    for role in [
        ProviderRole::General,
        ProviderRole::Analytic,
        ProviderRole::Generative,
        ProviderRole::Reasoning,
    ] {
        println!("  {:<12} {}", role.to_string(), router.selector().provider_for(role));
    }

    Ok(())
}

use crate::di::NameServices;
use crate::Command;
use ferrous_names_domain::{classify_input, Config, InputKind};
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

pub async fn run(
    command: Command,
    services: &NameServices,
    config: &Config,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Command::Resolve { inputs } => {
            for input in inputs {
                let result = services.resolver.resolve_input(&input).await;
                print(json, &result, || match (&result.error, result.is_valid) {
                    (None, true) => format!(
                        "{} -> {}",
                        result.domain.as_deref().unwrap_or(input.trim()),
                        result.address
                    ),
                    (error, _) => format!(
                        "{} -> error: {}",
                        input.trim(),
                        error.as_deref().unwrap_or("unknown")
                    ),
                })?;
            }
        }
        Command::Reverse { addresses } => {
            for address in addresses {
                let result = services.reverse.get_domain(&address).await;
                print(json, &result, || {
                    format!(
                        "{} -> {} ({})",
                        result.address,
                        result.display_name(),
                        result.source.as_str()
                    )
                })?;
            }
        }
        Command::Batch { file, addresses } => {
            let addresses = collect_addresses(file.as_deref(), addresses).await?;
            let lookup = services.reverse.batch_get_domains(&addresses).await;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "results": lookup.results,
                        "summary": lookup.summary,
                    }))?
                );
            } else {
                for address in dedup_in_order(&addresses) {
                    if let Some(result) = lookup.results.get(&address) {
                        println!(
                            "{} -> {} ({})",
                            address,
                            result.display_name(),
                            result.source.as_str()
                        );
                    }
                }
                let s = &lookup.summary;
                println!(
                    "total={} registry={} cache={} api={} errors={} rate_limited={}",
                    s.total, s.from_registry, s.from_cache, s.from_api, s.errors, s.rate_limited
                );
            }
        }
        Command::Warmup { file, addresses } => {
            let addresses = collect_addresses(file.as_deref(), addresses).await?;
            let report = services.reverse.warmup_cache(&addresses).await;
            let value = json!({
                "requested": report.requested,
                "already_known": report.already_known,
                "resolved": report.resolved,
                "failed": report.failed,
            });
            print(json, &value, || {
                format!(
                    "requested={} already_known={} resolved={} failed={}",
                    report.requested, report.already_known, report.resolved, report.failed
                )
            })?;
        }
        Command::Search { query, limit } => {
            let entries = services.registry.search_domains(&query, limit);
            print(json, &entries, || {
                entries
                    .iter()
                    .map(|e| format!("{:<24} {}", e.domain, e.address))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Invalidate { addresses } => {
            for address in addresses {
                let removed = services.reverse.invalidate(&address).await;
                info!(address = %address.trim(), removed, "Reverse cache entry invalidated");
            }
        }
        Command::Stats => {
            let value = json!({
                "cache": services.cache.stats(),
                "registry": services.registry.stats(),
                "rate_limiter": services.limiter.stats(),
                "reverse_enabled": services.reverse.is_enabled(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Watch => watch(services, config, json).await?,
        Command::Config { output } => show_config(config, output.as_deref())?,
    }
    Ok(())
}

pub fn show_config(config: &Config, output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            config.save(path)?;
            info!(path = %path, "Configuration written");
            println!("Configuration written to {}", path);
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}

/// Resolves each stdin line in whichever direction it needs, with the cache
/// maintenance jobs running in the background.
async fn watch(services: &NameServices, config: &Config, json: bool) -> anyhow::Result<()> {
    let jobs = services.start_jobs(config).await;
    info!(jobs, "Watching stdin for names and addresses");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match classify_input(input) {
            Ok(InputKind::Wallet(address)) => {
                let result = services.reverse.get_domain(&address).await;
                print(json, &result, || format!("{} -> {}", address, result.display_name()))?;
            }
            _ => {
                let result = services.resolver.resolve_input(input).await;
                print(json, &result, || match &result.error {
                    None => format!("{} -> {}", input, result.address),
                    Some(error) => format!("{} -> error: {}", input, error),
                })?;
            }
        }
    }
    Ok(())
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

async fn collect_addresses(
    file: Option<&str>,
    mut addresses: Vec<String>,
) -> anyhow::Result<Vec<String>> {
    if let Some(path) = file {
        let contents = tokio::fs::read_to_string(path).await?;
        addresses.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        );
    }
    if addresses.is_empty() {
        anyhow::bail!("no addresses given");
    }
    Ok(addresses)
}

fn dedup_in_order(addresses: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    addresses
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| seen.insert(a.clone()))
        .collect()
}

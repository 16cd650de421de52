use ferrous_names_domain::config::RegistryConfig;
use ferrous_names_domain::{
    DomainError, DomainKind, RegistryEntry, RegistryPriority, RegistrySource,
};
use ferrous_names_infrastructure::names::registry::{builtin_entries, LocalRegistry};

mod helpers;
use helpers::{address, local_client, serve_once, TOLY_ADDRESS};

fn entry(seed: u8, domain: &str, priority: RegistryPriority) -> RegistryEntry {
    RegistryEntry::new(address(seed), domain, RegistrySource::Community, priority)
}

#[test]
fn test_default_config_seeds_builtin_entries() {
    let registry = LocalRegistry::from_config(&RegistryConfig::default());

    assert_eq!(registry.len(), builtin_entries().len());
    assert_eq!(registry.get_domain(TOLY_ADDRESS).as_deref(), Some("toly.sol"));
    assert_eq!(registry.get_address("TOLY.SOL").as_deref(), Some(TOLY_ADDRESS));
}

#[test]
fn test_configured_entries_extend_seed_and_invalid_ones_are_skipped() {
    let config = RegistryConfig {
        seed_builtin: false,
        entries: vec![
            entry(1, "alice.sol", RegistryPriority::High),
            RegistryEntry::new("short", "bad.sol", RegistrySource::Manual, RegistryPriority::Low),
        ],
        remote_url: None,
    };

    let registry = LocalRegistry::from_config(&config);

    assert_eq!(registry.len(), 1);
    assert!(registry.get_domain(TOLY_ADDRESS).is_none());
    assert_eq!(registry.get_domain(&address(1)).as_deref(), Some("alice.sol"));
}

#[test]
fn test_lookups_are_case_insensitive() {
    let registry = LocalRegistry::new();
    registry
        .add_entry(entry(1, "Alice.SOL", RegistryPriority::Medium))
        .unwrap();

    assert_eq!(
        registry.get_domain(&address(1).to_uppercase()).as_deref(),
        Some("alice.sol")
    );
    assert_eq!(registry.get_address("ALICE.sol"), Some(address(1)));
}

#[test]
fn test_re_adding_address_replaces_old_domain() {
    let registry = LocalRegistry::new();
    registry.add_entry(entry(1, "old.sol", RegistryPriority::Medium)).unwrap();
    registry.add_entry(entry(1, "new.sol", RegistryPriority::Medium)).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get_domain(&address(1)).as_deref(), Some("new.sol"));
    assert_eq!(registry.get_address("old.sol"), None);
    assert_eq!(registry.get_address("new.sol"), Some(address(1)));
}

#[test]
fn test_add_rejects_short_address_and_bad_domain() {
    let registry = LocalRegistry::new();

    assert!(registry
        .add_entry(RegistryEntry::new(
            "abc",
            "x.sol",
            RegistrySource::Manual,
            RegistryPriority::Low,
        ))
        .is_err());
    assert!(registry.add_entry(entry(1, "nosuffix", RegistryPriority::Low)).is_err());
    assert!(registry.add_entry(entry(1, "-dash.sol", RegistryPriority::Low)).is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_remove_keeps_maps_in_sync() {
    let registry = LocalRegistry::new();
    registry.add_entry(entry(1, "alice.sol", RegistryPriority::Medium)).unwrap();

    assert!(registry.remove_entry(&address(1)));
    assert!(!registry.remove_entry(&address(1)));
    assert_eq!(registry.get_address("alice.sol"), None);
    assert_eq!(registry.stats().total, 0);
}

#[test]
fn test_search_ranks_priority_then_match_quality_then_length() {
    let registry = LocalRegistry::new();
    registry.import_entries(vec![
        entry(1, "solana-labs.sol", RegistryPriority::Medium),
        entry(2, "sol.skr", RegistryPriority::Low),
        entry(3, "mysolana.sol", RegistryPriority::High),
        entry(4, "solana.sol", RegistryPriority::Medium),
        entry(5, "alice.skr", RegistryPriority::High),
    ]);

    let domains: Vec<String> = registry
        .search_domains("solana", 10)
        .into_iter()
        .map(|e| e.domain)
        .collect();

    assert_eq!(domains, vec!["mysolana.sol", "solana.sol", "solana-labs.sol"]);
    assert_eq!(registry.search_domains("sol", 2).len(), 2);
    assert!(registry.search_domains("", 10).is_empty());
}

#[test]
fn test_search_matches_addresses() {
    let registry = LocalRegistry::new();
    registry.add_entry(entry(1, "alice.sol", RegistryPriority::Medium)).unwrap();

    let prefix = &address(1)[..8];
    let found = registry.search_domains(prefix, 5);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].domain, "alice.sol");
}

#[test]
fn test_stats_follow_every_mutation() {
    let registry = LocalRegistry::new();
    registry.import_entries(vec![
        entry(1, "a.sol", RegistryPriority::High),
        entry(2, "b.skr", RegistryPriority::Low),
        RegistryEntry::new(address(3), "c.sol", RegistrySource::Verified, RegistryPriority::High),
    ]);

    let stats = registry.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.sol, 2);
    assert_eq!(stats.skr, 1);
    assert_eq!(stats.verified, 1);
    assert_eq!(stats.community, 2);
    assert_eq!(stats.high_priority, 2);

    registry.remove_entry(&address(1));
    assert_eq!(registry.stats().high_priority, 1);

    registry.clear();
    assert_eq!(registry.stats().total, 0);
}

#[test]
fn test_import_reports_rejections_and_export_round_trips() {
    let registry = LocalRegistry::new();
    let report = registry.import_entries(vec![
        entry(1, "a.sol", RegistryPriority::High),
        entry(2, "", RegistryPriority::High),
    ]);
    assert_eq!(report.added, 1);
    assert_eq!(report.rejected, 1);

    let exported = registry.export_entries();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].kind, DomainKind::Sol);

    let copy = LocalRegistry::new();
    copy.import_entries(exported);
    assert_eq!(copy.get_domain(&address(1)).as_deref(), Some("a.sol"));
}

#[test]
fn test_import_normalizes_kind_from_domain() {
    let json = format!(
        r#"[{{"address":"{}","domain":"Bob.SKR","source":"verified"}}]"#,
        address(2)
    );
    let entries: Vec<RegistryEntry> = serde_json::from_str(&json).unwrap();

    let registry = LocalRegistry::new();
    registry.import_entries(entries);

    let stored = registry.get_entry(&address(2)).unwrap();
    assert_eq!(stored.kind, DomainKind::Skr);
    assert_eq!(stored.domain, "bob.skr");
    assert_eq!(stored.priority, RegistryPriority::Medium);
}

// ── remote source ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_load_remote_imports_valid_entries() {
    let body = format!(
        r#"[
            {{"address":"{}","domain":"Remote.sol","source":"verified","priority":"high"}},
            {{"address":"{}","domain":"team.skr"}},
            {{"address":"short","domain":"broken.sol"}}
        ]"#,
        address(7),
        address(8)
    );
    let url = serve_once("200 OK", body).await;
    let registry = LocalRegistry::new();

    let report = registry.load_remote(&local_client(), &url).await.unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.rejected, 1);
    assert_eq!(registry.get_address("remote.sol"), Some(address(7)));
    assert_eq!(registry.get_entry(&address(8)).unwrap().kind, DomainKind::Skr);
}

#[tokio::test]
async fn test_load_remote_server_error_is_network_error() {
    let url = serve_once("500 Internal Server Error", "oops").await;
    let registry = LocalRegistry::new();

    let err = registry.load_remote(&local_client(), &url).await.unwrap_err();

    assert!(err.is_network());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_load_remote_throttled_is_rate_limited() {
    let url = serve_once("429 Too Many Requests", "").await;
    let registry = LocalRegistry::new();

    let err = registry.load_remote(&local_client(), &url).await.unwrap_err();

    assert!(err.is_rate_limit());
}

#[tokio::test]
async fn test_load_remote_rejects_invalid_document() {
    let url = serve_once("200 OK", r#"{"entries": "not a list"}"#).await;
    let registry = LocalRegistry::new();

    let err = registry.load_remote(&local_client(), &url).await.unwrap_err();

    assert!(matches!(err, DomainError::Registry(_)));
    assert!(registry.is_empty());
}

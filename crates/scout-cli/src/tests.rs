use chrono::{Duration, Utc};
use scout_core::{ContentItem, CreatorSummary, EnrichedCreator, Platform, TargetTier};

use super::*;
use crate::run::{build_keywords, sort_by_recency, RunArgs, SortOrder};

fn run_args(argv: &[&str]) -> RunArgs {
    let mut full = vec!["scout-cli", "run"];
    full.extend_from_slice(argv);
    let cli = Cli::try_parse_from(full).expect("expected valid cli args");
    match cli.command {
        Some(Commands::Run(args)) => args,
        other => panic!("expected run command, got {other:?}"),
    }
}

#[test]
fn parses_run_with_defaults() {
    let args = run_args(&["--platform", "tiktok", "--keyword", "fitness"]);
    assert_eq!(args.platform, Platform::Tiktok);
    assert_eq!(args.keywords, ["fitness"]);
    assert_eq!(args.target, TargetTier::Small);
    assert_eq!(args.sort, SortOrder::Found);
    assert!(!args.expand);
    assert!(!args.no_enrichment);
    assert!(!args.sequential);
}

#[test]
fn parses_repeated_keywords_and_flags() {
    let args = run_args(&[
        "--platform",
        "ig",
        "--keyword",
        "yoga",
        "--keyword",
        "pilates",
        "--target",
        "1000",
        "--no-enrichment",
        "--sequential",
        "--sort",
        "recency",
    ]);
    assert_eq!(args.platform, Platform::Instagram);
    assert_eq!(args.keywords, ["yoga", "pilates"]);
    assert_eq!(args.target.results(), 1000);
    assert!(args.no_enrichment);
    assert!(args.sequential);
    assert_eq!(args.sort, SortOrder::Recency);
}

#[test]
fn rejects_unsupported_target() {
    let result = Cli::try_parse_from([
        "scout-cli",
        "run",
        "--platform",
        "tiktok",
        "--keyword",
        "yoga",
        "--target",
        "250",
    ]);
    assert!(result.is_err());
}

#[test]
fn run_requires_a_keyword() {
    let result = Cli::try_parse_from(["scout-cli", "run", "--platform", "tiktok"]);
    assert!(result.is_err());
}

#[test]
fn parses_platforms_command() {
    let cli = Cli::try_parse_from(["scout-cli", "platforms"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Platforms)));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["scout-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[tokio::test]
async fn expand_puts_seed_first_and_keeps_extra_keywords() {
    let args = run_args(&[
        "--platform",
        "tiktok",
        "--keyword",
        "yoga",
        "--keyword",
        "mobility",
        "--expand",
    ]);
    let keywords = build_keywords(&args, 3).await.unwrap();
    assert_eq!(keywords.as_slice(), ["yoga", "yoga creator", "yoga influencer"]);

    let keywords = build_keywords(&args, 20).await.unwrap();
    assert_eq!(keywords.as_slice().first().map(String::as_str), Some("yoga"));
    assert_eq!(keywords.as_slice().last().map(String::as_str), Some("mobility"));
}

#[tokio::test]
async fn keywords_without_expand_are_deduplicated() {
    let args = run_args(&[
        "--platform",
        "tiktok",
        "--keyword",
        "Yoga",
        "--keyword",
        "yoga",
    ]);
    let keywords = build_keywords(&args, 8).await.unwrap();
    assert_eq!(keywords.as_slice(), ["Yoga"]);
}

fn creator(id: &str, age_days: Option<i64>, likes: u64) -> EnrichedCreator {
    let now = Utc::now();
    EnrichedCreator::unenriched(CreatorSummary {
        platform: Platform::Tiktok,
        external_id: id.to_string(),
        username: id.to_string(),
        display_name: None,
        follower_count: 0,
        verified: false,
        bio: String::new(),
        content: vec![ContentItem {
            id: format!("{id}-post"),
            url: None,
            caption: None,
            views: 0,
            likes,
            comments: 0,
            posted_at: age_days.map(|d| now - Duration::days(d)),
        }],
        matched_keyword: "yoga".to_string(),
    })
}

#[test]
fn recency_sort_puts_newest_first_then_engagement() {
    let mut creators = vec![
        creator("old", Some(90), 1_000),
        creator("undated-low", None, 5),
        creator("fresh", Some(1), 10),
        creator("undated-high", None, 50),
    ];
    sort_by_recency(&mut creators, Utc::now());
    let order: Vec<&str> = creators
        .iter()
        .map(|c| c.summary.external_id.as_str())
        .collect();
    assert_eq!(order, ["fresh", "old", "undated-high", "undated-low"]);
}

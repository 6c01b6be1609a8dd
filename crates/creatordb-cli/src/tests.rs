use clap::Parser;
use creatordb_core::Platform;
use creatordb_scoring::CampaignType;

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["creatordb", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Ping
        }
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["creatordb", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Migrate
        }
    ));
}

#[test]
fn parses_unify_without_flags() {
    let cli = Cli::try_parse_from(["creatordb", "unify"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Unify { dry_run: false }));
}

#[test]
fn parses_unify_dry_run() {
    let cli =
        Cli::try_parse_from(["creatordb", "unify", "--dry-run"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Unify { dry_run: true }));
}

#[test]
fn parses_score_with_campaign() {
    let cli = Cli::try_parse_from(["creatordb", "score", "--campaign", "betting"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Score {
            campaign: CampaignType::Betting,
            platform: None,
            profile_id: None,
            limit: 50,
            max_concurrent: None,
            json: false
        }
    ));
}

#[test]
fn parses_score_with_platform_filter() {
    let cli = Cli::try_parse_from([
        "creatordb",
        "score",
        "--campaign",
        "esports",
        "--platform",
        "twitch",
        "--limit",
        "10",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Score {
            campaign: CampaignType::Esports,
            platform: Some(Platform::Twitch),
            profile_id: None,
            limit: 10,
            max_concurrent: None,
            json: false
        }
    ));
}

#[test]
fn score_requires_a_campaign() {
    let result = Cli::try_parse_from(["creatordb", "score"]);
    assert!(result.is_err(), "expected missing --campaign to fail");
}

#[test]
fn score_rejects_unknown_campaign() {
    let result = Cli::try_parse_from(["creatordb", "score", "--campaign", "crypto"]);
    assert!(result.is_err(), "expected unknown campaign to fail");
}

#[test]
fn profile_id_conflicts_with_platform_filter() {
    let result = Cli::try_parse_from([
        "creatordb",
        "score",
        "--campaign",
        "betting",
        "--profile-id",
        "7",
        "--platform",
        "twitch",
    ]);
    assert!(result.is_err(), "expected conflicting filters to fail");
}

#[test]
fn parses_runs_with_default_limit() {
    let cli = Cli::try_parse_from(["creatordb", "runs"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Runs { limit: 20 }));
}

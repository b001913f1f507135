// tests/cli_args.rs

use clap::Parser;

use pipebuild::cli::{parse_flag, CliArgs, LogLevel, DEFAULT_TASK};
use pipebuild::logging::parse_level_str;
use pipebuild::{FlagValue, Flags};

#[test]
fn flags_parse_as_switches_or_values() {
    assert_eq!(parse_flag("release").unwrap(), ("release".to_string(), FlagValue::Switch));
    assert_eq!(
        parse_flag("mode=fast").unwrap(),
        ("mode".to_string(), FlagValue::Value("fast".to_string()))
    );
    assert_eq!(
        parse_flag("define=a=b").unwrap(),
        ("define".to_string(), FlagValue::Value("a=b".to_string()))
    );
    assert_eq!(
        parse_flag("empty=").unwrap(),
        ("empty".to_string(), FlagValue::Value(String::new()))
    );
    assert!(parse_flag("=value").is_err());
    assert!(parse_flag("").is_err());
}

#[test]
fn defaults_when_nothing_is_given() {
    let args = CliArgs::try_parse_from(["pipebuild"]).unwrap();
    assert_eq!(args.buildfile, "build.toml");
    assert!(!args.list_tasks);
    assert!(args.log_level.is_none());
    assert_eq!(args.task_names(), [DEFAULT_TASK]);
    assert!(args.user_flags().is_empty());
}

#[test]
fn tasks_flags_and_options_combine() {
    let args = CliArgs::try_parse_from([
        "pipebuild",
        "--buildfile",
        "ci/build.toml",
        "-f",
        "release",
        "--flag",
        "mode=fast",
        "--log-level",
        "debug",
        "clean",
        "build",
    ])
    .unwrap();

    assert_eq!(args.buildfile, "ci/build.toml");
    assert_eq!(args.task_names(), ["clean", "build"]);
    assert_eq!(args.log_level, Some(LogLevel::Debug));
    assert_eq!(
        args.user_flags(),
        Flags::new().with_switch("release").with_value("mode", "fast")
    );
}

#[test]
fn tasks_flag_requests_a_listing() {
    let args = CliArgs::try_parse_from(["pipebuild", "--tasks"]).unwrap();
    assert!(args.list_tasks);
    assert!(args.tasks.is_empty());
}

#[test]
fn malformed_flag_is_rejected_by_the_parser() {
    assert!(CliArgs::try_parse_from(["pipebuild", "--flag", "=x"]).is_err());
}

#[test]
fn log_levels_parse_case_insensitively() {
    assert_eq!(parse_level_str("DEBUG"), Some(tracing::Level::DEBUG));
    assert_eq!(parse_level_str(" warning "), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("pipebuild=debug"), None);
}

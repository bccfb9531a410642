//! Command line definition

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use snip_erase::{EraseOptions, SnapshotFilter, SnapshotSelector, TagList};
use std::path::PathBuf;

/// Flags shared by every subcommand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GlobalArgs {
    pub(crate) repo: Option<PathBuf>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) verbose: u8,
}

pub(crate) fn command() -> Command {
    Command::new("snip")
        .version(snip_erase::VERSION)
        .about("Remove files from content-addressed snapshots without touching the originals")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("repo")
                .long("repo")
                .short('r')
                .global(true)
                .env("SNIP_REPOSITORY")
                .value_parser(value_parser!(PathBuf))
                .help("Repository directory"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More logging (-v info, -vv debug, -vvv trace); ignored if RUST_LOG is set"),
        )
        .subcommand(
            Command::new("erase")
                .about("Write a new snapshot without PATH, leaving the original in place")
                .arg(
                    Arg::new("snapshot")
                        .long("snapshot")
                        .short('s')
                        .required(true)
                        .value_name("ID|latest")
                        .help("Snapshot id, unique id prefix, or \"latest\""),
                )
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Only consider snapshots from HOST when selecting latest"),
                )
                .arg(
                    Arg::new("path")
                        .long("path")
                        .value_name("PATH")
                        .action(ArgAction::Append)
                        .help("Only consider snapshots that include PATH when selecting latest"),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .value_name("TAG[,TAG...]")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(TagList))
                        .help("Only consider snapshots carrying all of these tags when selecting latest"),
                )
                .arg(
                    Arg::new("target")
                        .value_name("PATH")
                        .required(true)
                        .help("Path inside the snapshot to erase"),
                ),
        )
}

pub(crate) fn global_args(matches: &ArgMatches) -> GlobalArgs {
    GlobalArgs {
        repo: matches.get_one::<PathBuf>("repo").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        verbose: matches.get_count("verbose"),
    }
}

pub(crate) fn erase_options(matches: &ArgMatches) -> EraseOptions {
    let filter = SnapshotFilter {
        host: matches
            .get_one::<String>("host")
            .filter(|host| !host.is_empty())
            .cloned(),
        paths: matches
            .get_many::<String>("path")
            .map(|paths| paths.cloned().collect())
            .unwrap_or_default(),
        tags: matches
            .get_many::<TagList>("tag")
            .map(|tags| tags.cloned().collect())
            .unwrap_or_default(),
    };
    let snapshot = matches
        .get_one::<String>("snapshot")
        .map_or(SnapshotSelector::LATEST, String::as_str);
    let target = matches
        .get_one::<String>("target")
        .cloned()
        .unwrap_or_default();
    EraseOptions::new(target, SnapshotSelector::parse(snapshot, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> ArgMatches {
        command().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn erase_by_id() {
        let matches = parse(&["snip", "--repo", "/r", "erase", "--snapshot", "ab12", "a/b.txt"]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "erase");
        assert_eq!(global_args(&matches).repo, Some(PathBuf::from("/r")));
        assert_eq!(
            erase_options(sub),
            EraseOptions::new("a/b.txt", SnapshotSelector::Id("ab12".into()))
        );
    }

    #[test]
    fn latest_with_filters() {
        let matches = parse(&[
            "snip", "-vv", "erase", "-s", "latest", "--host", "laptop", "--path", "/home",
            "--tag", "daily,home", "--tag", "weekly", "home/.ssh",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        let options = erase_options(sub);

        assert_eq!(global_args(&matches).verbose, 2);
        assert_eq!(options.path, "home/.ssh");
        let expected = SnapshotFilter::new()
            .with_host("laptop")
            .with_paths(vec!["/home".into()])
            .with_tags(vec![
                TagList::new(vec!["daily".into(), "home".into()]),
                TagList::new(vec!["weekly".into()]),
            ]);
        assert_eq!(options.selector, SnapshotSelector::Latest(expected));
    }

    #[test]
    fn empty_host_means_any_host() {
        let matches = parse(&["snip", "erase", "-s", "latest", "--host", "", "a"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(
            erase_options(sub).selector,
            SnapshotSelector::Latest(SnapshotFilter::new())
        );
    }

    #[test]
    fn snapshot_and_target_are_required() {
        assert!(command().try_get_matches_from(["snip", "erase", "a"]).is_err());
        assert!(command()
            .try_get_matches_from(["snip", "erase", "--snapshot", "latest"])
            .is_err());
    }
}

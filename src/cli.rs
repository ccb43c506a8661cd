//! Main `ACMiner` binary command line arguments options.
//!
//! This module declares a function to build `clap` command line arguments
//! parser, so that it can be used from other places than the main binary,
//! such as from bash completion file generator.

use clap::{value_parser, Arg, ArgAction, Command};
use clap_complete::Shell;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn arg_debug() -> Arg {
    Arg::new("debug")
        .short('d')
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Activate debug mode")
}

fn arg_verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Activate verbose mode")
}

fn arg_ecslog() -> Arg {
    Arg::new("ecslog")
        .short('e')
        .long("ecslog")
        .action(ArgAction::SetTrue)
        .help("Output logs in ECS format")
}

fn arg_input() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .action(ArgAction::Set)
        .required(true)
        .help("Input def-use graph document (JSON)")
}

fn arg_output(help: &str) -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .action(ArgAction::Set)
        .help(help.to_string())
}

#[must_use]
pub fn acminer() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author(AUTHORS)
        .about(DESCRIPTION)
        .subcommand(mine())
        .subcommand(graph())
        .subcommand(
            Command::new("gen-completions")
                .about("Generates completions file")
                .arg(
                    Arg::new("shell")
                        .short('s')
                        .long("shell")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .help("Shell type for completion generation"),
                ),
        )
}

#[must_use]
pub fn mine() -> Command {
    Command::new("mine")
        .bin_name("am-mine")
        .version(VERSION)
        .author(AUTHORS)
        .about("Mines the values compared by the control predicates of an entry point")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output JSON file (results are printed if not set)"))
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .action(ArgAction::Set)
                .value_parser(value_parser!(usize))
                .help("Number of worker threads (defaults to available parallelism)"),
        )
        .arg(
            Arg::new("sub-capture")
                .short('s')
                .long("sub-capture")
                .action(ArgAction::SetTrue)
                .help("Do not replace parameters of the entry point by ALL"),
        )
        .arg(
            Arg::new("additional")
                .short('a')
                .long("additional")
                .action(ArgAction::Append)
                .value_parser(value_parser!(u32))
                .num_args(1..)
                .help("Mine the values of the given node ids instead of the start nodes"),
        )
}

#[must_use]
pub fn graph() -> Command {
    Command::new("graph")
        .bin_name("am-graph")
        .version(VERSION)
        .author(AUTHORS)
        .about("Renders the def-use graph of an entry point in dot format")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output dot file (printed if not set)"))
        .arg(
            Arg::new("filter")
                .short('f')
                .long("filter")
                .action(ArgAction::Set)
                .help("Start node(s) regex filter"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_consistent() {
        acminer().debug_assert();
        mine().debug_assert();
        graph().debug_assert();
    }

    #[test]
    fn mine_arguments() {
        let args = acminer()
            .try_get_matches_from([
                "acminer", "mine", "-i", "doc.json", "-t", "4", "--sub-capture", "-a", "3", "7",
            ])
            .unwrap();
        let (name, sub_args) = args.subcommand().unwrap();
        assert_eq!(name, "mine");
        assert_eq!(sub_args.get_one::<String>("input").unwrap(), "doc.json");
        assert_eq!(sub_args.get_one::<usize>("threads"), Some(&4));
        assert!(sub_args.get_flag("sub-capture"));
        assert!(!sub_args.get_flag("debug"));
        let ids: Vec<u32> = sub_args
            .get_many::<u32>("additional")
            .unwrap()
            .copied()
            .collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn missing_input_is_rejected() {
        assert!(mine().try_get_matches_from(["am-mine"]).is_err());
        assert!(graph()
            .try_get_matches_from(["am-graph", "-i", "doc.json", "--filter"])
            .is_err());
        assert!(mine()
            .try_get_matches_from(["am-mine", "-i", "doc.json", "-t", "many"])
            .is_err());
    }
}

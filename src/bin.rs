use acminer::prelude::*;
use acminer::{am_graph, am_mine, cli};
use clap::ArgMatches;
use clap_complete::{generate, Shell};
use std::io;

fn main() -> AmResult<()> {
    let args = cli::acminer().get_matches();

    match &args.subcommand() {
        Some(("mine", cmd_args)) => am_mine::run(cmd_args),
        Some(("graph", cmd_args)) => am_graph::run(cmd_args),
        Some(("gen-completions", sub_args)) => subcommand_gen_completions(sub_args),
        Some((subcommand, _)) => Err(AmError::BadArguments(format!(
            "unknown subcommand '{subcommand}'"
        ))),
        None => Err(AmError::BadArguments("missing subcommand".to_string())),
    }
}

fn subcommand_gen_completions(sub_args: &ArgMatches) -> AmResult<()> {
    let generator = *sub_args
        .get_one::<Shell>("shell")
        .ok_or_else(|| AmError::BadArguments("--shell needed".to_string()))?;
    let mut cmd = cli::acminer();
    let cmd_name = cmd.get_name().to_string();
    generate(generator, &mut cmd, cmd_name, &mut io::stdout());
    Ok(())
}

use crate::prelude::*;
use clap::ArgMatches;
use regex::Regex;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> AmResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| AmError::BadArguments("--input needed".to_string()))?;
    let (ep, graph, _) = am_ir::open(input_fname)?.into_parts()?;

    let pattern = args
        .get_one::<String>("filter")
        .map(|r| Regex::new(r))
        .transpose()?;
    let graph = filter_graph(&graph, pattern.as_ref())?;

    log::info!(
        "def-use graph of {} contains {} nodes ({} start nodes) and {} edges",
        ep,
        graph.nb_nodes(),
        graph.start_nodes().count(),
        graph.nb_edges()
    );

    if let Some(dot_filename) = args.get_one::<String>("output") {
        let mut file = File::create(dot_filename)?;
        file.write_all(graph.to_dot().as_bytes())?;
        log::info!("dot output written in {:?}", dot_filename);
    } else {
        println!("{}", graph.to_dot());
    }

    Ok(())
}

/// Keeps the start nodes whose statement matches the pattern, and the nodes they reach.
fn filter_graph(graph: &DefUseGraph, pattern: Option<&Regex>) -> AmResult<DefUseGraph> {
    match pattern {
        None => Ok(graph.clone()),
        Some(pattern) => {
            log::debug!("filtering def-use graph on start node pattern {:?}", pattern);
            Ok(graph.filtered(|node| pattern.is_match(&node.to_string()))?)
        }
    }
}

use crate::prelude::*;
use am_miner::value_pair::Sources;
use clap::ArgMatches;
use nu_ansi_term::Color;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

pub fn run(args: &ArgMatches) -> AmResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| AmError::BadArguments("--input needed".to_string()))?;
    let (ep, graph, binder) = am_ir::open(input_fname)?.into_parts()?;

    let mut config = MinerConfig::default().with_sub_capture(args.get_flag("sub-capture"));
    if let Some(threads) = args.get_one::<usize>("threads") {
        config = config.with_threads(*threads);
    }
    let additional: Option<Vec<NodeId>> = args
        .get_many::<u32>("additional")
        .map(|ids| ids.copied().map(NodeId).collect());

    let miner = AcMiner::with_config(config)?;
    let results = match &additional {
        Some(ids) => miner.mine_additional_data(&ep, &graph, ids, &binder),
        None => miner.mine_data(&ep, &graph, &binder),
    };
    let results = match results {
        Ok(results) => results,
        Err(err) => {
            for exception in miner.get_and_clear_exceptions() {
                log::warn!("    - {}", exception);
            }
            return Err(err.into());
        }
    };
    if !miner.shutdown_when_finished() {
        log::warn!("some mining failures were not collected");
    }

    log::info!("{}: {}", ep, MiningSummary::from_results(&results));

    if let Some(json_filename) = args.get_one::<String>("output") {
        let mined = MinedEntryPoint::new(&ep, &graph, &results)?;
        let mut writer = BufWriter::new(File::create(json_filename)?);
        serde_json::to_writer_pretty(&mut writer, &mined)?;
        writer.flush()?;
        log::info!("json output written in {:?}", json_filename);
    } else {
        print_results(&ep, &graph, &results)?;
    }

    Ok(())
}

/// Print the pairs of each start node, the ones without pairs greyed out.
fn print_results(ep: &EntryPoint, graph: &DefUseGraph, results: &MiningResults) -> AmResult<()> {
    println!("{}", Color::Cyan.bold().paint(ep.to_string()));
    for (id, pairs) in results {
        let node = graph.node(*id)?;
        if pairs.is_empty() {
            println!("  {}", Color::DarkGray.paint(format!("[{id}] {node}")));
            continue;
        }
        println!("  [{id}] {node}");
        for pair in pairs {
            println!("    {}", Color::Green.paint(pair.to_quoted_string()?));
        }
    }
    Ok(())
}

/// JSON form of the results of an entry point.
#[derive(Debug, Serialize)]
pub struct MinedEntryPoint {
    pub stub: String,
    pub entry_point: String,
    pub start_nodes: Vec<MinedStartNode>,
}

#[derive(Debug, Serialize)]
pub struct MinedStartNode {
    pub id: NodeId,
    pub stmt: String,
    pub pairs: Vec<MinedPair>,
}

#[derive(Debug, Serialize)]
pub struct MinedPair {
    /// Quoted textual form, as parsed by [`ValuePair::parse_pair`].
    pub pair: String,
    pub op1: Option<String>,
    pub op2: Option<String>,
    pub sources: Vec<MinedSource>,
}

#[derive(Debug, Serialize)]
pub struct MinedSource {
    pub method: String,
    pub node: String,
    pub index: u32,
}

impl MinedEntryPoint {
    pub fn new(ep: &EntryPoint, graph: &DefUseGraph, results: &MiningResults) -> AmResult<Self> {
        let start_nodes = results
            .iter()
            .map(|(id, pairs)| -> AmResult<MinedStartNode> {
                Ok(MinedStartNode {
                    id: *id,
                    stmt: graph.node(*id)?.stmt().to_string(),
                    pairs: pairs.iter().map(MinedPair::new).collect::<AmResult<_>>()?,
                })
            })
            .collect::<AmResult<_>>()?;
        Ok(Self {
            stub: ep.stub().to_string(),
            entry_point: ep.entry_point().to_string(),
            start_nodes,
        })
    }
}

impl MinedPair {
    fn new(pair: &ValuePair) -> AmResult<Self> {
        Ok(Self {
            pair: pair.to_quoted_string()?,
            op1: pair.op1().map(ToString::to_string),
            op2: pair.op2().map(ToString::to_string),
            sources: MinedSource::flatten(pair.sources()),
        })
    }
}

impl MinedSource {
    fn flatten(sources: &Sources) -> Vec<Self> {
        sources
            .iter()
            .flat_map(|(method, stmts)| {
                stmts.iter().map(move |(text, stmt)| Self {
                    method: method.to_string(),
                    node: text.clone(),
                    index: stmt.index(),
                })
            })
            .collect()
    }
}

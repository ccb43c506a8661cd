use acminer::prelude::AmResult;
use acminer::{am_graph, cli};

fn main() -> AmResult<()> {
    let args = cli::graph().get_matches();
    am_graph::run(&args)
}

use acminer::prelude::AmResult;
use acminer::{am_mine, cli};

fn main() -> AmResult<()> {
    let args = cli::mine().get_matches();
    am_mine::run(&args)
}

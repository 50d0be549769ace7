use anyhow::Result;
use env_logger::Env;

use gir2ts::cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    cli::run()
}

use clap::Parser;
use weather_predictor::cli::{run, Cli};
use weather_predictor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

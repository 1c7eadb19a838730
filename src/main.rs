use clap::Parser as CliParser;

use yadfa::{execute, Config};

fn main() {
    let config = Config::parse();

    std::process::exit(execute(config));
}

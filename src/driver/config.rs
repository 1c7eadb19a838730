use clap::Parser;

/// Exactly one command is required; each takes the program file to operate
/// on.
#[derive(Parser, Debug)]
#[command(name = "yadfa", version, about = "yet another data flow analyzer", long_about = None)]
#[group(required = true, multiple = false)]
pub struct Config {
    /// Dump the instruction list and the raw cfg edges
    #[arg(long, value_name = "FILE")]
    pub raw_cfg: Option<String>,

    /// Emit a graphviz dot rendering of the cfg with gen/kill/live tables
    #[arg(long, value_name = "FILE")]
    pub dot_cfg: Option<String>,

    /// Dump the gen and kill sets
    #[arg(long, value_name = "FILE")]
    pub use_def: Option<String>,

    /// Run a dataflow analysis ("liveness") and plot the live intervals
    #[arg(long, num_args = 2, value_names = ["KIND", "FILE"])]
    pub analysis: Option<Vec<String>>,

    /// Print the program after dead code elimination
    #[arg(long, value_name = "FILE")]
    pub optimize: Option<String>,

    /// Lower to x86-64 and run the program in process
    #[arg(long, value_name = "FILE")]
    pub exec: Option<String>,

    /// Lower to x86-64 and print the code buffer in hex
    #[arg(long, value_name = "FILE")]
    pub dump_x86: Option<String>,
}

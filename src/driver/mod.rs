mod config;
mod error;

pub use config::Config;
pub use error::YadfaError;

use std::fs;

use termion::color;

use crate::analysis::{
    build_cfg, build_use_def_sets, compute_variable_live_ranges, liveness_analysis,
};
use crate::codegen::{dump_x86_64, exec, BuiltinFunctions};
use crate::display;
use crate::ir::{dump_program, parse_program, LabelTable, Program};
use crate::optimizer::optimize;

/// Runs one command and returns the process exit code: 0 on success, -1 on
/// any failure, with the error rendered in red on stderr.
pub fn execute(config: Config) -> i32 {
    match run(&config) {
        Ok(()) => 0,
        Err(err) => {
            let red = color::Fg(color::Red);
            let reset = color::Fg(color::Reset);
            eprintln!("{}yadfa{}: {}", red, reset, err.render());
            -1
        }
    }
}

fn run(config: &Config) -> Result<(), YadfaError> {
    if let Some(path) = &config.raw_cfg {
        let (program, table) = load_program(path)?;
        let cfg = build_cfg(&program, &table);
        print!("{}", display::cfg_to_string(&program, &cfg));
    } else if let Some(path) = &config.dot_cfg {
        let (program, table) = load_program(path)?;
        let cfg = build_cfg(&program, &table);
        let use_def = build_use_def_sets(&program);
        let liveness = liveness_analysis(&program, &cfg);
        print!("{}", display::cfg_to_dot(&program, &cfg, &use_def, &liveness));
    } else if let Some(path) = &config.use_def {
        let (program, _) = load_program(path)?;
        let use_def = build_use_def_sets(&program);
        print!("{}", display::gen_set_to_string(&use_def));
        print!("{}", display::kill_set_to_string(&use_def));
    } else if let Some(args) = &config.analysis {
        let kind = &args[0];
        if kind != "liveness" {
            return Err(YadfaError::UnknownAnalysis { kind: kind.clone() });
        }

        let (program, table) = load_program(&args[1])?;
        let cfg = build_cfg(&program, &table);
        let liveness = liveness_analysis(&program, &cfg);
        print!("{}", display::liveness_to_string(&liveness));

        let intervals = compute_variable_live_ranges(&liveness);
        print!("{}", display::intervals_to_string(&intervals));
        display::generate_gnuplot_interval(&intervals)
            .map_err(|err| YadfaError::Io { message: err.to_string() })?;
    } else if let Some(path) = &config.optimize {
        let (program, table) = load_program(path)?;
        let cfg = build_cfg(&program, &table);
        let liveness = liveness_analysis(&program, &cfg);
        let intervals = compute_variable_live_ranges(&liveness);
        let optimized = optimize(&program, &intervals);
        print!("{}", dump_program(&optimized));
    } else if let Some(path) = &config.exec {
        let (program, table) = load_program(path)?;
        let builtins = BuiltinFunctions::standard();
        // the program's return value is not observable through the cli
        let _ = exec(&program, &table, &builtins)?;
    } else if let Some(path) = &config.dump_x86 {
        let (program, table) = load_program(path)?;
        let builtins = BuiltinFunctions::standard();
        println!("{}", dump_x86_64(&program, &table, &builtins)?);
    }

    Ok(())
}

fn load_program(path: &str) -> Result<(Program, LabelTable), YadfaError> {
    let source = fs::read_to_string(path)
        .map_err(|_| YadfaError::FileNotFound { path: path.to_string() })?;
    Ok(parse_program(&source)?)
}

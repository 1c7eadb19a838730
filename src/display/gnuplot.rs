use std::fs::File;
use std::io::{self, Write};

use crate::analysis::VariableIntervals;

/// Writes the interval plot driver files into the working directory:
/// `variables.dat` maps variables to y positions, `intervals.dat` holds the
/// range endpoints, and `intervals.gpi` is the gnuplot script tying them
/// together.
pub fn generate_gnuplot_interval(intervals: &VariableIntervals) -> io::Result<()> {
    let variable_rows: Vec<&str> = intervals.variables().collect();
    let row_of = |name: &str| {
        variable_rows.iter().position(|&v| v == name).map(|p| p + 1).unwrap_or(0)
    };

    let mut min_range = usize::MAX;
    let mut max_range = usize::MIN;
    for (_, (first, last)) in intervals.iter() {
        min_range = min_range.min(first);
        max_range = max_range.max(last);
    }
    if intervals.is_empty() {
        min_range = 0;
        max_range = 0;
    }

    {
        let mut out = File::create("variables.dat")?;
        write!(out, "set ytics(")?;
        for (index, name) in variable_rows.iter().enumerate() {
            if index > 0 {
                write!(out, ",")?;
            }
            write!(out, "\"{name}\" {}", index + 1)?;
        }
        writeln!(out, ")")?;
    }

    {
        let mut out = File::create("intervals.dat")?;
        for (name, (first, last)) in intervals.iter() {
            let row = row_of(name);
            writeln!(out, "{first} {row}")?;
            writeln!(out, "{last} {row}")?;
            writeln!(out)?;
        }
    }

    {
        let mut out = File::create("intervals.gpi")?;
        writeln!(out, "set terminal png")?;
        writeln!(out, "set xrange[{min_range}:{max_range}]")?;
        writeln!(out, "set yrange[0:{}]", variable_rows.len() + 3)?;
        writeln!(out, "set style line 2 \\")?;
        writeln!(out, "\tlinecolor rgb '#dd181f' \\")?;
        writeln!(out, "\tlinetype 1 linewidth 2 \\")?;
        writeln!(out, "\tpointtype 5 pointsize 1.5")?;
        writeln!(out, "load \"variables.dat\"")?;
        writeln!(out, "plot 'intervals.dat' with linespoints linestyle 2 title ''")?;
    }

    Ok(())
}

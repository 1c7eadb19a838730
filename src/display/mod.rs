mod dot;
mod gnuplot;
mod raw;

pub use dot::cfg_to_dot;
pub use gnuplot::generate_gnuplot_interval;
pub use raw::{
    cfg_to_string, gen_set_to_string, intervals_to_string, kill_set_to_string,
    liveness_to_string,
};

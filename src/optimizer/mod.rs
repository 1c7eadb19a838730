mod dce;

pub use dce::{optimize, remove_dead_code};

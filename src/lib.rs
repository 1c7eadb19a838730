pub mod analysis;
pub mod codegen;
pub mod display;
pub mod driver;
pub mod ir;
pub mod optimizer;

pub use driver::{execute, Config};

use crate::cli::run;

mod archiver;
pub mod cli;
mod config;
pub mod domain;
pub mod external;
mod report;
pub mod storage;

fn main() {
    run();
}

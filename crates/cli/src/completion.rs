//! Shell completion generation for gearaxis

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

use crate::Cli;

pub fn generate_completion(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "gearaxis", &mut io::stdout());
}

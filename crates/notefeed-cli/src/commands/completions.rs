use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_completions(shell);

    match output_path {
        Some(path) => {
            std::fs::write(path, &script)?;
            println!("{}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }
    Ok(())
}

pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    let mut buffer = Vec::new();
    match shell {
        CompletionShell::Bash => write_script(shells::Bash, &mut buffer),
        CompletionShell::Zsh => write_script(shells::Zsh, &mut buffer),
        CompletionShell::Fish => write_script(shells::Fish, &mut buffer),
    }
    buffer
}

fn write_script<G: Generator>(generator: G, buffer: &mut Vec<u8>) {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    generate(generator, &mut command, bin_name, buffer);
}

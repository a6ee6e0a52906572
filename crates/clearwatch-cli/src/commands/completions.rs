use clap::{Args, CommandFactory};
use clap_complete::Shell;

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell
    shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = crate::Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "clearwatch", &mut std::io::stdout());
    Ok(())
}

mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config = cli.config.as_deref();
    match cli.command {
        Some(Command::Run(args)) => run::run(config, cli.run.merged_with(args)),
        Some(Command::Render(args)) => run::render(config, args),
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run::config_where(config),
            ConfigAction::Show => run::config_show(config),
        },
        None => run::run(config, cli.run),
    }
}

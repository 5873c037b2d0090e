use clap::Parser;
use ui_scenario_runner::cli::commands::{cmd_list, cmd_run, cmd_validate};
use ui_scenario_runner::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run(args) => {
            let all_passed = cmd_run(&args, &config, cli.verbose)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::List(args) => cmd_list(&args, &config)?,
        Commands::Validate(args) => cmd_validate(&args, &config)?,
    }

    Ok(())
}

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use cpal::traits::{DeviceTrait, HostTrait};

use ttaprops::config::{self, UserOverrides};
use ttaprops::{with_defaults, DevicePair, Outcome, Value};

#[derive(Parser)]
#[command(name = "ttaprops")]
#[command(about = "Default measurement properties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current default properties
    View {
        /// Print as JSON instead of aligned text
        #[arg(long)]
        json: bool,
    },
    /// List audio devices with their indices
    List,
    /// Change properties and remember them, e.g. `set samplingRate=48000 inChannel=[1,2]`
    Set {
        #[arg(required = true, value_name = "NAME=VALUE")]
        pairs: Vec<String>,
    },
    /// Forget remembered values and show the factory defaults
    Reset,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut overrides = UserOverrides::load();
    with_defaults(|props| {
        let updates = overrides.apply(props);
        let problems: Vec<String> = updates.iter().filter_map(|u| props.diagnostic(u)).collect();
        if !problems.is_empty() {
            let source = config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "saved overrides".to_string());
            for problem in problems {
                eprintln!("{}: {}", source, problem);
            }
        }
    });

    match cli.command.unwrap_or(Commands::View { json: false }) {
        Commands::View { json } => {
            if json {
                let text = with_defaults(|props| serde_json::to_string_pretty(props.settings()))?;
                println!("{}", text);
            } else {
                with_defaults(|props| props.view());
            }
        }
        Commands::List => {
            let selected = with_defaults(|props| props.device());
            list_devices(selected)?;
        }
        Commands::Set { pairs } => {
            let pairs = pairs
                .iter()
                .map(|pair| parse_pair(pair))
                .collect::<Result<Vec<_>>>()?;
            with_defaults(|props| {
                let updates = props.set_values(pairs);
                for update in &updates {
                    match &update.outcome {
                        Outcome::Applied => {
                            println!("  {} = {}", update.name, describe(props, &update.name))
                        }
                        Outcome::Unchanged => println!("  {} unchanged", update.name),
                        Outcome::Unrecognized | Outcome::Invalid(_) => {
                            if let Some(problem) = props.diagnostic(update) {
                                println!("  {}", problem);
                            }
                        }
                    }
                }
                overrides.merge(&updates, props);
            });
            overrides.save()?;
        }
        Commands::Reset => {
            if !overrides.is_empty() {
                overrides.clear();
                overrides.save()?;
                if let Some(path) = config::config_path() {
                    println!("Cleared {}", path.display());
                }
            }
            with_defaults(|props| {
                props.reset();
                props.view();
            });
        }
    }

    Ok(())
}

fn parse_pair(pair: &str) -> Result<(String, Value)> {
    let (name, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got {:?}", pair))?;
    Ok((name.trim().to_string(), Value::parse(raw.trim())))
}

fn describe(props: &ttaprops::Properties, name: &str) -> String {
    props.get(name).map(|v| v.to_string()).unwrap_or_default()
}

/// Prints the system input and output devices with their indices, marking
/// the selected ones.
fn list_devices(selected: DevicePair) -> Result<()> {
    let host = cpal::default_host();
    println!("Audio Host: {}", host.id().name());
    println!("\nInput Devices:");
    for (index, device) in host.input_devices()?.enumerate() {
        let mark = if selected.input == Some(index) { '>' } else { ' ' };
        let name = device.name().unwrap_or("Unknown".to_string());
        println!("{} {:>3} {}", mark, index, name);
    }
    println!("\nOutput Devices:");
    for (index, device) in host.output_devices()?.enumerate() {
        let mark = if selected.output == Some(index) { '<' } else { ' ' };
        let name = device.name().unwrap_or("Unknown".to_string());
        println!("{} {:>3} {}", mark, index, name);
    }
    Ok(())
}

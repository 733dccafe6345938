mod app;
mod autostart;
mod control;
mod core;
mod ipc;
#[cfg(target_os = "macos")]
mod macos;
mod platform;
mod scheduler;

use anyhow::{bail, Result};
use argh::FromArgs;
use autostart::{Autostart, LaunchAgent};
use ipc::{IpcClient, SOCKET_PATH};
use mousemover_ipc::{Command, MenuItem, Response};
use tracing_subscriber::EnvFilter;

use crate::core::{Config, DEFAULT_DISTANCE, DEFAULT_LONG_DELAY, DEFAULT_SHORT_DELAY};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mouse Mover - keeps the screen from locking by nudging an idle pointer
#[derive(FromArgs)]
#[argh(
    example = "{command_name} -s 3 -l 15 -d 10",
    example = "{command_name} --short-delay 2 --long-delay 60",
    note = "Without a command the daemon runs in the background. Control it with the \
            pause, resume, toggle, status, menu and quit commands, or send SIGUSR1 to \
            toggle pause."
)]
struct Cli {
    /// seconds between moves, 1-3600 (default: 5)
    #[argh(
        option,
        short = 's',
        default = "DEFAULT_SHORT_DELAY",
        from_str_fn(parse_short_delay)
    )]
    short_delay: u32,

    /// seconds to wait after user activity, 0-7200 (default: 30)
    #[argh(
        option,
        short = 'l',
        default = "DEFAULT_LONG_DELAY",
        from_str_fn(parse_long_delay)
    )]
    long_delay: u32,

    /// distance in pixels to move, 1-100 (default: 5)
    #[argh(
        option,
        short = 'd',
        default = "DEFAULT_DISTANCE",
        from_str_fn(parse_distance)
    )]
    distance: u32,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,

    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand)]
enum SubCommand {
    Pause(PauseCmd),
    Resume(ResumeCmd),
    Toggle(ToggleCmd),
    Status(StatusCmd),
    Menu(MenuCmd),
    Autostart(AutostartCmd),
    Quit(QuitCmd),
    Version(VersionCmd),
}

/// Pause pointer movement in the running daemon
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "pause")]
struct PauseCmd {}

/// Resume pointer movement in the running daemon
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "resume")]
struct ResumeCmd {}

/// Toggle between paused and active
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "toggle")]
struct ToggleCmd {}

/// Show the daemon status
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "status")]
struct StatusCmd {}

/// Show the daemon's context menu entries
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "menu")]
struct MenuCmd {}

/// Manage starting at login with the given delay and distance flags
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "autostart")]
struct AutostartCmd {
    /// enable, disable or status
    #[argh(positional)]
    action: String,
}

/// Stop the running daemon
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "quit")]
struct QuitCmd {}

/// Show version information
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

fn main() -> Result<()> {
    let cli = parse_cli();
    let config = Config::new(cli.short_delay, cli.long_delay, cli.distance)?;

    match cli.command {
        None => {
            init_logging(cli.verbose);
            tracing::info!("mousemover {} starting", VERSION);
            app::App::run(config)
        }
        Some(SubCommand::Version(_)) => {
            println!("mousemover {}", VERSION);
            Ok(())
        }
        Some(SubCommand::Autostart(cmd)) => run_autostart(&cmd.action, &config),
        Some(subcmd) => run_cli(subcmd),
    }
}

/// Help and parse errors both exit with status 1.
fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let (name, rest) = match args.split_first() {
        Some((name, rest)) => (*name, rest),
        None => ("mousemover", &[][..]),
    };

    match parse_args(name, rest) {
        Ok(cli) => cli,
        Err(exit) => {
            match exit.status {
                Ok(()) => println!("{}", exit.output),
                Err(()) => eprintln!(
                    "{}\nRun {} --help for more information.",
                    exit.output, name
                ),
            }
            std::process::exit(1);
        }
    }
}

/// argh only knows `--help`; `-h` is accepted as its short form.
fn parse_args(name: &str, args: &[&str]) -> Result<Cli, argh::EarlyExit> {
    let args: Vec<&str> = args
        .iter()
        .map(|arg| if *arg == "-h" { "--help" } else { *arg })
        .collect();
    Cli::from_args(&[name], &args)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_cli(subcmd: SubCommand) -> Result<()> {
    let cmd = to_command(subcmd)?;
    let mut client = IpcClient::connect(SOCKET_PATH)?;
    let response = client.send(&cmd)?;

    match response {
        Response::Ok => {}
        Response::Error { message } => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Response::Status { status } => {
            println!("{}", status.tooltip());
            println!("Paused: {}", status.paused);
            println!("Move every: {}s", status.short_delay);
            println!("Wait after activity: {}s", status.long_delay);
            println!("Distance: {}px", status.distance);
        }
        Response::Menu { items } => {
            for item in &items {
                println!("{}", format_menu_item(item));
            }
        }
    }

    Ok(())
}

fn to_command(subcmd: SubCommand) -> Result<Command> {
    match subcmd {
        SubCommand::Pause(_) => Ok(Command::Pause),
        SubCommand::Resume(_) => Ok(Command::Resume),
        SubCommand::Toggle(_) => Ok(Command::TogglePause),
        SubCommand::Status(_) => Ok(Command::Status),
        SubCommand::Menu(_) => Ok(Command::Menu),
        SubCommand::Quit(_) => Ok(Command::Quit),
        SubCommand::Autostart(_) | SubCommand::Version(_) => {
            bail!("not a daemon command")
        }
    }
}

fn format_menu_item(item: &MenuItem) -> String {
    match item {
        MenuItem::Separator => "-".repeat(16),
        MenuItem::Action { label, checked, .. } => {
            if *checked {
                format!("[x] {}", label)
            } else {
                format!("    {}", label)
            }
        }
    }
}

fn run_autostart(action: &str, config: &Config) -> Result<()> {
    let agent = LaunchAgent::for_current_user(config)?;
    match action {
        "enable" => {
            agent.set_enabled(true)?;
            println!("Autostart enabled ({})", agent.plist_path().display());
        }
        "disable" => {
            agent.set_enabled(false)?;
            println!("Autostart disabled");
        }
        "status" => {
            let state = if agent.is_enabled() {
                "enabled"
            } else {
                "disabled"
            };
            println!("Autostart {}", state);
        }
        _ => bail!(
            "Unknown autostart action: {} (use enable, disable or status)",
            action
        ),
    }
    Ok(())
}

fn parse_short_delay(value: &str) -> Result<u32, String> {
    parse_number(value, "short-delay")
}

fn parse_long_delay(value: &str) -> Result<u32, String> {
    parse_number(value, "long-delay")
}

fn parse_distance(value: &str) -> Result<u32, String> {
    parse_number(value, "distance")
}

fn parse_number(value: &str, name: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("Invalid {} parameter: {}", name, value))
}

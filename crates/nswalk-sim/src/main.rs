use clap::{Parser, Subcommand};

use commands::demo::{self, DemoArgs};
use commands::doctor::{self, DoctorArgs};
use commands::walk::{self, WalkArgs};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "nswalk-sim", about = "Bounded-walk driver CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every step family once over the built-in engine and print a report.
    Demo(DemoArgs),
    /// Run one configured walk over a configuration snapshot.
    Walk(WalkArgs),
    /// Check engine discovery and the built-in backend.
    Doctor(DoctorArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Demo(args) => demo::run(args),
        Command::Walk(args) => walk::run(args),
        Command::Doctor(args) => doctor::run(args),
    };
    if let Err(err) = result {
        eprintln!("nswalk-sim: {err}");
        std::process::exit(1);
    }
}

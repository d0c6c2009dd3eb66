//! WheelForge - Prize wheel runner
//!
//! Usage:
//!   wheelforge run [--config P] [--broker HOST:PORT] [--offline]   - Headless session
//!   wheelforge simulate [--config P] [--spins N] [--seed N]         - Silent batch report
//!   wheelforge paytable [--config P]                                - Payouts & odds
//!   wheelforge check-config P                                       - Validate a config file

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use wf_wheel::TimingProfile;

#[derive(Parser)]
#[command(name = "wheelforge", version, about = "Prize wheel spin engine and button sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wheel with stdin as the operator console
    Run {
        /// YAML or JSON session config
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Broker address (host or host:port)
        #[arg(long)]
        broker: Option<String>,
        /// Play without a broker
        #[arg(long)]
        offline: bool,
        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Spin timing profile
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
        /// Target frame rate
        #[arg(long)]
        fps: Option<u32>,
    },
    /// Run a silent batch and print the statistics
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Spins in the batch
        #[arg(short, long)]
        spins: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print payout groups and per-face odds
    Paytable {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load and validate a config file
    CheckConfig {
        path: PathBuf,
        /// Print the resolved config as YAML
        #[arg(long)]
        dump: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Normal,
    Quick,
    Studio,
}

impl From<ProfileArg> for TimingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Normal => TimingProfile::Normal,
            ProfileArg::Quick => TimingProfile::Quick,
            ProfileArg::Studio => TimingProfile::Studio,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            broker,
            offline,
            seed,
            profile,
            fps,
        } => cmd::run::execute(cmd::run::RunOptions {
            config,
            broker,
            offline,
            seed,
            profile: profile.map(Into::into),
            fps,
        }),
        Commands::Simulate {
            config,
            spins,
            seed,
        } => cmd::simulate::execute(config.as_deref(), spins, seed),
        Commands::Paytable { config } => cmd::paytable::execute(config.as_deref()),
        Commands::CheckConfig { path, dump } => cmd::check::execute(&path, dump),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "wheelforge",
            "run",
            "--broker",
            "10.0.0.2:1884",
            "--seed",
            "9",
            "--profile",
            "quick",
            "--offline",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                broker,
                seed,
                profile,
                offline,
                ..
            } => {
                assert_eq!(broker.as_deref(), Some("10.0.0.2:1884"));
                assert_eq!(seed, Some(9));
                assert_eq!(profile, Some(ProfileArg::Quick));
                assert!(offline);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_parse_check_config() {
        let cli = Cli::try_parse_from(["wheelforge", "check-config", "wheel.yaml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::CheckConfig { ref path, dump: false } if path == &PathBuf::from("wheel.yaml")
        ));
        assert!(Cli::try_parse_from(["wheelforge", "check-config"]).is_err());
    }

    #[test]
    fn test_profile_arg_maps() {
        assert_eq!(TimingProfile::from(ProfileArg::Studio), TimingProfile::Studio);
    }
}

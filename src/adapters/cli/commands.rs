//! CLI Command Definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::domain::PositionState;

/// Ocean Reversion - single-pair band mean reversion bot
#[derive(Parser, Debug)]
#[command(
    name = "ocean-reversion",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Single-pair band mean reversion bot",
    long_about = "Samples hourly closes, derives a moving average and a one-sigma entry band \
                  with a two-sigma stop, and trades a single long or short position."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the trading loop
    Run(RunCmd),

    /// Compute the current bands and show what the bot would do
    Signal(SignalCmd),

    /// List token pairs offered by the exchange
    Pairs,

    /// Show the account's quote token balance
    Balance,
}

/// Start trading loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Run in paper trading mode (no real orders)
    #[arg(short, long)]
    pub paper: bool,

    /// Run a single decision cycle and exit
    #[arg(long)]
    pub once: bool,
}

/// Dry-run a single evaluation
#[derive(Parser, Debug)]
pub struct SignalCmd {
    /// Evaluate as if holding this state
    #[arg(long, value_enum, default_value_t = StateArg::Initial)]
    pub state: StateArg,
}

/// Position state to evaluate against
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateArg {
    /// The startup state the configuration selects
    Initial,
    Flat,
    Long,
    Short,
}

impl StateArg {
    /// Resolve to a position state; `Initial` follows `normalize_initial_direction`
    pub fn resolve(self, normalize_initial_direction: bool) -> PositionState {
        match self {
            StateArg::Initial => PositionState::initial(normalize_initial_direction),
            StateArg::Flat => PositionState::flat(),
            StateArg::Long => PositionState::long(),
            StateArg::Short => PositionState::short(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_paper_once() {
        let app = CliApp::try_parse_from(["ocean-reversion", "run", "--paper", "--once"]).unwrap();
        match app.command {
            Command::Run(cmd) => {
                assert!(cmd.paper);
                assert!(cmd.once);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(app.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let app = CliApp::try_parse_from(["ocean-reversion", "pairs", "-c", "/tmp/bot.toml", "--debug"]).unwrap();
        assert!(matches!(app.command, Command::Pairs));
        assert_eq!(app.config, PathBuf::from("/tmp/bot.toml"));
        assert!(app.debug);
    }

    #[test]
    fn test_signal_state_arg() {
        let app = CliApp::try_parse_from(["ocean-reversion", "signal", "--state", "long"]).unwrap();
        match app.command {
            Command::Signal(cmd) => assert_eq!(cmd.state.resolve(true), PositionState::long()),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_signal_state_default() {
        let app = CliApp::try_parse_from(["ocean-reversion", "signal"]).unwrap();
        match app.command {
            Command::Signal(cmd) => assert_eq!(cmd.state, StateArg::Initial),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_initial_state_follows_normalization() {
        assert_eq!(StateArg::Initial.resolve(false), PositionState::INITIAL);
        assert_eq!(StateArg::Initial.resolve(true), PositionState::initial(true));
        assert_eq!(StateArg::Initial.resolve(true).direction(), crate::domain::Direction::None);
        assert_eq!(StateArg::Short.resolve(true), PositionState::short());
    }
}

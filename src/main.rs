//! Ocean Reversion - Single-pair band mean reversion bot
//!
//! Trades one token pair on the exchange from hourly bars.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use ocean_reversion::adapters::cli::{CliApp, Command, RunCmd, SignalCmd};
use ocean_reversion::adapters::{Erc20BalanceClient, OceanClient, OceanConfig, PaperExecutor};
use ocean_reversion::application::{CycleOutcome, CycleSettings, PairSelector, TradingOrchestrator};
use ocean_reversion::config::{load_config, Config};
use ocean_reversion::domain::TokenPair;
use ocean_reversion::ports::{MarketDataSource, OrderExecutor, WalletQuery};
use ocean_reversion::strategy::{self, derive_bands, PositionStateMachine, StrategyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config = load_config(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Signal(cmd) => signal_command(cmd, config).await,
        Command::Pairs => pairs_command(config).await,
        Command::Balance => balance_command(config).await,
    }
}

/// Flags win, then RUST_LOG, then the configured level
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    Ok(())
}

fn ocean_client(config: &Config) -> Result<OceanClient> {
    let ocean_config = OceanConfig {
        api_base_url: config.exchange.api_url.clone(),
        api_key: config.exchange.get_api_key(),
        api_secret: config.exchange.get_api_secret(),
        timeout: StrategyConfig::from(config).call_timeout(),
    };
    OceanClient::new(ocean_config).context("Failed to create exchange client")
}

fn balance_client(config: &Config, pair: &TokenPair) -> Result<Erc20BalanceClient> {
    let decimals = pair.quote.decimals.unwrap_or(config.node.quote_decimals);
    Erc20BalanceClient::new(
        config.node.get_rpc_url(),
        decimals,
        StrategyConfig::from(config).call_timeout(),
    )
    .context("Failed to create node client")
}

fn account_address(config: &Config) -> Result<String> {
    match config.node.get_account_address() {
        Some(address) => Ok(address),
        None => bail!(
            "No bot account configured.\n\n\
             Set 'account_address' under [node] in the config file,\n\
             or export BOT_ADDRESS (a .env file works too)."
        ),
    }
}

fn pair_selector(config: &Config) -> PairSelector {
    PairSelector {
        base_symbol: config.exchange.base_symbol.clone(),
        quote_symbol: config.exchange.quote_symbol.clone(),
    }
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    tracing::info!("Starting ocean-reversion...");

    let strategy_config = StrategyConfig::from(&config);
    let account = account_address(&config)?;

    let ocean = Arc::new(ocean_client(&config)?);
    if !cmd.paper && (config.exchange.get_api_key().is_none() || config.exchange.get_api_secret().is_none()) {
        bail!(
            "Live trading needs exchange credentials.\n\n\
             Set OCEAN_API_KEY and OCEAN_API_SECRET, or run with --paper."
        );
    }

    let pair = pair_selector(&config)
        .resolve(ocean.as_ref())
        .await
        .context("Failed to select trading pair")?;

    let wallet: Arc<dyn WalletQuery> = Arc::new(balance_client(&config, &pair)?);
    let executor: Arc<dyn OrderExecutor> = if cmd.paper {
        tracing::warn!("PAPER TRADING MODE - no real orders");
        Arc::new(PaperExecutor::new())
    } else {
        ocean.clone()
    };

    let settings = CycleSettings::from_strategy(&strategy_config, account, config.exchange.fee_option);
    let orchestrator = TradingOrchestrator::new(ocean, wallet, executor, &strategy_config, pair, settings);

    if cmd.once {
        let outcome = orchestrator.tick().await.context("Decision cycle failed")?;
        print_outcome(&outcome);
        return Ok(());
    }

    // Setup Ctrl+C handler
    let orch = orchestrator.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        orch.stop().await;
    });

    orchestrator.run().await;
    tracing::info!(state = %orchestrator.state().await, "ocean-reversion stopped");
    Ok(())
}

async fn signal_command(cmd: SignalCmd, config: Config) -> Result<()> {
    let strategy_config = StrategyConfig::from(&config);
    let ocean = ocean_client(&config)?;
    let pair = pair_selector(&config)
        .resolve(&ocean)
        .await
        .context("Failed to select trading pair")?;

    let settings = CycleSettings::from_strategy(&strategy_config, String::new(), config.exchange.fee_option);
    let (start, end) = settings.bar_range(chrono::Utc::now().timestamp())?;
    let bars = ocean
        .recent_bars(&pair, start, end, strategy_config.interval_secs)
        .await
        .context("Failed to fetch bars")?;

    let statistics = strategy::compute(&bars, strategy_config.window_size)?;
    let bands = derive_bands(statistics.standard_deviation)?;
    let last = ocean.last_price(&pair).await.context("Failed to fetch last price")?;

    let state = cmd.state.resolve(strategy_config.normalize_initial_direction);
    let evaluation = PositionStateMachine::new(strategy_config.sizing_fraction).evaluate(
        last,
        statistics.moving_average,
        &bands,
        state,
    );

    println!("Pair:          {}", pair);
    println!("Bars:          {} (window {})", bars.len(), strategy_config.window_size);
    println!("Average:       {}", statistics.moving_average.round_dp(8));
    println!("Std dev:       {}", statistics.standard_deviation.round_dp(8));
    println!(
        "Entry band:    {} .. {}",
        bands.lower_entry(statistics.moving_average).round_dp(8),
        bands.upper_entry(statistics.moving_average).round_dp(8)
    );
    println!(
        "Stop levels:   {} .. {}",
        bands.lower_stop(statistics.moving_average).round_dp(8),
        bands.upper_stop(statistics.moving_average).round_dp(8)
    );
    println!("Last price:    {}", last);
    println!("State:         {}", state);
    match evaluation.decision {
        Some(decision) => println!(
            "Decision:      {} via {} -> {}",
            decision.side, decision.rule, evaluation.state
        ),
        None => println!("Decision:      hold"),
    }

    Ok(())
}

async fn pairs_command(config: Config) -> Result<()> {
    let ocean = ocean_client(&config)?;
    let pairs = ocean.token_pairs().await.context("Failed to list token pairs")?;

    if pairs.is_empty() {
        println!("No token pairs listed");
        return Ok(());
    }

    for pair in &pairs {
        println!("{:<16} base {}  quote {}", pair.symbol(), pair.base.address, pair.quote.address);
    }
    Ok(())
}

async fn balance_command(config: Config) -> Result<()> {
    let account = account_address(&config)?;
    let ocean = ocean_client(&config)?;
    let pair = pair_selector(&config)
        .resolve(&ocean)
        .await
        .context("Failed to select trading pair")?;

    let wallet = balance_client(&config, &pair)?;
    let balance = wallet
        .quote_balance(&account, &pair.quote.address)
        .await
        .context("Failed to get balance")?;

    println!("Account: {}", account);
    println!("Balance: {} {}", balance, pair.quote.symbol);
    Ok(())
}

fn print_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Held { last_price, state, .. } => {
            println!("Held at {} in state {}", last_price, state);
        }
        CycleOutcome::Traded { decision, base_amount, result, state } => {
            println!(
                "{} {} ({}) order {} -> {}",
                decision.side, base_amount, decision.rule, result.order_id, state
            );
        }
        CycleOutcome::Skipped => println!("Skipped: previous cycle still running"),
    }
}

//! Trading Orchestrator
//!
//! Runs the decision cycle: fetch bars → statistics → bands → last price →
//! state machine → (balance → order) → commit state.
//!
//! The position state lives behind a `tokio::sync::Mutex` that doubles as the
//! single-flight guard. A tick that finds it held is dropped. State is only
//! written after the executor confirms the order, so every failure path leaves
//! it untouched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::time::MissedTickBehavior;

use crate::domain::{FeeOption, MarketOrder, OrderResult, PositionState, TokenPair, TradeDecision};
use crate::ports::{MarketDataSource, OrderExecutor, PortError, WalletQuery};
use crate::strategy::{self, derive_bands, Bands, PositionStateMachine, Statistics, StrategyConfig, StrategyError};

#[derive(Debug, Error, PartialEq)]
pub enum CycleError {
    #[error("Insufficient data: requires {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("External call '{call}' failed: {source}")]
    ExternalCallFailure {
        call: &'static str,
        #[source]
        source: PortError,
    },
    #[error("Order rejected: {0}")]
    OrderRejected(String),
}

impl From<StrategyError> for CycleError {
    fn from(e: StrategyError) -> Self {
        match e {
            StrategyError::InsufficientData { required, available } => {
                CycleError::InsufficientData { required, available }
            }
            StrategyError::InvalidInput(msg) => CycleError::InvalidInput(msg),
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No rule fired
    Held {
        last_price: Decimal,
        statistics: Statistics,
        bands: Bands,
        state: PositionState,
    },
    /// An order was filled and the new state committed
    Traded {
        decision: TradeDecision,
        base_amount: Decimal,
        result: OrderResult,
        state: PositionState,
    },
    /// Another cycle was still in flight
    Skipped,
}

/// Per-cycle parameters the orchestrator needs besides the strategy
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub window_size: usize,
    pub interval: Duration,
    pub bar_end_offset_secs: u64,
    pub call_timeout: Duration,
    pub account_address: String,
    pub fee_option: FeeOption,
}

impl CycleSettings {
    pub fn from_strategy(config: &StrategyConfig, account_address: String, fee_option: FeeOption) -> Self {
        Self {
            window_size: config.window_size,
            interval: config.interval(),
            bar_end_offset_secs: config.bar_end_offset_secs,
            call_timeout: config.call_timeout(),
            account_address,
            fee_option,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// `[now - interval * (Q + 1), now - offset]`
    pub fn bar_range(&self, now: i64) -> Result<(i64, i64), CycleError> {
        let overflow = || {
            CycleError::InvalidInput(format!(
                "bar range overflows: interval {:?}, window {}",
                self.interval, self.window_size
            ))
        };
        let interval = i64::try_from(self.interval.as_secs()).map_err(|_| overflow())?;
        let bars = i64::try_from(self.window_size)
            .ok()
            .and_then(|q| q.checked_add(1))
            .ok_or_else(overflow)?;
        let offset = i64::try_from(self.bar_end_offset_secs).map_err(|_| overflow())?;

        let start = interval
            .checked_mul(bars)
            .and_then(|lookback| now.checked_sub(lookback))
            .ok_or_else(overflow)?;
        let end = now.checked_sub(offset).ok_or_else(overflow)?;
        Ok((start, end))
    }
}

/// Status snapshot of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub is_running: bool,
    pub pair: String,
    /// `None` while a cycle holds the state
    pub state: Option<PositionState>,
}

/// Coordinates strategy and execution for one pair
#[derive(Clone)]
pub struct TradingOrchestrator {
    market: Arc<dyn MarketDataSource>,
    wallet: Arc<dyn WalletQuery>,
    executor: Arc<dyn OrderExecutor>,
    machine: PositionStateMachine,
    pair: TokenPair,
    settings: CycleSettings,
    state: Arc<Mutex<PositionState>>,
    is_running: Arc<RwLock<bool>>,
    stop_requested: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
}

impl TradingOrchestrator {
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        wallet: Arc<dyn WalletQuery>,
        executor: Arc<dyn OrderExecutor>,
        strategy_config: &StrategyConfig,
        pair: TokenPair,
        settings: CycleSettings,
    ) -> Self {
        Self {
            market,
            wallet,
            executor,
            machine: PositionStateMachine::new(strategy_config.sizing_fraction),
            pair,
            settings,
            state: Arc::new(Mutex::new(PositionState::initial(
                strategy_config.normalize_initial_direction,
            ))),
            is_running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Start from a given state instead of the initial one
    pub fn with_state(self, state: PositionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            ..self
        }
    }

    /// Run the scheduler loop until `stop` is called.
    ///
    /// The first cycle runs immediately, then once per interval. Ticks missed
    /// while a cycle is running are dropped. Returns at once if `stop` was
    /// already called.
    pub async fn run(&self) {
        {
            let stop_requested = self.stop_requested.read().await;
            if *stop_requested {
                tracing::info!("Stop already requested, not starting");
                return;
            }
            *self.is_running.write().await = true;
        }

        tracing::info!(
            pair = %self.pair,
            interval = ?self.settings.interval,
            window = self.settings.window_size,
            "Starting trading orchestrator"
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while *self.is_running.read().await {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => break,
                _ = interval.tick() => {}
            }
            if !*self.is_running.read().await {
                break;
            }

            // Per-cycle failures never stop the loop
            if let Err(e) = self.tick().await {
                tracing::error!("Cycle failed: {}", e);
            }
        }

        *self.is_running.write().await = false;
        tracing::info!("Trading orchestrator stopped");
    }

    /// Stop the trading loop
    pub async fn stop(&self) {
        let mut stop_requested = self.stop_requested.write().await;
        *stop_requested = true;
        *self.is_running.write().await = false;
        drop(stop_requested);
        self.shutdown.notify_one();
        tracing::info!("Stop signal sent to orchestrator");
    }

    /// Execute one decision cycle at the current wall-clock time
    pub async fn tick(&self) -> Result<CycleOutcome, CycleError> {
        self.tick_at(chrono::Utc::now().timestamp()).await
    }

    /// Execute one decision cycle as if it were `now` (unix seconds)
    pub async fn tick_at(&self, now: i64) -> Result<CycleOutcome, CycleError> {
        let mut state = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("Previous cycle still in flight, dropping tick");
                return Ok(CycleOutcome::Skipped);
            }
        };

        let (start, end) = self.settings.bar_range(now)?;
        let bars = self
            .call(
                "recent_bars",
                self.market.recent_bars(&self.pair, start, end, self.settings.interval.as_secs()),
            )
            .await?;

        let statistics = strategy::compute(&bars, self.settings.window_size).map_err(|e| {
            tracing::warn!(bars = bars.len(), "Skipping cycle: {}", e);
            CycleError::from(e)
        })?;
        let bands = derive_bands(statistics.standard_deviation)?;

        let last = self.call("last_price", self.market.last_price(&self.pair)).await?;

        let evaluation = self.machine.evaluate(last, statistics.moving_average, &bands, *state);

        let decision = match evaluation.decision {
            Some(decision) => decision,
            None => {
                tracing::info!(
                    "{} {} | avg {} | band {} | stop {} | z {} | state {} | HOLD",
                    self.pair,
                    last,
                    statistics.moving_average.round_dp(8),
                    bands.position_band.round_dp(8),
                    bands.stop_loss_level.round_dp(8),
                    statistics.z_score(last).map(|z| z.round_dp(2).to_string()).unwrap_or_else(|| "-".into()),
                    *state,
                );
                return Ok(CycleOutcome::Held {
                    last_price: last,
                    statistics,
                    bands,
                    state: *state,
                });
            }
        };

        tracing::info!(
            "{} {} | avg {} | band {} | {} -> {} ({})",
            self.pair,
            last,
            statistics.moving_average.round_dp(8),
            bands.position_band.round_dp(8),
            *state,
            evaluation.state,
            decision.rule,
        );

        let balance = self
            .call(
                "quote_balance",
                self.wallet
                    .quote_balance(&self.settings.account_address, &self.pair.quote.address),
            )
            .await?;

        let base_amount = decision
            .base_amount(balance, last)
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or_else(|| {
                CycleError::InvalidInput(format!(
                    "cannot size order from balance {} at price {}",
                    balance, last
                ))
            })?;

        let order = MarketOrder {
            pair: self.pair.clone(),
            side: decision.side,
            base_amount,
            fee_option: self.settings.fee_option,
        };

        let result = self
            .call("submit_market_order", self.executor.submit_market_order(order))
            .await
            .map_err(|e| match e {
                CycleError::ExternalCallFailure {
                    source: PortError::Rejected(reason),
                    ..
                } => CycleError::OrderRejected(reason),
                other => other,
            })?;

        tracing::info!(
            order_id = %result.order_id,
            side = %decision.side,
            amount = %base_amount,
            "Order filled"
        );

        *state = evaluation.state;

        Ok(CycleOutcome::Traded {
            decision,
            base_amount,
            result,
            state: evaluation.state,
        })
    }

    /// Await an external call under the configured timeout
    async fn call<T, F>(&self, name: &'static str, fut: F) -> Result<T, CycleError>
    where
        F: Future<Output = Result<T, PortError>>,
    {
        let source = match tokio::time::timeout(self.settings.call_timeout, fut).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => PortError::Timeout(self.settings.call_timeout),
        };
        tracing::warn!(call = name, "External call failed: {}", source);
        Err(CycleError::ExternalCallFailure { call: name, source })
    }

    /// Current position state, waiting for any in-flight cycle
    pub async fn state(&self) -> PositionState {
        *self.state.lock().await
    }

    pub fn pair(&self) -> &TokenPair {
        &self.pair
    }

    /// Get current status snapshot
    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            is_running: *self.is_running.read().await,
            pair: self.pair.symbol(),
            state: self.state.try_lock().ok().map(|guard| *guard),
        }
    }
}

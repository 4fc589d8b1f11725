//! Wager settlement: the debit → outcome → credit → persist cycle.
//!
//! All money movement for game rounds goes through [`SettlementEngine`].
//! Rejections before the debit mutate nothing; once the stake is debited the
//! round either settles completely or leaves a `failed` bet record and the
//! debit in place for reconciliation. Financial mutations are never retried
//! here — duplicate suppression lives in the stores' unique ids.

use crate::config::CasinoConfig;
use crate::errors::{EngineError, LedgerError, RngError};
use crate::games::{color_match, roulette, slot};
use crate::games::{
    color_match::{PALETTE_SIZE, SEQUENCE_LEN},
    roulette::RouletteBet,
    types::{BetParams, Evaluation, GameType, Outcome},
};
use crate::ledger::{
    BalanceStore, TransactionRecord, TransactionStatus, TransactionStore, TransactionType,
};
use crate::money::{Amount, Multiplier};
use crate::rng::SecureRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Smallest accepted deposit or withdrawal.
const MIN_TRANSFER: Amount = Amount::from_minor_units(1);

/// How far a round got. Reported with post-debit failures so orphaned
/// debits can be located.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundStage {
    Initiated,
    FundsChecked,
    Debited,
    OutcomeDetermined,
    WinCredited,
    Settled,
}

impl fmt::Display for RoundStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundStage::Initiated => "initiated",
            RoundStage::FundsChecked => "funds_checked",
            RoundStage::Debited => "debited",
            RoundStage::OutcomeDetermined => "outcome_determined",
            RoundStage::WinCredited => "win_credited",
            RoundStage::Settled => "settled",
        };
        write!(f, "{name}")
    }
}

/// A wager to settle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WagerRequest {
    pub player_id: String,
    pub game_id: String,
    pub amount: Amount,
    #[serde(flatten)]
    pub params: BetParams,
}

/// The settled result returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundReceipt {
    pub round_id: Uuid,
    pub game_id: String,
    pub outcome: Outcome,
    pub is_win: bool,
    pub multiplier: Multiplier,
    pub win_amount: Amount,
    pub new_balance: Amount,
    pub bet_tx_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_tx_id: Option<Uuid>,
}

/// Bet parameters after validation against the configured game.
enum CheckedBet {
    Slot,
    Roulette(RouletteBet),
    ColorMatch([u8; SEQUENCE_LEN]),
}

/// Settlement engine over injected randomness and stores.
///
/// The RNG provider is passed in rather than reached for globally, so tests
/// and replays can drive settlement from a fixed byte stream.
pub struct SettlementEngine {
    rng: SecureRng,
    config: CasinoConfig,
    balances: Arc<dyn BalanceStore>,
    transactions: Arc<dyn TransactionStore>,
}

impl SettlementEngine {
    pub fn new(
        rng: SecureRng,
        config: CasinoConfig,
        balances: Arc<dyn BalanceStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            rng,
            config,
            balances,
            transactions,
        }
    }

    /// Settle one wager end to end.
    ///
    /// Validation and the funds precheck happen before any mutation. The
    /// debit is conditional at the store, so a concurrent round racing this
    /// one cannot push the balance negative; the loser is rejected and its
    /// pending bet record cancelled.
    pub async fn place_wager(&self, request: WagerRequest) -> Result<RoundReceipt, EngineError> {
        let round_id = Uuid::new_v4();

        let settings = self
            .config
            .game(&request.game_id)
            .filter(|settings| settings.enabled)
            .ok_or_else(|| EngineError::GameNotFound(request.game_id.clone()))?;

        if request.amount < settings.min_bet || request.amount > settings.max_bet {
            return Err(EngineError::InvalidBetAmount {
                amount: request.amount,
                min: settings.min_bet,
                max: settings.max_bet,
            });
        }

        let bet = check_bet(settings.game_type, &request.params)?;

        let balance = self.balances.balance_of(&request.player_id).await?;
        if request.amount > balance {
            warn!(
                player = %request.player_id,
                game = %request.game_id,
                stake = %request.amount,
                balance = %balance,
                "wager rejected: insufficient balance"
            );
            return Err(EngineError::InsufficientBalance {
                stake: request.amount,
                balance,
            });
        }

        let bet_tx = TransactionRecord::new(
            request.player_id.clone(),
            TransactionType::Bet,
            request.amount,
            format!("{} bet", settings.game_type),
            Some(request.game_id.clone()),
        );
        let bet_tx_id = bet_tx.id;
        self.transactions.create(bet_tx).await?;

        let balance_after_debit = match self
            .balances
            .try_debit(&request.player_id, request.amount)
            .await
        {
            Ok(balance) => balance,
            Err(LedgerError::InsufficientFunds { available, .. }) => {
                // A concurrent round drained the balance between the
                // precheck and the debit. Nothing moved; void the bet.
                self.cancel_record(bet_tx_id).await;
                return Err(EngineError::InsufficientBalance {
                    stake: request.amount,
                    balance: available,
                });
            }
            Err(other) => {
                self.cancel_record(bet_tx_id).await;
                return Err(other.into());
            }
        };

        match self
            .settle_round(&request, bet, round_id, bet_tx_id, balance_after_debit)
            .await
        {
            Ok(receipt) => {
                info!(
                    player = %request.player_id,
                    game = %request.game_id,
                    round = %round_id,
                    stake = %request.amount,
                    win = %receipt.win_amount,
                    multiplier = %receipt.multiplier,
                    balance = %receipt.new_balance,
                    "round settled"
                );
                Ok(receipt)
            }
            Err((stage, reason)) => {
                self.record_failure(&request, round_id, bet_tx_id, stage, &reason)
                    .await;
                Err(EngineError::Settlement { stage, reason })
            }
        }
    }

    /// Steps between the debit and full settlement. Any error here leaves
    /// money already moved, so the caller records the failure instead of
    /// unwinding.
    async fn settle_round(
        &self,
        request: &WagerRequest,
        bet: CheckedBet,
        round_id: Uuid,
        bet_tx_id: Uuid,
        balance_after_debit: Amount,
    ) -> Result<RoundReceipt, (RoundStage, String)> {
        let (outcome, evaluation) = self
            .run_round(&bet)
            .map_err(|e| (RoundStage::Debited, e.to_string()))?;

        let win_amount = evaluation.multiplier.payout_on(request.amount);

        let (new_balance, win_tx_id) = if evaluation.is_win && !win_amount.is_zero() {
            let win_tx = TransactionRecord::new(
                request.player_id.clone(),
                TransactionType::Win,
                win_amount,
                format!("{} win at {}", request.params.game_type(), evaluation.multiplier),
                Some(request.game_id.clone()),
            );
            let win_tx_id = win_tx.id;
            self.transactions
                .create(win_tx)
                .await
                .map_err(|e| (RoundStage::OutcomeDetermined, e.to_string()))?;

            let new_balance = self
                .balances
                .credit(&request.player_id, win_amount)
                .await
                .map_err(|e| (RoundStage::OutcomeDetermined, e.to_string()))?;

            self.transactions
                .update_status(win_tx_id, TransactionStatus::Completed)
                .await
                .map_err(|e| (RoundStage::WinCredited, e.to_string()))?;

            (new_balance, Some(win_tx_id))
        } else {
            (balance_after_debit, None)
        };

        let stage = if win_tx_id.is_some() {
            RoundStage::WinCredited
        } else {
            RoundStage::OutcomeDetermined
        };
        self.transactions
            .update_status(bet_tx_id, TransactionStatus::Completed)
            .await
            .map_err(|e| (stage, e.to_string()))?;

        Ok(RoundReceipt {
            round_id,
            game_id: request.game_id.clone(),
            outcome,
            is_win: evaluation.is_win,
            multiplier: evaluation.multiplier,
            win_amount,
            new_balance,
            bet_tx_id,
            win_tx_id,
        })
    }

    /// Generate and evaluate the outcome for a validated bet.
    fn run_round(&self, bet: &CheckedBet) -> Result<(Outcome, Evaluation), RngError> {
        match bet {
            CheckedBet::Slot => {
                let outcome = slot::spin(&self.rng)?;
                let evaluation = slot::evaluate(&outcome);
                Ok((Outcome::Slot(outcome), evaluation))
            }
            CheckedBet::Roulette(bet) => {
                let outcome = roulette::spin(&self.rng)?;
                let evaluation = roulette::evaluate(&outcome, *bet);
                Ok((Outcome::Roulette(outcome), evaluation))
            }
            CheckedBet::ColorMatch(selected) => {
                let outcome = color_match::draw(&self.rng)?;
                let evaluation = color_match::evaluate(selected, &outcome);
                Ok((Outcome::ColorMatch(outcome), evaluation))
            }
        }
    }

    /// Cancel a pending record after a rejection that moved no money.
    /// Best effort: the rejection is already decided.
    async fn cancel_record(&self, tx_id: Uuid) {
        if let Err(e) = self
            .transactions
            .update_status(tx_id, TransactionStatus::Cancelled)
            .await
        {
            error!(tx = %tx_id, error = %e, "failed to cancel rejected transaction record");
        }
    }

    /// Record a post-debit failure. The debit stays; the bet record is
    /// marked `failed` so reconciliation can find it.
    async fn record_failure(
        &self,
        request: &WagerRequest,
        round_id: Uuid,
        bet_tx_id: Uuid,
        stage: RoundStage,
        reason: &str,
    ) {
        error!(
            player = %request.player_id,
            game = %request.game_id,
            round = %round_id,
            stake = %request.amount,
            stage = %stage,
            reason,
            "settlement failed after debit; bet left for reconciliation"
        );
        if let Err(e) = self
            .transactions
            .update_status(bet_tx_id, TransactionStatus::Failed)
            .await
        {
            error!(tx = %bet_tx_id, error = %e, "failed to mark bet record failed");
        }
    }

    /// Credit a deposit and record it.
    pub async fn deposit(&self, player_id: &str, amount: Amount) -> Result<Amount, EngineError> {
        if amount < MIN_TRANSFER {
            return Err(EngineError::InvalidBetAmount {
                amount,
                min: MIN_TRANSFER,
                max: Amount::from_minor_units(u64::MAX),
            });
        }

        let record =
            TransactionRecord::new(player_id, TransactionType::Deposit, amount, "deposit", None);
        let tx_id = record.id;
        self.transactions.create(record).await?;

        match self.balances.credit(player_id, amount).await {
            Ok(new_balance) => {
                self.transactions
                    .update_status(tx_id, TransactionStatus::Completed)
                    .await?;
                info!(player = %player_id, amount = %amount, balance = %new_balance, "deposit");
                Ok(new_balance)
            }
            Err(e) => {
                self.record_transfer_failure(tx_id, "deposit", &e).await;
                Err(e.into())
            }
        }
    }

    /// Debit a withdrawal and record it. Fails without mutation when the
    /// balance cannot cover it.
    pub async fn withdraw(&self, player_id: &str, amount: Amount) -> Result<Amount, EngineError> {
        if amount < MIN_TRANSFER {
            return Err(EngineError::InvalidBetAmount {
                amount,
                min: MIN_TRANSFER,
                max: Amount::from_minor_units(u64::MAX),
            });
        }

        let record = TransactionRecord::new(
            player_id,
            TransactionType::Withdrawal,
            amount,
            "withdrawal",
            None,
        );
        let tx_id = record.id;
        self.transactions.create(record).await?;

        match self.balances.try_debit(player_id, amount).await {
            Ok(new_balance) => {
                self.transactions
                    .update_status(tx_id, TransactionStatus::Completed)
                    .await?;
                info!(player = %player_id, amount = %amount, balance = %new_balance, "withdrawal");
                Ok(new_balance)
            }
            Err(LedgerError::InsufficientFunds { available, .. }) => {
                self.cancel_record(tx_id).await;
                Err(EngineError::InsufficientBalance {
                    stake: amount,
                    balance: available,
                })
            }
            Err(e) => {
                self.record_transfer_failure(tx_id, "withdrawal", &e).await;
                Err(e.into())
            }
        }
    }

    async fn record_transfer_failure(&self, tx_id: Uuid, kind: &str, cause: &LedgerError) {
        error!(tx = %tx_id, error = %cause, "{kind} failed");
        if let Err(e) = self
            .transactions
            .update_status(tx_id, TransactionStatus::Failed)
            .await
        {
            error!(tx = %tx_id, error = %e, "failed to mark {kind} record failed");
        }
    }

    /// Current balance for a player.
    pub async fn balance_of(&self, player_id: &str) -> Result<Amount, EngineError> {
        Ok(self.balances.balance_of(player_id).await?)
    }

    /// Full transaction history for a player, oldest first.
    pub async fn history(&self, player_id: &str) -> Result<Vec<TransactionRecord>, EngineError> {
        Ok(self.transactions.for_player(player_id).await?)
    }
}

/// Validate bet parameters against the configured game type.
fn check_bet(game_type: GameType, params: &BetParams) -> Result<CheckedBet, EngineError> {
    match (game_type, params) {
        (GameType::Slot, BetParams::Slot) => Ok(CheckedBet::Slot),
        (GameType::Roulette, BetParams::Roulette { bet }) => Ok(CheckedBet::Roulette(*bet)),
        (GameType::ColorMatch, BetParams::ColorMatch { selected_colors }) => {
            let selected: [u8; SEQUENCE_LEN] =
                selected_colors.as_slice().try_into().map_err(|_| {
                    EngineError::InvalidBetType(format!(
                        "expected exactly {SEQUENCE_LEN} colors, got {}",
                        selected_colors.len()
                    ))
                })?;
            if let Some(&bad) = selected.iter().find(|&&c| c >= PALETTE_SIZE) {
                return Err(EngineError::InvalidBetType(format!(
                    "color index {bad} outside palette of {PALETTE_SIZE}"
                )));
            }
            Ok(CheckedBet::ColorMatch(selected))
        }
        (expected, got) => Err(EngineError::InvalidBetType(format!(
            "game type {expected} cannot accept {} parameters",
            got.game_type()
        ))),
    }
}

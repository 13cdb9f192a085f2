use super::super::*;
use crate::ledger::Outcome;
use crate::state::{load_bet, load_ledger, load_vault};
use crate::vault::LiquidityVault;
use wheelhouse_types::roulette::COMMITMENT_LEN;

impl<'a, S: State, H: BlockHashes> Layer<'a, S, H> {
    // === Bet Handlers ===

    pub(in crate::layer) async fn handle_place_bet(
        &mut self,
        public: &PublicKey,
        commitment: [u8; COMMITMENT_LEN],
        bet_type: u8,
        bet_data: u16,
        amount: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        let existing = load_bet(self, public).await?;
        let mut vault = LiquidityVault::new(load_vault(self).await?);
        let mut totals = load_ledger(self).await?;

        let bet = self.ledger.place(
            existing.as_ref(),
            &mut vault,
            &mut totals,
            commitment,
            bet_type,
            bet_data,
            amount,
            self.height,
        )?;
        self.debit(public, amount).await?;

        tracing::info!(
            player = ?public,
            bet_type = ?bet.bet_type,
            bet_data = bet.bet_data,
            amount,
            reserved_payout = bet.reserved_payout,
            height = self.height,
            "bet placed"
        );
        let event = Event::BetPlaced {
            player: public.clone(),
            commitment,
            bet_type: bet.bet_type,
            bet_data: bet.bet_data,
            amount,
            reserved_payout: bet.reserved_payout,
            commit_height: bet.commit_height,
        };

        self.insert(Key::Bet(public.clone()), Value::Bet(bet));
        self.insert(Key::Vault, Value::Vault(vault.state()));
        self.insert(Key::Ledger, Value::Ledger(totals));
        Ok(vec![event])
    }

    pub(in crate::layer) async fn handle_reveal_bet(
        &mut self,
        public: &PublicKey,
        secret: &[u8; COMMITMENT_LEN],
    ) -> Result<Vec<Event>, ExecutionError> {
        let bet = load_bet(self, public).await?;
        let mut vault = LiquidityVault::new(load_vault(self).await?);
        let mut totals = load_ledger(self).await?;

        let settlement = self.ledger.reveal(
            bet,
            &mut vault,
            &mut totals,
            secret,
            self.height,
            self.hashes,
        )?;
        let (result, won) = match settlement.outcome {
            Outcome::Revealed { result, won } => (result, won),
            Outcome::Forfeited => {
                return Err(anyhow::anyhow!("reveal produced a forfeited settlement").into())
            }
        };
        if settlement.payout > 0 {
            self.credit(public, settlement.payout).await?;
        }

        tracing::info!(
            player = ?public,
            result,
            won,
            payout = settlement.payout,
            height = self.height,
            "bet revealed"
        );
        let event = Event::BetRevealed {
            player: public.clone(),
            commitment: settlement.bet.commitment,
            result,
            won,
            payout: settlement.payout,
        };

        self.insert(Key::Bet(public.clone()), Value::Bet(settlement.bet));
        self.insert(Key::Vault, Value::Vault(vault.state()));
        self.insert(Key::Ledger, Value::Ledger(totals));
        Ok(vec![event])
    }

    pub(in crate::layer) async fn handle_force_settle(
        &mut self,
        caller: &PublicKey,
        player: &PublicKey,
    ) -> Result<Vec<Event>, ExecutionError> {
        let bet = load_bet(self, player).await?;
        let mut vault = LiquidityVault::new(load_vault(self).await?);
        let mut totals = load_ledger(self).await?;

        let settlement = self
            .ledger
            .force_settle(bet, &mut vault, &mut totals, self.height)?;

        tracing::info!(
            player = ?player,
            caller = ?caller,
            amount = settlement.bet.amount,
            height = self.height,
            "bet forfeited"
        );
        let event = Event::BetForfeited {
            player: player.clone(),
            commitment: settlement.bet.commitment,
            caller: caller.clone(),
            amount: settlement.bet.amount,
        };

        self.insert(Key::Bet(player.clone()), Value::Bet(settlement.bet));
        self.insert(Key::Vault, Value::Vault(vault.state()));
        self.insert(Key::Ledger, Value::Ledger(totals));
        Ok(vec![event])
    }
}

use super::super::*;
use crate::state::{load_shares, load_vault};
use crate::vault::LiquidityVault;

impl<'a, S: State, H: BlockHashes> Layer<'a, S, H> {
    // === Vault Handlers ===

    pub(in crate::layer) async fn handle_deposit(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut vault = LiquidityVault::new(load_vault(self).await?);
        let minted = vault.deposit(amount, self.config.min_deposit)?;
        self.debit(public, amount).await?;

        let shares = load_shares(self, public)
            .await?
            .checked_add(minted)
            .ok_or(ExecutionError::Overflow)?;

        tracing::info!(
            depositor = ?public,
            amount,
            minted,
            share_supply = vault.share_supply(),
            total_capital = vault.total_capital(),
            "liquidity deposited"
        );
        self.insert(Key::Shares(public.clone()), Value::Shares(shares));
        self.insert(Key::Vault, Value::Vault(vault.state()));

        Ok(vec![Event::LiquidityDeposited {
            depositor: public.clone(),
            amount,
            shares_minted: minted,
            share_supply: vault.share_supply(),
            total_capital: vault.total_capital(),
        }])
    }

    pub(in crate::layer) async fn handle_withdraw(
        &mut self,
        public: &PublicKey,
        shares: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        let held = load_shares(self, public).await?;
        let mut vault = LiquidityVault::new(load_vault(self).await?);
        let amount = vault.withdraw(shares, held)?;
        self.credit(public, amount).await?;

        tracing::info!(
            depositor = ?public,
            shares,
            amount,
            share_supply = vault.share_supply(),
            total_capital = vault.total_capital(),
            "liquidity withdrawn"
        );
        let remaining = held - shares;
        if remaining == 0 {
            self.remove(Key::Shares(public.clone()));
        } else {
            self.insert(Key::Shares(public.clone()), Value::Shares(remaining));
        }
        self.insert(Key::Vault, Value::Vault(vault.state()));

        Ok(vec![Event::LiquidityWithdrawn {
            depositor: public.clone(),
            shares_burned: shares,
            amount,
            share_supply: vault.share_supply(),
            total_capital: vault.total_capital(),
        }])
    }
}

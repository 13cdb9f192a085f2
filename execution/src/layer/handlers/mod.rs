mod bets;
mod liquidity;

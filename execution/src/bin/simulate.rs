//! Play simulated roulette rounds against an in-memory table.
//!
//! Every round each player places a random wager, waits out the reveal delay and reveals. The
//! final vault snapshot is printed as JSON.

use clap::Parser;
use commonware_runtime::{deterministic, Runner};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, RngCore, SeedableRng};
use tracing::{info, warn};
use wheelhouse_execution::{
    casino::roulette::is_valid_bet_data,
    chain::{BlockHashes, BlockHistory},
    compute_commitment,
    config::Config,
    mocks::{create_account_keypair, create_funded_state},
    query_ledger, query_shares, query_vault,
    state_transition::execute_block,
};
use wheelhouse_types::{
    execution::{Event, Instruction, Output, Transaction},
    roulette::{split_data, BetType},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate roulette rounds against a house vault")]
struct Args {
    /// YAML table configuration (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[arg(short, long, default_value = "4")]
    players: u64,

    #[arg(short, long, default_value = "50")]
    rounds: u64,

    #[arg(short, long, default_value = "0")]
    seed: u64,

    #[arg(long, default_value = "100000000")]
    house_capital: u64,

    #[arg(long, default_value = "10000000")]
    player_funds: u64,
}

fn random_wager(rng: &mut StdRng) -> (BetType, u16) {
    let bet_type = *BetType::ALL.choose(rng).unwrap_or(&BetType::Red);
    loop {
        let bet_data = match bet_type {
            BetType::Split => split_data(rng.gen_range(1..=36), rng.gen_range(1..=36)),
            _ => rng.gen_range(0..=36),
        };
        if is_valid_bet_data(bet_type, bet_data) {
            return (bet_type, bet_data);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match &args.config {
        Some(path) => Config::from_yaml(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    config.validate()?;

    let executor = deterministic::Runner::seeded(args.seed);
    executor.start(|_| async move {
        let mut rng = StdRng::seed_from_u64(args.seed);
        let (house_key, house) = create_account_keypair(0);
        let players: Vec<_> = (1..=args.players).map(create_account_keypair).collect();

        let mut genesis = vec![(house.clone(), args.house_capital)];
        genesis.extend(players.iter().map(|(_, public)| (public.clone(), args.player_funds)));
        let mut state = create_funded_state(&genesis).await;
        let mut history = BlockHistory::new(config.block_hash_retention);
        let mut nonces = vec![0u64; players.len()];

        let deposit = Transaction::sign(
            &house_key,
            0,
            Instruction::Deposit {
                amount: args.house_capital,
            },
        );
        execute_block(&mut state, &mut history, &config, &rng.gen::<[u8; 32]>(), vec![deposit])
            .await?;

        let (mut wins, mut losses, mut rejected) = (0u64, 0u64, 0u64);
        for round in 0..args.rounds {
            let max_bet = query_vault(&state, &config).await?.max_bet;
            let mut secrets = Vec::with_capacity(players.len());
            let mut placements = Vec::with_capacity(players.len());
            for (index, (signer, _)) in players.iter().enumerate() {
                let mut secret = [0u8; 32];
                rng.fill_bytes(&mut secret);
                let (bet_type, bet_data) = random_wager(&mut rng);
                let amount = rng.gen_range(config.min_stake..=max_bet.max(config.min_stake));
                placements.push(Transaction::sign(
                    signer,
                    nonces[index],
                    Instruction::PlaceBet {
                        commitment: compute_commitment(&secret),
                        bet_type: bet_type as u8,
                        bet_data,
                        amount,
                    },
                ));
                nonces[index] += 1;
                secrets.push(secret);
            }
            let mut outputs = execute_block(
                &mut state,
                &mut history,
                &config,
                &rng.gen::<[u8; 32]>(),
                placements,
            )
            .await?
            .outputs;

            for _ in 1..config.min_reveal_delay {
                execute_block(&mut state, &mut history, &config, &rng.gen::<[u8; 32]>(), vec![])
                    .await?;
            }

            let reveals = players
                .iter()
                .zip(&secrets)
                .enumerate()
                .map(|(index, ((signer, _), secret))| {
                    let tx = Transaction::sign(
                        signer,
                        nonces[index],
                        Instruction::RevealBet { secret: *secret },
                    );
                    nonces[index] += 1;
                    tx
                })
                .collect();
            outputs.extend(
                execute_block(
                    &mut state,
                    &mut history,
                    &config,
                    &rng.gen::<[u8; 32]>(),
                    reveals,
                )
                .await?
                .outputs,
            );

            for output in outputs {
                match output {
                    Output::Event(Event::BetRevealed { won: true, .. }) => wins += 1,
                    Output::Event(Event::BetRevealed { won: false, .. }) => losses += 1,
                    Output::Event(Event::InstructionRejected { player, code, message }) => {
                        rejected += 1;
                        warn!(round, ?player, code, %message, "rejected");
                    }
                    _ => {}
                }
            }
        }

        let vault = query_vault(&state, &config).await?;
        let ledger = query_ledger(&state).await?;
        let house_shares = query_shares(&state, &house).await?;
        info!(
            rounds = args.rounds,
            wins,
            losses,
            rejected,
            escrowed = ledger.escrowed,
            house_assets = house_shares.assets,
            height = history.height(),
            "simulation complete"
        );
        println!("{}", serde_json::to_string_pretty(&vault)?);
        Ok::<_, anyhow::Error>(())
    })
}

//! CLI tool to run individual bridge operations against the state file.
//!
//! Each invocation loads the state, applies one operation and saves it:
//! - `fund`: credit an external account (local simulation only)
//! - `request`: escrow funds and open a withdrawal request
//! - `advance`: pay out an open request as an LP
//! - `finalize`: release escrow to the LP after the challenge period
//! - `deposit-bond` / `withdraw-bond`: manage LP collateral
//! - `show`, `list`, `lp`, `quote`: read-only queries

use action::{
    advance::{Advance, AdvanceAction},
    bond::{Bond, BondAction, BondDirection},
    request::{Request, RequestAction},
    Action, FinalizeAction,
};
use alloy_primitives::{Address, U256};
use balance::{Account, Transfer};
use bridge::{config::Config, load_state, save_state};
use clap::{Parser, Subcommand};
use config::NetworkType;
use tracing::info;
use withdrawal::{SystemClock, WithdrawalId};

#[derive(Parser)]
#[command(name = "step")]
#[command(about = "Run individual bridge operations")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Dry-run mode: check readiness without executing
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Credit an external account (local network only)
    Fund { account: Address, amount: U256 },

    /// Escrow `amount` from `owner` and open a withdrawal request
    Request { owner: Address, amount: U256 },

    /// Advance request `id` from `lp`'s funds
    Advance { lp: Address, id: WithdrawalId },

    /// Finalize request `id` once its challenge period elapsed
    Finalize { id: WithdrawalId },

    /// Deposit into `lp`'s bond
    DepositBond { lp: Address, amount: U256 },

    /// Withdraw from `lp`'s bond
    WithdrawBond { lp: Address, amount: U256 },

    /// Show request `id`
    Show { id: WithdrawalId },

    /// List every request
    List,

    /// Show bond, exposure and finalizable requests for `lp`
    Lp { lp: Address },

    /// Fee for advancing `amount`
    Quote { amount: U256 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_file(&cli.config)?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.dry_run = true;
    }

    let bridge = load_state(&config, SystemClock::new())?;

    let mut action: Box<dyn Action + '_> = match cli.command {
        Command::Fund { account, amount } => {
            if config.network != NetworkType::Local {
                eyre::bail!("fund is only available on the local network")
            }
            if !config.dry_run {
                bridge.transfer().credit(Account::External(account), amount);
                save_state(&bridge, &config.state_path)?;
            }
            info!(account = %account, amount = %amount, dry_run = config.dry_run, "Funded account");
            return Ok(());
        }
        Command::Request { owner, amount } => {
            Box::new(RequestAction::new(&bridge, Request { owner, amount }))
        }
        Command::Advance { lp, id } => Box::new(AdvanceAction::new(
            &bridge,
            Advance {
                id,
                liquidity_provider: lp,
            },
        )),
        Command::Finalize { id } => Box::new(FinalizeAction::new(&bridge, id)),
        Command::DepositBond { lp, amount } => Box::new(BondAction::new(
            &bridge,
            Bond {
                lp,
                value: amount,
                direction: BondDirection::Deposit,
            },
        )),
        Command::WithdrawBond { lp, amount } => Box::new(BondAction::new(
            &bridge,
            Bond {
                lp,
                value: amount,
                direction: BondDirection::Withdraw,
            },
        )),
        Command::Show { id } => {
            let request = bridge.get_withdrawal(id)?;
            info!(
                request_id = id,
                owner = %request.owner,
                amount = %request.amount,
                status = ?request.status(),
                liquidity_provider = ?request.liquidity_provider,
                fee = ?request.fee,
                time_remaining = ?bridge.get_time_remaining(id).ok(),
                escrowed = ?bridge.escrowed(id),
                "Withdrawal request"
            );
            return Ok(());
        }
        Command::List => {
            for request in bridge.withdrawals() {
                info!(
                    request_id = request.id,
                    owner = %request.owner,
                    amount = %request.amount,
                    status = ?request.status(),
                    "Withdrawal request"
                );
            }
            info!(
                total = bridge.withdrawal_counter(),
                pending_advances = ?bridge.pending_advances(),
                ready_to_finalize = ?bridge.ready_to_finalize(),
                "Summary"
            );
            return Ok(());
        }
        Command::Lp { lp } => {
            info!(
                lp = %lp,
                bond = %bridge.lp_bond(lp),
                exposure = %bridge.outstanding_exposure(lp),
                withdrawable = %bridge.withdrawable_bond(lp),
                eligible = bridge.can_provide_liquidity(lp),
                balance = %bridge.transfer().balance_of(Account::External(lp)),
                finalizable = ?bridge.finalizable_for(lp),
                "Liquidity provider"
            );
            return Ok(());
        }
        Command::Quote { amount } => {
            let fee = bridge.calculate_fee(amount)?;
            info!(
                amount = %amount,
                fee = %fee,
                net_amount = %(amount - fee),
                fee_percentage = bridge.fee_percentage(),
                "Fee quote"
            );
            return Ok(());
        }
    };

    if config.dry_run {
        info!(
            ready = action.is_ready()?,
            "[DRY-RUN] Would execute: {}",
            action.description()
        );
        return Ok(());
    }

    info!("Running: {}", action.description());
    let outcome = action.execute()?;
    save_state(&bridge, &config.state_path)?;

    info!(?outcome, "Step completed");
    Ok(())
}

//! Moot CLI - Command-line interface for stake-gated group governance

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use moot_core::{Action, GroupId, Moot, MootConfig, ProposalId, UserId};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moot")]
#[command(about = "Moot - Stake-gated governance for groups")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config/moot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Inspect and move points
    #[command(subcommand)]
    Points(PointsCommand),
    /// Manage groups and their censorship lists
    #[command(subcommand)]
    Group(GroupCommand),
    /// Open a proposal, paying the stake
    #[command(subcommand)]
    Propose(ProposeCommand),
    /// Cast a ballot
    #[command(subcommand)]
    Vote(VoteCommand),
    /// Evaluate one proposal, resolving it if due
    Evaluate { proposal: ProposalId },
    /// Evaluate every open proposal
    Sweep {
        #[arg(short, long)]
        group: Option<GroupId>,
    },
    /// List open proposals after resolving whatever is due
    List {
        #[arg(short, long)]
        group: Option<GroupId>,
    },
    /// Sweep periodically until interrupted
    Watch {
        #[arg(short, long)]
        group: Option<GroupId>,
        /// Seconds between sweeps
        #[arg(short, long, default_value_t = 60)]
        interval: u64,
    },
    /// Check configuration validity
    Check,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Open a points account
    Register { user: UserId },
    /// Remove from every group and delete the points account
    Remove { user: UserId },
    /// Record a login and update the streak
    Login { user: UserId },
}

#[derive(Subcommand)]
enum PointsCommand {
    /// Show an account
    Show { user: UserId },
    /// Add (positive) or remove (negative) points
    Adjust {
        user: UserId,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Move points between accounts
    Transfer { from: UserId, to: UserId, amount: u64 },
}

#[derive(Subcommand)]
enum GroupCommand {
    /// Create a group owned by OWNER
    Create { owner: UserId },
    /// Add a resident on behalf of an existing one
    Invite {
        group: GroupId,
        inviter: UserId,
        invitee: UserId,
    },
    /// Show a group
    Show { group: GroupId },
    /// Show a group's censored words
    Words { group: GroupId },
    /// Hand ownership to another resident
    Owner {
        group: GroupId,
        owner: UserId,
        new_owner: UserId,
    },
}

#[derive(Args)]
struct ProposeArgs {
    /// Initiating resident
    #[arg(long = "as")]
    initiator: UserId,
    /// Group the proposal acts on
    #[arg(short, long)]
    group: GroupId,
    /// Free-text justification
    #[arg(short, long, default_value = "")]
    reason: String,
}

#[derive(Subcommand)]
enum ProposeCommand {
    /// Ban a resident
    Ban {
        #[command(flatten)]
        args: ProposeArgs,
        target: UserId,
    },
    /// Add a word to the censorship list
    Censor {
        #[command(flatten)]
        args: ProposeArgs,
        word: String,
    },
    /// Remove a word from the censorship list
    Uncensor {
        #[command(flatten)]
        args: ProposeArgs,
        word: String,
    },
    /// Delete the group
    DeleteGroup {
        #[command(flatten)]
        args: ProposeArgs,
    },
}

impl ProposeCommand {
    fn into_parts(self) -> (ProposeArgs, Action) {
        match self {
            ProposeCommand::Ban { args, target } => (args, Action::Ban { user: target }),
            ProposeCommand::Censor { args, word } => (args, Action::Censor { word }),
            ProposeCommand::Uncensor { args, word } => (args, Action::Uncensor { word }),
            ProposeCommand::DeleteGroup { args } => (args, Action::DeleteGroup),
        }
    }
}

#[derive(Subcommand)]
enum VoteCommand {
    Yes { proposal: ProposalId, voter: UserId },
    No { proposal: ProposalId, voter: UserId },
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(config: &MootConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = MootConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    init_logging(&config);

    let Some(command) = cli.command else {
        println!("Moot v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    if let Commands::Check = command {
        info!(path = %cli.config.display(), "configuration is valid");
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let moot = Arc::new(Moot::new(config).context("opening the database")?);
    run(&moot, command).await?;
    moot.store().flush()?;
    Ok(())
}

async fn run(moot: &Arc<Moot>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::User(cmd) => match cmd {
            UserCommand::Register { user } => print(&moot.register_user(&user)?),
            UserCommand::Remove { user } => print(&moot.remove_user(&user)?),
            UserCommand::Login { user } => print(&moot.record_login(&user)?),
        },
        Commands::Points(cmd) => match cmd {
            PointsCommand::Show { user } => print(&moot.ledger().account(&user)?),
            PointsCommand::Adjust { user, delta } => print(&moot.ledger().adjust(&user, delta)?),
            PointsCommand::Transfer { from, to, amount } => {
                print(&moot.ledger().transfer(&from, &to, amount)?)
            }
        },
        Commands::Group(cmd) => match cmd {
            GroupCommand::Create { owner } => print(&moot.groups().create_group(&owner)?),
            GroupCommand::Invite {
                group,
                inviter,
                invitee,
            } => print(&moot.groups().invite(&group, &inviter, &invitee)?),
            GroupCommand::Show { group } => print(&moot.groups().group(&group)?),
            GroupCommand::Words { group } => {
                let list = moot.groups().group(&group)?.word_list;
                print(&moot.groups().word_lists().words(&list)?)
            }
            GroupCommand::Owner {
                group,
                owner,
                new_owner,
            } => print(&moot.groups().transfer_ownership(&group, &owner, &new_owner)?),
        },
        Commands::Propose(cmd) => {
            let (args, action) = cmd.into_parts();
            print(&moot.propose(&args.initiator, &args.group, &args.reason, action)?)
        }
        Commands::Vote(cmd) => match cmd {
            VoteCommand::Yes { proposal, voter } => print(&moot.cast_yes(&proposal, &voter)?),
            VoteCommand::No { proposal, voter } => print(&moot.cast_no(&proposal, &voter)?),
        },
        Commands::Evaluate { proposal } => match moot.evaluate(&proposal) {
            Ok(verdict) => print(&verdict),
            Err(e) if e.is_already_resolved() => {
                info!(proposal = %proposal, "proposal already resolved");
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        Commands::Sweep { group } => print(&moot.sweep(group.as_ref())?),
        Commands::List { group } => print(&moot.list_open(group.as_ref())?),
        Commands::Watch { group, interval } => watch(Arc::clone(moot), group, interval).await,
        Commands::Check => Ok(()),
    }
}

async fn watch(moot: Arc<Moot>, group: Option<GroupId>, interval: u64) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    info!(interval, group = ?group, "watching open proposals");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let moot = Arc::clone(&moot);
                let report = tokio::task::spawn_blocking(move || moot.sweep(group.as_ref())).await??;
                if report.resolved() > 0 {
                    print(&report)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break;
            }
        }
    }
    Ok(())
}

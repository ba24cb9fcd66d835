use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use orderflow::application::job::JobState;
use orderflow::application::order_service::OrderService;
use orderflow::application::payment_service::PaymentService;
use orderflow::config::WorkerConfig;
use orderflow::domain::order::{Order, OrderId};
use orderflow::domain::ports::{OrderStoreHandle, UserStoreHandle};
use orderflow::domain::user::UserId;
use orderflow::infrastructure::in_memory::{InMemoryOrderStore, InMemoryUserStore};
use orderflow::infrastructure::worker::WorkerPool;
use orderflow::interfaces::report::{OrderWriter, ReportFormat};
use orderflow::telemetry;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "ORDERFLOW_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Number of payment workers
    #[arg(long, env = "ORDERFLOW_WORKERS", default_value_t = 4, global = true)]
    workers: usize,

    /// Probability that a simulated payment succeeds
    #[arg(long, env = "ORDERFLOW_SUCCESS_RATE", default_value_t = 0.8, global = true)]
    success_rate: f64,

    /// Delay before the first retry of a failed job, in milliseconds
    #[arg(long, default_value_t = 100, global = true)]
    retry_backoff_ms: u64,

    /// Output format for order reports
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv, global = true)]
    format: ReportFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a user and print its id
    UserAdd { name: String },
    /// Create an order for a user and wait for its payment to settle
    Create {
        #[arg(long)]
        user: u64,
    },
    /// Show a single order
    Show { id: u64 },
    /// List all orders
    List,
    /// Register a user, create orders for it and settle all payments
    Simulate {
        #[arg(long, default_value_t = 10)]
        orders: usize,
    },
}

fn open_stores(db_path: Option<PathBuf>) -> Result<(OrderStoreHandle, UserStoreHandle)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = orderflow::infrastructure::rocksdb::RocksDBStore::open(db_path).into_diagnostic()?;
        let orders: OrderStoreHandle = Arc::new(store.clone());
        let users: UserStoreHandle = Arc::new(store);
        return Ok((orders, users));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    let orders: OrderStoreHandle = Arc::new(InMemoryOrderStore::new());
    let users: UserStoreHandle = Arc::new(InMemoryUserStore::new());
    Ok((orders, users))
}

fn print_orders(format: ReportFormat, orders: &[Order]) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock(), format);
    writer.write_orders(orders).into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config = WorkerConfig::new(
        cli.workers,
        cli.success_rate,
        Duration::from_millis(cli.retry_backoff_ms),
    )
    .into_diagnostic()?;
    let (orders, users) = open_stores(cli.db_path)?;

    let decider = Arc::new(config.decider().into_diagnostic()?);
    let payments = Arc::new(PaymentService::new(orders.clone(), decider));
    let pool = Arc::new(WorkerPool::spawn(payments, config.workers, config.backoff));
    let service = OrderService::new(orders, users.clone(), pool.clone());

    match cli.command {
        Command::UserAdd { name } => {
            let user = users.create(&name).await.into_diagnostic()?;
            println!("{}", user.id);
        }
        Command::Create { user } => {
            let created = service.create_order(UserId(user)).await.into_diagnostic()?;
            pool.shutdown().await.into_diagnostic()?;
            let order = service.get_order(created.id).await.into_diagnostic()?;
            print_orders(cli.format, &[order])?;
        }
        Command::Show { id } => {
            let order = service.get_order(OrderId(id)).await.into_diagnostic()?;
            print_orders(cli.format, &[order])?;
        }
        Command::List => {
            let all = service.list_orders().await.into_diagnostic()?;
            print_orders(cli.format, &all)?;
        }
        Command::Simulate { orders: count } => {
            let owner = users.create("simulation").await.into_diagnostic()?;
            for _ in 0..count {
                service.create_order(owner.id).await.into_diagnostic()?;
            }

            let reports = pool.shutdown().await.into_diagnostic()?;
            let exhausted = reports
                .iter()
                .filter(|report| report.state == JobState::FailedTerminal)
                .count();
            tracing::info!(jobs = reports.len(), exhausted, "Simulation finished");

            let all = service.list_orders().await.into_diagnostic()?;
            print_orders(cli.format, &all)?;
        }
    }

    pool.shutdown().await.into_diagnostic()?;
    Ok(())
}

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payfind::application::orchestrator::BatchOrchestrator;
use payfind::config::Config;
use payfind::domain::ports::PaymentsApi;
use payfind::infrastructure::stripe::StripeClient;
use payfind::interfaces::csv::mapping_reader::load_mapping;
use payfind::interfaces::csv::mapping_writer::MappingWriter;
use payfind::interfaces::enrich::ReportEnricher;
use payfind::interfaces::ids_reader::PaymentIdsReader;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve which account owns each payment id and write the mapping CSV
    Map {
        /// Text file of payment ids, one per line
        #[arg(default_value = "payment_ids.txt")]
        ids: PathBuf,

        /// Output mapping CSV
        #[arg(short, long, default_value = "payment_account_mapping.csv")]
        output: PathBuf,
    },
    /// Append account, payout and bank columns to a report CSV
    Enrich {
        /// Report CSV containing a payment-id column
        report: PathBuf,

        /// Mapping CSV produced by `map`
        #[arg(short, long, default_value = "payment_account_mapping.csv")]
        mapping: PathBuf,

        /// Output enriched CSV
        #[arg(short, long, default_value = "report_enriched.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Map { ids, output } => run_map(&config, &ids, &output).await,
        Command::Enrich {
            report,
            mapping,
            output,
        } => run_enrich(&config, &report, &mapping, &output).await,
    }
}

async fn run_map(config: &Config, ids_path: &PathBuf, output: &PathBuf) -> Result<()> {
    // Resolution cannot run without a credential; enrichment can.
    let client = StripeClient::from_config(config).into_diagnostic()?;

    let ids_file = File::open(ids_path).into_diagnostic()?;
    let payment_ids = PaymentIdsReader::new(ids_file).ids().into_diagnostic()?;
    println!("Checking {} payment ids...", payment_ids.len());

    let orchestrator = BatchOrchestrator::prepare(&client, config, false)
        .await
        .into_diagnostic()?;
    let report = orchestrator.run(&payment_ids).await;

    let rows = report.mapping_rows();
    let out_file = File::create(output).into_diagnostic()?;
    MappingWriter::new(out_file)
        .write_rows(&rows)
        .into_diagnostic()?;
    println!("Results saved to {}", output.display());

    println!("\nSummary:");
    for (account_name, total) in report.totals() {
        println!("{account_name}: ${total}");
    }
    Ok(())
}

async fn run_enrich(
    config: &Config,
    report: &PathBuf,
    mapping_path: &PathBuf,
    output: &PathBuf,
) -> Result<()> {
    let mapping_file = File::open(mapping_path).into_diagnostic()?;
    let mapping = load_mapping(mapping_file).into_diagnostic()?;
    println!("Loaded {} payment mappings", mapping.len());

    // A missing key degrades payout/bank columns to empty instead of failing.
    let client = match StripeClient::from_config(config) {
        Ok(client) => Some(client),
        Err(_) => {
            eprintln!("WARNING: STRIPE_SECRET_KEY not set. Bank and transfer info will not be fetched.");
            None
        }
    };
    let api = client.as_ref().map(|c| c as &dyn PaymentsApi);

    let input = File::open(report).into_diagnostic()?;
    let out_file = File::create(output).into_diagnostic()?;
    let enricher = ReportEnricher::new(api, config, mapping);
    let summary = enricher.enrich(input, out_file).await.into_diagnostic()?;

    println!("Enriched report saved to {}", output.display());
    println!(
        "\nRows: {} total, {} mapped, {} enriched",
        summary.rows_total, summary.rows_mapped, summary.rows_enriched
    );
    if !summary.account_distribution.is_empty() {
        println!("\nAccount distribution:");
        for (account_name, count) in &summary.account_distribution {
            println!("{account_name}: {count}");
        }
    }
    Ok(())
}

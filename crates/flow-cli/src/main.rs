//! Command-line interface for research-flow

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use flow_core::ReportState;
use flow_report::{DataModule, ReportConfig, ReportOrchestrator, RevisionMode, save_report};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "research-flow")]
#[command(about = "Multi-agent crypto research report generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a report for one period
    Run {
        /// Report period, e.g. "2024-12-09 ~ 2024-12-15"
        #[arg(short, long)]
        period: String,

        /// Data modules to collect
        #[arg(short, long, value_delimiter = ',', default_value = "macro")]
        modules: Vec<String>,

        /// Maximum debate rounds before consensus is forced
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Debate rounds go straight back to review without redrafting
        #[arg(long)]
        review_only: bool,

        /// Output directory for charts and saved reports
        #[arg(short, long)]
        output: Option<String>,

        /// Print the full state record as JSON
        #[arg(long)]
        json: bool,

        /// Save the state record under <output>/reports
        #[arg(long)]
        save: bool,
    },
    /// Print the workflow topology
    Graph {
        #[arg(short, long, value_enum, default_value_t = GraphFormat::Mermaid)]
        format: GraphFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GraphFormat {
    Mermaid,
    Dot,
}

fn parse_modules(names: &[String]) -> anyhow::Result<Vec<DataModule>> {
    names
        .iter()
        .map(|name| {
            name.parse::<DataModule>()
                .with_context(|| format!("invalid --modules value '{name}'"))
        })
        .collect()
}

fn summary(state: &ReportState) -> String {
    format!(
        "task:      {}\n\
         period:    {}\n\
         score:     {:.1}/100\n\
         rounds:    {}\n\
         status:    {}\n\
         charts:    {}\n\
         sections:  {}\n\
         errors:    {}",
        state.task_id,
        state.report_period,
        state.quality_score,
        state.debate_rounds,
        state.approval_status,
        state.chart_count(),
        state.final_content.len().max(state.reviewed_content.len()),
        state.errors().len(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let app = flow_utils::Config::from_env()?;
    flow_utils::init_tracing_with(app.log_format);

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            period,
            modules,
            max_rounds,
            review_only,
            output,
            json,
            save,
        } => {
            let mut builder = ReportConfig::builder().modules(parse_modules(&modules)?);
            if let Some(rounds) = max_rounds {
                builder = builder.max_debate_rounds(rounds);
            }
            if review_only {
                builder = builder.revision_mode(RevisionMode::ReviewOnly);
            }
            if let Some(dir) = output {
                builder = builder.output_dir(dir);
            }
            let config = builder.build()?.with_env();
            let report_dir = config.report_dir();

            let orchestrator = ReportOrchestrator::from_config(config)?;
            info!(
                period = %period,
                narrative = orchestrator.narrative_enabled(),
                "Starting report run"
            );
            let state = orchestrator.run(period).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("{}", summary(&state));
            }

            if save {
                let path = save_report(&state, &report_dir).await?;
                println!("saved:     {}", path.display());
            }
            Ok(())
        }
        Commands::Graph { format } => {
            let orchestrator = ReportOrchestrator::from_config(ReportConfig::default())?;
            let topology = orchestrator.topology();
            match format {
                GraphFormat::Mermaid => println!("{}", topology.to_mermaid()),
                GraphFormat::Dot => println!("{}", topology.to_dot()),
            }
            Ok(())
        }
    }
}

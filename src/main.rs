use clap::{Parser, Subcommand};

mod cmd;
mod core;

#[derive(Parser, Debug)]
#[command(
    name = "microfisc",
    version,
    about = "URSSAF contribution and income tax estimates for French micro-entrepreneurs"
)]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate contributions and income tax for one month of revenue
    Simulate(cmd::simulate::SimulateCommand),
    /// Compute a month and append it to a history file
    Record(cmd::record::RecordCommand),
    /// Show monthly totals and growth
    History(cmd::history::HistoryCommand),
    /// Annual totals, averages and ceiling progress
    Summary(cmd::summary::SummaryCommand),
    /// Export an annual report as HTML or CSV
    Export(cmd::export::ExportCommand),
    /// Aggregated statistics as JSON numbers for the assistant
    Context(cmd::context::ContextCommand),
    /// Re-derive stored records and report divergences
    Validate(cmd::validate::ValidateCommand),
    /// Print the expected history file formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Command::Simulate(simulate) => simulate.exec(),
        Command::Record(record) => record.exec(),
        Command::History(history) => history.exec(),
        Command::Summary(summary) => summary.exec(),
        Command::Export(export) => export.exec(),
        Command::Context(context) => context.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}

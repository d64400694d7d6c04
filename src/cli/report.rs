use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;

use crate::{
    ledger::Ledger,
    report::{build_matrix, export_csv, ReportMatrix, ReportMode},
    utils::clock::Clock,
};

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long,
        value_enum,
        default_value_t = ReportMode::Hours,
        help = "Cell values: hours worked, or percentage of the day's total"
    )]
    mode: ReportMode,
    #[arg(long, help = "Only include days from the current calendar month")]
    month: bool,
    #[arg(
        short,
        long,
        help = "Write the report as CSV to this path instead of printing it"
    )]
    output: Option<PathBuf>,
    #[arg(
        long,
        requires = "output",
        help = "Open the exported file with the system default application"
    )]
    open: bool,
}

/// Command to process `report`. Pivots the whole ledger into a day-by-order
/// table and prints or exports it.
pub async fn process_report_command(
    ReportCommand {
        mode,
        month,
        output,
        open,
    }: ReportCommand,
    ledger: &Ledger,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let records = ledger.all_records().await?;
    let mut matrix = build_matrix(&records, mode);
    if month {
        matrix.retain_current_month(clock.today())?;
    }

    match output {
        Some(path) => {
            export_csv(&matrix, &path, open).await?;
            println!("Report written to {}", path.display());
        }
        None if matrix.is_empty() => println!("Nothing recorded yet"),
        None => print_matrix(&matrix)?,
    }
    Ok(())
}

fn print_matrix(matrix: &ReportMatrix) -> Result<()> {
    println!("order\t{}", matrix.column_labels()?.join("\t"));
    for (name, values) in matrix.rows() {
        let cells = values
            .iter()
            .map(|value| format!("{value:.1}"))
            .collect::<Vec<_>>()
            .join("\t");
        println!("{name}\t{cells}");
    }
    Ok(())
}

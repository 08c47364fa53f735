use super::report::{load, FilterArgs};
use super::Session;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub(crate) struct ExportCommand {
    #[command(subcommand)]
    command: ExportSubcommand,
}

#[derive(Debug, Subcommand)]
enum ExportSubcommand {
    /// Semicolon-delimited rows of the filtered set
    Csv(ExportArgs),
    /// Single-sheet workbook of the filtered set
    Xlsx(ExportArgs),
    /// Workbook with the by-day, by-hour and by-service sheets
    Summary(ExportArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    filters: FilterArgs,

    /// Directory that receives the file
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

pub(crate) fn run(session: Session, command: ExportCommand) -> Result<(), String> {
    let path = match command.command {
        ExportSubcommand::Csv(args) => load(session, &args.filters)?
            .export_csv(&args.out_dir)
            .map_err(|error| format!("failed to export csv: {error}"))?,
        ExportSubcommand::Xlsx(args) => load(session, &args.filters)?
            .export_xlsx(&args.out_dir)
            .map_err(|error| format!("failed to export xlsx: {error}"))?,
        ExportSubcommand::Summary(args) => Some(
            load(session, &args.filters)?
                .export_summary(&args.out_dir)
                .map_err(|error| format!("failed to export summary: {error}"))?,
        ),
    };

    match path {
        Some(path) => println!("written: {}", path.display()),
        None => println!("no records in range; nothing written"),
    }
    Ok(())
}

use std::process::ExitCode;

use clap::Parser;
use tracing::{info, instrument};
use tracing_error::TracedError;

use lov::controller::Controller;
use lov::filter::{FilterValue, InputKind};
use lov::logging::{LogTarget, init_logging, span_trace};
use lov::model::{Model, Status};
use lov::ui::{TableUI, render_plain};
use lov::view::filter_input_kind;
use lov::{ColumnId, LOVConfig, LOVError, RecordStore, SortDirection, default_columns};

/// A tui based viewer for laboratory orders.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Quiet period of filter inputs in milliseconds
    #[arg(long, default_value_t = 500)]
    debounce_ms: u64,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Upper bound of one event poll in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Append log output to this file
    #[arg(long)]
    log_file: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Initial filter as COLUMN=VALUE, date columns take START..END
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,

    /// Initial sort as COLUMN[:asc|:desc]
    #[arg(long)]
    sort: Option<String>,

    /// Print the first page as plain text and exit
    #[arg(long)]
    print: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let target = match (&args.log_file, args.print) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    if let Err(e) = init_logging(args.verbose, target) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        if let Some(trace) = span_trace(&e) {
            eprintln!("{trace}");
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn parse_filter(arg: &str) -> Result<(ColumnId, FilterValue), LOVError> {
    let (column, value) = arg
        .split_once('=')
        .ok_or_else(|| LOVError::InvalidArgument(format!("expected COLUMN=VALUE, got '{arg}'")))?;
    let column: ColumnId = column.parse()?;
    let columns = default_columns();
    let def = columns
        .iter()
        .find(|c| c.id == column)
        .ok_or_else(|| LOVError::UnknownColumn(column.to_string()))?;
    let value = match filter_input_kind(def) {
        Some(InputKind::DateRange) => FilterValue::parse_range(value),
        Some(InputKind::Text) => FilterValue::Text(value.to_string()),
        None => return Err(LOVError::NotFilterable(column)),
    };
    Ok((column, value))
}

fn parse_sort(arg: &str) -> Result<(ColumnId, SortDirection), LOVError> {
    let (column, direction) = arg.split_once(':').unwrap_or((arg, "asc"));
    let direction = match direction.to_ascii_lowercase().as_str() {
        "asc" => SortDirection::Ascending,
        "desc" => SortDirection::Descending,
        other => {
            return Err(LOVError::InvalidArgument(format!(
                "unknown sort direction '{other}'"
            )));
        }
    };
    Ok((column.parse()?, direction))
}

#[instrument(skip_all)]
fn run(args: Args) -> Result<(), TracedError<LOVError>> {
    let cfg = LOVConfig::default()
        .with_debounce(args.debounce_ms)
        .with_page_size(args.page_size)
        .with_event_poll_time(args.poll_ms);

    let store = RecordStore::sample();
    let mut model = Model::init(&cfg, store.list_all().to_vec(), 0, 0)?;
    for arg in args.filters.iter() {
        let (column, value) = parse_filter(arg)?;
        model.set_filter(column, value)?;
    }
    if let Some(sort) = &args.sort {
        let (column, direction) = parse_sort(sort)?;
        model.set_sort(column, direction)?;
    }

    if args.print {
        println!("{}", render_plain(model.get_uidata()));
        return Ok(());
    }

    info!("Starting lov!");
    let mut terminal = ratatui::init();
    let result = run_tui(&cfg, &mut model, &mut terminal);
    ratatui::restore();
    result
}

#[instrument(skip_all)]
fn run_tui(
    cfg: &LOVConfig,
    model: &mut Model,
    terminal: &mut ratatui::DefaultTerminal,
) -> Result<(), TracedError<LOVError>> {
    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    let size = terminal.size().map_err(LOVError::from)?;
    model.update(Some(lov::Message::Resize(size.width as usize, size.height as usize)))?;

    while model.status != Status::QUITTING {
        // Render the current view
        terminal
            .draw(|f| ui.draw(model, f))
            .map_err(LOVError::from)?;

        // Handle events and map to a Message
        let message = controller.handle_event(model)?;
        model.update(message)?;
    }
    Ok(())
}

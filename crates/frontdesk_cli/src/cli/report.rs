use super::intake::print_request;
use super::Session;
use clap::Args;
use frontdesk_core::report::aggregate::bar_width_percent;
use frontdesk_core::report::paginate::{page_size_option, DEFAULT_PAGE_SIZE};
use frontdesk_core::{DayKey, ReportCriteria, ReportService, ReportSession, ServiceFilter};

const BAR_WIDTH: usize = 40;

/// Day range and substring filters shared by `report` and `export`.
#[derive(Debug, Args)]
pub(crate) struct FilterArgs {
    /// First day of the range (YYYY-MM-DD); defaults to today
    #[arg(long)]
    from: Option<DayKey>,

    /// Last day of the range (YYYY-MM-DD); defaults to today
    #[arg(long)]
    to: Option<DayKey>,

    /// Service code, label or `all`
    #[arg(long, default_value = "all")]
    service: ServiceFilter,

    /// Case-insensitive part of the citizen name
    #[arg(long, default_value = "")]
    name: String,

    /// Digits contained in the national ID
    #[arg(long, default_value = "")]
    national_id: String,
}

impl FilterArgs {
    pub(crate) fn criteria(&self) -> ReportCriteria {
        let today = DayKey::today();
        ReportCriteria {
            start_day: self.from.unwrap_or(today),
            end_day: self.to.unwrap_or(today),
            service: self.service,
            name_contains: self.name.clone(),
            id_contains: self.national_id.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    filters: FilterArgs,

    /// Page to display, starting at 1; clamped to the last page
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rows per page (10, 20, 50 or 100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    page_size: usize,
}

/// Loads `filters` into a fresh session after the admin check.
pub(crate) fn load(session: Session, filters: &FilterArgs) -> Result<ReportSession, String> {
    session.admin()?;
    let criteria = filters.criteria();
    let service = ReportService::new(session.store);
    let mut report = ReportSession::new(criteria.clone());
    service
        .apply_filters(&mut report, criteria)
        .map_err(|error| format!("failed to load report: {error}"))?;
    Ok(report)
}

pub(crate) fn run(session: Session, args: ReportArgs) -> Result<(), String> {
    let mut report = load(session, &args.filters)?;
    report.set_page_size(args.page_size);
    report.go_to_page(args.page);

    let summary = report.summary();
    let criteria = report.criteria();
    println!(
        "range: {} .. {}  service: {}",
        criteria.start_day, criteria.end_day, criteria.service
    );
    println!("total: {}", summary.total);

    println!("top services:");
    for (service, count) in summary.top_services() {
        println!("  {:<32} {count}", service.label());
    }

    println!("by day:");
    for (day, count) in &summary.by_day {
        println!("  {day} {} {count}", bar(*count, summary.max_day));
    }

    println!("by hour:");
    for (hour, count) in summary.by_hour.iter().enumerate() {
        println!("  {hour:02}h {} {count}", bar(*count, summary.max_hour));
    }

    println!(
        "page {} of {} ({} per page)",
        report.pager().page(),
        report.total_pages(),
        report.pager().page_size()
    );
    for request in report.page() {
        print_request(request);
    }
    Ok(())
}

fn parse_page_size(raw: &str) -> Result<usize, String> {
    let page_size = raw
        .parse::<usize>()
        .map_err(|error| format!("invalid page size `{raw}`: {error}"))?;
    page_size_option(page_size).map_err(|error| error.to_string())
}

fn bar(value: usize, max: usize) -> String {
    let cells = (bar_width_percent(value, max) / 100.0 * BAR_WIDTH as f64).round() as usize;
    format!("{:<width$}", "#".repeat(cells), width = BAR_WIDTH)
}

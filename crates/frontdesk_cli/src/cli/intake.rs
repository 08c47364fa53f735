use super::Session;
use clap::{ArgGroup, Args};
use frontdesk_core::{
    DayKey, IntakeForm, IntakeService, RequestId, RequestPatch, ServiceRequest, ServiceType,
};

#[derive(Debug, Args)]
pub(crate) struct IntakeArgs {
    /// Citizen full name
    #[arg(long)]
    name: String,

    /// National ID, with or without separators
    #[arg(long)]
    national_id: String,

    /// Service code or label
    #[arg(long, default_value_t = ServiceType::default())]
    service: ServiceType,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("field").required(true).args(["name", "national_id", "service"])))]
pub(crate) struct EditArgs {
    /// Request id
    id: RequestId,

    /// New citizen name
    #[arg(long)]
    name: Option<String>,

    /// New national ID
    #[arg(long)]
    national_id: Option<String>,

    /// New service code or label
    #[arg(long)]
    service: Option<ServiceType>,
}

#[derive(Debug, Args)]
pub(crate) struct TodayArgs {
    /// Day to list (YYYY-MM-DD); defaults to today
    #[arg(long)]
    day: Option<DayKey>,
}

pub(crate) fn run_intake(session: Session, args: IntakeArgs) -> Result<(), String> {
    let operator = session.operator()?;
    let service = IntakeService::new(session.store);
    let form = IntakeForm::new(&args.name, &args.national_id, args.service);

    let saved = service
        .register(&operator, &form)
        .map_err(|error| format!("failed to register request: {error}"))?;

    println!("request_id: {}", saved.id);
    print_request(&saved);
    Ok(())
}

pub(crate) fn run_edit(session: Session, args: EditArgs) -> Result<(), String> {
    session.operator()?;
    let patch = match (args.name, args.national_id, args.service) {
        (Some(name), _, _) => RequestPatch::name(&name),
        (_, Some(national_id), _) => RequestPatch::national_id(&national_id),
        (_, _, Some(service)) => RequestPatch::Service(service),
        (None, None, None) => return Err("one field to edit is required".to_string()),
    };

    let service = IntakeService::new(session.store);
    let edited = service
        .edit(args.id, &patch)
        .map_err(|error| format!("failed to edit request: {error}"))?;

    print_request(&edited);
    Ok(())
}

pub(crate) fn run_today(session: Session, args: TodayArgs) -> Result<(), String> {
    session.operator()?;
    let day = args.day.unwrap_or_else(DayKey::today);
    let service = IntakeService::new(session.store);
    let mut board = service.watch_day(day);

    if let Some(banner) = board.banner() {
        return Err(banner);
    }

    let items = board.items();
    if items.is_empty() {
        println!("no requests registered on {day}");
    }
    for request in &items {
        print_request(request);
    }
    board.close();
    Ok(())
}

pub(crate) fn print_request(request: &ServiceRequest) {
    println!(
        "{}  {}  {}  {}  {}",
        request.day_key,
        request.id,
        request.masked_id(),
        request.service.label(),
        request.name
    );
}

use super::Session;
use clap::Args;
use frontdesk_core::{ReportService, RequestId};

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Request id
    id: RequestId,
}

pub(crate) fn run(session: Session, args: ShowArgs) -> Result<(), String> {
    session.admin()?;
    let service = ReportService::new(session.store);
    let detail = service
        .detail(args.id)
        .map_err(|error| format!("failed to load request: {error}"))?;

    for (label, value) in detail.fields() {
        println!("{label}: {value}");
    }
    Ok(())
}

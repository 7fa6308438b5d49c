use crate::infra::{parse_status, ConfiguredStore};
use clap::{Args, Subcommand};
use complaint_desk::complaints::{
    write_csv, Complaint, ComplaintFilter, ComplaintService, ComplaintStats, ComplaintStatus,
    ComplaintStore, NewComplaint,
};
use complaint_desk::config::AppConfig;
use complaint_desk::error::AppError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Subcommand, Debug)]
pub(crate) enum ComplaintsCommand {
    /// Record a new complaint (starts as `new`)
    Submit(SubmitArgs),
    /// List complaints newest first, optionally filtered
    List(ListArgs),
    /// Show every complaint filed under an exact email address
    Lookup(LookupArgs),
    /// Show a single complaint
    Show(ShowArgs),
    /// Move a complaint to another status
    SetStatus(SetStatusArgs),
    /// Print totals per status and the resolution rate
    Stats,
    /// Write all complaints as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Short summary of the problem
    #[arg(long)]
    pub(crate) title: String,
    /// Full description of the problem
    #[arg(long)]
    pub(crate) description: String,
    /// Address the customer can be reached at
    #[arg(long)]
    pub(crate) email: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Case-insensitive match against title, description and email
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Only show complaints in this status
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<ComplaintStatus>,
}

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    #[arg(long)]
    pub(crate) email: String,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    #[arg(long)]
    pub(crate) id: i64,
}

#[derive(Args, Debug)]
pub(crate) struct SetStatusArgs {
    #[arg(long)]
    pub(crate) id: i64,
    /// One of new, in_progress, pending_user_info, resolved, rejected
    #[arg(long)]
    pub(crate) status: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Destination file. Defaults to stdout.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(command: ComplaintsCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = ConfiguredStore::open(&config.storage)?;
    let service = ComplaintService::new(Arc::new(store));
    let stdout = io::stdout();
    execute(&service, command, &mut stdout.lock())
}

fn execute<S, W>(
    service: &ComplaintService<S>,
    command: ComplaintsCommand,
    out: &mut W,
) -> Result<(), AppError>
where
    S: ComplaintStore + 'static,
    W: Write,
{
    match command {
        ComplaintsCommand::Submit(args) => {
            let complaint = service.create(NewComplaint {
                title: args.title,
                description: args.description,
                customer_email: args.email,
            })?;
            writeln!(out, "Recorded complaint #{}", complaint.id)?;
            render_complaint(out, &complaint)?;
        }
        ComplaintsCommand::List(args) => {
            let filter = ComplaintFilter {
                search: args.search,
                status: args.status,
            };
            let complaints = filter.apply(service.get_all()?);
            render_list(out, &complaints)?;
        }
        ComplaintsCommand::Lookup(args) => {
            let complaints = service.get_by_email(&args.email)?;
            render_list(out, &complaints)?;
        }
        ComplaintsCommand::Show(args) => match service.get_by_id(args.id)? {
            Some(complaint) => {
                render_complaint(out, &complaint)?;
                writeln!(out, "  {}", complaint.description)?;
            }
            None => writeln!(out, "No complaint with id {}", args.id)?,
        },
        ComplaintsCommand::SetStatus(args) => {
            let complaint = service.update_status_str(args.id, &args.status)?;
            writeln!(out, "Complaint #{} is now {}", complaint.id, complaint.status)?;
        }
        ComplaintsCommand::Stats => {
            let stats = ComplaintStats::from_complaints(&service.get_all()?);
            render_stats(out, &stats)?;
        }
        ComplaintsCommand::Export(args) => {
            let complaints = service.get_all()?;
            match args.output {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(&path)?);
                    write_csv(&mut writer, &complaints)?;
                    writer.flush()?;
                    writeln!(
                        out,
                        "Exported {} complaints to {}",
                        complaints.len(),
                        path.display()
                    )?;
                }
                None => write_csv(&mut *out, &complaints)?,
            }
        }
    }
    Ok(())
}

fn render_complaint<W: Write>(out: &mut W, complaint: &Complaint) -> io::Result<()> {
    writeln!(
        out,
        "#{} [{}] {} <{}> created {} updated {}",
        complaint.id,
        complaint.status,
        complaint.title,
        complaint.customer_email,
        complaint.created_at.format("%Y-%m-%d %H:%M"),
        complaint.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

fn render_list<W: Write>(out: &mut W, complaints: &[Complaint]) -> io::Result<()> {
    if complaints.is_empty() {
        return writeln!(out, "No complaints found");
    }
    for complaint in complaints {
        render_complaint(out, complaint)?;
    }
    Ok(())
}

fn render_stats<W: Write>(out: &mut W, stats: &ComplaintStats) -> io::Result<()> {
    writeln!(out, "Complaints: {}", stats.total)?;
    for status in ComplaintStatus::ALL {
        writeln!(out, "- {}: {}", status, stats.count(status))?;
    }
    writeln!(out, "Pending action: {}", stats.pending_action)?;
    writeln!(out, "Resolution rate: {:.1}%", stats.resolution_rate)
}

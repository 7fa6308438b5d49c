use std::io::Write;

use serde::Serialize;

use super::domain::Complaint;

/// Column layout for CSV exports of the complaint table.
#[derive(Debug, Serialize)]
struct ComplaintCsvRow<'a> {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Customer Email")]
    customer_email: &'a str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Created At")]
    created_at: String,
    #[serde(rename = "Updated At")]
    updated_at: String,
}

impl<'a> From<&'a Complaint> for ComplaintCsvRow<'a> {
    fn from(complaint: &'a Complaint) -> Self {
        Self {
            id: complaint.id.0,
            title: &complaint.title,
            description: &complaint.description,
            customer_email: &complaint.customer_email,
            status: complaint.status.label(),
            created_at: complaint.created_at.to_rfc3339(),
            updated_at: complaint.updated_at.to_rfc3339(),
        }
    }
}

/// Writes `complaints` as CSV with a header row, in the order given.
pub fn write_csv<W: Write>(writer: W, complaints: &[Complaint]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);
    for complaint in complaints {
        csv_writer.serialize(ComplaintCsvRow::from(complaint))?;
    }
    csv_writer.flush()?;
    Ok(())
}

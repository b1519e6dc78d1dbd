//! CSV export of interest registrations

use crate::error::Result;
use crate::interest::InterestRegistration;
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Header row of the export
pub const CSV_HEADER: [&str; 3] = ["Email", "Roles", "Registered At"];

/// Timestamp format of the "Registered At" column
pub const TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// Renders registrations as a fully quoted CSV document
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationCsv;

impl RegistrationCsv {
    pub fn new() -> Self {
        Self
    }

    /// Render the document; rows keep the order given
    pub fn render(&self, registrations: &[InterestRegistration]) -> String {
        let mut out = String::new();
        push_row(&mut out, CSV_HEADER.iter().copied());
        for registration in registrations {
            let roles = registration.role_labels().join(", ");
            let registered_at = format_timestamp(&registration.created_at);
            push_row(
                &mut out,
                [
                    registration.email.as_str(),
                    roles.as_str(),
                    registered_at.as_str(),
                ]
                .into_iter(),
            );
        }
        out
    }

    /// `interest-registrations-<YYYY-MM-DD>.csv`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("interest-registrations-{}.csv", date.format("%Y-%m-%d"))
    }

    /// Write the document into `dir` under the dated file name
    pub fn write_to_dir(
        &self,
        dir: &Path,
        registrations: &[InterestRegistration],
        date: NaiveDate,
    ) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(date));
        let temp_path = path.with_extension("csv.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(self.render(registrations).as_bytes())?;
            file.flush()?;
        }
        fs::rename(&temp_path, &path)?;

        info!(
            "Exported {} registrations to {}",
            registrations.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Human-readable registration time, e.g. `05 Mar 2025, 09:30`
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let row: Vec<String> = cells.map(quote).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interest::{InterestRole, RegistrationType};
    use crate::types::{RegistrationId, VoterId};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn registration(email: &str, roles: Vec<InterestRole>) -> InterestRegistration {
        InterestRegistration {
            id: RegistrationId::new(),
            voter_id: VoterId::from_email(email),
            email: email.to_string(),
            roles,
            registration_type: RegistrationType::Participant,
            supervisor_email: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 5, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_render() {
        let rows = vec![registration(
            "jane@example.com",
            vec![InterestRole::ProductSponsor, InterestRole::Hacker],
        )];

        let csv = RegistrationCsv::new().render(&rows);
        assert_eq!(
            csv,
            "\"Email\",\"Roles\",\"Registered At\"\n\
             \"jane@example.com\",\"Product Sponsor, Hacker (Developer)\",\"05 Mar 2025, 09:30\"\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let csv = RegistrationCsv::new().render(&[]);
        assert_eq!(csv, "\"Email\",\"Roles\",\"Registered At\"\n");
    }

    #[test]
    fn test_quotes_are_doubled() {
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(
            RegistrationCsv::new().file_name(date),
            "interest-registrations-2025-03-05.csv"
        );
    }

    #[test]
    fn test_write_to_dir() {
        let dir = TempDir::new().unwrap();
        let rows = vec![registration("a@example.com", vec![InterestRole::Coach])];
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

        let path = RegistrationCsv::new()
            .write_to_dir(dir.path(), &rows, date)
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "interest-registrations-2025-03-05.csv");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"a@example.com\",\"Coach\""));
        assert!(!path.with_extension("csv.tmp").exists());
    }
}

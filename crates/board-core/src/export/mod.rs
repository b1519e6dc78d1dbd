//! Export of interest registrations
//!
//! Every cell is double-quoted and embedded quotes are doubled:
//!
//! ```text
//! "Email","Roles","Registered At"
//! "jane@example.com","Product Sponsor, Hacker (Developer)","05 Mar 2025, 09:30"
//! ```

mod csv;

pub use csv::{format_timestamp, RegistrationCsv, CSV_HEADER, TIMESTAMP_FORMAT};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

pub const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: Uuid,
    /// Always the first day of the month.
    pub report_month: NaiveDate,
    pub resident_id: Uuid,
    pub resident_name: String,
    pub description: String,
    pub pdf_path: String,
    pub created_at: DateTime<Utc>,
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn validate_report_month(month: NaiveDate, today: NaiveDate) -> Result<NaiveDate, String> {
    let month = first_of_month(month);
    if month > first_of_month(today) {
        return Err("report_month cannot be in the future.".into());
    }
    Ok(month)
}

pub fn validate_pdf(bytes: &[u8], max_bytes: usize) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("pdf file is required.".into());
    }
    if bytes.len() > max_bytes {
        return Err(format!("pdf must be at most {max_bytes} bytes."));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err("Only PDF files are supported.".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_is_normalised_to_day_one() {
        assert_eq!(validate_report_month(d(2024, 9, 17), d(2024, 10, 3)).unwrap(), d(2024, 9, 1));
        assert_eq!(validate_report_month(d(2024, 10, 30), d(2024, 10, 3)).unwrap(), d(2024, 10, 1));
    }

    #[test]
    fn future_months_are_rejected() {
        assert!(validate_report_month(d(2024, 11, 1), d(2024, 10, 31)).is_err());
    }

    #[test]
    fn pdf_checks() {
        assert!(validate_pdf(b"%PDF-1.7 body", 1024).is_ok());
        assert!(validate_pdf(b"", 1024).is_err());
        assert!(validate_pdf(b"PK\x03\x04zip", 1024).is_err());
        assert!(validate_pdf(b"%PDF-1.7 body", 4).is_err());
    }
}

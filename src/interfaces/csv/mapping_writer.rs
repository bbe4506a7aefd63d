use crate::domain::report::MappingRow;
use crate::error::Result;
use std::io::Write;

/// Writes the payment-to-account mapping as CSV, header first.
pub struct MappingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> MappingWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_rows(mut self, rows: &[MappingRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resolution::{FailureReason, ResolutionResult};

    #[test]
    fn test_header_and_not_found_row() {
        let rows = vec![MappingRow::from_resolution(&ResolutionResult::Unresolved {
            payment_id: "pi_X".to_string(),
            reason: FailureReason::NotFound,
        })];
        let mut buf = Vec::new();
        MappingWriter::new(&mut buf).write_rows(&rows).unwrap();

        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some(
                "payment_id,account_id,account_name,customer_name,event_name,\
                 amount,currency,status,transaction_date_est,payout_status,payout_date"
            )
        );
        assert_eq!(lines.next(), Some("pi_X,,NOT FOUND,,,0,,,,,"));
    }
}

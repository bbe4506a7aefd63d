use crate::error::Result;
use std::io::{BufRead, BufReader, Read};

/// Reads an ordered list of payment ids, one per line. Blank lines and the
/// `N/A` sentinel some exports use for missing ids are filtered out.
pub struct PaymentIdsReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> PaymentIdsReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    pub fn ids(self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for line in self.reader.lines() {
            let line = line?;
            let id = line.trim();
            if !id.is_empty() && id != "N/A" {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}

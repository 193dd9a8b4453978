use crate::domain::request::Request;
use crate::error::{AssetError, Result};
use std::io::Read;

/// Reads requests from a CSV source.
///
/// Expects the header `op, caller, from, to, value, data`. Whitespace around
/// fields is trimmed and short records are accepted, missing trailing columns
/// reading as empty.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    ///
    /// A malformed row yields an error for that row only; reading continues
    /// with the next one.
    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AssetError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Identity;
    use crate::domain::request::Operation;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, caller, from, to, value, data\n\
                    token_transfer, 1, , 2, 100, \n\
                    item_safe_transfer_from, 1, 1, 9, 4, hello";
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<Request>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.op, Operation::TokenTransfer);
        assert_eq!(first.to, Some(Identity(2)));
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.data.as_deref(), Some("hello"));
    }

    #[test]
    fn test_reader_short_record() {
        let data = "op, caller, from, to, value, data\nitem_burn, 1, , , 3";
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<Request>> = reader.requests().collect();

        let request = results[0].as_ref().unwrap();
        assert_eq!(request.value, Some(3));
        assert_eq!(request.data, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, caller, from, to, value, data\n\
                    launch_rocket, 1, , , , \n\
                    ballot_vote, abc, , , 1, \n\
                    ballot_vote, 1, , , 1, ";
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<Request>> = reader.requests().collect();

        assert!(matches!(results[0], Err(AssetError::CsvError(_))));
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}

//! Header parser: the first row names every column for the rest of the run.

use csv::ByteRecord;
use log::debug;
use std::io::Read;

use crate::Header;
use crate::error::IngestError;

/// Consume exactly one row from `rdr` and return it as the [`Header`].
///
/// An empty stream or an unreadable first row is [`IngestError::MalformedInput`]; nothing else is
/// read in that case. Names are taken as-is: a repeated name is kept, and when rows are zipped the
/// later column's value wins.
pub fn read_header<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Header, IngestError> {
    let mut record = ByteRecord::new();
    match rdr.read_byte_record(&mut record) {
        Ok(true) => {}
        Ok(false) => {
            return Err(IngestError::MalformedInput(
                "empty input: no header row".to_string(),
            ));
        }
        Err(e) => {
            return Err(IngestError::MalformedInput(format!(
                "header row unreadable: {e}"
            )));
        }
    }

    let fields: Vec<String> = record
        .iter()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();
    debug!("header: {} fields {:?}", fields.len(), fields);
    Ok(Header::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::source::csv_reader;

    #[test]
    fn test_reads_first_row_only() {
        let mut rdr = csv_reader("title,author\nA,B\n".as_bytes(), b',');
        let header = read_header(&mut rdr).unwrap();
        assert_eq!(header.fields(), ["title", "author"]);
        let mut rest = csv::StringRecord::new();
        assert!(rdr.read_record(&mut rest).unwrap());
        assert_eq!(rest.iter().collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let mut rdr = csv_reader("".as_bytes(), b',');
        let err = read_header(&mut rdr).unwrap_err();
        assert!(matches!(err, IngestError::MalformedInput(_)));
    }

    #[test]
    fn test_repeated_field_names_are_kept() {
        let mut rdr = csv_reader("id,name,id\n1,a,2\n".as_bytes(), b',');
        let header = read_header(&mut rdr).unwrap();
        assert_eq!(header.fields(), ["id", "name", "id"]);
        let record = header
            .zip(vec!["1".into(), "a".into(), "2".into()], 2)
            .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["id"], "2");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut rdr = csv_reader("a;b;c\n".as_bytes(), b';');
        assert_eq!(read_header(&mut rdr).unwrap().len(), 3);
    }
}

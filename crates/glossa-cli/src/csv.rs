//! Minimal CSV reading and writing for relation sheets.
//!
//! Quoted fields may contain commas, doubled quotes and line breaks.

/// Header row of a relation sheet.
pub const HEADER: [&str; 2] = ["fullyQualifiedName", "relatedTerms"];

/// Splits CSV text into records.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            c => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect()
}

/// Formats one record, quoting fields that need it.
pub fn format_record(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| {
            if field.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn is_header(record: &[String]) -> bool {
    record.first().map(|f| f.trim()) == Some(HEADER[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_fields() {
        let text = "fullyQualifiedName,relatedTerms\nFinance.Revenue,\"synonym:Finance.Profit;Sales.Deal\"\n\"A \"\"B\"\"\",\"x,\ny\"\n";
        let records = parse(text);

        assert_eq!(records.len(), 3);
        assert!(is_header(&records[0]));
        assert_eq!(records[1], vec!["Finance.Revenue", "synonym:Finance.Profit;Sales.Deal"]);
        assert_eq!(records[2], vec!["A \"B\"", "x,\ny"]);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_handles_crlf() {
        let records = parse("a,b\r\n\r\nc,\r\n");
        assert_eq!(records, vec![vec!["a", "b"], vec!["c", ""]]);
    }

    #[test]
    fn test_format_record() {
        assert_eq!(format_record(&["Finance.Revenue", "Sales.Deal"]), "Finance.Revenue,Sales.Deal");
        assert_eq!(format_record(&["a,b", "say \"hi\""]), "\"a,b\",\"say \"\"hi\"\"\"");
    }
}

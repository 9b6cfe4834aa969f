//! CSV output format for the ranked unresolved syscall table

use crate::rank::RankedTable;

/// CSV formatter for a ranked table
#[derive(Debug)]
pub struct CsvTableOutput<'a> {
    table: &'a RankedTable,
    program_labels: &'a [String],
}

impl<'a> CsvTableOutput<'a> {
    /// Create a formatter; `program_labels` name the table's program columns
    pub fn new(table: &'a RankedTable, program_labels: &'a [String]) -> Self {
        Self {
            table,
            program_labels,
        }
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        // If field contains comma, quote, or newline, wrap in quotes and escape quotes
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn header(&self) -> String {
        let mut headers = vec!["syscall".to_string(), "id".to_string()];
        headers.extend(self.program_labels.iter().map(|l| Self::escape_field(l)));
        headers.push("total".to_string());
        headers.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for row in &self.table.rows {
            let mut fields = vec![Self::escape_field(&row.label()), row.id.to_string()];
            fields.extend(row.counts.iter().map(u64::to_string));
            fields.push(row.total().to_string());
            output.push_str(&fields.join(","));
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::RankedRow;

    fn table() -> RankedTable {
        RankedTable {
            programs: vec!["a".to_string(), "b".to_string()],
            rows: vec![
                RankedRow {
                    id: 435,
                    name: Some("clone3".to_string()),
                    counts: vec![12, 4],
                },
                RankedRow {
                    id: 1000,
                    name: None,
                    counts: vec![0, 2],
                },
            ],
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let table = table();
        let labels = vec!["A".to_string(), "B".to_string()];
        let csv = CsvTableOutput::new(&table, &labels).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "syscall,id,A,B,total");
        assert_eq!(lines[1], "clone3,435,12,4,16");
        assert_eq!(lines[2], "1000,1000,0,2,2");
    }

    #[test]
    fn test_csv_escapes_labels() {
        let table = table();
        let labels = vec!["Foo, Inc".to_string(), "say \"hi\"".to_string()];
        let csv = CsvTableOutput::new(&table, &labels).to_csv();
        assert!(csv.starts_with("syscall,id,\"Foo, Inc\",\"say \"\"hi\"\"\",total\n"));
    }

    #[test]
    fn test_csv_empty_table() {
        let table = RankedTable {
            programs: vec![],
            rows: vec![],
        };
        let csv = CsvTableOutput::new(&table, &[]).to_csv();
        assert_eq!(csv, "syscall,id,total\n");
    }
}

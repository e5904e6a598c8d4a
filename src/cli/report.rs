use tabled::Table;

use crate::{collector::GenreTally, types::GenreTableRow, warning};

/// How the final genre report is printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub table: bool,
    pub limit: Option<usize>,
}

pub fn report_rows(tally: &GenreTally, limit: Option<usize>) -> Vec<(String, u64)> {
    let mut rows = tally.report();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

pub fn print_report(tally: &GenreTally, options: ReportOptions) {
    if tally.is_empty() {
        warning!("No genres found.");
        return;
    }

    let rows = report_rows(tally, options.limit);

    println!("\nGenre Frequencies:");
    if options.table {
        let table_rows: Vec<GenreTableRow> = rows
            .into_iter()
            .map(|(genre, count)| GenreTableRow { genre, count })
            .collect();
        println!("{}", Table::new(table_rows));
    } else {
        for (genre, count) in rows {
            println!("{}: {}", genre, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_truncates_after_sorting() {
        let mut tally = GenreTally::new();
        tally.tally(["ambient"]);
        tally.tally(["techno", "house"]);
        tally.tally(["techno"]);

        let rows = report_rows(&tally, Some(1));
        assert_eq!(rows, vec![("techno".to_string(), 2)]);

        assert_eq!(report_rows(&tally, None).len(), 3);
        assert_eq!(report_rows(&tally, Some(10)).len(), 3);
    }
}

// src/report.rs
// =============================================================================
// Prints the final report, one line per outcome, in the order given:
//
//   <url>                        when the fetch succeeded
//   Couldn't fetch site <url>    when it failed
//
// No totals and no exit-code logic. The reporter is only ever handed the
// outcomes after the pipeline has returned, i.e. after every worker ended.
// =============================================================================

use crate::fetch::FetchOutcome;
use std::io::{self, Write};
use tracing::debug;

// Formats a single report line (without the newline)
pub fn report_line(outcome: &FetchOutcome) -> String {
    if outcome.succeeded() {
        outcome.url().to_string()
    } else {
        format!("Couldn't fetch site {}", outcome.url())
    }
}

// Writes the report to any writer; tests pass a Vec<u8>
pub fn write_report<W: Write>(out: &mut W, outcomes: &[FetchOutcome]) -> io::Result<()> {
    for outcome in outcomes {
        debug!(
            url = outcome.url(),
            worker = outcome.worker(),
            status = ?outcome.status(),
            error = ?outcome.error_detail(),
            "reporting outcome"
        );
        writeln!(out, "{}", report_line(outcome))?;
    }
    out.flush()
}

pub fn print_report(outcomes: &[FetchOutcome]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchResponse};

    #[test]
    fn test_report_lines_follow_given_order() {
        let outcomes = vec![
            FetchOutcome::failure(
                "http://fail.test".to_string(),
                2,
                &FetchError::Dns("no such host".to_string()),
            ),
            FetchOutcome::success("http://ok.test".to_string(), 1, FetchResponse { status: 404 }),
        ];

        let mut output = Vec::new();
        write_report(&mut output, &outcomes).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Couldn't fetch site http://fail.test\nhttp://ok.test\n"
        );
    }

    #[test]
    fn test_empty_report_prints_nothing() {
        let mut output = Vec::new();
        write_report(&mut output, &[]).unwrap();
        assert!(output.is_empty());
    }
}

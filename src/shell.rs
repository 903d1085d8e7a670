//! Interactive question loop.
//!
//! Two states: `AwaitingInput` until the user types `exit` (any case,
//! surrounding whitespace ignored) or input ends, then `Terminated`.
//! A failed question is printed and logged; the loop keeps going.

use crate::query::QueryHandler;
use crate::types::{QueryOutcome, Result};
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::{error, info};

const BANNER: &str = r#"
    ╔═════════════════════════════════════════════════╗
    ║                                                 ║
    ║   Welcome to the sqlrag Query System!           ║
    ║                                                 ║
    ║   Enter your queries or type 'exit' to quit.    ║
    ║                                                 ║
    ╚═════════════════════════════════════════════════╝
"#;

const FAREWELL: &str = "Thank you for using the sqlrag Query System. See you soon!";

const PROMPT: &str = "Enter your query: ";

/// Shell state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    /// Waiting for the next line
    AwaitingInput,
    /// Exit requested; no more lines are processed
    Terminated,
}

/// True if the line is the exit sentinel.
pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

/// Read-eval-print loop over a `QueryHandler`.
pub struct Shell<H> {
    handler: H,
    tables: Vec<String>,
    state: ShellState,
}

impl<H: QueryHandler> Shell<H> {
    /// Create new shell.
    ///
    /// # Arguments
    ///
    /// * `handler` - Receives every non-exit line
    /// * `tables` - Table names announced at startup
    pub fn new(handler: H, tables: Vec<String>) -> Self {
        Self {
            handler,
            tables,
            state: ShellState::AwaitingInput,
        }
    }

    /// Current state.
    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Print the banner, then process lines until exit or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(out, "{}", BANNER)?;
        writeln!(out, "Found tables: {}", self.tables.join(", "))?;
        info!(tables = %self.tables.join(", "), "Shell started");

        while self.state == ShellState::AwaitingInput {
            write!(out, "\n{}", PROMPT)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                self.terminate(&mut out)?;
                break;
            }

            self.step(&line, &mut out).await?;
        }

        info!("Shell terminated");
        Ok(())
    }

    /// Handle one input line.
    ///
    /// # Returns
    ///
    /// State after the line
    ///
    /// # Errors
    ///
    /// Only failures writing to `out`; question failures are printed instead
    pub async fn step<W: Write>(&mut self, line: &str, out: &mut W) -> Result<ShellState> {
        if self.state == ShellState::Terminated {
            return Ok(self.state);
        }

        if is_exit(line) {
            self.terminate(out)?;
            return Ok(self.state);
        }

        let question = line.trim();
        if question.is_empty() {
            return Ok(self.state);
        }

        writeln!(out, "\nProcessing query...")?;
        match self.handler.handle(question).await {
            Ok(outcome) => print_outcome(&outcome, out)?,
            Err(e) => {
                error!(error = %e, details = ?e, query = question, "Query failed");
                writeln!(out, "\n{} {}", "Error:".red().bold(), e)?;
            }
        }

        Ok(self.state)
    }

    fn terminate<W: Write>(&mut self, out: &mut W) -> Result<()> {
        writeln!(out, "\n{}\n", FAREWELL)?;
        self.state = ShellState::Terminated;
        Ok(())
    }
}

fn print_outcome<W: Write>(outcome: &QueryOutcome, out: &mut W) -> Result<()> {
    writeln!(out, "\n{}", "Answer:".green().bold())?;
    writeln!(out, "{}", outcome.answer)?;
    writeln!(out, "\n{}", "SQL Query:".green().bold())?;
    writeln!(out, "{}", outcome.sql_query)?;
    writeln!(out, "\n{}", "Data:".green().bold())?;
    writeln!(out, "{}", outcome.data)?;
    writeln!(out, "\nQuery processed successfully!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QueryTable, SqlRagError, Value};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Handler that counts calls and fails on demand.
    struct CountingHandler {
        calls: AtomicUsize,
        fail_with_missing_sql: bool,
    }

    impl CountingHandler {
        fn new(fail_with_missing_sql: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with_missing_sql,
            }
        }
    }

    #[async_trait]
    impl QueryHandler for CountingHandler {
        async fn handle(&self, _question: &str) -> Result<QueryOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_missing_sql {
                return Err(SqlRagError::MissingMetadata("sql_query".to_string()));
            }
            Ok(QueryOutcome {
                answer: "The Laptop is the most expensive product.".to_string(),
                sql_query: "SELECT name, price FROM products ORDER BY price DESC LIMIT 1".to_string(),
                data: QueryTable {
                    columns: vec!["name".to_string(), "price".to_string()],
                    rows: vec![vec![Value::Text("Laptop".to_string()), Value::Real(999.99)]],
                },
            })
        }
    }

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit"));
        assert!(is_exit("  ExIt \n"));
        assert!(is_exit("EXIT"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("quit"));
    }

    #[tokio::test]
    async fn test_exit_skips_handler() {
        plain();
        let mut shell = Shell::new(CountingHandler::new(false), vec![]);
        let mut out = Vec::new();

        let state = shell.step("   eXiT  \n", &mut out).await.unwrap();
        assert_eq!(state, ShellState::Terminated);
        assert_eq!(shell.handler.calls.load(Ordering::SeqCst), 0);
        assert!(String::from_utf8(out).unwrap().contains(FAREWELL));

        // Terminated shells ignore further input.
        shell.step("top products", &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(shell.handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_prints_three_parts() {
        plain();
        let mut shell = Shell::new(CountingHandler::new(false), vec![]);
        let mut out = Vec::new();

        let state = shell.step("most expensive product", &mut out).await.unwrap();
        assert_eq!(state, ShellState::AwaitingInput);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Answer:\nThe Laptop is the most expensive product."));
        assert!(text.contains("SQL Query:\nSELECT name, price FROM products"));
        assert!(text.contains("Data:\n  name   price\nLaptop  999.99"));
        assert!(text.contains("Query processed successfully!"));
    }

    #[tokio::test]
    async fn test_failure_keeps_awaiting_input() {
        plain();
        let mut shell = Shell::new(CountingHandler::new(true), vec![]);
        let mut out = Vec::new();

        let state = shell.step("top 3 products", &mut out).await.unwrap();
        assert_eq!(state, ShellState::AwaitingInput);
        assert!(String::from_utf8(out).unwrap().contains("Error:"));
    }

    #[tokio::test]
    async fn test_run_until_exit() {
        plain();
        let input = Cursor::new("top products\n\nbroken?\nExit\nnever read\n");
        let mut shell = Shell::new(
            CountingHandler::new(false),
            vec!["products".to_string(), "customers".to_string()],
        );
        let mut out = Vec::new();

        shell.run(input, &mut out).await.unwrap();

        assert_eq!(shell.state(), ShellState::Terminated);
        assert_eq!(shell.handler.calls.load(Ordering::SeqCst), 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Found tables: products, customers"));
        assert!(text.trim_end().ends_with(FAREWELL));
    }

    #[tokio::test]
    async fn test_end_of_input_terminates() {
        plain();
        let mut shell = Shell::new(CountingHandler::new(false), vec![]);
        shell.run(Cursor::new(""), Vec::<u8>::new()).await.unwrap();
        assert_eq!(shell.state(), ShellState::Terminated);
    }

    /// Shared buffer usable as a tracing writer.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_is_logged() {
        plain();
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut shell = Shell::new(CountingHandler::new(true), vec![]);
        shell.step("top 3 products", &mut Vec::<u8>::new()).await.unwrap();

        let logged = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Query failed"));
        assert!(logged.contains("sql_query"));
    }
}

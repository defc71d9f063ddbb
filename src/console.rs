use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use crate::models::{ItemStatus, MenuItem, Order};

/// Result rows are printed tab-separated with one header line, and only when
/// the result set is non-empty.
pub trait Tabular {
    const HEADER: &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Tabular for MenuItem {
    const HEADER: &'static [&'static str] =
        &["item_name", "type", "price", "description", "image_url"];

    fn row(&self) -> Vec<String> {
        vec![
            self.item_name.clone(),
            self.type_.clone(),
            self.price.to_string(),
            self.description.clone(),
            self.image_url.clone(),
        ]
    }
}

impl Tabular for Order {
    const HEADER: &'static [&'static str] =
        &["order_id", "login", "paid", "timestamp_recieved", "total"];

    fn row(&self) -> Vec<String> {
        vec![
            self.order_id.to_string(),
            self.login.clone(),
            // psql-style boolean, which is what the old console output showed
            if self.paid { "t" } else { "f" }.to_string(),
            self.timestamp_recieved.format(TIME_FORMAT).to_string(),
            self.total.to_string(),
        ]
    }
}

impl Tabular for ItemStatus {
    const HEADER: &'static [&'static str] =
        &["order_id", "item_name", "last_updated", "status", "comments"];

    fn row(&self) -> Vec<String> {
        vec![
            self.order_id.to_string(),
            self.item_name.clone(),
            self.last_updated.format(TIME_FORMAT).to_string(),
            self.status.clone(),
            self.comments.clone(),
        ]
    }
}

/// Owns the interactive input and output streams. Handlers take this instead
/// of touching stdin/stdout directly, so tests can drive them with a script.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Console {
            input: BufReader::new(io::stdin()),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Hands back the output sink, for tests that inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Prints `prompt` without a trailing newline and reads one input line.
    pub fn prompt(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input stream closed",
            ));
        }
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Reads an integer, re-prompting until one parses.
    pub fn read_i32(&mut self, prompt: &str) -> io::Result<i32> {
        loop {
            match self.prompt(prompt)?.trim().parse::<i32>() {
                Ok(n) => return Ok(n),
                Err(_) => self.line("Your input is invalid!")?,
            }
        }
    }

    pub fn read_choice(&mut self) -> io::Result<i32> {
        self.read_i32("Please make your choice: ")
    }

    /// Prints rows tab-separated under a header line and returns the row
    /// count. Empty result sets print nothing.
    pub fn print_table<T: Tabular>(&mut self, rows: &[T]) -> io::Result<usize> {
        if !rows.is_empty() {
            writeln!(self.output, "{}", T::HEADER.join("\t"))?;
        }
        for row in rows {
            writeln!(self.output, "{}", row.row().join("\t"))?;
        }
        Ok(rows.len())
    }
}

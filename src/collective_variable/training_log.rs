/// Default column width of a log row.
pub const DEFAULT_LOG_SPACING: usize = 16;

/// One value of a log row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogValue {
    Int(usize),
    Float(f64),
}

impl From<usize> for LogValue {
    fn from(value: usize) -> Self {
        LogValue::Int(value)
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        LogValue::Float(value)
    }
}

/// Fixed-width, left-aligned console log
///
/// The first call to `format_log` also returns a header line with the keys; later calls only
/// return the value row. Integers are printed as is, floats with `decimals` digits.
///
/// # Example
/// ```rust
/// use lda_colvar::collective_variable::{LogValue, TrainingLogger};
///
/// let mut logger = TrainingLogger::new();
/// let lines = logger.format_log(
///     &[("Epoch", LogValue::Int(1)), ("Train Loss", LogValue::Float(-1.5))],
///     Some(&[6, 12]),
///     2,
/// );
/// assert_eq!(lines, vec!["Epoch Train Loss  ", "1     -1.50       "]);
/// assert_eq!(logger.format_log(&[("Epoch", LogValue::Int(2))], Some(&[6]), 2).len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingLogger {
    header_printed: bool,
}

impl TrainingLogger {
    /// Creates a logger that will emit a header on first use.
    pub fn new() -> Self {
        TrainingLogger {
            header_printed: false,
        }
    }

    /// Whether the header has already been emitted.
    pub fn header_printed(&self) -> bool {
        self.header_printed
    }

    /// Emits the header again on the next call.
    pub fn reset_header(&mut self) {
        self.header_printed = false;
    }

    /// Formats one log entry
    ///
    /// # Parameters
    ///
    /// - `entries` - Ordered `(key, value)` pairs
    /// - `spacing` - Column widths; missing widths fall back to `DEFAULT_LOG_SPACING`
    /// - `decimals` - Digits after the decimal point for floats
    ///
    /// # Returns
    ///
    /// * `Vec<String>` - The header line (first call only) followed by the value row
    pub fn format_log(
        &mut self,
        entries: &[(&str, LogValue)],
        spacing: Option<&[usize]>,
        decimals: usize,
    ) -> Vec<String> {
        let width = |i: usize| {
            spacing
                .and_then(|s| s.get(i).copied())
                .unwrap_or(DEFAULT_LOG_SPACING)
        };

        let mut lines = Vec::with_capacity(2);
        if !self.header_printed {
            let header: String = entries
                .iter()
                .enumerate()
                .map(|(i, (key, _))| format!("{:<width$}", key, width = width(i)))
                .collect();
            lines.push(header);
            self.header_printed = true;
        }

        let row: String = entries
            .iter()
            .enumerate()
            .map(|(i, (_, value))| match value {
                LogValue::Int(v) => format!("{:<width$}", v, width = width(i)),
                LogValue::Float(v) => {
                    format!("{:<width$.prec$}", v, width = width(i), prec = decimals)
                }
            })
            .collect();
        lines.push(row);
        lines
    }

    /// Formats one log entry and prints it to stdout.
    pub fn print_log(
        &mut self,
        entries: &[(&str, LogValue)],
        spacing: Option<&[usize]>,
        decimals: usize,
    ) {
        for line in self.format_log(entries, spacing, decimals) {
            println!("{}", line);
        }
    }
}

use std::fmt::Display;

pub const ERROR_MESSAGE: &str = "Invalid data!";

/// One human-readable line per processed input record.
#[derive(Debug, Default, Clone)]
pub struct Report {
    lines: Vec<String>,
    failures: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure(&mut self) {
        self.failures += 1;
        self.lines.push(ERROR_MESSAGE.to_string());
    }

    pub fn client_imported(&mut self, name: &str) {
        self.lines.push(format!("Successfully imported client {}.", name));
    }

    pub fn invoice_imported(&mut self, number: impl Display) {
        self.lines
            .push(format!("Successfully imported invoice with number {}.", number));
    }

    pub fn product_imported(&mut self, name: &str, client_count: usize) {
        self.lines.push(format!(
            "Successfully imported product - {} with {} clients.",
            name, client_count
        ));
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn successes(&self) -> usize {
        self.lines.len() - self.failures
    }

    pub fn finish(self) -> String {
        self.lines.join("\n").trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_in_order() {
        let mut report = Report::new();
        report.client_imported("LiCB GmbH");
        report.failure();
        report.invoice_imported(1_427_940_691);
        report.product_imported("ADR plates", 2);

        assert_eq!(report.failures(), 1);
        assert_eq!(report.successes(), 3);
        assert_eq!(
            report.finish(),
            "Successfully imported client LiCB GmbH.\n\
             Invalid data!\n\
             Successfully imported invoice with number 1427940691.\n\
             Successfully imported product - ADR plates with 2 clients."
        );
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(Report::new().finish(), "");
    }
}

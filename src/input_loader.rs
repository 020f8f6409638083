use crate::error::InputError;
use log::info;
use std::io::{self, BufRead, Write};

/// What the operator is looking for in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRequest {
    pub title: String,
    pub area: String,
    pub target_count: usize,
    pub email_provider: String,
}

impl LeadRequest {
    pub fn search_query(&self) -> String {
        format!(
            "site:linkedin.com/in/ \"{}\" \"{}\" \"{}\"",
            self.title, self.area, self.email_provider
        )
    }
}

/// Parses a target count. Zero, negatives and non-numbers are rejected.
pub fn parse_target_count(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Prompter { reader, writer }
    }

    pub fn ask(&mut self, question: &str) -> Result<String, InputError> {
        write!(self.writer, "{}", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(InputError::Closed(question.trim().to_string()));
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, message: &str) -> Result<(), InputError> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }
}

pub fn stdin_prompter() -> Prompter<io::StdinLock<'static>, io::Stdout> {
    Prompter::new(io::stdin().lock(), io::stdout())
}

pub fn read_lead_request<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<LeadRequest, InputError> {
    let title = prompter.ask("Enter the title you're looking for (e.g. realtor): ")?;
    let area = prompter.ask("Enter the area or city (e.g. Phoenix): ")?;

    let target_count = loop {
        let raw = prompter.ask("How many contacts do you want to extract? ")?;
        match parse_target_count(&raw) {
            Some(n) => break n,
            None => prompter.say("Please enter a whole number greater than zero.")?,
        }
    };

    let email_provider = prompter.ask("Enter an email provider to search for (e.g. gmail.com): ")?;

    let request = LeadRequest {
        title,
        area,
        target_count,
        email_provider,
    };
    info!("Lead request: {:?}", request);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scripted(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn builds_site_restricted_query() {
        let request = LeadRequest {
            title: "real estate agent".into(),
            area: "Phoenix".into(),
            target_count: 10,
            email_provider: "gmail.com".into(),
        };
        assert_eq!(
            request.search_query(),
            r#"site:linkedin.com/in/ "real estate agent" "Phoenix" "gmail.com""#
        );
    }

    #[test]
    fn reads_answers_in_prompt_order() {
        let mut prompter = scripted("  realtor \nPhoenix\n25\ngmail.com\n");
        let request = read_lead_request(&mut prompter).unwrap();
        assert_eq!(request.title, "realtor");
        assert_eq!(request.area, "Phoenix");
        assert_eq!(request.target_count, 25);
        assert_eq!(request.email_provider, "gmail.com");
    }

    #[test]
    fn invalid_count_is_asked_again() {
        let mut prompter = scripted("realtor\nPhoenix\nten\n0\n7\nyahoo.com\n");
        let request = read_lead_request(&mut prompter).unwrap();
        assert_eq!(request.target_count, 7);

        let transcript = String::from_utf8(prompter.writer).unwrap();
        assert_eq!(transcript.matches("Please enter a whole number").count(), 2);
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut prompter = scripted("realtor\n");
        let err = read_lead_request(&mut prompter).unwrap_err();
        assert!(matches!(err, InputError::Closed(_)));
    }

    #[test]
    fn target_count_parsing() {
        assert_eq!(parse_target_count(" 12 "), Some(12));
        assert_eq!(parse_target_count("0"), None);
        assert_eq!(parse_target_count("-3"), None);
        assert_eq!(parse_target_count("abc"), None);
    }
}

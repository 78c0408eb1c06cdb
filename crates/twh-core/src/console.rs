//! Line-based interactive prompts.
//!
//! Every prompt is a read-validate-retry loop: the parser returns
//! `Error::Validation` to have its message printed and the question asked
//! again. End of input is reported as `Error::Cancelled`.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{errors::Error, Result};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print one status line.
    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }

    /// Free-text prompt. Blank input takes `default` when there is one.
    pub async fn text<T>(
        &mut self,
        message: &str,
        default: Option<&str>,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        let prompt = match default {
            Some(d) => format!("{message} ({d})"),
            None => message.to_string(),
        };

        loop {
            let mut answer = self.ask(&prompt).await?;
            if answer.trim().is_empty() {
                if let Some(d) = default {
                    answer = d.to_string();
                }
            }

            match parse(&answer) {
                Ok(v) => return Ok(v),
                Err(Error::Validation(msg)) => self.say(format!("  ✗ {msg}"))?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Numbered single choice. Re-asks until a listed number is entered.
    pub async fn select<T: Copy>(&mut self, message: &str, choices: &[(T, &str)]) -> Result<T> {
        self.say(format!("? {message}"))?;
        for (i, (_, label)) in choices.iter().enumerate() {
            self.say(format!("  {}) {label}", i + 1))?;
        }

        let prompt = format!("Choose [1-{}]:", choices.len());
        loop {
            let answer = self.ask(&prompt).await?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(choices[n - 1].0),
                _ => self.say(format!(
                    "  ✗ Please enter a number between 1 and {}",
                    choices.len()
                ))?,
            }
        }
    }

    pub async fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        let prompt = format!("{message} {hint}");

        loop {
            let answer = self.ask(&prompt).await?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("  ✗ Please answer y or n")?,
            }
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "? {prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(Error::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;

    fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new())
    }

    fn printed(c: &Console<&'static [u8], Vec<u8>>) -> String {
        String::from_utf8_lossy(c.output()).to_string()
    }

    #[tokio::test]
    async fn text_reprompts_until_valid() {
        let mut c = console("http://nope\nhttps://x.test/hook\n");
        let url = c
            .text("Enter webhook URL:", None, validate::webhook_url)
            .await
            .unwrap();
        assert_eq!(url, "https://x.test/hook");
        assert_eq!(printed(&c).matches("Please enter a valid HTTPS URL").count(), 1);
    }

    #[tokio::test]
    async fn text_uses_default_on_blank_input() {
        let mut c = console("\n");
        let name = c
            .text("Lambda function name:", Some("Processor"), |s| Ok(s.to_string()))
            .await
            .unwrap();
        assert_eq!(name, "Processor");
        assert!(printed(&c).contains("Lambda function name: (Processor)"));
    }

    #[tokio::test]
    async fn select_maps_number_to_choice() {
        let mut c = console("7\nx\n2\n");
        let picked = c
            .select("Pick", &[('a', "first"), ('b', "second")])
            .await
            .unwrap();
        assert_eq!(picked, 'b');
        let out = printed(&c);
        assert!(out.contains("  1) first"));
        assert_eq!(out.matches("between 1 and 2").count(), 2);
    }

    #[tokio::test]
    async fn confirm_defaults_and_answers() {
        let mut c = console("\nmaybe\nN\nyes\n");
        assert!(!c.confirm("Delete?", false).await.unwrap());
        assert!(!c.confirm("Again?", true).await.unwrap());
        assert!(c.confirm("Sure?", false).await.unwrap());
        let out = printed(&c);
        assert!(out.contains("Delete? (y/N)"));
        assert!(out.contains("Please answer y or n"));
    }

    #[tokio::test]
    async fn end_of_input_is_cancellation() {
        let mut c = console("");
        let err = c.confirm("Proceed?", true).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}

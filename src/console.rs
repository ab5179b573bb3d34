use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

/// Line-oriented user interaction used by every page.
pub trait Console {
    /// Prints `prompt` and reads one line without its line ending. `None` at
    /// end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn show(&mut self, text: &str) -> io::Result<()>;

    /// Blocking yes/no question; anything but an explicit yes declines.
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.read_line(&format!("{question} [y/N] "))?;
        Ok(answer.map(|a| is_yes(&a)).unwrap_or(false))
    }

    fn alert(&mut self, message: &str) -> io::Result<()> {
        self.show(&format!("(!) {message}"))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}

pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl TerminalConsole<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn show(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> TerminalConsole<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn reads_lines_until_eof() {
        let mut c = console("first\r\nsecond\n");
        assert_eq!(c.read_line("> ").unwrap().as_deref(), Some("first"));
        assert_eq!(c.read_line("> ").unwrap().as_deref(), Some("second"));
        assert_eq!(c.read_line("> ").unwrap(), None);
        assert_eq!(String::from_utf8(c.into_output()).unwrap(), "> > > ");
    }

    #[test]
    fn confirm_needs_explicit_yes() {
        let mut c = console("да\nn\n\n");
        assert!(c.confirm("ok?").unwrap());
        assert!(!c.confirm("ok?").unwrap());
        assert!(!c.confirm("ok?").unwrap());
        assert!(!c.confirm("ok?").unwrap());
    }

    #[test]
    fn alert_is_marked() {
        let mut c = console("");
        c.alert("Ошибка загрузки тестов").unwrap();
        assert_eq!(String::from_utf8(c.into_output()).unwrap(), "(!) Ошибка загрузки тестов\n");
    }
}

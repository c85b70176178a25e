//! Line-based operator prompts with back navigation
//!
//! Every prompt returns a [`Step`]: the answer, or `Cancelled` when the
//! operator typed `back` (or input ended). Callers walk back one question on
//! `Cancelled`.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

const BACK_WORDS: &[&str] = &["back", "b"];

/// Result of one navigation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    Continue(T),
    Cancelled,
}

impl<T> Step<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Self::Continue(v) => Step::Continue(f(v)),
            Self::Cancelled => Step::Cancelled,
        }
    }
}

pub struct Prompt<R> {
    lines: Lines<R>,
}

impl Prompt<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Free-form answer
    pub async fn input(&mut self, question: &str) -> anyhow::Result<Step<String>> {
        print!("{} ", question);
        std::io::stdout().flush()?;

        let Some(line) = self.lines.next_line().await? else {
            return Ok(Step::Cancelled);
        };
        let answer = line.trim();
        if BACK_WORDS.iter().any(|w| answer.eq_ignore_ascii_case(w)) {
            return Ok(Step::Cancelled);
        }
        Ok(Step::Continue(answer.to_string()))
    }

    /// Ask until `parse` accepts the answer
    pub async fn parsed<T>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> anyhow::Result<Step<T>> {
        loop {
            match self.input(question).await? {
                Step::Cancelled => return Ok(Step::Cancelled),
                Step::Continue(answer) => match parse(&answer) {
                    Ok(value) => return Ok(Step::Continue(value)),
                    Err(message) => println!("  {}", message),
                },
            }
        }
    }

    /// Pick one of `options`, answered by 1-based number
    pub async fn select<S: AsRef<str>>(
        &mut self,
        question: &str,
        options: &[S],
    ) -> anyhow::Result<Step<usize>> {
        println!("{}", question);
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {}", i + 1, option.as_ref());
        }

        let count = options.len();
        self.parsed(">", |answer| match answer.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
            _ => Err(format!("Enter a number between 1 and {}", count)),
        })
        .await
    }

    /// Yes/no question; anything but yes is no
    pub async fn confirm(&mut self, question: &str) -> anyhow::Result<Step<bool>> {
        Ok(self
            .input(&format!("{} [y/N]", question))
            .await?
            .map(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")))
    }
}

#[cfg(test)]
pub(crate) fn scripted(input: impl Into<String>) -> Prompt<std::io::Cursor<Vec<u8>>> {
    Prompt::new(std::io::Cursor::new(input.into().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_input_and_back() {
        let mut prompt = scripted("hello\nback\n");
        assert_eq!(prompt.input("?").await.unwrap(), Step::Continue("hello".to_string()));
        assert_eq!(prompt.input("?").await.unwrap(), Step::Cancelled);
        // end of input
        assert_eq!(prompt.input("?").await.unwrap(), Step::Cancelled);
    }

    #[tokio::test]
    async fn test_parsed_retries_until_valid() {
        let mut prompt = scripted("abc\n-3\n7\n");
        let step = prompt
            .parsed("days?", |a| match a.parse::<i64>() {
                Ok(d) if d > 0 => Ok(d),
                _ => Err("positive integer".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(step, Step::Continue(7));
    }

    #[tokio::test]
    async fn test_select_is_one_based() {
        let mut prompt = scripted("0\n4\n2\n");
        let step = prompt.select("pick", &["a", "b", "c"][..]).await.unwrap();
        assert_eq!(step, Step::Continue(1));
    }

    #[tokio::test]
    async fn test_confirm() {
        let mut prompt = scripted("Y\n\nno\n");
        assert_eq!(prompt.confirm("ok?").await.unwrap(), Step::Continue(true));
        assert_eq!(prompt.confirm("ok?").await.unwrap(), Step::Continue(false));
        assert_eq!(prompt.confirm("ok?").await.unwrap(), Step::Continue(false));
    }
}

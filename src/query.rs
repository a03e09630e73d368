//! Query acquisition.
//!
//! Keywords come from a [`KeywordSource`]: either the interactive
//! [`KeywordPrompt`] or a fixed list (flags, tests). [`Query`] normalizes
//! whatever arrives: entries are trimmed, blanks dropped, and at most
//! [`MAX_KEYWORDS`] are kept. An empty query means "skip collection".

use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// Upper bound on keywords per run.
pub const MAX_KEYWORDS: usize = 4;

/// Normalized search terms for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    keywords: Vec<String>,
}

impl Query {
    /// Build from any list of raw entries.
    pub fn from_keywords<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = raw
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .take(MAX_KEYWORDS)
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Space-joined form, `None` when there is nothing to search for.
    pub fn joined(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.keywords.join(" "))
        }
    }
}

/// Anything that can hand the pipeline its raw keywords.
pub trait KeywordSource {
    fn read_keywords(&mut self) -> Vec<String>;
}

/// Keywords fixed up front.
#[derive(Debug, Clone, Default)]
pub struct FixedKeywords(pub Vec<String>);

impl KeywordSource for FixedKeywords {
    fn read_keywords(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }
}

/// Line-oriented prompt asking for up to [`MAX_KEYWORDS`] words.
///
/// Pressing enter on an empty line skips that slot; end of input stops early.
pub struct KeywordPrompt<R, W> {
    input: R,
    output: W,
}

impl KeywordPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> KeywordPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> KeywordSource for KeywordPrompt<R, W> {
    fn read_keywords(&mut self) -> Vec<String> {
        let _ = writeln!(
            self.output,
            "\nEnter up to {MAX_KEYWORDS} words to search for SAR news articles. Press enter to skip."
        );
        let mut keywords = Vec::new();
        for slot in 1..=MAX_KEYWORDS {
            let _ = write!(self.output, "Word {slot}: ");
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    let word = line.trim();
                    if !word.is_empty() {
                        keywords.push(word.to_string());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed reading keyword; stopping prompt");
                    break;
                }
            }
        }
        debug!(?keywords, "Keywords entered");
        keywords
    }
}

/// Pull keywords from `source` and normalize them.
pub fn acquire(source: &mut impl KeywordSource) -> Query {
    Query::from_keywords(source.read_keywords())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_trims_and_drops_blank_entries() {
        let query = Query::from_keywords(["  flood ", "", "   ", "rescue"]);
        assert_eq!(query.keywords(), ["flood", "rescue"]);
        assert_eq!(query.joined().as_deref(), Some("flood rescue"));
    }

    #[test]
    fn test_caps_keyword_count() {
        let query = Query::from_keywords(["a", "b", "c", "d", "e", "f"]);
        assert_eq!(query.keywords().len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_empty_query_has_no_joined_form() {
        let query = Query::from_keywords(Vec::<String>::new());
        assert!(query.is_empty());
        assert_eq!(query.joined(), None);
        assert!(Query::from_keywords(["   ", "\t"]).is_empty());
    }

    #[test]
    fn test_prompt_reads_injected_lines() {
        let input = Cursor::new("wildfire\n\n  evacuation  \n");
        let mut output = Vec::new();
        let mut prompt = KeywordPrompt::new(input, &mut output);

        let query = acquire(&mut prompt);
        assert_eq!(query.keywords(), ["wildfire", "evacuation"]);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Word 1: "));
        assert!(shown.contains("Word 4: "));
    }

    #[test]
    fn test_prompt_stops_at_end_of_input() {
        let mut prompt = KeywordPrompt::new(Cursor::new(""), Vec::new());
        assert!(acquire(&mut prompt).is_empty());
    }

    #[test]
    fn test_fixed_keywords() {
        let mut fixed = FixedKeywords(vec!["avalanche".to_string()]);
        assert_eq!(acquire(&mut fixed).keywords(), ["avalanche"]);
    }
}

//! Command-line handling
//!
//! Suite files declare commands as a single shell-style string. The string
//! is split into tokens once at collection time; path resolution then
//! rewrites the executable token and the values of recognized path-bearing
//! flags against the base directory.

use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};

/// Path-bearing flags recognized when none are declared in the suite
pub const DEFAULT_PATH_FLAGS: &[&str] = &["-m", "-i", "-p"];

/// An ordered sequence of command-line tokens, program first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    /// Parse a shell-style command string into tokens
    ///
    /// Handles single and double quotes so arguments may contain spaces.
    /// An empty command or an unbalanced quote is a configuration error.
    pub fn parse(raw: &str) -> Result<Self> {
        let tokens = split_tokens(raw)?;
        if tokens.is_empty() {
            return Err(Error::Config("Empty command".to_string()));
        }
        Ok(Self { tokens })
    }

    /// The executable token
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Program and argument slices, ready for process spawning
    pub fn argv(&self) -> (&str, &[String]) {
        (&self.tokens[0], &self.tokens[1..])
    }

    /// All tokens in order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Rewrite relative path tokens against a base directory
    ///
    /// Produces a new CommandSpec where the executable token and every
    /// token following a recognized path flag are rooted at `base`.
    /// Already-absolute tokens are left alone, so resolving twice is a
    /// no-op. A recognized flag in the final position has no value to
    /// rewrite and passes through unchanged.
    pub fn resolve(&self, base: &Path, path_flags: &[String]) -> CommandSpec {
        let mut tokens = self.tokens.clone();

        if let Some(program) = tokens.first_mut() {
            *program = rebase(base, program);
        }

        let mut i = 1;
        while i + 1 < tokens.len() {
            if path_flags.iter().any(|flag| flag == &tokens[i]) {
                tokens[i + 1] = rebase(base, &tokens[i + 1]);
                i += 2;
            } else {
                i += 1;
            }
        }

        CommandSpec { tokens }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Root a single token at the base directory, unless already absolute
fn rebase(base: &Path, token: &str) -> String {
    let path = Path::new(token);
    if path.is_absolute() {
        token.to_string()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}

/// Split a command string into tokens, honoring quotes
fn split_tokens(raw: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in raw.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(Error::Config(format!("Unbalanced quote in command '{raw}'")));
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

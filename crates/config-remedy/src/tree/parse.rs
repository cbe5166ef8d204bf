//! Indentation-based configuration parsing

use super::node::{ConfigTree, NodeId, ROOT};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

impl ConfigTree {
    /// Parse configuration text into this tree.
    ///
    /// Each non-empty line attaches to the closest open line with strictly
    /// smaller indentation. Bare `!` separators are skipped; `! text` lines
    /// and trailing ` ! text` fragments attach as comments to the preceding
    /// node.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] when an indented line has no parent to attach
    /// to, or when a comment precedes any configuration line.
    pub fn load_from_string(&mut self, text: &str) -> Result<()> {
        let host = Arc::clone(&self.host);
        let mut text = text.to_string();
        for sub in &host.options.full_text_sub {
            text = sub.apply(&text);
        }

        // open sections: (indent, node), innermost last
        let mut stack: Vec<(usize, NodeId)> = Vec::new();
        let mut last: Option<NodeId> = None;
        let mut parsed = 0usize;

        for (offset, raw) in text.lines().enumerate() {
            let line_number = offset + 1;
            let mut line = raw.trim_end().to_string();
            for sub in &host.options.per_line_sub {
                line = sub.apply(&line);
            }
            let stripped = line.trim_start();
            if stripped.is_empty() {
                continue;
            }

            if let Some(comment) = stripped.strip_prefix('!') {
                let comment = comment.trim();
                if comment.is_empty() {
                    continue;
                }
                let Some(node) = last else {
                    return Err(Error::Parse {
                        line: line_number,
                        reason: "comment precedes any configuration line".to_string(),
                    });
                };
                self.add_comment(node, comment);
                continue;
            }

            let indent = line.len() - stripped.len();
            let (content, comments) = split_trailing_comment(stripped);

            while let Some(&(open_indent, _)) = stack.last() {
                if open_indent >= indent {
                    stack.pop();
                } else {
                    break;
                }
            }
            let parent = match stack.last() {
                Some(&(_, id)) => id,
                None if indent == 0 => ROOT,
                None => {
                    return Err(Error::Parse {
                        line: line_number,
                        reason: "indented line has no parent section".to_string(),
                    });
                }
            };

            let node = self.add_child(parent, content);
            for comment in comments {
                self.add_comment(node, comment);
            }
            stack.push((indent, node));
            last = Some(node);
            parsed += 1;
        }

        debug!(lines = parsed, "parsed configuration text");
        Ok(())
    }

    /// Read a file and parse it into this tree.
    ///
    /// # Errors
    /// Returns [`Error::Io`] when reading fails and [`Error::Parse`] for
    /// malformed content.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.load_from_string(&text)
    }
}

/// Split `text ! c1, c2` into the content and its comment list.
fn split_trailing_comment(line: &str) -> (&str, Vec<&str>) {
    match line.split_once(" ! ") {
        Some((content, rest)) => {
            let comments = rest
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect();
            (content.trim_end(), comments)
        }
        None => (line, Vec::new()),
    }
}

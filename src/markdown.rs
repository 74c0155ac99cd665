//! Markdown rendering for chat bubbles in the terminal
//!
//! Handles the subset of markdown chat replies actually use: headings,
//! emphasis, inline and fenced code, lists, block quotes, links and rules.
//! Styled output uses ANSI colors via `colored`; plain output strips the
//! markup so text can be piped or logged.

use colored::Colorize;
use regex::{Captures, Regex};
use std::sync::OnceLock;

const RULE_WIDTH: usize = 40;

fn inline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"`(?P<code>[^`]+)`",
            r"|\*\*(?P<bold>.+?)\*\*",
            r"|__(?P<bold_alt>.+?)__",
            r"|\*(?P<em>[^*\s][^*]*)\*",
            r"|\b_(?P<em_alt>[^_]+)_\b",
            r"|\[(?P<text>[^\]]+)\]\((?P<url>[^)\s]+)\)",
        ))
        .expect("inline markdown pattern is valid")
    })
}

/// Renders markdown message content for terminal display
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    styled: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::styled()
    }
}

impl MarkdownRenderer {
    /// Renderer emitting ANSI styling
    pub fn styled() -> Self {
        Self { styled: true }
    }

    /// Renderer emitting plain text with markup removed
    pub fn plain() -> Self {
        Self { styled: false }
    }

    /// Render a whole message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatlens::markdown::MarkdownRenderer;
    ///
    /// let text = MarkdownRenderer::plain().render("# Title\n\n- **one**\n- `two`");
    /// assert_eq!(text, "Title\n\n• one\n• two");
    /// ```
    pub fn render(&self, content: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut in_code_block = false;

        for line in content.lines() {
            let trimmed = line.trim_start();

            if trimmed.starts_with("```") {
                in_code_block = !in_code_block;
                continue;
            }

            if in_code_block {
                out.push(self.code_line(line));
                continue;
            }

            out.push(self.block_line(line, trimmed));
        }

        out.join("\n")
    }

    fn code_line(&self, line: &str) -> String {
        if self.styled {
            format!("    {}", line.dimmed())
        } else {
            format!("    {}", line)
        }
    }

    fn block_line(&self, line: &str, trimmed: &str) -> String {
        let indent = &line[..line.len() - trimmed.len()];

        if let Some((level, text)) = heading(trimmed) {
            let text = self.inline(text);
            return match (self.styled, level) {
                (false, _) => text,
                (true, 1) => text.bold().underline().to_string(),
                (true, _) => text.bold().to_string(),
            };
        }

        if is_rule(trimmed) {
            let rule = "─".repeat(RULE_WIDTH);
            return if self.styled {
                rule.dimmed().to_string()
            } else {
                rule
            };
        }

        if let Some(quoted) = trimmed.strip_prefix('>') {
            let text = self.inline(quoted.trim_start());
            return if self.styled {
                format!("{} {}", "│".dimmed(), text.italic())
            } else {
                format!("│ {}", text)
            };
        }

        if let Some(item) = ["- ", "* ", "+ "]
            .iter()
            .find_map(|marker| trimmed.strip_prefix(marker))
        {
            return format!("{}• {}", indent, self.inline(item));
        }

        if let Some((number, item)) = numbered_item(trimmed) {
            return format!("{}{}. {}", indent, number, self.inline(item));
        }

        self.inline(line)
    }

    /// Render inline spans within one line
    pub fn inline(&self, text: &str) -> String {
        inline_pattern()
            .replace_all(text, |caps: &Captures<'_>| self.span(caps))
            .into_owned()
    }

    fn span(&self, caps: &Captures<'_>) -> String {
        let styled = self.styled;
        if let Some(code) = caps.name("code") {
            return if styled {
                code.as_str().cyan().to_string()
            } else {
                code.as_str().to_string()
            };
        }
        if let Some(bold) = caps.name("bold").or_else(|| caps.name("bold_alt")) {
            return if styled {
                bold.as_str().bold().to_string()
            } else {
                bold.as_str().to_string()
            };
        }
        if let Some(em) = caps.name("em").or_else(|| caps.name("em_alt")) {
            return if styled {
                em.as_str().italic().to_string()
            } else {
                em.as_str().to_string()
            };
        }
        match (caps.name("text"), caps.name("url")) {
            (Some(text), Some(url)) if styled => {
                format!("{} ({})", text.as_str().underline(), url.as_str().blue())
            }
            (Some(text), Some(url)) => format!("{} ({})", text.as_str(), url.as_str()),
            _ => caps[0].to_string(),
        }
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    line[level..].strip_prefix(' ').map(|text| (level, text.trim()))
}

fn is_rule(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|marker| line.chars().all(|c| c == *marker))
}

fn numbered_item(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..]
        .strip_prefix(". ")
        .map(|item| (&line[..digits], item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> String {
        MarkdownRenderer::plain().render(text)
    }

    #[test]
    fn test_headings_lose_markers() {
        assert_eq!(plain("# Big"), "Big");
        assert_eq!(plain("### Small  "), "Small");
        assert_eq!(plain("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_inline_emphasis_and_code() {
        assert_eq!(
            plain("Use **bold**, *italic*, _also italic_ and `code`."),
            "Use bold, italic, also italic and code."
        );
    }

    #[test]
    fn test_snake_case_is_not_italic() {
        assert_eq!(plain("call my_fn_name now"), "call my_fn_name now");
    }

    #[test]
    fn test_links_show_target() {
        assert_eq!(
            plain("See [the docs](https://example.com)."),
            "See the docs (https://example.com)."
        );
    }

    #[test]
    fn test_lists_and_quotes() {
        let text = "- apples\n  * pears\n3. third\n> wise words";
        assert_eq!(plain(text), "• apples\n  • pears\n3. third\n│ wise words");
    }

    #[test]
    fn test_code_block_is_verbatim() {
        let text = "Example:\n```rust\nlet x = **not bold**;\n```\nDone";
        assert_eq!(plain(text), "Example:\n    let x = **not bold**;\nDone");
    }

    #[test]
    fn test_unclosed_code_block_runs_to_end() {
        assert_eq!(plain("```\na\nb"), "    a\n    b");
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(plain("---"), "─".repeat(RULE_WIDTH));
        assert_eq!(plain("***"), "─".repeat(RULE_WIDTH));
    }

    #[test]
    fn test_styled_keeps_text() {
        let rendered = MarkdownRenderer::styled().render("**hello** `world`");
        assert!(rendered.contains("hello"));
        assert!(rendered.contains("world"));
        assert!(!rendered.contains("**"));
    }
}

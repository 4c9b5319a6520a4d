//! JSON syntax highlighting for the structured result viewer.

use ratatui::text::{Line, Span};

use crate::ui::theme::roles::Theme;

/// Builds syntax-highlighted lines from an already pretty-printed JSON string.
pub fn highlight_pretty_json_lines<'value>(formatted_json: &'value str, theme: &dyn Theme) -> Vec<Line<'value>> {
    formatted_json
        .lines()
        .map(|line| Line::from(highlight_json_line(line, theme)))
        .collect()
}

fn highlight_json_line<'line>(line: &'line str, theme: &dyn Theme) -> Vec<Span<'line>> {
    let mut spans = Vec::new();
    let mut index = 0usize;
    // A string followed by ':' is an object key.
    while index < line.len() {
        let remaining = &line[index..];
        let Some(character) = remaining.chars().next() else {
            break;
        };
        let character_length = character.len_utf8();
        if character.is_whitespace() {
            let whitespace_end = remaining
                .find(|candidate: char| !candidate.is_whitespace())
                .unwrap_or(remaining.len());
            spans.push(Span::raw(&remaining[..whitespace_end]));
            index += whitespace_end;
            continue;
        }
        if character == '"' {
            let (token, consumed_length) = parse_json_string_token(remaining);
            let style = if remaining[consumed_length..].trim_start().starts_with(':') {
                theme.syntax_keyword_style()
            } else {
                theme.syntax_string_style()
            };
            spans.push(Span::styled(token, style));
            index += consumed_length;
            continue;
        }
        if is_punctuation(character) {
            spans.push(Span::styled(&remaining[..character_length], theme.syntax_punctuation_style()));
            index += character_length;
            continue;
        }
        if let Some(keyword) = ["true", "false", "null"]
            .into_iter()
            .find(|keyword| starts_with_json_keyword(remaining, keyword))
        {
            spans.push(Span::styled(&remaining[..keyword.len()], theme.syntax_number_style()));
            index += keyword.len();
            continue;
        }
        if character == '-' || character.is_ascii_digit() {
            let number_length = parse_json_number_length(remaining);
            if number_length > 0 {
                spans.push(Span::styled(&remaining[..number_length], theme.syntax_number_style()));
                index += number_length;
                continue;
            }
        }

        spans.push(Span::styled(&remaining[..character_length], theme.text_primary_style()));
        index += character_length;
    }
    spans
}

fn is_punctuation(character: char) -> bool {
    matches!(character, '{' | '}' | '[' | ']' | ':' | ',')
}

fn parse_json_string_token(input: &str) -> (&str, usize) {
    let bytes = input.as_bytes();
    let mut index = 1usize;
    let mut escaped = false;
    while index < bytes.len() {
        let byte = bytes[index];
        if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == b'"' {
            return (&input[..=index], index + 1);
        }
        index += 1;
    }
    (input, input.len())
}

fn parse_json_number_length(input: &str) -> usize {
    input
        .chars()
        .take_while(|character| character.is_ascii_digit() || matches!(character, '-' | '+' | '.' | 'e' | 'E'))
        .map(char::len_utf8)
        .sum()
}

fn starts_with_json_keyword(input: &str, keyword: &str) -> bool {
    input.strip_prefix(keyword).is_some_and(|rest| {
        rest.chars()
            .next()
            .is_none_or(|character| !character.is_ascii_alphanumeric() && character != '_')
    })
}

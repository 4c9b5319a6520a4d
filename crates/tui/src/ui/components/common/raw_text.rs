//! Raw response bodies with their URLs highlighted.

use ratatui::text::{Line, Span};
use senpy_util::split_urls;

use crate::ui::theme::roles::Theme;

/// One line per body line; URL segments use the theme's link style.
pub fn highlight_url_lines<'body>(body: &'body str, theme: &dyn Theme) -> Vec<Line<'body>> {
    body.lines()
        .map(|line| {
            let spans: Vec<Span> = split_urls(line)
                .into_iter()
                .map(|(segment, is_url)| {
                    let style = if is_url { theme.link_style() } else { theme.text_primary_style() };
                    Span::styled(segment, style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::DraculaTheme;

    #[test]
    fn urls_inside_turtle_are_links() {
        let theme = DraculaTheme::new();
        let body = "<http://example.org/e1> a <http://www.gsi.upm.es/ontologies/marl/ns#Opinion> .\nplain";
        let lines = highlight_url_lines(body, &theme);
        assert_eq!(lines.len(), 2);
        let links: Vec<&str> = lines[0]
            .spans
            .iter()
            .filter(|span| span.style == theme.link_style())
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(links, vec!["http://example.org/e1", "http://www.gsi.upm.es/ontologies/marl/ns#Opinion"]);
        assert_eq!(lines[1].spans[0].style, theme.text_primary_style());
    }
}

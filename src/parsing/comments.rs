//! Associates declared members with documentation comments
//!
//! A comment documents a member when it starts on the member's declaration
//! line, or failing that on the line directly above it. When several
//! comments start on the same line the first one wins.

use super::syntax::Comment;

/// Find the comment documenting a declaration on `declaration_line`.
///
/// Comments on the same line take precedence over the line above.
pub fn find_documentation(comments: &[Comment], declaration_line: u32) -> Option<&Comment> {
    let on_line = |line: u32| comments.iter().find(|comment| comment.line() == line);

    on_line(declaration_line).or_else(|| {
        declaration_line
            .checked_sub(1)
            .filter(|line| *line > 0)
            .and_then(on_line)
    })
}

/// Documentation text for a member, falling back to its bare name
pub fn documentation_for(comments: &[Comment], declaration_line: u32, name: &str) -> String {
    find_documentation(comments, declaration_line)
        .map(clean_comment_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| name.to_string())
}

/// Strip surrounding whitespace and JSDoc `*` gutters from a comment body
pub fn clean_comment_text(comment: &Comment) -> String {
    if !comment.is_block {
        return comment.text.trim().to_string();
    }

    comment
        .text
        .trim_start_matches('*')
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

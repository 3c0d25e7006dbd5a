//! Discussion-thread rendering as a nested blockquote tree.

use crate::listing::DiscussionNode;

/// Renders `nodes` starting at `depth`, one `>` per level of nesting.
///
/// A comment renders as a `u/<author>:` header followed by its body, every
/// line carrying the quote prefix. A [`DiscussionNode::More`] marker renders
/// as a `[more comments]` placeholder at its depth.
#[must_use]
pub fn render_thread(nodes: &[DiscussionNode], depth: usize) -> String {
    let mut out = String::new();
    render_into(nodes, depth, &mut out);
    out
}

fn render_into(nodes: &[DiscussionNode], depth: usize, out: &mut String) {
    let prefix = ">".repeat(depth);
    let lead = if depth == 0 { String::new() } else { format!("{prefix} ") };

    for node in nodes {
        match node {
            DiscussionNode::More => {
                out.push_str(&lead);
                out.push_str("[more comments]\n\n");
            }
            DiscussionNode::Comment {
                author,
                body,
                replies,
            } => {
                let author = author.as_deref().unwrap_or("[deleted]");
                out.push_str(&format!("{lead}u/{author}:\n"));
                for line in body.split('\n') {
                    out.push_str(&lead);
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
                render_into(replies, depth + 1, out);
            }
        }
    }
}

//! Discussion thread tree decoded from the comment listing.

use serde_json::Value;

/// One node of a discussion thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscussionNode {
    /// A comment with its nested replies.
    Comment {
        author: Option<String>,
        body: String,
        replies: Vec<DiscussionNode>,
    },
    /// Marker for replies the API did not inline.
    More,
}

impl DiscussionNode {
    /// Decodes the children of a comment listing (`{"data": {"children": [...]}}`).
    ///
    /// Unknown node kinds and malformed entries are dropped rather than failing
    /// the whole thread.
    #[must_use]
    pub fn from_listing(listing: &Value) -> Vec<Self> {
        let Some(children) = listing
            .get("data")
            .and_then(|d| d.get("children"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };
        children.iter().filter_map(Self::from_thing).collect()
    }

    fn from_thing(thing: &Value) -> Option<Self> {
        match thing.get("kind").and_then(Value::as_str)? {
            "more" => Some(Self::More),
            "t1" => {
                let data = thing.get("data")?;
                let author = data
                    .get("author")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let body = data
                    .get("body")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                // `replies` is an empty string when there are none.
                let replies = data
                    .get("replies")
                    .map(Self::from_listing)
                    .unwrap_or_default();
                Some(Self::Comment {
                    author,
                    body,
                    replies,
                })
            }
            _ => None,
        }
    }

    /// Total number of comment nodes in this subtree, markers excluded.
    #[must_use]
    pub fn comment_count(nodes: &[Self]) -> usize {
        nodes
            .iter()
            .map(|node| match node {
                Self::Comment { replies, .. } => 1 + Self::comment_count(replies),
                Self::More => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_listing_nested_replies_and_more_marker() {
        let listing = serde_json::json!({
            "kind": "Listing",
            "data": {"children": [
                {"kind": "t1", "data": {
                    "author": "alice",
                    "body": "top",
                    "replies": {"kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {"author": "bob", "body": "reply", "replies": ""}},
                        {"kind": "more", "data": {"count": 4}}
                    ]}}
                }},
                {"kind": "t1", "data": {"author": null, "body": "orphan", "replies": ""}}
            ]}
        });

        let nodes = DiscussionNode::from_listing(&listing);
        assert_eq!(nodes.len(), 2);
        let DiscussionNode::Comment { author, replies, .. } = &nodes[0] else {
            panic!("expected a comment node");
        };
        assert_eq!(author.as_deref(), Some("alice"));
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1], DiscussionNode::More);
        assert_eq!(DiscussionNode::comment_count(&nodes), 3);
    }

    #[test]
    fn test_from_listing_tolerates_garbage() {
        assert!(DiscussionNode::from_listing(&serde_json::json!(null)).is_empty());
        assert!(DiscussionNode::from_listing(&serde_json::json!({"data": {}})).is_empty());
        let odd = serde_json::json!({"data": {"children": [{"kind": "t3"}, {"nokind": 1}]}});
        assert!(DiscussionNode::from_listing(&odd).is_empty());
    }
}

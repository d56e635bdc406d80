//! Inline reference markup in advisor replies.
//!
//! The model recommends wardrobe items by embedding `[[item-id]]`
//! tokens in free text. The grammar is small on purpose: `[[` opens a
//! reference, the id runs to the first following `]]`, brackets do not
//! nest, and matching proceeds left to right. Ids the catalog does not
//! know are dropped silently: the model can hallucinate, and the UI
//! must degrade rather than crash.

use serde::Serialize;

use crate::catalog::{Catalog, ClothingItem};

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Raw lexical token, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Reference(&'a str),
}

/// Split free text into plain runs and reference tokens.
///
/// An opener without a matching `]]` is treated as plain text to the
/// end of input.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(open) = rest.find(OPEN) else {
            tokens.push(Token::Text(rest));
            break;
        };

        let body = &rest[open + OPEN.len()..];
        let Some(len) = body.find(CLOSE) else {
            tokens.push(Token::Text(rest));
            break;
        };

        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }
        tokens.push(Token::Reference(&body[..len]));
        rest = &body[len + CLOSE.len()..];
    }

    tokens
}

/// A renderable piece of an advisor reply: a plain text span, or a
/// resolved wardrobe item the UI shows as a card with a try-on action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Item { item: ClothingItem },
}

/// Resolve a reply against the full catalog (custom items included).
/// Unresolved references produce no segment.
pub fn resolve(text: &str, catalog: &Catalog) -> Vec<Segment> {
    tokenize(text)
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(t) => Some(Segment::Text {
                text: t.to_string(),
            }),
            Token::Reference(id) => catalog.find(id).map(|item| Segment::Item {
                item: item.clone(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_single_token() {
        assert_eq!(tokenize("没有推荐"), vec![Token::Text("没有推荐")]);
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_reference_tokens_are_extracted_in_order() {
        assert_eq!(
            tokenize("试试 [[c1]] 或 [[f2]]"),
            vec![
                Token::Text("试试 "),
                Token::Reference("c1"),
                Token::Text(" 或 "),
                Token::Reference("f2"),
            ]
        );
    }

    #[test]
    fn test_reference_at_start_and_end() {
        assert_eq!(
            tokenize("[[c1]]不错[[f2]]"),
            vec![
                Token::Reference("c1"),
                Token::Text("不错"),
                Token::Reference("f2"),
            ]
        );
    }

    #[test]
    fn test_adjacent_references() {
        assert_eq!(
            tokenize("[[c1]][[c2]]"),
            vec![Token::Reference("c1"), Token::Reference("c2")]
        );
    }

    #[test]
    fn test_unterminated_opener_is_plain_text() {
        assert_eq!(tokenize("看看 [[c1"), vec![Token::Text("看看 [[c1")]);
    }

    #[test]
    fn test_empty_reference_id() {
        assert_eq!(
            tokenize("[[]]后面"),
            vec![Token::Reference(""), Token::Text("后面")]
        );
    }

    #[test]
    fn test_matching_is_non_greedy() {
        // The first `]]` closes the reference even if more brackets follow.
        assert_eq!(
            tokenize("[[a]]b]]"),
            vec![Token::Reference("a"), Token::Text("b]]")]
        );
    }

    #[test]
    fn test_resolve_plain_text_round_trips() {
        let catalog = Catalog::default();
        let segments = resolve("今天穿什么好呢？", &catalog);
        assert_eq!(
            segments,
            vec![Segment::Text {
                text: "今天穿什么好呢？".to_string()
            }]
        );
    }

    #[test]
    fn test_resolve_known_and_unknown_references() {
        let catalog = Catalog::default();
        let segments = resolve("推荐 [[c1]] 和 [[zzz]] 给你", &catalog);

        assert_eq!(segments.len(), 4);
        assert_eq!(
            segments[0],
            Segment::Text {
                text: "推荐 ".to_string()
            }
        );
        match &segments[1] {
            Segment::Item { item } => assert_eq!(item.id, "c1"),
            other => panic!("expected item segment, got {other:?}"),
        }
        assert_eq!(
            segments[2],
            Segment::Text {
                text: " 和 ".to_string()
            }
        );
        // [[zzz]] resolves to nothing; the trailing text follows directly.
        assert_eq!(
            segments[3],
            Segment::Text {
                text: " 给你".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_finds_custom_items() {
        use base64::Engine;
        let mut catalog = Catalog::default();
        let body = base64::engine::general_purpose::STANDARD.encode(b"img");
        let item = catalog
            .add_custom("上传款", &format!("data:image/jpeg;base64,{body}"))
            .unwrap();

        let segments = resolve(&format!("[[{}]]", item.id), &catalog);
        assert_eq!(segments.len(), 1);
        match &segments[0] {
            Segment::Item { item: resolved } => assert_eq!(resolved.id, item.id),
            other => panic!("expected item segment, got {other:?}"),
        }
    }

    #[test]
    fn test_segment_serialization_is_tagged() {
        let segment = Segment::Text {
            text: "你好".to_string(),
        };
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["kind"], "text");
        assert_eq!(value["text"], "你好");
    }
}

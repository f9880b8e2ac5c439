//! Cross-reference scanning of classifier labels and table captions.
//!
//! Procedure specs (`A-12`, `A$1.2`), diagnosis specs (`D-38`, `D$2.5`),
//! GHM roots (`05C02`, `05C021`) and `noeud N` mentions become link segments;
//! everything else stays plain text.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Procedure,
    Diagnosis,
    GhmRoot,
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkToken {
    pub kind: LinkKind,
    pub id: String,
}

/// Piece of a label: plain text, or a link with the text it was matched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Text(String),
    Link {
        kind: LinkKind,
        id: String,
        text: String,
    },
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Segment::Text(value.into())
    }

    pub fn link(token: LinkToken, text: impl Into<String>) -> Self {
        Segment::Link {
            kind: token.kind,
            id: token.id,
            text: text.into(),
        }
    }

    /// Text as it appeared in the source string.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Link { text, .. } => text,
        }
    }

    pub fn token(&self) -> Option<LinkToken> {
        match self {
            Segment::Text(_) => None,
            Segment::Link { kind, id, .. } => Some(LinkToken {
                kind: *kind,
                id: id.clone(),
            }),
        }
    }
}

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[AD](?:-[0-9]+|\$[0-9]+\.[0-9]+)|[0-9]{2}[CMZK][0-9]{2}[ZJT0-9A-E]?|noeud [0-9]+")
            .expect("static cross-reference pattern")
    })
}

fn classify(matched: &str) -> LinkToken {
    let (kind, id) = match matched.as_bytes()[0] {
        b'A' => (LinkKind::Procedure, matched),
        b'D' => (LinkKind::Diagnosis, matched),
        b'n' => (LinkKind::Node, &matched["noeud ".len()..]),
        _ => (LinkKind::GhmRoot, &matched[..5]),
    };
    LinkToken {
        kind,
        id: id.to_string(),
    }
}

/// Split `text` into plain and link segments in a single left-to-right pass.
///
/// Concatenating the segments' text reproduces `text` exactly. Empty plain
/// pieces are not emitted.
pub fn scan(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in reference_regex().find_iter(text) {
        if m.start() > last {
            segments.push(Segment::text(&text[last..m.start()]));
        }
        segments.push(Segment::link(classify(m.as_str()), m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::text(&text[last..]));
    }
    segments
}

/// Concatenated source text of a segment list.
pub fn segments_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::as_str).collect()
}

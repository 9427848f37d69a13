//! Shared study data for the scenario tests.

use tracing_subscriber::EnvFilter;

use crate::{Annotation, AnnotationId, Document, DocumentBuilder, TextRange, TypeAdapter};

pub const TEXT: &str =
    "The quick brown fox jumps over the lazy dog while the small cat sleeps near the warm fire and the old owl watches them quietly .";

pub const TAGS: [&str; 26] = [
    "DT", "JJ", "JJ", "NN", "VBZ", "IN", "DT", "JJ", "NN", "IN", "DT", "JJ", "NN", "VBZ", "IN",
    "DT", "JJ", "NN", "CC", "DT", "JJ", "NN", "VBZ", "PRP", "RB", "PUNCT",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("layered_diff=warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn pos_adapter() -> TypeAdapter {
    TypeAdapter::span("POS", ["PosValue"])
}

pub fn dependency_adapter() -> TypeAdapter {
    TypeAdapter::arc("Dependency", "Governor", "Dependent", ["DependencyType"])
}

fn range_of(builder: &DocumentBuilder, id: AnnotationId) -> TextRange {
    builder
        .annotation(id)
        .and_then(Annotation::range)
        .expect("token has a range")
}

/// Each token of `TEXT` tagged with the matching entry of `tags`.
pub fn tagged(tags: &[&str]) -> Document {
    study(tags, None)
}

/// Tagged tokens plus one dependency per token. `governors[i]` is the token
/// index governing token `i`.
pub fn study(tags: &[&str], governors: Option<&[usize]>) -> Document {
    let mut builder = Document::builder(TEXT);
    let tokens = builder.tokenize("Token");
    assert_eq!(tokens.len(), tags.len(), "one tag per token");

    for (token, tag) in tokens.iter().zip(tags) {
        let range = range_of(&builder, *token);
        builder.add(Annotation::span("POS", range.begin, range.end).with("PosValue", *tag));
    }
    if let Some(governors) = governors {
        for ((dependent, governor), tag) in tokens.iter().zip(governors).zip(tags) {
            let range = range_of(&builder, *dependent);
            builder.add(
                Annotation::span("Dependency", range.begin, range.end)
                    .with("Governor", tokens[*governor])
                    .with("Dependent", *dependent)
                    .with("DependencyType", tag.to_lowercase()),
            );
        }
    }
    builder.build()
}

/// Token `i` is governed by token `i + 1`, the last one by the first.
pub fn chain_governors() -> Vec<usize> {
    (0..TAGS.len()).map(|i| (i + 1) % TAGS.len()).collect()
}

/// Builds link hosts over `"This is a test of slot links ."`: a host at
/// `host` whose `links` slot holds one link per `(role, target)` pair.
pub struct LinkDoc {
    builder: DocumentBuilder,
}

pub const LINK_TEXT: &str = "This is a test of slot links .";

impl LinkDoc {
    pub fn new() -> Self {
        Self {
            builder: Document::builder(LINK_TEXT),
        }
    }

    pub fn host(mut self, begin: usize, end: usize, links: &[(&str, usize, usize)]) -> Self {
        let ids: Vec<AnnotationId> = links
            .iter()
            .map(|(role, target_begin, target_end)| {
                let target = self
                    .builder
                    .add(Annotation::span("Token", *target_begin, *target_end));
                self.builder.add(
                    Annotation::record("LinkType")
                        .with("role", *role)
                        .with("target", target),
                )
            })
            .collect();
        self.builder
            .add(Annotation::span("LinkHost", begin, end).with("links", ids));
        self
    }

    pub fn build(self) -> Document {
        self.builder.build()
    }
}

pub fn host_adapter() -> TypeAdapter {
    TypeAdapter::span("LinkHost", Vec::<String>::new()).with_slot("links", "role", "target")
}

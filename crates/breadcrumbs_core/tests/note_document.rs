use breadcrumbs_core::{
    compute_snippet_hash, parse_note_markdown, serialize_note_markdown, DocumentError, Note,
    NoteKind, NoteMetadata, Snippet, ValidationError,
};

const SAMPLE_SNIPPET: &str = "console.log('hello world');";

fn sample_note() -> String {
    format!(
        "---\n\
         id: note-1\n\
         title: Inspect Logs\n\
         kind: analysis\n\
         createdAt: 2024-01-01T10:00:00.000Z\n\
         updatedAt: 2024-01-01T10:15:00.000Z\n\
         tags:\n  - logs\n\
         links:\n  - docs/logging\n\
         snippet:\n  hash: {}\n  language: ts\n\
         ---\n\
         Review the error budget dashboard and capture unusual spikes.\n\
         \n\
         ```ts\n{SAMPLE_SNIPPET}\n```\n",
        compute_snippet_hash(SAMPLE_SNIPPET)
    )
}

#[test]
fn parses_header_body_and_snippet() {
    let note = parse_note_markdown(&sample_note()).unwrap();

    assert_eq!(note.metadata.id, "note-1");
    assert_eq!(note.metadata.kind, NoteKind::Analysis);
    assert_eq!(note.metadata.tags, vec!["logs"]);
    assert_eq!(note.metadata.links, vec!["docs/logging"]);
    assert_eq!(
        note.metadata.created_at.as_deref(),
        Some("2024-01-01T10:00:00.000Z")
    );
    assert_eq!(
        note.content,
        "Review the error budget dashboard and capture unusual spikes."
    );

    let snippet = note.snippet.unwrap();
    assert_eq!(snippet.code, SAMPLE_SNIPPET);
    assert_eq!(snippet.hash, compute_snippet_hash(SAMPLE_SNIPPET));
    assert_eq!(snippet.language.as_deref(), Some("ts"));
}

#[test]
fn serialized_note_parses_back_to_the_same_document() {
    let parsed = parse_note_markdown(&sample_note()).unwrap();
    let serialized = serialize_note_markdown(&parsed).unwrap();
    let reparsed = parse_note_markdown(&serialized).unwrap();

    assert_eq!(reparsed, parsed);
    assert!(serialized.contains("```ts\n"));
}

#[test]
fn declared_snippet_without_fence_is_rejected() {
    let raw = format!(
        "---\nid: note-2\ntitle: Missing Snippet\nkind: task\nsnippet:\n  hash: {}\n---\nBody only.",
        compute_snippet_hash(SAMPLE_SNIPPET)
    );

    let err = parse_note_markdown(&raw).unwrap_err();
    assert!(matches!(err, DocumentError::MissingSnippetBody));
    assert!(err.to_string().contains("Snippet metadata declared"));
}

#[test]
fn tampered_snippet_hash_blocks_serialization() {
    let mut note = parse_note_markdown(&sample_note()).unwrap();
    if let Some(snippet) = note.snippet.as_mut() {
        snippet.hash = "deadbeef".to_string();
    }

    let err = serialize_note_markdown(&note).unwrap_err();
    assert!(matches!(
        &err,
        DocumentError::SnippetHashMismatch { expected, .. } if expected == "deadbeef"
    ));
    assert!(err.to_string().contains("Snippet hash mismatch"));
}

#[test]
fn header_snippet_without_code_cannot_be_serialized() {
    let mut note = Note::new(NoteMetadata::new("n", "Title", NoteKind::Task), "body");
    note.metadata.snippet = Some(Snippet::new("x").meta());

    assert!(matches!(
        serialize_note_markdown(&note),
        Err(DocumentError::MissingSnippetBody)
    ));
}

#[test]
fn invalid_fields_are_reported_by_name() {
    let unknown_kind = "---\nid: n\ntitle: T\nkind: musing\n---\n";
    assert!(matches!(
        parse_note_markdown(unknown_kind),
        Err(DocumentError::Validation(ValidationError::UnsupportedKind(kind))) if kind == "musing"
    ));

    let bad_time = "---\nid: n\ntitle: T\nkind: task\ncreatedAt: yesterday\n---\n";
    assert!(matches!(
        parse_note_markdown(bad_time),
        Err(DocumentError::Validation(ValidationError::InvalidTimestamp { .. }))
    ));

    let no_header = "just text";
    assert!(matches!(
        parse_note_markdown(no_header),
        Err(DocumentError::Frontmatter(_))
    ));
}

#[test]
fn serialization_dedupes_tags_and_links() {
    let mut metadata = NoteMetadata::new("n", "Title", NoteKind::Reference);
    metadata.tags = vec!["a".into(), "b".into(), "a".into()];
    metadata.links = vec!["x".into(), "x".into()];
    let note = Note::new(metadata, "").with_snippet(Snippet::new("let a = 1;").with_language("rust"));

    let reparsed = parse_note_markdown(&serialize_note_markdown(&note).unwrap()).unwrap();
    assert_eq!(reparsed.metadata.tags, vec!["a", "b"]);
    assert_eq!(reparsed.metadata.links, vec!["x"]);
    assert_eq!(reparsed.snippet.unwrap().code, "let a = 1;");
}

#[test]
fn fence_supplies_language_and_trimmed_code_when_header_is_silent() {
    let raw = "---\nid: n\ntitle: Fenced\nkind: reference\n---\nIntro.\n\n```rust\ncode  \n\n```\n";

    let note = parse_note_markdown(raw).unwrap();
    let snippet = note.snippet.unwrap();
    assert_eq!(snippet.language.as_deref(), Some("rust"));
    assert_eq!(snippet.code, "code");
    assert_eq!(snippet.hash, compute_snippet_hash("code"));
    assert_eq!(note.metadata.snippet.unwrap().hash, compute_snippet_hash("code"));
    assert_eq!(note.content, "Intro.");
}

#[test]
fn snippet_code_is_hashed_as_written() {
    let snippet = Snippet::new("fn main() {}\n\n");
    assert_eq!(snippet.code, "fn main() {}");
    assert_eq!(snippet.hash, compute_snippet_hash("fn main() {}"));

    let raw_hash = compute_snippet_hash("fn main() {}\n");
    let untrimmed = Snippet {
        code: "fn main() {}\n".to_string(),
        hash: raw_hash.clone(),
        language: None,
        commit: None,
        path: None,
    };
    let note = Note::new(NoteMetadata::new("n", "T", NoteKind::Task), "").with_snippet(untrimmed);

    assert!(matches!(
        serialize_note_markdown(&note),
        Err(DocumentError::SnippetHashMismatch { expected, actual })
            if expected == raw_hash && actual == compute_snippet_hash("fn main() {}")
    ));
}

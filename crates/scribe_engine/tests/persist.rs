use std::fs;

use scribe_engine::{
    ensure_output_dir, parse_front_matter, write_atomically, ContentRecord, ContextMetadata,
    LinkEntry, OutputWriter,
};
use tempfile::TempDir;

fn record() -> ContentRecord {
    ContentRecord {
        title: "Grüße \"quoted\"".to_string(),
        source_locator: "https://example.com/page#a".to_string(),
        description: "Line one\nline two".to_string(),
        scraped_at: "2024-01-01T00:00:00Z".to_string(),
        navigation_links: vec![LinkEntry {
            text: "Top".to_string(),
            href: "https://example.com/top".to_string(),
            children: vec![LinkEntry::new("Child", "https://example.com/top/child")],
        }],
        footer_links: vec![LinkEntry::new("Legal", "https://example.com/legal")],
        body: "# Heading\n\nText.\n".to_string(),
    }
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("doc.md");

    write_atomically(&target, b"hello").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");

    write_atomically(&target, b"world").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "world");
}

#[test]
fn writer_lays_out_base_directory() {
    let temp = TempDir::new().unwrap();
    let writer = OutputWriter::new(temp.path().join("output"));

    let paths = writer.write("page--abcd1234", &record()).unwrap();
    assert_eq!(
        paths.markdown,
        temp.path().join("output/page--abcd1234/page--abcd1234.md")
    );
    assert_eq!(
        paths.metadata,
        temp.path()
            .join("output/page--abcd1234/page--abcd1234_context.json")
    );

    let markdown = fs::read_to_string(&paths.markdown).unwrap();
    let (front, body) = parse_front_matter(&markdown).unwrap();
    assert_eq!(front, record().front_matter());
    assert_eq!(body, "# Heading\n\nText.\n");

    let json = fs::read_to_string(&paths.metadata).unwrap();
    assert!(json.contains("Grüße"), "non-ASCII must not be escaped: {json}");
    let metadata: ContextMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(metadata, record().metadata());
}

#[test]
fn writer_fails_when_root_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = OutputWriter::new(&file_path);
    assert!(writer.write("doc", &record()).is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

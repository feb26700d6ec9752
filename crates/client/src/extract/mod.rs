//! Reading-order content extraction.
//!
//! ### Walk semantics
//! - The publication's declared reading order is walked **in order**; the
//!   concatenation order of the output is a content-correctness invariant.
//! - A read or UTF-8 decode failure for a single entry is skipped with a
//!   warning, not fatal: best-effort assembly over a flawed archive beats
//!   all-or-nothing.
//! - If every entry fails (or none exist), extraction fails with
//!   `NoExtractableContent` so callers can tell "nothing usable" apart from
//!   "legitimately empty".

use std::path::{Path, PathBuf};

use folio_core::Error;

use crate::archive::Publication;

/// Separator between concatenated reading-order entries.
const CHAPTER_SEPARATOR: &str = "\n\n";

/// Options for a single extraction call.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Title to report when the archive declares none.
    pub fallback_title: Option<String>,
}

/// The assembled content of one publication.
///
/// Produced once per extraction call and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Concatenated reading-order fragments, in declared order.
    pub body: String,
    /// Declared metadata title, or the caller-supplied fallback.
    pub title: String,
    /// Directory of the materialized archive, for resolving relative
    /// resource references downstream.
    pub base_dir: PathBuf,
    /// Number of reading-order entries that contributed to `body`.
    pub chapters: usize,
}

/// Extract the readable content of the archive at `path`.
///
/// # Errors
///
/// - `ArchiveParsingFailed` when the archive cannot be opened; no further
///   steps are attempted.
/// - `NoExtractableContent` when the accumulated body is empty after
///   processing every reading-order entry.
pub fn extract(path: &Path, options: &ExtractOptions) -> Result<ExtractedContent, Error> {
    let mut publication = Publication::open(path)?;

    let reading_order: Vec<String> = publication.reading_order().to_vec();
    let mut body = String::new();
    let mut chapters = 0;

    for name in &reading_order {
        let data = match publication.read_resource(name) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(resource = %name, error = %e, "skipping unreadable resource");
                continue;
            }
        };

        let text = match String::from_utf8(data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(resource = %name, error = %e, "skipping non-UTF-8 resource");
                continue;
            }
        };

        if !body.is_empty() {
            body.push_str(CHAPTER_SEPARATOR);
        }
        body.push_str(&text);
        chapters += 1;
    }

    if body.is_empty() {
        return Err(Error::NoExtractableContent);
    }

    let title = publication
        .title()
        .map(String::from)
        .or_else(|| options.fallback_title.clone())
        .unwrap_or_else(|| "Untitled".to_string());

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);

    tracing::debug!(
        title = %title,
        chapters,
        skipped = reading_order.len() - chapters,
        bytes = body.len(),
        "extraction complete"
    );

    Ok(ExtractedContent { body, title, base_dir, chapters })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    /// Build an EPUB whose spine declares every chapter in `chapters`,
    /// in order. Entries with `None` content are declared but absent from
    /// the archive.
    fn write_epub(title: Option<&str>, chapters: &[(&str, Option<&[u8]>)]) -> tempfile::TempPath {
        let mut manifest = String::new();
        let mut spine = String::new();
        for (i, (href, _)) in chapters.iter().enumerate() {
            manifest.push_str(&format!(
                r#"<item id="c{i}" href="{href}" media-type="application/xhtml+xml"/>"#
            ));
            spine.push_str(&format!(r#"<itemref idref="c{i}"/>"#));
        }

        let metadata = title
            .map(|t| format!("<dc:title>{t}</dc:title>"))
            .unwrap_or_default();
        let opf = format!(
            r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{metadata}</metadata>
  <manifest>{manifest}</manifest>
  <spine>{spine}</spine>
</package>"#
        );

        let file = tempfile::Builder::new().suffix(".epub").tempfile().unwrap();
        let mut writer = ZipWriter::new(file.reopen().unwrap());
        writer.start_file("META-INF/container.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(CONTAINER_XML.as_bytes()).unwrap();
        writer.start_file("OEBPS/content.opf", SimpleFileOptions::default()).unwrap();
        writer.write_all(opf.as_bytes()).unwrap();
        for (href, content) in chapters {
            if let Some(content) = content {
                writer.start_file(format!("OEBPS/{href}"), SimpleFileOptions::default()).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap();
        file.into_temp_path()
    }

    #[test]
    fn test_extract_concatenates_in_declared_order() {
        let path = write_epub(
            Some("Sample Title"),
            &[
                ("ch1.xhtml", Some(b"<p>MARKER-A</p>".as_slice())),
                ("ch2.xhtml", Some(b"<p>MARKER-B</p>".as_slice())),
                ("ch3.xhtml", Some(b"<p>MARKER-C</p>".as_slice())),
            ],
        );
        let content = extract(&path, &ExtractOptions::default()).unwrap();

        let a = content.body.find("MARKER-A").unwrap();
        let b = content.body.find("MARKER-B").unwrap();
        let c = content.body.find("MARKER-C").unwrap();
        assert!(a < b && b < c);
        assert_eq!(content.chapters, 3);
        assert_eq!(content.title, "Sample Title");
    }

    #[test]
    fn test_extract_skips_undecodable_resource() {
        let path = write_epub(
            Some("T"),
            &[
                ("ch1.xhtml", Some(b"<p>GOOD-ONE</p>".as_slice())),
                ("ch2.xhtml", Some(&[0xff, 0xfe, 0x00, 0xc3][..])),
                ("ch3.xhtml", Some(b"<p>GOOD-TWO</p>".as_slice())),
            ],
        );
        let content = extract(&path, &ExtractOptions::default()).unwrap();

        assert!(content.body.contains("GOOD-ONE"));
        assert!(content.body.contains("GOOD-TWO"));
        assert_eq!(content.chapters, 2);
    }

    #[test]
    fn test_extract_skips_missing_resource() {
        let path = write_epub(
            Some("T"),
            &[
                ("ch1.xhtml", Some(b"<p>PRESENT</p>".as_slice())),
                ("ch2.xhtml", None),
            ],
        );
        let content = extract(&path, &ExtractOptions::default()).unwrap();
        assert!(content.body.contains("PRESENT"));
        assert_eq!(content.chapters, 1);
    }

    #[test]
    fn test_extract_empty_spine_is_no_extractable_content() {
        let path = write_epub(Some("T"), &[]);
        let result = extract(&path, &ExtractOptions::default());
        assert!(matches!(result, Err(Error::NoExtractableContent)));
    }

    #[test]
    fn test_extract_all_resources_failing_is_no_extractable_content() {
        let path = write_epub(
            Some("T"),
            &[("ch1.xhtml", None), ("ch2.xhtml", Some(&[0xff, 0xfe][..]))],
        );
        let result = extract(&path, &ExtractOptions::default());
        assert!(matches!(result, Err(Error::NoExtractableContent)));
    }

    #[test]
    fn test_extract_title_fallback() {
        let path = write_epub(None, &[("ch1.xhtml", Some(b"<p>x</p>".as_slice()))]);
        let options = ExtractOptions { fallback_title: Some("From Caller".into()) };
        let content = extract(&path, &options).unwrap();
        assert_eq!(content.title, "From Caller");
    }

    #[test]
    fn test_extract_title_default_when_no_fallback() {
        let path = write_epub(None, &[("ch1.xhtml", Some(b"<p>x</p>".as_slice()))]);
        let content = extract(&path, &ExtractOptions::default()).unwrap();
        assert_eq!(content.title, "Untitled");
    }

    #[test]
    fn test_extract_base_dir_is_archive_parent() {
        let path = write_epub(Some("T"), &[("ch1.xhtml", Some(b"<p>x</p>".as_slice()))]);
        let content = extract(&path, &ExtractOptions::default()).unwrap();
        assert_eq!(content.base_dir, path.parent().unwrap());
    }

    #[test]
    fn test_extract_corrupt_archive_fails_fast() {
        let file = tempfile::Builder::new().suffix(".epub").tempfile().unwrap();
        std::fs::write(file.path(), b"garbage").unwrap();
        let result = extract(file.path(), &ExtractOptions::default());
        assert!(matches!(result, Err(Error::ArchiveParsingFailed(_))));
    }
}

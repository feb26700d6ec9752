//! EPUB container reader.
//!
//! Exposes the minimal capability set the extractor depends on: open an
//! archive by path, list its declared reading order, read a single resource,
//! and report the metadata title. Parsing follows the OCF/OPF layout:
//! `META-INF/container.xml` names the OPF rootfile, whose manifest maps ids
//! to hrefs and whose spine declares the linear reading path.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use folio_core::Error;
use roxmltree::Document;
use zip::ZipArchive;

/// An opened EPUB publication.
pub struct Publication {
    archive: ZipArchive<File>,
    title: Option<String>,
    reading_order: Vec<String>,
}

impl Publication {
    /// Open the archive at `path` and parse its container metadata.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveParsingFailed` when the file is not a readable ZIP,
    /// the container declaration is missing, or the OPF cannot be parsed.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::ArchiveParsingFailed(e.to_string()))?;
        let mut archive = ZipArchive::new(file).map_err(|e| Error::ArchiveParsingFailed(e.to_string()))?;

        let opf_path = find_opf_path(&mut archive)?;
        let opf_dir = opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let opf_content = read_entry_string(&mut archive, &opf_path)?;
        let (title, reading_order) = parse_opf(&opf_content, opf_dir)?;

        Ok(Self { archive, title, reading_order })
    }

    /// Declared metadata title, when present.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Archive entry names of the linear reading path, in declared order.
    pub fn reading_order(&self) -> &[String] {
        &self.reading_order
    }

    /// Read the raw bytes of one archive entry.
    ///
    /// Failure here is per-resource: callers are expected to skip and
    /// continue rather than abort the whole extraction.
    pub fn read_resource(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let mut entry = self
            .archive
            .by_name(name)
            .map_err(|e| Error::ArchiveParsingFailed(format!("{name}: {e}")))?;

        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| Error::ArchiveParsingFailed(format!("{name}: {e}")))?;
        Ok(data)
    }
}

/// Find the OPF rootfile path from `META-INF/container.xml`.
fn find_opf_path(archive: &mut ZipArchive<File>) -> Result<String, Error> {
    let content = read_entry_string(archive, "META-INF/container.xml")?;
    let doc = Document::parse(&content).map_err(|e| Error::ArchiveParsingFailed(e.to_string()))?;

    doc.descendants()
        .find(|n| n.tag_name().name() == "rootfile")
        .and_then(|n| n.attribute("full-path"))
        .map(String::from)
        .ok_or_else(|| Error::ArchiveParsingFailed("no rootfile in container.xml".into()))
}

/// Parse the OPF: metadata title plus the spine resolved against the
/// manifest.
///
/// Spine entries marked `linear="no"` are auxiliary content (covers, loan
/// pages) and are excluded from the reading order.
fn parse_opf(content: &str, opf_dir: &str) -> Result<(Option<String>, Vec<String>), Error> {
    let doc = Document::parse(content).map_err(|e| Error::ArchiveParsingFailed(e.to_string()))?;

    let mut title: Option<String> = None;
    let mut manifest: HashMap<&str, &str> = HashMap::new();
    let mut spine_idrefs: Vec<&str> = Vec::new();

    for node in doc.descendants() {
        match node.tag_name().name() {
            "title" => {
                if title.is_none() {
                    title = node.text().map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
                }
            }
            "item" => {
                if let (Some(id), Some(href)) = (node.attribute("id"), node.attribute("href")) {
                    manifest.insert(id, href);
                }
            }
            "itemref" => {
                if node.attribute("linear") != Some("no")
                    && let Some(idref) = node.attribute("idref")
                {
                    spine_idrefs.push(idref);
                }
            }
            _ => {}
        }
    }

    let reading_order = spine_idrefs
        .iter()
        .filter_map(|idref| manifest.get(idref).copied())
        .map(|href| resolve_href(opf_dir, href))
        .collect();

    Ok((title, reading_order))
}

/// Resolve a manifest href against the OPF directory, collapsing `.` and
/// `..` segments. Archive entry names always use `/` separators.
fn resolve_href(opf_dir: &str, href: &str) -> String {
    let mut segments: Vec<&str> = if opf_dir.is_empty() {
        Vec::new()
    } else {
        opf_dir.split('/').collect()
    };

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

fn read_entry_string(archive: &mut ZipArchive<File>, name: &str) -> Result<String, Error> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| Error::ArchiveParsingFailed(format!("{name}: {e}")))?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| Error::ArchiveParsingFailed(format!("{name}: {e}")))?;
    Ok(content)
}

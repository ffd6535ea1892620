//! Reading and writing `.docx` quiz documents.
//!
//! Only the main document part is used: each `w:p` element becomes one
//! paragraph of text. Styling, tables and embedded objects are ignored.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quiz_core::model::QuizSettings;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = "</w:body></w:document>";

/// Loads the trimmed, non-empty paragraphs of an uploaded document.
///
/// # Errors
///
/// Returns `DocumentError::UnsupportedFile` if the extension is not allowed,
/// or any error raised while opening and reading the package.
pub fn load_paragraphs(path: &Path, settings: &QuizSettings) -> Result<Vec<String>, DocumentError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !settings.allows_file(&name) {
        return Err(DocumentError::UnsupportedFile(name));
    }
    read_docx(File::open(path)?)
}

/// Reads paragraphs from a `.docx` package.
///
/// # Errors
///
/// Returns `DocumentError` if the archive is corrupt, has no main document
/// part, or the part is not well-formed XML.
pub fn read_docx<R: Read + Seek>(reader: R) -> Result<Vec<String>, DocumentError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    paragraphs_from_xml(&xml)
}

fn xml_err(err: impl std::fmt::Display) -> DocumentError {
    DocumentError::Xml(err.to_string())
}

/// Extracts paragraph text from WordprocessingML.
///
/// Text runs are concatenated, `w:tab` becomes a tab and `w:br` a newline.
pub(crate) fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                b"w:tab" => push_char(&mut current, '\t'),
                b"w:br" => push_char(&mut current, '\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => push_char(&mut current, '\t'),
                b"w:br" => push_char(&mut current, '\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(xml_err)?;
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(paragraph) = current.take() {
                        let trimmed = paragraph.trim();
                        if !trimmed.is_empty() {
                            paragraphs.push(trimmed.to_owned());
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push(c);
    }
}

/// Writes `paragraphs` as a minimal `.docx` package, one `w:p` each.
///
/// # Errors
///
/// Returns `DocumentError` if the file cannot be created or written.
pub fn write_docx<S: AsRef<str>>(path: &Path, paragraphs: &[S]) -> Result<(), DocumentError> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;

    let mut body = String::from(DOCUMENT_OPEN);
    for paragraph in paragraphs {
        let text = paragraph.as_ref();
        if text.is_empty() {
            body.push_str("<w:p/>");
        } else {
            body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
            body.push_str(&escape(text));
            body.push_str("</w:t></w:r></w:p>");
        }
    }
    body.push_str(DOCUMENT_CLOSE);

    zip.start_file(DOCUMENT_PART, opts)?;
    zip.write_all(body.as_bytes())?;
    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_runs_and_keeps_tabs() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>Question 1: </w:t></w:r><w:r><w:t>2+2?</w:t></w:r></w:p>
            <w:p><w:r><w:t>A.</w:t><w:tab/><w:t>3</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:t>   </w:t></w:r></w:p>
            <w:p><w:r><w:t>Fish &amp; chips</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let paragraphs = paragraphs_from_xml(xml).unwrap();
        assert_eq!(paragraphs, vec!["Question 1: 2+2?", "A.\t3", "Fish & chips"]);
    }

    #[test]
    fn ignores_text_outside_runs() {
        let xml = r#"<w:document xmlns:w="x"><w:body><w:p>stray<w:r><w:t>kept</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(paragraphs_from_xml(xml).unwrap(), vec!["kept"]);
    }

    #[test]
    fn mismatched_tags_are_xml_errors() {
        let err = paragraphs_from_xml("<w:p><w:t>x</w:p>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml(_)));
    }

    #[test]
    fn rejects_disallowed_extension_before_opening() {
        let err = load_paragraphs(Path::new("quiz.pdf"), &QuizSettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported file type: quiz.pdf");
    }

    #[test]
    fn written_document_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.docx");
        write_docx(&path, &["Title", "", "Question 1: <b> & \"c\"?"]).unwrap();

        let paragraphs = load_paragraphs(&path, &QuizSettings::default()).unwrap();
        assert_eq!(paragraphs, vec!["Title", "Question 1: <b> & \"c\"?"]);
    }

    #[test]
    fn archive_without_body_is_reported() {
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        buf.set_position(0);
        assert!(matches!(read_docx(buf), Err(DocumentError::MissingBody)));
    }

    #[test]
    fn non_zip_input_is_an_archive_error() {
        let err = read_docx(std::io::Cursor::new(b"not a zip".to_vec())).unwrap_err();
        assert!(matches!(err, DocumentError::Archive(_) | DocumentError::Io(_)));
    }
}

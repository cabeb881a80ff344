//! Text extraction from uploaded documents.

use crate::error::Error;
use log::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

/// Text of every page of a PDF, or an empty string when it has no text layer.
pub async fn pdf_text(bytes: Vec<u8>) -> Result<String, Error> {
    // pdf-extract is synchronous and can panic on malformed files; the blocking
    // task contains both.
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            Error::invalid(format!("PDF processing failed: {e}"))
        })?;

    extracted.map_err(|e| {
        debug!("PDF extraction failed: {e}");
        Error::invalid(format!("PDF processing failed: {e}"))
    })
}

fn word_error(detail: impl std::fmt::Display) -> Error {
    Error::invalid(format!("Word document processing failed: {detail}"))
}

/// Paragraph text of a `.docx` document followed by the text of its tables,
/// one table row per line.
pub fn docx_text(bytes: &[u8]) -> Result<String, Error> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(word_error)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(word_error)?
        .read_to_string(&mut xml)
        .map_err(word_error)?;

    document_xml_text(&xml)
}

fn document_xml_text(xml: &str) -> Result<String, Error> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut table_rows = Vec::new();

    let mut table_depth = 0usize;
    let mut in_text_run = false;
    let mut paragraph = String::new();
    let mut cell = String::new();
    let mut row: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(word_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:t" => in_text_run = true,
                b"w:p" => paragraph.clear(),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" | b"w:cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                paragraph.push_str(&t.unescape().map_err(word_error)?);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" if table_depth == 0 => {
                    if !paragraph.trim().is_empty() {
                        paragraphs.push(paragraph.clone());
                    }
                }
                b"w:p" => {
                    if !cell.is_empty() {
                        cell.push('\n');
                    }
                    cell.push_str(&paragraph);
                }
                b"w:tc" => {
                    if !cell.trim().is_empty() {
                        row.push(cell.clone());
                    }
                    cell.clear();
                }
                b"w:tr" => {
                    table_rows.push(row.join(" "));
                    row.clear();
                }
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let mut text = paragraphs.join("\n");
    for line in table_rows {
        text.push('\n');
        text.push_str(&line);
    }
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Builds a minimal `.docx` archive around a `w:body` fragment.
    pub(crate) fn docx_with_body(body: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            zip.start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            write!(
                zip,
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
            )
            .unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn paragraphs_come_before_table_rows() {
        let docx = docx_with_body(
            r#"<w:p><w:r><w:t>Cell biology</w:t></w:r></w:p>
               <w:tbl><w:tr>
                 <w:tc><w:p><w:r><w:t>Organelle</w:t></w:r></w:p></w:tc>
                 <w:tc><w:p><w:r><w:t>Role</w:t></w:r></w:p></w:tc>
               </w:tr><w:tr>
                 <w:tc><w:p><w:r><w:t>Nucleus</w:t></w:r></w:p></w:tc>
                 <w:tc><w:p><w:r><w:t>Holds DNA</w:t></w:r></w:p></w:tc>
               </w:tr></w:tbl>
               <w:p><w:r><w:t xml:space="preserve">Mitochondria &amp; energy</w:t></w:r></w:p>
               <w:p></w:p>"#,
        );

        assert_eq!(
            docx_text(&docx).unwrap(),
            "Cell biology\nMitochondria & energy\nOrganelle Role\nNucleus Holds DNA"
        );
    }

    #[test]
    fn runs_within_a_paragraph_are_joined() {
        let docx = docx_with_body(
            r#"<w:p><w:r><w:t>Photo</w:t></w:r><w:r><w:t>synthesis</w:t></w:r><w:r><w:tab/><w:t>notes</w:t></w:r></w:p>"#,
        );

        assert_eq!(docx_text(&docx).unwrap(), "Photosynthesis\tnotes");
    }

    #[test]
    fn non_zip_bytes_are_rejected() {
        let err = docx_text(b"definitely not a zip").unwrap_err();
        assert!(err
            .client_message()
            .starts_with("Word document processing failed:"));
    }

    #[tokio::test]
    async fn garbage_pdfs_are_rejected() {
        let err = pdf_text(b"%PDF-1.4 garbage".to_vec()).await.unwrap_err();
        assert!(err.client_message().starts_with("PDF processing failed:"));
    }
}

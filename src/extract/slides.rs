//! Presentation (PPT/PPTX) text extraction strategy.
//!
//! A `.pptx` file is a zip archive with one XML document per slide under
//! `ppt/slides/`. Slides are walked in numeric order and each text run
//! (`<a:t>` element) is collected shape by shape, newline-joined. Legacy
//! binary `.ppt` files are not zip archives and fail as malformed.

use super::ExtractionError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extract slide text in slide order, shapes in document order within a slide.
pub(super) fn extract_text(file: &str, data: &[u8]) -> Result<String, ExtractionError> {
    let cursor = Cursor::new(data);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|error| ExtractionError::Malformed {
            file: file.to_string(),
            reason: format!("not a presentation archive: {error}"),
        })?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with(SLIDE_PREFIX) && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    slide_names.sort_by_key(|name| slide_number(name));

    let mut runs = Vec::new();
    for slide_name in slide_names {
        let mut xml = String::new();
        match archive.by_name(&slide_name) {
            Ok(mut entry) => {
                entry
                    .read_to_string(&mut xml)
                    .map_err(|error| ExtractionError::Malformed {
                        file: file.to_string(),
                        reason: format!("slide {slide_name} is not valid UTF-8: {error}"),
                    })?;
            }
            Err(error) => {
                return Err(ExtractionError::Malformed {
                    file: file.to_string(),
                    reason: format!("slide {slide_name} could not be opened: {error}"),
                });
            }
        }
        collect_text_runs(&xml, &mut runs);
    }

    Ok(runs.join("\n"))
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches(SLIDE_PREFIX)
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

/// Pull the contents of every `<a:t>` element out of one slide's XML.
fn collect_text_runs(xml: &str, runs: &mut Vec<String>) {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_text_element = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                if element.local_name().as_ref() == b"t" {
                    in_text_element = true;
                    current.clear();
                }
            }
            Ok(Event::Text(text)) => {
                if in_text_element
                    && let Ok(value) = text.unescape()
                {
                    current.push_str(&value);
                }
            }
            Ok(Event::End(element)) => {
                if element.local_name().as_ref() == b"t" && in_text_element {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        runs.push(trimmed.to_string());
                    }
                    in_text_element = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const SLIDE_XML: &str = r#"<?xml version="1.0"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp><p:txBody><a:p><a:r><a:t>{TITLE}</a:t></a:r></a:p></p:txBody></p:sp>
    <p:sp><p:txBody><a:p><a:r><a:t>{BODY}</a:t></a:r></a:p></p:txBody></p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    fn slide(title: &str, body: &str) -> String {
        SLIDE_XML.replace("{TITLE}", title).replace("{BODY}", body)
    }

    fn build_pptx(slides: &[String]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (idx, xml) in slides.iter().enumerate() {
            writer
                .start_file(format!("ppt/slides/slide{}.xml", idx + 1), options)
                .expect("start slide entry");
            writer.write_all(xml.as_bytes()).expect("write slide");
        }
        writer.finish().expect("finish archive").into_inner()
    }

    #[test]
    fn text_runs_are_collected_in_shape_order() {
        let mut runs = Vec::new();
        collect_text_runs(&slide("Roadmap", "Q3 milestones"), &mut runs);
        assert_eq!(runs, vec!["Roadmap", "Q3 milestones"]);
    }

    #[test]
    fn slides_are_visited_in_numeric_order() {
        // Ten slides so lexicographic ordering (slide10 before slide2) would fail.
        let slides: Vec<String> = (1..=10)
            .map(|n| slide(&format!("Slide {n}"), "content"))
            .collect();
        let data = build_pptx(&slides);

        let text = extract_text("deck.pptx", &data).expect("extraction");
        let titles: Vec<&str> = text.lines().filter(|l| l.starts_with("Slide ")).collect();
        assert_eq!(titles[0], "Slide 1");
        assert_eq!(titles[9], "Slide 10");
    }

    #[test]
    fn deck_without_slides_yields_empty_text() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("docProps/core.xml", SimpleFileOptions::default())
            .expect("entry");
        writer.write_all(b"<x/>").expect("write");
        let data = writer.finish().expect("finish").into_inner();

        let text = extract_text("empty.pptx", &data).expect("extraction");
        assert!(text.is_empty());
    }

    #[test]
    fn non_zip_input_is_malformed() {
        let error = extract_text("legacy.ppt", b"OLE legacy bytes").expect_err("not a zip");
        assert!(matches!(error, ExtractionError::Malformed { .. }));
    }
}

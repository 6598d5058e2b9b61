//! OWS exception reports.
//!
//! A WPS that fails inside the process may still answer with a success status
//! and an `ows:ExceptionReport` body instead of the requested output.

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

/// The service's own description of the failure, if `body` is an exception
/// report.
///
/// Each `Exception` becomes `code: text` (or just the code or the text when
/// only one is given), joined with `; `.
pub fn exception_report(body: &str) -> Option<String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut in_report = false;
    let mut in_text = false;
    let mut exceptions: Vec<(Option<String>, Vec<String>)> = Vec::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) if !in_report => {
                if e.local_name().as_ref() != b"ExceptionReport" {
                    return None;
                }
                in_report = true;
            }
            Event::Start(e) if e.local_name().as_ref() == b"ExceptionText" => in_text = true,
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Exception" => {
                exceptions.push((exception_code(&e), Vec::new()));
            }
            Event::Text(text) if in_text => {
                if let (Some((_, texts)), Ok(text)) = (exceptions.last_mut(), text.unescape()) {
                    texts.push(text.into_owned());
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"ExceptionText" => in_text = false,
            Event::Eof => break,
            _ => {}
        }
    }

    if !in_report {
        return None;
    }
    let described: Vec<String> = exceptions
        .into_iter()
        .map(|(code, texts)| match (code, texts.join(" ")) {
            (Some(code), text) if !text.is_empty() => format!("{}: {}", code, text),
            (Some(code), _) => code,
            (None, text) => text,
        })
        .filter(|d| !d.is_empty())
        .collect();
    if described.is_empty() {
        Some("unspecified service exception".to_string())
    } else {
        Some(described.join("; "))
    }
}

fn exception_code(element: &BytesStart) -> Option<String> {
    let attribute = element.try_get_attribute("exceptionCode").ok()??;
    Some(attribute.unescape_value().ok()?.into_owned())
}

//! Marker-delimited sections of the simulator log.

/// A named block of text lifted out of the raw log. Borrowed; parse it to get structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

/// Literal delimiter for a section, e.g. `===CSPACE===`.
pub fn marker(section_name: &str) -> String {
    format!("==={section_name}===")
}

/// Extract the trimmed text between the first and second occurrence of the section marker.
///
/// Returns `None` if the marker occurs fewer than two times.
pub fn extract<'a>(content: &'a str, section_name: &'a str) -> Option<Section<'a>> {
    let marker = marker(section_name);
    let open = content.find(&marker)?;
    let rest = &content[open + marker.len()..];
    let close = rest.find(&marker)?;
    Some(Section {
        name: section_name,
        body: rest[..close].trim(),
    })
}

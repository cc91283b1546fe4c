//! `[Content_Types].xml` model.

use crate::error::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use std::fmt::Write as _;

/// Part name of the content types stream.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const PRESENTATION_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const PNG: &str = "image/png";

const TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Default (by extension) and Override (by part name) content types.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut types = ContentTypes::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if matches!(e.local_name().as_ref(), b"Default" | b"Override") =>
                {
                    let is_default = e.local_name().as_ref() == b"Default";

                    let mut key = String::new();
                    let mut content_type = String::new();
                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = value,
                            b"ContentType" => content_type = value,
                            _ => {}
                        }
                    }

                    if is_default {
                        types.defaults.push((key, content_type));
                    } else {
                        types.overrides.push((key, content_type));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type registered for an extension, ignoring case.
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct.as_str())
    }

    /// Content type overriding a part, e.g. `/ppt/presentation.xml`.
    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        let part_name = normalize_part_name(part_name);
        self.overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&part_name))
            .map(|(_, ct)| ct.as_str())
    }

    /// Register an extension unless it already has a content type.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if self.default_for(extension).is_none() {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Set the override for a part, replacing any existing one.
    pub fn set_override(&mut self, part_name: &str, content_type: &str) {
        let part_name = normalize_part_name(part_name);
        match self
            .overrides
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&part_name))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((part_name, content_type.to_string())),
        }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 128);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        let _ = write!(xml, r#"<Types xmlns="{}">"#, TYPES_NS);
        for (ext, ct) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext.as_str()),
                escape(ct.as_str())
            );
        }
        for (name, ct) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(name.as_str()),
                escape(ct.as_str())
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

fn normalize_part_name(part_name: &str) -> String {
    if part_name.starts_with('/') {
        part_name.to_string()
    } else {
        format!("/{}", part_name)
    }
}

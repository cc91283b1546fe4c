//! Reading and rewriting the presentation part (`ppt/presentation.xml`).

use crate::container::RELATIONSHIPS_NS;
use crate::error::{Error, Result};
use crate::units::{Emu, SlideSize};
use quick_xml::events::{BytesEnd, BytesStart, Event};

/// Smallest slide id PowerPoint accepts.
pub const MIN_SLIDE_ID: u32 = 256;

/// A `sldId` entry: the slide's numeric id and its relationship id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    pub id: u32,
    pub rel_id: String,
}

/// What the builder and inspector need to know about a presentation part.
#[derive(Debug, Clone, Default)]
pub struct PresentationInfo {
    /// Slides in presentation order
    pub slides: Vec<SlideRef>,
    /// Declared slide size, if any
    pub slide_size: Option<SlideSize>,
}

impl PresentationInfo {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut info = PresentationInfo::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"sldId" => {
                        let mut id = None;
                        let mut rel_id = String::new();
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() != b"id" {
                                continue;
                            }
                            let value = attr.unescape_value()?;
                            if attr.key.prefix().is_some() {
                                rel_id = value.into_owned();
                            } else {
                                id = value.trim().parse::<u32>().ok();
                            }
                        }
                        if let (Some(id), false) = (id, rel_id.is_empty()) {
                            info.slides.push(SlideRef { id, rel_id });
                        }
                    }
                    b"sldSz" => {
                        let cx = emu_attr(&e, b"cx")?;
                        let cy = emu_attr(&e, b"cy")?;
                        if let (Some(width), Some(height)) = (cx, cy) {
                            info.slide_size = Some(SlideSize { width, height });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// First slide id greater than every existing one.
    pub fn next_slide_id(&self) -> u32 {
        self.slides
            .iter()
            .map(|s| s.id + 1)
            .max()
            .unwrap_or(MIN_SLIDE_ID)
            .max(MIN_SLIDE_ID)
    }
}

fn emu_attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<Emu>> {
    match e.try_get_attribute(key)? {
        Some(attr) => Ok(attr.unescape_value()?.trim().parse::<i64>().ok().map(Emu)),
        None => Ok(None),
    }
}

/// Rewrite a presentation part: set the slide size and append `new_slides`
/// to the slide list.
///
/// The slide list is created right before `sldSz` when the part has none.
/// Everything else passes through untouched.
pub fn rewrite_presentation(xml: &str, size: SlideSize, new_slides: &[SlideRef]) -> Result<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut writer = quick_xml::Writer::new(Vec::with_capacity(xml.len() + new_slides.len() * 48));

    let mut names = ElementNames::default();
    let mut slides_written = new_slides.is_empty();
    let mut size_written = false;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref e) if e.local_name().as_ref() == b"presentation" => {
                let root = names.bind_root(e);
                writer.write_event(Event::Start(root))?;
            }
            Event::End(ref e) if e.local_name().as_ref() == b"sldIdLst" => {
                write_slide_ids(&mut writer, &names, new_slides)?;
                slides_written = true;
                writer.write_event(event)?;
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"sldIdLst" => {
                if new_slides.is_empty() {
                    writer.write_event(event)?;
                } else {
                    writer.write_event(Event::Start(e.borrow()))?;
                    write_slide_ids(&mut writer, &names, new_slides)?;
                    writer.write_event(Event::End(BytesEnd::new(names.qualify("sldIdLst"))))?;
                }
                slides_written = true;
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sldSz" => {
                if !slides_written {
                    write_slide_list(&mut writer, &names, new_slides)?;
                    slides_written = true;
                }
                let sized = resized(e, size);
                if matches!(event, Event::Start(_)) {
                    writer.write_event(Event::Start(sized))?;
                } else {
                    writer.write_event(Event::Empty(sized))?;
                }
                size_written = true;
            }
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"notesSz" && !size_written =>
            {
                if !slides_written {
                    write_slide_list(&mut writer, &names, new_slides)?;
                    slides_written = true;
                }
                let mut sld_sz = BytesStart::new(names.qualify("sldSz"));
                sld_sz.push_attribute(("cx", size.width.to_string().as_str()));
                sld_sz.push_attribute(("cy", size.height.to_string().as_str()));
                writer.write_event(Event::Empty(sld_sz))?;
                size_written = true;
                writer.write_event(event)?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !size_written || !slides_written {
        return Err(Error::InvalidData(
            "presentation part has no slide size element".to_string(),
        ));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::InvalidData(e.to_string()))
}

/// Prefixes used for elements added to the presentation part.
#[derive(Debug, Default)]
struct ElementNames {
    element_prefix: Option<String>,
    rel_prefix: String,
}

impl ElementNames {
    /// Learn the prefixes from the root element, declaring the relationships
    /// namespace on it when the document never does.
    fn bind_root<'a>(&mut self, root: &'a BytesStart<'a>) -> BytesStart<'a> {
        self.element_prefix = root
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

        let declared = root.attributes().flatten().find_map(|attr| {
            let key = attr.key.as_ref();
            let prefix = key.strip_prefix(b"xmlns:")?;
            (attr.value.as_ref() == RELATIONSHIPS_NS.as_bytes())
                .then(|| String::from_utf8_lossy(prefix).into_owned())
        });

        match declared {
            Some(prefix) => {
                self.rel_prefix = prefix;
                root.borrow()
            }
            None => {
                let taken = root.try_get_attribute("xmlns:r").ok().flatten().is_some();
                self.rel_prefix = if taken { "rel".to_string() } else { "r".to_string() };
                let mut owned = root.borrow();
                let key = format!("xmlns:{}", self.rel_prefix);
                owned.push_attribute((key.as_str(), RELATIONSHIPS_NS));
                owned
            }
        }
    }

    fn qualify(&self, local: &str) -> String {
        match &self.element_prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }
}

fn write_slide_ids(
    writer: &mut quick_xml::Writer<Vec<u8>>,
    names: &ElementNames,
    slides: &[SlideRef],
) -> Result<()> {
    let rel_key = format!("{}:id", names.rel_prefix);
    for slide in slides {
        let mut el = BytesStart::new(names.qualify("sldId"));
        el.push_attribute(("id", slide.id.to_string().as_str()));
        el.push_attribute((rel_key.as_str(), slide.rel_id.as_str()));
        writer.write_event(Event::Empty(el))?;
    }
    Ok(())
}

fn write_slide_list(
    writer: &mut quick_xml::Writer<Vec<u8>>,
    names: &ElementNames,
    slides: &[SlideRef],
) -> Result<()> {
    let list = names.qualify("sldIdLst");
    writer.write_event(Event::Start(BytesStart::new(list.as_str())))?;
    write_slide_ids(writer, names, slides)?;
    writer.write_event(Event::End(BytesEnd::new(list)))?;
    Ok(())
}

/// Copy of a `sldSz` element with new extents and no named size type.
fn resized<'a>(e: &'a BytesStart<'a>, size: SlideSize) -> BytesStart<'a> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        if !matches!(attr.key.as_ref(), b"cx" | b"cy" | b"type") {
            el.push_attribute(attr);
        }
    }
    el.push_attribute(("cx", size.width.to_string().as_str()));
    el.push_attribute(("cy", size.height.to_string().as_str()));
    el
}

//! In-memory presentation being assembled.

use crate::container::{decode_xml_bytes, rel_type, rels_path_for, OoxmlContainer, Relationships};
use crate::error::{Error, Result};
use crate::layout::Frame;
use crate::package::content_types::{self, ContentTypes, CONTENT_TYPES_PART};
use crate::package::presentation::{rewrite_presentation, PresentationInfo, SlideRef};
use crate::package::slide::{picture_slide_xml, PictureShape};
use crate::package::{template, write_package};
use crate::units::SlideSize;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Layout position used when no layout declares itself blank.
pub const FALLBACK_LAYOUT_INDEX: usize = 5;

/// A presentation package with picture slides appended to it.
///
/// Slides the template already holds are kept, in front of the new ones.
#[derive(Debug)]
pub struct Deck {
    parts: BTreeMap<String, Vec<u8>>,
    content_types: ContentTypes,
    presentation_part: String,
    presentation_rels: Relationships,
    existing: PresentationInfo,
    layout_part: String,
    slide_size: SlideSize,
    new_slides: Vec<SlideRef>,
    next_slide_id: u32,
    next_slide_number: u32,
    next_image_number: u32,
}

impl Deck {
    /// Start from the built-in widescreen template.
    pub fn new() -> Result<Self> {
        Self::from_parts(template::default_parts())
    }

    /// Start from a template presentation on disk.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgdeck::Deck;
    ///
    /// let deck = Deck::open_template("brand.pptx")?;
    /// println!("{} slides already", deck.slide_count());
    /// # Ok::<(), imgdeck::Error>(())
    /// ```
    pub fn open_template(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_parts(container.read_all()?)
    }

    /// Start from template bytes.
    pub fn from_template_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_parts(container.read_all()?)
    }

    /// Start from raw package parts.
    pub fn from_parts(parts: Vec<(String, Vec<u8>)>) -> Result<Self> {
        let parts: BTreeMap<String, Vec<u8>> = parts
            .into_iter()
            .map(|(name, data)| (name.trim_start_matches('/').to_string(), data))
            .collect();

        let mut types = ContentTypes::parse(&read_xml(&parts, CONTENT_TYPES_PART)?)?;

        let package_rels = read_rels(&parts, "")?;
        let presentation_part = package_rels
            .get_by_type(rel_type::OFFICE_DOCUMENT)
            .first()
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());
        if !parts.contains_key(&presentation_part) {
            return Err(Error::MissingComponent(presentation_part));
        }

        // A .potx opened as a template becomes a regular presentation
        if types.override_for(&presentation_part) == Some(content_types::TEMPLATE_MAIN) {
            types.set_override(&presentation_part, content_types::PRESENTATION_MAIN);
        }

        let existing = PresentationInfo::parse(&read_xml(&parts, &presentation_part)?)?;
        let presentation_rels = read_rels(&parts, &presentation_part)?;

        let layouts = collect_layouts(&parts, &presentation_part, &presentation_rels)?;
        let layout_part = choose_layout(&parts, &layouts)?;

        let next_slide_number =
            next_part_number(&parts, &sibling(&presentation_part, "slides/slide"));
        let next_image_number =
            next_part_number(&parts, &sibling(&presentation_part, "media/image"));
        let next_slide_id = existing.next_slide_id();

        Ok(Self {
            parts,
            content_types: types,
            presentation_part,
            presentation_rels,
            slide_size: existing.slide_size.unwrap_or_default(),
            existing,
            layout_part,
            new_slides: Vec::new(),
            next_slide_id,
            next_slide_number,
            next_image_number,
        })
    }

    pub fn slide_size(&self) -> SlideSize {
        self.slide_size
    }

    pub fn set_slide_size(&mut self, size: SlideSize) {
        self.slide_size = size;
    }

    /// Part name of the layout every new slide uses.
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    /// Slides in the deck, including those inherited from the template.
    pub fn slide_count(&self) -> usize {
        self.existing.slides.len() + self.new_slides.len()
    }

    /// Slides added since the deck was opened.
    pub fn added_slide_count(&self) -> usize {
        self.new_slides.len()
    }

    /// Append a slide holding one PNG picture at `frame`.
    ///
    /// Returns the 1-based position of the new slide in the deck.
    pub fn add_picture_slide(&mut self, png: Vec<u8>, description: &str, frame: Frame) -> usize {
        let slide_part = sibling(
            &self.presentation_part,
            &format!("slides/slide{}.xml", self.next_slide_number),
        );
        let image_part = sibling(
            &self.presentation_part,
            &format!("media/image{}.png", self.next_image_number),
        );
        self.next_slide_number += 1;
        self.next_image_number += 1;

        let mut slide_rels = Relationships::new();
        slide_rels.add(
            rel_type::SLIDE_LAYOUT,
            &OoxmlContainer::relative_path(&slide_part, &self.layout_part),
        );
        let embed_id = slide_rels.add(
            rel_type::IMAGE,
            &OoxmlContainer::relative_path(&slide_part, &image_part),
        );

        let xml = picture_slide_xml(&PictureShape {
            embed_id: &embed_id,
            description,
            frame,
        });

        self.content_types.set_override(&slide_part, content_types::SLIDE);
        self.content_types.add_default("png", content_types::PNG);

        let rel_id = self.presentation_rels.add(
            rel_type::SLIDE,
            &OoxmlContainer::relative_path(&self.presentation_part, &slide_part),
        );
        self.new_slides.push(SlideRef {
            id: self.next_slide_id,
            rel_id,
        });
        self.next_slide_id += 1;

        self.parts
            .insert(rels_path_for(&slide_part), slide_rels.to_xml().into_bytes());
        self.parts.insert(slide_part, xml.into_bytes());
        self.parts.insert(image_part, png);

        self.slide_count()
    }

    /// Serialize the deck as PPTX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the deck to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_to<W: Write + std::io::Seek>(&self, writer: W) -> Result<W> {
        let presentation = rewrite_presentation(
            &read_xml(&self.parts, &self.presentation_part)?,
            self.slide_size,
            &self.new_slides,
        )?;

        let mut parts = self.parts.clone();
        parts.insert(self.presentation_part.clone(), presentation.into_bytes());
        parts.insert(
            rels_path_for(&self.presentation_part),
            self.presentation_rels.to_xml().into_bytes(),
        );

        write_package(writer, &self.content_types, &parts)
    }
}

fn read_xml(parts: &BTreeMap<String, Vec<u8>>, name: &str) -> Result<String> {
    let data = parts
        .get(name)
        .ok_or_else(|| Error::MissingComponent(name.to_string()))?;
    decode_xml_bytes(data)
}

fn read_rels(parts: &BTreeMap<String, Vec<u8>>, owner: &str) -> Result<Relationships> {
    match parts.get(&rels_path_for(owner)) {
        Some(data) => Relationships::parse(&decode_xml_bytes(data)?),
        None => Ok(Relationships::new()),
    }
}

/// Part name `rest` in the directory of `part`.
fn sibling(part: &str, rest: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, rest),
        None => rest.to_string(),
    }
}

/// One past the largest N of parts named `<prefix>N.<ext>`, at least 1.
fn next_part_number(parts: &BTreeMap<String, Vec<u8>>, prefix: &str) -> u32 {
    parts
        .keys()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter_map(|rest| rest.split_once('.'))
        .filter_map(|(n, _)| n.parse::<u32>().ok())
        .max()
        .map_or(1, |n| n + 1)
}

/// Layout part names of every slide master, in master order.
fn collect_layouts(
    parts: &BTreeMap<String, Vec<u8>>,
    presentation_part: &str,
    presentation_rels: &Relationships,
) -> Result<Vec<String>> {
    let mut layouts = Vec::new();

    for master in presentation_rels.get_by_type(rel_type::SLIDE_MASTER) {
        let master_part = OoxmlContainer::resolve_path(presentation_part, &master.target);
        let master_rels = read_rels(parts, &master_part)?;
        let ordered = layout_rel_ids(&read_xml(parts, &master_part)?)?;

        let targets: Vec<&str> = if ordered.is_empty() {
            master_rels
                .get_by_type(rel_type::SLIDE_LAYOUT)
                .into_iter()
                .map(|r| r.target.as_str())
                .collect()
        } else {
            ordered
                .iter()
                .filter_map(|id| master_rels.get(id))
                .map(|r| r.target.as_str())
                .collect()
        };

        layouts.extend(
            targets
                .into_iter()
                .map(|t| OoxmlContainer::resolve_path(&master_part, t))
                .filter(|p| parts.contains_key(p)),
        );
    }

    Ok(layouts)
}

/// Relationship ids of a master's `sldLayoutIdLst`, in order.
fn layout_rel_ids(master_xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = quick_xml::Reader::from_str(master_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"sldLayoutId" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some() {
                        ids.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// Value of the `type` attribute on a layout's root element.
fn layout_type(layout_xml: &str) -> Result<Option<String>> {
    let mut reader = quick_xml::Reader::from_str(layout_xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let value = e
                    .try_get_attribute("type")?
                    .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                    .transpose()?;
                return Ok(value);
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
}

/// Pick the layout for new slides: the first blank one, else the one at
/// [`FALLBACK_LAYOUT_INDEX`], else the last.
fn choose_layout(parts: &BTreeMap<String, Vec<u8>>, layouts: &[String]) -> Result<String> {
    for layout in layouts {
        if layout_type(&read_xml(parts, layout)?)?.as_deref() == Some("blank") {
            return Ok(layout.clone());
        }
    }

    layouts
        .get(FALLBACK_LAYOUT_INDEX)
        .or_else(|| layouts.last())
        .cloned()
        .ok_or_else(|| Error::MissingComponent("slide layout".to_string()))
}

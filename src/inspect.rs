//! Reading generated decks back.
//!
//! Used by the `info` command and by tests to check where pictures landed.

use crate::container::{rel_type, OoxmlContainer, Relationships};
use crate::error::{Error, Result};
use crate::layout::Frame;
use crate::package::presentation::PresentationInfo;
use crate::units::{Emu, SlideSize};
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::path::Path;

/// A picture found on a slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PictureFrame {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frame: Frame,
    /// Package path of the embedded image, when the reference resolves
    pub target: Option<String>,
}

/// One slide of a deck.
#[derive(Debug, Clone, Serialize)]
pub struct SlideSummary {
    pub part: String,
    pub layout: Option<String>,
    pub pictures: Vec<PictureFrame>,
}

/// Slide size plus the pictures of every slide, in presentation order.
#[derive(Debug, Clone, Serialize)]
pub struct DeckSummary {
    pub slide_size: Option<SlideSize>,
    pub slides: Vec<SlideSummary>,
}

impl DeckSummary {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_container(&OoxmlContainer::open(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_container(&OoxmlContainer::from_bytes(data)?)
    }

    fn from_container(container: &OoxmlContainer) -> Result<Self> {
        let presentation_part = container
            .read_package_relationships()?
            .get_by_type(rel_type::OFFICE_DOCUMENT)
            .first()
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
            .ok_or_else(|| Error::MissingComponent("officeDocument relationship".into()))?;

        let info = PresentationInfo::parse(&container.read_xml(&presentation_part)?)?;
        let rels = container.read_relationships(&presentation_part)?;

        let mut slides = Vec::with_capacity(info.slides.len());
        for slide in &info.slides {
            let rel = rels
                .get(&slide.rel_id)
                .ok_or_else(|| Error::InvalidData(format!("dangling slide id {}", slide.rel_id)))?;
            let part = OoxmlContainer::resolve_path(&presentation_part, &rel.target);
            slides.push(summarize_slide(container, part)?);
        }

        Ok(Self {
            slide_size: info.slide_size,
            slides,
        })
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Every picture of the deck, slide by slide.
    pub fn pictures(&self) -> impl Iterator<Item = &PictureFrame> {
        self.slides.iter().flat_map(|s| s.pictures.iter())
    }
}

fn summarize_slide(container: &OoxmlContainer, part: String) -> Result<SlideSummary> {
    let xml = container.read_xml(&part)?;
    let rels = container.read_relationships(&part)?;

    let layout = rels
        .get_by_type(rel_type::SLIDE_LAYOUT)
        .first()
        .map(|rel| OoxmlContainer::resolve_path(&part, &rel.target));
    let pictures = parse_pictures(&xml, &part, &rels)?;

    Ok(SlideSummary {
        part,
        layout,
        pictures,
    })
}

#[derive(Default)]
struct PendingPicture {
    name: Option<String>,
    description: Option<String>,
    embed: Option<String>,
    offset: Option<(Emu, Emu)>,
    extent: Option<(Emu, Emu)>,
}

/// Collect `p:pic` shapes with their transform and image reference.
fn parse_pictures(xml: &str, part: &str, rels: &Relationships) -> Result<Vec<PictureFrame>> {
    let mut pictures = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current: Option<PendingPicture> = None;
    let mut in_sppr = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"pic" => current = Some(PendingPicture::default()),
                b"spPr" if current.is_some() => in_sppr = true,
                _ => {
                    if let Some(pic) = current.as_mut() {
                        read_picture_attrs(e, pic, in_sppr)?;
                    }
                }
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"spPr" => in_sppr = false,
                b"pic" => {
                    if let Some(pic) = current.take() {
                        pictures.push(finish_picture(pic, part, rels));
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

    Ok(pictures)
}

fn read_picture_attrs(e: &BytesStart<'_>, pic: &mut PendingPicture, in_sppr: bool) -> Result<()> {
    match e.local_name().as_ref() {
        b"cNvPr" => {
            pic.name = attr_string(e, b"name")?;
            pic.description = attr_string(e, b"descr")?;
        }
        b"blip" => {
            for attr in e.attributes().flatten() {
                if attr.key.local_name().as_ref() == b"embed" {
                    pic.embed = Some(attr.unescape_value()?.into_owned());
                }
            }
        }
        // Only the picture's own transform; group and child offsets are ignored
        b"off" if in_sppr => pic.offset = attr_pair(e, b"x", b"y")?.or(pic.offset),
        // `a:ext` also names extension entries, which carry no extent
        b"ext" if in_sppr => pic.extent = attr_pair(e, b"cx", b"cy")?.or(pic.extent),
        _ => {}
    }
    Ok(())
}

fn finish_picture(pic: PendingPicture, part: &str, rels: &Relationships) -> PictureFrame {
    let (x, y) = pic.offset.unwrap_or_default();
    let (width, height) = pic.extent.unwrap_or_default();
    let target = pic
        .embed
        .as_deref()
        .and_then(|id| rels.get(id))
        .filter(|rel| !rel.external)
        .map(|rel| OoxmlContainer::resolve_path(part, &rel.target));

    PictureFrame {
        name: pic.name,
        description: pic.description,
        frame: Frame {
            x,
            y,
            width,
            height,
        },
        target,
    }
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    match e.try_get_attribute(key)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn attr_pair(e: &BytesStart<'_>, a: &[u8], b: &[u8]) -> Result<Option<(Emu, Emu)>> {
    let parse = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok()).map(Emu);
    let first = parse(attr_string(e, a)?);
    let second = parse(attr_string(e, b)?);
    Ok(first.zip(second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;

    fn frame(x: i64, y: i64, width: i64, height: i64) -> Frame {
        Frame {
            x: Emu(x),
            y: Emu(y),
            width: Emu(width),
            height: Emu(height),
        }
    }

    #[test]
    fn test_summary_of_generated_deck() {
        let mut deck = Deck::new().unwrap();
        deck.add_picture_slide(b"png-1".to_vec(), "first.png", frame(0, 0, 100, 200));
        deck.add_picture_slide(b"png-2".to_vec(), "second.png", frame(-5, 7, 300, 400));

        let summary = DeckSummary::from_bytes(deck.to_bytes().unwrap()).unwrap();
        assert_eq!(summary.slide_size, Some(SlideSize::WIDESCREEN));
        assert_eq!(summary.slide_count(), 2);

        let second = &summary.slides[1].pictures[0];
        assert_eq!(second.frame, frame(-5, 7, 300, 400));
        assert_eq!(second.description.as_deref(), Some("second.png"));

        let targets: Vec<_> = summary.pictures().filter_map(|p| p.target.clone()).collect();
        assert_eq!(targets.len(), 2);
        assert_ne!(targets[0], targets[1]);
        assert!(targets.iter().all(|t| t.starts_with("ppt/media/")));

        for slide in &summary.slides {
            assert_eq!(slide.layout.as_deref(), Some(deck.layout_part()));
        }
    }

    #[test]
    fn test_group_transform_is_not_a_picture() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p" xmlns:r="r"><p:cSld><p:spTree>
            <p:grpSpPr><a:xfrm><a:off x="1" y="1"/><a:ext cx="1" cy="1"/></a:xfrm></p:grpSpPr>
            <p:pic><p:nvPicPr><p:cNvPr id="2" name="Picture 1"/></p:nvPicPr>
              <p:blipFill><a:blip r:embed="rId9"/></p:blipFill>
              <p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr>
            </p:pic></p:spTree></p:cSld></p:sld>"#;

        let pictures = parse_pictures(xml, "ppt/slides/slide1.xml", &Relationships::new()).unwrap();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].frame, frame(10, 20, 30, 40));
        assert_eq!(pictures[0].name.as_deref(), Some("Picture 1"));
        assert!(pictures[0].target.is_none());
    }

    #[test]
    fn test_not_a_package() {
        assert!(DeckSummary::from_bytes(b"plain text".to_vec()).is_err());
    }
}

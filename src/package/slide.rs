//! Slide part generation.

use crate::layout::Frame;
use quick_xml::escape::escape;
use std::fmt::Write as _;

/// A picture placed on a slide.
#[derive(Debug, Clone)]
pub struct PictureShape<'a> {
    /// Relationship ID of the embedded image
    pub embed_id: &'a str,
    /// Shown as the picture's alt text
    pub description: &'a str,
    pub frame: Frame,
}

/// Generate the XML of a slide holding a single picture.
///
/// Shape id 1 is the slide's group shape, so the picture takes id 2.
pub fn picture_slide_xml(picture: &PictureShape<'_>) -> String {
    let mut xml = String::with_capacity(1536);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="2" name="Picture 1" descr="{}"/>"#,
        escape(picture.description)
    );
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    let _ = write!(xml, r#"<a:blip r:embed="{}"/>"#, escape(picture.embed_id));
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    let frame = &picture.frame;
    xml.push_str("<p:spPr>");
    xml.push_str("<a:xfrm>");
    let _ = write!(xml, r#"<a:off x="{}" y="{}"/>"#, frame.x, frame.y);
    let _ = write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, frame.width, frame.height);
    xml.push_str("</a:xfrm>");
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");
    xml.push_str("</p:pic>");

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");

    xml
}

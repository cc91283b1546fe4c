//! Built-in widescreen template.
//!
//! One slide master, one blank layout and an Office theme: the smallest
//! package PowerPoint opens without repair.

macro_rules! part {
    ($name:literal) => {
        ($name, include_str!(concat!("../../resources/template/", $name)))
    };
}

/// Parts of the built-in template as `(part name, XML)`.
pub const DEFAULT_PARTS: &[(&str, &str)] = &[
    part!("[Content_Types].xml"),
    part!("_rels/.rels"),
    part!("docProps/core.xml"),
    part!("docProps/app.xml"),
    part!("ppt/presentation.xml"),
    part!("ppt/_rels/presentation.xml.rels"),
    part!("ppt/presProps.xml"),
    part!("ppt/viewProps.xml"),
    part!("ppt/tableStyles.xml"),
    part!("ppt/slideMasters/slideMaster1.xml"),
    part!("ppt/slideMasters/_rels/slideMaster1.xml.rels"),
    part!("ppt/slideLayouts/slideLayout1.xml"),
    part!("ppt/slideLayouts/_rels/slideLayout1.xml.rels"),
    part!("ppt/theme/theme1.xml"),
];

/// The built-in template as owned parts.
pub fn default_parts() -> Vec<(String, Vec<u8>)> {
    DEFAULT_PARTS
        .iter()
        .map(|(name, xml)| (name.to_string(), xml.as_bytes().to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{OoxmlContainer, Relationships};
    use crate::package::content_types::{ContentTypes, PRESENTATION_MAIN};

    #[test]
    fn test_every_part_is_well_formed() {
        for (name, xml) in DEFAULT_PARTS {
            let mut reader = quick_xml::Reader::from_str(xml);
            loop {
                match reader.read_event() {
                    Ok(quick_xml::events::Event::Eof) => break,
                    Ok(_) => {}
                    Err(e) => panic!("{} is malformed: {}", name, e),
                }
            }
        }
    }

    #[test]
    fn test_every_override_has_a_part() {
        let (_, xml) = DEFAULT_PARTS[0];
        let types = ContentTypes::parse(xml).unwrap();
        assert_eq!(types.override_for("/ppt/presentation.xml"), Some(PRESENTATION_MAIN));
        for (name, _) in DEFAULT_PARTS.iter().skip(1) {
            if name.ends_with(".rels") {
                continue;
            }
            assert!(
                types.override_for(name).is_some(),
                "{} has no content type override",
                name
            );
        }
    }

    #[test]
    fn test_relationship_targets_exist() {
        for (name, xml) in DEFAULT_PARTS.iter().filter(|(n, _)| n.ends_with(".rels")) {
            let owner = name.replace("_rels/", "");
            let owner = owner.trim_end_matches(".rels");
            let rels = Relationships::parse(xml).unwrap();
            for rel in rels.iter() {
                let target = OoxmlContainer::resolve_path(owner, &rel.target);
                assert!(
                    DEFAULT_PARTS.iter().any(|(n, _)| *n == target),
                    "{} points at missing {}",
                    name,
                    target
                );
            }
        }
    }
}

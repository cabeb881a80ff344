//! Writes a slide structure out as a PowerPoint (OOXML) package.
//!
//! Only the parts PowerPoint needs to open a deck are produced: one master, one blank
//! layout and one theme, with every slide drawn from absolutely positioned shapes.

use super::theme::Palette;
use super::{Slide, SlideStructure};
use crate::error::Error;
use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use study_ai::types::image::Image;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const EMU_PER_INCH: f64 = 914_400.0;
const SLIDE_WIDTH_IN: f64 = 10.0;
const SLIDE_HEIGHT_IN: f64 = 7.5;

const MAX_CONTENT_POINTS: usize = 5;
const MAX_SUMMARY_POINTS: usize = 3;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WHITE: &str = "FFFFFF";

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Position and size of a shape, in inches.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Frame {
    const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn xfrm(&self) -> String {
        format!(
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            emu(self.x),
            emu(self.y),
            emu(self.width),
            emu(self.height)
        )
    }
}

const FULL_SLIDE: Frame = Frame::new(0.0, 0.0, SLIDE_WIDTH_IN, SLIDE_HEIGHT_IN);

struct Paragraph<'a> {
    text: &'a str,
    /// Font size in points
    size: u32,
    bold: bool,
    color: &'a str,
    centered: bool,
    bullet: bool,
    /// Space before the paragraph in points
    space_before: u32,
}

impl<'a> Paragraph<'a> {
    fn new(text: &'a str, size: u32, color: &'a str) -> Self {
        Self {
            text,
            size,
            bold: false,
            color,
            centered: false,
            bullet: false,
            space_before: 0,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    fn bullet(mut self) -> Self {
        self.bullet = true;
        self
    }

    fn space_before(mut self, points: u32) -> Self {
        self.space_before = points;
        self
    }

    fn write(&self, xml: &mut String) {
        xml.push_str("<a:p><a:pPr");
        if self.centered {
            xml.push_str(r#" algn="ctr""#);
        }
        if self.bullet {
            xml.push_str(r#" marL="342900" indent="-342900""#);
        }
        xml.push('>');
        if self.space_before > 0 {
            let _ = write!(
                xml,
                r#"<a:spcBef><a:spcPts val="{}"/></a:spcBef>"#,
                self.space_before * 100
            );
        }
        if self.bullet {
            xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
        } else {
            xml.push_str("<a:buNone/>");
        }
        xml.push_str("</a:pPr>");
        let _ = write!(
            xml,
            r#"<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
            self.size * 100,
            u8::from(self.bold),
            self.color,
            escape(self.text)
        );
    }
}

/// Accumulates the shapes of one slide, handing out shape ids.
struct ShapeTree {
    next_id: u32,
    xml: String,
}

impl ShapeTree {
    fn new() -> Self {
        Self {
            // Id 1 belongs to the tree's own group shape
            next_id: 2,
            xml: String::new(),
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// A borderless filled rectangle. `alpha` is the opacity in thousandths of a percent.
    fn rect(&mut self, name: &str, frame: Frame, fill: &str, alpha: Option<u32>) {
        let id = self.id();
        let color = match alpha {
            Some(alpha) => format!(r#"<a:srgbClr val="{fill}"><a:alpha val="{alpha}"/></a:srgbClr>"#),
            None => format!(r#"<a:srgbClr val="{fill}"/>"#),
        };
        let _ = write!(
            self.xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill>{color}</a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#,
            frame.xfrm()
        );
    }

    fn text_box(&mut self, name: &str, frame: Frame, paragraphs: &[Paragraph]) {
        if paragraphs.is_empty() {
            return;
        }
        let id = self.id();
        let _ = write!(
            self.xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" anchor="t"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
            frame.xfrm()
        );
        for paragraph in paragraphs {
            paragraph.write(&mut self.xml);
        }
        self.xml.push_str("</p:txBody></p:sp>");
    }

    fn picture(&mut self, rel_id: &str, frame: Frame) {
        let id = self.id();
        let _ = write!(
            self.xml,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            frame.xfrm()
        );
    }

    fn into_slide_xml(self) -> String {
        format!(
            r#"{XML_DECL}<p:sld {NS}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
            GROUP_HEADER, self.xml
        )
    }
}

const GROUP_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn title_slide(structure: &SlideStructure, slide: &Slide) -> String {
    let mut tree = ShapeTree::new();
    let heading = first_non_empty(&[slide.heading.as_str(), structure.title.as_str()], "Presentation Title");
    let subtitle = first_non_empty(
        &[
            slide.subtitle.as_deref().unwrap_or_default(),
            structure.subtitle.as_str(),
        ],
        "",
    );

    tree.rect("Band", Frame::new(0.0, 2.5, SLIDE_WIDTH_IN, 2.5), "000000", Some(70_000));
    tree.text_box(
        "Title",
        Frame::new(0.5, 2.8, 9.0, 1.2),
        &[Paragraph::new(heading, 54, WHITE).bold().centered()],
    );
    if !subtitle.is_empty() {
        tree.text_box(
            "Subtitle",
            Frame::new(0.5, 4.2, 9.0, 0.8),
            &[Paragraph::new(subtitle, 24, WHITE).centered()],
        );
    }
    tree.into_slide_xml()
}

fn content_slide(slide: &Slide, palette: Palette, image_rel: Option<&str>) -> String {
    let mut tree = ShapeTree::new();
    tree.rect("Background", FULL_SLIDE, palette.background, None);

    if let Some(rel_id) = image_rel {
        tree.picture(rel_id, Frame::new(5.5, 1.8, 4.0, 3.0));
    }

    tree.text_box(
        "Title",
        Frame::new(0.5, 0.4, 9.0, 0.8),
        &[Paragraph::new(first_non_empty(&[slide.heading.as_str()], "Slide Title"), 40, palette.title).bold()],
    );

    let width = if image_rel.is_some() { 4.5 } else { 9.0 };
    let points: Vec<Paragraph> = slide
        .points
        .iter()
        .take(MAX_CONTENT_POINTS)
        .map(|point| {
            Paragraph::new(point, 20, palette.text)
                .bullet()
                .space_before(12)
        })
        .collect();
    tree.text_box("Content", Frame::new(0.8, 1.8, width, 5.0), &points);

    tree.into_slide_xml()
}

fn summary_slide(slide: &Slide, palette: Palette) -> String {
    let mut tree = ShapeTree::new();
    tree.rect("Background", FULL_SLIDE, palette.gradient_start, None);
    tree.text_box(
        "Title",
        Frame::new(1.0, 2.5, 8.0, 1.5),
        &[Paragraph::new(first_non_empty(&[slide.heading.as_str()], "Thank You"), 54, WHITE)
            .bold()
            .centered()],
    );

    let points: Vec<Paragraph> = slide
        .points
        .iter()
        .take(MAX_SUMMARY_POINTS)
        .map(|point| {
            Paragraph::new(point, 18, WHITE)
                .centered()
                .space_before(8)
        })
        .collect();
    tree.text_box("Takeaways", Frame::new(2.0, 4.2, 6.0, 2.0), &points);

    tree.into_slide_xml()
}

fn first_non_empty<'a>(candidates: &[&'a str], default: &'a str) -> &'a str {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or(default)
}

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="jpeg" ContentType="image/jpeg"/><Default Extension="png" ContentType="image/png"/><Default Extension="gif" ContentType="image/gif"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_NS}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn core_properties(title: &str) -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>EduGen</dc:creator></cp:coreProperties>"#,
        escape(title)
    )
}

fn app_properties(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>EduGen</Application><Slides>{slide_count}</Slides></Properties>"#
    )
}

fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for n in 0..slide_count {
        let _ = write!(
            slide_ids,
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + n,
            3 + n
        );
    }
    format!(
        r#"{XML_DECL}<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        emu(SLIDE_WIDTH_IN),
        emu(SLIDE_HEIGHT_IN)
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="{REL_NS}/theme" Target="theme/theme1.xml"/>"#
    );
    for n in 0..slide_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{REL_NS}/slide" Target="slides/slide{}.xml"/>"#,
            3 + n,
            1 + n
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster {NS}><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{GROUP_HEADER}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_master_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_NS}/theme" Target="../theme/theme1.xml"/></Relationships>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout {NS} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{GROUP_HEADER}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn slide_layout_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
    )
}

fn slide_rels(image_target: Option<&str>) -> String {
    let image = image_target
        .map(|target| {
            format!(r#"<Relationship Id="rId2" Type="{REL_NS}/image" Target="../media/{target}"/>"#)
        })
        .unwrap_or_default();
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>{image}</Relationships>"#
    )
}

fn theme(palette: Palette) -> String {
    let fills = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#.repeat(3);
    let lines =
        r#"<a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#.repeat(3);
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);
    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    format!(
        r#"{XML_DECL}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="EduGen"><a:themeElements><a:clrScheme name="EduGen"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="{title}"/></a:dk2><a:lt2><a:srgbClr val="{background}"/></a:lt2><a:accent1><a:srgbClr val="{accent}"/></a:accent1><a:accent2><a:srgbClr val="{gradient}"/></a:accent2><a:accent3><a:srgbClr val="{text}"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="EduGen"><a:majorFont>{font}</a:majorFont><a:minorFont>{font}</a:minorFont></a:fontScheme><a:fmtScheme name="EduGen"><a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst><a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#,
        title = palette.title,
        background = palette.background,
        accent = palette.accent,
        gradient = palette.gradient_start,
        text = palette.text,
    )
}

/// Renders `structure` into the bytes of a `.pptx` file.
///
/// `images[i]` is placed on slide `i` when that slide is a content slide.
pub fn render(
    structure: &SlideStructure,
    palette: Palette,
    images: &[Option<Image>],
) -> Result<Vec<u8>, Error> {
    let slide_count = structure.slides.len();
    let mut parts: Vec<(String, Vec<u8>)> = vec![
        ("[Content_Types].xml".to_string(), content_types(slide_count).into_bytes()),
        ("_rels/.rels".to_string(), package_rels().into_bytes()),
        ("docProps/core.xml".to_string(), core_properties(&structure.title).into_bytes()),
        ("docProps/app.xml".to_string(), app_properties(slide_count).into_bytes()),
        ("ppt/presentation.xml".to_string(), presentation(slide_count).into_bytes()),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels(slide_count).into_bytes(),
        ),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master().into_bytes()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            slide_master_rels().into_bytes(),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), slide_layout().into_bytes()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            slide_layout_rels().into_bytes(),
        ),
        ("ppt/theme/theme1.xml".to_string(), theme(palette).into_bytes()),
    ];

    for (idx, slide) in structure.slides.iter().enumerate() {
        let number = idx + 1;
        let mut image_target = None;

        let xml = match slide.slide_type.as_str() {
            "title" => title_slide(structure, slide),
            "summary" => summary_slide(slide, palette),
            _ => {
                if let Some(Some(image)) = images.get(idx) {
                    let target = format!("image{number}.{}", image.extension());
                    parts.push((format!("ppt/media/{target}"), image.bytes.clone()));
                    image_target = Some(target);
                }
                content_slide(slide, palette, image_target.as_ref().map(|_| "rId2"))
            }
        };

        parts.push((format!("ppt/slides/slide{number}.xml"), xml.into_bytes()));
        parts.push((
            format!("ppt/slides/_rels/slide{number}.xml.rels"),
            slide_rels(image_target.as_deref()).into_bytes(),
        ));
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}

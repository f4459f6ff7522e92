mod common;

use common::{PptxFixture, auto_shape};
use slidescene::ooxml::opc::Package;
use slidescene::ooxml::opc::constants::relationship_type as rt;
use slidescene::{ConvertOptions, Error, Paint, PathCommand, SceneObject, pptx_to_scene, scene_json_to_pptx, scene_to_pptx};

const PT: i64 = 12_700;

#[test]
fn rectangle_survives_round_trip() {
    let source = PptxFixture::new()
        .shapes(&auto_shape(
            2,
            "rect",
            (100 * PT, 100 * PT),
            (200 * PT, 50 * PT),
            r#"<a:solidFill><a:srgbClr val="4472C4"/></a:solidFill>"#,
        ))
        .build();
    let options = ConvertOptions::default();
    let slides = pptx_to_scene(&source, &options).unwrap();

    let rebuilt = scene_to_pptx(&slides, &options).unwrap();
    let again = pptx_to_scene(&rebuilt, &options).unwrap();

    assert_eq!(again.len(), 1);
    assert_eq!((again[0].width, again[0].height), (720.0, 540.0));
    let SceneObject::Rect(rect) = &again[0].objects[0] else {
        panic!("expected a rect, got {:?}", again[0].objects);
    };
    let b = &rect.base;
    assert_eq!((b.left, b.top, b.width, b.height), (100.0, 100.0, 200.0, 50.0));
    assert_eq!(b.fill, Some(Paint::Color("#4472c4".to_string())));
    assert_eq!(b.stroke.as_deref(), Some("#000000"));
}

fn first_arc(slides: &[slidescene::SceneSlide]) -> PathCommand {
    let SceneObject::Path(path) = &slides[0].objects[0] else {
        panic!("expected a path, got {:?}", slides[0].objects);
    };
    *path
        .path
        .0
        .iter()
        .find(|c| matches!(c, PathCommand::ArcTo { .. }))
        .expect("arc")
}

#[test]
fn arc_angles_survive_round_trip() {
    // A half circle starting at the top (270 degrees), sweeping 180 clockwise.
    let freeform = format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Arc"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{d}" cy="{d}"/></a:xfrm><a:custGeom><a:avLst/><a:gdLst/><a:ahLst/><a:cxnLst/><a:rect l="l" t="t" r="r" b="b"/><a:pathLst><a:path w="{d}" h="{d}"><a:moveTo><a:pt x="{r}" y="0"/></a:moveTo><a:arcTo wR="{r}" hR="{r}" stAng="16200000" swAng="10800000"/></a:path></a:pathLst></a:custGeom></p:spPr></p:sp>"#,
        d = 100 * PT,
        r = 50 * PT
    );
    let options = ConvertOptions::default();
    let slides = pptx_to_scene(&PptxFixture::new().shapes(&freeform).build(), &options).unwrap();
    let PathCommand::ArcTo { angles, .. } = first_arc(&slides) else { unreachable!() };
    assert_eq!(angles, Some((270.0, 180.0)));

    let json = serde_json::to_string(&slides).unwrap();
    assert!(json.contains("270.0,180.0]"), "{json}");

    let rebuilt = scene_json_to_pptx(&json, &options).unwrap();
    let again = pptx_to_scene(&rebuilt, &options).unwrap();
    let PathCommand::ArcTo { rx, ry, angles, .. } = first_arc(&again) else { unreachable!() };
    assert!((rx - 50.0).abs() < 1e-6 && (ry - 50.0).abs() < 1e-6);
    assert_eq!(angles, Some((270.0, 180.0)));
}

#[test]
fn scene_json_builds_every_object_kind() {
    let json = r##"{"fabric": [
        {"width": 960, "height": 540, "background": "#fafafa", "objects": [
            {"type": "rect", "left": 10, "top": 10, "width": 100, "height": 40, "fill": "#ff8800", "stroke": "#000000", "strokeWidth": 2},
            {"type": "triangle", "left": 150, "top": 10, "width": 40, "height": 40, "angle": 180, "fill": "rgb(0, 128, 0)"},
            {"type": "textbox", "left": 10, "top": 80, "width": 300, "height": 30, "text": "Hello, world",
             "fontFamily": "Georgia", "fontSize": "24", "fontWeight": "bold", "textAlign": "right", "fill": "#222222"},
            {"type": "path", "left": 400, "top": 100, "fill": "transparent", "stroke": "#0000ff",
             "path": [["M", 0, 0], ["L", 50, 0], ["C", 60, 10, 60, 40, 50, 50], ["Z"]]},
            {"type": "image", "left": 500, "top": 300, "width": 20, "height": 20,
             "src": "data:image/png;base64,iVBORw0KGgo="},
            {"type": "group", "objects": [
                {"type": "rect", "left": 600, "top": 10, "width": 10, "height": 10, "fill": "#123456"}
            ]},
            {"type": "mystery", "left": 1, "top": 1}
        ]}
    ]}"##;
    let options = ConvertOptions::default();
    let bytes = scene_json_to_pptx(json, &options).unwrap();

    let package = Package::from_bytes(&bytes).unwrap();
    let main = package.main_document().unwrap();
    let slide_uri = package.rels(&main).unwrap().target_of_type(rt::SLIDE).unwrap();
    let image_uri = package.rels(&slide_uri).unwrap().target_of_type(rt::IMAGE).unwrap();
    assert_eq!(package.content_type(&image_uri), Some("image/png"));

    let slides = pptx_to_scene(&bytes, &options).unwrap();
    let slide = &slides[0];
    assert_eq!((slide.width, slide.height), (960.0, 540.0));
    assert_eq!(
        slide.background.as_deref().and_then(|b| b.base().fill.clone()),
        Some(Paint::Color("#fafafa".to_string()))
    );

    let kinds: Vec<&str> = slide.objects.iter().map(SceneObject::kind).collect();
    assert_eq!(kinds, vec!["rect", "triangle", "textbox", "path", "image", "rect"]);

    let SceneObject::Rect(rect) = &slide.objects[0] else { unreachable!() };
    assert_eq!(rect.base.stroke_width, Some(2.0));

    let SceneObject::Triangle(triangle) = &slide.objects[1] else { unreachable!() };
    assert_eq!(triangle.base.angle, 180.0);
    assert_eq!(triangle.base.fill, Some(Paint::Color("#008000".to_string())));

    let SceneObject::Textbox(textbox) = &slide.objects[2] else { unreachable!() };
    assert_eq!(textbox.text, "Hello, world");
    assert_eq!(textbox.font_family, "Georgia");
    assert_eq!(textbox.font_size, 24.0);
    assert_eq!(textbox.font_weight, "bold");
    assert_eq!(textbox.text_align, "right");
    assert_eq!(textbox.base.fill, Some(Paint::Color("#222222".to_string())));

    let SceneObject::Path(path) = &slide.objects[3] else { unreachable!() };
    assert_eq!(path.base.stroke.as_deref(), Some("#0000ff"));
    assert!(path.base.fill.as_ref().is_some_and(Paint::is_transparent));
    assert_eq!((path.base.width, path.base.height), (60.0, 50.0));

    let SceneObject::Image(image) = &slide.objects[4] else { unreachable!() };
    assert!(image.src.starts_with("data:image/png;base64,"));

    assert_eq!(slide.objects[5].base().left, 600.0);
}

#[test]
fn empty_scene_gets_default_size() {
    let options = ConvertOptions::default();
    let bytes = scene_to_pptx(&[], &options).unwrap();
    let reread = pptx_to_scene(&bytes, &options).unwrap();
    assert!(reread.is_empty());

    let package = Package::from_bytes(&bytes).unwrap();
    let pres = package.xml(&package.main_document().unwrap()).unwrap();
    let size = pres.child("p:sldSz").unwrap();
    assert_eq!((size.attr_i64("cx"), size.attr_i64("cy")), (Some(9_144_000), Some(6_858_000)));
}

#[test]
fn malformed_scene_json_is_rejected() {
    let options = ConvertOptions::default();
    assert!(matches!(scene_json_to_pptx("[{", &options), Err(Error::Json(_))));
    assert!(matches!(
        scene_json_to_pptx(r#"{"slides": []}"#, &options),
        Err(Error::InvalidFormat(_))
    ));
}

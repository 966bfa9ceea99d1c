use super::*;

#[test]
fn parses_transparent_sentinel() {
    assert_eq!(ColorSpec::parse("transparent").unwrap(), ColorSpec::Transparent);
    assert_eq!(ColorSpec::parse("  Transparent ").unwrap(), ColorSpec::Transparent);
    assert_eq!(ColorSpec::Transparent.solid(), None);
}

#[test]
fn parses_names_case_insensitive() {
    assert_eq!(
        ColorSpec::parse("White").unwrap(),
        ColorSpec::Solid(Rgba8::opaque(255, 255, 255))
    );
    assert_eq!(
        ColorSpec::parse("grey").unwrap(),
        ColorSpec::parse("gray").unwrap()
    );
    assert!(ColorSpec::parse("notacolor").is_err());
}

#[test]
fn parses_hex_forms() {
    assert_eq!(
        ColorSpec::parse("#f00").unwrap(),
        ColorSpec::Solid(Rgba8::opaque(255, 0, 0))
    );
    assert_eq!(
        ColorSpec::parse("#00FF00").unwrap(),
        ColorSpec::Solid(Rgba8::opaque(0, 255, 0))
    );
    assert_eq!(
        ColorSpec::parse("#0000ff80").unwrap(),
        ColorSpec::Solid(Rgba8::new(0, 0, 255, 128))
    );
    assert!(ColorSpec::parse("#12345").is_err());
    assert!(ColorSpec::parse("#gg0000").is_err());
}

#[test]
fn parses_rgb_functions() {
    assert_eq!(
        ColorSpec::parse("rgb(10, 20, 30)").unwrap(),
        ColorSpec::Solid(Rgba8::opaque(10, 20, 30))
    );
    assert_eq!(
        ColorSpec::parse("rgba(10,20,30,0.5)").unwrap(),
        ColorSpec::Solid(Rgba8::new(10, 20, 30, 128))
    );
    assert_eq!(
        ColorSpec::parse("rgba(10,20,30,200)").unwrap(),
        ColorSpec::Solid(Rgba8::new(10, 20, 30, 200))
    );
    assert!(ColorSpec::parse("rgb(1,2)").is_err());
    assert!(ColorSpec::parse("rgb(300,0,0)").is_err());
}

#[test]
fn parse_solid_rejects_transparent() {
    assert!(ColorSpec::parse_solid("transparent", "font color").is_err());
    assert_eq!(
        ColorSpec::parse_solid("black", "font color").unwrap(),
        Rgba8::BLACK
    );
}

#[test]
fn serde_uses_string_form() {
    let c: ColorSpec = serde_json::from_str("\"#ff0000\"").unwrap();
    assert_eq!(c, ColorSpec::Solid(Rgba8::opaque(255, 0, 0)));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#ff0000ff\"");
    let t: ColorSpec = serde_json::from_str("\"transparent\"").unwrap();
    assert_eq!(t, ColorSpec::Transparent);
}

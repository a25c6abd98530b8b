use microdata2rdf::datatype::infer;
use rstest::*;

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

#[rstest]
#[case("2014", Some("gYear"))]
#[case("2014-07-10", Some("date"))]
#[case("2014-07-10T12:30:00", Some("dateTime"))]
#[case("2014-07-10T12:30:00Z", Some("dateTime"))]
#[case("2014-07-10T12:30:00.25+02:00", Some("dateTime"))]
#[case("12:30:00", Some("time"))]
#[case("12:30:00.5", Some("time"))]
#[case("P3D", Some("duration"))]
#[case("PT2H30M", Some("duration"))]
#[case("P1Y2M3DT4H5M6S", Some("duration"))]
#[case("P1H2M3S", None)]
#[case("14", None)]
#[case("July 10", None)]
#[case("2014-07-10 12:30", None)]
#[case("", None)]
fn time_values(#[case] value: &str, #[case] expected: Option<&str>) {
    let expected = expected.map(|local| format!("{XSD}{local}"));
    assert_eq!(infer(value, "time", None), expected);
}

#[rstest]
#[case("span")]
#[case("meta")]
#[case("")]
fn other_elements_are_untyped(#[case] element: &str) {
    assert_eq!(infer("2014-07-10", element, None), None);
}

#[test]
fn registry_datatype_always_wins() {
    let string = format!("{XSD}string");
    assert_eq!(infer("2014", "time", Some(&string)), Some(string.clone()));
    assert_eq!(infer("hello", "span", Some(&string)), Some(string));
}

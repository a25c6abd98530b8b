//! Datatype inference for literal values.

use std::str::FromStr;
use std::sync::LazyLock;

use oxrdf::vocab::xsd;
use regex::Regex;

const DATE: &str = "[0-9]{4}-[01][0-9]-[0-3][0-9]";
const TIME: &str = r"[0-2][0-9]:[0-6][0-9]:[0-6][0-9](\.[0-9]+)?";
const TZ: &str = "(Z|[+-][0-2][0-9]:[0-6][0-9])";

static G_YEAR: LazyLock<Regex> = LazyLock::new(|| anchored("[0-9]{4}"));
static DATE_ONLY: LazyLock<Regex> = LazyLock::new(|| anchored(DATE));
static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| anchored(&format!("{DATE}T{TIME}{TZ}?")));
static TIME_ONLY: LazyLock<Regex> = LazyLock::new(|| anchored(TIME));

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^{pattern}$")).expect("datatype patterns are valid")
}

/// Determines the datatype IRI of a literal.
///
/// A datatype declared in the registry always wins. Otherwise only values
/// taken from a `time` element are inspected; the first matching lexical
/// form out of `xsd:gYear`, `xsd:date`, `xsd:dateTime`, `xsd:time` and
/// `xsd:duration` is chosen.
pub fn infer(value: &str, element: &str, registry_datatype: Option<&str>) -> Option<String> {
    if let Some(datatype) = registry_datatype {
        return Some(datatype.to_string());
    }

    if element != "time" {
        return None;
    }

    let datatype = if G_YEAR.is_match(value) {
        xsd::G_YEAR
    } else if DATE_ONLY.is_match(value) {
        xsd::DATE
    } else if DATE_TIME.is_match(value) {
        xsd::DATE_TIME
    } else if TIME_ONLY.is_match(value) {
        xsd::TIME
    } else if oxsdatatypes::Duration::from_str(value).is_ok() {
        xsd::DURATION
    } else {
        return None;
    };

    tracing::trace!(value, %datatype, "inferred datatype");
    Some(datatype.as_str().to_string())
}

use std::{path::Path, sync::LazyLock};

use regex::{Captures, Regex};

static SEPARATORS_AND_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[_.\- ]+([\p{Alphabetic}\p{N}_]|$)").expect("separator pattern is valid")
});
static NUMBERS_AND_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+([\p{Alphabetic}\p{N}_]|$)").expect("number pattern is valid")
});

const SEPARATORS: [char; 4] = ['_', '.', '-', ' '];

/// Naming rule for one source pattern.
#[derive(Debug)]
pub struct Formatter {
    prefix: String,
    suffix: String,
    replace: Option<(Regex, String)>,
}

impl Formatter {
    pub fn new(prefix: String, suffix: String, replace: Option<(Regex, String)>) -> Self {
        Self {
            prefix,
            suffix,
            replace,
        }
    }

    pub fn format(&self, name: &str) -> String {
        let body = match &self.replace {
            Some((pattern, with)) => pattern.replace(name, with.as_str()),
            None => name.into(),
        };
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

/// Exported component name for an icon file, or `None` if the path has no
/// file name.
pub fn icon_name(file: &Path, formatter: Option<&Formatter>) -> Option<String> {
    let stem = file.file_stem()?.to_string_lossy();
    let name = pascal_case(&stem);
    match formatter.map(|f| f.format(&name)) {
        Some(formatted) if !formatted.is_empty() => Some(formatted),
        _ => Some(name),
    }
}

/// Converts a file name like `arrow-left` or `ic_3d_rotation_24px` into
/// `ArrowLeft` / `Ic3DRotation24Px`.
///
/// Separator runs are dropped and the character after them capitalized, the
/// character following a digit run is capitalized, and existing camel-case
/// boundaries survive.
pub fn pascal_case(input: &str) -> String {
    let input = input.trim();
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (None, _) => return String::new(),
        (Some(c), None) => return c.to_uppercase().collect(),
        _ => {}
    }

    let marked;
    let input = if input != input.to_lowercase() {
        marked = mark_camel_case(input);
        marked.as_str()
    } else {
        input
    };
    let lower = input.trim_start_matches(SEPARATORS).to_lowercase();

    let mut chars = lower.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return String::new(),
    };

    let joined = SEPARATORS_AND_IDENTIFIER
        .replace_all(&capitalized, |caps: &Captures| caps[1].to_uppercase());
    NUMBERS_AND_IDENTIFIER
        .replace_all(&joined, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

// Inserts `-` at lower-to-upper transitions and before the last capital of an
// upper-case run that is followed by a lower-case letter ("XMLHttp" becomes
// "XML-Http"), so the boundaries survive lower-casing.
fn mark_camel_case(input: &str) -> String {
    let mut chars: Vec<char> = input.chars().collect();
    let mut last_lower = false;
    let mut last_upper = false;
    let mut last_last_upper = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if last_lower && c.is_uppercase() {
            chars.insert(i, '-');
            last_lower = false;
            last_last_upper = last_upper;
            last_upper = true;
            i += 1;
        } else if last_upper && last_last_upper && c.is_lowercase() {
            // Re-examines `c` on the next pass, now preceded by the marker.
            chars.insert(i - 1, '-');
            last_last_upper = last_upper;
            last_upper = false;
            last_lower = true;
        } else {
            last_lower = is_cased_lower(c);
            last_last_upper = last_upper;
            last_upper = is_cased_upper(c);
        }
        i += 1;
    }
    chars.into_iter().collect()
}

fn is_cased_lower(c: char) -> bool {
    c.to_lowercase().eq([c]) && !c.to_uppercase().eq([c])
}

fn is_cased_upper(c: char) -> bool {
    c.to_uppercase().eq([c]) && !c.to_lowercase().eq([c])
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn pascal_case_file_names() {
        assert_eq!(pascal_case("arrow-left"), "ArrowLeft");
        assert_eq!(pascal_case("arrow_left"), "ArrowLeft");
        assert_eq!(pascal_case("arrow.left"), "ArrowLeft");
        assert_eq!(pascal_case("  arrow left "), "ArrowLeft");
        assert_eq!(pascal_case("wi-day-sunny"), "WiDaySunny");
        assert_eq!(pascal_case("500px"), "500Px");
        assert_eq!(pascal_case("ic_3d_rotation_24px"), "Ic3DRotation24Px");
        assert_eq!(pascal_case("--leading"), "Leading");
        assert_eq!(pascal_case("trailing-"), "Trailing");
        assert_eq!(pascal_case("x"), "X");
        assert_eq!(pascal_case(""), "");
        assert_eq!(pascal_case("---"), "");
    }

    #[test]
    fn pascal_case_keeps_camel_case_boundaries() {
        assert_eq!(pascal_case("arrowLeft"), "ArrowLeft");
        assert_eq!(pascal_case("XMLHttpRequest"), "XmlHttpRequest");
        assert_eq!(pascal_case("ARROW"), "Arrow");
        assert_eq!(pascal_case("Github-Alt"), "GithubAlt");
    }

    #[test]
    fn formatter_prefix_and_suffix() {
        let f = Formatter::new("Hi".into(), "Solid".into(), None);
        assert_eq!(f.format("AcademicCap"), "HiAcademicCapSolid");
    }

    #[test]
    fn formatter_replaces_first_match() {
        let f = Formatter::new(
            String::new(),
            String::new(),
            Some((Regex::new(r"(?i)Ic(\w+)24px").unwrap(), "Md${1}".into())),
        );
        assert_eq!(f.format("IcAcUnit24Px"), "MdAcUnit");
        assert_eq!(f.format("Unrelated"), "Unrelated");
    }

    #[test]
    fn icon_names() {
        let io = Formatter::new("Io".into(), String::new(), None);
        assert_eq!(
            icon_name(&PathBuf::from("/icons/arrow-left.svg"), Some(&io)).as_deref(),
            Some("IoArrowLeft")
        );
        assert_eq!(
            icon_name(&PathBuf::from("/icons/arrow_left.svg"), Some(&io)).as_deref(),
            Some("IoArrowLeft")
        );
        assert_eq!(
            icon_name(&PathBuf::from("wi-rain.svg"), None).as_deref(),
            Some("WiRain")
        );

        let empty = Formatter::new(
            String::new(),
            String::new(),
            Some((Regex::new(".*").unwrap(), String::new())),
        );
        assert_eq!(
            icon_name(&PathBuf::from("fallback.svg"), Some(&empty)).as_deref(),
            Some("Fallback")
        );
    }
}

use super::model::{CoordinateAssignment, CoordinateValue};

/// What a run file declares before its first data line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHeader {
    /// Independent-variable settings of the run.
    pub coordinates: CoordinateAssignment,
    /// Column names, in column order. Empty if the header declared none.
    pub variables: Vec<String>,
}

/// A data line starts with an ASCII digit; everything before the first one is
/// header.
pub fn is_data_line(line: &str) -> bool {
    line.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// Scan header lines up to (not including) the first data line.
///
/// Every `name = value` pair on any header line becomes a coordinate. The
/// variable names come from the last non-blank header line, split on
/// whitespace after dropping a leading `#` comment marker.
pub fn parse_header<'a, I>(lines: I) -> RunHeader
where
    I: IntoIterator<Item = &'a str>,
{
    let mut coordinates = CoordinateAssignment::new();
    let mut last_header_line = None;

    for line in lines {
        if is_data_line(line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        for (name, value) in coordinate_pairs(line) {
            coordinates.insert(name, value);
        }
        last_header_line = Some(line);
    }

    let variables = last_header_line
        .map(|line| {
            line.trim_start()
                .trim_start_matches('#')
                .split_whitespace()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    RunHeader {
        coordinates,
        variables,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '.' | '_' | '-')
}

/// Every `name = value[,]` occurrence on one line.
fn coordinate_pairs(line: &str) -> Vec<(String, CoordinateValue)> {
    let mut pairs = Vec::new();
    let mut rest = line;

    while let Some(eq) = rest.find(" = ") {
        let before = &rest[..eq];
        let name_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_name_char(*c))
            .last()
            .map_or(before.len(), |(i, _)| i);
        let name = &before[name_start..];

        let after = &rest[eq + 3..];
        let end = after.find(',').unwrap_or(after.len());
        if !name.is_empty() {
            pairs.push((name.to_string(), coerce_value(&after[..end])));
        }
        rest = &after[end..];
    }
    pairs
}

/// Number if it parses as one, else a boolean if it mentions `true` or
/// `false` (case-insensitively), else text.
pub fn coerce_value(raw: &str) -> CoordinateValue {
    let value = raw.trim();
    if looks_numeric(value) {
        if let Ok(v) = value.parse::<f64>() {
            // `-0` and `0` are the same setting.
            return CoordinateValue::Number(v + 0.0);
        }
    }
    let lower = value.to_ascii_lowercase();
    if lower.contains("true") {
        CoordinateValue::Boolean(true)
    } else if lower.contains("false") {
        CoordinateValue::Boolean(false)
    } else {
        CoordinateValue::Text(value.to_string())
    }
}

// `f64::from_str` also accepts "inf" and "NaN", which are not numbers here.
fn looks_numeric(value: &str) -> bool {
    value
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

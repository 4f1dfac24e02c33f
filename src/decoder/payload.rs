//! Student identity payload parsing
//!
//! Sheet QR codes carry the student identity in one of several encodings.
//! Parsers are tried in order and the first one that recognises the payload
//! wins:
//!
//! 1. JSON object with camelCase, short or snake_case keys
//! 2. `studentId|studentName|testId|testDate|grade`
//! 3. The same fields separated by commas
//! 4. The whole payload as a bare student id

use serde_json::{Map, Value};

use crate::models::{StudentInfo, UNKNOWN};

type PayloadParser = fn(&str) -> Option<StudentInfo>;

const PARSERS: [PayloadParser; 4] = [parse_json, parse_pipe, parse_comma, parse_bare_id];

const STUDENT_ID_KEYS: [&str; 3] = ["studentId", "id", "student_id"];
const STUDENT_NAME_KEYS: [&str; 3] = ["studentName", "name", "student_name"];
const TEST_ID_KEYS: [&str; 3] = ["testId", "test", "test_id"];
const TEST_DATE_KEYS: [&str; 3] = ["testDate", "date", "test_date"];
const GRADE_KEYS: [&str; 3] = ["grade", "class", "level"];

/// Parse a decoded QR payload; `None` for an empty payload.
pub fn parse_student_info(payload: &str) -> Option<StudentInfo> {
    if payload.trim().is_empty() {
        return None;
    }
    PARSERS.iter().find_map(|parse| parse(payload))
}

fn parse_json(payload: &str) -> Option<StudentInfo> {
    let trimmed = payload.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    let object = value.as_object()?;

    Some(StudentInfo {
        student_id: lookup(object, &STUDENT_ID_KEYS).unwrap_or_else(unknown),
        student_name: lookup(object, &STUDENT_NAME_KEYS).unwrap_or_else(unknown),
        test_id: lookup(object, &TEST_ID_KEYS).unwrap_or_else(unknown),
        test_date: lookup(object, &TEST_DATE_KEYS),
        grade: lookup(object, &GRADE_KEYS),
    })
}

/// First alias holding a non-empty string or a number.
fn lookup(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn parse_pipe(payload: &str) -> Option<StudentInfo> {
    parse_delimited(payload, '|')
}

fn parse_comma(payload: &str) -> Option<StudentInfo> {
    parse_delimited(payload, ',')
}

fn parse_delimited(payload: &str, separator: char) -> Option<StudentInfo> {
    if !payload.contains(separator) {
        return None;
    }
    let parts: Vec<&str> = payload.split(separator).map(str::trim).collect();
    let field = |i: usize| {
        parts
            .get(i)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
    };

    Some(StudentInfo {
        student_id: field(0).unwrap_or_else(unknown),
        student_name: field(1).unwrap_or_else(unknown),
        test_id: field(2).unwrap_or_else(unknown),
        test_date: field(3),
        grade: field(4),
    })
}

fn parse_bare_id(payload: &str) -> Option<StudentInfo> {
    let id = payload.trim();
    (!id.is_empty()).then(|| StudentInfo::with_id(id))
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

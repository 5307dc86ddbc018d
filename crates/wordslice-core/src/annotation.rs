//! SVG annotation source.
//!
//! Word locations arrive as SVG files, one per page, containing `<path>`
//! (or `<polygon>`) elements whose `id` attribute names the word. Only the
//! polygonal path subset is accepted: absolute and relative
//! `M`/`L`/`H`/`V`/`Z` commands, with the usual implicit linetos after a
//! moveto. Curve and arc commands are rejected rather than silently
//! flattened, since ground-truth word outlines are polygonal.

use std::path::Path as FsPath;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{AnnotationError, Result};
use crate::geometry::{Point, Polygon};

/// One annotated word: its identifier and its outline polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct WordAnnotation {
    pub id: String,
    pub polygon: Polygon,
}

/// Load all word annotations from an SVG file.
pub fn load_annotations(path: &FsPath) -> Result<Vec<WordAnnotation>> {
    let svg = std::fs::read_to_string(path)?;
    parse_annotations(&svg)
}

/// Parse word annotations from SVG text.
pub fn parse_annotations(svg: &str) -> Result<Vec<WordAnnotation>> {
    let mut reader = Reader::from_str(svg);
    let mut annotations = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let index = annotations.len();
                match e.name().local_name().as_ref() {
                    b"path" => {
                        let id = element_id(&e, index)?;
                        let d = required_attribute(&e, b"d", &id)?;
                        let points = parse_path_points(&d, &id)?;
                        annotations.push(WordAnnotation {
                            polygon: Polygon::new(points)?,
                            id,
                        });
                    }
                    b"polygon" => {
                        let id = element_id(&e, index)?;
                        let data = required_attribute(&e, b"points", &id)?;
                        let points = parse_point_list(&data, &id)?;
                        annotations.push(WordAnnotation {
                            polygon: Polygon::new(points)?,
                            id,
                        });
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(AnnotationError::Xml(e.to_string()).into()),
        }
    }

    Ok(annotations)
}

fn element_id(element: &BytesStart<'_>, index: usize) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| AnnotationError::Xml(e.to_string()))?;
        if attr.key.local_name().as_ref() == b"id" {
            let value = attr
                .unescape_value()
                .map_err(|e| AnnotationError::Xml(e.to_string()))?;
            return Ok(value.into_owned());
        }
    }
    Err(AnnotationError::MissingId { index }.into())
}

fn required_attribute(element: &BytesStart<'_>, name: &[u8], id: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| AnnotationError::Xml(e.to_string()))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| AnnotationError::Xml(e.to_string()))?;
            return Ok(value.into_owned());
        }
    }
    Err(AnnotationError::BadCoordinates {
        id: id.to_string(),
        reason: format!("missing {} attribute", String::from_utf8_lossy(name)),
    }
    .into())
}

/// Walk SVG path data and collect one vertex per command endpoint.
fn parse_path_points(d: &str, id: &str) -> Result<Vec<Point>> {
    let mut scanner = PathScanner::new(d, id);
    let mut points: Vec<Point> = Vec::new();
    let mut cursor = Point::new(0.0, 0.0);
    let mut subpath_start = Point::new(0.0, 0.0);
    let mut command: Option<char> = None;

    while let Some(token) = scanner.next_token()? {
        match token {
            Token::Command(c) => match c {
                'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' => command = Some(c),
                'Z' | 'z' => {
                    cursor = subpath_start;
                    command = None;
                }
                other => {
                    return Err(AnnotationError::UnsupportedCommand {
                        id: id.to_string(),
                        command: other,
                    }
                    .into())
                }
            },
            Token::Number(first) => {
                let cmd = command.ok_or_else(|| AnnotationError::BadCoordinates {
                    id: id.to_string(),
                    reason: "coordinate before any command".to_string(),
                })?;
                cursor = match cmd {
                    'M' | 'L' => Point::new(first, scanner.expect_number()?),
                    'm' | 'l' => {
                        let dy = scanner.expect_number()?;
                        Point::new(cursor.x + first, cursor.y + dy)
                    }
                    'H' => Point::new(first, cursor.y),
                    'h' => Point::new(cursor.x + first, cursor.y),
                    'V' => Point::new(cursor.x, first),
                    'v' => Point::new(cursor.x, cursor.y + first),
                    _ => unreachable!("command set restricted above"),
                };
                points.push(cursor);
                // A moveto starts a subpath; extra pairs are implicit
                // linetos.
                match cmd {
                    'M' => {
                        subpath_start = cursor;
                        command = Some('L');
                    }
                    'm' => {
                        subpath_start = cursor;
                        command = Some('l');
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(points)
}

/// Parse a `<polygon points="...">` coordinate list.
fn parse_point_list(data: &str, id: &str) -> Result<Vec<Point>> {
    let mut scanner = PathScanner::new(data, id);
    let mut points = Vec::new();
    while let Some(token) = scanner.next_token()? {
        match token {
            Token::Number(x) => points.push(Point::new(x, scanner.expect_number()?)),
            Token::Command(c) => {
                return Err(AnnotationError::BadCoordinates {
                    id: id.to_string(),
                    reason: format!("unexpected '{}' in points list", c),
                }
                .into())
            }
        }
    }
    Ok(points)
}

enum Token {
    Command(char),
    Number(f32),
}

/// Tokenizer over SVG path/points data: commands are single alphabetic
/// characters, numbers follow the SVG grammar (optional sign, decimal
/// point, exponent), separated by whitespace or commas or nothing at all
/// (as in `10-5`).
struct PathScanner<'a> {
    rest: &'a str,
    id: &'a str,
}

impl<'a> PathScanner<'a> {
    fn new(data: &'a str, id: &'a str) -> Self {
        Self { rest: data, id }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.rest = self
            .rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        let Some(first) = self.rest.chars().next() else {
            return Ok(None);
        };

        if first.is_ascii_alphabetic() {
            self.rest = &self.rest[first.len_utf8()..];
            return Ok(Some(Token::Command(first)));
        }

        let len = number_length(self.rest);
        if len == 0 {
            return Err(AnnotationError::BadCoordinates {
                id: self.id.to_string(),
                reason: format!("unexpected character '{}'", first),
            }
            .into());
        }
        let (number, rest) = self.rest.split_at(len);
        self.rest = rest;
        let value = number
            .parse::<f32>()
            .map_err(|_| AnnotationError::BadCoordinates {
                id: self.id.to_string(),
                reason: format!("invalid number '{}'", number),
            })?;
        Ok(Some(Token::Number(value)))
    }

    fn expect_number(&mut self) -> Result<f32> {
        match self.next_token()? {
            Some(Token::Number(n)) => Ok(n),
            _ => Err(AnnotationError::BadCoordinates {
                id: self.id.to_string(),
                reason: "expected a coordinate pair".to_string(),
            }
            .into()),
        }
    }
}

/// Length in bytes of the number at the start of `s`, or 0 if none.
fn number_length(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i == digits_start || (i == digits_start + 1 && bytes[digits_start] == b'.') {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WordsliceError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_absolute_path_annotations() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <path d="M 100 50 L 300 50 L 300 150 L 100 150 Z" id="270-01-01"/>
            <path d="M10,20 30,20 30,40 Z" id="270-01-02"/>
        </svg>"#;

        let annotations = parse_annotations(svg).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].id, "270-01-01");
        assert_eq!(
            annotations[0].polygon.points(),
            &[
                Point::new(100.0, 50.0),
                Point::new(300.0, 50.0),
                Point::new(300.0, 150.0),
                Point::new(100.0, 150.0),
            ]
        );
        // Implicit linetos after the moveto.
        assert_eq!(annotations[1].polygon.points().len(), 3);
    }

    #[test]
    fn parses_relative_and_axis_commands() {
        let svg = r#"<svg><path d="m 10 10 l 20 0 h 5 v 15 l -25 0 z" id="w"/></svg>"#;

        let annotations = parse_annotations(svg).unwrap();
        assert_eq!(
            annotations[0].polygon.points(),
            &[
                Point::new(10.0, 10.0),
                Point::new(30.0, 10.0),
                Point::new(35.0, 10.0),
                Point::new(35.0, 25.0),
                Point::new(10.0, 25.0),
            ]
        );
    }

    #[test]
    fn parses_polygon_elements() {
        let svg = r#"<svg><polygon points="0,0 10,0 10.5,7.25 0,7" id="p1"/></svg>"#;

        let annotations = parse_annotations(svg).unwrap();
        assert_eq!(annotations[0].id, "p1");
        assert_eq!(annotations[0].polygon.points().len(), 4);
        assert_eq!(annotations[0].polygon.points()[2], Point::new(10.5, 7.25));
    }

    #[test]
    fn packed_negative_numbers() {
        let svg = r#"<svg><path d="M10-5L20-5 15 10Z" id="w"/></svg>"#;

        let annotations = parse_annotations(svg).unwrap();
        assert_eq!(
            annotations[0].polygon.points(),
            &[
                Point::new(10.0, -5.0),
                Point::new(20.0, -5.0),
                Point::new(15.0, 10.0),
            ]
        );
    }

    #[test]
    fn missing_id_is_rejected() {
        let svg = r#"<svg><path d="M 0 0 L 1 0 L 1 1 Z"/></svg>"#;

        let err = parse_annotations(svg).unwrap_err();
        assert!(matches!(
            err,
            WordsliceError::Annotation(AnnotationError::MissingId { index: 0 })
        ));
    }

    #[test]
    fn curve_commands_are_rejected() {
        let svg = r#"<svg><path d="M 0 0 C 1 1 2 2 3 3 Z" id="curved"/></svg>"#;

        let err = parse_annotations(svg).unwrap_err();
        assert!(matches!(
            err,
            WordsliceError::Annotation(AnnotationError::UnsupportedCommand {
                command: 'C',
                ..
            })
        ));
    }

    #[test]
    fn garbage_coordinates_are_rejected() {
        let svg = r#"<svg><path d="M 0 0 L foo bar Z" id="w"/></svg>"#;

        // 'f' lexes as a command character, which is not in the subset.
        let err = parse_annotations(svg).unwrap_err();
        assert!(matches!(err, WordsliceError::Annotation(_)));
    }

    #[test]
    fn two_point_path_fails_polygon_construction() {
        let svg = r#"<svg><path d="M 0 0 L 5 5" id="w"/></svg>"#;

        let err = parse_annotations(svg).unwrap_err();
        assert!(matches!(err, WordsliceError::Geometry(_)));
    }

    #[test]
    fn ignores_unrelated_elements() {
        let svg = r#"<svg>
            <rect x="0" y="0" width="5" height="5"/>
            <g><path d="M 0 0 L 5 0 L 5 5 Z" id="w"/></g>
        </svg>"#;

        let annotations = parse_annotations(svg).unwrap();
        assert_eq!(annotations.len(), 1);
    }
}

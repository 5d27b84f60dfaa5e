use nom::{
    bytes::complete::{tag, tag_no_case, take_till1, take_until, take_while1},
    character::complete::{char, multispace0, multispace1, not_line_ending},
    combinator::all_consuming,
    error::ParseError,
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::config::ParseConfig;
use crate::error::{Error, OfxParseWarning, Result, Warn};
use crate::ofx::header::OfxHeader;

const KNOWN_HEADER_VERSIONS: [u32; 2] = [100, 200];
const KNOWN_VERSIONS: [u32; 11] = [102, 103, 151, 160, 200, 201, 202, 203, 210, 211, 220];

/// Parses a header element name.
fn elem_name<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    take_till1(|c| c == ':' || c == '\r' || c == '\n')(input)
}

/// Parses a header element value.
fn elem_value<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    not_line_ending(input)
}

/// Parses a `KEY:VALUE` header line.
fn any_elem<'a, E>(input: &'a str) -> IResult<&'a str, (&'a str, &'a str), E>
where
    E: ParseError<&'a str>,
{
    separated_pair(elem_name, char(':'), elem_value)(input)
}

/// Parses a `KEY="VALUE"` attribute of an XML-style header.
fn attribute<'a, E>(input: &'a str) -> IResult<&'a str, (&'a str, &'a str), E>
where
    E: ParseError<&'a str>,
{
    separated_pair(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        char('='),
        delimited(char('"'), take_until("\""), char('"')),
    )(input)
}

/// Parses the `<?OFX ...?>` processing instruction that carries an XML-style header.
fn ofx_instruction<'a, E>(input: &'a str) -> IResult<&'a str, Vec<(&'a str, &'a str)>, E>
where
    E: ParseError<&'a str>,
{
    delimited(
        tuple((tag_no_case("<?OFX"), multispace1)),
        many0(terminated(attribute, multispace0)),
        tag("?>"),
    )(input)
}

/// Parses an `<?xml ...?>` declaration, which carries no header fields.
fn xml_declaration<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    preceded(tag_no_case("<?xml"), terminated(take_until("?>"), tag("?>")))(input)
}

fn normalize_value(value: &str) -> Option<String> {
    match value.trim().to_uppercase() {
        v if v == "NONE" => None,
        v => Some(v),
    }
}

/// Finds the byte offset at which the body begins.
fn body_start(input: &str, config: &ParseConfig) -> Result<usize> {
    let window_end = input
        .char_indices()
        .nth(config.lookahead)
        .map_or(input.len(), |(i, _)| i);

    input[..window_end]
        .find(config.body_marker.as_str())
        .ok_or_else(|| Error::MalformedHeader {
            marker: config.body_marker.clone(),
            window: config.lookahead,
        })
}

fn version_warnings(header: &OfxHeader) -> Vec<OfxParseWarning> {
    let mut warnings = Vec::new();
    if let Some(v) = header.header_version() {
        if !KNOWN_HEADER_VERSIONS.contains(&v) {
            warnings.push(OfxParseWarning::UnrecognizedOfxHeaderVersion(v));
        }
    }
    if let Some(v) = header.version() {
        if !KNOWN_VERSIONS.contains(&v) {
            warnings.push(OfxParseWarning::UnrecognizedVersion(v));
        }
    }
    warnings
}

/// Parses the header lines that precede the body.
pub(crate) fn ofx_header(text: &str) -> Warn<OfxHeader> {
    let mut header = OfxHeader::default();
    let mut warnings = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Ok((_, attributes)) =
            all_consuming(ofx_instruction::<nom::error::Error<&str>>)(line)
        {
            for (key, value) in attributes {
                header.insert(key.trim().to_ascii_uppercase(), normalize_value(value));
            }
        } else if xml_declaration::<nom::error::Error<&str>>(line).is_ok() {
            continue;
        } else if let Ok((_, (key, value))) =
            all_consuming(any_elem::<nom::error::Error<&str>>)(line)
        {
            header.insert(key.trim().to_ascii_uppercase(), normalize_value(value));
        } else {
            tracing::warn!(line, "skipping malformed header line");
            warnings.push(OfxParseWarning::MalformedHeaderLine(String::from(line)));
        }
    }

    warnings.extend(version_warnings(&header));
    Warn {
        value: header,
        warnings,
    }
}

/// Splits the input into the body and the parsed header.
///
/// The body start marker must occur within the configured lookahead window.
pub fn split_header<'a>(
    input: &'a str,
    config: &ParseConfig,
) -> Result<Warn<(&'a str, OfxHeader)>> {
    let start = body_start(input, config)?;
    let (head, body) = input.split_at(start);
    let header = ofx_header(head);
    tracing::debug!(
        fields = header.value.len(),
        warnings = header.warnings.len(),
        body_len = body.len(),
        "extracted OFX header"
    );
    Ok(header.map(|h| (body, h)))
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use nom::error::ErrorKind;
    use test_case::test_case;

    use crate::parse::test_utils::{assert_parser, Expected};

    use super::*;

    const SGML_HEADER: &str = "OFXHEADER:100\r\n\
                               DATA:OFXSGML\r\n\
                               VERSION:102\r\n\
                               SECURITY:NONE\r\n\
                               ENCODING:USASCII\r\n\
                               CHARSET:1252\r\n\
                               COMPRESSION:NONE\r\n\
                               OLDFILEUID:NONE\r\n\
                               NEWFILEUID:NONE\r\n\r\n";

    #[test_case(""          , Err(ErrorKind::TakeTill1), ""      ; "eof"           )]
    #[test_case(":"         , Err(ErrorKind::TakeTill1), ":"     ; "empty"         )]
    #[test_case("1SDF:"     , Ok("1SDF")               , ":"     ; "leading digit" )]
    #[test_case("OFXHEADER:", Ok("OFXHEADER")          , ":"     ; "known value"   )]
    #[test_case("lower:x"   , Ok("lower")              , ":x"    ; "lowercase"     )]
    fn elem_name(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::elem_name, input, expected, remaining);
    }

    #[test_case(""             , Err(ErrorKind::TakeTill1), ""            ; "eof"        )]
    #[test_case(":VAL\r\nx"    , Err(ErrorKind::TakeTill1), ":VAL\r\nx"   ; "empty name" )]
    #[test_case("NAME\r\nx"    , Err(ErrorKind::Char)     , "\r\nx"       ; "no colon"   )]
    #[test_case("NAME:\r\nx"   , Ok(("NAME", ""))         , "\r\nx"       ; "empty value")]
    #[test_case("NAME:VAL\r\nx", Ok(("NAME", "VAL"))      , "\r\nx"       ; "text value" )]
    #[test_case("NAME:A:B"     , Ok(("NAME", "A:B"))      , ""            ; "colon in value")]
    fn any_elem(input: &str, expected: Expected<(&str, &str)>, remaining: &str) {
        assert_parser(super::any_elem, input, expected, remaining);
    }

    #[test_case(
        "<?OFX OFXHEADER=\"200\" VERSION=\"211\" SECURITY=\"NONE\"?>",
        Ok(vec![("OFXHEADER", "200"), ("VERSION", "211"), ("SECURITY", "NONE")]),
        "" ;
        "attributes"
    )]
    #[test_case("<?xml version=\"1.0\"?>", Err(ErrorKind::Tag), "<?xml version=\"1.0\"?>" ; "xml declaration")]
    fn ofx_instruction(input: &str, expected: Expected<Vec<(&str, &str)>>, remaining: &str) {
        assert_parser(super::ofx_instruction, input, expected, remaining);
    }

    #[test]
    fn ofx_header__sgml_header__uppercases_and_normalizes_none() {
        let result = ofx_header("ofxheader : 100\r\n\r\nData:ofxsgml\r\nSECURITY:none\r\n");

        assert_eq!(
            result,
            Warn::from(OfxHeader::from_iter([
                ("OFXHEADER", Some("100")),
                ("DATA", Some("OFXSGML")),
                ("SECURITY", None),
            ]))
        );
    }

    #[test]
    fn ofx_header__xml_header__reads_instruction_attributes() {
        let result = ofx_header(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n\
             <?OFX OFXHEADER=\"200\" VERSION=\"211\" SECURITY=\"NONE\" OLDFILEUID=\"NONE\" NEWFILEUID=\"abc\"?>\r\n",
        );

        assert_eq!(
            result,
            Warn::from(OfxHeader::from_iter([
                ("OFXHEADER", Some("200")),
                ("VERSION", Some("211")),
                ("SECURITY", None),
                ("OLDFILEUID", None),
                ("NEWFILEUID", Some("ABC")),
            ]))
        );
    }

    #[test]
    fn ofx_header__unknown_versions_and_bad_line__warns() {
        let result = ofx_header("OFXHEADER:999\r\nGARBAGE\r\nVERSION:101\r\n");

        assert_eq!(
            result.warnings,
            vec![
                OfxParseWarning::MalformedHeaderLine(String::from("GARBAGE")),
                OfxParseWarning::UnrecognizedOfxHeaderVersion(999),
                OfxParseWarning::UnrecognizedVersion(101),
            ]
        );
        assert_eq!(result.value.len(), 2);
    }

    #[test]
    fn split_header__sgml_document__splits_at_marker() {
        let input = format!("{SGML_HEADER}<OFX><SIGNONMSGSRSV1></SIGNONMSGSRSV1></OFX>");

        let Warn { value: (body, header), warnings } =
            split_header(&input, &ParseConfig::default()).unwrap();

        assert_eq!(body, "<OFX><SIGNONMSGSRSV1></SIGNONMSGSRSV1></OFX>");
        assert_eq!(warnings, vec![]);
        assert_eq!(header.len(), 9);
        assert_eq!(header.get("VERSION"), Some("102"));
        assert_eq!(header.get("COMPRESSION"), None);
        assert!(header.contains_key("COMPRESSION"));
    }

    #[test]
    fn split_header__marker_beyond_window__malformed_header() {
        let input = format!("{}<OFX></OFX>", " ".repeat(30));
        let config = ParseConfig::default().with_lookahead(16);

        assert_eq!(
            split_header(&input, &config),
            Err(Error::MalformedHeader {
                marker: String::from("<OFX>"),
                window: 16,
            })
        );
    }

    #[test]
    fn split_header__no_marker__malformed_header() {
        let result = split_header(SGML_HEADER, &ParseConfig::default());

        assert!(matches!(result, Err(Error::MalformedHeader { .. })));
    }

    #[test]
    fn split_header__multibyte_prefix__window_counts_characters() {
        let input = "NAME:ééééé\r\n<OFX></OFX>";
        let config = ParseConfig::default().with_lookahead(17);

        let result = split_header(input, &config).unwrap();

        assert_eq!(result.value.0, "<OFX></OFX>");
        assert_eq!(result.value.1.get("NAME"), Some("ÉÉÉÉÉ"));
    }

    #[test]
    fn split_header__rendered_header__round_trips() {
        let input = format!("{SGML_HEADER}<OFX></OFX>");
        let config = ParseConfig::default();
        let (body, header) = split_header(&input, &config).unwrap().value;

        let rebuilt = format!("{header}{body}");
        let (body_again, header_again) = split_header(&rebuilt, &config).unwrap().value;

        assert_eq!(header_again, header);
        assert_eq!(body_again, body);
    }
}

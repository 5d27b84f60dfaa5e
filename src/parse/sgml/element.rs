//! Parsers for OFX SGML elements.

use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_till, take_until, take_while},
    character::complete::satisfy,
    combinator::{all_consuming, map, not, recognize, value},
    error::ParseError,
    multi::{many0, many1_count},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::Result;
use crate::parse::run_verbose;

const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

/// A lexical unit of an OFX body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Token<'a> {
    /// `<NAME>`, holding the name as written.
    StartTag(&'a str),
    /// `</NAME>`, holding the name as written.
    EndTag(&'a str),
    /// `<?...>`, holding the whole construct.
    ProcessingInstruction(&'a str),
    /// `<!--...-->`, holding the whole construct.
    Comment(&'a str),
    /// Anything between markup, undecoded.
    Text(&'a str),
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c == '.'
}

/// Parses the name of a tag.
fn tag_name<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(tuple((satisfy(is_name_start), take_while(is_name_char))))(input)
}

/// Parses the start tag of an element.
pub(crate) fn any_start_tag<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    delimited(tag("<"), tag_name, tag(">"))(input)
}

/// Parses the end tag of an element.
pub(crate) fn any_end_tag<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    delimited(tag("</"), tag_name, tag(">"))(input)
}

/// Parses a comment, delimiters included.
fn comment<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(tuple((tag("<!--"), take_until("-->"), tag("-->"))))(input)
}

/// Parses a processing instruction, delimiters included.
fn processing_instruction<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(tuple((tag("<?"), take_till(|c| c == '>'), tag(">"))))(input)
}

/// Parses a CDATA section, delimiters included.
fn cdata<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(tuple((tag(CDATA_START), take_until(CDATA_END), tag(CDATA_END))))(input)
}

/// Parses any construct delimited by angle brackets that is not character data.
fn markup<'a, E>(input: &'a str) -> IResult<&'a str, Token<'a>, E>
where
    E: ParseError<&'a str>,
{
    alt((
        map(comment, Token::Comment),
        map(processing_instruction, Token::ProcessingInstruction),
        map(any_end_tag, Token::EndTag),
        map(any_start_tag, Token::StartTag),
    ))(input)
}

/// Parses a run of character data up to the next piece of markup.
///
/// A `<` that does not open markup is kept as text, as are CDATA sections.
fn text<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(many1_count(alt((
        is_not("<"),
        cdata,
        preceded(not(markup), tag("<")),
    ))))(input)
}

fn token<'a, E>(input: &'a str) -> IResult<&'a str, Token<'a>, E>
where
    E: ParseError<&'a str>,
{
    alt((markup, map(text, Token::Text)))(input)
}

/// Splits a body into tokens.
pub(crate) fn tokens(input: &str) -> Result<Vec<Token<'_>>> {
    run_verbose(all_consuming(many0(token)), input)
}

/// Parses character data, resolving entity references and CDATA sections.
pub(crate) fn decoded_text<'a, E>(input: &'a str) -> IResult<&'a str, Cow<'a, str>, E>
where
    E: ParseError<&'a str>,
{
    map(
        many0(alt((
            value("<", tag("&lt;")),
            value(">", tag("&gt;")),
            value("&", tag("&amp;")),
            value(" ", tag("&nbsp;")),
            delimited(tag(CDATA_START), take_until(CDATA_END), tag(CDATA_END)),
            is_not("&<"),
            tag("&"),
            tag("<"),
        ))),
        |vs: Vec<&str>| match vs.len() {
            0 => Cow::Borrowed(""),
            1 => Cow::Borrowed(vs[0]),
            _ => Cow::Owned(vs.concat()),
        },
    )(input)
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use nom::error::ErrorKind;
    use test_case::test_case;

    use super::Token;
    use crate::parse::test_utils::{assert_parser, Expected};

    #[test_case(">"          , Err(ErrorKind::Satisfy), ">"       ; "empty"             )]
    #[test_case(".NAME>"     , Err(ErrorKind::Satisfy), ".NAME>"  ; "dot prefix"        )]
    #[test_case("A>"         , Ok("A")                , ">"       ; "single char"       )]
    #[test_case("lower>"     , Ok("lower")            , ">"       ; "lowercase"         )]
    #[test_case("2UPPER>"    , Ok("2UPPER")           , ">"       ; "number prefix"     )]
    #[test_case("INTU.BID>"  , Ok("INTU.BID")         , ">"       ; "dotted"            )]
    #[test_case("_X_1>"      , Ok("_X_1")             , ">"       ; "underscores"       )]
    #[test_case("WITH SPACE>", Ok("WITH")             , " SPACE>" ; "whitespace"        )]
    fn tag_name(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::tag_name, input, expected, remaining);
    }

    #[test_case("ASDF"   , Err(ErrorKind::Tag)    , "ASDF"   ; "no delimiters"      )]
    #[test_case("<ASDF"  , Err(ErrorKind::Tag)    , ""       ; "no end delimiter"   )]
    #[test_case("<>"     , Err(ErrorKind::Satisfy), ">"      ; "empty name"         )]
    #[test_case("</ASDF>", Err(ErrorKind::Satisfy), "/ASDF>" ; "end-style delimiter")]
    #[test_case("<AS DF>", Err(ErrorKind::Tag)    , " DF>"   ; "whitespace"         )]
    #[test_case("<ASDF>" , Ok("ASDF")             , ""       ; "valid tag"          )]
    fn start_tag(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::any_start_tag, input, expected, remaining);
    }

    #[test_case("ASDF"    , Err(ErrorKind::Tag)    , "ASDF"   ; "no delimiters"        )]
    #[test_case("</ASDF"  , Err(ErrorKind::Tag)    , ""       ; "no end delimiter"     )]
    #[test_case("</>"     , Err(ErrorKind::Satisfy), ">"      ; "empty name"           )]
    #[test_case("<ASDF>"  , Err(ErrorKind::Tag)    , "<ASDF>" ; "start-style delimiter")]
    #[test_case("</AS DF>", Err(ErrorKind::Tag)    , " DF>"   ; "whitespace"           )]
    #[test_case("</ASDF>" , Ok("ASDF")             , ""       ; "valid tag"            )]
    fn end_tag(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::any_end_tag, input, expected, remaining);
    }

    #[test_case("<!-- x -->y", Ok("<!-- x -->"), "y" ; "terminated"  )]
    #[test_case("<!---->"    , Ok("<!---->")   , ""  ; "empty"       )]
    #[test_case("<!-- x"     , Err(ErrorKind::TakeUntil), " x" ; "unterminated")]
    fn comment(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::comment, input, expected, remaining);
    }

    #[test_case("<?xml version=\"1.0\"?>x", Ok("<?xml version=\"1.0\"?>"), "x" ; "xml declaration")]
    #[test_case("<?OFX>"                  , Ok("<?OFX>")                  , ""  ; "sgml style"     )]
    #[test_case("<OFX>"                   , Err(ErrorKind::Tag)           , "<OFX>" ; "start tag"  )]
    fn processing_instruction(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::processing_instruction, input, expected, remaining);
    }

    #[test_case("abc<TAG>"            , Ok("abc")               , "<TAG>" ; "plain"              )]
    #[test_case("a < b<TAG>"          , Ok("a < b")             , "<TAG>" ; "stray angle bracket")]
    #[test_case("<![CDATA[<X>]]>y<T>" , Ok("<![CDATA[<X>]]>y")  , "<T>"   ; "cdata section"      )]
    #[test_case("x<!-- c -->"         , Ok("x")                 , "<!-- c -->" ; "before comment")]
    #[test_case(" \r\n\t"             , Ok(" \r\n\t")           , ""      ; "whitespace only"    )]
    fn text(input: &str, expected: Expected<&str>, remaining: &str) {
        assert_parser(super::text, input, expected, remaining);
    }

    #[test]
    fn tokens__mixed_markup__in_order() {
        let result = super::tokens("<?OFX x?><OFX>\r\n<!-- c --><CODE>0 </OFX>");

        assert_eq!(
            result,
            Ok(vec![
                Token::ProcessingInstruction("<?OFX x?>"),
                Token::StartTag("OFX"),
                Token::Text("\r\n"),
                Token::Comment("<!-- c -->"),
                Token::StartTag("CODE"),
                Token::Text("0 "),
                Token::EndTag("OFX"),
            ])
        );
    }

    #[test]
    fn tokens__empty_input__no_tokens() {
        assert_eq!(super::tokens(""), Ok(vec![]));
    }

    #[test_case(""                , Ok(Cow::from(""))          , "" ; "eof"                        )]
    #[test_case("&lt;"            , Ok(Cow::from("<"))         , "" ; "escaped left angle bracket" )]
    #[test_case("&gt;"            , Ok(Cow::from(">"))         , "" ; "escaped right angle bracket")]
    #[test_case("&amp;"           , Ok(Cow::from("&"))         , "" ; "escaped ampersand"          )]
    #[test_case("&nbsp;"          , Ok(Cow::from(" "))         , "" ; "escaped space"              )]
    #[test_case("<![CDATA[<>& []a1A!]]>", Ok(Cow::from("<>& []a1A!")), "" ; "cdata"                )]
    #[test_case("a1A!&lt;b2B@&gt;", Ok(Cow::from("a1A!<b2B@>")), "" ; "mixed escapes"              )]
    #[test_case("a < b"           , Ok(Cow::from("a < b"))     , "" ; "stray angle bracket"        )]
    #[test_case("&lt;a&x"         , Ok(Cow::from("<a&x"))      , "" ; "escaped then ampersand"     )]
    #[test_case("&&&&"            , Ok(Cow::from("&&&&"))      , "" ; "repeated ampersands"        )]
    fn decoded_text<'a>(input: &'a str, expected: Expected<Cow<'a, str>>, remaining: &'a str) {
        assert_parser(super::decoded_text, input, expected, remaining);
    }
}

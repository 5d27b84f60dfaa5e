//! Parsers for OFX documents.

use nom::{
    error::{convert_error, VerboseError},
    Err, IResult,
};

use crate::error::Error;

pub mod sgml;

/// Runs a verbose parser to completion, rendering any failure against `input`.
pub(crate) fn run_verbose<'a, O, P>(mut p: P, input: &'a str) -> Result<O, Error>
where
    P: FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>,
{
    match p(input) {
        Ok((_, value)) => Ok(value),
        Err(Err::Incomplete(_)) => Err(Error::ParseError(String::from("incomplete input"))),
        Err(Err::Error(e)) | Err(Err::Failure(e)) => Err(Error::ParseError(convert_error(input, e))),
    }
}

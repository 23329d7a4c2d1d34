//! Error types
//!
//! Reading distinguishes between files that are not well-formed XML
//! ([TransportError], typically truncated generator output) and files that
//! are well-formed but lack the structure needed to interpret them
//! ([StructureError], [FormatError]). Only the latter abort event iteration
//! with an error, see [Reader](crate::Reader).
use std::io;

use thiserror::Error;

/// The file lacks a block, attribute or text required to interpret it
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("No <init> block found in the LHE file")]
    MissingInit,
    #[error("<weightgroup> must have attribute 'type' or 'name'")]
    MissingGroupKey,
    #[error("<{element}> must have attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("<{0}> block has no text content")]
    EmptyBlock(&'static str),
}

/// A line of numbers does not match the layout of its record
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(
        "Expected {expected} entries in {record} record, found {found}: '{line}'"
    )]
    FieldCount {
        record: &'static str,
        expected: usize,
        found: usize,
        line: String,
    },
    #[error("Failed to convert '{token}' to a number for {record} entry '{field}'")]
    Number {
        record: &'static str,
        field: &'static str,
        token: String,
    },
}

/// The input is not well-formed XML
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("Input ended inside <{0}>")]
    UnexpectedEof(String),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Failed to write xml header: {0}")]
    Header(String),
}

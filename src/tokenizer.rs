//! Owned XML tokens on top of `quick_xml`
//!
//! The underlying read buffer is cleared after every token, so memory use
//! does not grow with the size of the input.
use std::borrow::Cow;
use std::io::BufRead;

use quick_xml::events::{BytesStart, BytesText, Event as XmlEvent};

use crate::data::XmlAttr;
use crate::error::TransportError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Start { name: String, attributes: XmlAttr },
    Empty { name: String, attributes: XmlAttr },
    End(String),
    Text(String),
    CData(String),
    Comment(String),
    Eof,
    /// Declarations, processing instructions, doctypes
    Other,
}

#[derive(Debug)]
pub(crate) struct Tokenizer<R> {
    xml: quick_xml::Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> Tokenizer<R> {
    pub(crate) fn new(stream: R) -> Self {
        Self {
            xml: quick_xml::Reader::from_reader(stream),
            buf: Vec::new(),
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, TransportError> {
        let token = match self.xml.read_event_into(&mut self.buf) {
            Ok(XmlEvent::Start(e)) => element(&e).map(|(name, attributes)| Token::Start { name, attributes }),
            Ok(XmlEvent::Empty(e)) => element(&e).map(|(name, attributes)| Token::Empty { name, attributes }),
            Ok(XmlEvent::End(e)) => Ok(Token::End(lossy(e.name().as_ref()))),
            Ok(XmlEvent::Text(e)) => text(&e).map(Token::Text),
            Ok(XmlEvent::CData(e)) => Ok(Token::CData(lossy(&e))),
            Ok(XmlEvent::Comment(e)) => Ok(Token::Comment(lossy(&e))),
            Ok(XmlEvent::Eof) => Ok(Token::Eof),
            Ok(_) => Ok(Token::Other),
            Err(err) => Err(err),
        };
        self.buf.clear();
        token.map_err(|source| TransportError::Xml {
            position: self.xml.buffer_position() as u64,
            source,
        })
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn text(e: &BytesText) -> Result<String, quick_xml::Error> {
    e.unescape().map(Cow::into_owned)
}

pub(crate) fn element(e: &BytesStart) -> Result<(String, XmlAttr), quick_xml::Error> {
    let name = lossy(e.name().as_ref());
    let mut attributes = XmlAttr::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = lossy(attr.key.as_ref());
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok((name, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(xml: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(xml.as_bytes());
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token == Token::Eof {
                return tokens;
            }
            tokens.push(token);
        }
    }

    #[test]
    fn attributes_keep_order() {
        let tokens = tokens(r#"<weightgroup type="scale" combine='envelope'><weight id="1"/></weightgroup>"#);
        match &tokens[0] {
            Token::Start { name, attributes } => {
                assert_eq!(name, "weightgroup");
                let keys: Vec<_> = attributes.keys().map(String::as_str).collect();
                assert_eq!(keys, ["type", "combine"]);
                assert_eq!(attributes["combine"], "envelope");
            }
            other => panic!("unexpected token {other:?}"),
        }
        assert!(matches!(&tokens[1], Token::Empty { name, .. } if name == "weight"));
        assert_eq!(tokens[2], Token::End("weightgroup".to_owned()));
    }

    #[test]
    fn text_is_unescaped() {
        let tokens = tokens("<a>x &lt; y</a><!-- note --><![CDATA[<raw>]]>");
        assert_eq!(tokens[1], Token::Text("x < y".to_owned()));
        assert_eq!(tokens[3], Token::Comment(" note ".to_owned()));
        assert_eq!(tokens[4], Token::CData("<raw>".to_owned()));
    }

    #[test]
    fn mismatched_end_tag() {
        let mut tokenizer = Tokenizer::new("<a><b></a>".as_bytes());
        assert!(tokenizer.next_token().is_ok());
        assert!(tokenizer.next_token().is_ok());
        let err = tokenizer.next_token().unwrap_err();
        assert!(matches!(err, TransportError::Xml { .. }));
    }
}

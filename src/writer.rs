use std::io::Write;

use quick_xml::escape::{escape, partial_escape};
use xmltree::EmitterConfig;

use crate::data::{Event, Init, LheFile, WeightGroup, XmlAttr};
use crate::error::WriteError;
use crate::numbers::Exp;
use crate::tags::*;
use crate::XmlTree;

/// How event weights are written
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum WeightStyle {
    /// `<rwgt>` block with one `<wgt id='...'>` per weight
    #[default]
    Rwgt,
    /// Positional `<weights>` block, in the order of the event's weights
    Weights,
    /// Don't write weights
    None,
}

/// Writer for the LHE format
///
/// The closing tag is only written by [finish](Writer::finish).
#[derive(Debug)]
pub struct Writer<W: Write> {
    stream: W,
    weight_style: WeightStyle,
}

impl<W: Write> Writer<W> {
    /// Create a new LHEF writer, writing the opening `<LesHouchesEvents>` tag
    ///
    /// # Example
    ///
    /// ```rust
    /// let mut output = Vec::new();
    /// let writer = lhe_stream::Writer::new(&mut output, "3.0").unwrap();
    /// writer.finish().unwrap();
    /// ```
    pub fn new(mut stream: W, version: &str) -> Result<Self, WriteError> {
        writeln!(stream, "{LHEF_TAG_OPEN}\"{}\">", escape(version))?;
        Ok(Self {
            stream,
            weight_style: WeightStyle::default(),
        })
    }

    /// Choose how event weights are written
    pub fn weight_style(mut self, weight_style: WeightStyle) -> Self {
        self.weight_style = weight_style;
        self
    }

    /// Write an indented `<header>` block
    pub fn header(&mut self, header: &XmlTree) -> Result<(), WriteError> {
        let config = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false);
        header
            .write_with_config(&mut self.stream, config)
            .map_err(|err| WriteError::Header(err.to_string()))?;
        self.stream.write_all(b"\n")?;
        Ok(())
    }

    /// Write the `<init>` block, including any weight groups
    pub fn init(&mut self, init: &Init) -> Result<(), WriteError> {
        writeln!(self.stream, "{INIT_START}")?;
        writeln!(self.stream, "{}", init.info)?;
        for process in &init.processes {
            writeln!(self.stream, "{process}")?;
        }
        if !init.weight_groups.is_empty() {
            writeln!(self.stream, "<{INITRWGT}>")?;
            for group in init.weight_groups.values() {
                self.weight_group(group)?;
            }
            writeln!(self.stream, "</{INITRWGT}>")?;
        }
        writeln!(self.stream, "{INIT_END}")?;
        Ok(())
    }

    fn weight_group(&mut self, group: &WeightGroup) -> Result<(), WriteError> {
        let tag = format!("  <{WEIGHTGROUP}{}", Attributes(&group.attributes));
        if group.weights.is_empty() {
            writeln!(self.stream, "{tag} />")?;
            return Ok(());
        }
        writeln!(self.stream, "{tag}>")?;
        for weight in group.weights.values() {
            let tag = format!("    <{WEIGHT}{}", Attributes(&weight.attributes));
            if weight.name.is_empty() {
                writeln!(self.stream, "{tag} />")?;
            } else {
                writeln!(
                    self.stream,
                    "{tag}>{}</{WEIGHT}>",
                    partial_escape(weight.name.as_str())
                )?;
            }
        }
        writeln!(self.stream, "  </{WEIGHTGROUP}>")?;
        Ok(())
    }

    /// Write an `<event>` block
    ///
    /// Weights are written in the style chosen with
    /// [weight_style](Writer::weight_style), or not at all if the event has
    /// none.
    pub fn event(&mut self, event: &Event) -> Result<(), WriteError> {
        writeln!(self.stream, "{EVENT_START}{}>", Attributes(event.attributes()))?;
        writeln!(self.stream, "{}", event.info())?;
        for particle in event.particles() {
            writeln!(self.stream, "{particle}")?;
        }
        for comment in event.comments() {
            writeln!(self.stream, "{}", partial_escape(comment.as_str()))?;
        }
        let weights = event.weights();
        if !weights.is_empty() {
            match self.weight_style {
                WeightStyle::Rwgt => {
                    writeln!(self.stream, "<{RWGT}>")?;
                    for (id, value) in weights {
                        writeln!(
                            self.stream,
                            " <{WGT} {ID}='{}'>{}</{WGT}>",
                            escape(id.as_str()),
                            Exp::new(*value, 11, 4)
                        )?;
                    }
                    writeln!(self.stream, "</{RWGT}>")?;
                }
                WeightStyle::Weights => {
                    writeln!(self.stream, "<{WEIGHTS}>")?;
                    for value in weights.values() {
                        writeln!(self.stream, "{}", Exp::new(*value, 11, 4))?;
                    }
                    writeln!(self.stream, "</{WEIGHTS}>")?;
                }
                WeightStyle::None => {}
            }
        }
        writeln!(self.stream, "{EVENT_END}")?;
        Ok(())
    }

    /// Write the closing `</LesHouchesEvents>` tag and return the stream
    pub fn finish(mut self) -> Result<W, WriteError> {
        writeln!(self.stream, "{LHEF_LAST_LINE}")?;
        self.stream.flush()?;
        Ok(self.stream)
    }
}

/// Attributes as ` key="value"` pairs
struct Attributes<'a>(&'a XmlAttr);

impl std::fmt::Display for Attributes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in self.0 {
            write!(f, " {key}=\"{}\"", escape(value.as_str()))?;
        }
        Ok(())
    }
}

impl LheFile {
    /// Write the whole file to `stream`
    pub fn write<W: Write>(&self, stream: W, weight_style: WeightStyle) -> Result<W, WriteError> {
        let mut writer = Writer::new(stream, &self.init.version)?.weight_style(weight_style);
        if let Some(header) = &self.header {
            writer.header(header)?;
        }
        writer.init(&self.init)?;
        for event in &self.events {
            writer.event(event)?;
        }
        writer.finish()
    }

    /// The whole file in LHE format
    pub fn to_lhe_string(&self, weight_style: WeightStyle) -> Result<String, WriteError> {
        let output = self.write(Vec::new(), weight_style)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

//! Streaming reader
//!
//! The reader parses everything up to the first `<event>` tag on
//! construction and then yields one event at a time. Nothing beyond the
//! event that is currently being read is kept in memory.
use std::io::BufRead;
use std::mem;

use indexmap::IndexMap;
use log::{debug, warn};
use quick_xml::events::Event as XmlEvent;
use xmltree::XMLNode;

use crate::data::{
    Event, EventInfo, Init, InitInfo, LheFile, Particle, ProcInfo, WeightGroup, WeightInfo, Weights,
    XmlAttr,
};
use crate::error::{ReadError, StructureError, TransportError};
use crate::numbers::float;
use crate::tags::*;
use crate::tokenizer::{Token, Tokenizer};
use crate::weights::WeightIndex;
use crate::XmlTree;

/// Reader settings
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Also read event attributes, comment lines and weights
    pub attributes: bool,
    /// Buffer size when reading from files
    pub buffer_capacity: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            attributes: true,
            buffer_capacity: 64 * 1024,
        }
    }
}

impl ReadOptions {
    /// Only read event information and particles
    pub fn plain() -> Self {
        Self {
            attributes: false,
            ..Default::default()
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    /// The start tag of the next event has been consumed
    InEvent,
    /// The next event is an empty `<event/>` tag
    EmptyEvent,
    BetweenEvents,
    Finished,
}

/// Reader for the LHE format
///
/// The reader is an iterator over the events in the file. Iteration ends
/// early if the input is not well-formed XML, e.g. because it was
/// truncated. In that case a warning is logged and the problem can be
/// queried with [transport_error](Reader::transport_error). All events
/// before the malformed part are still returned. A file that is
/// well-formed but cannot be interpreted produces one `Err` item, after
/// which iteration stops.
///
/// Dropping the reader drops the underlying stream.
#[derive(Debug)]
pub struct Reader<R> {
    tokens: Tokenizer<R>,
    options: ReadOptions,
    header: Option<XmlTree>,
    init: Init,
    weight_index: Option<WeightIndex>,
    event_attributes: XmlAttr,
    depth: usize,
    state: State,
    transport_error: Option<TransportError>,
}

/// Everything collected before the first event
#[derive(Default)]
struct Preamble {
    version: String,
    header: Option<XmlTree>,
    info: Option<InitInfo>,
    processes: Vec<ProcInfo>,
    weight_groups: IndexMap<String, WeightGroup>,
    next_weight_index: usize,
    first_event: XmlAttr,
    depth: usize,
}

impl<R: BufRead> Reader<R> {
    /// Create a new LHEF reader, reading event attributes and weights
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// let file = std::fs::File::open("events.lhe").unwrap();
    /// let file = std::io::BufReader::new(file);
    /// let reader = lhe_stream::Reader::new(file).unwrap();
    /// println!("LHEF version {}", reader.version());
    /// ```
    pub fn new(stream: R) -> Result<Self, ReadError> {
        Self::with_options(stream, ReadOptions::default())
    }

    pub fn with_options(stream: R, options: ReadOptions) -> Result<Self, ReadError> {
        let mut tokens = Tokenizer::new(stream);
        let mut preamble = Preamble::default();
        let mut transport_error = None;
        let state = match preamble.read(&mut tokens) {
            Ok(state) => state,
            Err(ReadError::Transport(err)) if preamble.info.is_some() => {
                warn!("Stopped reading LHE file: {err}");
                transport_error = Some(err);
                State::Finished
            }
            Err(err) => return Err(err),
        };
        let Preamble {
            version,
            header,
            info,
            processes,
            weight_groups,
            first_event,
            depth,
            ..
        } = preamble;
        let info = info.ok_or(StructureError::MissingInit)?;
        let init = Init {
            info,
            processes,
            weight_groups,
            version,
        };
        debug!(
            "Read LHE init block: version {}, {} processes, {} weight groups",
            init.version,
            init.processes.len(),
            init.weight_groups.len()
        );
        Ok(Reader {
            tokens,
            options,
            header,
            init,
            weight_index: None,
            event_attributes: first_event,
            depth,
            state,
            transport_error,
        })
    }

    /// Get the LHEF version
    pub fn version(&self) -> &str {
        &self.init.version
    }

    /// Get the `<header>` block, without any `<initrwgt>`
    pub fn header(&self) -> Option<&XmlTree> {
        self.header.as_ref()
    }

    /// Get the run information
    pub fn init(&self) -> &Init {
        &self.init
    }

    /// The XML error that ended iteration early, if any
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.transport_error.as_ref()
    }

    /// Get the next event
    ///
    /// Returns `Ok(None)` at the end of the file and when reading stopped
    /// because of malformed XML.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// let file = std::fs::File::open("events.lhe").unwrap();
    /// let file = std::io::BufReader::new(file);
    /// let mut reader = lhe_stream::Reader::new(file).unwrap();
    ///
    /// match reader.next_event().unwrap() {
    ///    Some(event) => println!("Found an event."),
    ///    None => println!("Reached end of event file."),
    /// }
    /// ```
    pub fn next_event(&mut self) -> Result<Option<Event>, ReadError> {
        match self.read_event() {
            Ok(event) => Ok(event),
            Err(ReadError::Transport(err)) => {
                warn!("Stopped reading LHE file: {err}");
                self.transport_error = Some(err);
                self.state = State::Finished;
                Ok(None)
            }
            Err(err) => {
                self.state = State::Finished;
                Err(err)
            }
        }
    }

    /// Read all remaining events into memory
    pub fn into_file(mut self) -> Result<LheFile, ReadError> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(LheFile {
            header: self.header,
            init: self.init,
            events,
        })
    }

    fn read_event(&mut self) -> Result<Option<Event>, ReadError> {
        if self.state == State::BetweenEvents {
            self.seek_event()?;
        }
        match self.state {
            State::InEvent => {
                self.state = State::BetweenEvents;
                let attributes = mem::take(&mut self.event_attributes);
                self.read_event_body(attributes).map(Some)
            }
            State::EmptyEvent => Err(StructureError::EmptyBlock(EVENT).into()),
            State::BetweenEvents | State::Finished => Ok(None),
        }
    }

    fn seek_event(&mut self) -> Result<(), ReadError> {
        loop {
            match self.tokens.next_token()? {
                Token::Start { name, attributes } if name == EVENT => {
                    self.event_attributes = attributes;
                    self.state = State::InEvent;
                    return Ok(());
                }
                Token::Start { .. } => self.depth += 1,
                Token::Empty { name, .. } if name == EVENT => {
                    self.state = State::EmptyEvent;
                    return Ok(());
                }
                Token::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        self.state = State::Finished;
                        return Ok(());
                    }
                }
                Token::Eof => return Err(TransportError::UnexpectedEof(LHEF.to_owned()).into()),
                _ => {}
            }
        }
    }

    fn read_event_body(&mut self, event_attributes: XmlAttr) -> Result<Event, ReadError> {
        enum Child {
            Weights(String),
            Rwgt,
            Wgt { id: String, value: String },
            Other,
        }
        let with_weights = self.options.attributes;
        let mut text = String::new();
        let mut seen_child = false;
        let mut positional = None;
        let mut tagged = Vec::new();
        let mut open: Vec<Child> = Vec::new();
        loop {
            match self.tokens.next_token()? {
                Token::Start { name, attributes } => {
                    seen_child = true;
                    let child = match (open.last(), name.as_str()) {
                        (None, WEIGHTS) if with_weights => Child::Weights(String::new()),
                        (None, RWGT) if with_weights => Child::Rwgt,
                        (Some(Child::Rwgt), WGT) => Child::Wgt {
                            id: required(&attributes, WGT, ID)?,
                            value: String::new(),
                        },
                        _ => Child::Other,
                    };
                    open.push(child);
                }
                Token::Empty { name, attributes } => {
                    seen_child = true;
                    match (open.last(), name.as_str()) {
                        (None, WEIGHTS) if with_weights => {
                            return Err(StructureError::EmptyBlock(WEIGHTS).into())
                        }
                        (Some(Child::Rwgt), WGT) => {
                            required(&attributes, WGT, ID)?;
                            return Err(StructureError::EmptyBlock(WGT).into());
                        }
                        _ => {}
                    }
                }
                Token::Text(t) | Token::CData(t) => match open.last_mut() {
                    None if !seen_child => text.push_str(&t),
                    Some(Child::Weights(list)) => list.push_str(&t),
                    Some(Child::Wgt { value, .. }) => value.push_str(&t),
                    _ => {}
                },
                Token::End(_) => match open.pop() {
                    None => break,
                    Some(Child::Weights(list)) => positional = Some(list),
                    Some(Child::Wgt { id, value }) => tagged.push((id, value)),
                    Some(Child::Rwgt | Child::Other) => {}
                },
                Token::Eof => return Err(TransportError::UnexpectedEof(EVENT.to_owned()).into()),
                Token::Comment(_) | Token::Other => {}
            }
        }

        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let info: EventInfo = lines
            .next()
            .ok_or(StructureError::EmptyBlock(EVENT))?
            .parse()?;
        let mut particles: Vec<Particle> = Vec::with_capacity(info.nparticles.max(0) as usize);
        let mut comments = Vec::new();
        for line in lines {
            if line.starts_with(COMMENT_START) {
                if with_weights {
                    comments.push(line.to_owned());
                }
            } else {
                particles.push(line.parse()?);
            }
        }
        if particles.len() != info.nparticles.max(0) as usize {
            warn!(
                "Event declares {} particles, but contains {}",
                info.nparticles,
                particles.len()
            );
        }
        let event = Event::new(info, particles);
        if !with_weights {
            return Ok(event);
        }

        let mut weights = Weights::new();
        if let Some(list) = positional {
            if list.trim().is_empty() {
                return Err(StructureError::EmptyBlock(WEIGHTS).into());
            }
            let init = &self.init;
            let index = self
                .weight_index
                .get_or_insert_with(|| WeightIndex::new(init));
            for (n, token) in list.split_whitespace().enumerate() {
                let value = float(WEIGHTS, WEIGHT, token)?;
                match index.id(n) {
                    Some(id) => {
                        weights.entry(id.to_owned()).or_insert(value);
                    }
                    None => debug!("Ignoring undeclared weight at position {n}"),
                }
            }
        }
        for (id, value) in tagged {
            let value = value.trim();
            if value.is_empty() {
                return Err(StructureError::EmptyBlock(WGT).into());
            }
            weights.insert(id, float(WGT, WEIGHT, value)?);
        }
        Ok(event
            .with_weights(weights)
            .with_attributes(event_attributes)
            .with_comments(comments))
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Event, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

impl Preamble {
    /// Read up to and including the first `<event>` start tag
    fn read<R: BufRead>(&mut self, tokens: &mut Tokenizer<R>) -> Result<State, ReadError> {
        loop {
            match tokens.next_token()? {
                Token::Start { name, attributes } if self.depth == 0 && name == LHEF => {
                    match attributes.get(VERSION) {
                        Some(version) => self.version = version.clone(),
                        None => warn!("<{LHEF}> tag without version"),
                    }
                    self.depth += 1;
                }
                Token::Start { name, attributes } => match name.as_str() {
                    HEADER => {
                        let root = new_element(&name, attributes);
                        self.header = Some(self.read_tree(tokens, root)?);
                    }
                    INIT => {
                        let text = self.read_text(tokens, INIT)?;
                        self.read_init_text(&text)?;
                    }
                    INITRWGT => self.read_initrwgt(tokens)?,
                    EVENT => {
                        if self.info.is_none() {
                            return Err(StructureError::MissingInit.into());
                        }
                        self.first_event = attributes;
                        return Ok(State::InEvent);
                    }
                    _ => self.depth += 1,
                },
                Token::Empty { name, .. } => match name.as_str() {
                    INIT => return Err(StructureError::EmptyBlock(INIT).into()),
                    EVENT if self.info.is_some() => return Ok(State::EmptyEvent),
                    EVENT => return Err(StructureError::MissingInit.into()),
                    _ => {}
                },
                Token::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Ok(State::Finished);
                    }
                }
                Token::Eof => return Err(TransportError::UnexpectedEof(LHEF.to_owned()).into()),
                _ => {}
            }
        }
    }

    fn read_init_text(&mut self, text: &str) -> Result<(), ReadError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let info = lines.next().ok_or(StructureError::EmptyBlock(INIT))?;
        self.info = Some(info.parse::<InitInfo>()?);
        self.processes = lines.map(str::parse).collect::<Result<Vec<ProcInfo>, _>>()?;
        Ok(())
    }

    /// Collect the text of the current element up to its first child
    ///
    /// `<initrwgt>` children are parsed, all other children are skipped.
    fn read_text<R: BufRead>(
        &mut self,
        tokens: &mut Tokenizer<R>,
        tag: &'static str,
    ) -> Result<String, ReadError> {
        let mut text = String::new();
        let mut seen_child = false;
        loop {
            match tokens.next_token()? {
                Token::Text(t) | Token::CData(t) if !seen_child => text.push_str(&t),
                Token::Start { name, .. } => {
                    seen_child = true;
                    if name == INITRWGT {
                        self.read_initrwgt(tokens)?;
                    } else {
                        skip_element(tokens)?;
                    }
                }
                Token::Empty { .. } => seen_child = true,
                Token::End(_) => return Ok(text),
                Token::Eof => return Err(TransportError::UnexpectedEof(tag.to_owned()).into()),
                _ => {}
            }
        }
    }

    /// Materialise the current element as a tree
    ///
    /// Whitespace-only text is dropped. `<initrwgt>` blocks are parsed into
    /// weight groups and not added to the tree.
    fn read_tree<R: BufRead>(
        &mut self,
        tokens: &mut Tokenizer<R>,
        mut root: XmlTree,
    ) -> Result<XmlTree, ReadError> {
        let mut open: Vec<XmlTree> = Vec::new();
        loop {
            let node = match tokens.next_token()? {
                Token::Start { name, .. } if name == INITRWGT => {
                    self.read_initrwgt(tokens)?;
                    None
                }
                Token::Start { name, attributes } => {
                    open.push(new_element(&name, attributes));
                    None
                }
                Token::Empty { name, attributes } => {
                    Some(XMLNode::Element(new_element(&name, attributes)))
                }
                Token::End(_) => match open.pop() {
                    Some(closed) => Some(XMLNode::Element(closed)),
                    None => return Ok(root),
                },
                Token::Text(t) if t.trim().is_empty() => None,
                Token::Text(t) => Some(XMLNode::Text(t)),
                Token::CData(t) => Some(XMLNode::CData(t)),
                Token::Comment(t) => Some(XMLNode::Comment(t)),
                Token::Eof => return Err(TransportError::UnexpectedEof(HEADER.to_owned()).into()),
                Token::Other => None,
            };
            if let Some(node) = node {
                open.last_mut().unwrap_or(&mut root).children.push(node);
            }
        }
    }

    /// Parse the weight groups in an `<initrwgt>` block
    fn read_initrwgt<R: BufRead>(&mut self, tokens: &mut Tokenizer<R>) -> Result<(), ReadError> {
        let mut group: Option<(String, WeightGroup)> = None;
        loop {
            match tokens.next_token()? {
                Token::Start { name, attributes } if name == WEIGHTGROUP && group.is_none() => {
                    let new = WeightGroup::from_attributes(attributes)
                        .ok_or(StructureError::MissingGroupKey)?;
                    group = Some(new);
                }
                Token::Empty { name, attributes } if name == WEIGHTGROUP && group.is_none() => {
                    let (key, empty) = WeightGroup::from_attributes(attributes)
                        .ok_or(StructureError::MissingGroupKey)?;
                    self.weight_groups.insert(key, empty);
                }
                Token::Start { name, attributes } if name == WEIGHT => {
                    let text = self.read_text(tokens, WEIGHT)?;
                    self.add_weight(group.as_mut(), attributes, text.trim())?;
                }
                Token::Empty { name, attributes } if name == WEIGHT => {
                    self.add_weight(group.as_mut(), attributes, "")?;
                }
                Token::Start { .. } => skip_element(tokens)?,
                Token::End(name) if name == WEIGHTGROUP => {
                    if let Some((key, done)) = group.take() {
                        self.weight_groups.insert(key, done);
                    }
                }
                Token::End(_) => return Ok(()),
                Token::Eof => {
                    return Err(TransportError::UnexpectedEof(INITRWGT.to_owned()).into())
                }
                _ => {}
            }
        }
    }

    fn add_weight(
        &mut self,
        group: Option<&mut (String, WeightGroup)>,
        attributes: XmlAttr,
        name: &str,
    ) -> Result<(), StructureError> {
        let id = required(&attributes, WEIGHT, ID)?;
        let Some((key, group)) = group else {
            warn!("Ignoring <{WEIGHT}> with id '{id}' outside of <{WEIGHTGROUP}>");
            return Ok(());
        };
        if group.weights.contains_key(&id) {
            warn!("Duplicate weight id '{id}' in group '{key}'");
        }
        let weight = WeightInfo {
            attributes,
            name: name.to_owned(),
            index: self.next_weight_index,
        };
        self.next_weight_index += 1;
        group.weights.insert(id, weight);
        Ok(())
    }
}

fn skip_element<R: BufRead>(tokens: &mut Tokenizer<R>) -> Result<(), ReadError> {
    let mut depth = 1usize;
    loop {
        match tokens.next_token()? {
            Token::Start { .. } => depth += 1,
            Token::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Token::Eof => return Err(TransportError::UnexpectedEof(LHEF.to_owned()).into()),
            _ => {}
        }
    }
}

fn new_element(name: &str, attributes: XmlAttr) -> XmlTree {
    let mut element = XmlTree::new(name);
    element.attributes.extend(attributes);
    element
}

fn required(
    attributes: &XmlAttr,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, StructureError> {
    attributes
        .get(attribute)
        .cloned()
        .ok_or(StructureError::MissingAttribute { element, attribute })
}

/// Count the events in an LHE file without parsing them
///
/// Self-closing `<event/>` tags are counted, although [Reader] rejects them.
/// Returns -1 if the input is not well-formed XML.
pub fn count_events<R: BufRead>(stream: R) -> i64 {
    let mut xml = quick_xml::Reader::from_reader(stream);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut count = 0;
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(_)) => depth += 1,
            Ok(XmlEvent::Empty(e)) if e.name().as_ref() == EVENT.as_bytes() => count += 1,
            Ok(XmlEvent::End(e)) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == EVENT.as_bytes() {
                    count += 1;
                }
                if depth == 0 {
                    return count;
                }
            }
            Ok(XmlEvent::Eof) => {
                warn!("Failed to count events: input ended before </{LHEF}>");
                return -1;
            }
            Err(err) => {
                warn!(
                    "Failed to count events: malformed XML at byte {}: {err}",
                    xml.buffer_position()
                );
                return -1;
            }
            _ => {}
        }
        buf.clear();
    }
}

impl LheFile {
    /// Read a whole LHE file into memory
    pub fn read<R: BufRead>(stream: R) -> Result<Self, ReadError> {
        Reader::new(stream)?.into_file()
    }
}

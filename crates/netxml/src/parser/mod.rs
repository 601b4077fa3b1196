//! Streaming NetXML parser.
//!
//! [`NetworkStream`] pulls events from quick-xml and keeps a stack of open
//! elements. Each element becomes a model object when its closing tag is
//! read and is attached to the frame below it; a closed `wireless-network`
//! at the top level is handed to the caller straight away, so only the
//! network currently being read is ever held in memory.
//!
//! Malformed XML ends the stream with a
//! [`StructuralError`](crate::StructuralError). Elements that
//! are well-formed but invalid are handled according to
//! [`ParseOptions::on_invalid`].

mod build;
mod frame;
mod position;
mod warning;

pub use position::Position;
pub use warning::{ParseWarning, WarningKind};

use crate::error::{ParseError, ValidationError};
use crate::model::{DocumentHeader, NetXmlDocument, WirelessNetwork};
use crate::registry::{self, ElementKind};
use frame::{Frame, Node};
use position::LineCounter;
use quick_xml::events::{BytesStart, Event};
use quick_xml::encoding::Decoder;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// What to do with an element that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Drop the element, log it, record it in
    /// [`NetworkStream::rejected`] and keep going.
    Skip,
    /// End the stream with [`ParseError::Validation`].
    #[default]
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub on_invalid: ValidationPolicy,
}

impl ParseOptions {
    pub fn skip_invalid() -> Self {
        Self {
            on_invalid: ValidationPolicy::Skip,
        }
    }
}

/// Everything a completed parse produced.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub document: NetXmlDocument,
    pub warnings: Vec<ParseWarning>,
    pub rejected: Vec<ValidationError>,
}

/// Parse networks lazily from `reader` with default options.
pub fn iterparse<R: Read>(reader: R) -> NetworkStream<BufReader<R>> {
    iterparse_with(reader, ParseOptions::default())
}

pub fn iterparse_with<R: Read>(reader: R, options: ParseOptions) -> NetworkStream<BufReader<R>> {
    NetworkStream::new(BufReader::new(reader), options)
}

/// Open `path` and parse it lazily with default options.
pub fn iterparse_path(path: impl AsRef<Path>) -> Result<NetworkStream<BufReader<File>>, ParseError> {
    let file = File::open(path.as_ref())?;
    Ok(iterparse(file))
}

/// Forward-only sequence of the networks in one document.
///
/// Yields `Err` at most once; the stream is finished afterwards. Dropping it
/// closes the source.
pub struct NetworkStream<R: BufRead> {
    reader: Reader<LineCounter<R>>,
    buf: Vec<u8>,
    stack: Vec<Frame>,
    header: DocumentHeader,
    warnings: Vec<ParseWarning>,
    rejected: Vec<ValidationError>,
    options: ParseOptions,
    done: bool,
}

/// One tokenizer event, copied out of the read buffer.
enum Step {
    Open {
        name: String,
        attributes: Vec<(String, String)>,
        empty: bool,
    },
    Text(String),
    Close,
    Eof,
    Ignore,
}

impl<'a> NetworkStream<&'a [u8]> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xml: &'a str) -> Self {
        Self::new(xml.as_bytes(), ParseOptions::default())
    }
}

impl<R: BufRead> NetworkStream<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        Self {
            reader: Reader::from_reader(LineCounter::new(reader)),
            buf: Vec::new(),
            stack: Vec::new(),
            header: DocumentHeader::default(),
            warnings: Vec::new(),
            rejected: Vec::new(),
            options,
            done: false,
        }
    }

    /// Document metadata read so far. Attributes of `detection-run` are
    /// available as soon as it opens; card sources as each one closes.
    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Elements dropped under [`ValidationPolicy::Skip`].
    pub fn rejected(&self) -> &[ValidationError] {
        &self.rejected
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Where the next event starts.
    pub fn stream_position(&self) -> Position {
        position_of(&self.reader)
    }

    /// Drain the remaining networks into a whole document.
    pub fn into_document(mut self) -> Result<ParsedDocument, ParseError> {
        let mut networks = Vec::new();
        for network in self.by_ref() {
            networks.push(network?);
        }
        Ok(ParsedDocument {
            document: NetXmlDocument {
                header: self.header,
                networks,
            },
            warnings: self.warnings,
            rejected: self.rejected,
        })
    }

    fn advance(&mut self) -> Result<Option<WirelessNetwork>, ParseError> {
        loop {
            let start = position_of(&self.reader);
            match self.read_step()? {
                Step::Open {
                    name,
                    attributes,
                    empty,
                } => {
                    self.open(name, attributes, start)?;
                    if empty {
                        if let Some(network) = self.close()? {
                            return Ok(Some(network));
                        }
                    }
                }
                Step::Text(text) => match self.stack.last_mut() {
                    Some(frame)
                        if matches!(frame.kind, ElementKind::Field(_) | ElementKind::Unrecognized) =>
                    {
                        frame.text.push_str(&text);
                    }
                    _ => {}
                },
                Step::Close => {
                    if let Some(network) = self.close()? {
                        return Ok(Some(network));
                    }
                }
                Step::Eof => {
                    return match self.stack.last() {
                        Some(frame) => Err(ParseError::structural(
                            format!(
                                "input ended inside <{}> opened at {}",
                                frame.name, frame.position
                            ),
                            position_of(&self.reader),
                        )),
                        None => Ok(None),
                    };
                }
                Step::Ignore => {}
            }
        }
    }

    fn read_step(&mut self) -> Result<Step, ParseError> {
        self.buf.clear();
        let event = match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => event,
            Err(err) => return Err(ParseError::from_xml(err, position_of(&self.reader))),
        };
        let at = position_of(&self.reader);
        let decoder = self.reader.decoder();

        let step = match event {
            Event::Start(ref e) => open_step(e, false, decoder, at)?,
            Event::Empty(ref e) => open_step(e, true, decoder, at)?,
            Event::End(_) => Step::Close,
            Event::Text(ref e) => Step::Text(
                e.unescape()
                    .map_err(|err| ParseError::from_xml(err, at))?
                    .into_owned(),
            ),
            Event::CData(ref e) => Step::Text(
                e.decode()
                    .map_err(|err| ParseError::from_xml(err.into(), at))?
                    .into_owned(),
            ),
            Event::Eof => Step::Eof,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => Step::Ignore,
        };
        Ok(step)
    }

    fn open(
        &mut self,
        name: String,
        attributes: Vec<(String, String)>,
        position: Position,
    ) -> Result<(), ParseError> {
        let parent = self.stack.last();
        let kind = registry::resolve(parent.map(|frame| frame.kind), &name);

        // Only the outermost unknown element is reported.
        if kind == ElementKind::Unrecognized
            && parent.map_or(true, |frame| frame.kind != ElementKind::Unrecognized)
        {
            let warning = ParseWarning::new(
                WarningKind::UnknownElement,
                name.as_str(),
                parent.map(|frame| frame.name.as_str()),
                position,
            );
            tracing::warn!("{warning}");
            self.warnings.push(warning);
        }

        let mut frame = Frame::new(kind, name, position, attributes);
        if kind == ElementKind::Document {
            let errors = build::document_attributes(
                &mut self.header,
                &frame.name,
                position,
                std::mem::take(&mut frame.attributes),
                &mut self.warnings,
            );
            for err in errors {
                self.reject(err)?;
            }
        }
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self) -> Result<Option<WirelessNetwork>, ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Err(ParseError::structural(
                "closing tag without an open element",
                position_of(&self.reader),
            ));
        };

        let node = match frame.kind {
            ElementKind::Field(field) => Node::Field(frame.into_leaf(field)),
            ElementKind::Unrecognized => Node::Raw(frame.into_raw()),
            ElementKind::Document => {
                let result = build::document_children(&mut self.header, frame, &mut self.warnings);
                if let Err(err) = result {
                    self.reject(err)?;
                }
                return Ok(None);
            }
            _ => match build::composite(frame, &mut self.warnings) {
                Ok(node) => node,
                Err(err) => {
                    self.reject(err)?;
                    return Ok(None);
                }
            },
        };

        let parent = self.stack.last_mut();
        match (node, parent) {
            (Node::Network(network), None) => return Ok(Some(emit(*network))),
            (Node::Network(network), Some(frame)) if frame.kind == ElementKind::Document => {
                return Ok(Some(emit(*network)));
            }
            (Node::CardSource(source), Some(frame)) if frame.kind == ElementKind::Document => {
                self.header.card_sources.push(source);
            }
            (Node::Raw(raw), None) => self.header.extensions.elements.push(raw),
            (node, Some(frame)) => frame.children.push(node),
            (_, None) => {}
        }
        Ok(None)
    }

    fn reject(&mut self, err: ValidationError) -> Result<(), ParseError> {
        match self.options.on_invalid {
            ValidationPolicy::Abort => Err(err.into()),
            ValidationPolicy::Skip => {
                tracing::warn!(element = err.element(), "skipping invalid element: {err}");
                self.rejected.push(err);
                Ok(())
            }
        }
    }
}

impl<R: BufRead> Iterator for NetworkStream<R> {
    type Item = Result<WirelessNetwork, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(network)) => Some(Ok(network)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for NetworkStream<R> {}

impl NetXmlDocument {
    /// Parse a whole document held in memory, aborting on invalid elements.
    pub fn parse(xml: &[u8]) -> Result<Self, ParseError> {
        NetworkStream::new(xml, ParseOptions::default())
            .into_document()
            .map(|parsed| parsed.document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        iterparse_path(path)?
            .into_document()
            .map(|parsed| parsed.document)
    }
}

fn position_of<R: BufRead>(reader: &Reader<LineCounter<R>>) -> Position {
    Position {
        byte: reader.buffer_position() as u64,
        line: reader.get_ref().line(),
    }
}

fn emit(network: WirelessNetwork) -> WirelessNetwork {
    tracing::debug!(
        bssid = %network.bssid,
        ssids = network.ssid_records.len(),
        clients = network.clients.len(),
        "parsed network"
    );
    network
}

/// Decode raw bytes with the encoding the document declared.
fn text(decoder: Decoder, bytes: &[u8], position: Position) -> Result<String, ParseError> {
    decoder
        .decode(bytes)
        .map(|text| text.into_owned())
        .map_err(|err| ParseError::from_xml(err.into(), position))
}

fn open_step(
    e: &BytesStart<'_>,
    empty: bool,
    decoder: Decoder,
    position: Position,
) -> Result<Step, ParseError> {
    let name = text(decoder, e.local_name().as_ref(), position)?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::structural(err.to_string(), position))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|err| ParseError::from_xml(err, position))?;
        attributes.push((text(decoder, attr.key.local_name().as_ref(), position)?, value.into_owned()));
    }
    Ok(Step::Open {
        name,
        attributes,
        empty,
    })
}

//! Files and gzip compression
//!
//! Compressed input is recognised by its magic bytes, not by the file
//! name. Output is compressed on request or if the file name ends in `.gz`
//! or `.gzip`.
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

use crate::data::{Init, LheFile};
use crate::error::{ReadError, WriteError};
use crate::reader::{count_events, ReadOptions, Reader};
use crate::writer::WeightStyle;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A (decompressed) input stream
pub type Input = Box<dyn BufRead + Send>;

/// Check whether the buffered input starts with the gzip magic bytes
pub fn is_gzip<R: BufRead>(stream: &mut R) -> io::Result<bool> {
    Ok(stream.fill_buf()?.starts_with(&GZIP_MAGIC))
}

/// Wrap `stream` in a gzip decoder if it is compressed
///
/// Concatenated gzip members are read as one stream.
pub fn decompress<R>(mut stream: R, capacity: usize) -> io::Result<Input>
where
    R: BufRead + Send + 'static,
{
    if is_gzip(&mut stream)? {
        debug!("Reading gzip-compressed input");
        let decoder = MultiGzDecoder::new(stream);
        Ok(Box::new(BufReader::with_capacity(capacity, decoder)))
    } else {
        Ok(Box::new(stream))
    }
}

/// Open a plain or gzip-compressed file
pub fn open(path: impl AsRef<Path>, capacity: usize) -> io::Result<Input> {
    let path = path.as_ref();
    debug!("Opening {}", path.display());
    let file = File::open(path)?;
    decompress(BufReader::with_capacity(capacity, file), capacity)
}

/// A plain or gzip-compressed output file
#[derive(Debug)]
pub enum Output {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    /// Flush all data and, if compressing, write the gzip trailer
    pub fn finish(self) -> io::Result<()> {
        match self {
            Output::Plain(mut file) => file.flush(),
            Output::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Plain(file) => file.write(buf),
            Output::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Plain(file) => file.flush(),
            Output::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Create an output file
///
/// The output is compressed if `gzip` is set or the file name ends in
/// `.gz` or `.gzip`.
pub fn create(path: impl AsRef<Path>, gzip: bool) -> io::Result<Output> {
    let path = path.as_ref();
    let gzip = gzip
        || path
            .extension()
            .is_some_and(|ext| ext == "gz" || ext == "gzip");
    debug!("Creating {} (gzip: {gzip})", path.display());
    let file = BufWriter::new(File::create(path)?);
    if gzip {
        Ok(Output::Gzip(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(Output::Plain(file))
    }
}

fn reader(path: &Path, options: ReadOptions) -> Result<Reader<Input>, ReadError> {
    let input = open(path, options.buffer_capacity)?;
    Reader::with_options(input, options)
}

/// Read only the `<init>` block of a file
pub fn read_lhe_init(path: impl AsRef<Path>) -> Result<Init, ReadError> {
    let reader = reader(path.as_ref(), ReadOptions::default())?;
    Ok(reader.init().clone())
}

/// Stream the events of a file, without attributes, comments or weights
pub fn read_lhe(path: impl AsRef<Path>) -> Result<Reader<Input>, ReadError> {
    reader(path.as_ref(), ReadOptions::plain())
}

/// Stream the events of a file, including attributes, comments and weights
pub fn read_lhe_with_attributes(path: impl AsRef<Path>) -> Result<Reader<Input>, ReadError> {
    reader(path.as_ref(), ReadOptions::default())
}

/// Read a whole file into memory
pub fn read_lhe_file(path: impl AsRef<Path>, with_attributes: bool) -> Result<LheFile, ReadError> {
    let options = if with_attributes {
        ReadOptions::default()
    } else {
        ReadOptions::plain()
    };
    reader(path.as_ref(), options)?.into_file()
}

/// Count the events in a file
///
/// Returns -1 if the file is not well-formed XML, see [count_events].
pub fn read_num_events(path: impl AsRef<Path>) -> io::Result<i64> {
    let input = open(path, ReadOptions::default().buffer_capacity)?;
    Ok(count_events(input))
}

/// Write a whole file, compressed if `gzip` is set or the file name ends in
/// `.gz` or `.gzip`
pub fn write_lhe_file_path(
    file: &LheFile,
    path: impl AsRef<Path>,
    gzip: bool,
    weight_style: WeightStyle,
) -> Result<(), WriteError> {
    let output = create(path, gzip)?;
    let output = file.write(output, weight_style)?;
    output.finish()?;
    Ok(())
}

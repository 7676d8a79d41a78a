//! Whole-file envelopes
//!
//! A dump may be wrapped as a whole in the outer stream of its own
//! compression so it can be opened directly by the named compressor.
//! Readers sniff the magic bytes and unwrap transparently.

use std::io::{self, BufRead, Read, Write};

use super::{Compression, BEST_LEVEL, XZ_PRESET};

/// Writer optionally wrapped in a whole-file compression stream
pub enum EnvelopeWriter<W: Write> {
    Plain(W),
    Bz2(bzip2::write::BzEncoder<W>),
    Gzip(flate2::write::GzEncoder<W>),
    Xz(xz2::write::XzEncoder<W>),
}

impl<W: Write> EnvelopeWriter<W> {
    pub fn new(inner: W, envelope: Option<Compression>) -> Self {
        match envelope {
            None => EnvelopeWriter::Plain(inner),
            Some(Compression::Bz2) => EnvelopeWriter::Bz2(bzip2::write::BzEncoder::new(
                inner,
                bzip2::Compression::new(BEST_LEVEL),
            )),
            Some(Compression::Gzip) => EnvelopeWriter::Gzip(flate2::write::GzEncoder::new(
                inner,
                flate2::Compression::new(BEST_LEVEL),
            )),
            Some(Compression::Xz) => {
                EnvelopeWriter::Xz(xz2::write::XzEncoder::new(inner, XZ_PRESET))
            }
        }
    }

    /// Terminate the envelope stream and hand back the inner writer
    pub fn finish(self) -> io::Result<W> {
        match self {
            EnvelopeWriter::Plain(w) => Ok(w),
            EnvelopeWriter::Bz2(enc) => enc.finish(),
            EnvelopeWriter::Gzip(enc) => enc.finish(),
            EnvelopeWriter::Xz(enc) => enc.finish(),
        }
    }
}

impl<W: Write> Write for EnvelopeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EnvelopeWriter::Plain(w) => w.write(buf),
            EnvelopeWriter::Bz2(enc) => enc.write(buf),
            EnvelopeWriter::Gzip(enc) => enc.write(buf),
            EnvelopeWriter::Xz(enc) => enc.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EnvelopeWriter::Plain(w) => w.flush(),
            EnvelopeWriter::Bz2(enc) => enc.flush(),
            EnvelopeWriter::Gzip(enc) => enc.flush(),
            EnvelopeWriter::Xz(enc) => enc.flush(),
        }
    }
}

/// Reader that strips a whole-file compression stream, if any
pub enum EnvelopeReader<R: BufRead> {
    Plain(R),
    Bz2(bzip2::bufread::MultiBzDecoder<R>),
    Gzip(flate2::bufread::MultiGzDecoder<R>),
    Xz(xz2::bufread::XzDecoder<R>),
}

impl<R: BufRead> EnvelopeReader<R> {
    /// Wrap `inner` in the decoder named by its leading magic bytes
    ///
    /// Peeks at the buffer without consuming anything, so a plain stream is
    /// passed through untouched.
    ///
    /// A plain stream whose first length prefix happens to spell a magic
    /// number (a metadata record of 35615 bytes reads as gzip) is
    /// misdetected. [`RecordWriter::write_metadata`](crate::record::RecordWriter::write_metadata)
    /// pads its record to avoid this; files from other producers can be read
    /// with an explicit envelope instead.
    pub fn detect(mut inner: R) -> io::Result<Self> {
        let envelope = Compression::detect(inner.fill_buf()?);
        Ok(Self::with_envelope(inner, envelope))
    }

    /// Wrap `inner` in a known envelope (`None` for a plain stream)
    pub fn with_envelope(inner: R, envelope: Option<Compression>) -> Self {
        match envelope {
            None => EnvelopeReader::Plain(inner),
            Some(Compression::Bz2) => {
                EnvelopeReader::Bz2(bzip2::bufread::MultiBzDecoder::new(inner))
            }
            Some(Compression::Gzip) => {
                EnvelopeReader::Gzip(flate2::bufread::MultiGzDecoder::new(inner))
            }
            Some(Compression::Xz) => {
                EnvelopeReader::Xz(xz2::bufread::XzDecoder::new_multi_decoder(inner))
            }
        }
    }

    /// Envelope this reader strips
    pub fn envelope(&self) -> Option<Compression> {
        match self {
            EnvelopeReader::Plain(_) => None,
            EnvelopeReader::Bz2(_) => Some(Compression::Bz2),
            EnvelopeReader::Gzip(_) => Some(Compression::Gzip),
            EnvelopeReader::Xz(_) => Some(Compression::Xz),
        }
    }
}

impl<R: BufRead> Read for EnvelopeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EnvelopeReader::Plain(r) => r.read(buf),
            EnvelopeReader::Bz2(dec) => dec.read(buf),
            EnvelopeReader::Gzip(dec) => dec.read(buf),
            EnvelopeReader::Xz(dec) => dec.read(buf),
        }
    }
}

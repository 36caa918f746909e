//! Frame source boundary. Pixel decoding happens elsewhere (a `zbarcam`
//! style tool); this module only sees decoded strings tagged with their
//! symbology and decides which of them may enter the pipeline.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

/// Barcode symbology as reported by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbology {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Isbn10,
    Isbn13,
    Code128,
    QrCode,
    Other(String),
}

impl Symbology {
    /// Map a zbar symbology name (`EAN-13`, `QR-Code`, ...) to a tag.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "EAN-13" | "EAN13" => Symbology::Ean13,
            "EAN-8" | "EAN8" => Symbology::Ean8,
            "UPC-A" | "UPCA" => Symbology::UpcA,
            "UPC-E" | "UPCE" => Symbology::UpcE,
            "ISBN-10" | "ISBN10" => Symbology::Isbn10,
            "ISBN-13" | "ISBN13" => Symbology::Isbn13,
            "CODE-128" | "CODE128" => Symbology::Code128,
            "QR-CODE" | "QRCODE" => Symbology::QrCode,
            _ => Symbology::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcA => "UPC-A",
            Symbology::UpcE => "UPC-E",
            Symbology::Isbn10 => "ISBN-10",
            Symbology::Isbn13 => "ISBN-13",
            Symbology::Code128 => "CODE-128",
            Symbology::QrCode => "QR-Code",
            Symbology::Other(name) => name.as_str(),
        };
        f.write_str(name)
    }
}

/// One decoded barcode from one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub symbology: Symbology,
    pub data: String,
}

impl DecodedBarcode {
    pub fn new(symbology: Symbology, data: impl Into<String>) -> Self {
        Self {
            symbology,
            data: data.into(),
        }
    }

    /// Parse a `SYMBOLOGY:data` line. Blank lines and lines without a tag
    /// yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (name, data) = line.trim().split_once(':')?;
        if name.trim().is_empty() || data.trim().is_empty() {
            return None;
        }
        Some(Self::new(Symbology::from_name(name), data.trim()))
    }

    /// Only EAN-13 symbols are book barcodes; everything else stays out of
    /// the pipeline.
    pub fn is_book_candidate(&self) -> bool {
        self.symbology == Symbology::Ean13
    }
}

/// Anything that yields decoded barcodes without blocking.
pub trait FrameSource {
    /// The next decoded barcode, or `None` when nothing is waiting.
    fn poll(&mut self) -> Option<DecodedBarcode>;

    /// True once the source can never yield again.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Poll `source` until an EAN-13 payload turns up or nothing is waiting.
/// Other symbologies are dropped here so the pipeline never sees them.
pub fn next_candidate(source: &mut dyn FrameSource) -> Option<String> {
    while let Some(barcode) = source.poll() {
        if barcode.is_book_candidate() {
            return Some(barcode.data);
        }
        debug!(symbology = %barcode.symbology, data = %barcode.data, "ignoring non EAN-13 barcode");
    }
    None
}

/// Frame source fed by a line-oriented reader (a file, FIFO or pipe from a
/// decoder process). A background thread does the blocking reads; `poll`
/// never waits.
pub struct LineFeed {
    receiver: Receiver<DecodedBarcode>,
    reader: Option<JoinHandle<()>>,
    finished: bool,
}

impl LineFeed {
    /// Read `SYMBOLOGY:data` lines from `path`. Opening a FIFO blocks until a
    /// writer appears, so only existence is checked here and the open itself
    /// happens on the reader thread.
    pub fn open(path: &Path) -> io::Result<Self> {
        fs::metadata(path)?;
        info!(path = %path.display(), "reading barcodes from feed");
        let path = path.to_path_buf();
        Ok(Self::spawn(move |sender| match File::open(&path) {
            Ok(file) => forward_lines(BufReader::new(file), &sender),
            Err(err) => warn!(path = %path.display(), error = %err, "could not open barcode feed"),
        }))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::spawn(move |sender| forward_lines(reader, &sender))
    }

    fn spawn<F>(work: F) -> Self
    where
        F: FnOnce(Sender<DecodedBarcode>) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || {
            work(sender);
            debug!("barcode feed closed");
        });

        Self {
            receiver,
            reader: Some(handle),
            finished: false,
        }
    }
}

fn forward_lines<R: BufRead>(reader: R, sender: &Sender<DecodedBarcode>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "barcode feed read failed");
                return;
            }
        };
        let Some(barcode) = DecodedBarcode::parse_line(&line) else {
            continue;
        };
        if sender.send(barcode).is_err() {
            return;
        }
    }
}

impl FrameSource for LineFeed {
    /// True once the reader hit end of input and every barcode was polled.
    fn is_finished(&self) -> bool {
        self.finished
    }

    fn poll(&mut self) -> Option<DecodedBarcode> {
        match self.receiver.try_recv() {
            Ok(barcode) => Some(barcode),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.finished {
                    self.finished = true;
                    if let Some(handle) = self.reader.take() {
                        let _ = handle.join();
                    }
                }
                None
            }
        }
    }
}

//! Content type detection from leading bytes.

/// A byte sequence expected at a fixed offset.
#[derive(Debug, Clone, Copy)]
struct Magic {
    offset: usize,
    bytes: &'static [u8],
}

impl Magic {
    const fn at(offset: usize, bytes: &'static [u8]) -> Self {
        Self { offset, bytes }
    }

    fn matches(&self, buf: &[u8]) -> bool {
        buf.get(self.offset..self.offset + self.bytes.len()) == Some(self.bytes)
    }
}

/// A known file signature; every part must match.
#[derive(Debug)]
struct Signature {
    parts: &'static [Magic],
    mime: &'static str,
    extension: &'static str,
}

impl Signature {
    fn matches(&self, buf: &[u8]) -> bool {
        self.parts.iter().all(|m| m.matches(buf))
    }
}

// More specific signatures first: RIFF containers share their first four bytes.
static SIGNATURES: &[Signature] = &[
    Signature {
        parts: &[Magic::at(0, b"\x89PNG\r\n\x1a\n")],
        mime: "image/png",
        extension: "png",
    },
    Signature {
        parts: &[Magic::at(0, b"\xff\xd8\xff")],
        mime: "image/jpeg",
        extension: "jpg",
    },
    Signature {
        parts: &[Magic::at(0, b"GIF87a")],
        mime: "image/gif",
        extension: "gif",
    },
    Signature {
        parts: &[Magic::at(0, b"GIF89a")],
        mime: "image/gif",
        extension: "gif",
    },
    Signature {
        parts: &[Magic::at(0, b"RIFF"), Magic::at(8, b"WEBP")],
        mime: "image/webp",
        extension: "webp",
    },
    Signature {
        parts: &[Magic::at(0, b"RIFF"), Magic::at(8, b"WAVE")],
        mime: "audio/wav",
        extension: "wav",
    },
    Signature {
        parts: &[Magic::at(0, b"II*\x00")],
        mime: "image/tiff",
        extension: "tiff",
    },
    Signature {
        parts: &[Magic::at(0, b"MM\x00*")],
        mime: "image/tiff",
        extension: "tiff",
    },
    Signature {
        parts: &[Magic::at(0, b"\x00\x00\x01\x00")],
        mime: "image/x-icon",
        extension: "ico",
    },
    Signature {
        parts: &[Magic::at(0, b"BM")],
        mime: "image/bmp",
        extension: "bmp",
    },
    Signature {
        parts: &[Magic::at(0, b"%PDF-")],
        mime: "application/pdf",
        extension: "pdf",
    },
    Signature {
        parts: &[Magic::at(0, b"PK\x03\x04")],
        mime: "application/zip",
        extension: "zip",
    },
    Signature {
        parts: &[Magic::at(0, b"\x1f\x8b")],
        mime: "application/gzip",
        extension: "gz",
    },
    Signature {
        parts: &[Magic::at(0, b"7z\xbc\xaf\x27\x1c")],
        mime: "application/x-7z-compressed",
        extension: "7z",
    },
    Signature {
        parts: &[Magic::at(0, b"Rar!\x1a\x07")],
        mime: "application/x-rar-compressed",
        extension: "rar",
    },
    Signature {
        parts: &[Magic::at(0, b"ID3")],
        mime: "audio/mpeg",
        extension: "mp3",
    },
    Signature {
        parts: &[Magic::at(0, b"fLaC")],
        mime: "audio/flac",
        extension: "flac",
    },
    Signature {
        parts: &[Magic::at(0, b"OggS")],
        mime: "application/ogg",
        extension: "ogg",
    },
    Signature {
        parts: &[Magic::at(4, b"ftyp")],
        mime: "video/mp4",
        extension: "mp4",
    },
    Signature {
        parts: &[Magic::at(0, b"\x1a\x45\xdf\xa3")],
        mime: "video/webm",
        extension: "webm",
    },
];

/// Result of content detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detected {
    /// MIME essence, without parameters
    pub mime: &'static str,
    /// Canonical extension without the leading dot, empty when unknown
    pub extension: &'static str,
}

const TEXT: Detected = Detected {
    mime: "text/plain",
    extension: "txt",
};

const BINARY: Detected = Detected {
    mime: "application/octet-stream",
    extension: "",
};

/// Detect the content type of a buffer holding the start of a file.
pub fn detect(buf: &[u8]) -> Detected {
    if let Some(sig) = SIGNATURES.iter().find(|sig| sig.matches(buf)) {
        return Detected {
            mime: sig.mime,
            extension: sig.extension,
        };
    }

    if is_text(buf) {
        TEXT
    } else {
        BINARY
    }
}

/// UTF-8 without NUL bytes. A multi-byte sequence cut off by the sniff
/// window still counts as text.
fn is_text(buf: &[u8]) -> bool {
    if buf.is_empty() || buf.contains(&0) {
        return false;
    }
    match std::str::from_utf8(buf) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

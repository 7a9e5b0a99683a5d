use crate::error::{CodecError, Error};
use crate::kind::DocumentKind;

/// Result of stripping one document
pub struct Stripped {
    /// Serialized output document
    pub bytes: Vec<u8>,
    /// Hyperlink wrappers unwrapped (Word) or annotations dropped (PDF)
    pub removed: usize,
}

/// Trait for format-specific link stripping (Word, PDF, ...)
pub trait DocumentCodec {
    /// Which document kind this codec handles
    fn kind(&self) -> DocumentKind;
    /// Parse `input`, remove its link constructs and serialize the result
    fn strip(&self, input: &[u8]) -> Result<Stripped, CodecError>;
}

/// The codecs available to a dispatcher, at most one per document kind.
///
/// A kind without a codec is a valid state: files of that kind fail with
/// [`Error::CodecUnavailable`] instead of aborting the batch.
#[derive(Default)]
pub struct Codecs {
    word: Option<Box<dyn DocumentCodec>>,
    pdf: Option<Box<dyn DocumentCodec>>,
}

impl Codecs {
    /// A registry with no codecs at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every codec compiled into this build.
    pub fn builtin() -> Self {
        #[allow(unused_mut)]
        let mut codecs = Self::empty();
        #[cfg(feature = "docx")]
        {
            codecs = codecs.with(crate::docx::WordCodec);
        }
        #[cfg(feature = "pdf")]
        {
            codecs = codecs.with(crate::pdf::PdfCodec);
        }
        codecs
    }

    /// Register `codec`, replacing any codec of the same kind.
    pub fn with(mut self, codec: impl DocumentCodec + 'static) -> Self {
        let slot = match codec.kind() {
            DocumentKind::Word => &mut self.word,
            DocumentKind::Pdf => &mut self.pdf,
        };
        *slot = Some(Box::new(codec));
        self
    }

    pub fn get(&self, kind: DocumentKind) -> Result<&dyn DocumentCodec, Error> {
        let slot = match kind {
            DocumentKind::Word => &self.word,
            DocumentKind::Pdf => &self.pdf,
        };
        slot.as_deref().ok_or(Error::CodecUnavailable {
            kind,
            feature: kind.feature(),
        })
    }

    pub fn supports(&self, kind: DocumentKind) -> bool {
        self.get(kind).is_ok()
    }
}

//! lopdf-backed implementation of [`PdfBackend`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::content::{build_fragments, decode_text_simple, ContentInterpreter, PageBox};
use super::PdfBackend;
use crate::error::{Error, Result};
use crate::model::Page;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Upper bound on `/Parent` hops when resolving inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Open a PDF file.
    ///
    /// Any failure is reported as [`Error::DecodeOpen`] naming the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::DecodeOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&data).map_err(|e| match e {
            Error::DecodeOpen { .. } => e,
            other => Error::DecodeOpen {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(Error::UnknownFormat);
        }

        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }

    fn page_id(&self, number: u32) -> Result<ObjectId> {
        self.pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, self.pages.len() as u32))
    }

    /// Look up a page attribute, following `/Parent` for inheritable keys.
    fn inherited<'a>(&'a self, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// A rectangle attribute (`/MediaBox`, `/CropBox`), inheritable.
    fn rect(&self, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
        let numbers: Vec<f32> = self
            .inherited(page_id, key)
            .and_then(|obj| match obj {
                Object::Reference(r) => self.doc.get_object(*r).ok(),
                other => Some(other),
            })
            .and_then(|obj| obj.as_array().ok())?
            .iter()
            .filter_map(|o| o.as_float().ok())
            .collect();

        match numbers.as_slice() {
            [x0, y0, x1, y1, ..] => Some([*x0, *y0, *x1, *y1]),
            _ => None,
        }
    }

    /// Visible page box: `/CropBox` clipped to `/MediaBox`, plus `/Rotate`.
    fn page_box(&self, page_id: ObjectId) -> PageBox {
        let media = match self.rect(page_id, b"MediaBox") {
            Some(rect) => PageBox::from_corners(rect, 0),
            // Default to Letter size
            None => PageBox::LETTER,
        };

        let visible = match self.rect(page_id, b"CropBox") {
            Some(rect) => {
                let crop = PageBox::from_corners(rect, 0);
                let clipped = PageBox {
                    x0: crop.x0.max(media.x0),
                    y0: crop.y0.max(media.y0),
                    x1: crop.x1.min(media.x1),
                    y1: crop.y1.min(media.y1),
                    rotation: 0,
                };
                if clipped.x1 > clipped.x0 && clipped.y1 > clipped.y0 {
                    clipped
                } else {
                    media
                }
            }
            None => media,
        };

        PageBox {
            rotation: self.rotation(page_id),
            ..visible
        }
    }

    /// `/Rotate` normalized to 0, 90, 180 or 270.
    fn rotation(&self, page_id: ObjectId) -> u16 {
        let degrees = self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);
        match degrees {
            90 | 180 | 270 => degrees as u16,
            _ => 0,
        }
    }

    /// Names of image XObjects reachable from the page resources.
    fn image_names(&self, page_id: ObjectId) -> HashSet<Vec<u8>> {
        let mut names = HashSet::new();

        let xobjects = self
            .inherited(page_id, b"Resources")
            .and_then(|res| self.resolve_dict(res))
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|xobj| self.resolve_dict(xobj));

        if let Some(xobjects) = xobjects {
            for (name, obj) in xobjects.iter() {
                let is_image = obj
                    .as_reference()
                    .ok()
                    .and_then(|r| self.doc.get_object(r).ok())
                    .and_then(|o| o.as_stream().ok())
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|st| st.as_name_str().ok())
                    == Some("Image");
                if is_image {
                    names.insert(name.clone());
                }
            }
        }

        names
    }

    /// Get the decompressed page content stream.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        // A page without /Contents is blank.
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(stream_data(s)),
                Ok(Object::Array(arr)) => self.concat_streams(arr),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => self.concat_streams(arr),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    content.extend_from_slice(&stream_data(s));
                    content.push(b' ');
                }
            }
        }
        Ok(content)
    }

    fn decode_page(&self, number: u32) -> Result<Page> {
        let page_id = self.page_id(number)?;
        let page_box = self.page_box(page_id);

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = self.page_content(page_id)?;
        let operations = lopdf::content::Content::decode(&content)
            .map_err(|e| Error::PdfParse(e.to_string()))?
            .operations;

        let decode = |font_name: &[u8], bytes: &[u8]| -> String {
            fonts
                .get(font_name)
                .and_then(|font| font.get_font_encoding(&self.doc).ok())
                .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        };

        let interpreter = ContentInterpreter::new(decode, self.image_names(page_id));
        let items = interpreter.run(&operations);

        let mut page = Page::new(number, page_box.width(), page_box.height());
        page.fragments = build_fragments(&items, page_box);
        Ok(page)
    }
}

/// Decoded stream bytes; unfiltered streams are returned as stored.
fn stream_data(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<Page> {
        self.decode_page(number).map_err(|e| e.at_page(number))
    }

    fn page_text(&self, number: u32) -> Result<String> {
        self.page_id(number).map_err(|e| e.at_page(number))?;
        self.doc
            .extract_text(&[number])
            .map_err(|e| Error::DecodeFragment {
                page: number,
                reason: e.to_string(),
            })
    }
}

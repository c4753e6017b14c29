//! Small helpers for walking lopdf object graphs.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

/// Page trees deeper than this are treated as malformed.
const MAX_TREE_DEPTH: usize = 32;

/// Letter size, used when a page declares no usable box.
const DEFAULT_PAGE_BOX: PageBox = PageBox {
    llx: 0.0,
    lly: 0.0,
    urx: 612.0,
    ury: 792.0,
};

/// Visible region of a page in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    /// Width in points.
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    /// Height in points.
    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Convert a user-space point to top-left-origin page coordinates.
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.llx, self.ury - y)
    }

    fn from_array(values: &[Object]) -> Option<Self> {
        if values.len() < 4 {
            return None;
        }
        let n: Vec<f32> = values[..4].iter().filter_map(number).collect();
        if n.len() != 4 {
            return None;
        }
        let page_box = PageBox {
            llx: n[0].min(n[2]),
            lly: n[1].min(n[3]),
            urx: n[0].max(n[2]),
            ury: n[1].max(n[3]),
        };
        (page_box.width() > 0.0 && page_box.height() > 0.0).then_some(page_box)
    }

    fn intersect(&self, other: &PageBox) -> Option<PageBox> {
        let clipped = PageBox {
            llx: self.llx.max(other.llx),
            lly: self.lly.max(other.lly),
            urx: self.urx.min(other.urx),
            ury: self.ury.min(other.ury),
        };
        (clipped.width() > 0.0 && clipped.height() > 0.0).then_some(clipped)
    }
}

/// Follow one level of indirection.
pub fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve to a dictionary, accepting a stream's dictionary as well.
pub fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up `key` on a dictionary entry and resolve it to a dictionary.
pub fn dict_entry<'a>(
    doc: &'a LopdfDocument,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key).ok().and_then(|obj| resolve_dict(doc, obj))
}

/// Numeric value of an integer or real object.
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Look up a page attribute, walking up `/Parent` links for inheritable keys.
pub fn inherited<'a>(doc: &'a LopdfDocument, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = current {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            log::warn!("Page tree above {:?} is too deep, giving up", page_id);
            break;
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    None
}

/// The resource dictionary in effect for a page.
pub fn page_resources(doc: &LopdfDocument, page_id: ObjectId) -> Option<&Dictionary> {
    match inherited(doc, page_id, b"Resources")? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// The page's CropBox clipped to its MediaBox, falling back to Letter.
pub fn page_box(doc: &LopdfDocument, page_id: ObjectId) -> PageBox {
    let read = |key: &[u8]| {
        inherited(doc, page_id, key)
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| PageBox::from_array(arr))
    };

    let media = read(b"MediaBox");
    let crop = read(b"CropBox");

    match (media, crop) {
        (Some(media), Some(crop)) => crop.intersect(&media).unwrap_or(media),
        (Some(media), None) => media,
        (None, Some(crop)) => crop,
        (None, None) => {
            log::debug!("Page {:?} has no MediaBox, assuming Letter", page_id);
            DEFAULT_PAGE_BOX
        }
    }
}

use crate::core::field::SelectedFile;

/// The value a rule sees for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Text(&'a str),
    Files(&'a [SelectedFile]),
}

impl<'a> RawValue<'a> {
    /// Text for text-based rules. A file selection has no text.
    pub fn text(&self) -> &'a str {
        match self {
            Self::Text(v) => v,
            Self::Files(_) => "",
        }
    }

    pub fn files(&self) -> &'a [SelectedFile] {
        match self {
            Self::Files(files) => files,
            Self::Text(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(v) => v.is_empty(),
            Self::Files(files) => files.is_empty(),
        }
    }
}

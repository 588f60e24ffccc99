//! Query options
//!
//! Structured replacements for the get/post flag words.

/// Key ordering for lookups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Directory / cache order
    #[default]
    None,
    Asc,
    Desc,
}

/// What a lookup does with the keys it resolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Keys and record bodies
    #[default]
    Read,
    /// Keys only
    Keys,
    /// Count only
    Count,
    /// Remove what matched
    Delete,
}

/// Options for `Engine::get`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub order: Order,
    pub mode: Mode,
}

impl GetOptions {
    /// Read keys and records in directory order
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys only
    pub fn keys() -> Self {
        Self::new().mode(Mode::Keys)
    }

    /// Count only
    pub fn count() -> Self {
        Self::new().mode(Mode::Count)
    }

    /// Delete matches
    pub fn delete() -> Self {
        Self::new().mode(Mode::Delete)
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sorting only makes sense when keys or records are returned
    pub(crate) fn sorts(&self) -> bool {
        self.order != Order::None && matches!(self.mode, Mode::Read | Mode::Keys)
    }
}

/// Options for `Engine::post`
///
/// Both augmentations may be combined; the sequence prefix is applied first
/// and the GUID goes in front of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostOptions {
    /// Prefix the key with the collection's next sequence number
    pub auto_increment: bool,

    /// Prefix the key with a freshly generated GUID
    pub guid: bool,
}

impl PostOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_increment(mut self, enabled: bool) -> Self {
        self.auto_increment = enabled;
        self
    }

    pub fn guid(mut self, enabled: bool) -> Self {
        self.guid = enabled;
        self
    }
}

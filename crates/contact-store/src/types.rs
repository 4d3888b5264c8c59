use serde::{Deserialize, Serialize};

/// A stored address-book entry. Names are free text and not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// How a contact's name matched a search fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchKind {
    /// Name starts with the fragment
    Prefix,
    /// Fragment occurs elsewhere in the name
    Substring,
}

/// A search hit with its match class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMatch {
    pub contact: Contact,
    pub kind: MatchKind,
}

/// A contact picked for a contact action, with the number ready to dial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContact {
    pub contact: Contact,
    /// Fragment the lookup used, after stop-word removal
    pub fragment: String,
    /// Phone number including the country prefix
    pub phone: String,
    pub kind: MatchKind,
}

/// Where a launch shortcut points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchTarget {
    /// Local application path
    App(String),
    /// Web address
    Web(String),
}

/// Column layout of a delimited address-book export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSpec {
    pub name_col: usize,
    pub phone_col: usize,
    pub email_col: Option<usize>,
    pub delimiter: char,
    pub has_header: bool,
}

impl Default for ImportSpec {
    fn default() -> Self {
        // Column positions of a Google Contacts CSV export
        Self {
            name_col: 0,
            phone_col: 21,
            email_col: None,
            delimiter: ',',
            has_header: true,
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Rows too short or missing a name or phone
    pub skipped: usize,
    /// Number of columns in the header row, if one was read
    pub header_columns: Option<usize>,
}

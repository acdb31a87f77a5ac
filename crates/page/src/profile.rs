//! Static portfolio content: everything on the page that does not come from
//! object storage.

use serde::Deserialize;
use url::Url;

/// The person (or team) the page presents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Document `<title>`; falls back to `name` when empty.
    pub title: String,
    pub name: String,
    pub role: String,
    pub about: String,
    /// Portrait image URL or path; also used as the favicon.
    pub photo: Option<String>,
    /// CV offered as a download from the header.
    pub resume: Option<String>,
    /// Contact line in the footer, e.g. an email address.
    pub contact: Option<String>,
    /// Footer notice, e.g. a copyright line.
    pub footer: Option<String>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    /// Video panels, in display order.
    pub demos: Vec<Demo>,
}
impl Profile {
    pub fn title(&self) -> &str {
        if self.title.trim().is_empty() { &self.name } else { &self.title }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Skill {
    pub name: String,
    /// An `http(s)` image URL, or short text shown in its place (`"UI"`).
    #[serde(default)]
    pub icon: Option<String>,
}
impl Skill {
    pub fn icon_is_url(&self) -> bool {
        self.icon.as_deref().is_some_and(|icon| icon.starts_with("http"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: Url,
}

/// A video panel showing whatever asset is bound to `slot`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Demo {
    pub slot: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

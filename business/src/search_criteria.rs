//! Search/filter/sort/pagination criteria for the project list view.
//!
//! Tag filters and free-text search are exclusive UI modes: every change to the
//! tag list or the open/closed toggle clears the keyword.

use std::fmt;

use log::{debug, warn};
use roughcode_states::State;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
}

impl Tag {
    pub fn new(tag_id: i64, name: impl Into<String>) -> Self {
        Self {
            tag_id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    ModifiedDate,
    LikeCnt,
    FeedbackCnt,
}

impl SortKey {
    /// Map a label shown in the sort dropdown to its key.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "최신순" => Some(Self::ModifiedDate),
            "좋아요순" => Some(Self::LikeCnt),
            "리뷰순" => Some(Self::FeedbackCnt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModifiedDate => "modifiedDate",
            Self::LikeCnt => "likeCnt",
            Self::FeedbackCnt => "feedbackCnt",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `0` shows every project, `1` only open ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ClosedFilter {
    All,
    #[default]
    OpenOnly,
}

impl From<ClosedFilter> for u8 {
    fn from(value: ClosedFilter) -> Self {
        match value {
            ClosedFilter::All => 0,
            ClosedFilter::OpenOnly => 1,
        }
    }
}

impl TryFrom<u8> for ClosedFilter {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::All),
            1 => Ok(Self::OpenOnly),
            other => Err(format!("closed must be 0 or 1, got {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub keyword: String,
    pub tag_id_list: Vec<Tag>,
    pub closed: ClosedFilter,
    pub sort: SortKey,
    pub page: u32,
    pub size: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            tag_id_list: Vec::new(),
            closed: ClosedFilter::OpenOnly,
            sort: SortKey::ModifiedDate,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchCriteria {
    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tag_id_list.iter().any(|tag| tag.tag_id == tag_id)
    }
}

/// Owner of the current [`SearchCriteria`].
///
/// Registered once in the `StateCtx`; filter widgets mutate it through the
/// operations below and the list fetcher reads it via
/// [`SearchCriteriaStore::search_criteria`].
#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaStore {
    criteria: SearchCriteria,
}

impl State for SearchCriteriaStore {}

impl SearchCriteriaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the defaults but with a configured page size.
    pub fn with_page_size(size: u32) -> Self {
        Self {
            criteria: SearchCriteria {
                size: size.max(1),
                ..SearchCriteria::default()
            },
        }
    }

    pub fn search_criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn set_closed_value(&mut self, closed: ClosedFilter) {
        self.criteria.keyword.clear();
        self.criteria.closed = closed;
    }

    /// Apply a sort label. Unknown labels keep the current sort and return
    /// `false`.
    pub fn set_sort(&mut self, label: &str) -> bool {
        match SortKey::from_label(label) {
            Some(sort) => {
                self.criteria.sort = sort;
                true
            }
            None => {
                warn!(
                    "SearchCriteriaStore: unknown sort label '{label}', keeping {}",
                    self.criteria.sort
                );
                false
            }
        }
    }

    /// Append a tag filter. A tag already in the list is ignored and the
    /// criteria are left exactly as they were.
    pub fn add_tag_id(&mut self, tag: Tag) {
        if self.criteria.has_tag(tag.tag_id) {
            debug!("SearchCriteriaStore: tag {} already selected", tag.tag_id);
            return;
        }
        self.criteria.keyword.clear();
        self.criteria.tag_id_list.push(tag);
    }

    pub fn delete_tag_id(&mut self, tag_id: i64) {
        self.criteria.keyword.clear();
        self.criteria.tag_id_list.retain(|tag| tag.tag_id != tag_id);
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.criteria.keyword = keyword.into();
    }

    pub fn set_page(&mut self, page: u32) {
        self.criteria.page = page;
    }

    /// Back to the session defaults, keeping the configured page size.
    pub fn reset(&mut self) {
        let size = self.criteria.size;
        self.criteria = SearchCriteria {
            size,
            ..SearchCriteria::default()
        };
    }
}

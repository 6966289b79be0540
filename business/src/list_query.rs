//! Turns the current [`SearchCriteria`] into a paged project-list request.

use serde::Serialize;

use crate::{BusinessConfig, ClosedFilter, SearchCriteria, SortKey};

/// Query parameters for `GET /project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub sort: SortKey,
    pub page: u32,
    pub size: u32,
    pub keyword: String,
    /// Comma-separated tag ids, empty when no tag filter is selected.
    pub tag_id_list: String,
    pub closed: ClosedFilter,
}

impl From<&SearchCriteria> for ProjectListQuery {
    fn from(criteria: &SearchCriteria) -> Self {
        let tag_id_list = criteria
            .tag_id_list
            .iter()
            .map(|tag| tag.tag_id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            sort: criteria.sort,
            page: criteria.page,
            size: criteria.size,
            keyword: criteria.keyword.clone(),
            tag_id_list,
            closed: criteria.closed,
        }
    }
}

impl ProjectListQuery {
    /// `(name, value)` pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sort", self.sort.as_str().to_owned()),
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("keyword", self.keyword.clone()),
            ("tagIdList", self.tag_id_list.clone()),
            ("closed", u8::from(self.closed).to_string()),
        ]
    }

    /// Full request URL for the list endpoint.
    pub fn url(&self, config: &BusinessConfig) -> anyhow::Result<reqwest::Url> {
        let base = format!("{}/project", config.api_url());
        Ok(reqwest::Url::parse_with_params(&base, self.to_pairs())?)
    }
}

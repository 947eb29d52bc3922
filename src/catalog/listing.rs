//! Listing filters, sorting and pagination
//!
//! The listing works over the full set of alternatives held in memory:
//! filter, sort, move live sponsors to the front, then cut out one page.

use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::db::schemas::AlternativeDoc;
use crate::types::OpenAltError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query string of the alternatives listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    /// Category slug; matches the category and all of its descendants
    pub category: Option<String>,
    pub tag: Option<String>,
    pub tech_stack: Option<String>,
    pub license: Option<String>,
    pub self_hosted: Option<bool>,
    /// Proprietary software slug
    pub alternative_to: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Intersperse active card ads into the page
    pub ads: Option<bool>,
    /// Moderation status filter (admins only)
    pub status: Option<String>,
}

impl ListQuery {
    pub fn from_query_string(query: Option<&str>) -> Result<Self, OpenAltError> {
        serde_urlencoded::from_str(query.unwrap_or(""))
            .map_err(|e| OpenAltError::bad_request(format!("Invalid query string: {e}")))
    }

    pub fn sort_key(&self) -> Result<SortKey, OpenAltError> {
        match self.sort.as_deref() {
            None | Some("") => Ok(SortKey::default()),
            Some(value) => SortKey::parse(value)
                .ok_or_else(|| OpenAltError::bad_request(format!("Unknown sort key '{value}'"))),
        }
    }

    /// Requested page, 1-based
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Votes,
    Stars,
    Health,
    Newest,
    Name,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "votes" | "popular" => Some(SortKey::Votes),
            "stars" => Some(SortKey::Stars),
            "health" => Some(SortKey::Health),
            "newest" | "recent" => Some(SortKey::Newest),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }

    fn compare(self, a: &AlternativeDoc, b: &AlternativeDoc) -> Ordering {
        let primary = match self {
            SortKey::Votes => b.vote_score.cmp(&a.vote_score),
            SortKey::Stars => b.stars.cmp(&a.stars),
            SortKey::Health => b.health_score.cmp(&a.health_score),
            SortKey::Newest => b.metadata.created_millis().cmp(&a.metadata.created_millis()),
            SortKey::Name => Ordering::Equal,
        };
        primary.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    }
}

/// A listing query with slugs resolved to document ids.
///
/// A `Some(empty set)` reference filter means the slug did not resolve and
/// nothing can match.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFilter {
    pub search: Option<String>,
    pub category_ids: Option<HashSet<ObjectId>>,
    pub tag_ids: Option<HashSet<ObjectId>>,
    pub tech_stack_ids: Option<HashSet<ObjectId>>,
    pub proprietary_ids: Option<HashSet<ObjectId>>,
    pub license: Option<String>,
    pub self_hosted: Option<bool>,
    pub sort: SortKey,
}

impl ResolvedFilter {
    /// Whether one alternative passes every filter
    pub fn matches(&self, alt: &AlternativeDoc) -> bool {
        if let Some(ref needle) = self.search {
            let needle = needle.trim().to_lowercase();
            if !needle.is_empty()
                && !alt.name.to_lowercase().contains(&needle)
                && !alt.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(ref license) = self.license {
            match alt.license {
                Some(ref l) if l.eq_ignore_ascii_case(license) => {}
                _ => return false,
            }
        }

        if let Some(self_hosted) = self.self_hosted {
            if alt.self_hosted != self_hosted {
                return false;
            }
        }

        intersects(&self.category_ids, &alt.categories)
            && intersects(&self.tag_ids, &alt.tags)
            && intersects(&self.tech_stack_ids, &alt.tech_stacks)
            && intersects(&self.proprietary_ids, &alt.alternative_to)
    }

    /// Filter and order alternatives; live sponsors come first
    pub fn apply(&self, alternatives: Vec<AlternativeDoc>, now: DateTime) -> Vec<AlternativeDoc> {
        let mut matching: Vec<AlternativeDoc> =
            alternatives.into_iter().filter(|alt| self.matches(alt)).collect();

        matching.sort_by(|a, b| self.sort.compare(a, b));

        let (mut sponsored, rest): (Vec<_>, Vec<_>) =
            matching.into_iter().partition(|alt| alt.is_sponsored(now));
        sponsored.extend(rest);
        sponsored
    }
}

fn intersects(wanted: &Option<HashSet<ObjectId>>, ids: &[ObjectId]) -> bool {
    match wanted {
        None => true,
        Some(set) => ids.iter().any(|id| set.contains(id)),
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Transform the items, keeping the paging numbers
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Cut page `page` (1-based) of size `limit` out of `items`
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(limit as usize) as u32;

    let start = (page as usize - 1).saturating_mul(limit as usize);
    let items: Vec<T> = items.into_iter().skip(start).take(limit as usize).collect();

    Page {
        items,
        total: total as u64,
        page,
        limit,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::SubmissionPlan;

    fn alt(name: &str, votes: i64, stars: i64) -> AlternativeDoc {
        AlternativeDoc {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: format!("{name} is free software"),
            vote_score: votes,
            stars,
            ..Default::default()
        }
    }

    #[test]
    fn test_paginate_slices() {
        let items: Vec<u32> = (1..=45).collect();

        let p1 = paginate(items.clone(), 1, 20);
        assert_eq!(p1.items, (1..=20).collect::<Vec<_>>());
        assert_eq!(p1.total, 45);
        assert_eq!(p1.total_pages, 3);

        let p3 = paginate(items.clone(), 3, 20);
        assert_eq!(p3.items, (41..=45).collect::<Vec<_>>());

        let p4 = paginate(items, 4, 20);
        assert!(p4.items.is_empty());
        assert_eq!(p4.total, 45);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::<u8>::new(), 1, 10);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_query_defaults_and_clamps() {
        let q = ListQuery::from_query_string(Some("page=0&limit=500&selfHosted=true")).unwrap();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.self_hosted, Some(true));

        let q = ListQuery::from_query_string(None).unwrap();
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.sort_key().unwrap(), SortKey::Votes);
    }

    #[test]
    fn test_query_rejects_garbage() {
        assert!(ListQuery::from_query_string(Some("page=abc")).is_err());
        let q = ListQuery::from_query_string(Some("sort=sideways")).unwrap();
        assert!(q.sort_key().is_err());
    }

    #[test]
    fn test_sort_by_votes_then_name() {
        let filter = ResolvedFilter::default();
        let sorted = filter.apply(
            vec![alt("Zulip", 5, 0), alt("Gimp", 9, 0), alt("Anki", 5, 0)],
            DateTime::now(),
        );
        let names: Vec<_> = sorted.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Gimp", "Anki", "Zulip"]);
    }

    #[test]
    fn test_sponsors_first() {
        let now = DateTime::now();
        let mut sponsor = alt("Penpot", 0, 10);
        sponsor.plan = SubmissionPlan::Sponsor;
        sponsor.sponsored_until = Some(DateTime::from_millis(now.timestamp_millis() + 60_000));

        let filter = ResolvedFilter {
            sort: SortKey::Stars,
            ..Default::default()
        };
        let sorted = filter.apply(vec![alt("Krita", 0, 500), sponsor, alt("Inkscape", 0, 900)], now);
        let names: Vec<_> = sorted.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Penpot", "Inkscape", "Krita"]);
    }

    #[test]
    fn test_search_and_flags() {
        let mut nextcloud = alt("Nextcloud", 0, 0);
        nextcloud.self_hosted = true;
        nextcloud.license = Some("AGPL-3.0".into());
        let thunderbird = alt("Thunderbird", 0, 0);

        let filter = ResolvedFilter {
            search: Some("CLOUD".into()),
            ..Default::default()
        };
        assert!(filter.matches(&nextcloud));
        assert!(!filter.matches(&thunderbird));

        let filter = ResolvedFilter {
            self_hosted: Some(true),
            license: Some("agpl-3.0".into()),
            ..Default::default()
        };
        assert!(filter.matches(&nextcloud));
        assert!(!filter.matches(&thunderbird));
    }

    #[test]
    fn test_reference_filters() {
        let category = ObjectId::new();
        let mut gimp = alt("Gimp", 0, 0);
        gimp.categories = vec![category];

        let filter = ResolvedFilter {
            category_ids: Some(HashSet::from([category])),
            ..Default::default()
        };
        assert!(filter.matches(&gimp));

        let unresolved = ResolvedFilter {
            tag_ids: Some(HashSet::new()),
            ..Default::default()
        };
        assert!(!unresolved.matches(&gimp));
    }
}

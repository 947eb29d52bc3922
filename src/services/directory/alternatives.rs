//! Listing, submission, editing and moderation of alternatives

use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::{
    can_edit, can_view, caller_id, optional_text, optional_url, require_admin, required_text,
    AdView, AlternativeDetail, AlternativeView, Directory, LabelRef, Listing, Lookup,
};
use crate::auth::Claims;
use crate::catalog::{
    descendant_ids, health_score, intersperse, is_active, paginate, slugify, ListQuery, Page,
    ResolvedFilter,
};
use crate::db::schemas::{
    AdFormat, AlternativeDoc, ApprovalStatus, LabelDoc, LabelKind, Metadata, SubmissionPlan,
};
use crate::services::github::{parse_github_url, RepoStats};
use crate::types::{OpenAltError, Result};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_LICENSE_LEN: usize = 64;
const MAX_REFERENCES: usize = 20;

/// Body of `POST /api/alternatives`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub self_hosted: bool,
    /// Category slugs
    #[serde(default)]
    pub categories: Vec<String>,
    /// Tag names; unknown tags are created
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tech stack names; unknown ones are created
    #[serde(default)]
    pub tech_stacks: Vec<String>,
    /// Proprietary software slugs
    #[serde(default)]
    pub alternative_to: Vec<String>,
}

/// Body of `PUT /api/alternatives/{slug}`. Absent fields are left alone,
/// an empty string clears an optional field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlternativeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub github_url: Option<String>,
    pub license: Option<String>,
    pub self_hosted: Option<bool>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub tech_stacks: Option<Vec<String>>,
    pub alternative_to: Option<Vec<String>>,
}

/// Moderation decision on an alternative or advertisement
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

impl StatusUpdate {
    pub fn parse(&self) -> Result<ApprovalStatus> {
        ApprovalStatus::parse(&self.status).ok_or_else(|| {
            OpenAltError::bad_request(format!(
                "Status must be pending, approved or rejected, got '{}'",
                self.status
            ))
        })
    }
}

/// Validated GitHub URL, normalised to `https://github.com/owner/repo`
fn github_url(value: Option<&str>) -> Result<Option<String>> {
    match optional_url("GitHub URL", value)? {
        None => Ok(None),
        Some(url) => parse_github_url(&url)
            .map(|(owner, repo)| Some(format!("https://github.com/{owner}/{repo}")))
            .ok_or_else(|| {
                OpenAltError::bad_request("GitHub URL must look like https://github.com/owner/repo")
            }),
    }
}

fn check_reference_count(field: &str, values: &[String]) -> Result<()> {
    if values.len() > MAX_REFERENCES {
        return Err(OpenAltError::bad_request(format!(
            "At most {MAX_REFERENCES} {field} are allowed"
        )));
    }
    Ok(())
}

/// Copy fetched statistics onto a document and recompute its health score
pub fn apply_stats(alternative: &mut AlternativeDoc, stats: RepoStats, now: DateTime) {
    alternative.stars = stats.stars;
    alternative.forks = stats.forks;
    alternative.contributors = stats.contributors;
    if stats.license.is_some() {
        alternative.license = stats.license;
    }
    if stats.pushed_at.is_some() {
        alternative.last_commit_at = stats.pushed_at;
    }
    alternative.stats_refreshed_at = Some(now);
    alternative.health_score = i32::from(health_score(
        alternative.stars,
        alternative.contributors,
        alternative.last_commit_at,
        now,
    ));
}

impl Directory {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Filtered, sorted and paginated alternatives
    pub async fn list_alternatives(
        &self,
        viewer: Option<&Claims>,
        query: ListQuery,
    ) -> Result<Listing> {
        let status = match query.status.as_deref() {
            None | Some("") => ApprovalStatus::Approved,
            Some(value) => {
                match viewer {
                    Some(claims) => require_admin(claims)?,
                    None => {
                        return Err(OpenAltError::Forbidden(
                            "Administrator permission required".into(),
                        ))
                    }
                }
                ApprovalStatus::parse(value).ok_or_else(|| {
                    OpenAltError::bad_request(format!("Unknown status '{value}'"))
                })?
            }
        };

        let lookup = Lookup::load(self.store.as_ref()).await?;
        let filter = self.resolve_filter(&query, &lookup).await?;
        let now = DateTime::now();

        let alternatives = self.store.list_alternatives(Some(status)).await?;
        let ordered = filter.apply(alternatives, now);
        let page = paginate(ordered, query.page(), query.limit())
            .map(|doc| AlternativeView::new(&doc, &lookup, now));

        if !query.ads.unwrap_or(false) {
            return Ok(Listing::Plain(page));
        }

        let mut ads: Vec<_> = self
            .store
            .list_advertisements(Some(ApprovalStatus::Approved))
            .await?
            .into_iter()
            .filter(|ad| ad.format == AdFormat::Card && is_active(ad, now))
            .collect();
        ads.sort_by_key(|ad| (ad.metadata.created_millis(), ad.id));
        let ads: Vec<AdView> = ads.iter().map(AdView::from).collect();

        let max = self.settings.ad_max_per_page;
        let start = (page.page as usize - 1).saturating_mul(max);
        let feed = intersperse(page.items, &ads, self.settings.ad_interval, max, start);

        Ok(Listing::WithAds(Page {
            items: feed,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }))
    }

    async fn resolve_filter(&self, query: &ListQuery, lookup: &Lookup) -> Result<ResolvedFilter> {
        let category_ids = match query.category.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(slug) => match Lookup::id_by_slug(&lookup.categories, slug) {
                Some(root) => {
                    let categories = self.store.list_categories().await?;
                    Some(descendant_ids(&categories, root))
                }
                None => Some(HashSet::new()),
            },
        };

        Ok(ResolvedFilter {
            search: query.search.clone().filter(|s| !s.trim().is_empty()),
            category_ids,
            tag_ids: slug_filter(&lookup.tags, query.tag.as_deref()),
            tech_stack_ids: slug_filter(&lookup.tech_stacks, query.tech_stack.as_deref()),
            proprietary_ids: slug_filter(&lookup.proprietary, query.alternative_to.as_deref()),
            license: query.license.clone().filter(|s| !s.is_empty()),
            self_hosted: query.self_hosted,
            sort: query.sort_key()?,
        })
    }

    /// Alternative by slug. Entries that are not approved look missing to
    /// everyone but their submitter and admins.
    pub async fn get_alternative(
        &self,
        viewer: Option<&Claims>,
        slug: &str,
    ) -> Result<AlternativeDetail> {
        let alternative = self.visible_alternative(viewer, slug).await?;
        let lookup = Lookup::load(self.store.as_ref()).await?;

        let user_vote = match (viewer, alternative.id) {
            (Some(claims), Some(alt_id)) => match caller_id(claims) {
                Ok(user_id) => self
                    .store
                    .find_vote(user_id, alt_id)
                    .await?
                    .map(|v| v.value),
                Err(_) => None,
            },
            _ => None,
        };

        Ok(AlternativeDetail {
            alternative: AlternativeView::new(&alternative, &lookup, DateTime::now()),
            user_vote,
            can_edit: can_edit(&alternative, viewer),
        })
    }

    pub(crate) async fn visible_alternative(
        &self,
        viewer: Option<&Claims>,
        slug: &str,
    ) -> Result<AlternativeDoc> {
        match self.store.find_alternative(slug).await? {
            Some(alt) if can_view(&alt, viewer) => Ok(alt),
            _ => Err(OpenAltError::not_found(format!("Alternative '{slug}' not found"))),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Submit a new alternative. Admin submissions are approved right away,
    /// everyone else's wait for moderation.
    pub async fn submit_alternative(
        &self,
        claims: &Claims,
        input: AlternativeInput,
    ) -> Result<AlternativeView> {
        let user_id = caller_id(claims)?;

        let name = required_text("Name", &input.name, MAX_NAME_LEN)?;
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(OpenAltError::bad_request(
                "Name must contain at least one letter or digit",
            ));
        }
        let description = required_text("Description", &input.description, MAX_DESCRIPTION_LEN)?;
        let website = optional_url("Website", input.website.as_deref())?;
        let github_url = github_url(input.github_url.as_deref())?;
        let license = optional_text("License", input.license.as_deref(), MAX_LICENSE_LEN)?;

        if self.store.find_alternative(&slug).await?.is_some() {
            return Err(OpenAltError::Conflict(format!(
                "An alternative named '{name}' already exists"
            )));
        }

        let lookup = Lookup::load(self.store.as_ref()).await?;
        let categories = resolve_slugs(&lookup.categories, "category", &input.categories)?;
        let alternative_to =
            resolve_slugs(&lookup.proprietary, "proprietary software", &input.alternative_to)?;
        let tags = self.resolve_labels(&lookup, LabelKind::Tag, &input.tags).await?;
        let tech_stacks = self
            .resolve_labels(&lookup, LabelKind::TechStack, &input.tech_stacks)
            .await?;

        let status = if claims.is_admin() {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        };

        let mut alternative = AlternativeDoc {
            id: None,
            metadata: Metadata::new(),
            name,
            slug,
            description,
            website,
            github_url,
            license,
            self_hosted: input.self_hosted,
            status,
            plan: SubmissionPlan::Free,
            categories,
            tags,
            tech_stacks,
            alternative_to,
            submitted_by: Some(user_id),
            ..Default::default()
        };

        self.fetch_stats_best_effort(&mut alternative).await;

        let id = self.store.insert_alternative(alternative.clone()).await?;
        alternative.id = Some(id);
        info!(alternative = %alternative.slug, user = %user_id, status = status.as_str(), "Alternative submitted");

        let lookup = Lookup::load(self.store.as_ref()).await?;
        Ok(AlternativeView::new(&alternative, &lookup, DateTime::now()))
    }

    /// Partial edit by the submitter or an admin. The slug and the
    /// moderation status do not change.
    pub async fn update_alternative(
        &self,
        claims: &Claims,
        slug: &str,
        update: AlternativeUpdate,
    ) -> Result<AlternativeView> {
        let mut alternative = self.visible_alternative(Some(claims), slug).await?;
        if !can_edit(&alternative, Some(claims)) {
            return Err(OpenAltError::Forbidden(
                "Only the submitter or an administrator can edit this alternative".into(),
            ));
        }

        if let Some(ref name) = update.name {
            alternative.name = required_text("Name", name, MAX_NAME_LEN)?;
        }
        if let Some(ref description) = update.description {
            alternative.description =
                required_text("Description", description, MAX_DESCRIPTION_LEN)?;
        }
        if let Some(ref website) = update.website {
            alternative.website = optional_url("Website", Some(website))?;
        }
        if let Some(ref url) = update.github_url {
            alternative.github_url = github_url(Some(url))?;
        }
        if let Some(ref license) = update.license {
            alternative.license = optional_text("License", Some(license), MAX_LICENSE_LEN)?;
        }
        if let Some(self_hosted) = update.self_hosted {
            alternative.self_hosted = self_hosted;
        }

        let lookup = Lookup::load(self.store.as_ref()).await?;
        if let Some(ref categories) = update.categories {
            alternative.categories = resolve_slugs(&lookup.categories, "category", categories)?;
        }
        if let Some(ref slugs) = update.alternative_to {
            alternative.alternative_to =
                resolve_slugs(&lookup.proprietary, "proprietary software", slugs)?;
        }
        if let Some(ref tags) = update.tags {
            alternative.tags = self.resolve_labels(&lookup, LabelKind::Tag, tags).await?;
        }
        if let Some(ref stacks) = update.tech_stacks {
            alternative.tech_stacks = self
                .resolve_labels(&lookup, LabelKind::TechStack, stacks)
                .await?;
        }

        alternative.metadata.touch();
        let alternative = self.store.replace_alternative(alternative).await?;
        debug!(alternative = %alternative.slug, "Alternative updated");

        let lookup = Lookup::load(self.store.as_ref()).await?;
        Ok(AlternativeView::new(&alternative, &lookup, DateTime::now()))
    }

    /// Approve or reject a submission (admin)
    pub async fn set_alternative_status(
        &self,
        claims: &Claims,
        slug: &str,
        update: StatusUpdate,
    ) -> Result<AlternativeView> {
        require_admin(claims)?;
        let status = update.parse()?;

        let mut alternative = self
            .store
            .find_alternative(slug)
            .await?
            .ok_or_else(|| OpenAltError::not_found(format!("Alternative '{slug}' not found")))?;

        let changed = alternative.status != status;
        alternative.status = status;
        alternative.metadata.touch();
        let alternative = self.store.replace_alternative(alternative).await?;

        if changed {
            info!(alternative = %slug, status = status.as_str(), "Moderation decision recorded");
            self.notifier.submission_decided(&alternative).await;
        }

        let lookup = Lookup::load(self.store.as_ref()).await?;
        Ok(AlternativeView::new(&alternative, &lookup, DateTime::now()))
    }

    // =========================================================================
    // GitHub statistics
    // =========================================================================

    /// Re-read GitHub statistics of one alternative (admin)
    pub async fn refresh_stats(&self, claims: &Claims, slug: &str) -> Result<AlternativeView> {
        require_admin(claims)?;

        let mut alternative = self
            .store
            .find_alternative(slug)
            .await?
            .ok_or_else(|| OpenAltError::not_found(format!("Alternative '{slug}' not found")))?;

        self.refresh_one(&mut alternative).await?;

        let lookup = Lookup::load(self.store.as_ref()).await?;
        Ok(AlternativeView::new(&alternative, &lookup, DateTime::now()))
    }

    /// Refresh every alternative with a GitHub URL; returns `(refreshed, failed)`
    pub async fn refresh_all_stats(&self) -> Result<(usize, usize)> {
        let alternatives = self.store.list_alternatives(None).await?;
        let (mut refreshed, mut failed) = (0, 0);

        for mut alternative in alternatives.into_iter().filter(|a| a.github_url.is_some()) {
            match self.refresh_one(&mut alternative).await {
                Ok(()) => refreshed += 1,
                Err(e) => {
                    warn!(alternative = %alternative.slug, "Stats refresh failed: {}", e);
                    failed += 1;
                }
            }
        }

        info!(refreshed, failed, "GitHub statistics refreshed");
        Ok((refreshed, failed))
    }

    async fn refresh_one(&self, alternative: &mut AlternativeDoc) -> Result<()> {
        let github = self
            .github
            .as_ref()
            .ok_or_else(|| OpenAltError::Upstream("GitHub statistics are not configured".into()))?;

        let (owner, repo) = alternative
            .github_url
            .as_deref()
            .and_then(parse_github_url)
            .ok_or_else(|| {
                OpenAltError::bad_request(format!(
                    "Alternative '{}' has no GitHub repository",
                    alternative.slug
                ))
            })?;

        let stats = github.fetch_stats(&owner, &repo).await?;
        apply_stats(alternative, stats, DateTime::now());
        alternative.metadata.touch();
        *alternative = self.store.replace_alternative(alternative.clone()).await?;
        Ok(())
    }

    /// Fill statistics of a new submission when possible; failures only log
    async fn fetch_stats_best_effort(&self, alternative: &mut AlternativeDoc) {
        let (Some(github), Some((owner, repo))) = (
            self.github.as_ref(),
            alternative.github_url.as_deref().and_then(parse_github_url),
        ) else {
            return;
        };

        match github.fetch_stats(&owner, &repo).await {
            Ok(stats) => apply_stats(alternative, stats, DateTime::now()),
            Err(e) => warn!(owner, repo, "Could not fetch GitHub stats for submission: {}", e),
        }
    }

    /// Ids of tags or tech stacks by name, creating the missing ones
    async fn resolve_labels(
        &self,
        lookup: &Lookup,
        kind: LabelKind,
        names: &[String],
    ) -> Result<Vec<ObjectId>> {
        let field = match kind {
            LabelKind::Tag => "tags",
            LabelKind::TechStack => "tech stacks",
        };
        check_reference_count(field, names)?;

        let map = match kind {
            LabelKind::Tag => &lookup.tags,
            LabelKind::TechStack => &lookup.tech_stacks,
        };

        let mut ids = Vec::new();
        for name in names {
            let name = name.trim();
            let slug = slugify(name);
            if slug.is_empty() {
                continue;
            }

            let id = match Lookup::id_by_slug(map, &slug) {
                Some(id) => id,
                None => {
                    let label = LabelDoc {
                        id: None,
                        metadata: Metadata::new(),
                        name: name.to_string(),
                        slug,
                    };
                    self.store.upsert_label(kind, label).await?
                }
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// Filter set for one slug; an unknown slug yields an empty set
fn slug_filter(map: &HashMap<ObjectId, LabelRef>, slug: Option<&str>) -> Option<HashSet<ObjectId>> {
    let slug = slug.filter(|s| !s.is_empty())?;
    Some(Lookup::id_by_slug(map, slug).into_iter().collect())
}

/// Ids of existing records by slug; unknown slugs are rejected
fn resolve_slugs(
    map: &HashMap<ObjectId, LabelRef>,
    what: &str,
    slugs: &[String],
) -> Result<Vec<ObjectId>> {
    check_reference_count(what, slugs)?;

    let mut ids = Vec::new();
    for slug in slugs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let id = Lookup::id_by_slug(map, slug)
            .ok_or_else(|| OpenAltError::bad_request(format!("Unknown {what} '{slug}'")))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_url_normalised() {
        assert_eq!(
            github_url(Some("https://www.github.com/penpot/penpot.git/")).unwrap(),
            Some("https://github.com/penpot/penpot".to_string())
        );
        assert_eq!(github_url(Some("")).unwrap(), None);
        assert!(github_url(Some("https://gitlab.com/a/b")).is_err());
    }

    #[test]
    fn test_apply_stats_keeps_known_license() {
        let now = DateTime::now();
        let mut alt = AlternativeDoc {
            license: Some("GPL-3.0".into()),
            ..Default::default()
        };
        apply_stats(
            &mut alt,
            RepoStats {
                stars: 100_000,
                forks: 10,
                contributors: 50,
                license: None,
                pushed_at: Some(now),
            },
            now,
        );
        assert_eq!(alt.license.as_deref(), Some("GPL-3.0"));
        assert_eq!(alt.health_score, 100);
        assert_eq!(alt.stats_refreshed_at, Some(now));
    }

    #[test]
    fn test_status_update_parse() {
        let update = StatusUpdate {
            status: "APPROVED".into(),
        };
        assert_eq!(update.parse().unwrap(), ApprovalStatus::Approved);
        assert!(StatusUpdate { status: "maybe".into() }.parse().is_err());
    }
}

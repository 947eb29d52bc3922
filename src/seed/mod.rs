//! Seed data for a fresh directory
//!
//! Upserts the curated category taxonomy, proprietary products and
//! alternatives from `data`. Records are matched by slug, so running the
//! seeder again updates entries in place instead of duplicating them.

pub mod data;
pub mod keywords;

use bson::oid::ObjectId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::slugify;
use crate::db::schemas::{
    AlternativeDoc, ApprovalStatus, CategoryDoc, LabelDoc, LabelKind, Metadata, ProprietaryDoc,
    SubmissionPlan,
};
use crate::store::DirectoryStore;
use crate::types::{OpenAltError, Result};

use data::{SeedAlternative, SeedProprietary, ALTERNATIVES, CATEGORIES, PROPRIETARY};
use keywords::category_for_keyword;

/// Counts of what a seeding run wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub tags: usize,
    pub tech_stacks: usize,
    pub proprietary: usize,
    pub alternatives: usize,
    /// Keywords with no category mapping
    pub skipped_keywords: usize,
}

pub struct Seeder {
    store: Arc<dyn DirectoryStore>,
    categories: HashMap<&'static str, ObjectId>,
    proprietary: HashMap<String, ObjectId>,
    report: SeedReport,
}

impl Seeder {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            store,
            categories: HashMap::new(),
            proprietary: HashMap::new(),
            report: SeedReport::default(),
        }
    }

    /// Seed everything, parents before the records that reference them
    pub async fn run(mut self) -> Result<SeedReport> {
        self.seed_categories().await?;
        self.seed_labels().await?;

        for software in PROPRIETARY {
            self.seed_proprietary(software).await?;
        }
        for alternative in ALTERNATIVES {
            self.seed_alternative(alternative).await?;
        }

        info!(
            categories = self.report.categories,
            proprietary = self.report.proprietary,
            alternatives = self.report.alternatives,
            "Seeding complete"
        );
        Ok(self.report)
    }

    async fn seed_categories(&mut self) -> Result<()> {
        for category in CATEGORIES {
            let parent = match category.parent {
                Some(slug) => Some(*self.categories.get(slug).ok_or_else(|| {
                    OpenAltError::Internal(format!(
                        "Category '{}' is listed before its parent '{}'",
                        category.slug, slug
                    ))
                })?),
                None => None,
            };

            let id = self
                .store
                .upsert_category(CategoryDoc {
                    id: None,
                    metadata: Metadata::new(),
                    name: category.name.to_string(),
                    slug: category.slug.to_string(),
                    parent,
                })
                .await?;
            self.categories.insert(category.slug, id);
            self.report.categories += 1;
        }
        Ok(())
    }

    async fn seed_labels(&mut self) -> Result<()> {
        let tags: HashSet<&str> = ALTERNATIVES.iter().flat_map(|a| a.tags.iter().copied()).collect();
        let stacks: HashSet<&str> = ALTERNATIVES
            .iter()
            .flat_map(|a| a.tech_stacks.iter().copied())
            .collect();

        for name in tags {
            self.store.upsert_label(LabelKind::Tag, label(name)).await?;
            self.report.tags += 1;
        }
        for name in stacks {
            self.store.upsert_label(LabelKind::TechStack, label(name)).await?;
            self.report.tech_stacks += 1;
        }
        Ok(())
    }

    async fn seed_proprietary(&mut self, software: &SeedProprietary) -> Result<()> {
        let categories = self.resolve_keywords(software.name, software.keywords);
        let slug = slugify(software.name);

        let id = self
            .store
            .upsert_proprietary(ProprietaryDoc {
                id: None,
                metadata: Metadata::new(),
                name: software.name.to_string(),
                slug: slug.clone(),
                description: software.description.to_string(),
                website: Some(software.website.to_string()),
                categories,
            })
            .await?;

        debug!(slug = %slug, "Seeded proprietary software");
        self.proprietary.insert(slug, id);
        self.report.proprietary += 1;
        Ok(())
    }

    async fn seed_alternative(&mut self, seed: &SeedAlternative) -> Result<()> {
        let slug = slugify(seed.name);
        let categories = self.resolve_keywords(seed.name, seed.keywords);

        let mut alternative_to = Vec::new();
        for name in seed.replaces {
            match self.proprietary.get(&slugify(name)) {
                Some(id) => alternative_to.push(*id),
                None => warn!(alternative = %slug, "Unknown proprietary product '{}'", name),
            }
        }

        let tags = self.label_ids(LabelKind::Tag, seed.tags).await?;
        let tech_stacks = self.label_ids(LabelKind::TechStack, seed.tech_stacks).await?;

        let mut doc = AlternativeDoc {
            metadata: Metadata::new(),
            name: seed.name.to_string(),
            slug: slug.clone(),
            description: seed.description.to_string(),
            website: Some(seed.website.to_string()),
            github_url: seed.github_url.map(str::to_string),
            license: Some(seed.license.to_string()),
            self_hosted: seed.self_hosted,
            status: ApprovalStatus::Approved,
            plan: SubmissionPlan::Free,
            categories,
            tags,
            tech_stacks,
            alternative_to,
            ..Default::default()
        };

        // Moderation, statistics and a running sponsorship belong to the live record
        if let Some(stored) = self.store.find_alternative(&slug).await? {
            doc.status = stored.status;
            doc.stars = stored.stars;
            doc.forks = stored.forks;
            doc.contributors = stored.contributors;
            doc.last_commit_at = stored.last_commit_at;
            doc.stats_refreshed_at = stored.stats_refreshed_at;
            doc.health_score = stored.health_score;
            doc.plan = stored.plan;
            doc.sponsored_until = stored.sponsored_until;
        }

        self.store.upsert_alternative(doc).await?;
        debug!(slug = %slug, "Seeded alternative");
        self.report.alternatives += 1;
        Ok(())
    }

    fn resolve_keywords(&mut self, owner: &str, keywords: &[&str]) -> Vec<ObjectId> {
        let mut ids = Vec::new();
        for keyword in keywords {
            let id = category_for_keyword(keyword).and_then(|slug| self.categories.get(slug));
            match id {
                Some(id) if !ids.contains(id) => ids.push(*id),
                Some(_) => {}
                None => {
                    warn!(entry = %owner, "No category for keyword '{}', skipping", keyword);
                    self.report.skipped_keywords += 1;
                }
            }
        }
        ids
    }

    async fn label_ids(&self, kind: LabelKind, names: &[&str]) -> Result<Vec<ObjectId>> {
        let stored = self.store.list_labels(kind).await?;
        Ok(names
            .iter()
            .filter_map(|name| {
                let slug = slugify(name);
                stored.iter().find(|l| l.slug == slug).and_then(|l| l.id)
            })
            .collect())
    }
}

fn label(name: &str) -> LabelDoc {
    LabelDoc {
        id: None,
        metadata: Metadata::new(),
        name: name.to_string(),
        slug: slugify(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_links_records() {
        let store: Arc<dyn DirectoryStore> = Arc::new(MemoryStore::new());
        let report = Seeder::new(Arc::clone(&store)).run().await.unwrap();

        assert_eq!(report.categories, CATEGORIES.len());
        assert_eq!(report.proprietary, PROPRIETARY.len());
        assert_eq!(report.alternatives, ALTERNATIVES.len());
        assert_eq!(report.skipped_keywords, 0);

        let gimp = store.find_alternative("gimp").await.unwrap().unwrap();
        let photoshop = store.find_proprietary("adobe-photoshop").await.unwrap().unwrap();
        assert_eq!(gimp.status, ApprovalStatus::Approved);
        assert_eq!(gimp.plan, SubmissionPlan::Free);
        assert_eq!(gimp.alternative_to, vec![photoshop.id.unwrap()]);
        assert!(!gimp.categories.is_empty());
        assert_eq!(gimp.tags.len(), 2);
    }

    #[tokio::test]
    async fn test_parents_resolve() {
        let store: Arc<dyn DirectoryStore> = Arc::new(MemoryStore::new());
        Seeder::new(Arc::clone(&store)).run().await.unwrap();

        let categories = store.list_categories().await.unwrap();
        let media = categories.iter().find(|c| c.slug == "media").unwrap();
        let video = categories.iter().find(|c| c.slug == "video-editing").unwrap();
        assert_eq!(video.parent, media.id);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let store: Arc<dyn DirectoryStore> = Arc::new(MemoryStore::new());
        Seeder::new(Arc::clone(&store)).run().await.unwrap();

        let jellyfin = store.find_alternative("jellyfin").await.unwrap().unwrap();
        store.set_vote_score(jellyfin.id.unwrap(), 12).await.unwrap();

        let mut gimp = store.find_alternative("gimp").await.unwrap().unwrap();
        gimp.status = ApprovalStatus::Rejected;
        store.replace_alternative(gimp).await.unwrap();

        Seeder::new(Arc::clone(&store)).run().await.unwrap();

        let gimp = store.find_alternative("gimp").await.unwrap().unwrap();
        assert_eq!(gimp.status, ApprovalStatus::Rejected);

        let all = store.list_alternatives(None).await.unwrap();
        assert_eq!(all.len(), ALTERNATIVES.len());
        let again = store.find_alternative("jellyfin").await.unwrap().unwrap();
        assert_eq!(again.id, jellyfin.id);
        assert_eq!(again.vote_score, 12);
        assert_eq!(store.list_categories().await.unwrap().len(), CATEGORIES.len());
    }

    #[test]
    fn test_every_replacement_is_seeded() {
        for alternative in ALTERNATIVES {
            for name in alternative.replaces {
                assert!(
                    PROPRIETARY.iter().any(|p| p.name == *name),
                    "{} replaces unknown product {}",
                    alternative.name,
                    name
                );
            }
        }
    }
}

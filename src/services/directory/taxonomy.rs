//! Categories, labels and proprietary software

use bson::DateTime;

use super::{AlternativeView, Directory, LabelRef, Lookup, ProprietaryDetail, ProprietaryView};
use crate::catalog::{build_category_tree, CategoryNode, ResolvedFilter, SortKey};
use crate::db::schemas::{ApprovalStatus, LabelKind};
use crate::types::{OpenAltError, Result};

impl Directory {
    /// The category tree
    pub async fn list_categories(&self) -> Result<Vec<CategoryNode>> {
        let categories = self.store.list_categories().await?;
        Ok(build_category_tree(&categories))
    }

    /// Tags or tech stacks, sorted by name
    pub async fn list_labels(&self, kind: LabelKind) -> Result<Vec<LabelRef>> {
        Ok(self
            .store
            .list_labels(kind)
            .await?
            .into_iter()
            .map(|l| LabelRef {
                name: l.name,
                slug: l.slug,
            })
            .collect())
    }

    pub async fn list_proprietary(&self) -> Result<Vec<ProprietaryView>> {
        let lookup = Lookup::load(self.store.as_ref()).await?;
        Ok(self
            .store
            .list_proprietary()
            .await?
            .iter()
            .map(|p| ProprietaryView::new(p, &lookup))
            .collect())
    }

    /// One proprietary product with its approved alternatives, best voted first
    pub async fn get_proprietary(&self, slug: &str) -> Result<ProprietaryDetail> {
        let software = self
            .store
            .find_proprietary(slug)
            .await?
            .ok_or_else(|| OpenAltError::not_found(format!("Proprietary software '{slug}' not found")))?;

        let lookup = Lookup::load(self.store.as_ref()).await?;
        let now = DateTime::now();

        let filter = ResolvedFilter {
            proprietary_ids: Some(software.id.into_iter().collect()),
            sort: SortKey::Votes,
            ..Default::default()
        };
        let alternatives = self
            .store
            .list_alternatives(Some(ApprovalStatus::Approved))
            .await?;
        let alternatives = filter
            .apply(alternatives, now)
            .iter()
            .map(|a| AlternativeView::new(a, &lookup, now))
            .collect();

        Ok(ProprietaryDetail {
            software: ProprietaryView::new(&software, &lookup),
            alternatives,
        })
    }
}

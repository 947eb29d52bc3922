//! Category tree

use bson::oid::ObjectId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::db::schemas::CategoryDoc;

/// A category with its subcategories, as returned by `GET /api/categories`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub children: Vec<CategoryNode>,
}

/// Build the category forest.
///
/// Categories whose parent is missing (or who have none) become roots.
/// Siblings are sorted by name. Cycles in the parent links are cut where
/// they are first revisited.
pub fn build_category_tree(categories: &[CategoryDoc]) -> Vec<CategoryNode> {
    let known: HashSet<ObjectId> = categories.iter().filter_map(|c| c.id).collect();

    let mut children: HashMap<Option<ObjectId>, Vec<&CategoryDoc>> = HashMap::new();
    for category in categories {
        let Some(id) = category.id else { continue };
        let parent = category
            .parent
            .filter(|p| known.contains(p) && *p != id);
        children.entry(parent).or_default().push(category);
    }

    let mut visited = HashSet::new();
    let mut roots = build_level(None, &children, &mut visited);

    // Whatever is left unvisited hangs off a parent cycle
    let mut stranded: Vec<&CategoryDoc> = categories
        .iter()
        .filter(|c| c.id.map(|id| !visited.contains(&id)).unwrap_or(false))
        .collect();
    stranded.sort_by_key(|c| c.name.to_lowercase());
    for category in stranded {
        if let Some(id) = category.id {
            if visited.insert(id) {
                roots.push(CategoryNode {
                    id: id.to_hex(),
                    name: category.name.clone(),
                    slug: category.slug.clone(),
                    children: build_level(Some(id), &children, &mut visited),
                });
            }
        }
    }

    roots
}

fn build_level(
    parent: Option<ObjectId>,
    children: &HashMap<Option<ObjectId>, Vec<&CategoryDoc>>,
    visited: &mut HashSet<ObjectId>,
) -> Vec<CategoryNode> {
    let mut level: Vec<&CategoryDoc> = children.get(&parent).cloned().unwrap_or_default();
    level.sort_by_key(|c| c.name.to_lowercase());

    let mut nodes = Vec::with_capacity(level.len());
    for category in level {
        let Some(id) = category.id else { continue };
        if !visited.insert(id) {
            continue;
        }
        nodes.push(CategoryNode {
            id: id.to_hex(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            children: build_level(Some(id), children, visited),
        });
    }
    nodes
}

/// `root` and every category below it
pub fn descendant_ids(categories: &[CategoryDoc], root: ObjectId) -> HashSet<ObjectId> {
    let mut result = HashSet::from([root]);
    let mut frontier = vec![root];

    while let Some(current) = frontier.pop() {
        for category in categories {
            if let (Some(id), Some(parent)) = (category.id, category.parent) {
                if parent == current && result.insert(id) {
                    frontier.push(id);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent: Option<ObjectId>) -> CategoryDoc {
        CategoryDoc {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            slug: name.to_lowercase(),
            parent,
            ..Default::default()
        }
    }

    #[test]
    fn test_tree_shape_and_order() {
        let office = category("Office", None);
        let graphics = category("Graphics", None);
        let spreadsheets = category("Spreadsheets", office.id);
        let documents = category("Documents", office.id);
        let orphan = category("Orphaned", Some(ObjectId::new()));

        let tree = build_category_tree(&[
            office.clone(),
            spreadsheets,
            graphics,
            documents,
            orphan,
        ]);

        let roots: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["Graphics", "Office", "Orphaned"]);

        let office_node = &tree[1];
        let kids: Vec<_> = office_node.children.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(kids, vec!["documents", "spreadsheets"]);
    }

    #[test]
    fn test_parent_cycle_does_not_loop() {
        let mut a = category("A", None);
        let b = category("B", a.id);
        a.parent = b.id;

        let tree = build_category_tree(&[a, b]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert!(tree[0].children[0].children.is_empty());
    }

    #[test]
    fn test_descendants() {
        let media = category("Media", None);
        let audio = category("Audio", media.id);
        let podcasts = category("Podcasts", audio.id);
        let other = category("Other", None);
        let all = [media.clone(), audio.clone(), podcasts.clone(), other.clone()];

        let ids = descendant_ids(&all, media.id.unwrap());
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&podcasts.id.unwrap()));
        assert!(!ids.contains(&other.id.unwrap()));

        assert_eq!(descendant_ids(&all, podcasts.id.unwrap()).len(), 1);
    }
}

//! Ad interspersion
//!
//! One ad is placed after every `every` listing items, never after the last
//! item, picking ads round-robin starting at `start`, with at most `max`
//! ads per call.

use bson::DateTime;
use serde::Serialize;

use crate::db::schemas::{AdvertisementDoc, ApprovalStatus};

/// One slot of a listing feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum FeedEntry<T, A> {
    Item(T),
    Ad(A),
}

/// Insert ads into `items`.
///
/// `start` is the rotation pointer: the first ad placed is
/// `ads[start % ads.len()]`.
pub fn intersperse<T, A: Clone>(
    items: Vec<T>,
    ads: &[A],
    every: usize,
    max: usize,
    start: usize,
) -> Vec<FeedEntry<T, A>> {
    let total = items.len();
    let mut feed = Vec::with_capacity(total + max.min(total));

    if every == 0 || max == 0 || ads.is_empty() {
        feed.extend(items.into_iter().map(FeedEntry::Item));
        return feed;
    }

    let mut placed = 0usize;
    for (index, item) in items.into_iter().enumerate() {
        feed.push(FeedEntry::Item(item));

        let position = index + 1;
        if position % every == 0 && position < total && placed < max {
            let ad = &ads[(start + placed) % ads.len()];
            feed.push(FeedEntry::Ad(ad.clone()));
            placed += 1;
        }
    }

    feed
}

/// Whether an ad may be shown at `now`: approved and inside its schedule
pub fn is_active(ad: &AdvertisementDoc, now: DateTime) -> bool {
    ad.status == ApprovalStatus::Approved
        && ad.starts_at <= now
        && ad.ends_at.map(|end| now < end).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::AdFormat;
    use bson::oid::ObjectId;

    fn ads_in(feed: &[FeedEntry<u32, char>]) -> Vec<char> {
        feed.iter()
            .filter_map(|e| match e {
                FeedEntry::Ad(a) => Some(*a),
                FeedEntry::Item(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_one_ad_after_every_n() {
        let feed = intersperse((1..=7).collect(), &['a', 'b'], 3, 10, 0);
        assert_eq!(
            feed,
            vec![
                FeedEntry::Item(1),
                FeedEntry::Item(2),
                FeedEntry::Item(3),
                FeedEntry::Ad('a'),
                FeedEntry::Item(4),
                FeedEntry::Item(5),
                FeedEntry::Item(6),
                FeedEntry::Ad('b'),
                FeedEntry::Item(7),
            ]
        );
    }

    #[test]
    fn test_no_trailing_ad() {
        let feed = intersperse((1..=6).collect(), &['a'], 3, 10, 0);
        assert_eq!(ads_in(&feed), vec!['a']);
        assert_eq!(feed.last(), Some(&FeedEntry::Item(6)));
    }

    #[test]
    fn test_capped_at_max() {
        let feed = intersperse((1..=20).collect(), &['a', 'b', 'c'], 2, 3, 0);
        assert_eq!(ads_in(&feed), vec!['a', 'b', 'c']);
        assert_eq!(feed.len(), 23);
    }

    #[test]
    fn test_rotating_pointer_wraps() {
        let feed = intersperse((1..=9).collect(), &['a', 'b', 'c'], 2, 10, 2);
        assert_eq!(ads_in(&feed), vec!['c', 'a', 'b', 'c']);
    }

    #[test]
    fn test_degenerate_inputs_leave_items_alone() {
        for (ads, every, max) in [(&['a'][..], 0, 5), (&['a'][..], 2, 0), (&[][..], 2, 5)] {
            let feed = intersperse(vec![1, 2, 3, 4], ads, every, max, 0);
            assert!(ads_in(&feed).is_empty());
            assert_eq!(feed.len(), 4);
        }
    }

    #[test]
    fn test_schedule_window() {
        let now = DateTime::now();
        let at = |offset_ms: i64| DateTime::from_millis(now.timestamp_millis() + offset_ms);

        let mut ad = AdvertisementDoc {
            id: None,
            metadata: Default::default(),
            advertiser_id: ObjectId::new(),
            title: "Hosting".into(),
            body: String::new(),
            image_url: None,
            target_url: "https://example.org".into(),
            format: AdFormat::Card,
            starts_at: at(-1_000),
            ends_at: Some(at(1_000)),
            status: ApprovalStatus::Approved,
            clicks: 0,
            impressions: 0,
        };
        assert!(is_active(&ad, now));

        ad.ends_at = None;
        assert!(is_active(&ad, now));

        ad.starts_at = at(5_000);
        assert!(!is_active(&ad, now));

        ad.starts_at = at(-1_000);
        ad.status = ApprovalStatus::Pending;
        assert!(!is_active(&ad, now));
    }
}

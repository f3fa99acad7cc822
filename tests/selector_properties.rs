//! Distribution, capacity, and geography properties of target selection.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{make_link, make_target};
use smart_redirect::domain::repositories::LinkRepository;
use smart_redirect::infrastructure::persistence::MemoryLinkRepository;
use smart_redirect::prelude::*;

fn campaign_link() -> smart_redirect::domain::entities::Link {
    make_link(
        "df7fca",
        vec![
            make_target(1, 40, 20_000, &["US", "CA", "UK"]),
            make_target(2, 35, 15_000, &["DE", "FR", "IT", "ES"]),
            make_target(3, 25, 0, &[]),
        ],
        Some("https://backup.example.com/"),
    )
}

#[tokio::test]
async fn test_de_requests_split_between_t2_and_t3_at_weight_ratio() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(campaign_link());
    let selector = TargetSelector::with_seed(repo.clone(), 42);
    let link = repo_link(&repo).await;

    let mut counts: HashMap<i64, u32> = HashMap::new();
    let draws = 6_000u32;
    for _ in 0..draws {
        match selector.select(&link, Some("DE")).await.unwrap() {
            Selection::Target(t) => *counts.entry(t.id).or_default() += 1,
            Selection::Backup => panic!("t2/t3 should stay eligible"),
        }
    }

    // Only the DE-listed target and the wildcard are ever chosen
    assert!(!counts.contains_key(&1));

    // and they split 35:25
    let t2 = f64::from(*counts.get(&2).unwrap());
    let t3 = f64::from(*counts.get(&3).unwrap());
    let t2_share = t2 / f64::from(draws);
    assert!(
        (t2_share - 35.0 / 60.0).abs() < 0.03,
        "t2 share was {t2_share}, t3 {t3}"
    );
}

#[tokio::test]
async fn test_unlisted_country_gets_wildcard_target_only() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(campaign_link());
    let selector = TargetSelector::with_seed(repo.clone(), 43);
    let link = repo_link(&repo).await;

    for _ in 0..200 {
        match selector.select(&link, Some("JP")).await.unwrap() {
            Selection::Target(t) => assert_eq!(t.id, 3),
            Selection::Backup => panic!("wildcard target is unlimited"),
        }
    }
}

#[tokio::test]
async fn test_capped_t1_leaves_us_with_wildcard_only() {
    let repo = Arc::new(MemoryLinkRepository::new());
    let mut link = campaign_link();
    link.targets[0].current_hits = 20_000;
    repo.add_link(link);
    let selector = TargetSelector::with_seed(repo.clone(), 44);
    let link = repo_link(&repo).await;

    for _ in 0..200 {
        match selector.select(&link, Some("US")).await.unwrap() {
            Selection::Target(t) => assert_eq!(t.id, 3),
            Selection::Backup => panic!("wildcard target is unlimited"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_cap_never_exceeded_under_concurrent_load() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 100, 20, &[])],
        Some("https://backup.example.com/"),
    ));
    let selector = Arc::new(TargetSelector::new(repo.clone()));
    let link = repo_link(&repo).await;

    // 200 concurrent attempts race for 20 capacity units
    let mut handles = Vec::new();
    for _ in 0..40 {
        let selector = selector.clone();
        let link = link.clone();
        handles.push(tokio::spawn(async move {
            let mut served = 0u32;
            for _ in 0..5 {
                if let Selection::Target(_) = selector.select(&link, Some("US")).await.unwrap() {
                    served += 1;
                }
            }
            served
        }));
    }

    let mut served_total = 0u32;
    for handle in handles {
        served_total += handle.await.unwrap();
    }

    assert_eq!(served_total, 20);
    assert_eq!(repo.target_hits(1), Some(20));

    // Once at cap, the target is excluded from every subsequent selection
    assert!(matches!(
        selector.select(&link, Some("US")).await.unwrap(),
        Selection::Backup
    ));
}

async fn repo_link(repo: &Arc<MemoryLinkRepository>) -> smart_redirect::domain::entities::Link {
    repo.find_by_code("bu", "df7fca")
        .await
        .unwrap()
        .expect("link registered by the test")
}

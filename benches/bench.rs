// Criterion benchmarks for Lianjie Feed

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lianjie_feed::core::{distance::distance, filters::sort_records, Lister, PageParams};
use lianjie_feed::models::{
    Gender, GenderFilter, OrderBy, Requester, ResultPage, SortKey, User, UserStatus, VipLevel,
};
use lianjie_feed::services::InMemoryStore;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn create_candidate(id: i64, lat: f64, lon: f64) -> User {
    let created = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id);
    User {
        id,
        nickname: format!("user{}", id),
        status: UserStatus::Active,
        gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
        avatar: String::new(),
        vip_level: if id % 5 == 0 { VipLevel::Vip } else { VipLevel::Free },
        vip_expire_at: None,
        whats_up: None,
        constellation: "Aries".to_string(),
        tag: None,
        province: Some("Sichuan".to_string()),
        city: Some("Chengdu".to_string()),
        area: None,
        latitude: Some(lat),
        longitude: Some(lon),
        profile_photo_urls: None,
        created_at: created,
        updated_at: created,
        last_login_at: (id % 3 != 0).then(|| created + Duration::hours(id)),
    }
}

fn create_candidates(count: i64) -> Vec<User> {
    (0..count)
        .map(|i| {
            let offset = (i as f64 * 0.001) % 0.5;
            create_candidate(i + 1, 30.5728 + offset, 104.0668 + offset)
        })
        .collect()
}

fn bench_distance(c: &mut Criterion) {
    c.bench_function("distance", |b| {
        b.iter(|| {
            distance(
                black_box(30.5728),
                black_box(104.0668),
                black_box(31.2304),
                black_box(121.4737),
            )
        });
    });
}

fn bench_sort_by_last_login(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_records");

    for count in [100, 1000, 10000].iter() {
        let candidates = create_candidates(*count);
        group.bench_with_input(BenchmarkId::new("last_login_desc", count), count, |b, _| {
            b.iter(|| {
                let mut users = candidates.clone();
                sort_records(&mut users, OrderBy::desc(SortKey::LastLogin));
                black_box(users)
            });
        });
    }

    group.finish();
}

fn bench_page_shuffle(c: &mut Criterion) {
    let page = ResultPage::new(create_candidates(20), None);
    let mut rng = StdRng::seed_from_u64(11);

    c.bench_function("page_shuffle_20", |b| {
        b.iter(|| black_box(page.clone().shuffled(&mut rng)));
    });
}

fn bench_nearby_users(c: &mut Criterion) {
    let lister = Lister::default();
    let store = InMemoryStore::new();
    tokio_test::block_on(async {
        for user in create_candidates(1000) {
            store.insert_user(user).await;
        }
    });

    let requester = Requester::from(&create_candidate(0, 30.5728, 104.0668));
    let mut rng = StdRng::seed_from_u64(11);

    c.bench_function("nearby_users_1000_candidates", |b| {
        b.iter(|| {
            let page = tokio_test::block_on(lister.nearby_users(
                &store,
                &requester,
                GenderFilter::Any,
                PageParams::new(black_box(2), 20),
                &mut rng,
            ));
            black_box(page)
        });
    });
}

criterion_group!(
    benches,
    bench_distance,
    bench_sort_by_last_login,
    bench_page_shuffle,
    bench_nearby_users
);

criterion_main!(benches);

//! Group Deletion Benchmarks
//!
//! Measures the per-locale translation fan-out and the full confirm-to-save
//! deletion over the in-memory administration API.

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use realm_profile_admin::admin_api::InMemoryAdminApi;
use realm_profile_admin::profile::{AttributeGroup, UserProfileConfig};
use realm_profile_admin::realm::{LocaleSet, RealmRepresentation};
use realm_profile_admin::store::AttributeGroupStore;
use realm_profile_admin::translation::{NoopObserver, TranslationSynchronizer};
use realm_profile_admin::workflow::GroupDeletionWorkflow;
use std::sync::Arc;
use tokio::runtime::Runtime;

const REALM: &str = "bench";

fn locale_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("l{:03}", i)).collect()
}

/// Realm with `locales` locales, each holding the contact group's texts plus
/// unrelated filler keys.
async fn seeded_api(locales: &[String]) -> Arc<InMemoryAdminApi> {
    let api = Arc::new(InMemoryAdminApi::new());
    api.add_realm(RealmRepresentation::new(REALM).with_locales(
        locales[0].as_str(),
        locales.iter().map(String::as_str),
    ))
    .await;
    let _ = api
        .set_user_profile_config(
            REALM,
            &UserProfileConfig::with_groups(vec![
                AttributeGroup::new("user-metadata"),
                AttributeGroup::localized("contact"),
            ]),
        )
        .await;

    for locale in locales {
        let filler = (0..50).map(|i| (format!("filler.{}", i), format!("text {}", i)));
        let group_texts = [
            ("profile.attribute-group.contact".to_string(), "Contact".to_string()),
            (
                "profile.attribute-group-description.contact".to_string(),
                "How to reach you".to_string(),
            ),
        ];
        let _ = api
            .seed_localization_texts(REALM, locale, filler.chain(group_texts))
            .await;
    }
    api
}

fn bench_remove_translations(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("remove_translations");

    for count in [1, 8, 32].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        let names = locale_names(*count);
        let locales: LocaleSet = names.iter().map(String::as_str).collect();
        let contact = AttributeGroup::localized("contact");

        group.bench_with_input(BenchmarkId::new("locales", count), count, |b, _| {
            b.iter_batched(
                || runtime.block_on(seeded_api(&names)),
                |api| {
                    let synchronizer = TranslationSynchronizer::new(api, REALM);
                    let report = runtime.block_on(synchronizer.remove_translations(
                        &contact,
                        &locales,
                        &NoopObserver,
                    ));
                    black_box(report)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_confirmed_deletion(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("confirmed_deletion");

    for count in [1, 8, 32].iter() {
        let names = locale_names(*count);

        group.bench_with_input(BenchmarkId::new("locales", count), count, |b, _| {
            b.iter_batched(
                || {
                    runtime.block_on(async {
                        let api = seeded_api(&names).await;
                        let store = Arc::new(AttributeGroupStore::new(api, REALM));
                        let _ = store.load().await;
                        let locales: LocaleSet = names.iter().map(String::as_str).collect();
                        let mut workflow = GroupDeletionWorkflow::new(store, locales);
                        let _ = workflow.request_delete(AttributeGroup::localized("contact"));
                        workflow
                    })
                },
                |mut workflow| black_box(runtime.block_on(workflow.confirm())),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_remove_translations, bench_confirmed_deletion);

criterion_main!(benches);

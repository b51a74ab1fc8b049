//! # Scoring Benchmarks
//!
//! Performance benchmarks for arquimetro-core scoring and progress.
//!
//! Run with: `cargo bench -p arquimetro-core`

use arquimetro_core::{
    Catalog, CatalogStore, CategoryId, CategoryOutline, ProgressTracker, QuestionDraft,
    QuestionId, ResponseOptionDraft, ResponseOptionId, ScoreAggregator, SubcategoryDraft, Weight,
    export_canonical,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

/// Default catalog with `size` questions of five options in the first
/// category, every question answered.
fn create_answered_catalog(size: usize) -> (Catalog, CategoryId, BTreeMap<QuestionId, ResponseOptionId>) {
    let mut catalog = Catalog::with_default_categories();
    let category = catalog.categories_ordered()[0].id;
    let subcategory = catalog
        .create_subcategory(SubcategoryDraft {
            title: "Bench".to_string(),
            category_id: category,
            sort_order: 0,
        })
        .expect("subcategory")
        .id;

    let mut responses = BTreeMap::new();
    for i in 0..size {
        let question = catalog
            .create_question(QuestionDraft {
                text: format!("Questão {}", i),
                subcategory_id: subcategory,
                deficiency_types: Default::default(),
                sort_order: i as i32,
            })
            .expect("question")
            .id;
        for level in 1..=5u8 {
            let option = catalog
                .create_response_option(ResponseOptionDraft {
                    question_id: question,
                    level,
                    label: format!("Nível {}", level),
                    explanation: String::new(),
                    feedback: String::new(),
                    weight: Weight::whole(u32::from(level)),
                    deficiency_types: Default::default(),
                })
                .expect("option")
                .id;
            if usize::from(level) == i % 5 + 1 {
                responses.insert(question, option);
            }
        }
    }

    (catalog, category, responses)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_build");

    for size in [10, 100, 1000].iter() {
        let (catalog, category, _) = create_answered_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(CategoryOutline::build(&catalog, category)));
        });
    }

    group.finish();
}

fn bench_assess(c: &mut Criterion) {
    let mut group = c.benchmark_group("assess");

    for size in [10, 100, 1000].iter() {
        let (catalog, category, responses) = create_answered_catalog(*size);
        let outline = CategoryOutline::build(&catalog, category).expect("outline");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(ScoreAggregator::assess(&outline, &responses)));
        });
    }

    group.finish();
}

fn bench_overall_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("overall_progress");

    for size in [10, 100, 1000].iter() {
        let (catalog, _, responses) = create_answered_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(ProgressTracker::overall_progress(&catalog, &responses)));
        });
    }

    group.finish();
}

fn bench_export_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_canonical");

    for size in [10, 100, 1000].iter() {
        let (catalog, _, _) = create_answered_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(export_canonical(&catalog)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_outline,
    bench_assess,
    bench_overall_progress,
    bench_export_canonical,
);

criterion_main!(benches);

//! Integration tests for page assembly over an in-memory backend.

use unspread::layout::{classify, detect, sort};
use unspread::{
    assemble_document, BBox, ColumnSide, Diagnostics, Error, Fragment, LayoutOptions,
    MemoryBackend, Page, PageAssembler, PageLayout,
};

const WIDTH: f32 = 600.0;

fn block(x0: f32, y0: f32, text: &str, id: u32) -> Fragment {
    Fragment::text(BBox::new(x0, y0, x0 + 40.0, y0 + 12.0), text, id)
}

/// Three left blocks in scrambled order plus three right blocks.
fn scenario_a() -> Page {
    Page::new(1, WIDTH, 800.0)
        .with_fragment(block(5.0, 50.0, "left bottom", 0))
        .with_fragment(block(400.0, 30.0, "right middle", 1))
        .with_fragment(block(60.0, 10.0, "left top second", 2))
        .with_fragment(block(400.0, 10.0, "right top", 3))
        .with_fragment(block(5.0, 10.0, "left top first", 4))
        .with_fragment(block(400.0, 90.0, "right bottom", 5))
}

/// One left block and five right blocks.
fn scenario_b() -> Page {
    let mut page = Page::new(1, WIDTH, 800.0).with_fragment(block(5.0, 10.0, "stray", 0));
    for i in 0..5 {
        page.add_fragment(block(400.0, 20.0 * i as f32, "body", i + 1));
    }
    page
}

fn assemble(backend: &MemoryBackend) -> unspread::Result<unspread::Document> {
    assemble_document(
        backend,
        "book.pdf",
        &LayoutOptions::default(),
        &Diagnostics::new(),
    )
}

#[test]
fn test_scenario_a_two_column_reading_order() {
    let page = scenario_a();
    let columns = classify(page.fragments.clone(), page.width);
    assert_eq!(detect(&columns, 2), PageLayout::TwoColumn);

    let keys: Vec<(f32, f32)> = sort(columns.left)
        .iter()
        .map(|f| (f.bbox.y0, f.bbox.x0))
        .collect();
    assert_eq!(keys, vec![(10.0, 5.0), (10.0, 60.0), (50.0, 5.0)]);

    let backend = MemoryBackend::new().with_page(page, "unused whole-page text");
    let doc = assemble(&backend).unwrap();

    assert_eq!(doc.pages.len(), 2);
    assert_eq!(
        doc.pages[0].body,
        "left top first\nleft top second\nleft bottom"
    );
    assert_eq!(doc.pages[0].side, Some(ColumnSide::Left));
    assert_eq!(doc.pages[1].body, "right top\nright middle\nright bottom");
    assert_eq!(doc.pages[1].side, Some(ColumnSide::Right));
}

#[test]
fn test_scenario_b_sparse_side_is_single_column() {
    let backend = MemoryBackend::new().with_page(scenario_b(), "  Whole page.\n");
    let doc = assemble(&backend).unwrap();

    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.pages[0].body, "Whole page.");
    assert_eq!(doc.to_markdown(), "## Page 1\n\nWhole page.\n\n");
}

#[test]
fn test_scenario_c_empty_page() {
    let backend = MemoryBackend::new()
        .with_page(Page::new(1, WIDTH, 800.0), "")
        .with_page(Page::new(2, WIDTH, 800.0), "next");
    let doc = assemble(&backend).unwrap();

    assert_eq!(doc.pages[0].body, "");
    assert_eq!(doc.pages[1].number, 2);
    assert_eq!(doc.to_markdown(), "## Page 1\n\n\n\n## Page 2\n\nnext\n\n");
}

#[test]
fn test_scenario_d_page_failure_aborts_document() {
    let mut backend = MemoryBackend::new();
    for n in 1..=10 {
        backend.push_page(Page::new(n, WIDTH, 800.0), format!("page {n}"));
    }
    let backend = backend.fail_on(5);

    match assemble(&backend) {
        Err(Error::DecodeFragment { page, .. }) => assert_eq!(page, 5),
        other => panic!("expected page 5 failure, got {other:?}"),
    }
}

#[test]
fn test_numbering_single_double_single() {
    let backend = MemoryBackend::new()
        .with_page(Page::new(1, WIDTH, 800.0), "first")
        .with_page(scenario_a(), "")
        .with_page(Page::new(3, WIDTH, 800.0), "last");
    let doc = assemble(&backend).unwrap();

    let numbers: Vec<u32> = doc.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    let physical: Vec<u32> = doc.pages.iter().map(|p| p.physical_page).collect();
    assert_eq!(physical, vec![1, 2, 2, 3]);

    assert_eq!(doc.stats.physical_pages, 3);
    assert_eq!(doc.stats.single_column_pages, 2);
    assert_eq!(doc.stats.two_column_pages, 1);
    assert_eq!(doc.stats.logical_pages, 4);

    let markdown = doc.to_markdown();
    let headings: Vec<&str> = markdown
        .lines()
        .filter(|l| l.starts_with("## "))
        .collect();
    assert_eq!(
        headings,
        vec!["## Page 1", "## Page 2", "## Page 3", "## Page 4"]
    );
}

#[test]
fn test_process_page_is_idempotent() {
    let backend = MemoryBackend::new().with_page(scenario_a(), "");
    let diagnostics = Diagnostics::new();

    let mut first = PageAssembler::new(LayoutOptions::default(), &diagnostics);
    let a = first.process_page(&backend, 1).unwrap().to_vec();

    let mut second = PageAssembler::new(LayoutOptions::default(), &diagnostics);
    let b = second.process_page(&backend, 1).unwrap().to_vec();

    assert_eq!(a, b);
    assert_eq!(first.markdown(), second.markdown());
}

#[test]
fn test_non_text_fragments_do_not_count_toward_columns() {
    let page = Page::new(1, WIDTH, 800.0)
        .with_fragment(block(5.0, 10.0, "left one", 0))
        .with_fragment(block(5.0, 40.0, "left two", 1))
        .with_fragment(block(400.0, 10.0, "right one", 2))
        .with_fragment(Fragment::non_text(BBox::new(400.0, 100.0, 500.0, 200.0), 3));
    let backend = MemoryBackend::new().with_page(page, "fallback");
    let doc = assemble(&backend).unwrap();

    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.pages[0].body, "fallback");
}

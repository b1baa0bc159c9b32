mod common;

use common::*;
use pdf_pages::*;
use std::sync::Arc;

async fn splitter_with(bytes: Vec<u8>) -> (SplitterStore, EngineContext) {
    let ctx = EngineContext::new(ToolOptions::default())
        .with_rasterizer(Arc::new(FakeRasterizer::default()));
    let mut store = SplitterStore::new();
    ingest_splitter(&mut store, bytes, &ctx).await.unwrap();
    (store, ctx)
}

#[tokio::test]
async fn test_flagged_pages_become_two_half_pages() {
    let (mut store, ctx) = splitter_with(create_sized_pdf(
        "S",
        &[(1224, 792), (612, 792), (1224, 792)],
    ))
    .await;
    store.toggle_split(1).unwrap();
    assert_eq!(store.flagged_count(), 2);

    let delivery = split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivery.filename, "Carma_Split_Result.pdf");
    assert_eq!(delivery.mime, MIME_PDF);

    let doc = load(&delivery.bytes);
    let ids = page_ids(&doc);
    // unflagged + 2 * flagged
    assert_eq!(ids.len(), 1 + 2 * 2);

    let sizes: Vec<(f32, f32)> = ids.iter().map(|&id| dimensions(&doc, id)).collect();
    assert_eq!(
        sizes,
        vec![
            (612.0, 792.0),
            (612.0, 792.0),
            (612.0, 792.0),
            (612.0, 792.0),
            (612.0, 792.0),
        ]
    );

    // The unflagged page is copied as is
    assert!(page_text(&doc, ids[2]).contains("(S 2)"));
}

#[tokio::test]
async fn test_left_to_right_draws_left_half_first() {
    let (store, ctx) = splitter_with(create_sized_pdf("S", &[(1224, 792)])).await;

    let delivery = split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap()
        .unwrap();
    let doc = load(&delivery.bytes);
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 2);

    let first = page_text(&doc, ids[0]);
    let second = page_text(&doc, ids[1]);
    assert!(first.contains("1 0 0 1 0 0 cm"));
    assert!(first.contains("0 0 612 792 re W n"));
    assert!(second.contains("1 0 0 1 -612 0 cm"));
    assert!(second.contains("612 0 612 792 re W n"));
}

#[tokio::test]
async fn test_right_to_left_draws_right_half_first() {
    let (store, ctx) = splitter_with(create_sized_pdf("S", &[(612, 400)])).await;

    let delivery = split_spreads(&store, SplitDirection::RightToLeft, &ctx)
        .await
        .unwrap()
        .unwrap();
    let doc = load(&delivery.bytes);
    let ids = page_ids(&doc);

    assert!(page_text(&doc, ids[0]).contains("1 0 0 1 -306 0 cm"));
    assert!(page_text(&doc, ids[1]).contains("1 0 0 1 0 0 cm"));
    assert_eq!(dimensions(&doc, ids[0]), (306.0, 400.0));
}

#[tokio::test]
async fn test_halves_share_one_embedded_spread() {
    let (store, ctx) = splitter_with(create_sized_pdf("Spread", &[(1000, 700)])).await;

    let delivery = split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap()
        .unwrap();
    let doc = load(&delivery.bytes);
    let ids = page_ids(&doc);

    for &id in &ids {
        assert!(page_text(&doc, id).contains("/Sp Do"));
        assert!(drawn_xobject_text(&doc, id).contains("(Spread 1)"));
    }

    let xobject_of = |id| {
        let page = doc.get_dictionary(id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        xobjects.get(b"Sp").unwrap().as_reference().unwrap()
    };
    assert_eq!(xobject_of(ids[0]), xobject_of(ids[1]));
}

#[tokio::test]
async fn test_nothing_flagged_copies_every_page() {
    let (mut store, ctx) = splitter_with(create_test_pdf("S", 3)).await;
    store.flag_none();

    let delivery = split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap()
        .unwrap();
    let doc = load(&delivery.bytes);
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 3);
    for (n, &id) in ids.iter().enumerate() {
        assert!(page_text(&doc, id).contains(&format!("(S {})", n + 1)));
        assert_eq!(dimensions(&doc, id), (612.0, 792.0));
    }
}

#[tokio::test]
async fn test_inherited_media_box_is_split() {
    let (store, ctx) = splitter_with(create_inherited_pdf("I", 2, 800, 500)).await;

    let delivery = split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap()
        .unwrap();
    let doc = load(&delivery.bytes);
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 4);
    for &id in &ids {
        assert_eq!(dimensions(&doc, id), (400.0, 500.0));
    }
}

#[tokio::test]
async fn test_empty_splitter_produces_nothing() {
    let store = SplitterStore::new();
    let ctx = EngineContext::default();
    let result = split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_split_reports_progress() {
    let reports = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = reports.clone();
    let (store, _) = splitter_with(create_test_pdf("S", 7)).await;
    let ctx = EngineContext::default().with_progress(move |p| sink.lock().unwrap().push(p));

    split_spreads(&store, SplitDirection::LeftToRight, &ctx)
        .await
        .unwrap()
        .unwrap();

    let currents: Vec<usize> = reports.lock().unwrap().iter().map(|p| p.current).collect();
    assert_eq!(currents, vec![0, 5, 7]);
}

#[tokio::test]
async fn test_corrupt_source_aborts_split() {
    let mut store = SplitterStore::new();
    let source: Arc<[u8]> = Arc::from(&b"%PDF-1.7 not really"[..]);
    store.collection.push(PageSurrogate::new(
        SharedPage {
            source,
            page_index: 0,
        },
        Vec::new(),
    ));
    let ctx = EngineContext::default();

    let result = split_spreads(&store, SplitDirection::LeftToRight, &ctx).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unreadable_page_aborts_split_with_position() {
    let (mut store, ctx) = splitter_with(create_dangling_content_pdf(3)).await;
    assert_eq!(store.collection.len(), 3);

    let err = split_spreads(&store, SplitDirection::RightToLeft, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, PagesError::Page { index: 0, .. }));

    // Unflagged pages fail the same way when copied
    store.flag_none();
    let result = split_spreads(&store, SplitDirection::LeftToRight, &ctx).await;
    assert!(matches!(result, Err(PagesError::Page { index: 0, .. })));
}

#[tokio::test]
async fn test_invalid_options_are_rejected_before_splitting() {
    let (store, _) = splitter_with(create_test_pdf("S", 2)).await;
    let ctx = EngineContext::new(ToolOptions {
        progress_stride: 0,
        ..Default::default()
    });

    let result = split_spreads(&store, SplitDirection::LeftToRight, &ctx).await;
    assert!(matches!(result, Err(PagesError::Config(_))));
}

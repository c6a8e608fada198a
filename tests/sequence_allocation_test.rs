//! Cash memo number allocation: one counter row per fiscal year, numbers
//! issued strictly in sequence and never reused.

mod common;

use common::{cash_memo_payload, clerk, lr_payload, memo_payload, TestApp, TEST_YEAR};
use freightbook_api::services::sequence::SequenceAllocator;

#[tokio::test]
async fn numbers_are_consecutive_within_a_year() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-201"), &actor)
        .await
        .expect("create memo");

    let mut issued = Vec::new();
    for no in ["LR-1", "LR-2", "LR-3", "LR-4"] {
        let lr = app
            .services
            .lrs
            .create_lr(TEST_YEAR, lr_payload(memo.memo.id, no), &actor)
            .await
            .expect("create lr");
        let created = app
            .services
            .cash_memos
            .create_cash_memo(TEST_YEAR, cash_memo_payload(lr.id), &actor)
            .await
            .expect("issue cash memo");
        issued.push(created.cash_memo_no);
    }

    assert_eq!(issued, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn overlapping_allocations_get_distinct_consecutive_numbers() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-204"), &actor)
        .await
        .expect("create memo");

    let mut lr_ids = Vec::new();
    for no in ["LR-1", "LR-2", "LR-3", "LR-4"] {
        let lr = app
            .services
            .lrs
            .create_lr(TEST_YEAR, lr_payload(memo.memo.id, no), &actor)
            .await
            .expect("create lr");
        lr_ids.push(lr.id);
    }

    let issue = |lr_id| {
        let cash_memos = &app.services.cash_memos;
        let actor = &actor;
        async move {
            cash_memos
                .create_cash_memo(TEST_YEAR, cash_memo_payload(lr_id), actor)
                .await
                .expect("issue cash memo")
                .cash_memo_no
        }
    };

    let issued = tokio::join!(
        issue(lr_ids[0]),
        issue(lr_ids[1]),
        issue(lr_ids[2]),
        issue(lr_ids[3]),
    );

    let mut numbers = vec![issued.0, issued.1, issued.2, issued.3];
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn counters_are_independent_per_year() {
    let app = TestApp::new().await;
    let actor = clerk();

    app.services
        .years
        .ensure_year(TEST_YEAR + 1)
        .await
        .expect("register next year");

    for year in [TEST_YEAR, TEST_YEAR + 1] {
        let memo = app
            .services
            .memos
            .create_memo(year, memo_payload("M-202"), &actor)
            .await
            .expect("create memo");
        let lr = app
            .services
            .lrs
            .create_lr(year, lr_payload(memo.memo.id, "LR-1"), &actor)
            .await
            .expect("create lr");
        let created = app
            .services
            .cash_memos
            .create_cash_memo(year, cash_memo_payload(lr.id), &actor)
            .await
            .expect("issue cash memo");

        // Both years start from 1.
        assert_eq!(created.cash_memo_no, 1);
    }
}

#[tokio::test]
async fn deleting_a_cash_memo_does_not_recycle_its_number() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-203"), &actor)
        .await
        .expect("create memo");
    let lr1 = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("create lr");
    let lr2 = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-2"), &actor)
        .await
        .expect("create lr");

    let first = app
        .services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr1.id), &actor)
        .await
        .expect("first cash memo");
    app.services
        .cash_memos
        .delete_cash_memo(TEST_YEAR, first.id, &actor)
        .await
        .expect("delete first cash memo");

    let second = app
        .services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr2.id), &actor)
        .await
        .expect("second cash memo");
    assert_eq!(second.cash_memo_no, first.cash_memo_no + 1);
}

#[tokio::test]
async fn allocator_seeds_from_issued_memos_for_unregistered_year() {
    let app = TestApp::new().await;

    // No counter row for this year yet; the first allocation seeds from the
    // issued memos (none) and hands out 1.
    let no = SequenceAllocator::next_cash_memo_no(&*app.db, 1999)
        .await
        .expect("first allocation");
    assert_eq!(no, 1);

    let next = SequenceAllocator::next_cash_memo_no(&*app.db, 1999)
        .await
        .expect("second allocation");
    assert_eq!(next, 2);
}

#[tokio::test]
async fn ensure_counter_is_idempotent() {
    let app = TestApp::new().await;

    SequenceAllocator::ensure_counter(&*app.db, 2030)
        .await
        .expect("first ensure");
    SequenceAllocator::ensure_counter(&*app.db, 2030)
        .await
        .expect("second ensure");

    let no = SequenceAllocator::next_cash_memo_no(&*app.db, 2030)
        .await
        .expect("allocation after ensure");
    assert_eq!(no, 1);
}

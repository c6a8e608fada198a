//! End-to-end bookkeeping flow: memo, lorry receipts, cash memo issue and
//! the cascade delete, all against a real in-memory database.

mod common;

use common::{admin, cash_memo_payload, clerk, lr_payload, memo_payload, TestApp, TEST_YEAR};
use freightbook_api::entities::{
    cash_memo::Entity as CashMemoEntity, lorry_receipt::Entity as LrEntity,
};
use freightbook_api::errors::ServiceError;
use freightbook_api::services::lorry_receipts::{LrSearchFilters, MarkDeliveredRequest};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn memo_lr_cash_memo_flow() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-101"), &actor)
        .await
        .expect("create memo");
    assert_eq!(memo.memo.fiscal_year, TEST_YEAR);
    assert_eq!(memo.balance_lorry_hire, dec!(7000));

    let lr = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("create lr");
    assert_eq!(lr.status, "Pending");
    assert!(!lr.has_cash_memo);

    let created = app
        .services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr.id), &actor)
        .await
        .expect("issue cash memo");
    assert_eq!(created.cash_memo_no, 1);

    // Issuing flips the flag on the receipt; Topay freight lands in the total.
    let detail = app
        .services
        .lrs
        .get_lr(TEST_YEAR, lr.id)
        .await
        .expect("reload lr");
    assert!(detail.lr.has_cash_memo);
    let cm = detail.cash_memo.expect("nested cash memo");
    assert_eq!(cm.cash_memo.cash_memo_total, dec!(1585));
    assert_eq!(cm.true_cash_memo_total, dec!(1585));
}

#[tokio::test]
async fn one_cash_memo_per_lorry_receipt() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-102"), &actor)
        .await
        .expect("create memo");
    let lr = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("create lr");

    app.services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr.id), &actor)
        .await
        .expect("first cash memo");

    let err = app
        .services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr.id), &actor)
        .await
        .expect_err("second cash memo must be rejected");
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn duplicate_memo_no_within_year_is_rejected() {
    let app = TestApp::new().await;
    let actor = clerk();

    app.services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-103"), &actor)
        .await
        .expect("first memo");

    let err = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-103"), &actor)
        .await
        .expect_err("same number in the same year must fail");
    assert!(matches!(err, ServiceError::Duplicate(_)));

    // The same number is fine in a different fiscal year.
    app.services
        .years
        .ensure_year(TEST_YEAR + 1)
        .await
        .expect("register next year");
    app.services
        .memos
        .create_memo(TEST_YEAR + 1, memo_payload("M-103"), &actor)
        .await
        .expect("same number in next year");
}

#[tokio::test]
async fn paid_freight_excluded_from_cash_memo_total() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-104"), &actor)
        .await
        .expect("create memo");

    let mut payload = lr_payload(memo.memo.id, "LR-PAID");
    payload.freight_type = "Paid".to_string();
    let lr = app
        .services
        .lrs
        .create_lr(TEST_YEAR, payload, &actor)
        .await
        .expect("create paid lr");

    app.services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr.id), &actor)
        .await
        .expect("issue cash memo");

    let detail = app
        .services
        .cash_memos
        .get_by_lr_id(TEST_YEAR, lr.id)
        .await
        .expect("reload cash memo");
    // Charge heads only: 50 + 5 + 20 + 10.
    assert_eq!(detail.cash_memo.cash_memo_total, dec!(85));
    assert_eq!(detail.true_cash_memo_total, dec!(85));
}

#[tokio::test]
async fn memo_delete_cascades_to_lrs_and_cash_memos() {
    let app = TestApp::new().await;
    let actor = admin();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-105"), &actor)
        .await
        .expect("create memo");

    let mut lr_ids = Vec::new();
    for no in ["LR-1", "LR-2", "LR-3"] {
        let lr = app
            .services
            .lrs
            .create_lr(TEST_YEAR, lr_payload(memo.memo.id, no), &actor)
            .await
            .expect("create lr");
        lr_ids.push(lr.id);
    }
    app.services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr_ids[0]), &actor)
        .await
        .expect("cash memo on first lr");

    let summary = app
        .services
        .memos
        .delete_memo(TEST_YEAR, memo.memo.id, &actor)
        .await
        .expect("cascade delete");
    assert_eq!(summary.deleted_lrs, 3);
    assert_eq!(summary.deleted_cash_memos, 1);

    let remaining_lrs = LrEntity::find()
        .filter(freightbook_api::entities::lorry_receipt::Column::MemoId.eq(memo.memo.id))
        .all(&*app.db)
        .await
        .expect("query lrs");
    assert!(remaining_lrs.is_empty());

    let remaining_cms = CashMemoEntity::find()
        .filter(freightbook_api::entities::cash_memo::Column::LrId.is_in(lr_ids))
        .all(&*app.db)
        .await
        .expect("query cash memos");
    assert!(remaining_cms.is_empty());
}

#[tokio::test]
async fn delivery_batch_skips_already_delivered() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-106"), &actor)
        .await
        .expect("create memo");

    let mut lr_ids = Vec::new();
    for no in ["LR-1", "LR-2", "LR-3"] {
        let lr = app
            .services
            .lrs
            .create_lr(TEST_YEAR, lr_payload(memo.memo.id, no), &actor)
            .await
            .expect("create lr");
        lr_ids.push(lr.id);
    }

    let first = app
        .services
        .lrs
        .mark_delivered(
            TEST_YEAR,
            MarkDeliveredRequest {
                lr_ids: vec![lr_ids[0]],
                delivered_by: "Suresh".to_string(),
            },
            &actor,
        )
        .await
        .expect("first batch");
    assert_eq!(first.updated, 1);
    assert_eq!(first.total, 1);

    // Second batch includes the already-delivered receipt and one unknown id.
    let second = app
        .services
        .lrs
        .mark_delivered(
            TEST_YEAR,
            MarkDeliveredRequest {
                lr_ids: vec![lr_ids[0], lr_ids[1], lr_ids[2], 99_999],
                delivered_by: "Suresh".to_string(),
            },
            &actor,
        )
        .await
        .expect("second batch");
    assert_eq!(second.updated, 2);
    assert_eq!(second.total, 4);

    let delivered = app
        .services
        .lrs
        .get_lr(TEST_YEAR, lr_ids[1])
        .await
        .expect("reload");
    assert_eq!(delivered.lr.status, "Delivered");
    assert_eq!(delivered.lr.delivered_by.as_deref(), Some("Suresh"));
}

#[tokio::test]
async fn search_with_no_matches_returns_empty_page() {
    let app = TestApp::new().await;

    let filters = LrSearchFilters {
        consignor: Some("nobody".to_string()),
        ..Default::default()
    };
    let page = app
        .services
        .lrs
        .search_lrs(TEST_YEAR, filters, 1, 20)
        .await
        .expect("empty search is not an error");
    assert_eq!(page.total, 0);
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn lookup_by_business_numbers() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-107"), &actor)
        .await
        .expect("create memo");
    let lr = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-777"), &actor)
        .await
        .expect("create lr");
    let created = app
        .services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr.id), &actor)
        .await
        .expect("issue cash memo");

    let by_lr_no = app
        .services
        .lrs
        .lookup_by_lr_no(TEST_YEAR, "LR-777")
        .await
        .expect("lookup by lr no");
    assert_eq!(by_lr_no.lr.id, lr.id);

    let by_cm_no = app
        .services
        .lrs
        .lookup_by_cash_memo_no(TEST_YEAR, created.cash_memo_no)
        .await
        .expect("lookup by cash memo no");
    assert_eq!(by_cm_no.lr.id, lr.id);

    let details = app
        .services
        .memos
        .lookup_memo(TEST_YEAR, "M-107")
        .await
        .expect("memo details");
    assert_eq!(details.lrs.len(), 1);
    assert_eq!(details.cash_memos.len(), 1);

    let missing = app.services.memos.lookup_memo(TEST_YEAR, "M-404").await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn year_isolation_hides_other_years_records() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-108"), &actor)
        .await
        .expect("create memo");

    app.services
        .years
        .ensure_year(TEST_YEAR + 1)
        .await
        .expect("register next year");

    let other_year = app
        .services
        .memos
        .get_memo(TEST_YEAR + 1, memo.memo.id)
        .await;
    assert!(matches!(other_year, Err(ServiceError::NotFound(_))));

    let listed = app
        .services
        .memos
        .list_memos(TEST_YEAR + 1)
        .await
        .expect("list other year");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn audit_trail_records_writes() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-109"), &actor)
        .await
        .expect("create memo");
    app.services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("create lr");

    let page = app
        .services
        .audit
        .list(TEST_YEAR, 1, 50)
        .await
        .expect("read audit trail");
    assert_eq!(page.total, 2);
    assert!(page
        .results
        .iter()
        .all(|row| row.user == actor.username && row.year == Some(TEST_YEAR)));
}

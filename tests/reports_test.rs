//! Report and dashboard queries over seeded bookkeeping data.

mod common;

use chrono::Utc;
use common::{cash_memo_payload, clerk, date, lr_payload, memo_payload, TestApp, TEST_YEAR};
use freightbook_api::services::lorry_receipts::MarkDeliveredRequest;
use freightbook_api::services::reports::{DeliveryFilters, MemoDateField, NoCashMemoFilters};
use rust_decimal_macros::dec;

#[tokio::test]
async fn door_delivery_report_lists_one_memos_charged_receipts() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-401"), &actor)
        .await
        .expect("create memo");

    // Stored dd_total wins for the first receipt; the second derives
    // rate * pkgs at booking time; the third has no door delivery.
    let mut with_stored = lr_payload(memo.memo.id, "LR-1");
    with_stored.dd_rate = Some(dec!(5));
    with_stored.dd_total = Some(dec!(75));
    app.services
        .lrs
        .create_lr(TEST_YEAR, with_stored, &actor)
        .await
        .expect("lr with stored dd");

    let mut with_rate = lr_payload(memo.memo.id, "LR-2");
    with_rate.dd_rate = Some(dec!(4));
    with_rate.pkgs = Some(10);
    app.services
        .lrs
        .create_lr(TEST_YEAR, with_rate, &actor)
        .await
        .expect("lr with dd rate");

    app.services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-3"), &actor)
        .await
        .expect("lr without dd");

    let report = app
        .services
        .reports
        .door_delivery(TEST_YEAR, memo.memo.id)
        .await
        .expect("door delivery report");

    assert_eq!(report.arrival_date, date(2024, 6, 12));
    assert_eq!(report.lrs.len(), 2);
    assert_eq!(report.totals.lrs, 2);
    assert_eq!(report.totals.pkgs, 20);
    assert_eq!(report.totals.dd_total, dec!(115));

    let missing = app.services.reports.door_delivery(TEST_YEAR, 9999).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn truck_report_splits_freight_totals_by_type() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-402"), &actor)
        .await
        .expect("create memo");

    app.services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("topay lr");
    let mut paid = lr_payload(memo.memo.id, "LR-2");
    paid.freight_type = "Paid".to_string();
    paid.freight = Some(dec!(800));
    paid.refund = Some(dec!(50));
    app.services
        .lrs
        .create_lr(TEST_YEAR, paid, &actor)
        .await
        .expect("paid lr");

    let report = app
        .services
        .reports
        .truck(TEST_YEAR, memo.memo.id)
        .await
        .expect("truck report");

    assert_eq!(report.truck_no, "GJ-01-AB-1234");
    assert_eq!(report.lrs.len(), 2);
    assert_eq!(report.totals.lrs, 2);
    assert_eq!(report.totals.pkgs, 20);
    assert_eq!(report.totals.topay, dec!(1500));
    assert_eq!(report.totals.paid, dec!(800));
    assert_eq!(report.totals.weight, dec!(1700));
    assert_eq!(report.totals.refund, dec!(50));

    let missing = app.services.reports.truck(TEST_YEAR, 9999).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn monthly_report_lists_memos_in_range_with_receipt_sums() {
    let app = TestApp::new().await;
    let actor = clerk();

    let mut june_memo = memo_payload("M-404");
    june_memo.memo_date = date(2024, 6, 5);
    let june = app
        .services
        .memos
        .create_memo(TEST_YEAR, june_memo, &actor)
        .await
        .expect("june memo");
    app.services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(june.memo.id, "LR-T"), &actor)
        .await
        .expect("topay lr");
    let mut paid = lr_payload(june.memo.id, "LR-P");
    paid.freight_type = "Paid".to_string();
    paid.freight = Some(dec!(800));
    app.services
        .lrs
        .create_lr(TEST_YEAR, paid, &actor)
        .await
        .expect("paid lr");

    let mut feb_memo = memo_payload("M-405");
    feb_memo.memo_date = date(2025, 2, 20);
    feb_memo.arrival_date = date(2025, 2, 22);
    app.services
        .memos
        .create_memo(TEST_YEAR, feb_memo, &actor)
        .await
        .expect("february memo");

    let june_only = app
        .services
        .reports
        .monthly(
            TEST_YEAR,
            date(2024, 6, 1),
            date(2024, 6, 30),
            MemoDateField::Memo,
        )
        .await
        .expect("june report");

    assert_eq!(june_only.rows.len(), 1);
    let row = &june_only.rows[0];
    assert_eq!(row.memo_no, "M-404");
    assert_eq!(row.total_topay, dec!(1500));
    assert_eq!(row.total_paid, dec!(800));
    assert_eq!(row.balance_lorry_hire, dec!(7000));
    assert_eq!(june_only.totals.total_memos, 1);
    assert_eq!(june_only.totals.total_topay, dec!(1500));
    assert_eq!(june_only.totals.total_paid, dec!(800));

    let full_year = app
        .services
        .reports
        .monthly(
            TEST_YEAR,
            date(2024, 4, 1),
            date(2025, 3, 31),
            MemoDateField::Memo,
        )
        .await
        .expect("full year report");
    assert_eq!(full_year.rows.len(), 2);
    assert_eq!(full_year.totals.total_memos, 2);
    assert_eq!(full_year.totals.total_balance_lorry_hire, dec!(14000));

    // The arrival filter switches the range to the arrival date.
    let by_arrival = app
        .services
        .reports
        .monthly(
            TEST_YEAR,
            date(2025, 2, 1),
            date(2025, 2, 28),
            MemoDateField::Arrival,
        )
        .await
        .expect("arrival report");
    assert_eq!(by_arrival.rows.len(), 1);
    assert_eq!(by_arrival.rows[0].memo_no, "M-405");
}

#[tokio::test]
async fn refund_report_filters_refunded_receipts_by_memo_date() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-406"), &actor)
        .await
        .expect("create memo");

    let mut refunded = lr_payload(memo.memo.id, "LR-R");
    refunded.refund = Some(dec!(250));
    app.services
        .lrs
        .create_lr(TEST_YEAR, refunded, &actor)
        .await
        .expect("refunded lr");
    app.services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-N"), &actor)
        .await
        .expect("plain lr");

    let report = app
        .services
        .reports
        .refund(
            TEST_YEAR,
            date(2024, 6, 1),
            date(2024, 6, 30),
            MemoDateField::Memo,
        )
        .await
        .expect("refund report");

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].memo_no.as_deref(), Some("M-406"));
    assert_eq!(report.totals.total_lrs, 1);
    assert_eq!(report.totals.total_pkgs, 10);
    assert_eq!(report.totals.total_freight, dec!(1500));
    assert_eq!(report.totals.total_refund, dec!(250));

    // The memo dated 2024-06-10 falls outside a July window.
    let out_of_range = app
        .services
        .reports
        .refund(
            TEST_YEAR,
            date(2024, 7, 1),
            date(2024, 7, 31),
            MemoDateField::Memo,
        )
        .await
        .expect("empty refund report");
    assert!(out_of_range.rows.is_empty());
    assert_eq!(out_of_range.totals.total_refund, dec!(0));
}

#[tokio::test]
async fn no_cash_memo_report_includes_paid_receipts() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-407"), &actor)
        .await
        .expect("create memo");

    let open = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-OPEN"), &actor)
        .await
        .expect("open topay lr");
    let closed = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-DONE"), &actor)
        .await
        .expect("second topay lr");
    let paid = {
        let mut payload = lr_payload(memo.memo.id, "LR-PAID");
        payload.freight_type = "Paid".to_string();
        app.services
            .lrs
            .create_lr(TEST_YEAR, payload, &actor)
            .await
            .expect("paid lr")
    };

    app.services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(closed.id), &actor)
        .await
        .expect("close second lr");

    let report = app
        .services
        .reports
        .no_cash_memo(TEST_YEAR, NoCashMemoFilters::default())
        .await
        .expect("no cash memo report");

    // A paid receipt without a cash memo is still an open receipt.
    let mut ids: Vec<i32> = report.rows.iter().map(|r| r.lr.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![open.id, paid.id]);
    assert_eq!(report.totals.total_lrs, 2);
    assert_eq!(report.totals.total_pkgs, 20);
    assert_eq!(report.all_memos, vec!["M-407".to_string()]);
    assert_eq!(report.all_trucks, vec!["GJ-01-AB-1234".to_string()]);

    let other_memo = app
        .services
        .reports
        .no_cash_memo(
            TEST_YEAR,
            NoCashMemoFilters {
                memo_no: Some("M-999".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("filtered report");
    assert!(other_memo.rows.is_empty());
}

#[tokio::test]
async fn delivery_report_filters_on_the_delivery_date() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-408"), &actor)
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
        .expect("issue cash memo");
    app.services
        .lrs
        .mark_delivered(
            TEST_YEAR,
            MarkDeliveredRequest {
                lr_ids: vec![lr.id],
                delivered_by: "Suresh".to_string(),
            },
            &actor,
        )
        .await
        .expect("deliver");

    // The receipt was booked in June 2024 but delivered today; a range
    // around the delivery day must include it.
    let today = Utc::now().date_naive();
    let report = app
        .services
        .reports
        .delivery(
            TEST_YEAR,
            DeliveryFilters {
                from: Some(today),
                to: Some(today),
                ..Default::default()
            },
        )
        .await
        .expect("delivery report");

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.cash_memo_no, Some(1));
    assert_eq!(row.memo_no.as_deref(), Some("M-408"));
    // 50 + 5 + 20 + 10 charges plus 1500 Topay freight.
    assert_eq!(row.true_cash_memo_total, dec!(1585));
    assert_eq!(report.totals.total_cash_memo, dec!(1585));
    assert_eq!(report.totals.total_freight, dec!(1500));

    // The booking month contains no deliveries.
    let booking_window = app
        .services
        .reports
        .delivery(
            TEST_YEAR,
            DeliveryFilters {
                from: Some(date(2024, 6, 1)),
                to: Some(date(2024, 6, 30)),
                ..Default::default()
            },
        )
        .await
        .expect("empty delivery report");
    assert!(booking_window.rows.is_empty());
}

#[tokio::test]
async fn delivery_report_filters_by_person_and_counts_uninvoiced_freight() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-409"), &actor)
        .await
        .expect("create memo");
    let invoiced = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("invoiced lr");
    let uninvoiced = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-2"), &actor)
        .await
        .expect("uninvoiced lr");
    app.services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(invoiced.id), &actor)
        .await
        .expect("issue cash memo");

    app.services
        .lrs
        .mark_delivered(
            TEST_YEAR,
            MarkDeliveredRequest {
                lr_ids: vec![invoiced.id],
                delivered_by: "Suresh".to_string(),
            },
            &actor,
        )
        .await
        .expect("deliver first");
    app.services
        .lrs
        .mark_delivered(
            TEST_YEAR,
            MarkDeliveredRequest {
                lr_ids: vec![uninvoiced.id],
                delivered_by: "Ramesh".to_string(),
            },
            &actor,
        )
        .await
        .expect("deliver second");

    let report = app
        .services
        .reports
        .delivery(
            TEST_YEAR,
            DeliveryFilters {
                delivered_by: Some("Ramesh".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("delivery report");

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.lr.id, uninvoiced.id);
    assert_eq!(row.cash_memo_no, None);
    // To-pay freight is still owed even before a cash memo is issued.
    assert_eq!(row.true_cash_memo_total, dec!(1500));
    assert_eq!(report.totals.total_cash_memo, dec!(1500));
    assert_eq!(
        report.all_delivery_persons,
        vec!["Ramesh".to_string(), "Suresh".to_string()]
    );
}

#[tokio::test]
async fn dashboard_counts_follow_the_books() {
    let app = TestApp::new().await;
    let actor = clerk();

    let memo = app
        .services
        .memos
        .create_memo(TEST_YEAR, memo_payload("M-410"), &actor)
        .await
        .expect("create memo");
    let lr1 = app
        .services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-1"), &actor)
        .await
        .expect("create lr1");
    app.services
        .lrs
        .create_lr(TEST_YEAR, lr_payload(memo.memo.id, "LR-2"), &actor)
        .await
        .expect("create lr2");
    app.services
        .cash_memos
        .create_cash_memo(TEST_YEAR, cash_memo_payload(lr1.id), &actor)
        .await
        .expect("issue cash memo");
    app.services
        .lrs
        .mark_delivered(
            TEST_YEAR,
            MarkDeliveredRequest {
                lr_ids: vec![lr1.id],
                delivered_by: "Suresh".to_string(),
            },
            &actor,
        )
        .await
        .expect("deliver lr1");

    let summary = app
        .services
        .dashboard
        .summary(TEST_YEAR)
        .await
        .expect("dashboard summary");

    assert_eq!(summary.year, TEST_YEAR);
    assert_eq!(summary.memos, 1);
    assert_eq!(summary.lrs, 2);
    assert_eq!(summary.cash_memos, 1);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.delivered, 1);
    // LR-2 is Topay without a cash memo.
    assert_eq!(summary.pending_topay, 1);
}

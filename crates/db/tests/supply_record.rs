//! Integration tests for transactional supply record submission.
//!
//! Exercises the allocation ceiling against a real database:
//! - Structured breach reporting, nothing written on rejection
//! - Full item replacement on update, edit self-exclusion
//! - Disabled records freeing their quantities
//! - Racing concurrent submissions for one order
//! - The multi-supplier end-to-end scenario

use rust_decimal::Decimal;
use sqlx::PgPool;

use procura_db::models::supply_record::{
    NewSupplyItem, SubmitOutcome, SubmitSupplyRecord, SupplierInfo,
};
use procura_db::repositories::SupplyRecordRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_order(pool: &PgPool, order_no: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO purchase_orders (order_no) VALUES ($1) RETURNING id")
        .bind(order_no)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_order_line(pool: &PgPool, order_id: i64, product_id: i64, quantity: i64) {
    sqlx::query(
        "INSERT INTO purchase_order_items (purchase_order_id, product_id, ordered_quantity) \
         VALUES ($1, $2, $3)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await
    .unwrap();
}

fn supplier(name: &str) -> SupplierInfo {
    SupplierInfo {
        name: name.to_string(),
        contact_person: "Chen Wei".to_string(),
        contact_phone: "13800000000".to_string(),
        remark: None,
    }
}

fn item(product_id: i64, quantity: i64, unit_price: i64) -> NewSupplyItem {
    NewSupplyItem {
        product_id,
        quantity,
        unit_price: Decimal::from(unit_price),
        remark: None,
    }
}

fn submission(order_id: i64, name: &str, items: Vec<NewSupplyItem>) -> SubmitSupplyRecord {
    SubmitSupplyRecord {
        purchase_order_id: order_id,
        share_code: "testsharecode".to_string(),
        supplier: supplier(name),
        items,
        total_amount: None,
        remark: None,
    }
}

fn accepted(outcome: SubmitOutcome) -> procura_db::models::supply_record::SupplyRecordDetail {
    match outcome {
        SubmitOutcome::Accepted(detail) => detail,
        SubmitOutcome::QuantityExceeded(breaches) => {
            panic!("Expected acceptance, got breaches: {breaches:?}")
        }
    }
}

// ---------------------------------------------------------------------------
// Test: round trip with computed line totals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_round_trip_computes_totals(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2001").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    let outcome = SupplyRecordRepo::create(&pool, &submission(order_id, "Acme", vec![item(1, 10, 5)]))
        .await
        .unwrap();
    let detail = accepted(outcome);

    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 10);
    assert_eq!(detail.items[0].total_price, Decimal::from(50));
    assert_eq!(detail.record.total_amount, Decimal::from(50));

    let read = SupplyRecordRepo::find_detail(&pool, detail.record.id, order_id, "testsharecode")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read.items.len(), 1);
    assert_eq!(read.items[0].product_id, 1);
    assert_eq!(read.items[0].total_price, Decimal::from(50));
}

// ---------------------------------------------------------------------------
// Test: overflow is rejected with structured detail and writes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overflow_rejected_with_breach_detail(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2002").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Acme", vec![item(1, 60, 1)]))
            .await
            .unwrap(),
    );

    let outcome =
        SupplyRecordRepo::create(&pool, &submission(order_id, "Globex", vec![item(1, 50, 1)]))
            .await
            .unwrap();

    match outcome {
        SubmitOutcome::QuantityExceeded(breaches) => {
            assert_eq!(breaches.len(), 1);
            assert_eq!(breaches[0].product_id, 1);
            assert_eq!(breaches[0].ordered_quantity, 100);
            assert_eq!(breaches[0].already_committed, 60);
            assert_eq!(breaches[0].requested, 50);
            assert_eq!(breaches[0].max_allowed, 40);
        }
        SubmitOutcome::Accepted(_) => panic!("Over-commitment was accepted"),
    }

    // The rejected submission wrote nothing.
    let records = SupplyRecordRepo::list_for_order(&pool, order_id, None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].supplier_name, "Acme");
}

// ---------------------------------------------------------------------------
// Test: update replaces items wholesale
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_is_full_replacement(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2003").await;
    seed_order_line(&pool, order_id, 1, 100).await;
    seed_order_line(&pool, order_id, 2, 100).await;

    let detail = accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Acme", vec![item(1, 10, 2)]))
            .await
            .unwrap(),
    );

    let outcome = SupplyRecordRepo::update(
        &pool,
        detail.record.id,
        &submission(order_id, "Acme", vec![item(2, 5, 3)]),
    )
    .await
    .unwrap()
    .unwrap();
    let updated = accepted(outcome);

    // Item A is gone entirely; only item B remains.
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].product_id, 2);
    assert_eq!(updated.items[0].quantity, 5);
    assert_eq!(updated.record.total_amount, Decimal::from(15));

    let read = SupplyRecordRepo::find_detail(&pool, detail.record.id, order_id, "testsharecode")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read.items.len(), 1);
    assert_eq!(read.items[0].product_id, 2);
}

// ---------------------------------------------------------------------------
// Test: edit excludes the record's own prior quantities
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_self_exclusion(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2004").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    let mine = accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Acme", vec![item(1, 40, 1)]))
            .await
            .unwrap(),
    );
    accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Globex", vec![item(1, 30, 1)]))
            .await
            .unwrap(),
    );

    // Raising my own 40 to 70 fits: 70 + 30 (others) = 100. Without
    // self-exclusion the stale 40 would be double-counted and this would fail.
    let outcome = SupplyRecordRepo::update(
        &pool,
        mine.record.id,
        &submission(order_id, "Acme", vec![item(1, 70, 1)]),
    )
    .await
    .unwrap()
    .unwrap();
    accepted(outcome);

    // One more unit anywhere must now fail.
    let over = SupplyRecordRepo::update(
        &pool,
        mine.record.id,
        &submission(order_id, "Acme", vec![item(1, 71, 1)]),
    )
    .await
    .unwrap()
    .unwrap();
    match over {
        SubmitOutcome::QuantityExceeded(breaches) => {
            assert_eq!(breaches[0].max_allowed, 70);
        }
        SubmitOutcome::Accepted(_) => panic!("Over-commitment was accepted"),
    }
}

// ---------------------------------------------------------------------------
// Test: updating a missing or foreign record returns None
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_unknown_record_is_none(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2005").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    let missing = SupplyRecordRepo::update(
        &pool,
        99999,
        &submission(order_id, "Acme", vec![item(1, 1, 1)]),
    )
    .await
    .unwrap();
    assert!(missing.is_none());

    // A record reached through a different share code is invisible.
    let detail = accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Acme", vec![item(1, 10, 1)]))
            .await
            .unwrap(),
    );
    let mut foreign = submission(order_id, "Acme", vec![item(1, 10, 1)]);
    foreign.share_code = "othersharecd0".to_string();
    let via_foreign = SupplyRecordRepo::update(&pool, detail.record.id, &foreign)
        .await
        .unwrap();
    assert!(via_foreign.is_none());
}

// ---------------------------------------------------------------------------
// Test: disabled records are excluded from the committed sum
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_disabled_record_frees_its_quantity(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2006").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    let first = accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Acme", vec![item(1, 100, 1)]))
            .await
            .unwrap(),
    );

    // Ceiling fully committed.
    match SupplyRecordRepo::create(&pool, &submission(order_id, "Globex", vec![item(1, 1, 1)]))
        .await
        .unwrap()
    {
        SubmitOutcome::QuantityExceeded(_) => {}
        SubmitOutcome::Accepted(_) => panic!("Over-commitment was accepted"),
    }

    SupplyRecordRepo::disable(&pool, first.record.id)
        .await
        .unwrap()
        .unwrap();

    // The disabled record no longer counts.
    accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "Globex", vec![item(1, 100, 1)]))
            .await
            .unwrap(),
    );

    // A disabled record can no longer be updated through the portal.
    let via_portal = SupplyRecordRepo::update(
        &pool,
        first.record.id,
        &submission(order_id, "Acme", vec![item(1, 1, 1)]),
    )
    .await
    .unwrap();
    assert!(via_portal.is_none());
}

// ---------------------------------------------------------------------------
// Test: the end-to-end multi-supplier scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_multi_supplier_scenario(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2007").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    // Supplier A commits 60.
    accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "A", vec![item(1, 60, 1)]))
            .await
            .unwrap(),
    );

    // Supplier B tries 50, fails with max_allowed 40.
    match SupplyRecordRepo::create(&pool, &submission(order_id, "B", vec![item(1, 50, 1)]))
        .await
        .unwrap()
    {
        SubmitOutcome::QuantityExceeded(breaches) => {
            assert_eq!(breaches[0].max_allowed, 40);
        }
        SubmitOutcome::Accepted(_) => panic!("Over-commitment was accepted"),
    }

    // Supplier B resubmits 40, succeeds; the order is now fully committed.
    accepted(
        SupplyRecordRepo::create(&pool, &submission(order_id, "B", vec![item(1, 40, 1)]))
            .await
            .unwrap(),
    );

    // Any further unit fails, whoever asks.
    for name in ["A", "B", "C"] {
        match SupplyRecordRepo::create(&pool, &submission(order_id, name, vec![item(1, 1, 1)]))
            .await
            .unwrap()
        {
            SubmitOutcome::QuantityExceeded(breaches) => {
                assert_eq!(breaches[0].max_allowed, 0);
            }
            SubmitOutcome::Accepted(_) => panic!("Over-commitment was accepted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test: racing submissions never over-commit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_submissions_never_over_commit(pool: PgPool) {
    let order_id = seed_order(&pool, "PO-2008").await;
    seed_order_line(&pool, order_id, 1, 100).await;

    // 60 + 50 > 100: whichever submission wins the row lock commits, the
    // other must see its sum and be rejected.
    let a = {
        let pool = pool.clone();
        tokio::spawn(async move {
            SupplyRecordRepo::create(&pool, &submission(order_id, "A", vec![item(1, 60, 1)]))
                .await
                .unwrap()
        })
    };
    let b = {
        let pool = pool.clone();
        tokio::spawn(async move {
            SupplyRecordRepo::create(&pool, &submission(order_id, "B", vec![item(1, 50, 1)]))
                .await
                .unwrap()
        })
    };

    let outcomes = [a.await.unwrap(), b.await.unwrap()];
    let accepted_count = outcomes
        .iter()
        .filter(|o| matches!(o, SubmitOutcome::Accepted(_)))
        .count();
    assert_eq!(accepted_count, 1);

    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(i.quantity), 0)::BIGINT
         FROM supply_record_items i
         JOIN supply_records r ON r.id = i.supply_record_id
         WHERE r.purchase_order_id = $1 AND r.status_id = 1",
    )
    .bind(order_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(total <= 100, "Committed {total} exceeds the ordered 100");
}

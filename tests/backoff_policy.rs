use invoice_settlement::domain::settlement::{FailedSettlement, FailedSettlementReason, FailedSettlementStatus};
use invoice_settlement::service::backoff::{is_eligible, retry_window, BackoffAnchor, RetryWindow};

fn settlement(retries: i32, date_created: i64) -> FailedSettlement {
    FailedSettlement {
        id: 1,
        invoice_id: 1,
        status: FailedSettlementStatus::Unresolved,
        date_created,
        reason: FailedSettlementReason::InsufficientFunds,
        log: String::new(),
        retries,
    }
}

#[test]
fn windows_grow_by_a_factor_of_five() {
    assert_eq!(
        retry_window(0),
        Some(RetryWindow {
            start_secs: 300,
            end_secs: 1_500
        })
    );
    assert_eq!(
        retry_window(1),
        Some(RetryWindow {
            start_secs: 1_500,
            end_secs: 7_500
        })
    );
    assert_eq!(
        retry_window(2),
        Some(RetryWindow {
            start_secs: 7_500,
            end_secs: 37_500
        })
    );
}

#[test]
fn first_retry_window_is_half_open() {
    let s = settlement(0, 0);
    assert!(!is_eligible(&s, 299, BackoffAnchor::Epoch));
    assert!(is_eligible(&s, 300, BackoffAnchor::Epoch));
    assert!(is_eligible(&s, 1_499, BackoffAnchor::Epoch));
    assert!(!is_eligible(&s, 1_500, BackoffAnchor::Epoch));
}

#[test]
fn second_retry_only_in_next_window() {
    let s = settlement(1, 0);
    assert!(!is_eligible(&s, 600, BackoffAnchor::Epoch));
    assert!(is_eligible(&s, 1_500, BackoffAnchor::Epoch));
    assert!(is_eligible(&s, 7_499, BackoffAnchor::Epoch));
    assert!(!is_eligible(&s, 7_500, BackoffAnchor::Epoch));
}

#[test]
fn epoch_anchor_ignores_creation_time() {
    // created "late": a present-day clock is far past every low-retry window
    let s = settlement(0, 1_565_010_416);
    assert!(!is_eligible(&s, 1_565_010_416 + 600, BackoffAnchor::Epoch));
    assert!(is_eligible(&s, 600, BackoffAnchor::Epoch));
}

#[test]
fn since_created_anchor_measures_elapsed_time() {
    let created = 1_565_010_416;
    let s = settlement(0, created);
    assert!(!is_eligible(&s, created + 299, BackoffAnchor::SinceCreated));
    assert!(is_eligible(&s, created + 300, BackoffAnchor::SinceCreated));
    assert!(!is_eligible(&s, created + 1_500, BackoffAnchor::SinceCreated));
}

#[test]
fn negative_or_huge_retry_counts_are_never_eligible() {
    assert_eq!(retry_window(-1), None);
    assert_eq!(retry_window(40), None);
    assert!(!is_eligible(&settlement(-1, 0), 600, BackoffAnchor::Epoch));
    assert!(!is_eligible(&settlement(40, 0), i64::MAX, BackoffAnchor::Epoch));
}

#[test]
fn anchor_parses_from_config_values() {
    assert_eq!(BackoffAnchor::parse("created"), BackoffAnchor::SinceCreated);
    assert_eq!(BackoffAnchor::parse("SINCE_CREATED"), BackoffAnchor::SinceCreated);
    assert_eq!(BackoffAnchor::parse("epoch"), BackoffAnchor::Epoch);
    assert_eq!(BackoffAnchor::parse("whatever"), BackoffAnchor::Epoch);
}

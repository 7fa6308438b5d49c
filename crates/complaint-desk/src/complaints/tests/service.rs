use super::common::*;
use crate::complaints::domain::{ComplaintId, ComplaintStatus, ValidationError};
use crate::complaints::repository::StorageError;
use crate::complaints::service::{ComplaintService, ComplaintServiceError};
use chrono::Duration;
use std::sync::Arc;

#[test]
fn create_starts_new_with_equal_timestamps() {
    let (service, _, _) = build_service();

    let complaint = service.create(defective_part()).expect("create succeeds");

    assert!(complaint.id.0 > 0);
    assert_eq!(complaint.status, ComplaintStatus::New);
    assert_eq!(complaint.created_at, complaint.updated_at);
    assert_eq!(complaint.created_at, start_time());
    assert_eq!(complaint.title, "Defective part");
    assert_eq!(complaint.description, "Cracked casing");
    assert_eq!(complaint.customer_email, "a@b.com");
}

#[test]
fn create_rejects_invalid_input_before_touching_the_store() {
    let (service, store, _) = build_service();

    let cases = [
        (new_complaint("", "a@b.com"), ValidationError::EmptyTitle),
        (
            {
                let mut input = defective_part();
                input.description.clear();
                input
            },
            ValidationError::EmptyDescription,
        ),
        (
            new_complaint("Defective part", "not-an-email"),
            ValidationError::InvalidEmail {
                email: "not-an-email".to_string(),
            },
        ),
    ];

    for (input, expected) in cases {
        match service.create(input) {
            Err(ComplaintServiceError::Validation(error)) => assert_eq!(error, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert_eq!(store.calls(), 0);
}

#[test]
fn create_ignores_smuggled_status_in_json_payloads() {
    let (service, _, _) = build_service();
    let payload = serde_json::json!({
        "title": "Defective part",
        "description": "Cracked casing",
        "customer_email": "a@b.com",
        "status": "resolved",
    });
    let input = serde_json::from_value(payload).expect("extra fields are ignored");

    let complaint = service.create(input).expect("create succeeds");
    assert_eq!(complaint.status, ComplaintStatus::New);
}

#[test]
fn get_by_id_returns_none_for_missing_rows() {
    let (service, _, _) = build_service();
    service.create(defective_part()).expect("create succeeds");

    let missing = service.get_by_id(99999).expect("lookup is not an error");
    assert!(missing.is_none());
}

#[test]
fn get_by_id_rejects_non_positive_ids() {
    let (service, store, _) = build_service();

    match service.get_by_id(0) {
        Err(ComplaintServiceError::Validation(ValidationError::InvalidId { id: 0 })) => {}
        other => panic!("expected invalid id error, got {other:?}"),
    }
    assert_eq!(store.calls(), 0);
}

#[test]
fn create_update_and_fetch_scenario() {
    let (service, _, _) = build_service();

    let created = service.create(defective_part()).expect("create succeeds");
    let resolved = service
        .update_status(created.id.0, ComplaintStatus::Resolved)
        .expect("update succeeds");

    assert_eq!(resolved.id, created.id);
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert_eq!(resolved.created_at, created.created_at);
    assert!(resolved.updated_at > created.updated_at);
    assert_eq!(resolved.title, created.title);
    assert_eq!(resolved.description, created.description);
    assert_eq!(resolved.customer_email, created.customer_email);

    let fetched = service
        .get_by_id(created.id.0)
        .expect("lookup succeeds")
        .expect("complaint exists");
    assert_eq!(fetched, resolved);
}

#[test]
fn every_transition_is_permitted_and_advances_updated_at() {
    let (service, _, _) = build_service();
    let created = service.create(defective_part()).expect("create succeeds");

    let mut previous = created.clone();
    for from in ComplaintStatus::ALL {
        for to in ComplaintStatus::ALL {
            service
                .update_status(created.id.0, from)
                .expect("move to source status");
            let moved = service
                .update_status(created.id.0, to)
                .expect("any transition is allowed");
            assert_eq!(moved.status, to);
            assert_eq!(moved.created_at, created.created_at);
            assert!(moved.updated_at > previous.updated_at);
            previous = moved;
        }
    }
}

#[test]
fn update_of_missing_id_fails_without_writing() {
    let (service, store, _) = build_service();
    let created = service.create(defective_part()).expect("create succeeds");
    let writes_before = store.writes();

    match service.update_status(99999, ComplaintStatus::Resolved) {
        Err(err @ ComplaintServiceError::NotFound { .. }) => {
            assert!(matches!(
                err,
                ComplaintServiceError::NotFound {
                    id: ComplaintId(99999)
                }
            ));
            assert_eq!(err.to_string(), "complaint with id 99999 not found");
        }
        other => panic!("expected not found, got {other:?}"),
    }

    assert_eq!(store.writes(), writes_before);
    let unchanged = service
        .get_by_id(created.id.0)
        .expect("lookup succeeds")
        .expect("complaint exists");
    assert_eq!(unchanged, created);
}

#[test]
fn update_status_str_rejects_unknown_statuses() {
    let (service, store, _) = build_service();
    let created = service.create(defective_part()).expect("create succeeds");
    let calls_before = store.calls();

    match service.update_status_str(created.id.0, "closed") {
        Err(ComplaintServiceError::Validation(ValidationError::InvalidStatus { value })) => {
            assert_eq!(value, "closed")
        }
        other => panic!("expected invalid status, got {other:?}"),
    }
    assert_eq!(store.calls(), calls_before);

    let updated = service
        .update_status_str(created.id.0, "pending_user_info")
        .expect("known status parses");
    assert_eq!(updated.status, ComplaintStatus::PendingUserInfo);
}

#[test]
fn updated_at_never_precedes_created_at() {
    let (service, _, clock) = build_service();
    let created = service.create(defective_part()).expect("create succeeds");

    clock.rewind(Duration::hours(1));
    let updated = service
        .update_status(created.id.0, ComplaintStatus::InProgress)
        .expect("update succeeds");

    assert_eq!(updated.updated_at, created.created_at);
}

#[test]
fn rewound_clock_does_not_roll_updated_at_back() {
    let (service, _, clock) = build_service();
    let created = service.create(defective_part()).expect("create succeeds");
    let triaged = service
        .update_status(created.id.0, ComplaintStatus::InProgress)
        .expect("update succeeds");

    clock.rewind(Duration::minutes(5));
    let resolved = service
        .update_status(created.id.0, ComplaintStatus::Resolved)
        .expect("update succeeds");

    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert_eq!(resolved.updated_at, triaged.updated_at);
}

#[test]
fn get_by_email_is_exact_and_newest_first() {
    let (service, _, _) = build_service();
    let first = service
        .create(new_complaint("First", "x@y.com"))
        .expect("create");
    service
        .create(new_complaint("Other customer", "z@y.com"))
        .expect("create");
    let second = service
        .create(new_complaint("Second", "x@y.com"))
        .expect("create");
    service
        .create(new_complaint("Shouted", "X@y.com"))
        .expect("create");
    let third = service
        .create(new_complaint("Third", "x@y.com"))
        .expect("create");

    let found = service.get_by_email("x@y.com").expect("lookup succeeds");
    let ids: Vec<ComplaintId> = found.iter().map(|complaint| complaint.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
    assert!(found
        .iter()
        .all(|complaint| complaint.customer_email == "x@y.com"));

    assert!(service
        .get_by_email("nobody@y.com")
        .expect("lookup succeeds")
        .is_empty());
}

#[test]
fn get_by_email_validates_the_address() {
    let (service, store, _) = build_service();
    assert!(matches!(
        service.get_by_email("not an email"),
        Err(ComplaintServiceError::Validation(
            ValidationError::InvalidEmail { .. }
        ))
    ));
    assert_eq!(store.calls(), 0);
}

#[test]
fn get_all_orders_newest_first_regardless_of_store_order() {
    let store = Arc::new(OldestFirstStore::default());
    let clock = Arc::new(SteppingClock::default());
    let service = ComplaintService::with_clock(store, clock);

    for title in ["First", "Second", "Third"] {
        service
            .create(new_complaint(title, "customer@example.com"))
            .expect("create");
    }

    let titles: Vec<String> = service
        .get_all()
        .expect("list succeeds")
        .into_iter()
        .map(|complaint| complaint.title)
        .collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);

    let by_email = service
        .get_by_email("customer@example.com")
        .expect("lookup succeeds");
    assert!(by_email
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[test]
fn get_all_on_empty_store_is_empty() {
    let (service, _, _) = build_service();
    assert!(service.get_all().expect("list succeeds").is_empty());
}

#[test]
fn storage_failures_propagate() {
    let service = ComplaintService::new(Arc::new(UnavailableStore));

    assert!(matches!(
        service.create(defective_part()),
        Err(ComplaintServiceError::Storage(StorageError::Unavailable(_)))
    ));
    assert!(matches!(
        service.get_by_id(1),
        Err(ComplaintServiceError::Storage(_))
    ));
    assert!(matches!(
        service.get_all(),
        Err(ComplaintServiceError::Storage(_))
    ));
    assert!(matches!(
        service.get_by_email("a@b.com"),
        Err(ComplaintServiceError::Storage(_))
    ));
    assert!(matches!(
        service.update_status(1, ComplaintStatus::Rejected),
        Err(ComplaintServiceError::Storage(_))
    ));
}

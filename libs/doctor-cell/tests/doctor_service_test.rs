use assert_matches::assert_matches;

use doctor_cell::{CreateDoctorRequest, DoctorService};
use shared_database::{InMemoryStore, DOCTORS};
use shared_models::error::AppError;
use shared_utils::test_utils::TestConfig;

fn request(email: &str) -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: "Dr. Farzana".to_string(),
        email: email.to_string(),
        specialty: "Pediatric Dental".to_string(),
        img: Some("https://example.com/farzana.png".to_string()),
    }
}

#[tokio::test]
async fn test_added_doctor_is_listed_with_image() {
    let store = InMemoryStore::new();
    let state = TestConfig::default().to_state(store.clone());
    let service = DoctorService::new(&state);

    let outcome = service.add_doctor(request("farzana@x.com")).await.unwrap();
    assert!(outcome.acknowledged);

    let doctors = service.list_doctors().await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id.to_hex(), outcome.inserted_id);
    assert_eq!(doctors[0].img.as_deref(), Some("https://example.com/farzana.png"));
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let store = InMemoryStore::new();
    let state = TestConfig::default().to_state(store.clone());
    let service = DoctorService::new(&state);

    service.add_doctor(request("farzana@x.com")).await.unwrap();
    let second = service.add_doctor(request("farzana@x.com")).await;

    assert_matches!(second, Err(AppError::Conflict(_)));
    assert_eq!(store.count(DOCTORS).unwrap(), 1);
}

#[tokio::test]
async fn test_removing_unknown_doctor_is_not_found() {
    let state = TestConfig::default().to_state(InMemoryStore::new());
    let service = DoctorService::new(&state);

    assert_matches!(
        service.remove_doctor("ghost@x.com").await,
        Err(AppError::NotFound(_))
    );
}

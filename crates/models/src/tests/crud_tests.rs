use anyhow::Result;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::setup_test_db;
use crate::{agency, agency_point, client, reservation, travel, user, user_credentials};
use crate::errors::ModelError;

#[tokio::test]
async fn test_agency_crud_and_unique_name() -> Result<()> {
    let db = setup_test_db().await?;

    let a = agency::create(&db, "  Sunway  ", "1 Main St", "+100", "info@sunway.test").await?;
    assert_eq!(a.name, "Sunway");
    assert!(a.is_active);

    let found = agency::find_by_name(&db, "Sunway").await?.expect("found");
    assert_eq!(found.id, a.id);

    // unique constraint on name surfaces as a conflict
    let dup = agency::create(&db, "Sunway", "2 Main St", "+101", "other@sunway.test").await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))));

    let mut am: agency::ActiveModel = found.into();
    am.is_active = Set(false);
    let updated = am.update(&db).await?;
    assert!(!updated.is_active);
    Ok(())
}

#[tokio::test]
async fn test_agency_validation() -> Result<()> {
    let db = setup_test_db().await?;
    assert!(matches!(agency::create(&db, " ", "a", "p", "e@x.io").await, Err(ModelError::Validation(_))));
    assert!(matches!(agency::create(&db, "N", "a", "p", "not-an-email").await, Err(ModelError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_agency_point_unique_per_agency_and_cascade() -> Result<()> {
    let db = setup_test_db().await?;
    let a = agency::create(&db, "A", "addr", "1", "a@a.io").await?;
    let b = agency::create(&db, "B", "addr", "2", "b@b.io").await?;

    let p = agency_point::create(&db, a.id, "Center", "addr", "3", None).await?;
    assert!(p.email.is_none());
    // same name in another agency is fine
    agency_point::create(&db, b.id, "Center", "addr", "4", Some("c@b.io")).await?;
    // same name in the same agency is not
    assert!(agency_point::create(&db, a.id, "Center", "addr", "5", None).await.is_err());

    let found = agency_point::find_by_agency_and_name(&db, a.id, "Center").await?.expect("found");
    assert_eq!(found.id, p.id);

    agency::Entity::delete_by_id(a.id).exec(&db).await?;
    assert!(agency_point::Entity::find_by_id(p.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_user_email_is_normalized_and_unique() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, user::NewUser {
        email: " Alice@Example.COM ".into(),
        first_name: "Alice".into(),
        last_name: "Doe".into(),
        role: "SuperAdmin".into(),
        is_super_admin: true,
        ..Default::default()
    }).await?;
    assert_eq!(u.email, "alice@example.com");
    assert_eq!(u.full_name(), "Alice Doe");

    let found = user::find_by_email(&db, "ALICE@example.com").await?.expect("found");
    assert_eq!(found.id, u.id);

    let dup = user::create(&db, user::NewUser {
        email: "alice@example.com".into(),
        first_name: "A".into(),
        last_name: "B".into(),
        role: "AgencyOperator".into(),
        ..Default::default()
    }).await;
    assert!(dup.is_err());

    let suspended = user::set_active(&db, u.id, false).await?;
    assert!(!suspended.is_active);

    user::touch_last_login(&db, u.id).await?;
    let after = user::Entity::find_by_id(u.id).one(&db).await?.expect("user");
    assert!(after.last_login_at.is_some());
    Ok(())
}

#[tokio::test]
async fn test_credentials_upsert_replaces_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, user::NewUser {
        email: "c@x.io".into(),
        first_name: "C".into(),
        last_name: "X".into(),
        role: "AgencyOperator".into(),
        ..Default::default()
    }).await?;
    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(first.id, second.id);
    let stored = user_credentials::find_by_user(&db, u.id).await?.expect("creds");
    assert_eq!(stored.password_hash, "hash-2");
    assert!(user_credentials::upsert_password(&db, u.id, " ".into(), "argon2").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_travel_and_reservation_flow() -> Result<()> {
    let db = setup_test_db().await?;
    let a = agency::create(&db, "T", "addr", "1", "t@t.io").await?;
    let now = Utc::now();
    let bad = travel::create(&db, travel::NewTravel {
        agency_id: a.id,
        agency_point_id: None,
        departure: "Paris".into(),
        destination: "Rome".into(),
        departure_date: (now + Duration::days(2)).into(),
        arrival_date: (now + Duration::days(1)).into(),
        price_cents: 10_000,
        available_seats: 10,
    }).await;
    assert!(matches!(bad, Err(ModelError::Validation(_))));

    let t = travel::create(&db, travel::NewTravel {
        agency_id: a.id,
        agency_point_id: None,
        departure: "Paris".into(),
        destination: "Rome".into(),
        departure_date: (now + Duration::days(1)).into(),
        arrival_date: (now + Duration::days(2)).into(),
        price_cents: 10_000,
        available_seats: 10,
    }).await?;
    let c = client::create(&db, "Jane", "Roe", "jane@roe.io", "+33").await?;

    let r = reservation::create(&db, &t, c.id, None, 3).await?;
    assert_eq!(r.total_price_cents, 30_000);
    assert_eq!(r.agency_id, a.id);
    assert_eq!(r.status()?, reservation::ReservationStatus::Pending);

    assert!(reservation::create(&db, &t, c.id, None, 0).await.is_err());
    Ok(())
}

mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;

use support::{create_staff, seed_tenant, spawn_app, travel_body, PASSWORD};

#[tokio::test]
async fn role_groups_reject_other_roles() -> anyhow::Result<()> {
    let app = spawn_app(true).await?;
    let root = app.root_token().await?;
    let tenant = seed_tenant(&app, &root, "Atlas").await?;

    assert_eq!(app.get("/api/SuperAdmin/stats", &tenant.operator).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/api/AgencyGlobalAdmin/agency", &tenant.point_admin).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/api/AgencyPointAdmin/operators", &root).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/api/AgencyOperator/travels", &tenant.global_admin).await?.status, StatusCode::FORBIDDEN);

    let denied = app.get("/api/SuperAdmin/agencies", &tenant.global_admin).await?;
    assert_eq!(denied.body["error"], "Forbidden");
    Ok(())
}

#[tokio::test]
async fn super_admin_manages_agencies() -> anyhow::Result<()> {
    let app = spawn_app(true).await?;
    let root = app.root_token().await?;
    let tenant = seed_tenant(&app, &root, "Atlas").await?;

    let stats = app.get("/api/SuperAdmin/stats", &root).await?;
    assert_eq!(stats.body, json!({"totalAgencies": 1, "totalUsers": 4, "totalReservations": 0, "activeUsers": 4}));

    let dup = app
        .post("/api/SuperAdmin/agencies", &root, json!({"name": "Atlas", "address": "x", "phone": "1", "email": "a@b.test"}))
        .await?;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);

    let one = app.get(&format!("/api/SuperAdmin/agencies/{}", tenant.agency_id), &root).await?;
    assert_eq!(one.body["agencyPointsCount"], 1);
    assert_eq!(one.body["usersCount"], 3);

    let details = app.get(&format!("/api/SuperAdmin/agencies/{}/details", tenant.agency_id), &root).await?;
    assert_eq!(details.status, StatusCode::OK);
    assert_eq!(details.body["usersStats"]["active"], 3);
    assert_eq!(details.body["usersStats"]["roles"]["AgencyOperator"], 1);
    assert_eq!(details.body["agencyPoints"].as_array().map(Vec::len), Some(1));

    let renamed = app
        .put(&format!("/api/SuperAdmin/agencies/{}", tenant.agency_id), &root, json!({"name": "Atlas Voyages", "phone": "  "}))
        .await?;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["name"], "Atlas Voyages");
    assert_eq!(renamed.body["phone"], "+100");

    let off = app
        .put(&format!("/api/SuperAdmin/agencies/{}/toggle-status", tenant.agency_id), &root, json!({"isActive": false}))
        .await?;
    assert_eq!(off.body["isActive"], false);
    Ok(())
}

#[tokio::test]
async fn super_admin_user_placement_is_validated() -> anyhow::Result<()> {
    let app = spawn_app(true).await?;
    let root = app.root_token().await?;
    let a = seed_tenant(&app, &root, "Atlas").await?;
    let b = seed_tenant(&app, &root, "Baobab").await?;

    let cross = app
        .post("/api/SuperAdmin/users", &root, json!({
            "email": "cross@travel.test", "password": PASSWORD, "firstName": "C", "lastName": "X",
            "role": "AgencyOperator", "agencyId": a.agency_id, "agencyPointId": b.point_id,
        }))
        .await?;
    assert_eq!(cross.status, StatusCode::BAD_REQUEST);

    let no_agency = app
        .post("/api/SuperAdmin/users", &root, json!({
            "email": "lost@travel.test", "password": PASSWORD, "firstName": "L", "lastName": "X",
            "role": "AgencyGlobalAdmin",
        }))
        .await?;
    assert_eq!(no_agency.status, StatusCode::BAD_REQUEST);

    let (_, email) = create_staff(&app, &root, "AgencyOperator", &a.agency_id, Some(&a.point_id)).await?;
    let again = app
        .post("/api/SuperAdmin/users", &root, json!({
            "email": email.to_uppercase(), "password": PASSWORD, "firstName": "D", "lastName": "X",
            "role": "AgencyOperator", "agencyId": a.agency_id, "agencyPointId": a.point_id,
        }))
        .await?;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let page = app.get("/api/SuperAdmin/users?page=2&pageSize=3", &root).await?;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["total"], 8);
    assert_eq!(page.body["page"], 2);
    assert_eq!(page.body["pageSize"], 3);
    assert_eq!(page.body["totalPages"], 3);
    assert_eq!(page.body["data"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn agency_admin_stays_inside_its_agency() -> anyhow::Result<()> {
    let app = spawn_app(true).await?;
    let root = app.root_token().await?;
    let a = seed_tenant(&app, &root, "Atlas").await?;
    let b = seed_tenant(&app, &root, "Baobab").await?;

    let own = app.get("/api/AgencyGlobalAdmin/agency", &a.global_admin).await?;
    assert_eq!(own.body["id"], a.agency_id.as_str());

    let foreign = app.get(&format!("/api/AgencyGlobalAdmin/agency-points/{}", b.point_id), &a.global_admin).await?;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let points = app.get("/api/AgencyGlobalAdmin/agency-points", &a.global_admin).await?;
    assert_eq!(points.body.as_array().map(Vec::len), Some(1));

    // agencyId in the body is ignored; the point lands in the caller's agency
    let created = app
        .post("/api/AgencyGlobalAdmin/agency-points", &a.global_admin, json!({
            "agencyId": b.agency_id, "name": "Airport", "address": "3 Runway", "phone": "+102",
        }))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["agencyId"], a.agency_id.as_str());

    let dup = app
        .post("/api/AgencyGlobalAdmin/agency-points", &a.global_admin, json!({"name": "Main", "address": "x", "phone": "1"}))
        .await?;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);

    let promote = app
        .post("/api/AgencyGlobalAdmin/users", &a.global_admin, json!({
            "email": "boss@travel.test", "password": PASSWORD, "firstName": "B", "lastName": "X",
            "role": "AgencyGlobalAdmin", "agencyPointId": a.point_id,
        }))
        .await?;
    assert_eq!(promote.status, StatusCode::BAD_REQUEST);

    let foreign_point = app
        .post("/api/AgencyGlobalAdmin/users", &a.global_admin, json!({
            "email": "op@travel.test", "password": PASSWORD, "firstName": "O", "lastName": "X",
            "role": "AgencyOperator", "agencyPointId": b.point_id,
        }))
        .await?;
    assert_eq!(foreign_point.status, StatusCode::BAD_REQUEST);

    let users = app.get("/api/AgencyGlobalAdmin/users", &a.global_admin).await?;
    assert_eq!(users.body.as_array().map(Vec::len), Some(3));
    assert_eq!(app.get(&format!("/api/AgencyGlobalAdmin/users/{}", b.operator_id), &a.global_admin).await?.status, StatusCode::NOT_FOUND);

    let suspended = app
        .request(Method::DELETE, &format!("/api/AgencyGlobalAdmin/users/{}", a.operator_id), Some(a.global_admin.as_str()), None)
        .await?;
    assert_eq!(suspended.status, StatusCode::OK);
    let after = app.get(&format!("/api/AgencyGlobalAdmin/users/{}", a.operator_id), &a.global_admin).await?;
    assert_eq!(after.body["isActive"], false);
    Ok(())
}

#[tokio::test]
async fn point_admin_manages_operators_of_its_point() -> anyhow::Result<()> {
    let app = spawn_app(true).await?;
    let root = app.root_token().await?;
    let a = seed_tenant(&app, &root, "Atlas").await?;

    let created = app
        .post("/api/AgencyPointAdmin/operators", &a.point_admin, json!({
            "email": "desk@travel.test", "password": PASSWORD, "firstName": "Desk", "lastName": "Agent",
        }))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["role"], "AgencyOperator");
    assert_eq!(created.body["agencyPointId"], a.point_id.as_str());
    assert_eq!(created.body["agencyPointName"], "Main");
    let id = created.body["id"].as_str().unwrap_or_default().to_string();

    let operators = app.get("/api/AgencyPointAdmin/operators", &a.point_admin).await?;
    assert_eq!(operators.body.as_array().map(Vec::len), Some(2));

    // only operators can be created here, whatever role the body names
    for role in ["AgencyPointAdmin", "AgencyGlobalAdmin", "SuperAdmin", "Pilot"] {
        let escalated = app
            .post("/api/AgencyPointAdmin/operators", &a.point_admin, json!({
                "email": format!("{}@travel.test", role.to_lowercase()), "password": PASSWORD,
                "firstName": "Sneaky", "lastName": "Agent", "role": role,
            }))
            .await?;
        assert_eq!(escalated.status, StatusCode::BAD_REQUEST, "role {}", role);
        assert_eq!(escalated.body["error"], "Bad Request");
    }
    let explicit = app
        .post("/api/AgencyPointAdmin/operators", &a.point_admin, json!({
            "email": "desk2@travel.test", "password": PASSWORD, "firstName": "Desk", "lastName": "Two",
            "role": "AgencyOperator",
        }))
        .await?;
    assert_eq!(explicit.status, StatusCode::CREATED);
    let operators = app.get("/api/AgencyPointAdmin/operators", &a.point_admin).await?;
    assert_eq!(operators.body.as_array().map(Vec::len), Some(3));

    let promote = app
        .put(&format!("/api/AgencyPointAdmin/operators/{}", id), &a.point_admin, json!({"role": "AgencyPointAdmin"}))
        .await?;
    assert_eq!(promote.status, StatusCode::BAD_REQUEST);

    let moved = app
        .put(&format!("/api/AgencyPointAdmin/operators/{}", id), &a.point_admin, json!({"agencyId": a.agency_id}))
        .await?;
    assert_eq!(moved.status, StatusCode::BAD_REQUEST);

    let renamed = app
        .put(&format!("/api/AgencyPointAdmin/operators/{}", id), &a.point_admin, json!({"firstName": "Front"}))
        .await?;
    assert_eq!(renamed.body["firstName"], "Front");

    let dashboard = app.get("/api/AgencyPointAdmin/dashboard", &a.point_admin).await?;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["stats"]["totalOperators"], 3);
    assert_eq!(dashboard.body["agencyPoint"]["id"], a.point_id.as_str());

    let gone = app.request(Method::DELETE, &format!("/api/AgencyPointAdmin/operators/{}", id), Some(a.point_admin.as_str()), None).await?;
    assert_eq!(gone.status, StatusCode::OK);
    let dashboard = app.get("/api/AgencyPointAdmin/dashboard", &a.point_admin).await?;
    assert_eq!(dashboard.body["stats"]["activeOperators"], 2);
    Ok(())
}

#[tokio::test]
async fn operator_books_confirms_and_cancels() -> anyhow::Result<()> {
    let app = spawn_app(true).await?;
    let root = app.root_token().await?;
    let a = seed_tenant(&app, &root, "Atlas").await?;
    let b = seed_tenant(&app, &root, "Baobab").await?;

    let trip = app.post("/api/AgencyPointAdmin/travels", &a.point_admin, travel_body(10, None)).await?;
    assert_eq!(trip.status, StatusCode::CREATED);
    let travel_id = trip.body["id"].as_str().unwrap_or_default().to_string();

    let visible = app.get("/api/AgencyOperator/travels", &a.operator).await?;
    assert_eq!(visible.body.as_array().map(Vec::len), Some(1));
    let hidden = app.get("/api/AgencyOperator/travels", &b.operator).await?;
    assert_eq!(hidden.body.as_array().map(Vec::len), Some(0));

    let client = app
        .post("/api/AgencyOperator/clients", &a.operator, json!({
            "firstName": "Awa", "lastName": "Diop", "email": "awa@client.test", "phone": "+221",
        }))
        .await?;
    assert_eq!(client.status, StatusCode::CREATED);
    let client_id = client.body["id"].as_str().unwrap_or_default().to_string();

    let too_many = app
        .post("/api/AgencyOperator/reservations", &a.operator, json!({"travelId": travel_id, "clientId": client_id, "numberOfPassengers": 11}))
        .await?;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    let foreign = app
        .post("/api/AgencyOperator/reservations", &b.operator, json!({"travelId": travel_id, "clientId": client_id, "numberOfPassengers": 1}))
        .await?;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let booked = app
        .post("/api/AgencyOperator/reservations", &a.operator, json!({"travelId": travel_id, "clientId": client_id, "numberOfPassengers": 3}))
        .await?;
    assert_eq!(booked.status, StatusCode::CREATED);
    assert_eq!(booked.body["status"], "Pending");
    assert_eq!(booked.body["totalPriceCents"], 135_000);
    let reservation_id = booked.body["id"].as_str().unwrap_or_default().to_string();

    let seats = app.get(&format!("/api/AgencyGlobalAdmin/travels/{}", travel_id), &a.global_admin).await?;
    assert_eq!(seats.body["availableSeats"], 7);

    let peek = app
        .put(&format!("/api/AgencyOperator/reservations/{}/confirm", reservation_id), &b.operator, json!({}))
        .await?;
    assert_eq!(peek.status, StatusCode::NOT_FOUND);

    let confirmed = app
        .put(&format!("/api/AgencyOperator/reservations/{}/confirm", reservation_id), &a.operator, json!({}))
        .await?;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(confirmed.body["status"], "Confirmed");
    assert_eq!(confirmed.body["confirmedById"], a.operator_id.as_str());

    let twice = app
        .put(&format!("/api/AgencyOperator/reservations/{}/confirm", reservation_id), &a.operator, json!({}))
        .await?;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);

    let cancelled = app
        .put(&format!("/api/AgencyOperator/reservations/{}/cancel", reservation_id), &a.operator, json!({}))
        .await?;
    assert_eq!(cancelled.body["status"], "Cancelled");
    let seats = app.get(&format!("/api/AgencyGlobalAdmin/travels/{}", travel_id), &a.global_admin).await?;
    assert_eq!(seats.body["availableSeats"], 10);

    let dashboard = app.get("/api/AgencyOperator/dashboard", &a.operator).await?;
    assert_eq!(dashboard.body["stats"]["totalReservations"], 1);
    assert_eq!(dashboard.body["stats"]["confirmedByMe"], 1);

    let agency = app.get("/api/AgencyGlobalAdmin/dashboard", &a.global_admin).await?;
    assert_eq!(agency.body["stats"]["totalTravels"], 1);
    assert_eq!(agency.body["stats"]["pendingReservations"], 0);
    Ok(())
}

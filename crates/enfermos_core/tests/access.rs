use enfermos_core::db::open_db_in_memory;
use enfermos_core::{
    AccessService, Actor, AdminAuthorization, AdminRepository, Caretaker, Sector,
    SectorRepository, ServiceError, Session, SqliteAdminRepository, SqliteSectorRepository,
};
use rusqlite::Connection;

const ADMIN_EMAIL: &str = "padre@paroquia.org";

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    SqliteAdminRepository::new(&conn)
        .upsert_admin("Padre João", ADMIN_EMAIL)
        .unwrap();
    conn
}

fn service(conn: &Connection) -> AccessService<SqliteSectorRepository<'_>, SqliteAdminRepository<'_>> {
    AccessService::new(
        SqliteSectorRepository::new(conn),
        SqliteAdminRepository::new(conn),
    )
}

fn insert_sector(conn: &Connection, name: &str, caretakers: Vec<Caretaker>) -> Sector {
    let mut sector = Sector::new(name, "");
    sector.caretakers = caretakers;
    SqliteSectorRepository::new(conn)
        .create_sector(&sector)
        .unwrap();
    sector
}

#[test]
fn caretaker_login_matches_name_and_phone_digits() {
    let conn = setup();
    let sector = insert_sector(
        &conn,
        "NORTE",
        vec![Caretaker::new("ANA LIMA", Some("11987654321"))],
    );

    let session = service(&conn)
        .login_caretaker(" ana lima ", "11 98765 4321")
        .unwrap();
    match session.actor {
        Actor::Caretaker {
            name,
            phone,
            sector_id,
            sector_name,
        } => {
            assert_eq!(name, "ANA LIMA");
            assert_eq!(phone, "(11) 98765-4321");
            assert_eq!(sector_id, sector.id);
            assert_eq!(sector_name, "NORTE");
        }
        other => panic!("unexpected actor: {other:?}"),
    }
}

#[test]
fn caretaker_login_picks_first_sector_by_name() {
    let conn = setup();
    let ana = Caretaker::new("ANA", Some("11987654321"));
    insert_sector(&conn, "SUL", vec![ana.clone()]);
    let north = insert_sector(&conn, "NORTE", vec![ana]);

    let session = service(&conn).login_caretaker("ANA", "11987654321").unwrap();
    assert_eq!(session.caretaker_sector(), Some(north.id));
}

#[test]
fn legacy_or_wrong_phone_caretakers_cannot_log_in() {
    let conn = setup();
    insert_sector(
        &conn,
        "NORTE",
        vec![
            Caretaker::new("JOÃO", None),
            Caretaker::new("ANA", Some("11987654321")),
        ],
    );
    let access = service(&conn);

    assert!(matches!(
        access.login_caretaker("JOÃO", ""),
        Err(ServiceError::NotAuthorized(_))
    ));
    assert!(matches!(
        access.login_caretaker("ANA", "11900000000"),
        Err(ServiceError::NotAuthorized(_))
    ));
}

#[test]
fn admin_login_requires_directory_membership() {
    let conn = setup();
    let access = service(&conn);

    let session = access.login_admin("  PADRE@Paroquia.org ").unwrap();
    assert_eq!(session.admin_email(), Some(ADMIN_EMAIL));
    assert_eq!(session.display_name(), "PADRE JOÃO");
    assert!(access.is_admin(&session).unwrap());

    assert!(matches!(
        access.login_admin("visitante@example.com"),
        Err(ServiceError::NotAuthorized(_))
    ));
    assert!(matches!(
        access.login_admin("not-an-email"),
        Err(ServiceError::InvalidPayload(_))
    ));
}

#[test]
fn is_admin_is_false_for_caretakers_and_unknown_claims() {
    let conn = setup();
    let access = service(&conn);
    let sector = insert_sector(&conn, "NORTE", Vec::new());

    let caretaker = Session::caretaker("ANA", "(11) 98765-4321", sector.id, "NORTE");
    assert!(!access.is_admin(&caretaker).unwrap());
    let impostor = Session::admin("X", "x@example.com");
    assert!(!access.is_admin(&impostor).unwrap());
}

#[test]
fn authorize_admin_upserts_by_normalized_email() {
    let conn = setup();
    let access = service(&conn);
    let admin = Session::admin("PADRE JOÃO", ADMIN_EMAIL);

    let created = access
        .authorize_admin(&admin, "irmã clara", "Clara@Paroquia.org")
        .unwrap();
    assert!(matches!(created, AdminAuthorization::Created(_)));
    assert_eq!(created.admin().email, "clara@paroquia.org");
    assert_eq!(created.admin().name, "IRMÃ CLARA");

    let updated = access
        .authorize_admin(&admin, "Irmã Clara Souza", " clara@paroquia.org")
        .unwrap();
    assert!(matches!(updated, AdminAuthorization::Updated(_)));
    assert_eq!(updated.admin().id, created.admin().id);

    let names = access
        .list_admins(&admin)
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["IRMÃ CLARA SOUZA", "PADRE JOÃO"]);
}

#[test]
fn admin_management_is_admin_only() {
    let conn = setup();
    let access = service(&conn);
    let impostor = Session::admin("X", "x@example.com");

    assert!(matches!(
        access.authorize_admin(&impostor, "X", "x@example.com"),
        Err(ServiceError::NotAuthorized(_))
    ));
    assert!(matches!(
        access.list_admins(&impostor),
        Err(ServiceError::NotAuthorized(_))
    ));
    assert!(SqliteAdminRepository::new(&conn)
        .find_admin_by_email("x@example.com")
        .unwrap()
        .is_none());
}

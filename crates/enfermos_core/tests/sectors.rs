use enfermos_core::db::open_db_in_memory;
use enfermos_core::{
    AdminRepository, Caretaker, Dependent, DependentFields, DependentRepository, DependentState,
    SectorRepository, SectorService, ServiceError, Session, SqliteAdminRepository,
    SqliteDependentRepository, SqliteSectorRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "padre@paroquia.org";

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    SqliteAdminRepository::new(&conn)
        .upsert_admin("Padre João", ADMIN_EMAIL)
        .unwrap();
    conn
}

fn service(conn: &Connection) -> SectorService<SqliteSectorRepository<'_>, SqliteAdminRepository<'_>> {
    SectorService::new(
        SqliteSectorRepository::new(conn),
        SqliteAdminRepository::new(conn),
    )
}

fn admin() -> Session {
    Session::admin("PADRE JOÃO", ADMIN_EMAIL)
}

#[test]
fn create_sector_is_admin_only_and_normalizes_name() {
    let conn = setup();
    let sectors = service(&conn);

    let created = sectors
        .create_sector(&admin(), " setor norte ", "Sábados 9h")
        .unwrap();
    assert_eq!(created.name, "SETOR NORTE");
    assert_eq!(created.schedule, "Sábados 9h");
    assert!(created.caretakers.is_empty());

    let caretaker = Session::caretaker("ANA", "(11) 98765-4321", created.id, "SETOR NORTE");
    assert!(matches!(
        sectors.create_sector(&caretaker, "SUL", ""),
        Err(ServiceError::NotAuthorized(_))
    ));
    assert!(matches!(
        sectors.create_sector(&admin(), "   ", ""),
        Err(ServiceError::InvalidPayload(_))
    ));
}

#[test]
fn list_sectors_orders_by_name_with_derived_counts() {
    let conn = setup();
    let sectors = service(&conn);
    let south = sectors.create_sector(&admin(), "SUL", "").unwrap();
    let north = sectors.create_sector(&admin(), "NORTE", "").unwrap();

    let dependents = SqliteDependentRepository::new(&conn);
    dependents
        .create_dependent(&Dependent::new_active(
            north.id,
            DependentFields::new("ANA", "RUA A", None),
        ))
        .unwrap();
    let mut pending = Dependent::new_active(north.id, DependentFields::new("BIA", "RUA B", None));
    pending.state = DependentState::PendingRemoval {
        reason: "Mudou-se".to_string(),
    };
    dependents.create_dependent(&pending).unwrap();

    let summaries = sectors.list_sectors().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].sector.id, north.id);
    assert_eq!(summaries[0].total_dependents, 2);
    assert_eq!(summaries[0].pending_count, 1);
    assert_eq!(summaries[1].sector.id, south.id);
    assert_eq!(summaries[1].total_dependents, 0);
    assert_eq!(summaries[1].pending_count, 0);
}

#[test]
fn get_missing_sector_is_not_found() {
    let conn = setup();
    let missing = Uuid::new_v4();

    let err = service(&conn).get_sector(missing).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "sector",
            id
        } if id == missing
    ));
}

#[test]
fn add_caretaker_masks_phone_and_ignores_duplicates() {
    let conn = setup();
    let sectors = service(&conn);
    let sector = sectors.create_sector(&admin(), "NORTE", "").unwrap();

    sectors
        .add_caretaker(&admin(), sector.id, " ana lima ", Some("11987654321"))
        .unwrap();
    let updated = sectors
        .add_caretaker(&admin(), sector.id, "ANA LIMA", Some("(11) 98765-4321"))
        .unwrap();

    assert_eq!(
        updated.caretakers,
        vec![Caretaker {
            name: "ANA LIMA".to_string(),
            phone: Some("(11) 98765-4321".to_string()),
        }]
    );
}

#[test]
fn edit_caretaker_replaces_entry_in_place() {
    let conn = setup();
    let sectors = service(&conn);
    let sector = sectors.create_sector(&admin(), "NORTE", "").unwrap();
    sectors
        .add_caretaker(&admin(), sector.id, "ANA", Some("11987654321"))
        .unwrap();
    let with_two = sectors
        .add_caretaker(&admin(), sector.id, "BIA", None)
        .unwrap();

    let edited = sectors
        .edit_caretaker(
            &admin(),
            sector.id,
            &with_two.caretakers[0],
            "ANA MARIA",
            Some("1133334444"),
        )
        .unwrap();
    assert_eq!(edited.caretakers[0].name, "ANA MARIA");
    assert_eq!(edited.caretakers[0].phone.as_deref(), Some("(11) 3333-4444"));
    assert_eq!(edited.caretakers[1].name, "BIA");
}

#[test]
fn removing_unknown_caretaker_is_caretaker_not_found() {
    let conn = setup();
    let sectors = service(&conn);
    let sector = sectors.create_sector(&admin(), "NORTE", "").unwrap();
    let with_one = sectors
        .add_caretaker(&admin(), sector.id, "ANA", Some("11987654321"))
        .unwrap();

    let err = sectors
        .remove_caretaker(&admin(), sector.id, &Caretaker::new("ZÉ", None))
        .unwrap_err();
    assert!(matches!(err, ServiceError::CaretakerNotFound(name) if name == "ZÉ"));

    let emptied = sectors
        .remove_caretaker(&admin(), sector.id, &with_one.caretakers[0])
        .unwrap();
    assert!(emptied.caretakers.is_empty());
}

#[test]
fn legacy_caretaker_lists_are_read_and_rewritten_as_objects() {
    let conn = setup();
    let sectors = service(&conn);
    let sector = sectors.create_sector(&admin(), "NORTE", "").unwrap();
    conn.execute(
        "UPDATE sectors SET caretakers = ?1 WHERE uuid = ?2;",
        [
            r#"["joão", {"nome": "MARIA", "telefone": "(11) 98765-4321"}]"#.to_string(),
            sector.id.to_string(),
        ],
    )
    .unwrap();

    let loaded = sectors.get_sector(sector.id).unwrap();
    assert_eq!(loaded.caretakers.len(), 2);
    assert_eq!(loaded.caretakers[0].name, "JOÃO");
    assert!(loaded.caretakers[0].is_legacy());
    assert_eq!(
        loaded.caretakers[1].phone.as_deref(),
        Some("(11) 98765-4321")
    );

    sectors
        .add_caretaker(&admin(), sector.id, "PEDRO", None)
        .unwrap();
    let raw: String = conn
        .query_row(
            "SELECT caretakers FROM sectors WHERE uuid = ?1;",
            [sector.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["name"], "JOÃO");
    assert!(stored[0]["phone"].is_null());
    assert_eq!(stored[2]["name"], "PEDRO");
}

#[test]
fn caretaker_changes_require_admin() {
    let conn = setup();
    let sectors = service(&conn);
    let sector = sectors.create_sector(&admin(), "NORTE", "").unwrap();
    let caretaker = Session::caretaker("ANA", "(11) 98765-4321", sector.id, "NORTE");

    assert!(matches!(
        sectors.add_caretaker(&caretaker, sector.id, "BIA", None),
        Err(ServiceError::NotAuthorized(_))
    ));
    assert!(SqliteSectorRepository::new(&conn)
        .get_sector(sector.id)
        .unwrap()
        .unwrap()
        .caretakers
        .is_empty());
}

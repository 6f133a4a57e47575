use chrono::{DateTime, Utc};
use keel_orm::{Database, Model};

#[derive(Debug, Clone, Model, PartialEq)]
#[orm(table = "genders")]
struct Gender {
    #[orm(key, column = "gender_id")]
    id: i32,
    #[orm(column = "gender_name")]
    name: String,
}

async fn setup() -> Result<Database, Box<dyn std::error::Error>> {
    let mut db = Database::connect("sqlite::memory:").await?;
    db.execute(
        "CREATE TABLE genders (gender_id INTEGER PRIMARY KEY AUTOINCREMENT, gender_name TEXT NOT NULL)",
    )
    .await?;
    Ok(db)
}

#[tokio::test]
async fn insert_then_fetch_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    let id = db
        .insert(&Gender { id: 0, name: "Test name".to_string() })
        .await?
        .expect("sqlite reports generated keys");

    let fetched: Gender = db.get_by_id(id).await?.expect("inserted row exists");
    assert_eq!(fetched.id as i64, id);
    assert_eq!(fetched.name, "Test name");

    Ok(())
}

#[tokio::test]
async fn insert_reports_each_generated_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    let first = db
        .insert(&Gender { id: 0, name: "First".to_string() })
        .await?
        .expect("sqlite reports generated keys");
    let second = db
        .insert(&Gender { id: 0, name: "Second".to_string() })
        .await?
        .expect("sqlite reports generated keys");
    assert_eq!(second, first + 1);

    let fetched: Gender = db.get_by_id(second).await?.expect("keyed row exists");
    assert_eq!(fetched.name, "Second");

    Ok(())
}

#[tokio::test]
async fn remove_then_fetch_yields_absence() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    let id = db
        .insert(&Gender { id: 0, name: "Test name".to_string() })
        .await?
        .expect("sqlite reports generated keys");

    let obj: Gender = db.get_by_id(id).await?.expect("inserted row exists");
    let affected = db.remove(&obj).await?;
    assert_eq!(affected, 1);

    let gone: Option<Gender> = db.get_by_id(id).await?;
    assert!(gone.is_none());

    // Removing an already-absent row affects nothing and is not an error.
    let affected = db.remove(&obj).await?;
    assert_eq!(affected, 0);

    Ok(())
}

#[tokio::test]
async fn get_all_materializes_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    for name in ["Male", "Female", "Other"] {
        db.insert(&Gender { id: 0, name: name.to_string() }).await?;
    }

    let genders = db.get_all::<Gender>().await?.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(genders.len(), 3);
    assert!(genders.iter().any(|g| g.name == "Female"));

    Ok(())
}

#[tokio::test]
async fn get_by_id_with_no_match_is_absence_not_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    let missing: Option<Gender> = db.get_by_id(424242).await?;
    assert!(missing.is_none());

    Ok(())
}

#[derive(Debug, Clone, Model, PartialEq)]
#[orm(table = "events")]
struct Event {
    #[orm(key, column = "event_id")]
    id: i32,
    #[orm(column = "event_name")]
    name: String,
    #[orm(column = "note")]
    note: Option<String>,
    #[orm(column = "created_at")]
    created_at: DateTime<Utc>,
}

#[tokio::test]
async fn nullable_and_temporal_columns_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::connect("sqlite::memory:").await?;
    db.execute(
        "CREATE TABLE events (event_id INTEGER PRIMARY KEY AUTOINCREMENT, \
         event_name TEXT NOT NULL, note TEXT, created_at TEXT NOT NULL)",
    )
    .await?;

    let event = Event {
        id: 0,
        name: "launch".to_string(),
        note: None,
        created_at: Utc::now(),
    };
    let id = db.insert(&event).await?.expect("generated key");

    let fetched: Event = db.get_by_id(id).await?.expect("inserted row exists");
    assert_eq!(fetched.name, event.name);
    assert_eq!(fetched.note, None);
    assert_eq!(fetched.created_at, event.created_at);

    let noted = Event {
        id: 0,
        name: "retro".to_string(),
        note: Some("bring snacks".to_string()),
        created_at: Utc::now(),
    };
    let id = db.insert(&noted).await?.expect("generated key");

    let fetched: Event = db.get_by_id(id).await?.expect("inserted row exists");
    assert_eq!(fetched.note.as_deref(), Some("bring snacks"));

    Ok(())
}

use keel_orm::{Database, Model};

#[derive(Debug, Clone, Model, PartialEq)]
#[orm(table = "users")]
struct User {
    #[orm(key, column = "user_id")]
    id: i32,
    #[orm(column = "full_name")]
    full_name: String,
}

async fn setup() -> Result<Database, Box<dyn std::error::Error>> {
    let mut db = Database::connect("sqlite::memory:").await?;
    db.execute(
        "CREATE TABLE users (user_id INTEGER PRIMARY KEY AUTOINCREMENT, full_name TEXT NOT NULL)",
    )
    .await?;

    for name in ["Alice", "Bob"] {
        db.insert(&User { id: 0, full_name: name.to_string() }).await?;
    }

    Ok(db)
}

#[tokio::test]
async fn update_touches_only_the_addressed_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    let affected = db
        .update(1, &User { id: 1, full_name: "Alison".to_string() })
        .await?;
    assert_eq!(affected, 1);

    let updated: User = db.get_by_id(1).await?.expect("row 1 exists");
    assert_eq!(updated.full_name, "Alison");

    let untouched: User = db.get_by_id(2).await?.expect("row 2 exists");
    assert_eq!(untouched.full_name, "Bob");

    Ok(())
}

#[tokio::test]
async fn explicit_id_wins_over_the_embedded_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    // The object's own key diverges from the id argument: a caller error,
    // resolved by always filtering on the explicit id.
    let affected = db
        .update(1, &User { id: 999, full_name: "Renamed".to_string() })
        .await?;
    assert_eq!(affected, 1);

    let updated: User = db.get_by_id(1).await?.expect("row 1 exists");
    assert_eq!(updated.full_name, "Renamed");
    assert_eq!(updated.id, 1, "the key column itself is never written");

    let phantom: Option<User> = db.get_by_id(999).await?;
    assert!(phantom.is_none());

    Ok(())
}

#[tokio::test]
async fn update_of_a_missing_row_affects_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = setup().await?;

    let affected = db
        .update(424242, &User { id: 424242, full_name: "Nobody".to_string() })
        .await?;
    assert_eq!(affected, 0);

    Ok(())
}

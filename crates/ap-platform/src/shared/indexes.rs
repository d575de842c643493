//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_module_permission_indexes(db).await?;
    create_module_group_indexes(db).await?;
    create_role_indexes(db).await?;
    create_role_module_indexes(db).await?;
    create_special_role_indexes(db).await?;
    create_otp_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

fn background() -> IndexOptions {
    IndexOptions::builder().background(true).build()
}

async fn create_module_permission_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("module_permissions");

    // (code, platform) lookup backing the registry uniqueness pre-check
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "code": 1, "platform": 1 })
            .options(background())
            .build(),
    ).await?;

    // Group membership lookups when assembling group detail responses
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "group_id": 1 })
            .options(background())
            .build(),
    ).await?;

    info!("Created indexes on module_permissions");
    Ok(())
}

async fn create_module_group_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("module_groups");

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "platform": 1, "sequence": 1 })
            .options(background())
            .build(),
    ).await?;

    info!("Created indexes on module_groups");
    Ok(())
}

async fn create_role_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("roles");

    // (name, platform) lookup backing the role uniqueness pre-check
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "name": 1, "platform": 1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "status": 1 })
            .options(background())
            .build(),
    ).await?;

    info!("Created indexes on roles");
    Ok(())
}

async fn create_role_module_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("role_modules");

    // Link rows are always fetched (and dropped) by owning role
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "role_id": 1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "module_id": 1 })
            .options(background())
            .build(),
    ).await?;

    info!("Created indexes on role_modules");
    Ok(())
}

async fn create_special_role_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("special_roles");

    // Referential guard lookup on role deletion
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "role_id": 1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(background())
            .build(),
    ).await?;

    info!("Created indexes on special_roles");
    Ok(())
}

async fn create_otp_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("otps");

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "phone": 1, "user_type": 1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1, "user_type": 1 })
            .options(background())
            .build(),
    ).await?;

    info!("Created indexes on otps");
    Ok(())
}

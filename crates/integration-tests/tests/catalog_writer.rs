//! Integration tests for transactional catalog writes.
//!
//! These tests require a migrated `PostgreSQL` database (sc-cli migrate).
//!
//! Run with: cargo test -p servicecart-integration-tests -- --ignored

use uuid::Uuid;

use servicecart_integration_tests::store;
use servicecart_storefront::db::{CatalogStore, RepositoryError};
use servicecart_storefront::models::{NewService, NewServiceClass};

fn class_input(name: &str) -> NewServiceClass {
    NewServiceClass {
        name: name.to_string(),
        description: String::new(),
        display_order: 9_999,
    }
}

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_failed_write_leaves_catalog_untouched() {
    let store = store().await;
    let name = format!("Rollback Class {}", Uuid::new_v4().simple());

    let mut writer = store
        .begin_catalog_write()
        .await
        .expect("Failed to start catalog write");
    let class = writer
        .create_service_class(&class_input(&name))
        .await
        .expect("Failed to create class");
    writer
        .create_service(&NewService {
            service_class_id: class.id,
            name: format!("{name} Service"),
            short_description: String::new(),
            detailed_description: String::new(),
        })
        .await
        .expect("Failed to create service");

    // Same name again: the unique constraint rejects it mid-write.
    let err = writer
        .create_service_class(&class_input(&name))
        .await
        .expect_err("duplicate class should be rejected");
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err}");
    drop(writer);

    let found = store
        .get_class_by_slug(class.slug.as_str())
        .await
        .expect("Failed to query classes");
    assert!(found.is_none(), "uncommitted class must not be visible");
}

#[tokio::test]
#[ignore = "Requires migrated database"]
async fn test_committed_write_is_visible() {
    let store = store().await;
    let name = format!("Commit Class {}", Uuid::new_v4().simple());

    let mut writer = store
        .begin_catalog_write()
        .await
        .expect("Failed to start catalog write");
    let class = writer
        .create_service_class(&class_input(&name))
        .await
        .expect("Failed to create class");
    writer.commit().await.expect("Failed to commit");

    let found = store
        .get_class_by_slug(class.slug.as_str())
        .await
        .expect("Failed to query classes");
    assert_eq!(found.map(|c| c.id), Some(class.id));

    let _ = sqlx::query("DELETE FROM storefront.service_class WHERE id = $1")
        .bind(class.id)
        .execute(store.pool())
        .await;
}

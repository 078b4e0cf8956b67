pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod company;

#[cfg(test)]
mod db_tests {
    use migration::MigratorTrait;
    use sea_orm::EntityTrait;

    use crate::{company, db, user};

    // Requires a reachable Postgres; skips itself otherwise.
    #[tokio::test]
    async fn company_crud_and_unique_name() {
        if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
            return;
        }
        let db = match db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }

        let name = format!("model-test-{}", uuid::Uuid::new_v4());
        let created = company::create(&db, &name, company::ImpactLevel::High, 15, "Tech")
            .await
            .expect("create company");
        assert!(created.status);
        assert_eq!(created.years_of_experience, 15);

        let found = company::find_by_name(&db, &name).await.expect("find_by_name");
        assert_eq!(found.map(|c| c.id), Some(created.id));

        // The unique index rejects a second insert with the same name.
        let dup = company::create(&db, &name, company::ImpactLevel::Low, 2, "Food").await;
        assert!(matches!(dup, Err(crate::errors::ModelError::DuplicateName(_))));

        company::Entity::delete_by_id(created.id)
            .exec(&db)
            .await
            .expect("cleanup company");
    }

    #[tokio::test]
    async fn user_create_and_lookup() {
        if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
            return;
        }
        let db = match db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }

        let email = format!("model_{}@example.com", uuid::Uuid::new_v4());
        let created = user::create(&db, &email, "Model Tester", user::ROLE_CLIENT)
            .await
            .expect("create user");
        let found = user::find_by_email(&db, &email).await.expect("find_by_email");
        assert_eq!(found.map(|u| u.id), Some(created.id));

        user::Entity::delete_by_id(created.id).exec(&db).await.expect("cleanup user");
    }
}

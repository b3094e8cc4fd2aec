//! Startup seeding of a development user and client.
//!
//! Seeding is idempotent: records that already exist (by username or client
//! uuid) are left untouched.

use hero_auth::secret::hash_secret;
use hero_auth::{AuthResult, AuthStorage, Client, User};
use tracing::info;

use crate::config::BootstrapConfig;

/// What a bootstrap run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootstrapStats {
    pub users: usize,
    pub clients: usize,
}

/// Seeds the configured user and client into `storage`.
///
/// # Errors
///
/// Returns hashing and storage failures.
pub async fn bootstrap_seed_data(
    storage: &AuthStorage,
    cfg: &BootstrapConfig,
) -> AuthResult<BootstrapStats> {
    let mut stats = BootstrapStats::default();

    let Some(seed_user) = &cfg.user else {
        return Ok(stats);
    };

    let owner = match storage.users.find_by_username(&seed_user.username).await? {
        Some(existing) => {
            info!(username = %existing.username, "Bootstrap user already exists, skipping");
            existing
        }
        None => {
            let hash = hash_secret(&seed_user.password)?;
            let user = storage
                .users
                .create(User::new(&seed_user.username, &seed_user.email, hash))
                .await?;
            info!(user_id = user.id, username = %user.username, "Bootstrap user created");
            stats.users += 1;
            user
        }
    };

    if let Some(seed_client) = &cfg.client {
        if storage.clients.find_by_uuid(&seed_client.uuid).await?.is_some() {
            info!(client_id = %seed_client.uuid, "Bootstrap client already exists, skipping");
        } else {
            let hash = hash_secret(&seed_client.secret)?;
            let client = Client::new(&seed_client.uuid, owner.id, &seed_client.name, hash)
                .with_redirect_url(&seed_client.redirect_url);
            let client = storage.clients.create(client).await?;
            info!(client_id = %client.uuid, owner = owner.id, "Bootstrap client created");
            stats.clients += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BootstrapClient, BootstrapUser};
    use hero_auth::secret::verify_secret;
    use hero_auth_memory::create_auth_storage;

    fn seed_config() -> BootstrapConfig {
        BootstrapConfig {
            user: Some(BootstrapUser {
                username: "admin".into(),
                email: "admin@example.com".into(),
                password: "admin-password".into(),
            }),
            client: Some(BootstrapClient {
                name: "Dev app".into(),
                uuid: "dev-app".into(),
                secret: "dev-secret".into(),
                redirect_url: "http://localhost:3000/callback".into(),
            }),
        }
    }

    #[tokio::test]
    async fn test_seeds_user_and_client() {
        let storage = create_auth_storage();
        let stats = bootstrap_seed_data(&storage, &seed_config()).await.unwrap();
        assert_eq!(stats, BootstrapStats { users: 1, clients: 1 });

        let user = storage.users.find_by_username("admin").await.unwrap().unwrap();
        assert!(verify_secret("admin-password", &user.password_hash).unwrap());

        let client = storage.clients.find_by_uuid("dev-app").await.unwrap().unwrap();
        assert_eq!(client.user_id, user.id);
        assert_eq!(client.redirect_url, "http://localhost:3000/callback");
        assert!(verify_secret("dev-secret", &client.secret_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let storage = create_auth_storage();
        bootstrap_seed_data(&storage, &seed_config()).await.unwrap();
        let stats = bootstrap_seed_data(&storage, &seed_config()).await.unwrap();
        assert_eq!(stats, BootstrapStats::default());
    }

    #[tokio::test]
    async fn test_empty_config_seeds_nothing() {
        let storage = create_auth_storage();
        let stats = bootstrap_seed_data(&storage, &BootstrapConfig::default())
            .await
            .unwrap();
        assert_eq!(stats, BootstrapStats::default());
    }
}

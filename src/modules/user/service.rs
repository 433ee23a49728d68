use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::modules::user::identity::IdentityProvider;
use crate::modules::user::model::{InsertUser, SignInModel, SignUpModel, UserInfo};
use crate::modules::user::repository::UserRepository;
use crate::utils::{hash_password, verify_password, Claims};
use crate::ENV;

const USER_CACHE_TTL: usize = 3600;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserInfo, error::SystemError> {
        let key = format!("user:{}", id);
        if let Some(cached_user) = self.cache.get::<UserInfo>(&key).await? {
            info!("User {} found in cache", id);
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(&id).await?;
        if let Some(entity) = user_entity {
            let user = UserInfo::from(entity);
            self.cache.set(&key, &user, USER_CACHE_TTL).await?;
            info!("User {} cached", id);
            Ok(user)
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            username: user.username,
            email: user.email,
            hash_password,
            name: user.name,
        };

        let user_id = self.repo.create(&new_user).await?;
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<String, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_username(&user.username)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid username or password"));
        }

        let access_token = Claims::new(&user_entity.id, ENV.access_token_expiration)
            .encode(ENV.jwt_secret.as_ref())?;

        Ok(access_token)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for UserService {
    async fn get_user(&self, user_id: &str) -> Result<UserInfo, error::SystemError> {
        let id = Uuid::parse_str(user_id)
            .map_err(|_| error::SystemError::not_found("User not found"))?;
        self.get_by_id(id).await
    }
}

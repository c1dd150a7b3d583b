use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::{PermissionSet, Principal, Role};
use crate::config::Config;
use crate::error::AppError;

/// Token 负载，与登录/注册时的用户行快照对应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i64,
    pub username: String,
    pub role: String,
    pub permission: String,
    pub status: i16,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// 解析为请求身份，权限串在这里拆分一次
    pub fn into_principal(self) -> Result<Principal, AppError> {
        let role = Role::parse(&self.role).ok_or(AppError::InvalidToken)?;

        Ok(Principal {
            uid: self.uid,
            username: self.username,
            role,
            permissions: PermissionSet::parse(&self.permission),
            status: self.status,
        })
    }
}

pub fn sign_token(
    uid: i64,
    username: &str,
    role: &str,
    permission: &str,
    status: i16,
    config: &Config,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        uid,
        username: username.to_string(),
        role: role.to_string(),
        permission: permission.to_string(),
        status,
        iat: now,
        exp: now + config.jwt_expiration().as_secs() as i64,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Capability;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: "test_secret".into(),
            jwt_expiration_secs: 3600,
            server_host: "::".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            smtp_host: String::new(),
            smtp_account: String::new(),
            smtp_password: String::new(),
            mail_from: String::new(),
            cdn_prefix: "http://cdn.test/".into(),
        }
    }

    #[test]
    fn sign_then_verify_restores_claims() {
        let config = test_config();
        let token = sign_token(42, "bob", "merchant", "", 1, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.uid, 42);
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.role, "merchant");
        assert_eq!(claims.status, 1);
    }

    #[test]
    fn wrong_secret_is_invalid_token() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "another_secret".into();

        let token = sign_token(1, "a", "normal", "", 0, &config).unwrap();
        assert!(matches!(
            verify_token(&token, &other),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn principal_resolution_splits_permission_once() {
        let config = test_config();
        let token = sign_token(7, "root", "admin", "user+super", 0, &config).unwrap();
        let principal = verify_token(&token, &config)
            .unwrap()
            .into_principal()
            .unwrap();

        assert_eq!(principal.role, Role::Admin);
        assert!(principal.has_capability(Capability::Merchant));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let claims = Claims {
            uid: 1,
            username: "x".into(),
            role: "root".into(),
            permission: String::new(),
            status: 0,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            claims.into_principal(),
            Err(AppError::InvalidToken)
        ));
    }
}

mod status;
mod token;

pub use status::{FoodStatus, MerchantStatus, ReviewStatus, UserStatus, VerificationStatus};
pub use token::{Claims, sign_token, verify_token};

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Normal,
    Merchant,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Merchant => "merchant",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "normal" => Some(Role::Normal),
            "merchant" => Some(Role::Merchant),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 管理员能力标签，`Super` 隐含其余全部标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    User,
    Merchant,
    Content,
    Super,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::User => "user",
            Capability::Merchant => "merchant",
            Capability::Content => "content",
            Capability::Super => "super",
        }
    }

    pub fn parse(s: &str) -> Option<Capability> {
        match s {
            "user" => Some(Capability::User),
            "merchant" => Some(Capability::Merchant),
            "content" => Some(Capability::Content),
            "super" => Some(Capability::Super),
            _ => None,
        }
    }
}

/// 权限集合
///
/// 数据库中以 `+` 连接的字符串存储（如 `"user+content"`），
/// 在中间件解析 Token 时拆分一次，此后全程以集合形式传递。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<Capability>);

impl PermissionSet {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// 从存储形式解析，未知标签直接忽略
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('+')
                .filter(|s| !s.is_empty())
                .filter_map(Capability::parse)
                .collect(),
        )
    }

    pub fn from_tags(tags: &[Capability]) -> Self {
        Self(tags.iter().copied().collect())
    }

    /// 序列化回存储形式
    pub fn to_storage(&self) -> String {
        let mut tags: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        tags.sort_unstable();
        tags.join("+")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 集合是否允许某能力，`Super` 是全集通配
    pub fn allows(&self, cap: Capability) -> bool {
        self.0.contains(&cap) || self.0.contains(&Capability::Super)
    }
}

/// 经过 Token 验证后挂载到请求上的身份，按请求重建，不做会话持久化
#[derive(Debug, Clone)]
pub struct Principal {
    pub uid: i64,
    pub username: String,
    pub role: Role,
    pub permissions: PermissionSet,
    pub status: i16,
}

impl Principal {
    /// 能力检查：仅管理员持有能力标签，普通用户与商家一律为否。
    /// 资源归属（如“只能改自己的信息”）由各 handler 单独校验。
    pub fn has_capability(&self, cap: Capability) -> bool {
        self.role == Role::Admin && self.permissions.allows(cap)
    }

    pub fn require(&self, cap: Capability) -> Result<(), AppError> {
        if self.has_capability(cap) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_with(raw: &str) -> Principal {
        Principal {
            uid: 1,
            username: "admin".into(),
            role: Role::Admin,
            permissions: PermissionSet::parse(raw),
            status: 0,
        }
    }

    #[test]
    fn super_implies_every_tag() {
        let p = admin_with("super");
        assert!(p.has_capability(Capability::User));
        assert!(p.has_capability(Capability::Merchant));
        assert!(p.has_capability(Capability::Content));
        assert!(p.has_capability(Capability::Super));
    }

    #[test]
    fn plain_tag_only_grants_itself() {
        let p = admin_with("user+content");
        assert!(p.has_capability(Capability::User));
        assert!(p.has_capability(Capability::Content));
        assert!(!p.has_capability(Capability::Merchant));
        assert!(!p.has_capability(Capability::Super));
    }

    #[test]
    fn non_admin_never_has_capabilities() {
        let p = Principal {
            uid: 2,
            username: "alice".into(),
            role: Role::Normal,
            // 即便数据里混入了权限串也不生效
            permissions: PermissionSet::parse("super"),
            status: 0,
        };
        assert!(!p.has_capability(Capability::User));
        assert!(!p.has_capability(Capability::Super));
        assert!(p.require(Capability::Content).is_err());
    }

    #[test]
    fn parse_ignores_unknown_and_empty_tags() {
        let set = PermissionSet::parse("user++what+merchant");
        assert!(set.allows(Capability::User));
        assert!(set.allows(Capability::Merchant));
        assert!(!set.allows(Capability::Content));
    }

    #[test]
    fn storage_round_trip_is_stable() {
        let set = PermissionSet::parse("merchant+user");
        assert_eq!(set.to_storage(), "merchant+user");
        assert_eq!(PermissionSet::parse(&set.to_storage()), set);
        assert_eq!(PermissionSet::new().to_storage(), "");
    }
}

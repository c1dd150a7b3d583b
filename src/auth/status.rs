//! 状态码的唯一定义处
//!
//! `users.status` 的含义与角色相关：
//! - 普通用户 / 管理员：0=正常，2=封禁
//! - 商家：0=正常，1=申请审核中，2=封禁，4=驳回（新注册账号的初始值），5=注销

/// 普通用户、管理员状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum UserStatus {
    Active = 0,
    Banned = 2,
}

impl UserStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(UserStatus::Active),
            2 => Some(UserStatus::Banned),
            _ => None,
        }
    }
}

/// 商家状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum MerchantStatus {
    Active = 0,
    Applying = 1,
    Banned = 2,
    Rejected = 4,
    Deregistered = 5,
}

impl MerchantStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(MerchantStatus::Active),
            1 => Some(MerchantStatus::Applying),
            2 => Some(MerchantStatus::Banned),
            4 => Some(MerchantStatus::Rejected),
            5 => Some(MerchantStatus::Deregistered),
            _ => None,
        }
    }
}

/// 审核记录状态：待审核只能流转到通过或驳回，终态后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum VerificationStatus {
    Approved = 0,
    Pending = 2,
    Rejected = 3,
}

impl VerificationStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(VerificationStatus::Approved),
            2 => Some(VerificationStatus::Pending),
            3 => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

/// 评论状态，删除是状态流转而非删行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum ReviewStatus {
    Active = 0,
    AdminDeleted = 2,
    AuthorDeleted = 3,
}

impl ReviewStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

/// 美食状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum FoodStatus {
    Delisted = 0,
    Listed = 1,
}

impl FoodStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merchant_codes_follow_documented_mapping() {
        assert_eq!(MerchantStatus::Active.as_i16(), 0);
        assert_eq!(MerchantStatus::Applying.as_i16(), 1);
        assert_eq!(MerchantStatus::Banned.as_i16(), 2);
        assert_eq!(MerchantStatus::Rejected.as_i16(), 4);
        assert_eq!(MerchantStatus::Deregistered.as_i16(), 5);
        assert_eq!(MerchantStatus::from_i16(3), None);
    }

    #[test]
    fn user_codes_reject_out_of_range_values() {
        assert_eq!(UserStatus::from_i16(0), Some(UserStatus::Active));
        assert_eq!(UserStatus::from_i16(2), Some(UserStatus::Banned));
        assert_eq!(UserStatus::from_i16(1), None);
        assert_eq!(UserStatus::from_i16(3), None);
        assert_eq!(UserStatus::from_i16(-1), None);
    }

    #[test]
    fn verification_terminal_states() {
        assert!(VerificationStatus::Approved.is_terminal());
        assert!(VerificationStatus::Rejected.is_terminal());
        assert!(!VerificationStatus::Pending.is_terminal());
        assert_eq!(VerificationStatus::from_i16(1), None);
    }
}

use bcrypt::{DEFAULT_COST, hash, verify};
use uuid::Uuid;

pub const DEFAULT_AVATAR: &str = "http://cdn.dianping.example.com/avatar/default.jpg";
pub const DEFAULT_COVER: &str = "http://cdn.dianping.example.com/cover/default.jpg";
pub const DEFAULT_INTRO: &str = "这个人很懒，什么都没有写";

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hashed)
}

/// 审核驳回昵称时使用的随机占位昵称
pub fn random_nickname() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("用户{}", &uuid[0..8])
}

/// 用户名：3-30 位字母、数字、下划线
pub fn is_username_valid(username: &str) -> bool {
    (3..=30).contains(&username.chars().count())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 密码：8-20 位，须同时包含大写、小写、数字和特殊字符
pub fn is_password_valid(password: &str) -> bool {
    const SPECIALS: &str = "@$!%*?&";

    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c));

    (8..=20).contains(&password.chars().count())
        && allowed
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIALS.contains(c))
}

/// 大陆手机号：1 开头，第二位 3-9，共 11 位数字
pub fn is_phone_valid(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 11
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1])
        && phone.chars().all(|c| c.is_ascii_digit())
}

pub fn is_email_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !local.is_empty() && !host.is_empty() && tld.chars().count() >= 2 && !email.contains(' ')
}

/// 昵称：1-30 个字符，不含控制字符
pub fn is_nickname_valid(nickname: &str) -> bool {
    (1..=30).contains(&nickname.chars().count()) && !nickname.chars().any(|c| c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(is_username_valid("wang_xiao2"));
        assert!(is_username_valid("abc"));
        assert!(!is_username_valid("ab"));
        assert!(!is_username_valid("has space"));
        assert!(!is_username_valid("汉字名"));
    }

    #[test]
    fn password_rules() {
        assert!(is_password_valid("Passw0rd!"));
        assert!(!is_password_valid("password1!"));
        assert!(!is_password_valid("PASSWORD1!"));
        assert!(!is_password_valid("Password!"));
        assert!(!is_password_valid("Pw0!"));
        assert!(!is_password_valid("Passw0rd#"));
    }

    #[test]
    fn phone_rules() {
        assert!(is_phone_valid("13812345678"));
        assert!(!is_phone_valid("12812345678"));
        assert!(!is_phone_valid("1381234567"));
        assert!(!is_phone_valid("1381234567a"));
    }

    #[test]
    fn email_rules() {
        assert!(is_email_valid("a@b.com"));
        assert!(is_email_valid("user.name+tag@mail.example.cn"));
        assert!(!is_email_valid("no-at.com"));
        assert!(!is_email_valid("a@b"));
        assert!(!is_email_valid("a b@c.com"));
    }

    #[test]
    fn random_nickname_has_prefix_and_varies() {
        let a = random_nickname();
        let b = random_nickname();
        assert!(a.starts_with("用户"));
        assert_ne!(a, b);
    }

    #[test]
    fn password_hash_round_trip() {
        let hashed = hash_password("Passw0rd!").unwrap();
        assert!(verify_password("Passw0rd!", &hashed).unwrap());
        assert!(!verify_password("Passw0rd?", &hashed).unwrap());
    }
}
